//! Shared field extractors.
//!
//! Every mapper reads codes, displays and references through these helpers so equivalent
//! substructures are interpreted the same way everywhere. None of them fail: a missing path
//! at any depth yields `None`.
//!
//! Precedence rules:
//! - display text: `text` wins over `coding[0].display`
//! - effective date: `effectiveDateTime`, then `issued`, then `performedDateTime`
//! - references: the trailing `/` segment is the id

use crate::value::ValueExt;
use serde_json::Value;
use std::collections::BTreeMap;

/// `code.coding[0].code`.
pub fn get_code(resource: &Value) -> Option<String> {
    resource.string_at("code.coding.0.code")
}

/// `code.coding[0].system`.
pub fn get_system(resource: &Value) -> Option<String> {
    resource.string_at("code.coding.0.system")
}

/// `code.text`, falling back to `code.coding[0].display`.
pub fn get_display(resource: &Value) -> Option<String> {
    resource
        .string_at("code.text")
        .or_else(|| resource.string_at("code.coding.0.display"))
}

/// Patient id from `subject.reference`.
pub fn extract_patient_reference(resource: &Value) -> Option<String> {
    resource.at("subject").and_then(extract_reference_id)
}

/// Encounter id from `encounter.reference`.
pub fn extract_encounter_reference(resource: &Value) -> Option<String> {
    resource.at("encounter").and_then(extract_reference_id)
}

/// Id of any reference object (`{"reference": "Type/id"}`).
pub fn extract_reference_id(reference: &Value) -> Option<String> {
    reference.str_at("reference").and_then(reference_tail)
}

/// First of `effectiveDateTime`, `issued`, `performedDateTime`.
pub fn extract_effective_date(resource: &Value) -> Option<String> {
    resource
        .string_at("effectiveDateTime")
        .or_else(|| resource.string_at("issued"))
        .or_else(|| resource.string_at("performedDateTime"))
}

/// Trailing segment of a reference string.
pub fn reference_tail(reference: &str) -> Option<String> {
    reference
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
}

/// Split a typed reference such as `Practitioner/123` into its type and id.
///
/// A bare id (no `/`) yields no type.
pub fn split_reference(reference: &str) -> (Option<String>, Option<String>) {
    match reference.rsplit_once('/') {
        Some((prefix, id)) => {
            let kind = prefix.rsplit('/').next().filter(|k| !k.is_empty());
            (kind.map(str::to_owned), Some(id.to_owned()).filter(|i| !i.is_empty()))
        }
        None => (None, Some(reference.to_owned()).filter(|i| !i.is_empty())),
    }
}

/// Ids of every reference in the array at `path`.
pub fn reference_ids(value: &Value, path: &str) -> Vec<String> {
    value
        .array_at(path)
        .iter()
        .filter_map(extract_reference_id)
        .collect()
}

/// Type and id of the reference object at `path`.
pub fn typed_reference(value: &Value, path: &str) -> (Option<String>, Option<String>) {
    match value.str_at(&format!("{path}.reference")) {
        Some(reference) => split_reference(reference),
        None => (None, None),
    }
}

/// Code, system and display read from one codeable concept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodingParts {
    pub code: Option<String>,
    pub system: Option<String>,
    pub display: Option<String>,
}

/// Read a codeable concept, or the first element of a list of them.
///
/// `text` wins over the first coding's display.
pub fn extract_coding(concept: Option<&Value>) -> CodingParts {
    let concept = match concept {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    let Some(concept) = concept else {
        return CodingParts::default();
    };

    CodingParts {
        code: concept.string_at("coding.0.code"),
        system: concept.string_at("coding.0.system"),
        display: concept
            .string_at("text")
            .or_else(|| concept.string_at("coding.0.display")),
    }
}

/// The first concept in the list at `path` that has at least one coding.
pub fn first_coded(value: &Value, path: &str) -> CodingParts {
    let concept = value
        .array_at(path)
        .iter()
        .find(|concept| !concept.array_at("coding").is_empty());
    extract_coding(concept)
}

/// First coding of `concept` carrying a display or, failing that, a code.
pub fn coding_label(concept: Option<&Value>) -> Option<String> {
    concept?
        .array_at("coding")
        .iter()
        .find_map(|c| c.string_at("display").or_else(|| c.string_at("code")))
}

/// `identifier[]` as `system -> value`, skipping entries missing either side.
pub fn identifier_map(resource: &Value) -> BTreeMap<String, String> {
    resource
        .array_at("identifier")
        .iter()
        .filter_map(|id| Some((id.string_at("system")?, id.string_at("value")?)))
        .collect()
}

/// `note[].text` joined by `separator`; `None` when no note has text.
pub fn joined_notes(resource: &Value, separator: &str) -> Option<String> {
    let notes: Vec<&str> = resource
        .array_at("note")
        .iter()
        .filter_map(|note| note.str_at("text"))
        .collect();
    if notes.is_empty() {
        None
    } else {
        Some(notes.join(separator))
    }
}

/// Fields of one address element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub lines: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

pub fn address_parts(address: Option<&Value>) -> AddressParts {
    let Some(address) = address else {
        return AddressParts::default();
    };
    AddressParts {
        lines: string_list(address, "line"),
        city: address.string_at("city"),
        state: address.string_at("state"),
        postal_code: address.string_at("postalCode"),
        country: address.string_at("country"),
    }
}

/// Non-empty strings of the array at `path`.
pub fn string_list(value: &Value, path: &str) -> Vec<String> {
    value
        .array_at(path)
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// `telecom[].value`.
pub fn telecom_values(resource: &Value) -> Vec<String> {
    resource
        .array_at("telecom")
        .iter()
        .filter_map(|t| t.string_at("value"))
        .collect()
}

/// Render a human name as `prefix given family suffix`, or its `text` when present.
pub fn format_human_name(name: &Value) -> Option<String> {
    if let Some(text) = name.string_at("text") {
        return Some(text);
    }
    let mut parts = string_list(name, "prefix");
    parts.extend(string_list(name, "given"));
    parts.extend(name.string_at("family"));
    parts.extend(string_list(name, "suffix"));
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_subtrees_yield_none() {
        let resource = json!({"resourceType": "Observation"});
        assert_eq!(get_code(&resource), None);
        assert_eq!(get_system(&resource), None);
        assert_eq!(get_display(&resource), None);
        assert_eq!(extract_patient_reference(&resource), None);
        assert_eq!(extract_encounter_reference(&resource), None);
        assert_eq!(extract_effective_date(&resource), None);

        let empty_coding = json!({"code": {"coding": []}, "subject": {}});
        assert_eq!(get_code(&empty_coding), None);
        assert_eq!(extract_patient_reference(&empty_coding), None);
    }

    #[test]
    fn display_prefers_text_over_coding_display() {
        let resource = json!({"code": {"text": "A", "coding": [{"display": "B"}]}});
        assert_eq!(get_display(&resource).as_deref(), Some("A"));

        let coded_only = json!({"code": {"coding": [{"display": "B"}]}});
        assert_eq!(get_display(&coded_only).as_deref(), Some("B"));
    }

    #[test]
    fn effective_date_falls_back_in_order() {
        let issued_only = json!({"issued": "2024-03-01T10:00:00Z"});
        assert_eq!(
            extract_effective_date(&issued_only).as_deref(),
            Some("2024-03-01T10:00:00Z")
        );

        let both = json!({"effectiveDateTime": "2024-01-01", "issued": "2024-03-01"});
        assert_eq!(extract_effective_date(&both).as_deref(), Some("2024-01-01"));

        let performed = json!({"performedDateTime": "2023-12-31"});
        assert_eq!(extract_effective_date(&performed).as_deref(), Some("2023-12-31"));
    }

    #[test]
    fn references_resolve_to_trailing_segment() {
        let resource = json!({
            "subject": {"reference": "Patient/P2"},
            "encounter": {"reference": "urn:uuid:enc-1"}
        });
        assert_eq!(extract_patient_reference(&resource).as_deref(), Some("P2"));
        assert_eq!(
            extract_encounter_reference(&resource).as_deref(),
            Some("urn:uuid:enc-1")
        );
        assert_eq!(
            extract_reference_id(&json!({"reference": "Organization/org-9"})).as_deref(),
            Some("org-9")
        );
    }

    #[test]
    fn split_reference_separates_type_and_id() {
        assert_eq!(
            split_reference("Practitioner/123"),
            (Some("Practitioner".into()), Some("123".into()))
        );
        assert_eq!(split_reference("123"), (None, Some("123".into())));
    }

    #[test]
    fn extract_coding_reads_first_concept_of_a_list() {
        let concepts = json!([
            {"coding": [{"code": "394814009", "system": "http://snomed.info/sct", "display": "General practice"}]},
            {"text": "ignored"}
        ]);
        let parts = extract_coding(Some(&concepts));
        assert_eq!(parts.code.as_deref(), Some("394814009"));
        assert_eq!(parts.display.as_deref(), Some("General practice"));
        assert_eq!(extract_coding(None), CodingParts::default());
    }

    #[test]
    fn human_names_render_in_conventional_order() {
        let name = json!({"prefix": ["Dr."], "given": ["Ada", "M"], "family": "Lovelace", "suffix": ["PhD"]});
        assert_eq!(
            format_human_name(&name).as_deref(),
            Some("Dr. Ada M Lovelace PhD")
        );
        assert_eq!(format_human_name(&json!({})), None);
    }

    #[test]
    fn identifiers_skip_incomplete_entries() {
        let resource = json!({"identifier": [
            {"system": "urn:mrn", "value": "123"},
            {"value": "orphan"}
        ]});
        let ids = identifier_map(&resource);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.get("urn:mrn").map(String::as_str), Some("123"));
    }

    #[test]
    fn coding_label_takes_first_display_or_code() {
        let concept = json!({"coding": [{"system": "x"}, {"code": "C1"}, {"display": "later"}]});
        assert_eq!(coding_label(Some(&concept)).as_deref(), Some("C1"));
        assert_eq!(coding_label(None), None);
    }

    #[test]
    fn typed_references_and_reference_lists() {
        let resource = json!({
            "author": {"reference": "Practitioner/dr-1"},
            "goal": [{"reference": "Goal/g1"}, {"display": "no ref"}, {"reference": "Goal/g2"}]
        });
        assert_eq!(
            typed_reference(&resource, "author"),
            (Some("Practitioner".to_owned()), Some("dr-1".to_owned()))
        );
        assert_eq!(typed_reference(&resource, "missing"), (None, None));
        assert_eq!(reference_ids(&resource, "goal"), vec!["g1", "g2"]);
    }

    #[test]
    fn first_coded_skips_text_only_concepts() {
        let resource = json!({"category": [
            {"text": "free text only"},
            {"text": "Nursing", "coding": [{"code": "N", "system": "sys", "display": "nursing"}]}
        ]});
        let parts = first_coded(&resource, "category");
        assert_eq!(parts.code.as_deref(), Some("N"));
        assert_eq!(parts.display.as_deref(), Some("Nursing"));
        assert_eq!(first_coded(&resource, "reasonCode"), CodingParts::default());
    }
}
