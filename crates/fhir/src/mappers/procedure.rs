//! Procedure mapping.

use crate::cache::ReferenceCache;
use crate::extractors::{get_code, get_display, get_system, split_reference};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Procedure, ProcedureProvider};
use serde_json::Value;

pub struct ProcedureMapper;

impl ResourceMapper for ProcedureMapper {
    fn name(&self) -> &'static str {
        "procedure"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Procedure"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let providers = resource
            .array_at("performer")
            .iter()
            .filter_map(performer)
            .collect();

        content.push(CanonicalEntity::Procedure(Procedure {
            code: get_code(resource),
            coding_method: get_system(resource),
            description: get_display(resource),
            performed_date: resource
                .string_at("performedDateTime")
                .or_else(|| resource.string_at("performedPeriod.start")),
            status: resource.string_at("status"),
            providers,
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
        }));
    }
}

/// Practitioner performers only; organisations and devices are skipped.
fn performer(performer: &Value) -> Option<ProcedureProvider> {
    let (kind, id) = split_reference(performer.str_at("actor.reference")?);
    if kind.as_deref() != Some("Practitioner") {
        return None;
    }

    let role = performer
        .array_at("function.coding")
        .iter()
        .find_map(|coding| coding.string_at("display").or_else(|| coding.string_at("code")))
        .or_else(|| performer.string_at("function.text"));

    Some(ProcedureProvider {
        provider_id: id,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn keeps_practitioner_performers_only() {
        let resource = json!({
            "resourceType": "Procedure",
            "status": "completed",
            "code": {"coding": [{"system": "http://snomed.info/sct", "code": "80146002", "display": "Appendectomy"}]},
            "performedPeriod": {"start": "2024-05-01T07:30:00Z"},
            "performer": [
                {"actor": {"reference": "Practitioner/surgeon-1"}, "function": {"coding": [{"code": "SURG"}]}},
                {"actor": {"reference": "Organization/hosp"}},
                {"actor": {"reference": "Practitioner/anaes-1"}, "function": {"text": "Anaesthetist"}}
            ]
        });
        let content = map_one(&ProcedureMapper, &resource);

        let procedure = &content.procedures[0];
        assert_eq!(procedure.description.as_deref(), Some("Appendectomy"));
        assert_eq!(procedure.performed_date.as_deref(), Some("2024-05-01T07:30:00Z"));
        assert_eq!(procedure.providers.len(), 2);
        assert_eq!(procedure.providers[0].role.as_deref(), Some("SURG"));
        assert_eq!(procedure.providers[1].provider_id.as_deref(), Some("anaes-1"));
        assert_eq!(procedure.providers[1].role.as_deref(), Some("Anaesthetist"));
    }
}
