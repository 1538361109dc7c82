//! Medication intent: statements, requests and bare Medication resources all land in the
//! `medications` family.

use crate::cache::ReferenceCache;
use crate::extractors::coding_label;
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Medication};
use serde_json::Value;

/// Code, system and name of the medication a resource talks about.
///
/// A `medicationCodeableConcept` wins; a `medicationReference` contributes only its display.
pub(crate) struct MedicationConcept {
    pub code: Option<String>,
    pub system: Option<String>,
    pub name: Option<String>,
}

pub(crate) fn medication_concept(resource: &Value) -> MedicationConcept {
    if let Some(concept) = resource.at("medicationCodeableConcept") {
        return MedicationConcept {
            code: concept.string_at("coding.0.code"),
            system: concept.string_at("coding.0.system"),
            name: concept.string_at("text").or_else(|| first_display(concept)),
        };
    }
    MedicationConcept {
        code: None,
        system: None,
        name: resource.string_at("medicationReference.display"),
    }
}

/// `text`, else the first coding carrying a display, else the first coding code.
pub(crate) fn route_label(route: Option<&Value>) -> Option<String> {
    route?
        .string_at("text")
        .or_else(|| coding_label(route))
}

/// `value unit` for a quantity node, `None` without a value.
pub(crate) fn quantity_label(quantity: Option<&Value>) -> Option<String> {
    let quantity = quantity?;
    let value = quantity.text_at("value")?;
    Some(match quantity.str_at("unit") {
        Some(unit) => format!("{value} {unit}"),
        None => value,
    })
}

fn first_display(concept: &Value) -> Option<String> {
    concept
        .array_at("coding")
        .iter()
        .find_map(|c| c.string_at("display"))
}

pub struct MedicationStatementMapper;

impl ResourceMapper for MedicationStatementMapper {
    fn name(&self) -> &'static str {
        "medication_statement"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["MedicationStatement"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let concept = medication_concept(resource);
        let dosage = resource.at("dosage.0");

        content.push(CanonicalEntity::Medication(Medication {
            code: concept.code,
            coding_method: concept.system,
            name: concept.name,
            dose: quantity_label(dosage.and_then(|d| d.at("doseAndRate.0.doseQuantity"))),
            route: route_label(dosage.and_then(|d| d.at("route"))),
            frequency: dosage.and_then(|d| d.text_at("timing.repeat.frequency")),
            start_date: resource
                .string_at("effectiveDateTime")
                .or_else(|| resource.string_at("effectivePeriod.start")),
            end_date: resource.string_at("effectivePeriod.end"),
            status: resource.string_at("status"),
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
            notes: None,
        }));
    }
}

/// Standalone Medication definitions. They describe a product, not a patient's use of it,
/// so no patient or encounter is attached.
pub struct MedicationMapper;

impl ResourceMapper for MedicationMapper {
    fn name(&self) -> &'static str {
        "medication"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Medication"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, _cache: &mut ReferenceCache) {
        let ingredients: Vec<String> = resource
            .array_at("ingredient")
            .iter()
            .filter_map(ingredient_label)
            .collect();

        content.push(CanonicalEntity::Medication(Medication {
            code: resource.string_at("code.coding.0.code"),
            coding_method: resource.string_at("code.coding.0.system"),
            name: resource
                .string_at("code.text")
                .or_else(|| resource.at("code").and_then(first_display)),
            route: resource.at("form").and_then(first_display),
            status: resource.string_at("status"),
            notes: (!ingredients.is_empty())
                .then(|| format!("Ingredients: {}", ingredients.join("; "))),
            ..Default::default()
        }));
    }
}

/// `name strength`, where strength is `num unit/denom unit` or just the numerator.
fn ingredient_label(ingredient: &Value) -> Option<String> {
    let name = ingredient.at("itemCodeableConcept").and_then(first_display)?;

    let numerator = ingredient.at("strength.numerator");
    let denominator = ingredient.at("strength.denominator");
    let strength = match (quantity_label(numerator), quantity_label(denominator)) {
        (Some(num), Some(denom)) => Some(format!("{num}/{denom}")),
        (Some(num), None) => Some(num),
        _ => None,
    };

    Some(match strength {
        Some(strength) => format!("{name} {strength}"),
        None => name,
    })
}

pub struct MedicationRequestMapper;

impl ResourceMapper for MedicationRequestMapper {
    fn name(&self) -> &'static str {
        "medication_request"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["MedicationRequest"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let concept = medication_concept(resource);
        let dosage = resource.at("dosageInstruction.0");

        let frequency = dosage.and_then(|d| match d.at("timing.code") {
            Some(code) => code.string_at("text").or_else(|| coding_label(Some(code))),
            None => d.text_at("timing.repeat.frequency"),
        });

        content.push(CanonicalEntity::Medication(Medication {
            code: concept.code,
            coding_method: concept.system,
            name: concept.name,
            dose: quantity_label(dosage.and_then(|d| d.at("doseAndRate.0.doseQuantity"))),
            route: route_label(dosage.and_then(|d| d.at("route"))),
            frequency,
            start_date: resource
                .string_at("dispenseRequest.validityPeriod.start")
                .or_else(|| resource.string_at("authoredOn")),
            end_date: resource.string_at("dispenseRequest.validityPeriod.end"),
            status: resource.string_at("status"),
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
            notes: None,
        }));
    }
}
