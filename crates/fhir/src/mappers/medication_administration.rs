//! MedicationAdministration mapping into the MAR.
//!
//! R4 administrations point at their encounter through `context`.

use crate::cache::{CacheKey, ReferenceCache};
use crate::extractors::{extract_encounter_reference, extract_reference_id, joined_notes};
use crate::mappers::medication::{medication_concept, quantity_label, route_label};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, MedicationAdministration};
use serde_json::Value;

pub struct MedicationAdministrationMapper;

impl ResourceMapper for MedicationAdministrationMapper {
    fn name(&self) -> &'static str {
        "medication_administration"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["MedicationAdministration"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let concept = medication_concept(resource);

        content.push(CanonicalEntity::MedicationAdministration(
            MedicationAdministration {
                medication_code: concept.code,
                coding_method: concept.system,
                medication: concept.name,
                dosage: quantity_label(resource.at("dosage.dose")),
                route: route_label(resource.at("dosage.route")),
                frequency: None,
                administered_at: resource
                    .string_at("effectiveDateTime")
                    .or_else(|| resource.string_at("effectivePeriod.start")),
                status: resource.string_at("status"),
                notes: joined_notes(resource, "; "),
                patient_id: cache.resolve_patient_id(resource),
                encounter_id: cache.resolve(
                    resource
                        .at("context")
                        .and_then(extract_reference_id)
                        .or_else(|| extract_encounter_reference(resource)),
                    CacheKey::EncounterId,
                ),
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn maps_dose_route_and_notes() {
        let resource = json!({
            "resourceType": "MedicationAdministration",
            "status": "completed",
            "medicationCodeableConcept": {"coding": [{"code": "313782", "system": "rxnorm", "display": "Acetaminophen 325 MG"}]},
            "effectivePeriod": {"start": "2024-06-01T08:00:00Z"},
            "dosage": {"dose": {"value": 650, "unit": "mg"}, "route": {"coding": [{"code": "PO"}]}},
            "note": [{"text": "Given with food"}, {"text": "Tolerated well"}],
            "context": {"reference": "Encounter/e9"}
        });
        let content = map_one(&MedicationAdministrationMapper, &resource);

        let mar = &content.mar[0];
        assert_eq!(mar.medication.as_deref(), Some("Acetaminophen 325 MG"));
        assert_eq!(mar.dosage.as_deref(), Some("650 mg"));
        assert_eq!(mar.route.as_deref(), Some("PO"));
        assert_eq!(mar.administered_at.as_deref(), Some("2024-06-01T08:00:00Z"));
        assert_eq!(mar.notes.as_deref(), Some("Given with food; Tolerated well"));
        assert_eq!(mar.encounter_id.as_deref(), Some("e9"));
    }
}
