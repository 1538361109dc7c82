//! Encounter mapping. Fills the aggregate's encounter slot and seeds the cache.

use crate::cache::{CacheKey, ReferenceCache};
use crate::extractors::extract_reference_id;
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Encounter, EncounterProvider};
use serde_json::Value;

pub struct EncounterMapper;

impl ResourceMapper for EncounterMapper {
    fn name(&self) -> &'static str {
        "encounter"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Encounter"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let id = resource.string_at("id");
        if let Some(id) = &id {
            cache.set(CacheKey::EncounterId, id.clone());
        }

        let providers = resource
            .array_at("participant")
            .iter()
            .map(|participant| EncounterProvider {
                id: participant
                    .at("individual")
                    .and_then(extract_reference_id),
                name: participant.string_at("individual.display"),
                type_code: participant.string_at("type.0.coding.0.code"),
                coding_method: participant.string_at("type.0.coding.0.system"),
                specialty: None,
            })
            .collect();

        content.push(CanonicalEntity::Encounter(Encounter {
            id,
            admit_date: resource.string_at("period.start"),
            discharge_date: resource.string_at("period.end"),
            encounter_type: resource.string_at("type.0.coding.0.display"),
            type_coding_method: resource.string_at("type.0.coding.0.system"),
            location: resource.string_at("location.0.location.display"),
            reason_code: resource
                .string_at("reasonCode.0.text")
                .or_else(|| resource.string_at("reasonCode.0.coding.0.display")),
            reason_coding_method: resource.string_at("reasonCode.0.coding.0.system"),
            providers,
            visit_type: resource.string_at("class.code"),
            status: resource.string_at("status"),
            patient_id: cache.resolve_patient_id(resource),
        }));
    }
}
