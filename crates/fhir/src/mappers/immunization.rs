//! Immunization mapping.

use crate::cache::ReferenceCache;
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Immunization};
use serde_json::Value;

pub struct ImmunizationMapper;

impl ResourceMapper for ImmunizationMapper {
    fn name(&self) -> &'static str {
        "immunization"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Immunization"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        content.push(CanonicalEntity::Immunization(Immunization {
            vaccine_code: resource.string_at("vaccineCode.coding.0.code"),
            coding_method: resource.string_at("vaccineCode.coding.0.system"),
            description: resource
                .string_at("vaccineCode.text")
                .or_else(|| resource.string_at("vaccineCode.coding.0.display")),
            date_administered: resource.string_at("occurrenceDateTime"),
            status: resource.string_at("status"),
            lot_number: resource.string_at("lotNumber"),
            patient_id: cache.resolve_patient_via(resource, "patient"),
            encounter_id: cache.resolve_encounter_id(resource),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use serde_json::json;

    #[test]
    fn maps_vaccine_and_falls_back_to_cached_ids() {
        let resource = json!({
            "resourceType": "Immunization",
            "status": "completed",
            "vaccineCode": {"coding": [{"system": "http://hl7.org/fhir/sid/cvx", "code": "140", "display": "Influenza, seasonal"}]},
            "occurrenceDateTime": "2023-10-01",
            "lotNumber": "L-77"
        });
        let mut content = ClinicalContent::new();
        let mut cache = ReferenceCache::new();
        cache.set(CacheKey::PatientId, "P1");
        cache.set(CacheKey::EncounterId, "E1");

        ImmunizationMapper.map(&resource, &mut content, &mut cache);

        let imm = &content.immunizations[0];
        assert_eq!(imm.vaccine_code.as_deref(), Some("140"));
        assert_eq!(imm.description.as_deref(), Some("Influenza, seasonal"));
        assert_eq!(imm.lot_number.as_deref(), Some("L-77"));
        assert_eq!(imm.patient_id.as_deref(), Some("P1"));
        assert_eq!(imm.encounter_id.as_deref(), Some("E1"));
    }
}
