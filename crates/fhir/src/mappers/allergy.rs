//! AllergyIntolerance mapping.
//!
//! An inactive allergy is recorded as `"No Known Allergies"` rather than dropped, so a
//! documented absence survives into the canonical record.

use crate::cache::ReferenceCache;
use crate::extractors::{get_display, get_system};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{Allergy, CanonicalEntity, ClinicalContent};
use serde_json::Value;

pub const NO_KNOWN_ALLERGIES: &str = "No Known Allergies";

pub struct AllergyMapper;

impl ResourceMapper for AllergyMapper {
    fn name(&self) -> &'static str {
        "allergy"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["AllergyIntolerance"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let patient_id = cache.resolve_patient_via(resource, "patient");

        let allergy = if resource.str_at("clinicalStatus.coding.0.code") == Some("inactive") {
            Allergy {
                substance: Some(NO_KNOWN_ALLERGIES.into()),
                patient_id,
                ..Default::default()
            }
        } else {
            Allergy {
                substance: get_display(resource),
                coding_method: get_system(resource),
                reaction: resource.string_at("reaction.0.description"),
                severity: resource.string_at("reaction.0.severity"),
                onset: resource.string_at("onsetDateTime"),
                patient_id,
            }
        };

        content.push(CanonicalEntity::Allergy(allergy));
    }
}
