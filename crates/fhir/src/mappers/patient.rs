//! Patient demographics.
//!
//! Notes:
//! - patients aged 90 or over keep `over_90 = true` and lose their birth year
//! - the patient id is written to the reference cache for later resources

use crate::cache::{CacheKey, ReferenceCache};
use crate::extractors::identifier_map;
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Patient, PatientPreferences};
use serde_json::Value;

/// Age at which the birth year is withheld.
const AGE_CEILING: i32 = 90;

pub struct PatientMapper {
    current_year: i32,
}

impl PatientMapper {
    /// Mapper that computes ages relative to `current_year`.
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }
}

impl ResourceMapper for PatientMapper {
    fn name(&self) -> &'static str {
        "patient"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Patient"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let id = resource.string_at("id");

        let birth_year = resource
            .str_at("birthDate")
            .and_then(|date| date.split('-').next())
            .and_then(|year| year.parse::<i32>().ok());
        let (dob_year, over_90) = match birth_year {
            Some(year) if self.current_year - year >= AGE_CEILING => (None, true),
            Some(year) => (Some(year), false),
            None => (None, false),
        };

        let preferences = resource
            .array_at("communication")
            .iter()
            .map(|comm| PatientPreferences {
                preferred_language: comm.at("language").and_then(|lang| {
                    lang.string_at("text")
                        .or_else(|| lang.string_at("coding.0.display"))
                }),
                requires_interpreter: Some(comm.bool_at("preferred").unwrap_or(false)),
                ..Default::default()
            })
            .collect();

        let geographic_area = resource
            .string_at("address.0.state")
            .or_else(|| resource.string_at("address.0.country"));

        if let Some(id) = &id {
            cache.set(CacheKey::PatientId, id.clone());
        }
        tracing::debug!(patient_id = id.as_deref().unwrap_or("<none>"), over_90, "patient mapped");

        content.push(CanonicalEntity::Patient(Patient {
            id,
            dob_year,
            over_90,
            gender: resource.string_at("gender"),
            geographic_area,
            identifiers: identifier_map(resource),
            preferences,
        }));
    }
}
