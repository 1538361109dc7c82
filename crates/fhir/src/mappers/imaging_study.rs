//! ImagingStudy mapping. Studies carry no findings of their own; those arrive on the
//! DiagnosticReport that references the study.

use crate::cache::ReferenceCache;
use crate::extractors::extract_reference_id;
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, ImagingReport};
use serde_json::Value;

const DICOM: &str = "DICOM";

pub struct ImagingStudyMapper;

impl ResourceMapper for ImagingStudyMapper {
    fn name(&self) -> &'static str {
        "imaging_study"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["ImagingStudy"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let modality = resource
            .array_at("series")
            .iter()
            .find_map(|series| series.string_at("modality.code"));

        let image_type = resource.string_at("description").or_else(|| {
            resource
                .array_at("procedureCode.0.coding")
                .iter()
                .find_map(|coding| coding.string_at("display"))
        });

        content.push(CanonicalEntity::ImagingReport(ImagingReport {
            report_id: resource.string_at("id"),
            image_type,
            coding_method: Some(DICOM.to_owned()),
            ordering_provider_id: resource.at("referrer").and_then(extract_reference_id),
            performing_facility: resource.at("location").and_then(extract_reference_id),
            modality,
            acquisition_date: resource.string_at("started"),
            findings: Vec::new(),
            narrative: resource.string_at("note.0.text"),
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
        }));
    }
}
