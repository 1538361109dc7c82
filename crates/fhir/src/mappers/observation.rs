//! Observation mapping.
//!
//! The classifier routes each observation to one family. Vital signs fan out one entity per
//! `component`; laboratory, imaging and microbiology observations each become a single-result
//! report. Anything the classifier cannot place is dropped.

use crate::cache::ReferenceCache;
use crate::classification::{Classifier, ClinicalFamily};
use crate::extractors::{get_code, get_display, get_system, joined_notes};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{
    CanonicalEntity, ClinicalContent, ImagingFinding, ImagingReport, LabObservation, LabReport,
    MicrobiologyReport, VitalSign,
};
use serde_json::Value;
use std::sync::Arc;

pub struct ObservationMapper {
    classifier: Arc<Classifier>,
}

impl ObservationMapper {
    pub fn new(classifier: Arc<Classifier>) -> Self {
        Self { classifier }
    }
}

impl ResourceMapper for ObservationMapper {
    fn name(&self) -> &'static str {
        "observation"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Observation"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let Some(family) = self.classifier.classify_observation(resource) else {
            tracing::debug!(
                id = resource.str_at("id").unwrap_or("<none>"),
                "unclassified observation dropped"
            );
            return;
        };

        let patient_id = cache.resolve_patient_id(resource);
        let encounter_id = cache.resolve_encounter_id(resource);

        match family {
            ClinicalFamily::VitalSigns => {
                for vital in vital_signs(resource, patient_id, encounter_id) {
                    content.push(CanonicalEntity::VitalSign(vital));
                }
            }
            ClinicalFamily::Laboratory => content.push(CanonicalEntity::LabReport(LabReport {
                report_id: resource.string_at("id"),
                code: get_code(resource),
                coding_method: get_system(resource),
                panel_name: resource.string_at("code.text"),
                collection_date: resource.string_at("effectiveDateTime"),
                observations: vec![simple_lab_observation(resource)],
                note: resource.string_at("text.div"),
                patient_id,
                encounter_id,
                ..Default::default()
            })),
            ClinicalFamily::Imaging => {
                content.push(CanonicalEntity::ImagingReport(ImagingReport {
                    report_id: resource.string_at("id"),
                    image_type: resource.string_at("code.text"),
                    coding_method: get_system(resource),
                    modality: resource.string_at("modality.coding.0.code"),
                    acquisition_date: resource.string_at("effectiveDateTime"),
                    findings: vec![simple_imaging_finding(resource)],
                    narrative: resource.string_at("text.div"),
                    patient_id,
                    encounter_id,
                    ..Default::default()
                }))
            }
            ClinicalFamily::Microbiology => {
                content.push(CanonicalEntity::MicrobiologyReport(MicrobiologyReport {
                    report_id: resource.string_at("id"),
                    patient_id,
                    encounter_id,
                    collection_date: resource.string_at("effectiveDateTime"),
                    result_date: resource
                        .string_at("issued")
                        .or_else(|| resource.string_at("effectiveDateTime")),
                    source_site: resource.string_at("bodySite.text"),
                    organisms: Vec::new(),
                    comment: resource
                        .string_at("valueString")
                        .or_else(|| joined_notes(resource, "\n")),
                }))
            }
            other => {
                tracing::debug!(
                    id = resource.str_at("id").unwrap_or("<none>"),
                    family = %other,
                    "observation family has no observation form; dropped"
                );
            }
        }
    }
}

/// One vital sign per `component`, or one for the resource itself when it has none.
fn vital_signs(
    resource: &Value,
    patient_id: Option<String>,
    encounter_id: Option<String>,
) -> Vec<VitalSign> {
    let timestamp = resource.string_at("effectiveDateTime");
    let build = |node: &Value| VitalSign {
        code: get_code(node),
        coding_method: get_system(node),
        display: get_display(node),
        value: node.f64_at("valueQuantity.value"),
        unit: node.string_at("valueQuantity.unit"),
        timestamp: timestamp.clone(),
        patient_id: patient_id.clone(),
        encounter_id: encounter_id.clone(),
    };

    let components = resource.array_at("component");
    if components.is_empty() {
        vec![build(resource)]
    } else {
        components.iter().map(build).collect()
    }
}

fn simple_lab_observation(resource: &Value) -> LabObservation {
    LabObservation {
        code: get_code(resource),
        coding_method: get_system(resource),
        name: resource.string_at("code.text"),
        description: resource.string_at("code.text"),
        value: resource
            .text_at("valueQuantity.value")
            .or_else(|| resource.string_at("valueString")),
        unit: resource.string_at("valueQuantity.unit"),
        reference_range: None,
        abnormal_flag: resource.string_at("interpretation.0.coding.0.code"),
        result_date: resource.string_at("effectiveDateTime"),
    }
}

fn simple_imaging_finding(resource: &Value) -> ImagingFinding {
    ImagingFinding {
        code: get_code(resource),
        coding_method: get_system(resource),
        description: get_display(resource),
        impression: resource.string_at("valueString"),
        abnormal_flag: resource.string_at("interpretation.0.coding.0.code"),
        result_date: resource.string_at("effectiveDateTime"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ClassificationOverrides;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    fn mapper() -> ObservationMapper {
        ObservationMapper::new(Arc::new(Classifier::default()))
    }

    fn observation(category: &str) -> Value {
        json!({
            "resourceType": "Observation",
            "id": "obs-1",
            "category": [{"coding": [{"code": category}]}],
            "code": {"text": "Hemoglobin", "coding": [{"system": "http://loinc.org", "code": "718-7"}]},
            "valueQuantity": {"value": 13.5, "unit": "g/dL"},
            "effectiveDateTime": "2024-02-01T09:00:00Z",
            "subject": {"reference": "Patient/p1"}
        })
    }

    #[test]
    fn blood_pressure_components_become_separate_vitals() {
        let resource = json!({
            "resourceType": "Observation",
            "category": [{"coding": [{"code": "vital-signs"}]}],
            "effectiveDateTime": "2024-02-01T09:00:00Z",
            "component": [
                {"code": {"coding": [{"code": "8480-6", "display": "Systolic"}]}, "valueQuantity": {"value": 120, "unit": "mmHg"}},
                {"code": {"coding": [{"code": "8462-4", "display": "Diastolic"}]}, "valueQuantity": {"value": 80, "unit": "mmHg"}}
            ]
        });
        let content = map_one(&mapper(), &resource);

        assert_eq!(content.vital_signs.len(), 2);
        assert_eq!(content.vital_signs[0].code.as_deref(), Some("8480-6"));
        assert_eq!(content.vital_signs[0].value, Some(120.0));
        assert_eq!(content.vital_signs[1].display.as_deref(), Some("Diastolic"));
        assert_eq!(
            content.vital_signs[1].timestamp.as_deref(),
            Some("2024-02-01T09:00:00Z")
        );
    }

    #[test]
    fn laboratory_observation_becomes_single_result_report() {
        let content = map_one(&mapper(), &observation("laboratory"));

        let report = &content.lab[0];
        assert_eq!(report.report_id.as_deref(), Some("obs-1"));
        assert_eq!(report.patient_id.as_deref(), Some("p1"));
        assert_eq!(report.observations.len(), 1);
        assert_eq!(report.observations[0].value.as_deref(), Some("13.5"));
        assert_eq!(report.observations[0].unit.as_deref(), Some("g/dL"));
    }

    #[test]
    fn unclassified_observation_is_dropped() {
        let content = map_one(&mapper(), &observation("social-history"));
        assert!(content.is_empty());
    }

    #[test]
    fn loinc_override_classifies_uncategorised_observation() {
        let overrides = ClassificationOverrides::from_yaml_str("overrides:\n  loinc:\n    718-7: lab\n")
            .expect("override table");
        let mapper = ObservationMapper::new(Arc::new(Classifier::new(overrides)));

        let mut resource = observation("social-history");
        resource["category"] = json!([]);
        let content = map_one(&mapper, &resource);

        assert_eq!(content.lab.len(), 1);
    }
}
