//! DiagnosticReport mapping.
//!
//! Unlike observations, every report lands somewhere: reports the classifier cannot place
//! become a generic [`DiagnosticTest`]. Result detail is read from the report's `contained`
//! Observations.

use crate::cache::ReferenceCache;
use crate::classification::{Classifier, ClinicalFamily};
use crate::extractors::{get_code, get_display, get_system};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{
    BloodBankFinding, BloodBankReport, CanonicalEntity, ClinicalContent, DiagnosticTest,
    ImagingFinding, ImagingReport, LabObservation, LabReport, MicrobiologyOrganism,
    MicrobiologyReport, MicrobiologySensitivity, PathologyFinding, PathologyReport,
};
use serde_json::Value;
use std::sync::Arc;

/// Interpretation codes kept as-is; anything else normalises to `N`.
const ABNORMAL_FLAGS: &[&str] = &["H", "L", "HH", "LL", "A", "N", "U"];

pub struct DiagnosticReportMapper {
    classifier: Arc<Classifier>,
}

impl DiagnosticReportMapper {
    pub fn new(classifier: Arc<Classifier>) -> Self {
        Self { classifier }
    }
}

/// Ids every report family shares.
struct Links {
    patient_id: Option<String>,
    encounter_id: Option<String>,
}

impl ResourceMapper for DiagnosticReportMapper {
    fn name(&self) -> &'static str {
        "diagnostic_report"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["DiagnosticReport"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let family = self.classifier.classify_report(resource);
        let links = Links {
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
        };
        tracing::debug!(
            id = resource.str_at("id").unwrap_or("<none>"),
            family = %family,
            "diagnostic report classified"
        );

        let entity = match family {
            ClinicalFamily::Laboratory => CanonicalEntity::LabReport(lab_report(resource, links)),
            ClinicalFamily::Imaging => {
                CanonicalEntity::ImagingReport(imaging_report(resource, links))
            }
            ClinicalFamily::Pathology => {
                CanonicalEntity::PathologyReport(pathology_report(resource, links))
            }
            ClinicalFamily::Microbiology => {
                CanonicalEntity::MicrobiologyReport(microbiology_report(resource, links))
            }
            ClinicalFamily::BloodBank => {
                CanonicalEntity::BloodBankReport(blood_bank_report(resource, links))
            }
            ClinicalFamily::Cardiology => {
                let findings = contained_observations(resource)
                    .next()
                    .and_then(|obs| obs.string_at("valueString"));
                CanonicalEntity::DiagnosticTest(diagnostic_test(resource, links, findings))
            }
            // Vital signs have no report form.
            ClinicalFamily::VitalSigns | ClinicalFamily::Diagnostic => {
                CanonicalEntity::DiagnosticTest(diagnostic_test(resource, links, None))
            }
        };
        content.push(entity);
    }
}

// ============================================================================
// Families
// ============================================================================

fn lab_report(resource: &Value, links: Links) -> LabReport {
    let observations: Vec<LabObservation> = resource
        .array_at("result")
        .iter()
        .filter_map(|result| result.str_at("reference"))
        .filter_map(|reference| contained_by_id(resource, reference.trim_start_matches('#')))
        .map(lab_observation)
        .collect();

    LabReport {
        report_id: resource.string_at("id"),
        code: get_code(resource),
        coding_method: get_system(resource),
        panel_name: resource.string_at("code.text"),
        panel_code: get_code(resource),
        panel_code_method: get_system(resource),
        is_panel: Some(observations.len() > 1),
        report_type: resource.string_at("category.0.coding.0.code"),
        collection_date: resource.string_at("effectiveDateTime"),
        observations,
        note: resource.string_at("conclusion"),
        patient_id: links.patient_id,
        encounter_id: links.encounter_id,
        ..Default::default()
    }
}

fn lab_observation(observation: &Value) -> LabObservation {
    let label = observation
        .string_at("code.text")
        .or_else(|| get_display(observation));
    LabObservation {
        code: get_code(observation),
        coding_method: get_system(observation),
        name: label.clone(),
        description: label,
        value: observation
            .text_at("valueQuantity.value")
            .or_else(|| observation.string_at("valueString")),
        unit: observation.string_at("valueQuantity.unit"),
        reference_range: observation.at("referenceRange.0").and_then(reference_range),
        abnormal_flag: Some(abnormal_flag(observation)),
        result_date: observation.string_at("effectiveDateTime"),
    }
}

fn imaging_report(resource: &Value, links: Links) -> ImagingReport {
    let finding = ImagingFinding {
        code: get_code(resource),
        coding_method: get_system(resource),
        description: resource.string_at("conclusion"),
        impression: None,
        abnormal_flag: None,
        result_date: resource.string_at("effectiveDateTime"),
    };

    ImagingReport {
        report_id: resource.string_at("id"),
        image_type: resource.string_at("code.text"),
        coding_method: get_system(resource),
        modality: resource.string_at("modality.coding.0.code"),
        acquisition_date: resource.string_at("effectiveDateTime"),
        findings: vec![finding],
        narrative: resource.string_at("text.div"),
        patient_id: links.patient_id,
        encounter_id: links.encounter_id,
        ..Default::default()
    }
}

fn pathology_report(resource: &Value, links: Links) -> PathologyReport {
    let mut findings: Vec<PathologyFinding> = contained_observations(resource)
        .map(|obs| PathologyFinding {
            code: get_code(obs),
            coding_method: get_system(obs),
            description: obs
                .string_at("valueString")
                .or_else(|| obs.string_at("code.text")),
            comment: obs.string_at("note.0.text"),
        })
        .collect();

    if findings.is_empty() {
        findings.push(PathologyFinding {
            code: get_code(resource),
            coding_method: get_system(resource),
            description: resource.string_at("conclusion"),
            comment: None,
        });
    }

    PathologyReport {
        report_id: resource.string_at("id"),
        patient_id: links.patient_id,
        encounter_id: links.encounter_id,
        test_name: resource.string_at("code.text"),
        specimen: resource.string_at("bodySite.text"),
        procedure: resource.string_at("code.text"),
        report_date: resource.string_at("effectiveDateTime"),
        findings,
        diagnosis: resource.string_at("conclusion"),
        narrative: resource.string_at("text.div"),
        ..Default::default()
    }
}

fn microbiology_report(resource: &Value, links: Links) -> MicrobiologyReport {
    let organisms = contained_observations(resource)
        .filter(|obs| obs.at("valueCodeableConcept").is_some())
        .map(organism)
        .collect();

    MicrobiologyReport {
        report_id: resource.string_at("id"),
        patient_id: links.patient_id,
        encounter_id: links.encounter_id,
        collection_date: resource.string_at("effectiveDateTime"),
        result_date: resource
            .string_at("issued")
            .or_else(|| resource.string_at("effectiveDateTime")),
        source_site: resource.string_at("bodySite.text"),
        organisms,
        comment: resource.string_at("conclusion"),
    }
}

/// An isolate: the organism is the coded value, each component one antibiotic result.
fn organism(observation: &Value) -> MicrobiologyOrganism {
    let sensitivities = observation
        .array_at("component")
        .iter()
        .map(|component| MicrobiologySensitivity {
            antibiotic_code: get_code(component),
            coding_method: get_system(component),
            antibiotic_name: get_display(component),
            mic: component.text_at("valueQuantity.value").map(|value| {
                match component.str_at("valueQuantity.unit") {
                    Some(unit) => format!("{value} {unit}"),
                    None => value,
                }
            }),
            interpretation: component
                .string_at("interpretation.0.coding.0.code")
                .or_else(|| component.string_at("valueCodeableConcept.coding.0.code")),
        })
        .collect();

    MicrobiologyOrganism {
        organism_code: observation.string_at("valueCodeableConcept.coding.0.code"),
        coding_method: observation.string_at("valueCodeableConcept.coding.0.system"),
        organism_name: observation
            .string_at("valueCodeableConcept.text")
            .or_else(|| observation.string_at("valueCodeableConcept.coding.0.display")),
        colony_count: observation.string_at("note.0.text"),
        sensitivities,
    }
}

fn blood_bank_report(resource: &Value, links: Links) -> BloodBankReport {
    let findings = contained_observations(resource)
        .map(|obs| BloodBankFinding {
            code: get_code(obs),
            coding_method: get_system(obs),
            test_name: obs.string_at("code.text"),
            result: obs.string_at("valueString"),
            interpretation: obs.string_at("interpretation.0.text"),
            comment: obs.string_at("note.0.text"),
        })
        .collect();

    BloodBankReport {
        report_id: resource.string_at("id"),
        collection_date: resource.string_at("effectiveDateTime"),
        result_date: resource.string_at("effectiveDateTime"),
        findings,
        comment: resource.string_at("conclusion"),
        patient_id: links.patient_id,
        encounter_id: links.encounter_id,
    }
}

fn diagnostic_test(resource: &Value, links: Links, findings: Option<String>) -> DiagnosticTest {
    DiagnosticTest {
        test_id: resource.string_at("id"),
        test_type: resource.string_at("code.text"),
        code: get_code(resource),
        coding_method: get_system(resource),
        result_date: resource.string_at("effectiveDateTime"),
        result_summary: resource.string_at("conclusion"),
        findings,
        patient_id: links.patient_id,
        encounter_id: links.encounter_id,
        ..Default::default()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn contained_observations(resource: &Value) -> impl Iterator<Item = &Value> {
    resource
        .array_at("contained")
        .iter()
        .filter(|c| c.str_at("resourceType") == Some("Observation"))
}

fn contained_by_id<'a>(resource: &'a Value, id: &str) -> Option<&'a Value> {
    contained_observations(resource).find(|c| c.str_at("id") == Some(id))
}

/// `low - high unit`, `>= low unit` or `<= high unit`.
fn reference_range(range: &Value) -> Option<String> {
    let low = range.text_at("low.value");
    let high = range.text_at("high.value");
    let unit = range
        .str_at("low.unit")
        .or_else(|| range.str_at("high.unit"))
        .unwrap_or_default();

    let text = match (low, high) {
        (Some(low), Some(high)) => format!("{low} - {high} {unit}"),
        (Some(low), None) => format!(">= {low} {unit}"),
        (None, Some(high)) => format!("<= {high} {unit}"),
        (None, None) => return None,
    };
    Some(text.trim_end().to_owned())
}

/// Upper-cased first interpretation code when recognised, otherwise `N`.
fn abnormal_flag(observation: &Value) -> String {
    let code = observation
        .str_at("interpretation.0.coding.0.code")
        .unwrap_or_default()
        .to_uppercase();
    if ABNORMAL_FLAGS.contains(&code.as_str()) {
        code
    } else {
        "N".to_owned()
    }
}
