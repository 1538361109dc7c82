//! Diagnostic report families.
//!
//! A single source report type fans out into one of these families depending on its coded
//! category: laboratory, imaging, pathology, microbiology, blood bank, or the generic
//! [`DiagnosticTest`] used for everything unclassified (cardiology included).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabObservation {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Numeric results are rendered as text so qualitative results fit the same field.
    pub value: Option<String>,
    pub unit: Option<String>,
    /// Rendered range, e.g. `"4.0 - 11.0 10*3/uL"` or `">= 60"`.
    pub reference_range: Option<String>,
    /// One of `H`, `L`, `HH`, `LL`, `A`, `N`, `U`.
    pub abnormal_flag: Option<String>,
    pub result_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabReport {
    pub report_id: Option<String>,
    pub lab_type: Option<String>,
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub panel_name: Option<String>,
    pub panel_code: Option<String>,
    pub panel_code_method: Option<String>,
    pub is_panel: Option<bool>,
    pub ordering_provider_id: Option<String>,
    pub performing_lab: Option<String>,
    pub report_type: Option<String>,
    pub collection_date: Option<String>,
    #[serde(default)]
    pub observations: Vec<LabObservation>,
    pub note: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagingFinding {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub description: Option<String>,
    pub impression: Option<String>,
    pub abnormal_flag: Option<String>,
    pub result_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagingReport {
    pub report_id: Option<String>,
    pub image_type: Option<String>,
    pub coding_method: Option<String>,
    pub ordering_provider_id: Option<String>,
    pub performing_facility: Option<String>,
    pub modality: Option<String>,
    pub acquisition_date: Option<String>,
    #[serde(default)]
    pub findings: Vec<ImagingFinding>,
    pub narrative: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathologyFinding {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathologyReport {
    pub report_id: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    pub test_name: Option<String>,
    pub specimen: Option<String>,
    pub procedure: Option<String>,
    pub collection_date: Option<String>,
    pub report_date: Option<String>,
    pub performing_lab: Option<String>,
    pub ordering_provider_id: Option<String>,
    #[serde(default)]
    pub findings: Vec<PathologyFinding>,
    pub diagnosis: Option<String>,
    pub staging: Option<String>,
    pub grade: Option<String>,
    pub narrative: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MicrobiologySensitivity {
    pub antibiotic_code: Option<String>,
    pub coding_method: Option<String>,
    pub antibiotic_name: Option<String>,
    /// Minimum inhibitory concentration, rendered with its unit.
    pub mic: Option<String>,
    /// `S`, `I` or `R`.
    pub interpretation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MicrobiologyOrganism {
    pub organism_code: Option<String>,
    pub coding_method: Option<String>,
    pub organism_name: Option<String>,
    pub colony_count: Option<String>,
    #[serde(default)]
    pub sensitivities: Vec<MicrobiologySensitivity>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MicrobiologyReport {
    pub report_id: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    pub collection_date: Option<String>,
    pub result_date: Option<String>,
    /// Specimen source, e.g. blood, urine, sputum.
    pub source_site: Option<String>,
    #[serde(default)]
    pub organisms: Vec<MicrobiologyOrganism>,
    pub comment: Option<String>,
}

/// ABO typing, Rh factor, antibody screen or crossmatch result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BloodBankFinding {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub test_name: Option<String>,
    pub result: Option<String>,
    pub interpretation: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BloodBankReport {
    pub report_id: Option<String>,
    pub collection_date: Option<String>,
    pub result_date: Option<String>,
    #[serde(default)]
    pub findings: Vec<BloodBankFinding>,
    pub comment: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

/// Catch-all report (EKG, spirometry, EEG and anything without a recognised category).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagnosticTest {
    pub test_id: Option<String>,
    pub ordering_provider_id: Option<String>,
    pub performing_facility: Option<String>,
    pub test_type: Option<String>,
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub result_date: Option<String>,
    pub result_summary: Option<String>,
    pub findings: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}
