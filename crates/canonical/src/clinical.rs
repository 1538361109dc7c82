//! Point-of-care clinical entities: vitals, allergies, immunizations, problems, diagnoses,
//! procedures and medications.

use serde::{Deserialize, Serialize};

/// One physiological measurement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VitalSign {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub display: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub timestamp: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

/// An allergy or intolerance.
///
/// An inactive record maps to a substance of `"No Known Allergies"` so that a documented
/// absence is distinguishable from an undocumented one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Allergy {
    pub substance: Option<String>,
    pub coding_method: Option<String>,
    pub reaction: Option<String>,
    pub severity: Option<String>,
    pub onset: Option<String>,
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Immunization {
    pub vaccine_code: Option<String>,
    pub coding_method: Option<String>,
    pub description: Option<String>,
    pub date_administered: Option<String>,
    pub status: Option<String>,
    pub lot_number: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

/// A long-running condition on the patient's problem list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Problem {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub description: Option<String>,
    pub onset_date: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

/// An encounter-scoped diagnosis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnosis {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub description: Option<String>,
    pub onset_date: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcedureProvider {
    pub provider_id: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Procedure {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub description: Option<String>,
    pub performed_date: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub providers: Vec<ProcedureProvider>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

/// A prescribed or self-reported medication (intent, not administration).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Medication {
    pub code: Option<String>,
    pub coding_method: Option<String>,
    pub name: Option<String>,
    pub dose: Option<String>,
    pub route: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    pub notes: Option<String>,
}

/// A medication administration record (MAR) entry: one dose actually given.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MedicationAdministration {
    pub medication_code: Option<String>,
    pub coding_method: Option<String>,
    pub medication: Option<String>,
    pub dosage: Option<String>,
    pub route: Option<String>,
    pub frequency: Option<String>,
    pub administered_at: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}
