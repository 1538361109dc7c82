//! Encounters and the providers attached to them.

use serde::{Deserialize, Serialize};

/// A provider who took part in an encounter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EncounterProvider {
    pub id: Option<String>,
    pub type_code: Option<String>,
    pub coding_method: Option<String>,
    pub name: Option<String>,
    pub specialty: Option<String>,
}

/// An admission, visit or other clinical contact.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Encounter {
    pub id: Option<String>,
    pub admit_date: Option<String>,
    pub discharge_date: Option<String>,
    pub encounter_type: Option<String>,
    pub type_coding_method: Option<String>,
    pub location: Option<String>,
    pub reason_code: Option<String>,
    pub reason_coding_method: Option<String>,
    #[serde(default)]
    pub providers: Vec<EncounterProvider>,
    /// Encounter class code, e.g. `IMP` or `AMB`.
    pub visit_type: Option<String>,
    pub status: Option<String>,
    pub patient_id: Option<String>,
}
