//! Patient demographics.
//!
//! Only HIPAA-retainable demographics are carried: birth year (withheld for patients aged 90
//! and over), gender, a coarse geographic area and internal identifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Communication preferences declared on a patient record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatientPreferences {
    pub preferred_language: Option<String>,
    pub communication_method: Option<String>,
    pub requires_interpreter: Option<bool>,
    pub preferred_contact_time: Option<String>,
    pub notes: Option<String>,
}

/// Demographic core of a clinical record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Patient {
    pub id: Option<String>,
    /// Birth year, present only when the patient is younger than 90.
    pub dob_year: Option<i32>,
    pub over_90: bool,
    pub gender: Option<String>,
    /// State or country; never a full address.
    pub geographic_area: Option<String>,
    /// Identifier system to value.
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
    #[serde(default)]
    pub preferences: Vec<PatientPreferences>,
}

impl Patient {
    /// Age band used in human-readable summaries, relative to `current_year`.
    pub fn age_label(&self, current_year: i32) -> Option<String> {
        if self.over_90 {
            return Some("90+ years".into());
        }
        self.dob_year
            .map(|year| format!("{} years", current_year - year))
    }
}
