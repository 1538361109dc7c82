//! Directory resources: organisations, locations, practitioners and their roles.
//!
//! These carry no patient link; they are reference data that travelled with a document.

use crate::Timestamp;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganizationContact {
    pub purpose: Option<String>,
    pub name: Option<String>,
    pub telecom: Option<String>,
    #[serde(default)]
    pub address_line: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Organization {
    pub id: Option<String>,
    pub active: Option<bool>,
    pub name: Option<String>,
    #[serde(default)]
    pub alias: Vec<String>,
    pub org_type: Option<String>,
    pub type_code: Option<String>,
    pub type_system: Option<String>,
    #[serde(default)]
    pub address_line: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    /// Parent organisation id.
    pub part_of: Option<String>,
    /// Phone numbers, emails and URLs, values only.
    #[serde(default)]
    pub telecom: Vec<String>,
    #[serde(default)]
    pub contacts: Vec<OrganizationContact>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationPosition {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub altitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub id: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// `instance` or `kind`.
    pub mode: Option<String>,
    pub location_type: Option<String>,
    pub type_code: Option<String>,
    pub type_system: Option<String>,
    pub physical_type: Option<String>,
    pub physical_type_code: Option<String>,
    pub physical_type_system: Option<String>,
    #[serde(default)]
    pub address_line: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub position: Option<LocationPosition>,
    pub managing_organization: Option<String>,
    pub part_of: Option<String>,
    pub operational_status: Option<String>,
    #[serde(default)]
    pub alias: Vec<String>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PractitionerQualification {
    pub code: Option<String>,
    pub code_system: Option<String>,
    pub display: Option<String>,
    pub issuer: Option<String>,
    pub identifier: Option<String>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Practitioner {
    pub id: Option<String>,
    pub active: Option<bool>,
    pub name_prefix: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub name_suffix: Option<String>,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address_line: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub telecom: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<PractitionerQualification>,
    #[serde(default)]
    pub communication_languages: Vec<String>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvailableTime {
    #[serde(default)]
    pub days_of_week: Vec<String>,
    pub all_day: Option<bool>,
    pub available_start_time: Option<String>,
    pub available_end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotAvailable {
    pub description: Option<String>,
    pub during_start: Option<Timestamp>,
    pub during_end: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PractitionerRole {
    pub id: Option<String>,
    pub active: Option<bool>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
    pub practitioner_id: Option<String>,
    pub organization_id: Option<String>,
    pub code: Option<String>,
    pub code_system: Option<String>,
    #[serde(default)]
    pub specialty: Vec<String>,
    #[serde(default)]
    pub specialty_codes: Vec<String>,
    pub specialty_system: Option<String>,
    #[serde(default)]
    pub location_ids: Vec<String>,
    #[serde(default)]
    pub healthcare_service_ids: Vec<String>,
    #[serde(default)]
    pub telecom: Vec<String>,
    #[serde(default)]
    pub available_time: Vec<AvailableTime>,
    #[serde(default)]
    pub not_available: Vec<NotAvailable>,
    pub availability_exceptions: Option<String>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}
