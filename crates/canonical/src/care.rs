//! Care coordination and supporting records: care plans, care teams, devices, documents,
//! supply deliveries, provenance and appointments.

use crate::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CarePlanActivity {
    pub id: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub code_system: Option<String>,
    pub detail_status: Option<String>,
    pub detail_description: Option<String>,
    pub detail_code: Option<String>,
    pub detail_code_system: Option<String>,
    pub category: Option<String>,
    pub category_code: Option<String>,
    pub category_system: Option<String>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
    pub location: Option<String>,
    pub performer: Option<String>,
    /// Referenced resource type of the performer, e.g. `Practitioner`.
    pub performer_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CarePlan {
    pub id: Option<String>,
    pub status: Option<String>,
    pub intent: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
    pub created: Option<Timestamp>,
    pub author: Option<String>,
    pub author_type: Option<String>,
    pub category: Option<String>,
    pub category_code: Option<String>,
    pub category_system: Option<String>,
    pub care_team_id: Option<String>,
    /// Conditions addressed by the plan.
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Related plans (`basedOn` and `replaces`).
    #[serde(default)]
    pub supports: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub activities: Vec<CarePlanActivity>,
    pub notes: Option<String>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CareTeamParticipant {
    pub id: Option<String>,
    pub role: Option<String>,
    pub role_code: Option<String>,
    pub role_system: Option<String>,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub member_type: Option<String>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
    pub on_behalf_of: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CareTeam {
    pub id: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
    pub category: Option<String>,
    pub category_code: Option<String>,
    pub category_system: Option<String>,
    pub reason: Option<String>,
    pub reason_code: Option<String>,
    pub reason_system: Option<String>,
    pub managing_organization: Option<String>,
    #[serde(default)]
    pub participants: Vec<CareTeamParticipant>,
    pub notes: Option<String>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceProperty {
    pub property_type: Option<String>,
    pub property_value: Option<String>,
    pub property_unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Device {
    pub device_id: Option<String>,
    pub device_type: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub lot_number: Option<String>,
    pub expiration_date: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub safety_info: Option<String>,
    #[serde(default)]
    pub properties: Vec<DeviceProperty>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentAuthor {
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub author_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentReference {
    pub document_id: Option<String>,
    pub title: Option<String>,
    pub document_type: Option<String>,
    pub document_class: Option<String>,
    pub status: Option<String>,
    pub format: Option<String>,
    pub creation_date: Option<String>,
    pub last_modified_date: Option<String>,
    pub security_label: Option<String>,
    pub content_type: Option<String>,
    /// Inline content, decoded to plain text when it was base64 or hex encoded.
    pub content: Option<String>,
    pub content_url: Option<String>,
    #[serde(default)]
    pub authors: Vec<DocumentAuthor>,
    #[serde(default)]
    pub related_encounters: Vec<String>,
    pub patient_id: Option<String>,
    pub facility: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplyDeliveryItem {
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub coding_method: Option<String>,
    pub quantity: Option<String>,
    pub quantity_unit: Option<String>,
    pub lot_number: Option<String>,
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplyDelivery {
    pub delivery_id: Option<String>,
    pub status: Option<String>,
    pub delivery_type: Option<String>,
    pub delivered_on: Option<String>,
    pub destination: Option<String>,
    pub supplier: Option<String>,
    #[serde(default)]
    pub items: Vec<SupplyDeliveryItem>,
    pub notes: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProvenanceAgent {
    pub id: Option<String>,
    pub agent_type: Option<String>,
    pub role: Option<String>,
    pub role_code: Option<String>,
    pub role_system: Option<String>,
    pub name: Option<String>,
    pub on_behalf_of: Option<String>,
    pub on_behalf_of_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProvenanceEntity {
    pub id: Option<String>,
    /// `derivation`, `revision`, `source`, ...
    pub role: Option<String>,
    pub entity_type: Option<String>,
    pub reference: Option<String>,
    pub description: Option<String>,
}

/// Signature metadata; the signature payload itself is not retained.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProvenanceSignature {
    pub signature_type: Option<String>,
    pub when: Option<String>,
    pub who: Option<String>,
    pub target_format: Option<String>,
    pub sig_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Provenance {
    pub id: Option<String>,
    pub target_id: Option<String>,
    pub target_type: Option<String>,
    pub occurred_start: Option<Timestamp>,
    pub occurred_end: Option<Timestamp>,
    pub recorded: Option<Timestamp>,
    pub policy: Option<String>,
    pub location: Option<String>,
    pub reason: Option<String>,
    pub reason_code: Option<String>,
    pub reason_system: Option<String>,
    pub activity: Option<String>,
    pub activity_code: Option<String>,
    pub activity_system: Option<String>,
    #[serde(default)]
    pub agents: Vec<ProvenanceAgent>,
    #[serde(default)]
    pub entities: Vec<ProvenanceEntity>,
    #[serde(default)]
    pub signatures: Vec<ProvenanceSignature>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppointmentParticipant {
    pub id: Option<String>,
    /// Referenced actor type, e.g. `Practitioner` or `Location`.
    pub participant_type: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub role_code: Option<String>,
    pub role_system: Option<String>,
    pub status: Option<String>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Option<String>,
    pub status: Option<String>,
    pub service_category: Option<String>,
    pub service_category_code: Option<String>,
    pub service_category_system: Option<String>,
    pub service_type: Option<String>,
    pub service_type_code: Option<String>,
    pub service_type_system: Option<String>,
    pub specialty: Option<String>,
    pub specialty_code: Option<String>,
    pub specialty_system: Option<String>,
    pub appointment_type: Option<String>,
    pub appointment_type_code: Option<String>,
    pub appointment_type_system: Option<String>,
    pub reason: Option<String>,
    pub reason_code: Option<String>,
    pub reason_system: Option<String>,
    pub priority: Option<i64>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub created: Option<String>,
    pub comment: Option<String>,
    pub patient_instruction: Option<String>,
    pub canceled_reason: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub participants: Vec<AppointmentParticipant>,
    pub requested_period_start: Option<String>,
    pub requested_period_end: Option<String>,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}
