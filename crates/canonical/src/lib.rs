//! Canonical clinical record model.
//!
//! Every source format is normalised into the types in this crate. A mapping pass produces one
//! [`ClinicalContent`] aggregate per document; downstream stages (de-identification, chunking,
//! embedding, persistence) consume it by value.
//!
//! Conventions:
//! - every scalar is optional; a missing value in the source stays `None`
//! - `patient_id` / `encounter_id` are weak lookup keys and are never validated
//! - list fields default to empty and keep insertion order
//! - identifier maps are ordered (`BTreeMap`) so serialised output is stable

pub mod billing;
pub mod care;
pub mod clinical;
pub mod content;
pub mod diagnostics;
pub mod directory;
pub mod encounter;
pub mod entity;
pub mod patient;

pub use billing::{
    Adjustment, Charge, ChargeStatus, Claim, ClaimStatus, ClaimType, Payment, PaymentType,
};
pub use care::{
    Appointment, AppointmentParticipant, CarePlan, CarePlanActivity, CareTeam,
    CareTeamParticipant, Device, DeviceProperty, DocumentAuthor, DocumentReference, Provenance,
    ProvenanceAgent, ProvenanceEntity, ProvenanceSignature, SupplyDelivery, SupplyDeliveryItem,
};
pub use clinical::{
    Allergy, Diagnosis, Immunization, Medication, MedicationAdministration, Problem, Procedure,
    ProcedureProvider, VitalSign,
};
pub use content::ClinicalContent;
pub use diagnostics::{
    BloodBankFinding, BloodBankReport, DiagnosticTest, ImagingFinding, ImagingReport,
    LabObservation, LabReport, MicrobiologyOrganism, MicrobiologyReport,
    MicrobiologySensitivity, PathologyFinding, PathologyReport,
};
pub use directory::{
    AvailableTime, Location, LocationPosition, NotAvailable, Organization, OrganizationContact,
    Practitioner, PractitionerQualification, PractitionerRole,
};
pub use encounter::{Encounter, EncounterProvider};
pub use entity::{CanonicalEntity, EntityFamily};
pub use patient::{Patient, PatientPreferences};

/// Date-time type used for scalars that are parsed during mapping.
pub type Timestamp = chrono::DateTime<chrono::FixedOffset>;
