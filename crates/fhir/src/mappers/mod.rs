//! Per-resource mappers.
//!
//! One mapper per supported resource type. Each resolves patient and encounter ids (own
//! reference first, then the reference cache), extracts its fields through
//! [`crate::value::ValueExt`] and [`crate::extractors`], and pushes the finished entity into the
//! aggregate. Condition has two mappers on purpose: the diagnosis mapper and the problem-list
//! mapper each decide independently whether the resource is theirs.

mod allergy;
mod appointment;
mod care_plan;
mod care_team;
mod claim;
mod condition;
mod device;
mod diagnostic_report;
mod document_reference;
mod encounter;
mod explanation_of_benefit;
mod imaging_study;
mod immunization;
mod location;
mod medication;
mod medication_administration;
mod observation;
mod organization;
mod patient;
mod practitioner;
mod practitioner_role;
mod procedure;
mod provenance;
mod supply_delivery;

pub use allergy::AllergyMapper;
pub use appointment::AppointmentMapper;
pub use care_plan::CarePlanMapper;
pub use care_team::CareTeamMapper;
pub use claim::ClaimMapper;
pub use condition::{DiagnosisMapper, ProblemListMapper};
pub use device::DeviceMapper;
pub use diagnostic_report::DiagnosticReportMapper;
pub use document_reference::DocumentReferenceMapper;
pub use encounter::EncounterMapper;
pub use explanation_of_benefit::ExplanationOfBenefitMapper;
pub use imaging_study::ImagingStudyMapper;
pub use immunization::ImmunizationMapper;
pub use location::LocationMapper;
pub use medication::{MedicationMapper, MedicationRequestMapper, MedicationStatementMapper};
pub use medication_administration::MedicationAdministrationMapper;
pub use observation::ObservationMapper;
pub use organization::OrganizationMapper;
pub use patient::PatientMapper;
pub use practitioner::PractitionerMapper;
pub use practitioner_role::PractitionerRoleMapper;
pub use procedure::ProcedureMapper;
pub use provenance::ProvenanceMapper;
pub use supply_delivery::SupplyDeliveryMapper;

use crate::classification::Classifier;
use crate::dates::current_year;
use crate::registry::ResourceMapper;
use std::sync::Arc;

/// The standard mapper set, in registration order.
pub(crate) fn standard_mappers(classifier: Arc<Classifier>) -> Vec<Box<dyn ResourceMapper>> {
    vec![
        Box::new(PatientMapper::new(current_year())),
        Box::new(EncounterMapper),
        Box::new(AllergyMapper),
        Box::new(ImmunizationMapper),
        Box::new(DiagnosisMapper),
        Box::new(ProblemListMapper),
        Box::new(ObservationMapper::new(Arc::clone(&classifier))),
        Box::new(DiagnosticReportMapper::new(classifier)),
        Box::new(ImagingStudyMapper),
        Box::new(ProcedureMapper),
        Box::new(MedicationStatementMapper),
        Box::new(MedicationMapper),
        Box::new(MedicationRequestMapper),
        Box::new(MedicationAdministrationMapper),
        Box::new(DeviceMapper),
        Box::new(DocumentReferenceMapper),
        Box::new(SupplyDeliveryMapper),
        Box::new(CarePlanMapper),
        Box::new(CareTeamMapper),
        Box::new(ProvenanceMapper),
        Box::new(LocationMapper),
        Box::new(OrganizationMapper),
        Box::new(PractitionerMapper),
        Box::new(PractitionerRoleMapper),
        Box::new(AppointmentMapper),
        Box::new(ClaimMapper),
        Box::new(ExplanationOfBenefitMapper),
    ]
}
