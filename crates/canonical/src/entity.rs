//! The canonical entity sum type.
//!
//! Mappers build one [`CanonicalEntity`] per output record and hand it to
//! [`crate::ClinicalContent::push`], which routes it to the matching slot or list. Adding a
//! family means adding a variant here; the compiler then points at every place that routes it.

use crate::{
    Allergy, Appointment, BloodBankReport, CarePlan, CareTeam, Claim, Device, Diagnosis,
    DiagnosticTest, DocumentReference, Encounter, ImagingReport, Immunization, LabReport,
    Location, Medication, MedicationAdministration, MicrobiologyReport, Organization,
    PathologyReport, Patient, Practitioner, PractitionerRole, Problem, Procedure, Provenance,
    SupplyDelivery, VitalSign,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", content = "entity", rename_all = "snake_case")]
pub enum CanonicalEntity {
    Patient(Patient),
    Encounter(Encounter),
    VitalSign(VitalSign),
    Allergy(Allergy),
    Immunization(Immunization),
    Diagnosis(Diagnosis),
    Problem(Problem),
    Procedure(Procedure),
    Medication(Medication),
    MedicationAdministration(MedicationAdministration),
    LabReport(LabReport),
    ImagingReport(ImagingReport),
    PathologyReport(PathologyReport),
    MicrobiologyReport(MicrobiologyReport),
    BloodBankReport(BloodBankReport),
    DiagnosticTest(DiagnosticTest),
    Device(Device),
    DocumentReference(DocumentReference),
    SupplyDelivery(SupplyDelivery),
    CarePlan(CarePlan),
    CareTeam(CareTeam),
    Provenance(Provenance),
    Location(Location),
    Organization(Organization),
    Practitioner(Practitioner),
    PractitionerRole(PractitionerRole),
    Appointment(Appointment),
    Claim(Claim),
}

/// Aggregate slot or list an entity lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityFamily {
    Patient,
    Encounter,
    VitalSigns,
    Allergies,
    Immunizations,
    Diagnoses,
    ProblemList,
    Procedures,
    Medications,
    Mar,
    Imaging,
    Lab,
    Pathology,
    DiagnosticTest,
    Microbiology,
    BloodBank,
    Devices,
    DocumentReferences,
    SupplyDeliveries,
    CareTeams,
    CarePlans,
    Provenances,
    Locations,
    Organizations,
    Practitioners,
    PractitionerRoles,
    Appointments,
    Claims,
}

impl EntityFamily {
    /// Every family, in aggregate field order.
    pub const ALL: [EntityFamily; 28] = [
        EntityFamily::Patient,
        EntityFamily::Encounter,
        EntityFamily::VitalSigns,
        EntityFamily::Allergies,
        EntityFamily::Immunizations,
        EntityFamily::Diagnoses,
        EntityFamily::ProblemList,
        EntityFamily::Procedures,
        EntityFamily::Medications,
        EntityFamily::Mar,
        EntityFamily::Imaging,
        EntityFamily::Lab,
        EntityFamily::Pathology,
        EntityFamily::DiagnosticTest,
        EntityFamily::Microbiology,
        EntityFamily::BloodBank,
        EntityFamily::Devices,
        EntityFamily::DocumentReferences,
        EntityFamily::SupplyDeliveries,
        EntityFamily::CareTeams,
        EntityFamily::CarePlans,
        EntityFamily::Provenances,
        EntityFamily::Locations,
        EntityFamily::Organizations,
        EntityFamily::Practitioners,
        EntityFamily::PractitionerRoles,
        EntityFamily::Appointments,
        EntityFamily::Claims,
    ];

    /// Field name of the family in the serialised aggregate.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityFamily::Patient => "patient",
            EntityFamily::Encounter => "encounter",
            EntityFamily::VitalSigns => "vital_signs",
            EntityFamily::Allergies => "allergies",
            EntityFamily::Immunizations => "immunizations",
            EntityFamily::Diagnoses => "diagnoses",
            EntityFamily::ProblemList => "problem_list",
            EntityFamily::Procedures => "procedures",
            EntityFamily::Medications => "medications",
            EntityFamily::Mar => "mar",
            EntityFamily::Imaging => "imaging",
            EntityFamily::Lab => "lab",
            EntityFamily::Pathology => "pathology",
            EntityFamily::DiagnosticTest => "diagnostic_test",
            EntityFamily::Microbiology => "microbiology",
            EntityFamily::BloodBank => "blood_bank",
            EntityFamily::Devices => "devices",
            EntityFamily::DocumentReferences => "document_references",
            EntityFamily::SupplyDeliveries => "supply_deliveries",
            EntityFamily::CareTeams => "care_teams",
            EntityFamily::CarePlans => "care_plans",
            EntityFamily::Provenances => "provenances",
            EntityFamily::Locations => "locations",
            EntityFamily::Organizations => "organizations",
            EntityFamily::Practitioners => "practitioners",
            EntityFamily::PractitionerRoles => "practitioner_roles",
            EntityFamily::Appointments => "appointments",
            EntityFamily::Claims => "claims",
        }
    }

    /// Title-cased label, e.g. `Vital Signs`.
    pub fn label(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for EntityFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CanonicalEntity {
    pub fn family(&self) -> EntityFamily {
        match self {
            CanonicalEntity::Patient(_) => EntityFamily::Patient,
            CanonicalEntity::Encounter(_) => EntityFamily::Encounter,
            CanonicalEntity::VitalSign(_) => EntityFamily::VitalSigns,
            CanonicalEntity::Allergy(_) => EntityFamily::Allergies,
            CanonicalEntity::Immunization(_) => EntityFamily::Immunizations,
            CanonicalEntity::Diagnosis(_) => EntityFamily::Diagnoses,
            CanonicalEntity::Problem(_) => EntityFamily::ProblemList,
            CanonicalEntity::Procedure(_) => EntityFamily::Procedures,
            CanonicalEntity::Medication(_) => EntityFamily::Medications,
            CanonicalEntity::MedicationAdministration(_) => EntityFamily::Mar,
            CanonicalEntity::LabReport(_) => EntityFamily::Lab,
            CanonicalEntity::ImagingReport(_) => EntityFamily::Imaging,
            CanonicalEntity::PathologyReport(_) => EntityFamily::Pathology,
            CanonicalEntity::MicrobiologyReport(_) => EntityFamily::Microbiology,
            CanonicalEntity::BloodBankReport(_) => EntityFamily::BloodBank,
            CanonicalEntity::DiagnosticTest(_) => EntityFamily::DiagnosticTest,
            CanonicalEntity::Device(_) => EntityFamily::Devices,
            CanonicalEntity::DocumentReference(_) => EntityFamily::DocumentReferences,
            CanonicalEntity::SupplyDelivery(_) => EntityFamily::SupplyDeliveries,
            CanonicalEntity::CarePlan(_) => EntityFamily::CarePlans,
            CanonicalEntity::CareTeam(_) => EntityFamily::CareTeams,
            CanonicalEntity::Provenance(_) => EntityFamily::Provenances,
            CanonicalEntity::Location(_) => EntityFamily::Locations,
            CanonicalEntity::Organization(_) => EntityFamily::Organizations,
            CanonicalEntity::Practitioner(_) => EntityFamily::Practitioners,
            CanonicalEntity::PractitionerRole(_) => EntityFamily::PractitionerRoles,
            CanonicalEntity::Appointment(_) => EntityFamily::Appointments,
            CanonicalEntity::Claim(_) => EntityFamily::Claims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(EntityFamily::VitalSigns.label(), "Vital Signs");
        assert_eq!(EntityFamily::Mar.label(), "Mar");
    }

    #[test]
    fn entity_reports_its_family() {
        let entity = CanonicalEntity::MedicationAdministration(Default::default());
        assert_eq!(entity.family(), EntityFamily::Mar);
    }
}
