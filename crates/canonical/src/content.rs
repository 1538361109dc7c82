//! Per-document aggregate of canonical entities.
//!
//! Responsibilities:
//! - route every [`CanonicalEntity`] to its slot or list
//! - reconcile claims by `claim_id` through a key to position index
//! - summarise what a document contained
//!
//! Notes:
//! - entities are never removed once pushed; claims are the only ones mutated afterwards
//! - list order is push order and carries no clinical meaning

use crate::{
    Allergy, Appointment, BloodBankReport, CanonicalEntity, CarePlan, CareTeam, Claim, Device,
    Diagnosis, DiagnosticTest, DocumentReference, Encounter, EntityFamily, ImagingReport,
    Immunization, LabReport, Location, Medication, MedicationAdministration,
    MicrobiologyReport, Organization, PathologyReport, Patient, Practitioner, PractitionerRole,
    Problem, Procedure, Provenance, SupplyDelivery, VitalSign,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClinicalContent {
    pub patient: Option<Patient>,
    pub encounter: Option<Encounter>,
    #[serde(default)]
    pub vital_signs: Vec<VitalSign>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub immunizations: Vec<Immunization>,
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
    #[serde(default)]
    pub problem_list: Vec<Problem>,
    #[serde(default)]
    pub procedures: Vec<Procedure>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub mar: Vec<MedicationAdministration>,
    #[serde(default)]
    pub imaging: Vec<ImagingReport>,
    #[serde(default)]
    pub lab: Vec<LabReport>,
    #[serde(default)]
    pub pathology: Vec<PathologyReport>,
    #[serde(default)]
    pub diagnostic_test: Vec<DiagnosticTest>,
    #[serde(default)]
    pub microbiology: Vec<MicrobiologyReport>,
    #[serde(default)]
    pub blood_bank: Vec<BloodBankReport>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub document_references: Vec<DocumentReference>,
    #[serde(default)]
    pub supply_deliveries: Vec<SupplyDelivery>,
    #[serde(default)]
    pub care_teams: Vec<CareTeam>,
    #[serde(default)]
    pub care_plans: Vec<CarePlan>,
    #[serde(default)]
    pub provenances: Vec<Provenance>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub practitioners: Vec<Practitioner>,
    #[serde(default)]
    pub practitioner_roles: Vec<PractitionerRole>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub claims: Vec<Claim>,

    /// `claim_id` to position in `claims`. Derived state, rebuilt when it drifts.
    #[serde(skip)]
    claim_index: BTreeMap<String, usize>,
}

impl ClinicalContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entity to the aggregate.
    ///
    /// Patient and encounter replace their slot (last writer wins). Claims are merged into an
    /// existing claim with the same id; everything else is appended.
    pub fn push(&mut self, entity: CanonicalEntity) {
        match entity {
            CanonicalEntity::Patient(v) => self.patient = Some(v),
            CanonicalEntity::Encounter(v) => self.encounter = Some(v),
            CanonicalEntity::VitalSign(v) => self.vital_signs.push(v),
            CanonicalEntity::Allergy(v) => self.allergies.push(v),
            CanonicalEntity::Immunization(v) => self.immunizations.push(v),
            CanonicalEntity::Diagnosis(v) => self.diagnoses.push(v),
            CanonicalEntity::Problem(v) => self.problem_list.push(v),
            CanonicalEntity::Procedure(v) => self.procedures.push(v),
            CanonicalEntity::Medication(v) => self.medications.push(v),
            CanonicalEntity::MedicationAdministration(v) => self.mar.push(v),
            CanonicalEntity::LabReport(v) => self.lab.push(v),
            CanonicalEntity::ImagingReport(v) => self.imaging.push(v),
            CanonicalEntity::PathologyReport(v) => self.pathology.push(v),
            CanonicalEntity::MicrobiologyReport(v) => self.microbiology.push(v),
            CanonicalEntity::BloodBankReport(v) => self.blood_bank.push(v),
            CanonicalEntity::DiagnosticTest(v) => self.diagnostic_test.push(v),
            CanonicalEntity::Device(v) => self.devices.push(v),
            CanonicalEntity::DocumentReference(v) => self.document_references.push(v),
            CanonicalEntity::SupplyDelivery(v) => self.supply_deliveries.push(v),
            CanonicalEntity::CarePlan(v) => self.care_plans.push(v),
            CanonicalEntity::CareTeam(v) => self.care_teams.push(v),
            CanonicalEntity::Provenance(v) => self.provenances.push(v),
            CanonicalEntity::Location(v) => self.locations.push(v),
            CanonicalEntity::Organization(v) => self.organizations.push(v),
            CanonicalEntity::Practitioner(v) => self.practitioners.push(v),
            CanonicalEntity::PractitionerRole(v) => self.practitioner_roles.push(v),
            CanonicalEntity::Appointment(v) => self.appointments.push(v),
            CanonicalEntity::Claim(v) => self.merge_claim(v),
        }
    }

    /// Look up a claim by id.
    pub fn claim(&self, claim_id: &str) -> Option<&Claim> {
        self.claim_position(claim_id).map(|pos| &self.claims[pos])
    }

    /// Mutable access to the claim with `claim_id`, creating a placeholder when absent.
    pub fn upsert_claim(&mut self, claim_id: &str) -> &mut Claim {
        let pos = match self.claim_position(claim_id) {
            Some(pos) => pos,
            None => {
                self.claims.push(Claim::placeholder(claim_id));
                let pos = self.claims.len() - 1;
                self.claim_index.insert(claim_id.to_owned(), pos);
                pos
            }
        };
        &mut self.claims[pos]
    }

    /// Merge `claim` into the stored claim with the same id, or append it.
    pub fn merge_claim(&mut self, claim: Claim) {
        match self.claim_position(&claim.claim_id) {
            Some(pos) => self.claims[pos].absorb(claim),
            None => {
                self.claim_index
                    .insert(claim.claim_id.clone(), self.claims.len());
                self.claims.push(claim);
            }
        }
    }

    fn claim_position(&self, claim_id: &str) -> Option<usize> {
        if let Some(&pos) = self.claim_index.get(claim_id) {
            if self.claims.get(pos).is_some_and(|c| c.claim_id == claim_id) {
                return Some(pos);
            }
        }
        // The index is empty after deserialisation or direct edits of `claims`.
        self.claims.iter().position(|c| c.claim_id == claim_id)
    }

    /// Number of entities held for `family`.
    pub fn count(&self, family: EntityFamily) -> usize {
        match family {
            EntityFamily::Patient => usize::from(self.patient.is_some()),
            EntityFamily::Encounter => usize::from(self.encounter.is_some()),
            EntityFamily::VitalSigns => self.vital_signs.len(),
            EntityFamily::Allergies => self.allergies.len(),
            EntityFamily::Immunizations => self.immunizations.len(),
            EntityFamily::Diagnoses => self.diagnoses.len(),
            EntityFamily::ProblemList => self.problem_list.len(),
            EntityFamily::Procedures => self.procedures.len(),
            EntityFamily::Medications => self.medications.len(),
            EntityFamily::Mar => self.mar.len(),
            EntityFamily::Imaging => self.imaging.len(),
            EntityFamily::Lab => self.lab.len(),
            EntityFamily::Pathology => self.pathology.len(),
            EntityFamily::DiagnosticTest => self.diagnostic_test.len(),
            EntityFamily::Microbiology => self.microbiology.len(),
            EntityFamily::BloodBank => self.blood_bank.len(),
            EntityFamily::Devices => self.devices.len(),
            EntityFamily::DocumentReferences => self.document_references.len(),
            EntityFamily::SupplyDeliveries => self.supply_deliveries.len(),
            EntityFamily::CareTeams => self.care_teams.len(),
            EntityFamily::CarePlans => self.care_plans.len(),
            EntityFamily::Provenances => self.provenances.len(),
            EntityFamily::Locations => self.locations.len(),
            EntityFamily::Organizations => self.organizations.len(),
            EntityFamily::Practitioners => self.practitioners.len(),
            EntityFamily::PractitionerRoles => self.practitioner_roles.len(),
            EntityFamily::Appointments => self.appointments.len(),
            EntityFamily::Claims => self.claims.len(),
        }
    }

    /// Total number of entities across every family.
    pub fn entity_count(&self) -> usize {
        EntityFamily::ALL.iter().map(|f| self.count(*f)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// One-line, human-readable summary, e.g.
    /// `Patient: ID p1, female, 46 years | 2 Allergies | 1 Claims`.
    pub fn summary(&self, current_year: i32) -> String {
        let mut parts = Vec::new();

        if let Some(patient) = &self.patient {
            let mut details = Vec::new();
            if let Some(id) = &patient.id {
                details.push(format!("ID {id}"));
            }
            if let Some(gender) = &patient.gender {
                details.push(gender.clone());
            }
            if let Some(age) = patient.age_label(current_year) {
                details.push(age);
            }
            if let Some(area) = &patient.geographic_area {
                details.push(format!("from {area}"));
            }
            if details.is_empty() {
                parts.push("Patient: [limited info]".to_owned());
            } else {
                parts.push(format!("Patient: {}", details.join(", ")));
            }
        }

        if let Some(encounter) = &self.encounter {
            let mut text = "Encounter".to_owned();
            if let Some(kind) = &encounter.encounter_type {
                text.push_str(&format!(": {kind}"));
            }
            if let Some(status) = &encounter.status {
                text.push_str(&format!(" ({status})"));
            }
            parts.push(text);
        }

        for family in EntityFamily::ALL.iter().skip(2) {
            let count = self.count(*family);
            if count > 0 {
                parts.push(format!("{count} {}", family.label()));
            }
        }

        if parts.is_empty() {
            "No clinical content found".to_owned()
        } else {
            parts.join(" | ")
        }
    }
}
