//! Appointment mapping.
//!
//! Appointments name their patient, location and sometimes encounter as participants rather
//! than through dedicated fields.

use crate::cache::{CacheKey, ReferenceCache};
use crate::extractors::{
    extract_coding, extract_patient_reference, first_coded, identifier_map, split_reference,
};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{Appointment, AppointmentParticipant, CanonicalEntity, ClinicalContent};
use serde_json::Value;

pub struct AppointmentMapper;

impl ResourceMapper for AppointmentMapper {
    fn name(&self) -> &'static str {
        "appointment"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Appointment"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let participants: Vec<AppointmentParticipant> = resource
            .array_at("participant")
            .iter()
            .map(participant)
            .collect();
        let actor_of = |kind: &str| {
            participants
                .iter()
                .find(|p| p.participant_type.as_deref() == Some(kind))
                .and_then(|p| p.id.clone())
        };

        let patient_id = cache.resolve(
            actor_of("Patient").or_else(|| extract_patient_reference(resource)),
            CacheKey::PatientId,
        );
        let encounter_id = cache.resolve(actor_of("Encounter"), CacheKey::EncounterId);
        let location = actor_of("Location");

        let category = extract_coding(resource.at("serviceCategory"));
        let service_type = first_coded(resource, "serviceType");
        let specialty = first_coded(resource, "specialty");
        let appointment_type = extract_coding(resource.at("appointmentType"));
        let reason = extract_coding(resource.at("reasonCode"));

        content.push(CanonicalEntity::Appointment(Appointment {
            id: resource.string_at("id"),
            status: resource.string_at("status"),
            service_category: category.display,
            service_category_code: category.code,
            service_category_system: category.system,
            service_type: service_type.display,
            service_type_code: service_type.code,
            service_type_system: service_type.system,
            specialty: specialty.display,
            specialty_code: specialty.code,
            specialty_system: specialty.system,
            appointment_type: appointment_type.display,
            appointment_type_code: appointment_type.code,
            appointment_type_system: appointment_type.system,
            reason: reason.display,
            reason_code: reason.code,
            reason_system: reason.system,
            priority: resource.i64_at("priority"),
            description: resource.string_at("description"),
            start: resource.string_at("start"),
            end: resource.string_at("end"),
            created: resource.string_at("created"),
            comment: resource.string_at("comment"),
            patient_instruction: resource.string_at("patientInstruction"),
            canceled_reason: extract_coding(resource.at("cancelationReason"))
                .display
                .or_else(|| resource.string_at("cancelationReason")),
            location,
            participants,
            requested_period_start: resource.string_at("requestedPeriod.0.start"),
            requested_period_end: resource.string_at("requestedPeriod.0.end"),
            patient_id,
            encounter_id,
            identifiers: identifier_map(resource),
        }));
    }
}

fn participant(participant: &Value) -> AppointmentParticipant {
    let (participant_type, id) = participant
        .str_at("actor.reference")
        .map(split_reference)
        .unwrap_or_default();
    let role = first_coded(participant, "type");

    AppointmentParticipant {
        id,
        participant_type,
        name: participant.string_at("actor.display"),
        role: role.display,
        role_code: role.code,
        role_system: role.system,
        status: participant.string_at("status"),
        period_start: participant.string_at("period.start"),
        period_end: participant.string_at("period.end"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn derives_patient_and_location_from_participants() {
        let resource = json!({
            "resourceType": "Appointment",
            "id": "appt-1",
            "status": "booked",
            "priority": 5,
            "serviceType": [{"coding": [{"code": "57", "display": "Immunization"}]}],
            "reasonCode": [{"text": "Flu shot"}],
            "start": "2024-10-01T09:00:00Z",
            "end": "2024-10-01T09:15:00Z",
            "participant": [
                {"actor": {"reference": "Patient/p1", "display": "Jane"}, "status": "accepted"},
                {"actor": {"reference": "Location/clinic-2"}, "status": "accepted"},
                {
                    "type": [{"coding": [{"code": "ATND", "display": "attender"}]}],
                    "actor": {"reference": "Practitioner/dr-1"},
                    "status": "tentative"
                }
            ]
        });
        let content = map_one(&AppointmentMapper, &resource);

        let appt = &content.appointments[0];
        assert_eq!(appt.status.as_deref(), Some("booked"));
        assert_eq!(appt.priority, Some(5));
        assert_eq!(appt.patient_id.as_deref(), Some("p1"));
        assert_eq!(appt.location.as_deref(), Some("clinic-2"));
        assert_eq!(appt.service_type.as_deref(), Some("Immunization"));
        assert_eq!(appt.reason.as_deref(), Some("Flu shot"));
        assert_eq!(appt.participants.len(), 3);
        assert_eq!(appt.participants[2].role_code.as_deref(), Some("ATND"));
        assert_eq!(appt.participants[2].participant_type.as_deref(), Some("Practitioner"));
    }
}
