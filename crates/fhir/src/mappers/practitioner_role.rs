//! PractitionerRole mapping.

use crate::cache::ReferenceCache;
use crate::dates::datetime_at;
use crate::extractors::{
    extract_coding, extract_reference_id, first_coded, identifier_map, reference_ids,
    string_list, telecom_values,
};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{AvailableTime, CanonicalEntity, ClinicalContent, NotAvailable, PractitionerRole};
use serde_json::Value;

pub struct PractitionerRoleMapper;

impl ResourceMapper for PractitionerRoleMapper {
    fn name(&self) -> &'static str {
        "practitioner_role"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["PractitionerRole"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, _cache: &mut ReferenceCache) {
        let role = first_coded(resource, "code");

        let mut specialty = Vec::new();
        let mut specialty_codes = Vec::new();
        let mut specialty_system = None;
        for concept in resource
            .array_at("specialty")
            .iter()
            .filter(|c| !c.array_at("coding").is_empty())
        {
            let parts = extract_coding(Some(concept));
            specialty.extend(parts.display);
            specialty_codes.extend(parts.code);
            if specialty_system.is_none() {
                specialty_system = parts.system;
            }
        }

        content.push(CanonicalEntity::PractitionerRole(PractitionerRole {
            id: resource.string_at("id"),
            active: resource.bool_at("active"),
            period_start: datetime_at(resource, "period.start"),
            period_end: datetime_at(resource, "period.end"),
            practitioner_id: resource.at("practitioner").and_then(extract_reference_id),
            organization_id: resource.at("organization").and_then(extract_reference_id),
            code: role.code,
            code_system: role.system,
            specialty,
            specialty_codes,
            specialty_system,
            location_ids: reference_ids(resource, "location"),
            healthcare_service_ids: reference_ids(resource, "healthcareService"),
            telecom: telecom_values(resource),
            available_time: resource
                .array_at("availableTime")
                .iter()
                .map(|slot| AvailableTime {
                    days_of_week: string_list(slot, "daysOfWeek"),
                    all_day: slot.bool_at("allDay"),
                    available_start_time: slot.string_at("availableStartTime"),
                    available_end_time: slot.string_at("availableEndTime"),
                })
                .collect(),
            not_available: resource
                .array_at("notAvailable")
                .iter()
                .map(|gap| NotAvailable {
                    description: gap.string_at("description"),
                    during_start: datetime_at(gap, "during.start"),
                    during_end: datetime_at(gap, "during.end"),
                })
                .collect(),
            availability_exceptions: resource.string_at("availabilityExceptions"),
            identifiers: identifier_map(resource),
        }));
    }
}
