//! CareTeam mapping.

use crate::cache::ReferenceCache;
use crate::dates::datetime_at;
use crate::extractors::{
    extract_reference_id, first_coded, identifier_map, joined_notes, typed_reference,
};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, CareTeam, CareTeamParticipant, ClinicalContent};
use serde_json::Value;

pub struct CareTeamMapper;

impl ResourceMapper for CareTeamMapper {
    fn name(&self) -> &'static str {
        "care_team"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["CareTeam"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let category = first_coded(resource, "category");
        let reason = first_coded(resource, "reasonCode");

        content.push(CanonicalEntity::CareTeam(CareTeam {
            id: resource.string_at("id"),
            status: resource.string_at("status"),
            name: resource.string_at("name"),
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
            period_start: datetime_at(resource, "period.start"),
            period_end: datetime_at(resource, "period.end"),
            category: category.display,
            category_code: category.code,
            category_system: category.system,
            reason: reason.display,
            reason_code: reason.code,
            reason_system: reason.system,
            managing_organization: resource
                .array_at("managingOrganization")
                .iter()
                .find_map(extract_reference_id),
            participants: resource
                .array_at("participant")
                .iter()
                .map(participant)
                .collect(),
            notes: joined_notes(resource, "\n"),
            identifiers: identifier_map(resource),
        }));
    }
}

fn participant(participant: &Value) -> CareTeamParticipant {
    let (member_type, id) = typed_reference(participant, "member");
    let role = first_coded(participant, "role");

    CareTeamParticipant {
        id,
        role: role.display,
        role_code: role.code,
        role_system: role.system,
        name: participant.string_at("member.display"),
        organization: participant.string_at("onBehalfOf.display"),
        member_type,
        period_start: datetime_at(participant, "period.start"),
        period_end: datetime_at(participant, "period.end"),
        on_behalf_of: participant.at("onBehalfOf").and_then(extract_reference_id),
    }
}
