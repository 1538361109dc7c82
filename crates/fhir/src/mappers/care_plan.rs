//! CarePlan mapping.

use crate::cache::ReferenceCache;
use crate::dates::datetime_at;
use crate::extractors::{
    extract_coding, extract_reference_id, first_coded, identifier_map, joined_notes,
    reference_ids, split_reference, typed_reference,
};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, CarePlan, CarePlanActivity, ClinicalContent};
use serde_json::Value;

pub struct CarePlanMapper;

impl ResourceMapper for CarePlanMapper {
    fn name(&self) -> &'static str {
        "care_plan"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["CarePlan"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let (author_type, author) = typed_reference(resource, "author");
        let category = first_coded(resource, "category");

        let care_team_id = resource
            .array_at("careTeam")
            .iter()
            .filter_map(|team| team.str_at("reference"))
            .find(|reference| reference.contains("CareTeam"))
            .and_then(|reference| split_reference(reference).1);

        let mut supports = reference_ids(resource, "basedOn");
        supports.extend(reference_ids(resource, "replaces"));

        content.push(CanonicalEntity::CarePlan(CarePlan {
            id: resource.string_at("id"),
            status: resource.string_at("status"),
            intent: resource.string_at("intent"),
            title: resource.string_at("title"),
            description: resource.string_at("description"),
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
            period_start: datetime_at(resource, "period.start"),
            period_end: datetime_at(resource, "period.end"),
            created: datetime_at(resource, "created"),
            author,
            author_type,
            category: category.display,
            category_code: category.code,
            category_system: category.system,
            care_team_id,
            addresses: reference_ids(resource, "addresses"),
            supports,
            goals: reference_ids(resource, "goal"),
            activities: resource.array_at("activity").iter().map(activity).collect(),
            notes: joined_notes(resource, "\n"),
            identifiers: identifier_map(resource),
        }));
    }
}

fn activity(activity: &Value) -> CarePlanActivity {
    let empty = Value::Null;
    let detail = activity.at("detail").unwrap_or(&empty);
    let code = extract_coding(detail.at("code"));
    let category = extract_coding(detail.at("category"));
    let (performer_type, performer) = detail
        .array_at("performer")
        .iter()
        .find_map(|p| p.str_at("reference"))
        .map(split_reference)
        .unwrap_or_default();

    CarePlanActivity {
        id: activity.string_at("id"),
        status: activity
            .string_at("status")
            .or_else(|| detail.string_at("status")),
        description: activity.string_at("reference.display"),
        code: None,
        code_system: None,
        detail_status: detail.string_at("status"),
        detail_description: detail.string_at("description").or(code.display),
        detail_code: code.code,
        detail_code_system: code.system,
        category: category.display,
        category_code: category.code,
        category_system: category.system,
        period_start: datetime_at(detail, "scheduledPeriod.start"),
        period_end: datetime_at(detail, "scheduledPeriod.end"),
        location: detail.at("location").and_then(extract_reference_id),
        performer,
        performer_type,
        notes: joined_notes(activity, "\n").or_else(|| {
            activity
                .array_at("progress")
                .iter()
                .find_map(|p| p.string_at("text"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn maps_header_links_and_activities() {
        let resource = json!({
            "resourceType": "CarePlan",
            "id": "cp-1",
            "status": "active",
            "intent": "plan",
            "title": "Diabetes management",
            "period": {"start": "2024-01-01T00:00:00Z", "end": "not a date"},
            "author": {"reference": "Practitioner/dr-1"},
            "category": [{"text": "Assessment", "coding": [{"code": "assess-plan", "system": "http://hl7.org/fhir/us/core/CodeSystem/careplan-category"}]}],
            "careTeam": [{"reference": "CareTeam/ct-1"}],
            "addresses": [{"reference": "Condition/c1"}],
            "basedOn": [{"reference": "CarePlan/old"}],
            "replaces": [{"reference": "CarePlan/older"}],
            "goal": [{"reference": "Goal/g1"}],
            "activity": [{
                "detail": {
                    "status": "scheduled",
                    "code": {"coding": [{"code": "698360004", "display": "Diabetes self management plan"}]},
                    "scheduledPeriod": {"start": "2024-02-01"},
                    "location": {"reference": "Location/clinic"},
                    "performer": [{"reference": "Practitioner/nurse-1"}]
                }
            }],
            "subject": {"reference": "Patient/p1"}
        });
        let content = map_one(&CarePlanMapper, &resource);

        let plan = &content.care_plans[0];
        assert_eq!(plan.author.as_deref(), Some("dr-1"));
        assert_eq!(plan.author_type.as_deref(), Some("Practitioner"));
        assert_eq!(plan.category.as_deref(), Some("Assessment"));
        assert_eq!(plan.care_team_id.as_deref(), Some("ct-1"));
        assert!(plan.period_start.is_some());
        assert_eq!(plan.period_end, None);
        assert_eq!(plan.supports, vec!["old", "older"]);
        assert_eq!(plan.goals, vec!["g1"]);

        let activity = &plan.activities[0];
        assert_eq!(activity.status.as_deref(), Some("scheduled"));
        assert_eq!(
            activity.detail_description.as_deref(),
            Some("Diabetes self management plan")
        );
        assert_eq!(activity.location.as_deref(), Some("clinic"));
        assert_eq!(activity.performer_type.as_deref(), Some("Practitioner"));
        assert!(activity.period_start.is_some());
    }
}
