//! Provenance mapping.

use crate::cache::ReferenceCache;
use crate::dates::datetime_at;
use crate::extractors::{extract_coding, extract_reference_id, first_coded, typed_reference};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{
    CanonicalEntity, ClinicalContent, Provenance, ProvenanceAgent, ProvenanceEntity,
    ProvenanceSignature,
};
use serde_json::Value;

pub struct ProvenanceMapper;

impl ResourceMapper for ProvenanceMapper {
    fn name(&self) -> &'static str {
        "provenance"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Provenance"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, _cache: &mut ReferenceCache) {
        let (target_type, target_id) = typed_reference(resource, "target.0");
        let reason = first_coded(resource, "reason");
        let activity = extract_coding(resource.at("activity"));

        // A point in time is recorded as a zero-length interval.
        let (occurred_start, occurred_end) = match datetime_at(resource, "occurredDateTime") {
            Some(at) => (Some(at), Some(at)),
            None => (
                datetime_at(resource, "occurredPeriod.start"),
                datetime_at(resource, "occurredPeriod.end"),
            ),
        };

        content.push(CanonicalEntity::Provenance(Provenance {
            id: resource.string_at("id"),
            target_id,
            target_type,
            occurred_start,
            occurred_end,
            recorded: datetime_at(resource, "recorded"),
            policy: resource.string_at("policy.0"),
            location: resource.at("location").and_then(extract_reference_id),
            reason: reason.display,
            reason_code: reason.code,
            reason_system: reason.system,
            activity: activity.display,
            activity_code: activity.code,
            activity_system: activity.system,
            agents: resource.array_at("agent").iter().map(agent).collect(),
            entities: resource.array_at("entity").iter().map(entity).collect(),
            signatures: resource
                .array_at("signature")
                .iter()
                .map(|signature| ProvenanceSignature {
                    signature_type: signature.string_at("type.0.code"),
                    when: signature.string_at("when"),
                    who: signature.string_at("who.reference"),
                    target_format: signature.string_at("targetFormat"),
                    sig_format: signature.string_at("sigFormat"),
                })
                .collect(),
        }));
    }
}

fn agent(agent: &Value) -> ProvenanceAgent {
    let (agent_type, id) = typed_reference(agent, "who");
    let (on_behalf_of_type, on_behalf_of) = typed_reference(agent, "onBehalfOf");
    let role = first_coded(agent, "role");

    ProvenanceAgent {
        id,
        agent_type,
        role: role.display,
        role_code: role.code,
        role_system: role.system,
        name: agent.string_at("who.display"),
        on_behalf_of,
        on_behalf_of_type,
    }
}

fn entity(entity: &Value) -> ProvenanceEntity {
    let (entity_type, id) = typed_reference(entity, "what");
    ProvenanceEntity {
        id,
        role: entity.string_at("role"),
        entity_type,
        reference: entity.string_at("what.reference"),
        description: entity.string_at("what.display"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn maps_target_agents_entities_and_signatures() {
        let resource = json!({
            "resourceType": "Provenance",
            "id": "prov-1",
            "target": [{"reference": "Observation/obs-1"}],
            "occurredDateTime": "2024-08-01T12:00:00Z",
            "recorded": "2024-08-01T12:05:00Z",
            "policy": ["http://example.org/policy/1"],
            "activity": {"coding": [{"code": "CREATE", "display": "create"}]},
            "agent": [{
                "role": [{"coding": [{"code": "AUT", "display": "author"}]}],
                "who": {"reference": "Practitioner/dr-1", "display": "Dr One"},
                "onBehalfOf": {"reference": "Organization/hosp"}
            }],
            "entity": [{"role": "source", "what": {"reference": "DocumentReference/doc-1", "display": "Scan"}}],
            "signature": [{"type": [{"code": "1.2.840.10065.1.12.1.1"}], "when": "2024-08-01T12:05:00Z", "who": {"reference": "Practitioner/dr-1"}}]
        });
        let content = map_one(&ProvenanceMapper, &resource);

        let prov = &content.provenances[0];
        assert_eq!(prov.target_type.as_deref(), Some("Observation"));
        assert_eq!(prov.target_id.as_deref(), Some("obs-1"));
        assert_eq!(prov.occurred_start, prov.occurred_end);
        assert!(prov.occurred_start.is_some());
        assert_eq!(prov.policy.as_deref(), Some("http://example.org/policy/1"));
        assert_eq!(prov.activity_code.as_deref(), Some("CREATE"));

        let agent = &prov.agents[0];
        assert_eq!(agent.agent_type.as_deref(), Some("Practitioner"));
        assert_eq!(agent.role.as_deref(), Some("author"));
        assert_eq!(agent.on_behalf_of_type.as_deref(), Some("Organization"));

        assert_eq!(prov.entities[0].entity_type.as_deref(), Some("DocumentReference"));
        assert_eq!(prov.entities[0].role.as_deref(), Some("source"));
        assert_eq!(
            prov.signatures[0].who.as_deref(),
            Some("Practitioner/dr-1")
        );
    }
}
