//! Organization mapping.

use crate::cache::ReferenceCache;
use crate::extractors::{
    address_parts, extract_coding, extract_reference_id, first_coded, format_human_name,
    identifier_map, string_list, telecom_values,
};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Organization, OrganizationContact};
use serde_json::Value;

pub struct OrganizationMapper;

impl ResourceMapper for OrganizationMapper {
    fn name(&self) -> &'static str {
        "organization"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Organization"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, _cache: &mut ReferenceCache) {
        let org_type = first_coded(resource, "type");
        let address = address_parts(resource.at("address.0"));

        content.push(CanonicalEntity::Organization(Organization {
            id: resource.string_at("id"),
            active: resource.bool_at("active"),
            name: resource.string_at("name"),
            alias: string_list(resource, "alias"),
            org_type: org_type.display,
            type_code: org_type.code,
            type_system: org_type.system,
            address_line: address.lines,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            part_of: resource.at("partOf").and_then(extract_reference_id),
            telecom: telecom_values(resource),
            contacts: resource.array_at("contact").iter().map(contact).collect(),
            identifiers: identifier_map(resource),
        }));
    }
}

fn contact(contact: &Value) -> OrganizationContact {
    let address = address_parts(contact.at("address"));
    OrganizationContact {
        purpose: extract_coding(contact.at("purpose")).display,
        // Rendered from parts; `text` only when there are none.
        name: contact.at("name").and_then(|name| {
            let mut parts = string_list(name, "prefix");
            parts.extend(string_list(name, "given"));
            parts.extend(name.string_at("family"));
            parts.extend(string_list(name, "suffix"));
            if parts.is_empty() {
                format_human_name(name)
            } else {
                Some(parts.join(" "))
            }
        }),
        telecom: contact.string_at("telecom.0.value"),
        address_line: address.lines,
        city: address.city,
        state: address.state,
        postal_code: address.postal_code,
        country: address.country,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn maps_first_address_telecom_values_and_contacts() {
        let resource = json!({
            "resourceType": "Organization",
            "id": "org-1",
            "active": true,
            "name": "General Hospital",
            "type": [{"text": "Healthcare Provider", "coding": [{"code": "prov"}]}],
            "address": [{"line": ["1 Main St"], "state": "MA"}, {"state": "ignored"}],
            "telecom": [{"system": "phone", "value": "555-0100"}, {"system": "fax"}],
            "contact": [{
                "purpose": {"coding": [{"display": "Billing"}]},
                "name": {"prefix": ["Ms"], "given": ["Ada"], "family": "Lovelace"},
                "telecom": [{"value": "555-0199"}]
            }],
            "partOf": {"reference": "Organization/parent"}
        });
        let content = map_one(&OrganizationMapper, &resource);

        let org = &content.organizations[0];
        assert_eq!(org.active, Some(true));
        assert_eq!(org.org_type.as_deref(), Some("Healthcare Provider"));
        assert_eq!(org.state.as_deref(), Some("MA"));
        assert_eq!(org.telecom, vec!["555-0100"]);
        assert_eq!(org.part_of.as_deref(), Some("parent"));

        let contact = &org.contacts[0];
        assert_eq!(contact.purpose.as_deref(), Some("Billing"));
        assert_eq!(contact.name.as_deref(), Some("Ms Ada Lovelace"));
        assert_eq!(contact.telecom.as_deref(), Some("555-0199"));
    }
}
