//! Location mapping.

use crate::cache::ReferenceCache;
use crate::extractors::{
    address_parts, extract_coding, extract_reference_id, first_coded, identifier_map,
    string_list,
};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Location, LocationPosition};
use serde_json::Value;

pub struct LocationMapper;

impl ResourceMapper for LocationMapper {
    fn name(&self) -> &'static str {
        "location"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Location"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, _cache: &mut ReferenceCache) {
        let location_type = first_coded(resource, "type");
        let physical = extract_coding(resource.at("physicalType"));
        let address = address_parts(resource.at("address"));

        content.push(CanonicalEntity::Location(Location {
            id: resource.string_at("id"),
            status: resource.string_at("status"),
            name: resource.string_at("name"),
            description: resource.string_at("description"),
            mode: resource.string_at("mode"),
            location_type: location_type.display,
            type_code: location_type.code,
            type_system: location_type.system,
            physical_type: physical.display,
            physical_type_code: physical.code,
            physical_type_system: physical.system,
            address_line: address.lines,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            position: position(resource),
            managing_organization: resource
                .at("managingOrganization")
                .and_then(extract_reference_id),
            part_of: resource.at("partOf").and_then(extract_reference_id),
            operational_status: extract_coding(resource.at("operationalStatus")).display,
            alias: string_list(resource, "alias"),
            identifiers: identifier_map(resource),
        }));
    }
}

/// Present when at least one coordinate is.
fn position(resource: &Value) -> Option<LocationPosition> {
    let position = LocationPosition {
        longitude: resource.f64_at("position.longitude"),
        latitude: resource.f64_at("position.latitude"),
        altitude: resource.f64_at("position.altitude"),
    };
    if position == LocationPosition::default() {
        None
    } else {
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn maps_type_address_and_position() {
        let resource = json!({
            "resourceType": "Location",
            "id": "loc-1",
            "status": "active",
            "name": "Ward 4",
            "alias": ["W4", ""],
            "type": [{"coding": [{"code": "HOSP", "display": "Hospital", "system": "v3-RoleCode"}]}],
            "physicalType": {"coding": [{"code": "wa", "display": "Ward"}]},
            "address": {"line": ["1 Main St"], "city": "Leeds", "postalCode": "LS1"},
            "position": {"longitude": -1.55, "latitude": 53.8},
            "managingOrganization": {"reference": "Organization/hosp"}
        });
        let content = map_one(&LocationMapper, &resource);

        let location = &content.locations[0];
        assert_eq!(location.location_type.as_deref(), Some("Hospital"));
        assert_eq!(location.physical_type_code.as_deref(), Some("wa"));
        assert_eq!(location.address_line, vec!["1 Main St"]);
        assert_eq!(location.alias, vec!["W4"]);
        assert_eq!(location.managing_organization.as_deref(), Some("hosp"));
        let position = location.position.as_ref().expect("position");
        assert_eq!(position.latitude, Some(53.8));
        assert_eq!(position.altitude, None);
    }

    #[test]
    fn no_coordinates_means_no_position() {
        let content = map_one(&LocationMapper, &json!({"resourceType": "Location", "position": {}}));
        assert_eq!(content.locations[0].position, None);
    }
}
