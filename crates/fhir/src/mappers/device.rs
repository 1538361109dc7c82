//! Device mapping.

use crate::cache::ReferenceCache;
use crate::extractors::coding_label;
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Device, DeviceProperty};
use serde_json::Value;

/// Identifier type codes for serial and lot numbers.
const SERIAL_NUMBER: &str = "SNO";
const LOT_NUMBER: &str = "LOT";

pub struct DeviceMapper;

impl ResourceMapper for DeviceMapper {
    fn name(&self) -> &'static str {
        "device"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Device"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        content.push(CanonicalEntity::Device(Device {
            device_id: resource.string_at("id"),
            device_type: coding_label(resource.at("type")),
            manufacturer: resource.string_at("manufacturer"),
            model: resource.string_at("modelNumber"),
            serial_number: typed_identifier(resource, SERIAL_NUMBER),
            lot_number: typed_identifier(resource, LOT_NUMBER)
                .or_else(|| resource.string_at("lotNumber")),
            expiration_date: resource.string_at("expirationDate"),
            status: resource.string_at("status"),
            name: resource.string_at("deviceName.0.name"),
            version: resource.string_at("version.0.value"),
            safety_info: resource.string_at("note.0.text"),
            properties: resource
                .array_at("property")
                .iter()
                .filter_map(property)
                .collect(),
            patient_id: cache.resolve_patient_via(resource, "patient"),
            encounter_id: cache.resolve_encounter_id(resource),
        }));
    }
}

/// Last `identifier[].value` whose type coding carries `code`.
fn typed_identifier(resource: &Value, code: &str) -> Option<String> {
    resource
        .array_at("identifier")
        .iter()
        .filter(|id| {
            id.array_at("type.coding")
                .iter()
                .any(|c| c.str_at("code") == Some(code))
        })
        .filter_map(|id| id.string_at("value"))
        .last()
}

/// A property is kept only when both its type and a value are present.
fn property(property: &Value) -> Option<DeviceProperty> {
    let property_type = property
        .string_at("type.coding.0.display")
        .or_else(|| property.string_at("type.coding.0.code"))?;

    let (value, unit) = if property.at("valueQuantity").is_some() {
        (
            property.text_at("valueQuantity.value"),
            property.string_at("valueQuantity.unit"),
        )
    } else if let Some(code) = property.at("valueCode") {
        (
            code.string_at("text")
                .or_else(|| code.string_at("coding.0.display"))
                .or_else(|| code.string_at("coding.0.code")),
            None,
        )
    } else {
        (property.string_at("valueString"), None)
    };

    Some(DeviceProperty {
        property_type: Some(property_type),
        property_value: Some(value?),
        property_unit: unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn reads_typed_identifiers_and_properties() {
        let resource = json!({
            "resourceType": "Device",
            "id": "dev-1",
            "status": "active",
            "manufacturer": "Acme",
            "modelNumber": "X200",
            "type": {"coding": [{"code": "pump"}]},
            "identifier": [
                {"type": {"coding": [{"code": "SNO"}]}, "value": "SN-123"},
                {"type": {"coding": [{"code": "LOT"}]}, "value": "LOT-9"}
            ],
            "deviceName": [{"name": "Infusion pump"}],
            "property": [
                {"type": {"coding": [{"display": "Max rate"}]}, "valueQuantity": {"value": 999, "unit": "mL/h"}},
                {"type": {"coding": [{"code": "mode"}]}, "valueCode": {"coding": [{"code": "auto"}]}},
                {"type": {"coding": [{"code": "empty"}]}}
            ],
            "patient": {"reference": "Patient/p7"}
        });
        let content = map_one(&DeviceMapper, &resource);

        let device = &content.devices[0];
        assert_eq!(device.device_type.as_deref(), Some("pump"));
        assert_eq!(device.serial_number.as_deref(), Some("SN-123"));
        assert_eq!(device.lot_number.as_deref(), Some("LOT-9"));
        assert_eq!(device.name.as_deref(), Some("Infusion pump"));
        assert_eq!(device.patient_id.as_deref(), Some("p7"));
        assert_eq!(device.properties.len(), 2);
        assert_eq!(device.properties[0].property_value.as_deref(), Some("999"));
        assert_eq!(device.properties[0].property_unit.as_deref(), Some("mL/h"));
        assert_eq!(device.properties[1].property_value.as_deref(), Some("auto"));
    }
}
