//! SupplyDelivery mapping.

use crate::cache::ReferenceCache;
use crate::extractors::{coding_label, extract_reference_id, joined_notes};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, SupplyDelivery, SupplyDeliveryItem};
use serde_json::Value;

pub struct SupplyDeliveryMapper;

impl ResourceMapper for SupplyDeliveryMapper {
    fn name(&self) -> &'static str {
        "supply_delivery"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["SupplyDelivery"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        content.push(CanonicalEntity::SupplyDelivery(SupplyDelivery {
            delivery_id: resource.string_at("id"),
            status: resource.string_at("status"),
            delivery_type: coding_label(resource.at("type"))
                .or_else(|| resource.string_at("type.text")),
            delivered_on: delivered_on(resource),
            destination: resource.at("destination").and_then(extract_reference_id),
            supplier: resource.at("supplier").and_then(extract_reference_id),
            items: resource.at("suppliedItem").map(item).into_iter().collect(),
            notes: joined_notes(resource, "; "),
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
        }));
    }
}

/// `occurrenceDateTime`, then the period start, then the first timing event.
fn delivered_on(resource: &Value) -> Option<String> {
    resource
        .string_at("occurrenceDateTime")
        .or_else(|| resource.string_at("occurrencePeriod.start"))
        .or_else(|| match resource.at("occurrenceTiming.event")? {
            Value::Array(events) => events.first().and_then(|e| e.as_str()).map(str::to_owned),
            event => event.as_str().map(str::to_owned),
        })
}

fn item(supplied: &Value) -> SupplyDeliveryItem {
    let (item_code, coding_method, item_name) = match supplied.at("itemCodeableConcept") {
        Some(concept) => {
            let codings = concept.array_at("coding");
            let coded = codings.iter().find(|c| c.str_at("code").is_some());
            (
                coded.and_then(|c| c.string_at("code")),
                coded.and_then(|c| c.string_at("system")),
                codings
                    .iter()
                    .find_map(|c| c.string_at("display"))
                    .or_else(|| concept.string_at("text")),
            )
        }
        None => (None, None, supplied.string_at("itemReference.display")),
    };

    let quantity = supplied.text_at("quantity.value");
    SupplyDeliveryItem {
        item_code,
        item_name,
        coding_method,
        quantity_unit: quantity
            .as_ref()
            .and_then(|_| supplied.string_at("quantity.unit")),
        quantity,
        lot_number: None,
        expiration_date: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn maps_supplied_item_and_timing_event() {
        let resource = json!({
            "resourceType": "SupplyDelivery",
            "id": "sd-1",
            "status": "completed",
            "type": {"text": "Medication"},
            "occurrenceTiming": {"event": ["2024-07-01T10:00:00Z", "2024-07-02T10:00:00Z"]},
            "destination": {"reference": "Location/ward-2"},
            "supplier": {"reference": "Organization/pharm"},
            "suppliedItem": {
                "quantity": {"value": 10, "unit": "box"},
                "itemCodeableConcept": {"coding": [{"display": "Gauze"}, {"system": "http://snomed.info/sct", "code": "3468900"}]}
            },
            "note": [{"text": "Left at desk"}]
        });
        let content = map_one(&SupplyDeliveryMapper, &resource);

        let delivery = &content.supply_deliveries[0];
        assert_eq!(delivery.delivery_type.as_deref(), Some("Medication"));
        assert_eq!(delivery.delivered_on.as_deref(), Some("2024-07-01T10:00:00Z"));
        assert_eq!(delivery.destination.as_deref(), Some("ward-2"));
        assert_eq!(delivery.supplier.as_deref(), Some("pharm"));
        assert_eq!(delivery.notes.as_deref(), Some("Left at desk"));

        let item = &delivery.items[0];
        assert_eq!(item.item_code.as_deref(), Some("3468900"));
        assert_eq!(item.item_name.as_deref(), Some("Gauze"));
        assert_eq!(item.quantity.as_deref(), Some("10"));
        assert_eq!(item.quantity_unit.as_deref(), Some("box"));
    }
}
