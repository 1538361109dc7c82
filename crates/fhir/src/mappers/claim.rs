//! Claim mapping.
//!
//! Each `item` becomes a [`Charge`] priced at `unitPrice × quantity`. The finished claim is pushed
//! through [`ClinicalContent::push`], which merges it into a placeholder left by an earlier
//! explanation of benefit.

use crate::cache::ReferenceCache;
use crate::dates::datetime_at;
use crate::extractors::extract_reference_id;
use crate::registry::ResourceMapper;
use crate::value::{scalar_text, ValueExt};
use canonical::{
    CanonicalEntity, Charge, ChargeStatus, Claim, ClaimStatus, ClaimType, ClinicalContent,
    Timestamp,
};
use rust_decimal::Decimal;
use serde_json::Value;

pub struct ClaimMapper;

impl ResourceMapper for ClaimMapper {
    fn name(&self) -> &'static str {
        "claim"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Claim"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let Some(claim_id) = resource.string_at("id") else {
            tracing::warn!("claim without id dropped");
            return;
        };

        let patient_id = cache.resolve_patient_via(resource, "patient");
        let encounter_id = cache.resolve_encounter_id(resource);
        let service_start_date = datetime_at(resource, "billablePeriod.start");

        let line = ChargeContext {
            claim_id: &claim_id,
            patient_id: &patient_id,
            encounter_id: &encounter_id,
            service_date: service_start_date,
        };
        let charges: Vec<Charge> = resource
            .array_at("item")
            .iter()
            .map(|item| line.charge(item))
            .collect();
        let total_charge_amount = charges.iter().map(|c| c.charge_amount).sum();

        content.push(CanonicalEntity::Claim(Claim {
            claim_date: datetime_at(resource, "created"),
            payer_id: resource.at("insurer").and_then(extract_reference_id),
            claim_status: Some(claim_status(resource.str_at("status"))),
            claim_type: claim_type(resource),
            service_start_date,
            service_end_date: datetime_at(resource, "billablePeriod.end"),
            total_charge_amount,
            total_payment_amount: Decimal::ZERO,
            charges,
            claim_id,
            patient_id,
            encounter_id,
            ..Default::default()
        }));
    }
}

fn claim_status(status: Option<&str>) -> ClaimStatus {
    match status {
        Some("active") => ClaimStatus::Accepted,
        Some("cancelled" | "entered-in-error") => ClaimStatus::Denied,
        _ => ClaimStatus::Submitted,
    }
}

/// Last recognised `type.coding` code wins.
fn claim_type(resource: &Value) -> Option<ClaimType> {
    resource
        .array_at("type.coding")
        .iter()
        .filter_map(|coding| match coding.str_at("code")? {
            "institutional" => Some(ClaimType::Institutional),
            "professional" => Some(ClaimType::Professional),
            "oral" => Some(ClaimType::Dental),
            _ => None,
        })
        .last()
}

struct ChargeContext<'a> {
    claim_id: &'a str,
    patient_id: &'a Option<String>,
    encounter_id: &'a Option<String>,
    service_date: Option<Timestamp>,
}

impl ChargeContext<'_> {
    fn charge(&self, item: &Value) -> Charge {
        let sequence = item.text_at("sequence").unwrap_or_default();
        let code = item.string_at("productOrService.coding.0.code");
        let quantity = item.decimal_at("quantity.value").unwrap_or(Decimal::ONE);
        let unit_price = item.decimal_at("unitPrice.value").unwrap_or(Decimal::ZERO);

        Charge {
            charge_id: format!("{}-{}", self.claim_id, sequence),
            patient_id: self.patient_id.clone(),
            encounter_id: self.encounter_id.clone(),
            service_date: self.service_date,
            charge_description: item
                .string_at("productOrService.coding.0.display")
                .or_else(|| item.string_at("productOrService.text")),
            charge_amount: unit_price * quantity,
            quantity: Some(quantity),
            cpt_hcpcs_code: code.clone(),
            charge_code: code,
            diagnosis_pointers: item
                .array_at("diagnosisLinkId")
                .iter()
                .filter_map(|link| match link {
                    Value::Object(_) => link.text_at("value"),
                    other => scalar_text(other),
                })
                .collect(),
            charge_status: Some(ChargeStatus::Posted),
            ..Default::default()
        }
    }
}
