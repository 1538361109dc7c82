//! ExplanationOfBenefit mapping.
//!
//! An explanation of benefit never produces an entity of its own. Its payment and adjustments
//! land on the claim named by `claim.reference`, which is created as a placeholder when the
//! claim itself has not been mapped yet.

use crate::cache::ReferenceCache;
use crate::dates::datetime_at;
use crate::extractors::extract_reference_id;
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{Adjustment, ClaimStatus, ClinicalContent, Payment, PaymentType, Timestamp};
use rust_decimal::Decimal;
use serde_json::Value;

const TOTAL_CATEGORIES: &[&str] = &["benefit", "deductible", "copay", "coinsurance", "noncovered"];
const ITEM_CATEGORIES: &[&str] = &[
    "contractual",
    "deductible",
    "copay",
    "coinsurance",
    "noncovered",
];

pub struct ExplanationOfBenefitMapper;

impl ResourceMapper for ExplanationOfBenefitMapper {
    fn name(&self) -> &'static str {
        "explanation_of_benefit"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["ExplanationOfBenefit"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let eob_id = resource.str_at("id").unwrap_or_default();
        let Some(claim_id) = resource.at("claim").and_then(extract_reference_id) else {
            tracing::warn!(eob_id, "explanation of benefit without claim reference dropped");
            return;
        };

        let patient_id = cache.resolve_patient_via(resource, "patient");
        let encounter_id = cache.resolve_encounter_id(resource);
        let payer_id = resource.at("insurer").and_then(extract_reference_id);
        let payment_date = datetime_at(resource, "payment.date");

        let payment = positive_amount(resource, "payment.amount.value").map(|amount| Payment {
            payment_id: format!("{eob_id}-payment"),
            patient_id: patient_id.clone(),
            encounter_id: encounter_id.clone(),
            payer_id: payer_id.clone(),
            payment_date,
            payment_amount: amount,
            payment_type: Some(PaymentType::Insurance),
            check_number: resource.string_at("payment.identifier.value"),
            ..Default::default()
        });

        let adjustments = AdjustmentContext {
            eob_id,
            payment_id: payment.as_ref().map(|p| p.payment_id.clone()),
            adjustment_date: payment_date,
        }
        .collect(resource);

        let claim = content.upsert_claim(&claim_id);
        // A fresh placeholder takes the header fields the explanation knows about.
        if claim.patient_id.is_none() {
            claim.patient_id = patient_id;
        }
        if claim.encounter_id.is_none() {
            claim.encounter_id = encounter_id;
        }
        if claim.payer_id.is_none() {
            claim.payer_id = payer_id;
        }
        if resource.str_at("status") == Some("active") {
            claim.claim_status = Some(ClaimStatus::Paid);
        }
        if let Some(payment) = payment {
            claim.apply_payment(payment);
        }
        claim.apply_adjustments(adjustments);

        tracing::debug!(claim_id = %claim_id, eob_id, "explanation of benefit applied to claim");
    }
}

fn positive_amount(node: &Value, path: &str) -> Option<Decimal> {
    node.decimal_at(path).filter(|amount| *amount > Decimal::ZERO)
}

struct AdjustmentContext<'a> {
    eob_id: &'a str,
    payment_id: Option<String>,
    adjustment_date: Option<Timestamp>,
}

impl AdjustmentContext<'_> {
    fn collect(&self, resource: &Value) -> Vec<Adjustment> {
        let totals = resource.array_at("total").iter().filter_map(|total| {
            self.adjustment(total, TOTAL_CATEGORIES, |code| {
                format!("{}-adj-{code}", self.eob_id)
            })
        });

        let items = resource.array_at("item").iter().flat_map(|item| {
            let sequence = item.text_at("sequence").unwrap_or_default();
            item.array_at("adjudication")
                .iter()
                .filter_map(move |adjudication| {
                    self.adjustment(adjudication, ITEM_CATEGORIES, |code| {
                        format!("{}-item-{sequence}-adj-{code}", self.eob_id)
                    })
                })
        });

        totals.chain(items).collect()
    }

    /// An adjustment for a node whose category is in `categories` and whose amount is positive.
    fn adjustment(
        &self,
        node: &Value,
        categories: &[&str],
        id: impl FnOnce(&str) -> String,
    ) -> Option<Adjustment> {
        let code = node.str_at("category.coding.0.code")?;
        if !categories.contains(&code) {
            return None;
        }
        let amount = positive_amount(node, "amount.value")?;

        Some(Adjustment {
            adjustment_id: id(code),
            payment_id: self.payment_id.clone(),
            adjustment_date: self.adjustment_date,
            adjustment_reason_code: Some(code.to_owned()),
            adjustment_reason_description: node.string_at("category.coding.0.display"),
            adjustment_amount: amount,
            adjustment_type: Some(code.to_owned()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    fn eob() -> Value {
        json!({
            "resourceType": "ExplanationOfBenefit",
            "id": "E1",
            "status": "active",
            "claim": {"reference": "Claim/C1"},
            "patient": {"reference": "Patient/p1"},
            "insurer": {"reference": "Organization/payer-9"},
            "payment": {
                "date": "2024-03-15",
                "amount": {"value": 120.00},
                "identifier": {"value": "CHK-001"}
            },
            "total": [
                {"category": {"coding": [{"code": "submitted"}]}, "amount": {"value": 171.00}},
                {"category": {"coding": [{"code": "copay", "display": "CoPay"}]}, "amount": {"value": 20}},
                {"category": {"coding": [{"code": "deductible"}]}, "amount": {"value": 0}}
            ],
            "item": [{
                "sequence": 1,
                "adjudication": [
                    {"category": {"coding": [{"code": "contractual"}]}, "amount": {"value": 31}},
                    {"category": {"coding": [{"code": "eligible"}]}, "amount": {"value": 120}}
                ]
            }]
        })
    }

    #[test]
    fn creates_placeholder_claim_with_payment_and_adjustments() {
        let content = map_one(&ExplanationOfBenefitMapper, &eob());

        assert_eq!(content.claims.len(), 1);
        let claim = content.claim("C1").expect("placeholder claim");
        assert_eq!(claim.claim_status, Some(ClaimStatus::Paid));
        assert_eq!(claim.patient_id.as_deref(), Some("p1"));
        assert_eq!(claim.payer_id.as_deref(), Some("payer-9"));
        assert_eq!(claim.total_payment_amount, Decimal::new(120, 0));
        assert_eq!(claim.total_charge_amount, Decimal::ZERO);

        let payment = &claim.payments[0];
        assert_eq!(payment.payment_id, "E1-payment");
        assert_eq!(payment.check_number.as_deref(), Some("CHK-001"));
        assert_eq!(payment.payment_type, Some(PaymentType::Insurance));
        assert!(payment.payment_date.is_some());

        let ids: Vec<&str> = claim
            .adjustments
            .iter()
            .map(|a| a.adjustment_id.as_str())
            .collect();
        assert_eq!(ids, vec!["E1-adj-copay", "E1-item-1-adj-contractual"]);
        assert_eq!(
            claim.adjustments[0].payment_id.as_deref(),
            Some("E1-payment")
        );
        assert_eq!(
            claim.adjustments[0].adjustment_reason_description.as_deref(),
            Some("CoPay")
        );
    }

    #[test]
    fn zero_payment_is_not_recorded() {
        let mut resource = eob();
        resource["payment"]["amount"]["value"] = json!(0);
        let content = map_one(&ExplanationOfBenefitMapper, &resource);

        let claim = content.claim("C1").expect("placeholder claim");
        assert!(claim.payments.is_empty());
        assert_eq!(claim.adjustments[0].payment_id, None);
    }

    #[test]
    fn missing_claim_reference_drops_the_explanation() {
        let mut resource = eob();
        resource.as_object_mut().expect("object").remove("claim");
        let content = map_one(&ExplanationOfBenefitMapper, &resource);

        assert!(content.claims.is_empty());
    }
}
