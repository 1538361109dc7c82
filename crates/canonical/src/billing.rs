//! Revenue-cycle entities: claims with their charges, payments and adjustments.
//!
//! Claims are the one family that is reconciled rather than appended: a payment source
//! (explanation of benefit) arriving before or after its claim lands on the same [`Claim`],
//! keyed by `claim_id`. See [`crate::ClinicalContent::upsert_claim`].

use crate::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Submitted,
    Accepted,
    Denied,
    Adjusted,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Professional,
    Institutional,
    Dental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Posted,
    Adjusted,
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Insurance,
    Patient,
    Adjustment,
    Refund,
}

/// One billable line item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Charge {
    /// `{claim_id}-{sequence}`.
    pub charge_id: String,
    pub encounter_id: Option<String>,
    pub patient_id: Option<String>,
    pub service_date: Option<Timestamp>,
    pub charge_code: Option<String>,
    pub charge_description: Option<String>,
    /// Unit price times quantity.
    pub charge_amount: Decimal,
    pub quantity: Option<Decimal>,
    pub performing_provider_id: Option<String>,
    pub ordering_provider_id: Option<String>,
    pub revenue_code: Option<String>,
    pub cpt_hcpcs_code: Option<String>,
    #[serde(default)]
    pub diagnosis_pointers: Vec<String>,
    pub charge_status: Option<ChargeStatus>,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: String,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    pub charge_id: Option<String>,
    pub payer_id: Option<String>,
    pub payment_date: Option<Timestamp>,
    pub payment_amount: Decimal,
    pub payment_type: Option<PaymentType>,
    pub check_number: Option<String>,
    pub remit_advice_code: Option<String>,
    pub remit_advice_description: Option<String>,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Adjustment {
    pub adjustment_id: String,
    pub charge_id: Option<String>,
    pub payment_id: Option<String>,
    pub adjustment_date: Option<Timestamp>,
    pub adjustment_reason_code: Option<String>,
    pub adjustment_reason_description: Option<String>,
    pub adjustment_amount: Decimal,
    pub adjustment_type: Option<String>,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub patient_id: Option<String>,
    pub encounter_id: Option<String>,
    pub claim_date: Option<Timestamp>,
    pub payer_id: Option<String>,
    pub total_charge_amount: Decimal,
    pub total_payment_amount: Decimal,
    pub claim_status: Option<ClaimStatus>,
    pub claim_type: Option<ClaimType>,
    pub service_start_date: Option<Timestamp>,
    pub service_end_date: Option<Timestamp>,
    #[serde(default)]
    pub charges: Vec<Charge>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
    pub organization_id: Option<String>,
}

impl Claim {
    /// Empty claim shell keyed by `claim_id`.
    pub fn placeholder(claim_id: impl Into<String>) -> Self {
        Self {
            claim_id: claim_id.into(),
            ..Default::default()
        }
    }

    /// Record an insurer payment, replacing one with the same `payment_id`.
    pub fn apply_payment(&mut self, payment: Payment) {
        upsert_by(&mut self.payments, payment, |p| p.payment_id.as_str());
        self.total_payment_amount = self.payments.iter().map(|p| p.payment_amount).sum();
    }

    /// Record adjustments, replacing any with the same `adjustment_id`.
    pub fn apply_adjustments(&mut self, adjustments: impl IntoIterator<Item = Adjustment>) {
        for adjustment in adjustments {
            upsert_by(&mut self.adjustments, adjustment, |a| a.adjustment_id.as_str());
        }
    }

    /// Merge a freshly mapped claim into this one.
    ///
    /// Header fields present on `other` replace the stored ones, except that a claim already
    /// marked [`ClaimStatus::Paid`] stays paid. Charges, payments and adjustments are keyed by
    /// their ids, so mapping the same resource twice leaves the claim unchanged. Totals are
    /// recomputed from the merged items.
    pub fn absorb(&mut self, other: Claim) {
        fn take<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }

        take(&mut self.patient_id, other.patient_id);
        take(&mut self.encounter_id, other.encounter_id);
        take(&mut self.claim_date, other.claim_date);
        take(&mut self.payer_id, other.payer_id);
        take(&mut self.claim_type, other.claim_type);
        take(&mut self.service_start_date, other.service_start_date);
        take(&mut self.service_end_date, other.service_end_date);
        take(&mut self.organization_id, other.organization_id);

        if self.claim_status != Some(ClaimStatus::Paid) {
            take(&mut self.claim_status, other.claim_status);
        }

        for charge in other.charges {
            upsert_by(&mut self.charges, charge, |c| c.charge_id.as_str());
        }
        self.total_charge_amount = self.charges.iter().map(|c| c.charge_amount).sum();
        for payment in other.payments {
            self.apply_payment(payment);
        }
        self.apply_adjustments(other.adjustments);
    }
}

/// Replace the item whose key matches `incoming`, or append it.
fn upsert_by<T>(items: &mut Vec<T>, incoming: T, key: impl Fn(&T) -> &str) {
    match items.iter().position(|item| key(item) == key(&incoming)) {
        Some(pos) => items[pos] = incoming,
        None => items.push(incoming),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_keeps_paid_status_and_sums_totals() {
        let mut placeholder = Claim::placeholder("C1");
        placeholder.claim_status = Some(ClaimStatus::Paid);
        placeholder.apply_payment(Payment {
            payment_id: "E1-payment".into(),
            payment_amount: Decimal::new(8000, 2),
            ..Default::default()
        });

        let mapped = Claim {
            claim_id: "C1".into(),
            claim_status: Some(ClaimStatus::Accepted),
            claim_type: Some(ClaimType::Professional),
            total_charge_amount: Decimal::new(10000, 2),
            charges: vec![Charge {
                charge_id: "C1-1".into(),
                charge_amount: Decimal::new(10000, 2),
                ..Default::default()
            }],
            ..Default::default()
        };

        placeholder.absorb(mapped);

        assert_eq!(placeholder.claim_status, Some(ClaimStatus::Paid));
        assert_eq!(placeholder.claim_type, Some(ClaimType::Professional));
        assert_eq!(placeholder.total_charge_amount, Decimal::new(100, 0));
        assert_eq!(placeholder.total_payment_amount, Decimal::new(80, 0));
        assert_eq!(placeholder.charges.len(), 1);
        assert_eq!(placeholder.payments.len(), 1);
    }

    #[test]
    fn absorbing_the_same_claim_twice_does_not_duplicate_charges() {
        let mapped = Claim {
            claim_id: "C1".into(),
            total_charge_amount: Decimal::new(100, 0),
            charges: vec![Charge {
                charge_id: "C1-1".into(),
                charge_amount: Decimal::new(100, 0),
                ..Default::default()
            }],
            ..Default::default()
        };

        let mut stored = mapped.clone();
        stored.absorb(mapped);

        assert_eq!(stored.charges.len(), 1);
        assert_eq!(stored.total_charge_amount, Decimal::new(100, 0));
    }

    #[test]
    fn absorb_replaces_matching_charges_and_appends_new_ones() {
        let mut stored = Claim {
            claim_id: "C1".into(),
            charges: vec![Charge {
                charge_id: "C1-1".into(),
                charge_amount: Decimal::new(100, 0),
                ..Default::default()
            }],
            total_charge_amount: Decimal::new(100, 0),
            ..Default::default()
        };

        stored.absorb(Claim {
            claim_id: "C1".into(),
            charges: vec![
                Charge {
                    charge_id: "C1-1".into(),
                    charge_amount: Decimal::new(120, 0),
                    ..Default::default()
                },
                Charge {
                    charge_id: "C1-2".into(),
                    charge_amount: Decimal::new(30, 0),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });

        assert_eq!(stored.charges.len(), 2);
        assert_eq!(stored.charges[0].charge_amount, Decimal::new(120, 0));
        assert_eq!(stored.total_charge_amount, Decimal::new(150, 0));
    }

    #[test]
    fn repeated_payment_is_recorded_once() {
        let mut claim = Claim::placeholder("C1");
        for _ in 0..2 {
            claim.apply_payment(Payment {
                payment_id: "E1-payment".into(),
                payment_amount: Decimal::new(80, 0),
                ..Default::default()
            });
        }

        assert_eq!(claim.payments.len(), 1);
        assert_eq!(claim.total_payment_amount, Decimal::new(80, 0));
    }

    #[test]
    fn statuses_serialise_lowercase() {
        let json = serde_json::to_string(&ClaimStatus::Paid).expect("serialise status");
        assert_eq!(json, "\"paid\"");
    }
}
