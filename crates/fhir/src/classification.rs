//! Classification of ambiguous resources into canonical families.
//!
//! Observations and diagnostic reports share one resource type across several canonical
//! families. Classification runs in two tiers:
//!
//! 1. the externally supplied override table: `category` codes first (in the order the
//!    resource lists them), then the primary code (`code.coding[0].code`, normally LOINC) in
//!    `loinc`;
//! 2. the built-in ordered rule set for the resource type, where the first matching rule wins.
//!
//! Classification never fails. An unclassified diagnostic report falls back to
//! [`ClinicalFamily::Diagnostic`]; an unclassified observation yields `None` and is dropped by
//! its mapper. The asymmetry is intentional.
//!
//! Override table format (YAML):
//!
//! ```yaml
//! overrides:
//!   category:
//!     social-history: lab
//!   loinc:
//!     "8867-4": vital_signs
//! ```

use crate::value::ValueExt;
use crate::{FhirError, FhirResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Canonical family a classifiable resource is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalFamily {
    VitalSigns,
    #[serde(rename = "lab", alias = "laboratory")]
    Laboratory,
    Imaging,
    Pathology,
    Microbiology,
    Cardiology,
    #[serde(alias = "blood bank")]
    BloodBank,
    /// Generic diagnostic test.
    #[serde(alias = "diagnostic_test", alias = "generic")]
    Diagnostic,
}

impl ClinicalFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ClinicalFamily::VitalSigns => "vital_signs",
            ClinicalFamily::Laboratory => "lab",
            ClinicalFamily::Imaging => "imaging",
            ClinicalFamily::Pathology => "pathology",
            ClinicalFamily::Microbiology => "microbiology",
            ClinicalFamily::Cardiology => "cardiology",
            ClinicalFamily::BloodBank => "blood_bank",
            ClinicalFamily::Diagnostic => "diagnostic",
        }
    }
}

impl std::fmt::Display for ClinicalFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-level override table, loaded once at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationOverrides {
    /// Category code to family.
    #[serde(default)]
    pub category: BTreeMap<String, ClinicalFamily>,
    /// Primary code (usually LOINC) to family.
    #[serde(default)]
    pub loinc: BTreeMap<String, ClinicalFamily>,
}

impl ClassificationOverrides {
    /// Parse an override table from YAML text.
    ///
    /// The text must have a top-level `overrides` mapping; empty text yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidOverrides`] naming the failing path (e.g.
    /// `overrides.loinc.8867-4`) when a family name is unknown or the shape is wrong.
    pub fn from_yaml_str(yaml_text: &str) -> FhirResult<Self> {
        if yaml_text.trim().is_empty() {
            return Ok(Self::default());
        }

        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        match serde_path_to_error::deserialize::<_, OverrideFileWire>(deserializer) {
            Ok(wire) => Ok(wire.overrides),
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                Err(FhirError::InvalidOverrides(format!(
                    "schema mismatch at {path}: {source}"
                )))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_empty() && self.loinc.is_empty()
    }
}

/// How a built-in rule compares a category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeMatcher {
    /// Case-insensitive prefix.
    Prefix(&'static str),
    /// Case-insensitive whole code.
    Exact(&'static str),
}

impl CodeMatcher {
    fn matches(self, code: &str) -> bool {
        let code = code.to_ascii_lowercase();
        match self {
            CodeMatcher::Prefix(prefix) => code.starts_with(prefix),
            CodeMatcher::Exact(exact) => code == exact,
        }
    }
}

/// One built-in classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub matcher: CodeMatcher,
    pub family: ClinicalFamily,
}

const fn rule(matcher: CodeMatcher, family: ClinicalFamily) -> Rule {
    Rule { matcher, family }
}

/// Observation category rules.
pub const OBSERVATION_RULES: &[Rule] = &[
    rule(CodeMatcher::Exact("vital-signs"), ClinicalFamily::VitalSigns),
    rule(CodeMatcher::Exact("laboratory"), ClinicalFamily::Laboratory),
    rule(CodeMatcher::Exact("imaging"), ClinicalFamily::Imaging),
    rule(CodeMatcher::Exact("microbiology"), ClinicalFamily::Microbiology),
];

/// Diagnostic report category rules.
pub const REPORT_RULES: &[Rule] = &[
    rule(CodeMatcher::Prefix("rad"), ClinicalFamily::Imaging),
    rule(CodeMatcher::Prefix("pat"), ClinicalFamily::Pathology),
    rule(CodeMatcher::Prefix("mic"), ClinicalFamily::Microbiology),
    rule(CodeMatcher::Prefix("card"), ClinicalFamily::Cardiology),
    rule(CodeMatcher::Prefix("lab"), ClinicalFamily::Laboratory),
    rule(CodeMatcher::Prefix("blood"), ClinicalFamily::BloodBank),
];

// ============================================================================
// Classifier
// ============================================================================

/// Read-only classifier shared by every mapping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classifier {
    overrides: ClassificationOverrides,
}

impl Classifier {
    pub fn new(overrides: ClassificationOverrides) -> Self {
        Self { overrides }
    }

    /// Family of an observation, or `None` when nothing matches.
    pub fn classify_observation(&self, resource: &Value) -> Option<ClinicalFamily> {
        self.classify(resource, OBSERVATION_RULES)
    }

    /// Family of a diagnostic report, falling back to [`ClinicalFamily::Diagnostic`].
    pub fn classify_report(&self, resource: &Value) -> ClinicalFamily {
        self.classify(resource, REPORT_RULES)
            .unwrap_or(ClinicalFamily::Diagnostic)
    }

    fn classify(&self, resource: &Value, rules: &[Rule]) -> Option<ClinicalFamily> {
        let codes = category_codes(resource);

        if let Some(family) = self.from_overrides(resource, &codes) {
            return Some(family);
        }

        let family = codes.iter().find_map(|code| {
            rules
                .iter()
                .find(|r| r.matcher.matches(code))
                .map(|r| r.family)
        });
        if family.is_none() {
            tracing::debug!(
                id = resource.str_at("id").unwrap_or("<none>"),
                categories = ?codes,
                "no classification rule matched"
            );
        }
        family
    }

    fn from_overrides(&self, resource: &Value, codes: &[&str]) -> Option<ClinicalFamily> {
        if self.overrides.is_empty() {
            return None;
        }
        codes
            .iter()
            .find_map(|code| self.overrides.category.get(*code).copied())
            .or_else(|| {
                resource
                    .str_at("code.coding.0.code")
                    .and_then(|code| self.overrides.loinc.get(code).copied())
            })
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideFileWire {
    #[serde(default)]
    overrides: ClassificationOverrides,
}

/// Every `category[].coding[].code`, in document order.
fn category_codes(resource: &Value) -> Vec<&str> {
    resource
        .array_at("category")
        .iter()
        .flat_map(|category| category.array_at("coding"))
        .filter_map(|coding| coding.str_at("code"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report_with_category(code: &str) -> Value {
        json!({
            "resourceType": "DiagnosticReport",
            "category": [{"coding": [{"code": code}]}]
        })
    }

    #[test]
    fn report_prefixes_classify_case_insensitively() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify_report(&report_with_category("RAD1")),
            ClinicalFamily::Imaging
        );
        assert_eq!(
            classifier.classify_report(&report_with_category("MIC2")),
            ClinicalFamily::Microbiology
        );
        assert_eq!(
            classifier.classify_report(&report_with_category("PATH")),
            ClinicalFamily::Pathology
        );
        assert_eq!(
            classifier.classify_report(&report_with_category("cardiology")),
            ClinicalFamily::Cardiology
        );
        assert_eq!(
            classifier.classify_report(&report_with_category("blood-bank")),
            ClinicalFamily::BloodBank
        );
        assert_eq!(
            classifier.classify_report(&report_with_category("LAB")),
            ClinicalFamily::Laboratory
        );
    }

    #[test]
    fn unclassified_report_falls_back_to_generic() {
        let classifier = Classifier::default();
        let report = json!({"resourceType": "DiagnosticReport"});
        assert_eq!(classifier.classify_report(&report), ClinicalFamily::Diagnostic);
        assert_eq!(
            classifier.classify_report(&report_with_category("xyz")),
            ClinicalFamily::Diagnostic
        );
    }

    #[test]
    fn observation_rules_are_exact_and_unmatched_is_none() {
        let classifier = Classifier::default();
        let vitals = json!({"category": [{"coding": [{"code": "vital-signs"}]}]});
        assert_eq!(
            classifier.classify_observation(&vitals),
            Some(ClinicalFamily::VitalSigns)
        );

        let survey = json!({"category": [{"coding": [{"code": "survey"}]}]});
        assert_eq!(classifier.classify_observation(&survey), None);

        let prefix_only = json!({"category": [{"coding": [{"code": "lab"}]}]});
        assert_eq!(classifier.classify_observation(&prefix_only), None);
    }

    #[test]
    fn overrides_win_over_built_in_rules() {
        let overrides = ClassificationOverrides::from_yaml_str(
            "overrides:\n  category:\n    vital-signs: lab\n  loinc:\n    \"8867-4\": vital_signs\n",
        )
        .expect("valid override table");
        let classifier = Classifier::new(overrides);

        let vitals = json!({"category": [{"coding": [{"code": "vital-signs"}]}]});
        assert_eq!(
            classifier.classify_observation(&vitals),
            Some(ClinicalFamily::Laboratory)
        );

        let by_loinc = json!({"code": {"coding": [{"code": "8867-4"}]}});
        assert_eq!(
            classifier.classify_observation(&by_loinc),
            Some(ClinicalFamily::VitalSigns)
        );
    }

    #[test]
    fn category_override_is_checked_before_loinc_override() {
        let mut overrides = ClassificationOverrides::default();
        overrides
            .category
            .insert("special".into(), ClinicalFamily::Imaging);
        overrides
            .loinc
            .insert("1234-5".into(), ClinicalFamily::Laboratory);
        let classifier = Classifier::new(overrides);

        let resource = json!({
            "category": [{"coding": [{"code": "special"}]}],
            "code": {"coding": [{"code": "1234-5"}]}
        });
        assert_eq!(
            classifier.classify_observation(&resource),
            Some(ClinicalFamily::Imaging)
        );
    }

    #[test]
    fn unknown_family_names_are_rejected_with_path() {
        let err = ClassificationOverrides::from_yaml_str(
            "overrides:\n  loinc:\n    \"8867-4\": heartbeat\n",
        )
        .expect_err("unknown family should fail");
        match err {
            FhirError::InvalidOverrides(msg) => assert!(msg.contains("overrides.loinc"), "{msg}"),
            other => panic!("expected InvalidOverrides error, got {other:?}"),
        }
    }

    #[test]
    fn empty_text_is_an_empty_table() {
        let overrides = ClassificationOverrides::from_yaml_str("  \n").expect("empty ok");
        assert!(overrides.is_empty());
    }
}
