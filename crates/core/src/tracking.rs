//! Per-record outcome tracking.
//!
//! The mapping engine knows nothing about tracking; the orchestrator records one outcome per
//! input record through an [`OutcomeTracker`]. [`MemoryTracker`] keeps the records in memory
//! and summarises them at the end of a run.

use crate::{CoreError, ErrorCategory, IngestedDocument};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    Skipped,
}

/// Where in the pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStage {
    Parsing,
    Validation,
    Transformation,
    Persistence,
}

impl IngestionStage {
    /// Stage a failure of `category` is attributed to.
    pub fn for_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::ParseError => IngestionStage::Parsing,
            ErrorCategory::ValidationError | ErrorCategory::SchemaError => {
                IngestionStage::Validation
            }
            ErrorCategory::TransformationError => IngestionStage::Transformation,
            ErrorCategory::SystemError => IngestionStage::Persistence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub record_id: String,
    pub record_type: Option<String>,
    pub outcome: Outcome,
    pub stage: Option<IngestionStage>,
    pub error_category: Option<ErrorCategory>,
    /// Error text for failures, the reason for skips.
    pub message: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

pub trait OutcomeTracker {
    fn record_success(&mut self, record_id: &str, record_type: Option<&str>);

    fn record_failure(&mut self, record_id: &str, error: &CoreError, stage: IngestionStage);

    fn record_skip(&mut self, record_id: &str, reason: &str);

    /// Record a mapped document as a success, or as a skip when nothing was mapped from it.
    fn record_document(&mut self, document: &IngestedDocument) {
        if document.content.is_empty() {
            self.record_skip(
                &document.record_id,
                &format!("no mappable resources in {}", document.source_type),
            );
        } else {
            self.record_success(&document.record_id, Some(&document.source_type));
        }
    }
}

/// Totals across a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackingSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors_by_category: BTreeMap<String, usize>,
}

impl TrackingSummary {
    /// Share of records that succeeded, `0.0` for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryTracker {
    records: Vec<OutcomeRecord>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn summary(&self) -> TrackingSummary {
        let mut summary = TrackingSummary {
            total: self.records.len(),
            ..Default::default()
        };
        for record in &self.records {
            match record.outcome {
                Outcome::Success => summary.succeeded += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Failure => {
                    summary.failed += 1;
                    if let Some(category) = record.error_category {
                        *summary
                            .errors_by_category
                            .entry(category.as_str().to_owned())
                            .or_default() += 1;
                    }
                }
            }
        }
        summary
    }

    fn push(&mut self, record: OutcomeRecord) {
        tracing::trace!(record_id = %record.record_id, outcome = ?record.outcome, "outcome recorded");
        self.records.push(record);
    }
}

impl OutcomeTracker for MemoryTracker {
    fn record_success(&mut self, record_id: &str, record_type: Option<&str>) {
        self.push(OutcomeRecord {
            record_id: record_id.to_owned(),
            record_type: record_type.map(str::to_owned),
            outcome: Outcome::Success,
            stage: None,
            error_category: None,
            message: None,
            recorded_at: Utc::now(),
        });
    }

    fn record_failure(&mut self, record_id: &str, error: &CoreError, stage: IngestionStage) {
        self.push(OutcomeRecord {
            record_id: record_id.to_owned(),
            record_type: None,
            outcome: Outcome::Failure,
            stage: Some(stage),
            error_category: Some(error.category()),
            message: Some(error.to_string()),
            recorded_at: Utc::now(),
        });
    }

    fn record_skip(&mut self, record_id: &str, reason: &str) {
        self.push(OutcomeRecord {
            record_id: record_id.to_owned(),
            record_type: None,
            outcome: Outcome::Skipped,
            stage: None,
            error_category: None,
            message: Some(reason.to_owned()),
            recorded_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonical::{CanonicalEntity, ClinicalContent, Patient};

    fn document(content: ClinicalContent) -> IngestedDocument {
        IngestedDocument {
            record_id: "r1".into(),
            source_type: "Basic".into(),
            resource_count: 1,
            content,
        }
    }

    #[test]
    fn summary_counts_outcomes_and_error_categories() {
        let mut tracker = MemoryTracker::new();
        tracker.record_success("r1", Some("Bundle"));
        tracker.record_success("r2", Some("Patient"));
        tracker.record_failure("r3", &CoreError::EmptyInput, IngestionStage::Parsing);
        tracker.record_skip("r4", "no mapper for Basic");

        let summary = tracker.summary();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors_by_category.get("validation_error"), Some(&1));
        assert!((summary.success_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn failure_keeps_stage_and_message() {
        let mut tracker = MemoryTracker::new();
        tracker.record_failure(
            "r1",
            &CoreError::Schema("resource has no resourceType".into()),
            IngestionStage::Validation,
        );

        let record = &tracker.records()[0];
        assert_eq!(record.outcome, Outcome::Failure);
        assert_eq!(record.stage, Some(IngestionStage::Validation));
        assert_eq!(record.error_category, Some(ErrorCategory::SchemaError));
        assert!(record
            .message
            .as_deref()
            .is_some_and(|m| m.contains("resourceType")));
    }

    #[test]
    fn stage_follows_error_category() {
        let err = CoreError::Transformation("empty bundle".into());
        assert_eq!(
            IngestionStage::for_category(err.category()),
            IngestionStage::Transformation
        );
        assert_eq!(
            IngestionStage::for_category(ErrorCategory::SchemaError),
            IngestionStage::Validation
        );
    }

    #[test]
    fn document_without_entities_is_skipped() {
        let mut tracker = MemoryTracker::new();
        tracker.record_document(&document(ClinicalContent::new()));

        let record = &tracker.records()[0];
        assert_eq!(record.outcome, Outcome::Skipped);
        assert!(record
            .message
            .as_deref()
            .is_some_and(|m| m.contains("Basic")));
        assert_eq!(tracker.summary().skipped, 1);
    }

    #[test]
    fn document_with_entities_is_a_success() {
        let mut content = ClinicalContent::new();
        content.push(CanonicalEntity::Patient(Patient::default()));

        let mut tracker = MemoryTracker::new();
        tracker.record_document(&document(content));

        let record = &tracker.records()[0];
        assert_eq!(record.outcome, Outcome::Success);
        assert_eq!(record.record_type.as_deref(), Some("Basic"));
    }

    #[test]
    fn empty_run_has_zero_success_rate() {
        assert_eq!(MemoryTracker::new().summary().success_rate(), 0.0);
    }
}
