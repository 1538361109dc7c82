//! # Pulse Core
//!
//! Orchestration around the `fhir` mapping engine:
//! - [`config`]: startup configuration and override-table loading
//! - [`ingest`]: raw text to mapped aggregates, including bundle cache pre-seeding
//! - [`tracking`]: per-record outcome recording
//! - [`files`]: input discovery and aggregate output for batch runs
//!
//! **No mapping logic**: resource-specific behaviour belongs in the `fhir` crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod files;
pub mod ingest;
pub mod tracking;

pub use config::{load_overrides, CoreConfig};
pub use error::{CoreError, CoreResult, ErrorCategory};
pub use ingest::{Ingested, IngestedDocument, Ingester, ItemFailure};
pub use tracking::{IngestionStage, MemoryTracker, OutcomeTracker, TrackingSummary};
