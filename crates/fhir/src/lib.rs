//! FHIR resource mapping engine.
//!
//! This crate converts FHIR JSON resources into the canonical clinical model
//! (`pulse-canonical`). It performs no I/O: callers hand it parsed resources and receive a
//! populated [`canonical::ClinicalContent`] aggregate.
//!
//! The pieces, leaves first:
//! - [`value`]: never-failing path navigation over `serde_json::Value`
//! - [`extractors`]: shared readers for codes, displays, references and dates
//! - [`cache`]: per-document fallback store for cross-resource identifiers
//! - [`classification`]: override table plus built-in rules for ambiguous resource types
//! - [`registry`]: the [`ResourceMapper`] trait, the build-once registry and fan-out dispatch
//! - [`mappers`]: one mapper per supported resource type
//!
//! Mapping never fails for missing or malformed optional data; degradation shows up as
//! absent fields on the produced entities.

pub mod cache;
pub mod classification;
pub mod dates;
pub mod extractors;
pub mod mappers;
pub mod narrative;
pub mod registry;
pub mod value;

pub use cache::{CacheKey, ReferenceCache};
pub use classification::{ClassificationOverrides, Classifier, ClinicalFamily};
pub use registry::{build_registry, MapperRegistry, ResourceMapper};
pub use value::ValueExt;

/// Errors returned by the `fhir` crate.
///
/// Mapping itself never fails; these cover loading the override table and rejecting input
/// that is not a resource at all.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid override table: {0}")]
    InvalidOverrides(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Resource type of a JSON node, or an error if it is not a FHIR resource.
///
/// # Errors
///
/// Returns [`FhirError::InvalidInput`] when `resource` is not an object or has no
/// non-empty `resourceType`.
pub fn resource_type(resource: &serde_json::Value) -> FhirResult<&str> {
    if !resource.is_object() {
        return Err(FhirError::InvalidInput(
            "resource must be a JSON object".into(),
        ));
    }
    resource
        .str_at("resourceType")
        .ok_or_else(|| FhirError::InvalidInput("resource has no resourceType".into()))
}
