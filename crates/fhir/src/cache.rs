//! Per-document reference cache.
//!
//! Resources often omit the identifiers of their parents (most commonly the patient). The
//! cache holds the identifiers seen so far in one document so dependents can fall back to
//! them. It is created fresh for every document and never shared between documents.
//!
//! Lookup order is fixed: a resource's own reference always wins; the cache is consulted
//! only when the resource has none.

use crate::extractors::{
    extract_encounter_reference, extract_patient_reference, extract_reference_id,
};
use crate::value::ValueExt;
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys the cache understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheKey {
    PatientId,
    EncounterId,
    OrderId,
}

impl CacheKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::PatientId => "patient_id",
            CacheKey::EncounterId => "encounter_id",
            CacheKey::OrderId => "order_id",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last-writer-wins store of cross-resource identifiers for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCache {
    entries: BTreeMap<CacheKey, String>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: CacheKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    /// Store `value` under `key`, replacing any previous value. Empty values are ignored.
    pub fn set(&mut self, key: CacheKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        tracing::trace!(key = key.as_str(), value = %value, "reference cache set");
        self.entries.insert(key, value);
    }

    /// Store `value` only if `key` is not yet populated.
    pub fn set_if_absent(&mut self, key: CacheKey, value: impl Into<String>) {
        if !self.entries.contains_key(&key) {
            self.set(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resource's own `subject` reference, else the cached patient id.
    pub fn resolve_patient_id(&self, resource: &Value) -> Option<String> {
        self.resolve(extract_patient_reference(resource), CacheKey::PatientId)
    }

    /// Patient id from the `field` reference (e.g. `patient` on resources that do not use
    /// `subject`), then `subject`, then the cache.
    pub fn resolve_patient_via(&self, resource: &Value, field: &str) -> Option<String> {
        let local = resource
            .at(field)
            .and_then(extract_reference_id)
            .or_else(|| extract_patient_reference(resource));
        self.resolve(local, CacheKey::PatientId)
    }

    /// Resource's own `encounter` reference, else the cached encounter id.
    pub fn resolve_encounter_id(&self, resource: &Value) -> Option<String> {
        self.resolve(extract_encounter_reference(resource), CacheKey::EncounterId)
    }

    /// `local` when present, else the cached value for `key`.
    pub fn resolve(&self, local: Option<String>, key: CacheKey) -> Option<String> {
        local.or_else(|| self.get(key).map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falls_back_to_cache_when_resource_has_no_subject() {
        let mut cache = ReferenceCache::new();
        cache.set(CacheKey::PatientId, "P1");

        let resource = json!({"resourceType": "Immunization"});
        assert_eq!(cache.resolve_patient_id(&resource).as_deref(), Some("P1"));
    }

    #[test]
    fn local_reference_wins_over_cache() {
        let mut cache = ReferenceCache::new();
        cache.set(CacheKey::PatientId, "P1");

        let resource = json!({"subject": {"reference": "Patient/P2"}});
        assert_eq!(cache.resolve_patient_id(&resource).as_deref(), Some("P2"));
    }

    #[test]
    fn named_patient_field_is_read_before_subject() {
        let mut cache = ReferenceCache::new();
        cache.set(CacheKey::PatientId, "P1");

        let resource = json!({"patient": {"reference": "Patient/P3"}});
        assert_eq!(
            cache.resolve_patient_via(&resource, "patient").as_deref(),
            Some("P3")
        );
        assert_eq!(
            cache.resolve_patient_via(&json!({}), "patient").as_deref(),
            Some("P1")
        );
    }

    #[test]
    fn last_writer_wins_and_empty_values_are_ignored() {
        let mut cache = ReferenceCache::new();
        cache.set(CacheKey::EncounterId, "E1");
        cache.set(CacheKey::EncounterId, "E2");
        cache.set(CacheKey::EncounterId, "");
        cache.set_if_absent(CacheKey::EncounterId, "E3");

        assert_eq!(cache.get(CacheKey::EncounterId), Some("E2"));
        assert_eq!(cache.get(CacheKey::OrderId), None);
    }
}
