//! Document ingestion.
//!
//! Turns raw JSON text into mapped aggregates. Accepted shapes:
//! - a single resource, mapped into its own aggregate
//! - a `Bundle`, whose entries are mapped in order into one aggregate
//! - a JSON array of resources or bundles, one aggregate per item
//!
//! Before a bundle is mapped its entries are scanned once and the reference cache is seeded with
//! the first Patient, Encounter and ServiceRequest ids. Dependents therefore see the patient id
//! even when the Patient entry comes last.

use crate::constants::{BUNDLE_RESOURCE_TYPE, SNIPPET_LEN};
use crate::{CoreError, CoreResult};
use canonical::ClinicalContent;
use fhir::{CacheKey, MapperRegistry, ReferenceCache, ValueExt};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// One mapped document.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    /// Random id used when recording the outcome.
    pub record_id: String,
    /// `resourceType` of the top-level item, e.g. `Bundle`.
    pub source_type: String,
    /// Resources handed to the registry.
    pub resource_count: usize,
    pub content: ClinicalContent,
}

/// An array item that could not be mapped.
#[derive(Debug)]
pub struct ItemFailure {
    pub index: usize,
    pub resource_type: Option<String>,
    pub error: CoreError,
}

/// Result of [`Ingester::parse`].
#[derive(Debug)]
pub enum Ingested {
    Single(IngestedDocument),
    /// A JSON array; at least one item succeeded.
    Batch {
        documents: Vec<IngestedDocument>,
        failures: Vec<ItemFailure>,
    },
}

impl Ingested {
    /// Successfully mapped documents, in input order.
    pub fn into_documents(self) -> Vec<IngestedDocument> {
        match self {
            Ingested::Single(document) => vec![document],
            Ingested::Batch { documents, .. } => documents,
        }
    }
}

/// Maps raw input through a shared registry.
#[derive(Debug, Clone)]
pub struct Ingester {
    registry: Arc<MapperRegistry>,
}

impl Ingester {
    pub fn new(registry: Arc<MapperRegistry>) -> Self {
        Self { registry }
    }

    /// Parse and map raw JSON text.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyInput`] for blank text
    /// - [`CoreError::Parse`] for invalid JSON
    /// - [`CoreError::Schema`] or [`CoreError::Transformation`] for a single item that cannot
    ///   be mapped
    /// - [`CoreError::AllItemsFailed`] when every item of an array fails
    pub fn parse(&self, raw: &str) -> CoreResult<Ingested> {
        if raw.trim().is_empty() {
            return Err(CoreError::EmptyInput);
        }

        let data: Value = serde_json::from_str(raw).map_err(|source| CoreError::Parse {
            snippet: snippet(raw),
            source,
        })?;

        let items = match data {
            Value::Array(items) => items,
            other => return self.ingest_value(&other).map(Ingested::Single),
        };

        tracing::info!(items = items.len(), "ingesting array of resources");
        let mut documents = Vec::new();
        let mut failures = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.ingest_value(item) {
                Ok(document) => documents.push(document),
                Err(error) => {
                    tracing::error!(index, %error, "array item failed");
                    failures.push(ItemFailure {
                        index,
                        resource_type: item.string_at("resourceType"),
                        error,
                    });
                }
            }
        }

        if documents.is_empty() && !failures.is_empty() {
            let failed = failures.len();
            let first = failures.remove(0).error;
            return Err(CoreError::AllItemsFailed {
                failed,
                first: Box::new(first),
            });
        }
        if !failures.is_empty() {
            tracing::warn!(
                succeeded = documents.len(),
                failed = failures.len(),
                "array partially ingested"
            );
        }

        Ok(Ingested::Batch {
            documents,
            failures,
        })
    }

    /// Map one already-parsed resource or bundle.
    pub fn ingest_value(&self, data: &Value) -> CoreResult<IngestedDocument> {
        let source_type = fhir::resource_type(data)
            .map_err(|e| CoreError::Schema(e.to_string()))?
            .to_owned();

        let (content, resource_count) = if source_type == BUNDLE_RESOURCE_TYPE {
            self.map_bundle(data)?
        } else {
            if !self.registry.supports(data) {
                tracing::warn!(resource_type = %source_type, "no mapper found for resource type");
            }
            let mut cache = ReferenceCache::new();
            (self.registry.map_document([data], &mut cache), 1)
        };

        let record_id = Uuid::new_v4().simple().to_string();
        tracing::debug!(
            record_id = %record_id,
            resource_type = %source_type,
            resources = resource_count,
            entities = content.entity_count(),
            "document mapped"
        );

        Ok(IngestedDocument {
            record_id,
            source_type,
            resource_count,
            content,
        })
    }

    fn map_bundle(&self, bundle: &Value) -> CoreResult<(ClinicalContent, usize)> {
        let entries = bundle.array_at("entry");
        let resources: Vec<&Value> = entries
            .iter()
            .filter_map(|entry| entry.at("resource"))
            .filter(|resource| resource.is_object())
            .collect();
        tracing::info!(entries = entries.len(), "processing bundle");

        if resources.is_empty() {
            return Err(CoreError::Transformation(format!(
                "bundle ({}) has no entry resources",
                bundle.str_at("type").unwrap_or("unknown")
            )));
        }

        let mut cache = seed_cache(&resources);
        let count = resources.len();
        Ok((self.registry.map_document(resources, &mut cache), count))
    }
}

/// Cache seeded with the first Patient, Encounter and ServiceRequest/Order ids.
pub fn seed_cache(resources: &[&Value]) -> ReferenceCache {
    let mut cache = ReferenceCache::new();
    for resource in resources {
        let Some(id) = resource.str_at("id") else {
            continue;
        };
        let key = match resource.str_at("resourceType") {
            Some("Patient") => CacheKey::PatientId,
            Some("Encounter") => CacheKey::EncounterId,
            Some("ServiceRequest" | "Order") => CacheKey::OrderId,
            _ => continue,
        };
        cache.set_if_absent(key, id);
    }
    cache
}

fn snippet(raw: &str) -> String {
    match raw.char_indices().nth(SNIPPET_LEN) {
        Some((end, _)) => format!("{}...", &raw[..end]),
        None => raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::{build_registry, Classifier};
    use serde_json::json;

    fn ingester() -> Ingester {
        Ingester::new(Arc::new(build_registry(Classifier::default())))
    }

    fn bundle() -> Value {
        json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {
                    "resourceType": "Condition",
                    "category": [{"coding": [{"code": "problem-list-item"}]}],
                    "code": {"text": "Asthma"}
                }},
                {"resource": {"resourceType": "Encounter", "id": "enc-1", "status": "finished"}},
                {"resource": {"resourceType": "Patient", "id": "pat-1", "gender": "female"}}
            ]
        })
    }

    #[test]
    fn seeding_gives_dependents_a_patient_that_appears_later() {
        let document = ingester().ingest_value(&bundle()).expect("bundle maps");

        assert_eq!(document.source_type, "Bundle");
        assert_eq!(document.resource_count, 3);
        let problem = &document.content.problem_list[0];
        assert_eq!(problem.patient_id.as_deref(), Some("pat-1"));
        assert_eq!(problem.encounter_id.as_deref(), Some("enc-1"));
    }

    #[test]
    fn seed_cache_keeps_first_of_each_type() {
        let first = json!({"resourceType": "Patient", "id": "a"});
        let second = json!({"resourceType": "Patient", "id": "b"});
        let order = json!({"resourceType": "ServiceRequest", "id": "sr-1"});

        let cache = seed_cache(&[&first, &second, &order]);

        assert_eq!(cache.get(CacheKey::PatientId), Some("a"));
        assert_eq!(cache.get(CacheKey::OrderId), Some("sr-1"));
        assert_eq!(cache.get(CacheKey::EncounterId), None);
    }

    #[test]
    fn single_resource_is_one_document() {
        let raw = r#"{"resourceType": "AllergyIntolerance", "code": {"text": "Latex"}}"#;

        let Ingested::Single(document) = ingester().parse(raw).expect("parses") else {
            panic!("expected a single document");
        };

        assert_eq!(document.content.allergies.len(), 1);
        assert_eq!(document.record_id.len(), 32);
    }

    #[test]
    fn array_collects_partial_failures() {
        let raw = serde_json::to_string(&json!([
            bundle(),
            {"id": "no-type"},
            {"resourceType": "Immunization", "vaccineCode": {"text": "Flu"}}
        ]))
        .expect("serialise");

        let Ingested::Batch {
            documents,
            failures,
        } = ingester().parse(&raw).expect("partial success")
        else {
            panic!("expected a batch");
        };

        assert_eq!(documents.len(), 2);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 1);
        assert!(matches!(failures[0].error, CoreError::Schema(_)));
    }

    #[test]
    fn all_failed_array_is_an_error() {
        let err = ingester()
            .parse(r#"[{"id": 1}, "text"]"#)
            .expect_err("nothing mappable");
        assert!(matches!(err, CoreError::AllItemsFailed { failed: 2, .. }));
    }

    #[test]
    fn rejects_blank_invalid_and_untyped_input() {
        let ingester = ingester();
        assert!(matches!(ingester.parse("  \n"), Err(CoreError::EmptyInput)));
        assert!(matches!(
            ingester.parse("{not json"),
            Err(CoreError::Parse { .. })
        ));
        assert!(matches!(
            ingester.parse(r#"{"id": "x"}"#),
            Err(CoreError::Schema(_))
        ));
    }

    #[test]
    fn bundle_without_resources_is_a_transformation_error() {
        let raw = r#"{"resourceType": "Bundle", "type": "batch", "entry": [{"fullUrl": "x"}]}"#;
        let err = ingester().parse(raw).expect_err("empty bundle");
        assert!(matches!(err, CoreError::Transformation(_)));
    }

    #[test]
    fn same_input_maps_to_equal_aggregates() {
        let ingester = ingester();
        let first = ingester.ingest_value(&bundle()).expect("first pass");
        let second = ingester.ingest_value(&bundle()).expect("second pass");

        assert_eq!(first.content, second.content);
        assert_ne!(first.record_id, second.record_id);
    }

    #[test]
    fn snippet_truncates_long_input() {
        let long = "x".repeat(250);
        assert_eq!(snippet(&long).len(), SNIPPET_LEN + 3);
        assert_eq!(snippet("short"), "short");
    }
}
