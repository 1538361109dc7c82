//! Mapper registry and dispatch.
//!
//! The registry is built once, by [`build_registry`], and is immutable afterwards. It is
//! `Send + Sync`, so one instance behind an `Arc` serves every concurrent mapping pass.
//!
//! Dispatch is fan-out: every mapper that accepts a resource runs, in registration order.
//! Resource types with no mapper are ignored.

use crate::cache::ReferenceCache;
use crate::classification::Classifier;
use crate::mappers;
use crate::value::ValueExt;
use canonical::ClinicalContent;
use serde_json::Value;
use std::sync::Arc;

/// A resource-type specific mapping rule.
///
/// Implementations must not fail for absent or malformed optional data: missing fields stay
/// `None` and the mapper still appends whatever it could extract.
pub trait ResourceMapper: Send + Sync {
    /// Stable name used in logs and listings.
    fn name(&self) -> &'static str;

    /// Resource type discriminants this mapper handles.
    fn resource_types(&self) -> &'static [&'static str];

    /// Whether this mapper handles `resource`. Discriminants compare case-insensitively.
    fn accepts(&self, resource: &Value) -> bool {
        resource.str_at("resourceType").is_some_and(|kind| {
            self.resource_types()
                .iter()
                .any(|t| t.eq_ignore_ascii_case(kind))
        })
    }

    /// Map `resource` into `content`, using and updating `cache`.
    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache);
}

/// Immutable, ordered list of mappers.
pub struct MapperRegistry {
    mappers: Vec<Box<dyn ResourceMapper>>,
}

impl MapperRegistry {
    /// Registry over an explicit mapper list, in the given order.
    pub fn from_mappers(mappers: Vec<Box<dyn ResourceMapper>>) -> Self {
        Self { mappers }
    }

    /// Mappers in registration order.
    pub fn mappers(&self) -> impl Iterator<Item = &dyn ResourceMapper> {
        self.mappers.iter().map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Whether any registered mapper accepts `resource`.
    pub fn supports(&self, resource: &Value) -> bool {
        self.mappers.iter().any(|m| m.accepts(resource))
    }

    /// Run every accepting mapper over `resource`; returns how many ran.
    pub fn dispatch(
        &self,
        resource: &Value,
        content: &mut ClinicalContent,
        cache: &mut ReferenceCache,
    ) -> usize {
        let mut invoked = 0;
        for mapper in self.mappers.iter().filter(|m| m.accepts(resource)) {
            tracing::trace!(
                mapper = mapper.name(),
                id = resource.str_at("id").unwrap_or("<none>"),
                "mapping resource"
            );
            mapper.map(resource, content, cache);
            invoked += 1;
        }

        if invoked == 0 {
            tracing::debug!(
                resource_type = resource.str_at("resourceType").unwrap_or("<missing>"),
                "no mapper registered for resource type"
            );
        }
        invoked
    }

    /// Map a sequence of resources belonging to one document into a fresh aggregate.
    ///
    /// The caller supplies the cache so it can be seeded beforehand.
    pub fn map_document<'a>(
        &self,
        resources: impl IntoIterator<Item = &'a Value>,
        cache: &mut ReferenceCache,
    ) -> ClinicalContent {
        let mut content = ClinicalContent::new();
        for resource in resources {
            self.dispatch(resource, &mut content, cache);
        }
        content
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.mappers.iter().map(|m| m.name()))
            .finish()
    }
}

/// Build the standard registry.
///
/// Registration order is the order mappers run in when several accept the same resource.
pub fn build_registry(classifier: Classifier) -> MapperRegistry {
    let classifier = Arc::new(classifier);
    let registry = MapperRegistry::from_mappers(mappers::standard_mappers(classifier));
    tracing::debug!(mappers = registry.len(), "mapper registry built");
    registry
}
