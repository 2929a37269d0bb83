//! Schema-id to layout resolution.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::Layout;
use crate::schema::{Namespace, SchemaId};

/// Maps schema ids to compiled layouts.
///
/// Returned layouts are shared and immutable; resolution is idempotent.
pub trait LayoutResolver: Send + Sync {
    /// Resolves a schema id to its compiled layout.
    ///
    /// # Panics
    /// Unknown schema ids are a programmer error and panic.
    fn resolve(&self, schema_id: SchemaId) -> Arc<Layout>;
}

/// A [`LayoutResolver`] that compiles schemas on demand from a
/// [`Namespace`].
///
/// Compiled layouts are cached for the resolver's lifetime behind a
/// readers-writer lock, so `resolve` is safe to call from concurrent
/// readers.  Ids not found in the namespace are delegated to the optional
/// parent resolver.
pub struct LayoutResolverNamespace {
    namespace: Namespace,
    parent: Option<Arc<dyn LayoutResolver>>,
    cache: RwLock<HashMap<SchemaId, Arc<Layout>>>,
}

impl LayoutResolverNamespace {
    /// Creates a resolver over the given namespace.
    #[must_use]
    pub fn new(namespace: Namespace, parent: Option<Arc<dyn LayoutResolver>>) -> Self {
        LayoutResolverNamespace {
            namespace,
            parent,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The namespace managed by this resolver.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

impl LayoutResolver for LayoutResolverNamespace {
    fn resolve(&self, schema_id: SchemaId) -> Arc<Layout> {
        {
            let cache = self.cache.read().expect("resolver lock poisoned");
            if let Some(layout) = cache.get(&schema_id) {
                return Arc::clone(layout);
            }
        }

        for schema in self.namespace.schemas() {
            if schema.schema_id() == schema_id {
                #[cfg(feature = "tracing")]
                tracing::debug!(schema = %schema.name(), id = schema_id.id(), "compiling layout");
                let layout = Arc::new(schema.compile(&self.namespace));
                let mut cache = self.cache.write().expect("resolver lock poisoned");
                let entry = cache.entry(schema_id).or_insert_with(|| Arc::clone(&layout));
                return Arc::clone(entry);
            }
        }

        if let Some(parent) = &self.parent {
            let layout = parent.resolve(schema_id);
            let mut cache = self.cache.write().expect("resolver lock poisoned");
            let entry = cache.entry(schema_id).or_insert_with(|| Arc::clone(&layout));
            return Arc::clone(entry);
        }

        panic!("failed to resolve schema {}", schema_id.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Property, PropertyType, Schema, StorageKind, TypeKind};

    fn namespace_with(id: i32) -> Namespace {
        let mut ns = Namespace::default();
        let mut schema = Schema::new("thing", SchemaId::new(id));
        schema.properties.push(Property::new(
            "a",
            PropertyType::primitive(TypeKind::Int32, StorageKind::Fixed, true),
        ));
        ns.schemas.push(schema);
        ns
    }

    #[test]
    fn resolve_caches_compiled_layouts() {
        let resolver = LayoutResolverNamespace::new(namespace_with(7), None);
        let a = resolver.resolve(SchemaId::new(7));
        let b = resolver.resolve(SchemaId::new(7));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.schema_id(), SchemaId::new(7));
    }

    #[test]
    fn resolve_delegates_to_parent() {
        let parent: Arc<dyn LayoutResolver> =
            Arc::new(LayoutResolverNamespace::new(namespace_with(9), None));
        let child = LayoutResolverNamespace::new(namespace_with(7), Some(parent));
        assert_eq!(child.resolve(SchemaId::new(9)).schema_id(), SchemaId::new(9));
    }

    #[test]
    #[should_panic(expected = "failed to resolve schema")]
    fn resolve_unknown_id_panics() {
        let resolver = LayoutResolverNamespace::new(namespace_with(7), None);
        let _ = resolver.resolve(SchemaId::new(8));
    }
}
