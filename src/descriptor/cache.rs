//! Memoized type descriptor construction
//!
//! Entity types whose columns are all boolean are small flag/lookup tables;
//! their descriptors are built once per distinct argument set and shared.
//! Every other entity type gets a fresh descriptor on each request.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use tracing::trace;

use super::TypeDescriptor;
use crate::error::ExstructError;
use crate::model::{EntityType, TypeTag};
use crate::naming::IdentifierNamer;

static GLOBAL_CACHE: LazyLock<TypeDescriptorCache> = LazyLock::new(TypeDescriptorCache::new);

/// Keyed store of shared descriptors. The lock covers the whole
/// check-then-insert sequence.
#[derive(Debug, Default)]
pub struct TypeDescriptorCache {
    entries: Mutex<HashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeDescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache instance
    pub fn global() -> &'static TypeDescriptorCache {
        &GLOBAL_CACHE
    }

    /// Return the descriptor for `entity`, reusing a cached instance when the
    /// entity is boolean-only and was built before with the same arguments.
    pub fn get_or_create(
        &self,
        entity: &EntityType,
        namer: &IdentifierNamer,
    ) -> Result<Arc<TypeDescriptor>, ExstructError> {
        if !is_boolean_only(entity) {
            return TypeDescriptor::build(entity, namer).map(Arc::new);
        }

        let key = cache_key(entity, namer);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(&key) {
            trace!(entity = %entity.name, "type descriptor cache hit");
            return Ok(Arc::clone(existing));
        }

        trace!(entity = %entity.name, "type descriptor cache miss");
        let descriptor = Arc::new(TypeDescriptor::build(entity, namer)?);
        entries.insert(key, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Drop every cached descriptor
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every declared column is tagged boolean (vacuously true with no columns)
pub fn is_boolean_only(entity: &EntityType) -> bool {
    entity
        .columns
        .iter()
        .all(|c| c.tag() == Some(TypeTag::Boolean))
}

/// Canonical string form of the descriptor construction arguments
pub fn cache_key(entity: &EntityType, namer: &IdentifierNamer) -> String {
    let mut key = String::with_capacity(32 + entity.columns.len() * 16);
    let _ = write!(key, "{}|{}", entity.name, namer.max_len());
    for column in &entity.columns {
        let _ = write!(
            key,
            "|{}:{}:{}:{}",
            column.name, column.type_tag, column.required, column.annotation
        );
    }
    key
}
