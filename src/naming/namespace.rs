//! Collision detection for derived identifiers

use std::collections::BTreeMap;

use crate::error::ExstructError;

/// Identifiers claimed within one namespace (a table's columns, or the tables
/// of a schema), each mapped to the semantic name that produced it.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    label: String,
    claimed: BTreeMap<String, String>,
}

impl Namespace {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            claimed: BTreeMap::new(),
        }
    }

    /// Claim `identifier` on behalf of `semantic`.
    ///
    /// Claiming the same identifier twice for the same semantic name is a
    /// no-op; for a different semantic name it is an `IdentifierCollision`.
    pub fn claim(&mut self, semantic: &str, identifier: &str) -> Result<(), ExstructError> {
        match self.claimed.get(identifier) {
            Some(owner) if owner == semantic => Ok(()),
            Some(owner) => Err(ExstructError::IdentifierCollision {
                namespace: self.label.clone(),
                identifier: identifier.to_string(),
                first: owner.clone(),
                second: semantic.to_string(),
            }),
            None => {
                self.claimed
                    .insert(identifier.to_string(), semantic.to_string());
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
