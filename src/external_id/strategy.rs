//! External id derivation
//!
//! The external id is a function of the current source column values, so it is
//! recomputed by both the insert and the update trigger. One source column is
//! copied as is; several are concatenated in declared order and hashed.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ExstructError;
use crate::model::EntityType;
use crate::naming::{IdentifierNamer, IdentifierRole};

/// Hash function used for multi-column external ids
pub const HASH_ALGORITHM: &str = "sha256";

/// Length of the hexadecimal digest of [`HASH_ALGORITHM`]
pub const HASH_HEX_LEN: usize = 64;

/// How the external id column is derived from its source columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExternalIdStrategy {
    /// Copy of a single source column
    Direct { source: String },
    /// Hex digest of the concatenated source columns
    ContentHash { sources: Vec<String> },
}

impl ExternalIdStrategy {
    /// Source column identifiers, in concatenation order
    pub fn sources(&self) -> Vec<&str> {
        match self {
            ExternalIdStrategy::Direct { source } => vec![source.as_str()],
            ExternalIdStrategy::ContentHash { sources } => {
                sources.iter().map(String::as_str).collect()
            }
        }
    }

    /// Compute the external id of a row given its column values.
    ///
    /// A missing value is NULL: a direct copy yields `None`, a content hash
    /// concatenates it as the empty string.
    pub fn compute(&self, row: &BTreeMap<String, String>) -> Option<String> {
        match self {
            ExternalIdStrategy::Direct { source } => row.get(source).cloned(),
            ExternalIdStrategy::ContentHash { sources } => {
                let mut hasher = Sha256::new();
                for source in sources {
                    if let Some(value) = row.get(source) {
                        hasher.update(value.as_bytes());
                    }
                }
                Some(hex::encode(hasher.finalize()))
            }
        }
    }
}

/// Choose the strategy for `entity`, or `None` without external id sources.
///
/// Source names are resolved to column identifiers; each must be a declared
/// column of the entity.
pub fn select_strategy(
    entity: &EntityType,
    namer: &IdentifierNamer,
) -> Result<Option<ExternalIdStrategy>, ExstructError> {
    let mut sources = Vec::with_capacity(entity.external_id_sources.len());
    for source in &entity.external_id_sources {
        if entity.column(source).is_none() {
            return Err(ExstructError::MissingExternalIdSource {
                entity: entity.name.clone(),
                column: source.clone(),
            });
        }
        sources.push(namer.name(IdentifierRole::Column, source, false));
    }

    Ok(match sources.len() {
        0 => None,
        1 => Some(ExternalIdStrategy::Direct {
            source: sources.remove(0),
        }),
        _ => Some(ExternalIdStrategy::ContentHash { sources }),
    })
}

/// Row event an external id trigger fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    Insert,
    Update,
}

impl TriggerEvent {
    fn suffix(&self) -> &'static str {
        match self {
            TriggerEvent::Insert => "_ins_ext_id",
            TriggerEvent::Update => "_upd_ext_id",
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::Insert => f.write_str("INSERT"),
            TriggerEvent::Update => f.write_str("UPDATE"),
        }
    }
}

/// Before-row trigger keeping the external id column in sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalIdTrigger {
    pub name: String,
    pub function: String,
    pub schema: String,
    pub table: String,
    pub event: TriggerEvent,
    pub target_column: String,
    pub strategy: ExternalIdStrategy,
}

/// Trigger recomputing the external id when a row is inserted
pub fn insert_trigger(
    schema: &str,
    table: &str,
    target_column: &str,
    strategy: &ExternalIdStrategy,
    namer: &IdentifierNamer,
) -> ExternalIdTrigger {
    trigger_for(TriggerEvent::Insert, schema, table, target_column, strategy, namer)
}

/// Trigger recomputing the external id when a row is updated
pub fn update_trigger(
    schema: &str,
    table: &str,
    target_column: &str,
    strategy: &ExternalIdStrategy,
    namer: &IdentifierNamer,
) -> ExternalIdTrigger {
    trigger_for(TriggerEvent::Update, schema, table, target_column, strategy, namer)
}

fn trigger_for(
    event: TriggerEvent,
    schema: &str,
    table: &str,
    target_column: &str,
    strategy: &ExternalIdStrategy,
    namer: &IdentifierNamer,
) -> ExternalIdTrigger {
    let name = namer.derived(table, event.suffix());
    let function = namer.derived(table, &format!("{}_fn", event.suffix()));
    ExternalIdTrigger {
        name,
        function,
        schema: schema.to_string(),
        table: table.to_string(),
        event,
        target_column: target_column.to_string(),
        strategy: strategy.clone(),
    }
}
