//! Error types for rust-exstruct

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during schema generation
#[derive(Error, Debug)]
pub enum ExstructError {
    #[error("Failed to read schema model: {path}")]
    ModelReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema model: {path}")]
    ModelParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid collected-info mapping: {message}")]
    InvalidMapping { message: String },

    #[error("Schema inconsistency: {message}")]
    SchemaInconsistency { message: String },

    #[error(
        "Identifier collision in {namespace}: '{first}' and '{second}' both map to '{identifier}'"
    )]
    IdentifierCollision {
        namespace: String,
        identifier: String,
        first: String,
        second: String,
    },

    #[error("Unsupported type tag '{tag}' for column {entity}.{column}")]
    UnsupportedTypeTag {
        entity: String,
        column: String,
        tag: String,
    },

    #[error("External id source column '{column}' is not declared on entity type '{entity}'")]
    MissingExternalIdSource { entity: String, column: String },

    #[error("Failed to write schema output to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExstructError {
    pub(crate) fn inconsistency(message: impl Into<String>) -> Self {
        ExstructError::SchemaInconsistency {
            message: message.into(),
        }
    }
}
