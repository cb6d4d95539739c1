//! Column type descriptors for entity types

use crate::error::ExstructError;
use crate::model::{EntityType, TypeTag};
use crate::naming::{IdentifierNamer, IdentifierRole};

/// A declared scalar column resolved to its identifier and target type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Name as declared in the model
    pub source_name: String,
    /// Derived column identifier
    pub identifier: String,
    pub type_tag: TypeTag,
    pub sql_type: &'static str,
    pub required: bool,
    pub annotation: String,
}

/// Resolved scalar columns of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub entity: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TypeDescriptor {
    /// Resolve every declared column of `entity`.
    ///
    /// Fails with `UnsupportedTypeTag` when a tag is unknown or has no column
    /// representation (`object`).
    pub fn build(entity: &EntityType, namer: &IdentifierNamer) -> Result<Self, ExstructError> {
        let mut columns = Vec::with_capacity(entity.columns.len());
        for column in &entity.columns {
            let unsupported = || ExstructError::UnsupportedTypeTag {
                entity: entity.name.clone(),
                column: column.name.clone(),
                tag: column.type_tag.clone(),
            };
            let type_tag = column.tag().ok_or_else(unsupported)?;
            let sql_type = type_tag.sql_type().ok_or_else(unsupported)?;

            columns.push(ColumnDescriptor {
                source_name: column.name.clone(),
                identifier: namer.name(IdentifierRole::Column, &column.name, false),
                type_tag,
                sql_type,
                required: column.required,
                annotation: column.annotation.clone(),
            });
        }

        Ok(Self {
            entity: entity.name.clone(),
            columns,
        })
    }
}
