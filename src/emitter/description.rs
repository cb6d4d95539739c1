//! Schema description produced by the emitter
//!
//! The description is the hand-off to renderers: every identifier in it is
//! final, and it carries no textual SQL.

use serde::Serialize;

use crate::archive::ArchiveTrigger;
use crate::external_id::ExternalIdTrigger;
use crate::relations::AssociationTable;

/// Complete generated schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDescription {
    /// Schema holding primary and association tables
    pub schema: String,
    /// Schemas to create before any table, in creation order
    pub schemas: Vec<String>,
    pub entities: Vec<EntityTables>,
    pub associations: Vec<AssociationTable>,
    pub external_id_triggers: Vec<ExternalIdTrigger>,
    pub archive_triggers: Vec<ArchiveTrigger>,
}

impl SchemaDescription {
    pub fn entity(&self, name: &str) -> Option<&EntityTables> {
        self.entities.iter().find(|e| e.entity == name)
    }

    pub fn association(&self, name: &str) -> Option<&AssociationTable> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// External id triggers attached to `table`
    pub fn external_id_triggers_for<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a ExternalIdTrigger> + 'a {
        self.external_id_triggers
            .iter()
            .filter(move |t| t.table == table)
    }

    pub fn archive_trigger_for(&self, table: &str) -> Option<&ArchiveTrigger> {
        self.archive_triggers.iter().find(|t| t.table == table)
    }
}

/// Tables generated for one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityTables {
    pub entity: String,
    pub annotation: String,
    pub primary: TableDefinition,
    pub archive: TableDefinition,
    /// ORM-level relations; realised through association tables
    pub relationships: Vec<RelationshipEdge>,
}

/// A table with its ordered columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinition {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_of_kind(&self, kind: ColumnKind) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.kind == kind)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// What a generated column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    PrimaryKey,
    CreatedAt,
    ExternalId,
    Value,
    Scalar,
    ArchivedAt,
}

/// Server-side default of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDefault {
    Identity,
    CurrentTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRef {
    pub schema: String,
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub kind: ColumnKind,
    pub sql_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<ColumnDefault>,
    pub references: Option<ForeignKeyRef>,
    pub annotation: String,
}

impl ColumnDefinition {
    pub(crate) fn new(name: String, kind: ColumnKind, sql_type: &str) -> Self {
        Self {
            name,
            kind,
            sql_type: sql_type.to_string(),
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
            references: None,
            annotation: String::new(),
        }
    }
}

/// Relation of an entity to another through an association table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipEdge {
    /// ORM attribute name (`relationship_<target table>`)
    pub attribute: String,
    pub target: String,
    pub association_table: String,
    /// Association column referencing this entity
    pub local_column: String,
    /// Association column referencing the target
    pub remote_column: String,
}
