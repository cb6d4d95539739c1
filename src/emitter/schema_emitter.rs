//! Assemble the schema description from a schema model

use tracing::{debug, info};

use super::{
    ColumnDefault, ColumnDefinition, ColumnKind, EntityTables, ForeignKeyRef, RelationshipEdge,
    SchemaDescription, TableDefinition,
};
use crate::archive::archive_trigger;
use crate::config::GeneratorConfig;
use crate::descriptor::{TypeDescriptor, TypeDescriptorCache};
use crate::error::ExstructError;
use crate::external_id::{insert_trigger, select_strategy, update_trigger, ExternalIdStrategy};
use crate::model::{EntityType, SchemaModel};
use crate::naming::{IdentifierNamer, IdentifierRole, Namespace};
use crate::relations::{resolve_associations, AssociationTable};

const ID_SQL_TYPE: &str = "BIGINT";
const TIMESTAMP_SQL_TYPE: &str = "TIMESTAMP WITH TIME ZONE";
const TEXT_SQL_TYPE: &str = "TEXT";

/// Builds a [`SchemaDescription`] for one configuration
pub struct SchemaEmitter<'a> {
    config: &'a GeneratorConfig,
    namer: IdentifierNamer,
    cache: &'a TypeDescriptorCache,
}

impl<'a> SchemaEmitter<'a> {
    pub fn new(config: &'a GeneratorConfig, cache: &'a TypeDescriptorCache) -> Self {
        Self {
            config,
            namer: IdentifierNamer::new(config.max_identifier_len),
            cache,
        }
    }

    /// Generate the whole schema. Any error aborts generation; no partial
    /// description is returned.
    pub fn emit(&self, model: &SchemaModel) -> Result<SchemaDescription, ExstructError> {
        let associations = resolve_associations(model, &self.namer)?;
        verify_association_coverage(model, &associations)?;

        let mut tables = Namespace::new(format!("schema {}", self.config.schema));
        let mut functions = Namespace::new(format!("functions of schema {}", self.config.schema));

        let mut entities = Vec::with_capacity(model.len());
        let mut external_id_triggers = Vec::new();
        let mut archive_triggers = Vec::with_capacity(model.len());

        for entity in model.iter() {
            let table_name = self.namer.name(IdentifierRole::Table, &entity.name, false);
            tables.claim(&format!("entity {}", entity.name), &table_name)?;

            let descriptor = self.cache.get_or_create(entity, &self.namer)?;
            let strategy = select_strategy(entity, &self.namer)?;

            let primary =
                self.primary_table(entity, &table_name, &descriptor, strategy.is_some())?;
            let archive = self.archive_table(entity, &primary)?;
            let primary_key = self.namer.name(IdentifierRole::PrimaryKey, &entity.name, false);

            if let Some(strategy) = &strategy {
                let schema = &self.config.schema;
                let target = self.namer.name(IdentifierRole::ExternalId, &entity.name, false);
                for trigger in [
                    insert_trigger(schema, &table_name, &target, strategy, &self.namer),
                    update_trigger(schema, &table_name, &target, strategy, &self.namer),
                ] {
                    functions.claim(
                        &format!("{} external id of {}", trigger.event, entity.name),
                        &trigger.function,
                    )?;
                    external_id_triggers.push(trigger);
                }
                debug!(
                    entity = %entity.name,
                    strategy = strategy_label(strategy),
                    "external id triggers"
                );
            }

            archive_triggers.push(archive_trigger(
                &table_name,
                &primary_key,
                self.config,
                &self.namer,
            ));

            entities.push(EntityTables {
                entity: entity.name.clone(),
                annotation: entity.annotation.clone(),
                relationships: relationship_edges(entity, &associations),
                primary,
                archive,
            });
        }

        for association in &associations {
            tables.claim(
                &format!(
                    "association {}/{}",
                    association.owner.entity, association.other.entity
                ),
                &association.name,
            )?;
        }

        info!(
            entities = entities.len(),
            associations = associations.len(),
            external_id_triggers = external_id_triggers.len(),
            "emitted schema description"
        );

        Ok(SchemaDescription {
            schema: self.config.schema.clone(),
            schemas: vec![
                self.config.schema.clone(),
                self.config.sys_schema.clone(),
                self.config.archive_schema(),
            ],
            entities,
            associations,
            external_id_triggers,
            archive_triggers,
        })
    }

    fn primary_table(
        &self,
        entity: &EntityType,
        table_name: &str,
        descriptor: &TypeDescriptor,
        has_external_id: bool,
    ) -> Result<TableDefinition, ExstructError> {
        let mut columns = Vec::new();

        let mut pk = self.column(
            ColumnKind::PrimaryKey,
            IdentifierRole::PrimaryKey,
            entity,
            ID_SQL_TYPE,
        );
        pk.primary_key = true;
        pk.nullable = false;
        pk.default = Some(ColumnDefault::Identity);
        columns.push(pk);

        let mut created = self.column(
            ColumnKind::CreatedAt,
            IdentifierRole::Timestamp,
            entity,
            TIMESTAMP_SQL_TYPE,
        );
        created.nullable = false;
        created.default = Some(ColumnDefault::CurrentTimestamp);
        columns.push(created);

        if has_external_id {
            let mut ext = self.column(
                ColumnKind::ExternalId,
                IdentifierRole::ExternalId,
                entity,
                TEXT_SQL_TYPE,
            );
            ext.unique = true;
            columns.push(ext);
        }

        if entity.has_value_column {
            columns.push(self.column(
                ColumnKind::Value,
                IdentifierRole::Value,
                entity,
                TEXT_SQL_TYPE,
            ));
        }

        for scalar in &descriptor.columns {
            let mut column = ColumnDefinition::new(
                scalar.identifier.clone(),
                ColumnKind::Scalar,
                scalar.sql_type,
            );
            column.nullable = !scalar.required;
            column.annotation = scalar.annotation.clone();
            columns.push(column);
        }

        let table = TableDefinition {
            schema: self.config.schema.clone(),
            name: table_name.to_string(),
            columns,
        };
        claim_columns(&table, entity, descriptor)?;
        Ok(table)
    }

    /// Mirror of the primary table without constraints, plus the archival
    /// timestamp. The external id refers back to the primary table.
    fn archive_table(
        &self,
        entity: &EntityType,
        primary: &TableDefinition,
    ) -> Result<TableDefinition, ExstructError> {
        let mut columns = Vec::with_capacity(primary.columns.len() + 1);
        for source in &primary.columns {
            let mut column =
                ColumnDefinition::new(source.name.clone(), source.kind, &source.sql_type);
            column.annotation = source.annotation.clone();
            match source.kind {
                ColumnKind::PrimaryKey | ColumnKind::CreatedAt => column.nullable = false,
                ColumnKind::ExternalId => {
                    column.references = Some(ForeignKeyRef {
                        schema: primary.schema.clone(),
                        table: primary.name.clone(),
                        column: source.name.clone(),
                    });
                }
                _ => {}
            }
            columns.push(column);
        }

        let mut archived = self.column(
            ColumnKind::ArchivedAt,
            IdentifierRole::ArchiveTimestamp,
            entity,
            TIMESTAMP_SQL_TYPE,
        );
        archived.nullable = false;
        archived.default = Some(ColumnDefault::CurrentTimestamp);
        columns.push(archived);

        let table = TableDefinition {
            schema: self.config.archive_schema(),
            name: primary.name.clone(),
            columns,
        };

        let mut namespace = Namespace::new(format!("table {}.{}", table.schema, table.name));
        for column in &table.columns {
            namespace.claim(&semantic_label(column, entity), &column.name)?;
        }
        Ok(table)
    }

    fn column(
        &self,
        kind: ColumnKind,
        role: IdentifierRole,
        entity: &EntityType,
        sql_type: &str,
    ) -> ColumnDefinition {
        ColumnDefinition::new(self.namer.name(role, &entity.name, false), kind, sql_type)
    }
}

/// Generate a schema description using the process-wide descriptor cache
pub fn emit_schema(
    model: &SchemaModel,
    config: &GeneratorConfig,
) -> Result<SchemaDescription, ExstructError> {
    SchemaEmitter::new(config, TypeDescriptorCache::global()).emit(model)
}

/// Every column name of a table must come from one semantic name. Scalars are
/// labelled by declared position, so a repeated column name collides too.
fn claim_columns(
    table: &TableDefinition,
    entity: &EntityType,
    descriptor: &TypeDescriptor,
) -> Result<(), ExstructError> {
    let mut namespace = Namespace::new(format!("table {}.{}", table.schema, table.name));
    let mut scalars = descriptor.columns.iter().enumerate();
    for column in &table.columns {
        let label = match column.kind {
            ColumnKind::Scalar => scalars
                .next()
                .map(|(position, s)| format!("column {} (#{})", s.source_name, position + 1))
                .unwrap_or_else(|| semantic_label(column, entity)),
            _ => semantic_label(column, entity),
        };
        namespace.claim(&label, &column.name)?;
    }
    Ok(())
}

fn semantic_label(column: &ColumnDefinition, entity: &EntityType) -> String {
    let role = match column.kind {
        ColumnKind::PrimaryKey => IdentifierRole::PrimaryKey,
        ColumnKind::CreatedAt => IdentifierRole::Timestamp,
        ColumnKind::ExternalId => IdentifierRole::ExternalId,
        ColumnKind::Value => IdentifierRole::Value,
        ColumnKind::ArchivedAt => IdentifierRole::ArchiveTimestamp,
        ColumnKind::Scalar => return format!("column {}", column.name),
    };
    format!("{} of {}", role, entity.name)
}

/// Each declared relation must be covered by exactly one association table
fn verify_association_coverage(
    model: &SchemaModel,
    associations: &[AssociationTable],
) -> Result<(), ExstructError> {
    for entity in model.iter() {
        for related in &entity.related_types {
            let count = associations
                .iter()
                .filter(|a| a.joins(&entity.name, related))
                .count();
            if count != 1 {
                return Err(ExstructError::inconsistency(format!(
                    "relation {}/{} maps to {} association tables",
                    entity.name, related, count
                )));
            }
        }
    }
    Ok(())
}

fn relationship_edges(
    entity: &EntityType,
    associations: &[AssociationTable],
) -> Vec<RelationshipEdge> {
    associations
        .iter()
        .filter_map(|association| {
            let (local, remote) = if association.owner.entity == entity.name {
                (&association.owner, &association.other)
            } else if association.other.entity == entity.name {
                (&association.other, &association.owner)
            } else {
                return None;
            };
            Some(RelationshipEdge {
                attribute: format!("relationship_{}", remote.references_table),
                target: remote.entity.clone(),
                association_table: association.name.clone(),
                local_column: local.name.clone(),
                remote_column: remote.name.clone(),
            })
        })
        .collect()
}

fn strategy_label(strategy: &ExternalIdStrategy) -> &'static str {
    match strategy {
        ExternalIdStrategy::Direct { .. } => "direct",
        ExternalIdStrategy::ContentHash { .. } => "content_hash",
    }
}
