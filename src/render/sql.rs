//! PostgreSQL DDL rendering
//!
//! Output order: schemas, then per entity the primary and archive tables,
//! association tables, external id trigger functions and triggers, archive
//! triggers. Every identifier is double-quoted.

use std::io::Write;

use anyhow::Result;

use crate::archive::ArchiveTrigger;
use crate::emitter::{ColumnDefault, ColumnDefinition, SchemaDescription, TableDefinition};
use crate::external_id::{ExternalIdStrategy, ExternalIdTrigger, HASH_ALGORITHM};
use crate::relations::{AssociationColumn, AssociationTable};

const HEADER: &str = "-- Generated by rust-exstruct. Do not edit.";

/// Render the schema description as a PostgreSQL script
pub fn render_sql<W: Write>(writer: &mut W, description: &SchemaDescription) -> Result<()> {
    writeln!(writer, "{}", HEADER)?;
    writeln!(writer)?;

    for schema in &description.schemas {
        writeln!(writer, "CREATE SCHEMA IF NOT EXISTS {};", quote_ident(schema))?;
    }

    for entity in &description.entities {
        writeln!(writer)?;
        write_table(writer, &entity.primary)?;
        if !entity.annotation.is_empty() {
            writeln!(
                writer,
                "COMMENT ON TABLE {} IS {};",
                qualified(&entity.primary.schema, &entity.primary.name),
                quote_literal(&entity.annotation)
            )?;
        }
        write_column_comments(writer, &entity.primary)?;
        writeln!(writer)?;
        write_table(writer, &entity.archive)?;
    }

    for association in &description.associations {
        writeln!(writer)?;
        write_association(writer, description, association)?;
    }

    for trigger in &description.external_id_triggers {
        writeln!(writer)?;
        write_external_id_trigger(writer, trigger)?;
    }

    for trigger in &description.archive_triggers {
        writeln!(writer)?;
        write_archive_trigger(writer, trigger)?;
    }

    Ok(())
}

/// Render into a string
pub fn sql_to_string(description: &SchemaDescription) -> Result<String> {
    let mut buffer = Vec::with_capacity(description.entities.len() * 1024);
    render_sql(&mut buffer, description)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_table<W: Write>(writer: &mut W, table: &TableDefinition) -> Result<()> {
    writeln!(
        writer,
        "CREATE TABLE IF NOT EXISTS {} (",
        qualified(&table.schema, &table.name)
    )?;
    let lines: Vec<String> = table.columns.iter().map(column_line).collect();
    writeln!(writer, "    {}", lines.join(",\n    "))?;
    writeln!(writer, ");")?;
    Ok(())
}

fn column_line(column: &ColumnDefinition) -> String {
    let mut line = format!("{} {}", quote_ident(&column.name), column.sql_type);
    if column.default == Some(ColumnDefault::Identity) {
        line.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }
    if column.primary_key {
        line.push_str(" PRIMARY KEY");
    } else if !column.nullable {
        line.push_str(" NOT NULL");
    }
    if column.default == Some(ColumnDefault::CurrentTimestamp) {
        line.push_str(" DEFAULT CURRENT_TIMESTAMP");
    }
    if column.unique {
        line.push_str(" UNIQUE");
    }
    if let Some(fk) = &column.references {
        line.push_str(&format!(
            " REFERENCES {} ({})",
            qualified(&fk.schema, &fk.table),
            quote_ident(&fk.column)
        ));
    }
    line
}

fn write_column_comments<W: Write>(writer: &mut W, table: &TableDefinition) -> Result<()> {
    for column in table.columns.iter().filter(|c| !c.annotation.is_empty()) {
        writeln!(
            writer,
            "COMMENT ON COLUMN {}.{} IS {};",
            qualified(&table.schema, &table.name),
            quote_ident(&column.name),
            quote_literal(&column.annotation)
        )?;
    }
    Ok(())
}

fn write_association<W: Write>(
    writer: &mut W,
    description: &SchemaDescription,
    association: &AssociationTable,
) -> Result<()> {
    let schema = description.schema.as_str();
    writeln!(
        writer,
        "CREATE TABLE IF NOT EXISTS {} (",
        qualified(schema, &association.name)
    )?;
    writeln!(writer, "    {},", association_column(schema, &association.owner))?;
    writeln!(writer, "    {},", association_column(schema, &association.other))?;
    writeln!(
        writer,
        "    PRIMARY KEY ({}, {})",
        quote_ident(&association.owner.name),
        quote_ident(&association.other.name)
    )?;
    writeln!(writer, ");")?;
    Ok(())
}

fn association_column(schema: &str, column: &AssociationColumn) -> String {
    format!(
        "{} BIGINT NOT NULL REFERENCES {} ({})",
        quote_ident(&column.name),
        qualified(schema, &column.references_table),
        quote_ident(&column.references_column)
    )
}

fn write_external_id_trigger<W: Write>(writer: &mut W, trigger: &ExternalIdTrigger) -> Result<()> {
    let function = qualified(&trigger.schema, &trigger.function);
    writeln!(
        writer,
        "CREATE OR REPLACE FUNCTION {}() RETURNS TRIGGER AS $$",
        function
    )?;
    writeln!(writer, "BEGIN")?;
    writeln!(
        writer,
        "    NEW.{} := {};",
        quote_ident(&trigger.target_column),
        external_id_expression(&trigger.strategy)
    )?;
    writeln!(writer, "    RETURN NEW;")?;
    writeln!(writer, "END;")?;
    writeln!(writer, "$$ LANGUAGE plpgsql;")?;
    writeln!(writer)?;
    writeln!(writer, "CREATE TRIGGER {}", quote_ident(&trigger.name))?;
    writeln!(
        writer,
        "    BEFORE {} ON {}",
        trigger.event,
        qualified(&trigger.schema, &trigger.table)
    )?;
    writeln!(writer, "    FOR EACH ROW EXECUTE FUNCTION {}();", function)?;
    Ok(())
}

/// PL/pgSQL expression computing the external id from `NEW`
pub fn external_id_expression(strategy: &ExternalIdStrategy) -> String {
    match strategy {
        ExternalIdStrategy::Direct { source } => format!("NEW.{}::text", quote_ident(source)),
        ExternalIdStrategy::ContentHash { sources } => {
            let parts: Vec<String> = sources
                .iter()
                .map(|s| format!("NEW.{}::text", quote_ident(s)))
                .collect();
            format!(
                "encode({}(convert_to(concat({}), 'UTF8')), 'hex')",
                HASH_ALGORITHM,
                parts.join(", ")
            )
        }
    }
}

fn write_archive_trigger<W: Write>(writer: &mut W, trigger: &ArchiveTrigger) -> Result<()> {
    let arguments: Vec<String> = trigger.arguments().iter().map(|a| quote_literal(a)).collect();
    writeln!(writer, "CREATE TRIGGER {}", quote_ident(&trigger.name))?;
    writeln!(
        writer,
        "    BEFORE TRUNCATE ON {}",
        qualified(&trigger.source_schema, &trigger.table)
    )?;
    writeln!(
        writer,
        "    FOR EACH STATEMENT EXECUTE FUNCTION {}({});",
        trigger.routine,
        arguments.join(", ")
    )?;
    Ok(())
}

fn qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
