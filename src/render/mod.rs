//! Textual rendering of schema descriptions

mod json;
mod sql;

use std::io::Write;

use anyhow::Result;

use crate::emitter::SchemaDescription;

pub use json::render_json;
pub use sql::{external_id_expression, render_sql, sql_to_string};

/// Output format of a rendered schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// PostgreSQL DDL script
    #[default]
    Sql,
    /// Schema description as JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" | "postgres" | "postgresql" => Ok(OutputFormat::Sql),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Sql => "sql",
            OutputFormat::Json => "json",
        }
    }

    pub fn render<W: Write>(&self, writer: &mut W, description: &SchemaDescription) -> Result<()> {
        match self {
            OutputFormat::Sql => render_sql(writer, description),
            OutputFormat::Json => render_json(writer, description),
        }
    }
}
