//! Truncate-time archival triggers
//!
//! The archival routine itself lives in the database (`sys.archive_table`);
//! the generator only wires each primary table to it with the right
//! parameters.

use serde::Serialize;

use crate::config::GeneratorConfig;
use crate::naming::IdentifierNamer;

const ARCHIVE_TRIGGER_SUFFIX: &str = "_arch_trg";

/// Before-truncate, statement-level trigger copying rows into the archive schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveTrigger {
    pub name: String,
    pub table: String,
    pub source_schema: String,
    pub archive_schema: String,
    pub primary_key: String,
    /// Fully qualified routine the trigger executes
    pub routine: String,
}

impl ArchiveTrigger {
    /// Arguments passed to the archival routine, in call order
    pub fn arguments(&self) -> [&str; 4] {
        [
            self.table.as_str(),
            self.source_schema.as_str(),
            self.archive_schema.as_str(),
            self.primary_key.as_str(),
        ]
    }
}

/// Build the archive trigger for the primary table `table`
pub fn archive_trigger(
    table: &str,
    primary_key: &str,
    config: &GeneratorConfig,
    namer: &IdentifierNamer,
) -> ArchiveTrigger {
    ArchiveTrigger {
        name: namer.derived(table, ARCHIVE_TRIGGER_SUFFIX),
        table: table.to_string(),
        source_schema: config.schema.clone(),
        archive_schema: config.archive_schema(),
        primary_key: primary_key.to_string(),
        routine: config.archive_routine_path(),
    }
}
