//! Generator configuration

/// Maximum identifier length accepted by PostgreSQL (NAMEDATALEN - 1)
pub const DEFAULT_MAX_IDENTIFIER_LEN: usize = 63;

/// Settings shared by every stage of schema generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Target schema for primary and association tables
    pub schema: String,
    /// Suffix appended to `schema` to name the archive schema
    pub archive_schema_suffix: String,
    /// Schema holding shared database routines
    pub sys_schema: String,
    /// Name of the archival routine inside `sys_schema`
    pub archive_routine: String,
    /// Upper bound on the byte length of any generated identifier
    pub max_identifier_len: usize,
    /// Separator between path segments in collected-info `mapping` strings
    pub mapping_delimiter: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            archive_schema_suffix: "_arch".to_string(),
            sys_schema: "sys".to_string(),
            archive_routine: "archive_table".to_string(),
            max_identifier_len: DEFAULT_MAX_IDENTIFIER_LEN,
            mapping_delimiter: " -> ".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Self::default()
        }
    }

    /// Schema receiving archived rows (e.g. `orders_arch`)
    pub fn archive_schema(&self) -> String {
        format!("{}{}", self.schema, self.archive_schema_suffix)
    }

    /// Fully qualified archival routine (e.g. `sys.archive_table`)
    pub fn archive_routine_path(&self) -> String {
        format!("{}.{}", self.sys_schema, self.archive_routine)
    }
}
