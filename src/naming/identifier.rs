//! Length-bounded identifier derivation
//!
//! Every table, column, trigger and function name the generator emits goes
//! through [`IdentifierNamer`]. Names are sanitized, lowercased, and then
//! prefix-truncated so that the role suffix always survives:
//!
//! ```ignore
//! let namer = IdentifierNamer::default();
//! assert_eq!(namer.name(IdentifierRole::PrimaryKey, "Order", false), "order_id");
//! assert_eq!(namer.name(IdentifierRole::PrimaryKey, "Node", true), "parent_node_id");
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::DEFAULT_MAX_IDENTIFIER_LEN;

/// Characters replaced by `_` before an identifier is derived
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[@$ .,\-/\\]").unwrap());

/// Prefix marking the owning column of a self-association
pub const SELF_RELATION_PREFIX: &str = "parent_";

/// What a derived identifier names. Determines the suffix that is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierRole {
    /// Primary or archive table (archive tables reuse the name in the archive schema)
    Table,
    /// Declared scalar column
    Column,
    /// Primary key, also used for association foreign-key columns
    PrimaryKey,
    /// Row creation timestamp
    Timestamp,
    /// Derived external id
    ExternalId,
    /// Text content of the element itself
    Value,
    /// Time a row was copied into the archive
    ArchiveTimestamp,
}

impl IdentifierRole {
    pub fn suffix(&self) -> &'static str {
        match self {
            IdentifierRole::Table | IdentifierRole::Column => "",
            IdentifierRole::PrimaryKey => "_id",
            IdentifierRole::Timestamp => "_tmstp",
            IdentifierRole::ExternalId => "_ext_id",
            IdentifierRole::Value => "_value",
            IdentifierRole::ArchiveTimestamp => "_arch_tmstp",
        }
    }
}

impl fmt::Display for IdentifierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IdentifierRole::Table => "table",
            IdentifierRole::Column => "column",
            IdentifierRole::PrimaryKey => "primary key",
            IdentifierRole::Timestamp => "timestamp",
            IdentifierRole::ExternalId => "external id",
            IdentifierRole::Value => "value",
            IdentifierRole::ArchiveTimestamp => "archive timestamp",
        };
        f.write_str(label)
    }
}

/// Derives identifiers no longer than `max_len` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierNamer {
    max_len: usize,
}

impl Default for IdentifierNamer {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_IDENTIFIER_LEN,
        }
    }
}

impl IdentifierNamer {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Derive the identifier for `base_name` in `role`.
    ///
    /// With `is_self_relation` the name is prefixed with `parent_` before
    /// truncation, so the two columns of a self-association stay distinct.
    pub fn name(&self, role: IdentifierRole, base_name: &str, is_self_relation: bool) -> String {
        let mut base = sanitize(base_name);
        if is_self_relation {
            base.insert_str(0, SELF_RELATION_PREFIX);
        }
        self.bounded(&base, role.suffix())
    }

    /// Join several names with `_` into one identifier (association tables)
    pub fn join(&self, parts: &[&str]) -> String {
        let joined = parts
            .iter()
            .map(|part| sanitize(part))
            .collect::<Vec<_>>()
            .join("_");
        self.bounded(&joined, "")
    }

    /// Derive an identifier from an already derived one plus a fixed suffix
    /// (trigger and function names)
    pub fn derived(&self, identifier: &str, suffix: &str) -> String {
        self.bounded(&sanitize(identifier), suffix)
    }

    fn bounded(&self, base: &str, suffix: &str) -> String {
        if suffix.len() >= self.max_len {
            return truncate_bytes(suffix, self.max_len).to_string();
        }
        let budget = self.max_len - suffix.len();
        format!("{}{}", truncate_bytes(base, budget), suffix)
    }
}

/// Derive an identifier with the default 63-byte limit
pub fn name(role: IdentifierRole, base_name: &str, is_self_relation: bool) -> String {
    IdentifierNamer::default().name(role, base_name, is_self_relation)
}

/// Replace separator characters, guard a leading digit and lowercase.
pub fn sanitize(raw: &str) -> String {
    let replaced = SEPARATOR_RE.replace_all(raw.trim(), "_");
    let mut result = replaced.to_lowercase();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a character
fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
