//! Schema model element types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Primitive type of a scalar column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Integer,
    Boolean,
    Float,
    Date,
    DateTime,
    String,
    Binary,
    /// Nested element; becomes an entity type, never a column
    Object,
}

impl TypeTag {
    /// Parse a type tag as emitted by the extraction step.
    ///
    /// Accepts the lowercase tag names as well as the ORM type names used by
    /// collected-info mappings (`Integer`, `LargeBinary`, `types.TIMESTAMP(...)`).
    pub fn parse(tag: &str) -> Option<TypeTag> {
        let trimmed = tag.trim();
        if trimmed.to_ascii_lowercase().starts_with("types.timestamp") {
            return Some(TypeTag::DateTime);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "integer" | "int" => Some(TypeTag::Integer),
            "boolean" | "bool" => Some(TypeTag::Boolean),
            "float" | "double" => Some(TypeTag::Float),
            "date" => Some(TypeTag::Date),
            "datetime" | "timestamp" => Some(TypeTag::DateTime),
            "string" | "text" => Some(TypeTag::String),
            "binary" | "largebinary" => Some(TypeTag::Binary),
            "object" => Some(TypeTag::Object),
            _ => None,
        }
    }

    /// Widening priority used when one column is observed with several types.
    /// The higher priority wins.
    pub fn priority(&self) -> u8 {
        match self {
            TypeTag::Integer | TypeTag::Boolean => 1,
            TypeTag::Float | TypeTag::Date => 2,
            TypeTag::DateTime => 3,
            TypeTag::String | TypeTag::Binary => 4,
            TypeTag::Object => 5,
        }
    }

    /// PostgreSQL column type, or `None` for tags with no column representation
    pub fn sql_type(&self) -> Option<&'static str> {
        match self {
            TypeTag::Integer => Some("BIGINT"),
            TypeTag::Boolean => Some("BOOLEAN"),
            TypeTag::Float => Some("DOUBLE PRECISION"),
            TypeTag::Date => Some("DATE"),
            TypeTag::DateTime => Some("TIMESTAMP WITH TIME ZONE"),
            TypeTag::String => Some("TEXT"),
            TypeTag::Binary => Some("BYTEA"),
            TypeTag::Object => None,
        }
    }
}

/// Scalar column of an entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Raw type tag; resolved with [`TypeTag::parse`] when descriptors are built
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub annotation: String,
    /// Column must be present in every source record
    #[serde(default)]
    pub required: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            annotation: String::new(),
            required: false,
        }
    }

    pub fn tag(&self) -> Option<TypeTag> {
        TypeTag::parse(&self.type_tag)
    }
}

/// Logical record kind mapped to one relational table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Columns the external id is derived from, in concatenation order
    #[serde(default)]
    pub external_id_sources: Vec<String>,
    #[serde(default)]
    pub has_value_column: bool,
    #[serde(default)]
    pub annotation: String,
    /// Entity types this one is related to (must be mirrored on the other side)
    #[serde(default)]
    pub related_types: BTreeSet<String>,
    /// Subset of `related_types` this entity owns (it is the parent of the nesting)
    #[serde(default)]
    pub foreign_keys: BTreeSet<String>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_external_id(mut self, sources: &[&str]) -> Self {
        self.external_id_sources = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_value_column(mut self) -> Self {
        self.has_value_column = true;
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Add a column or, if it already exists, widen its type to the
    /// higher-priority tag.
    pub fn merge_column(&mut self, column: Column) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            None => self.columns.push(column),
            Some(existing) => {
                let old = existing.tag().map(|t| t.priority()).unwrap_or(0);
                let new = column.tag().map(|t| t.priority()).unwrap_or(0);
                if new > old {
                    existing.type_tag = column.type_tag;
                }
                existing.required |= column.required;
            }
        }
    }

    pub fn is_related_to(&self, other: &str) -> bool {
        self.related_types.contains(other)
    }

    pub fn owns(&self, other: &str) -> bool {
        self.foreign_keys.contains(other)
    }
}
