//! Association table resolution
//!
//! Relations are declared from both sides of a pair. The resolver checks that
//! the declarations agree, then emits exactly one association table per
//! unordered pair. The owning side is the entity that declares the other as a
//! foreign key; when both or neither do, the lexicographically smaller name
//! owns the table. A self-relation is owned by the entity itself and its
//! owning column carries the `parent_` prefix.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::error::ExstructError;
use crate::model::{EntityType, SchemaModel};
use crate::naming::{IdentifierNamer, IdentifierRole, Namespace};

/// Foreign-key column of an association table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationColumn {
    pub name: String,
    pub entity: String,
    pub references_table: String,
    pub references_column: String,
}

/// Junction table of a many-to-many relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationTable {
    pub name: String,
    pub owner: AssociationColumn,
    pub other: AssociationColumn,
    pub is_self_relation: bool,
}

impl AssociationTable {
    /// Whether this table joins `a` and `b` (in either direction)
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.owner.entity == a && self.other.entity == b)
            || (self.owner.entity == b && self.other.entity == a)
    }
}

/// Resolve every declared relation of `model` into association tables.
pub fn resolve_associations(
    model: &SchemaModel,
    namer: &IdentifierNamer,
) -> Result<Vec<AssociationTable>, ExstructError> {
    validate_relations(model)?;

    let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
    let mut tables = Vec::new();

    for entity in model.iter() {
        for related_name in &entity.related_types {
            let pair = canonical_pair(&entity.name, related_name);
            if !seen.insert(pair) {
                continue;
            }
            // validate_relations guarantees the related entity exists
            let related = model.get(related_name).ok_or_else(|| {
                ExstructError::inconsistency(format!("unknown entity type '{}'", related_name))
            })?;
            let (owner, other) = owning_side(entity, related);
            let table = build_association(owner, other, namer)?;

            debug!(
                table = %table.name,
                owner = %owner.name,
                other = %other.name,
                "resolved association"
            );
            tables.push(table);
        }
    }

    Ok(tables)
}

/// Every relation must name a declared entity type and be mirrored on the
/// other side; every foreign key must be a declared relation.
fn validate_relations(model: &SchemaModel) -> Result<(), ExstructError> {
    for entity in model.iter() {
        for related_name in &entity.related_types {
            let related = model.get(related_name).ok_or_else(|| {
                ExstructError::inconsistency(format!(
                    "'{}' is related to undeclared entity type '{}'",
                    entity.name, related_name
                ))
            })?;
            if !related.is_related_to(&entity.name) {
                return Err(ExstructError::inconsistency(format!(
                    "'{}' is related to '{}' but '{}' does not declare the relation back",
                    entity.name, related_name, related_name
                )));
            }
        }
        if let Some(orphan) = entity
            .foreign_keys
            .iter()
            .find(|fk| !entity.related_types.contains(*fk))
        {
            return Err(ExstructError::inconsistency(format!(
                "'{}' owns '{}' without declaring a relation to it",
                entity.name, orphan
            )));
        }
    }
    Ok(())
}

fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pick the owning side of a pair
fn owning_side<'a>(a: &'a EntityType, b: &'a EntityType) -> (&'a EntityType, &'a EntityType) {
    if a.name == b.name {
        return (a, a);
    }
    match (a.owns(&b.name), b.owns(&a.name)) {
        (true, false) => (a, b),
        (false, true) => (b, a),
        _ if a.name < b.name => (a, b),
        _ => (b, a),
    }
}

fn build_association(
    owner: &EntityType,
    other: &EntityType,
    namer: &IdentifierNamer,
) -> Result<AssociationTable, ExstructError> {
    let is_self_relation = owner.name == other.name;
    let name = namer.join(&[owner.name.as_str(), other.name.as_str()]);

    let owner_column = association_column(owner, is_self_relation, namer);
    let other_column = association_column(other, false, namer);

    let mut namespace = Namespace::new(format!("association table {}", name));
    namespace.claim(&format!("owning side {}", owner.name), &owner_column.name)?;
    namespace.claim(&format!("other side {}", other.name), &other_column.name)?;

    Ok(AssociationTable {
        name,
        owner: owner_column,
        other: other_column,
        is_self_relation,
    })
}

fn association_column(
    entity: &EntityType,
    is_self_relation: bool,
    namer: &IdentifierNamer,
) -> AssociationColumn {
    AssociationColumn {
        name: namer.name(IdentifierRole::PrimaryKey, &entity.name, is_self_relation),
        entity: entity.name.clone(),
        references_table: namer.name(IdentifierRole::Table, &entity.name, false),
        references_column: namer.name(IdentifierRole::PrimaryKey, &entity.name, false),
    }
}
