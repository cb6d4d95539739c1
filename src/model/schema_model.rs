//! Schema model representation

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use super::EntityType;
use crate::error::ExstructError;

/// The complete set of entity types to generate a schema for.
///
/// Entity types are keyed by name so iteration order is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaModel {
    pub entities: BTreeMap<String, EntityType>,
}

/// On-disk form of a schema model
#[derive(Debug, Deserialize)]
struct ModelFile {
    entity_types: Vec<EntityType>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity type. Entity names are unique within a model and column
    /// names are unique within an entity type.
    pub fn add_entity(&mut self, entity: EntityType) -> Result<(), ExstructError> {
        if self.entities.contains_key(&entity.name) {
            return Err(ExstructError::inconsistency(format!(
                "entity type '{}' is declared more than once",
                entity.name
            )));
        }
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = entity.columns.iter().find(|c| !seen.insert(c.name.as_str())) {
            return Err(ExstructError::inconsistency(format!(
                "column '{}' is declared more than once on entity type '{}'",
                duplicate.name, entity.name
            )));
        }
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EntityType> {
        self.entities.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityType> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Declare that `owner` is related to `other` and owns the relation.
    ///
    /// Both sides record the relation; only `owner` records the foreign key.
    pub fn relate(&mut self, owner: &str, other: &str) -> Result<(), ExstructError> {
        for name in [owner, other] {
            if !self.entities.contains_key(name) {
                return Err(ExstructError::inconsistency(format!(
                    "cannot relate unknown entity type '{}'",
                    name
                )));
            }
        }
        if let Some(entity) = self.entities.get_mut(owner) {
            entity.related_types.insert(other.to_string());
            entity.foreign_keys.insert(other.to_string());
        }
        if let Some(entity) = self.entities.get_mut(other) {
            entity.related_types.insert(owner.to_string());
        }
        Ok(())
    }

    /// Make every relation visible from both sides.
    ///
    /// Foreign keys imply a relation on the owning side too. References to
    /// entity types missing from the model are left in place for the
    /// association resolver to report.
    pub fn reflect_relationships(&mut self) {
        let mut back_references = Vec::new();
        for entity in self.entities.values_mut() {
            let owned: Vec<String> = entity.foreign_keys.iter().cloned().collect();
            entity.related_types.extend(owned);
            for related in &entity.related_types {
                back_references.push((related.clone(), entity.name.clone()));
            }
        }
        for (target, source) in back_references {
            if let Some(entity) = self.entities.get_mut(&target) {
                entity.related_types.insert(source);
            }
        }
    }

    /// Build a model from a list of entity types, in any order
    pub fn from_entities(
        entities: impl IntoIterator<Item = EntityType>,
    ) -> Result<Self, ExstructError> {
        let mut model = SchemaModel::new();
        for entity in entities {
            model.add_entity(entity)?;
        }
        Ok(model)
    }
}

/// Load a schema model from a JSON file
pub fn load_model(path: &Path) -> Result<SchemaModel, ExstructError> {
    let content = std::fs::read_to_string(path).map_err(|e| ExstructError::ModelReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: ModelFile =
        serde_json::from_str(&content).map_err(|e| ExstructError::ModelParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    SchemaModel::from_entities(file.entity_types)
}
