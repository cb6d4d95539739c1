//! Build a schema model from a collected-info mapping
//!
//! Document extraction produces a nested mapping where every node carries an
//! `@collected_info` object. Nodes whose type is `object` are entity types;
//! every other node is a column. A column is attached to the table named by
//! the second-to-last segment of its `mapping` path, which lets extraction
//! hoist a column out of its syntactic parent.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use super::{Column, EntityType, SchemaModel, TypeTag};
use crate::error::ExstructError;

const COLLECTED_INFO: &str = "@collected_info";

/// Load a collected-info mapping from a JSON file and build the schema model
pub fn load_mapping(path: &Path, delimiter: &str) -> Result<SchemaModel, ExstructError> {
    let content = std::fs::read_to_string(path).map_err(|e| ExstructError::ModelReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mapping: Value =
        serde_json::from_str(&content).map_err(|e| ExstructError::ModelParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    build_from_mapping(&mapping, delimiter)
}

/// Build a schema model from a collected-info mapping.
///
/// The top-level object maps root entity names to their nodes. Relations are
/// reflected so each one is visible from both sides.
pub fn build_from_mapping(mapping: &Value, delimiter: &str) -> Result<SchemaModel, ExstructError> {
    let roots = mapping.as_object().ok_or_else(|| ExstructError::InvalidMapping {
        message: "top-level mapping must be an object".to_string(),
    })?;

    let mut model = SchemaModel::new();
    for (name, node) in roots {
        collect_entity(&mut model, name, node, delimiter)?;
    }
    model.reflect_relationships();

    debug!(entity_types = model.len(), "built schema model from mapping");
    Ok(model)
}

fn collect_entity(
    model: &mut SchemaModel,
    name: &str,
    node: &Value,
    delimiter: &str,
) -> Result<(), ExstructError> {
    let node = as_object(node, name)?;
    let info = collected_info(node, name)?;

    let entity = entity_mut(model, name);
    if let Some(annotation) = info.get("annotation").and_then(Value::as_str) {
        entity.annotation = annotation.to_string();
    }

    for (key, child) in node.iter().filter(|(key, _)| key.as_str() != COLLECTED_INFO) {
        let child_node = as_object(child, key)?;
        let child_info = collected_info(child_node, key)?;
        let type_name = child_info
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ExstructError::InvalidMapping {
                message: format!("'{}' has no type in its collected info", key),
            })?;

        if TypeTag::parse(type_name) == Some(TypeTag::Object) {
            let parent = entity_mut(model, name);
            parent.related_types.insert(key.clone());
            parent.foreign_keys.insert(key.clone());

            collect_entity(model, key, child, delimiter)?;
            if flag(child_info, "value_column") {
                entity_mut(model, key).has_value_column = true;
            }
        } else {
            let (table, column_name) = column_target(child_info, name, key, delimiter);
            let column = Column {
                name: column_name.clone(),
                type_tag: type_name.to_string(),
                annotation: child_info
                    .get("annotation")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                required: flag(child_info, "occurence"),
            };

            let target = entity_mut(model, &table);
            target.merge_column(column);
            if flag(child_info, "external_id") && !target.external_id_sources.contains(&column_name)
            {
                target.external_id_sources.push(column_name);
            }
        }
    }

    Ok(())
}

/// Resolve the table and column a scalar node belongs to from its mapping path
fn column_target(
    info: &Map<String, Value>,
    parent: &str,
    key: &str,
    delimiter: &str,
) -> (String, String) {
    let mapping = info.get("mapping").and_then(Value::as_str).unwrap_or_default();
    if mapping.is_empty() {
        return (parent.to_string(), key.to_string());
    }

    let segments: Vec<&str> = mapping.split(delimiter).collect();
    let column = segments.last().copied().unwrap_or(key);
    let table = if segments.len() >= 2 {
        segments[segments.len() - 2]
    } else {
        parent
    };
    (table.to_string(), column.to_string())
}

fn entity_mut<'a>(model: &'a mut SchemaModel, name: &str) -> &'a mut EntityType {
    model
        .entities
        .entry(name.to_string())
        .or_insert_with(|| EntityType::new(name))
}

fn as_object<'a>(value: &'a Value, key: &str) -> Result<&'a Map<String, Value>, ExstructError> {
    value.as_object().ok_or_else(|| ExstructError::InvalidMapping {
        message: format!("'{}' must be an object", key),
    })
}

fn collected_info<'a>(
    node: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, ExstructError> {
    node.get(COLLECTED_INFO)
        .and_then(Value::as_object)
        .ok_or_else(|| ExstructError::InvalidMapping {
            message: format!("'{}' has no {} object", key, COLLECTED_INFO),
        })
}

fn flag(info: &Map<String, Value>, key: &str) -> bool {
    info.get(key).and_then(Value::as_bool).unwrap_or(false)
}
