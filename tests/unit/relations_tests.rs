//! Association Resolver Tests

use rust_exstruct::model::{EntityType, SchemaModel};
use rust_exstruct::naming::IdentifierNamer;
use rust_exstruct::relations::resolve_associations;
use rust_exstruct::ExstructError;

use crate::fixtures::order_customer_model;

fn model_of(names: &[&str]) -> SchemaModel {
    let mut model = SchemaModel::new();
    for name in names {
        model.add_entity(EntityType::new(*name)).unwrap();
    }
    model
}

// ============================================================================
// Deduplication Tests
// ============================================================================

#[test]
fn test_one_table_per_symmetric_pair() {
    let model = order_customer_model();
    let tables = resolve_associations(&model, &IdentifierNamer::default()).unwrap();

    assert_eq!(tables.len(), 1);
    let table = &tables[0];
    assert_eq!(table.name, "order_customer");
    assert_eq!(table.owner.entity, "Order");
    assert_eq!(table.owner.name, "order_id");
    assert_eq!(table.other.entity, "Customer");
    assert_eq!(table.other.name, "customer_id");
    assert!(!table.is_self_relation);
}

#[test]
fn test_columns_reference_primary_keys() {
    let model = order_customer_model();
    let tables = resolve_associations(&model, &IdentifierNamer::default()).unwrap();

    let table = &tables[0];
    assert_eq!(table.owner.references_table, "order");
    assert_eq!(table.owner.references_column, "order_id");
    assert_eq!(table.other.references_table, "customer");
    assert_eq!(table.other.references_column, "customer_id");
}

#[test]
fn test_pair_owned_from_both_sides_uses_name_order() {
    let mut model = model_of(&["Shipment", "Invoice"]);
    model.relate("Shipment", "Invoice").unwrap();
    model.relate("Invoice", "Shipment").unwrap();

    let tables = resolve_associations(&model, &IdentifierNamer::default()).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "invoice_shipment");
    assert_eq!(tables[0].owner.entity, "Invoice");
}

#[test]
fn test_unowned_pair_uses_name_order() {
    let mut model = model_of(&["b", "a"]);
    model
        .entities
        .get_mut("a")
        .unwrap()
        .related_types
        .insert("b".to_string());
    model
        .entities
        .get_mut("b")
        .unwrap()
        .related_types
        .insert("a".to_string());

    let tables = resolve_associations(&model, &IdentifierNamer::default()).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "a_b");
}

#[test]
fn test_every_pair_resolved_once() {
    let mut model = model_of(&["Order", "Customer", "Product", "Warehouse"]);
    model.relate("Order", "Customer").unwrap();
    model.relate("Order", "Product").unwrap();
    model.relate("Warehouse", "Product").unwrap();

    let tables = resolve_associations(&model, &IdentifierNamer::default()).unwrap();
    let mut names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["order_customer", "order_product", "warehouse_product"]
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let mut model = model_of(&["Order", "Customer", "Product"]);
    model.relate("Order", "Customer").unwrap();
    model.relate("Product", "Order").unwrap();

    let namer = IdentifierNamer::default();
    assert_eq!(
        resolve_associations(&model, &namer).unwrap(),
        resolve_associations(&model, &namer).unwrap()
    );
}

// ============================================================================
// Self-Relation Tests
// ============================================================================

#[test]
fn test_self_relation_has_distinct_columns() {
    let mut model = model_of(&["Category"]);
    model.relate("Category", "Category").unwrap();

    let tables = resolve_associations(&model, &IdentifierNamer::default()).unwrap();
    assert_eq!(tables.len(), 1);
    let table = &tables[0];
    assert!(table.is_self_relation);
    assert_eq!(table.name, "category_category");
    assert_eq!(table.owner.name, "parent_category_id");
    assert_eq!(table.other.name, "category_id");
    assert_eq!(table.owner.references_column, "category_id");
}

#[test]
fn test_long_self_relation_columns_stay_distinct() {
    let name = "Section".repeat(12);
    let mut model = model_of(&[name.as_str()]);
    model.relate(&name, &name).unwrap();

    let tables = resolve_associations(&model, &IdentifierNamer::default()).unwrap();
    let table = &tables[0];
    assert_ne!(table.owner.name, table.other.name);
    assert!(table.owner.name.len() <= 63);
    assert!(table.other.name.len() <= 63);
    assert!(table.name.len() <= 63);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_one_sided_relation_is_inconsistent() {
    let mut model = model_of(&["Order", "Customer"]);
    model
        .entities
        .get_mut("Order")
        .unwrap()
        .related_types
        .insert("Customer".to_string());

    let err = resolve_associations(&model, &IdentifierNamer::default()).unwrap_err();
    assert!(
        matches!(err, ExstructError::SchemaInconsistency { .. }),
        "expected SchemaInconsistency, got {err}"
    );
}

#[test]
fn test_relation_to_undeclared_type_is_inconsistent() {
    let mut model = model_of(&["Order"]);
    model
        .entities
        .get_mut("Order")
        .unwrap()
        .related_types
        .insert("Ghost".to_string());

    let err = resolve_associations(&model, &IdentifierNamer::default()).unwrap_err();
    assert!(matches!(err, ExstructError::SchemaInconsistency { .. }));
}

#[test]
fn test_foreign_key_without_relation_is_inconsistent() {
    let mut model = model_of(&["Order", "Customer"]);
    model
        .entities
        .get_mut("Order")
        .unwrap()
        .foreign_keys
        .insert("Customer".to_string());

    let err = resolve_associations(&model, &IdentifierNamer::default()).unwrap_err();
    assert!(matches!(err, ExstructError::SchemaInconsistency { .. }));
}

#[test]
fn test_reflected_model_resolves() {
    let mut model = model_of(&["Order", "Customer"]);
    model
        .entities
        .get_mut("Order")
        .unwrap()
        .foreign_keys
        .insert("Customer".to_string());
    model.reflect_relationships();

    let tables = resolve_associations(&model, &IdentifierNamer::default()).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "order_customer");
}

#[test]
fn test_truncated_column_names_collide() {
    let prefix = "x".repeat(70);
    let a = format!("{}a", prefix);
    let b = format!("{}b", prefix);
    let mut model = model_of(&[a.as_str(), b.as_str()]);
    model.relate(&a, &b).unwrap();

    let err = resolve_associations(&model, &IdentifierNamer::default()).unwrap_err();
    assert!(
        matches!(err, ExstructError::IdentifierCollision { .. }),
        "expected IdentifierCollision, got {err}"
    );
}
