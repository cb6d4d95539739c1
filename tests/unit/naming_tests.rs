//! Identifier Namer Tests

use rust_exstruct::naming::{name, IdentifierNamer, IdentifierRole};

const ALL_ROLES: [IdentifierRole; 7] = [
    IdentifierRole::Table,
    IdentifierRole::Column,
    IdentifierRole::PrimaryKey,
    IdentifierRole::Timestamp,
    IdentifierRole::ExternalId,
    IdentifierRole::Value,
    IdentifierRole::ArchiveTimestamp,
];

// ============================================================================
// Role Suffix Tests
// ============================================================================

#[test]
fn test_role_suffixes() {
    assert_eq!(name(IdentifierRole::Table, "Order", false), "order");
    assert_eq!(name(IdentifierRole::Column, "OrderNumber", false), "ordernumber");
    assert_eq!(name(IdentifierRole::PrimaryKey, "Order", false), "order_id");
    assert_eq!(name(IdentifierRole::Timestamp, "Order", false), "order_tmstp");
    assert_eq!(name(IdentifierRole::ExternalId, "Order", false), "order_ext_id");
    assert_eq!(name(IdentifierRole::Value, "Order", false), "order_value");
    assert_eq!(
        name(IdentifierRole::ArchiveTimestamp, "Order", false),
        "order_arch_tmstp"
    );
}

#[test]
fn test_separators_are_normalized() {
    assert_eq!(
        name(IdentifierRole::Column, "Delivery Address.Street-Name", false),
        "delivery_address_street_name"
    );
    assert_eq!(name(IdentifierRole::Column, "@id", false), "_id");
    assert_eq!(name(IdentifierRole::Table, "3D Model", false), "_3d_model");
}

// ============================================================================
// Truncation Tests
// ============================================================================

#[test]
fn test_identifiers_never_exceed_limit() {
    for len in [0, 1, 10, 56, 57, 60, 62, 63, 64, 100, 250] {
        let base = "Segment".repeat(len / 7 + 1)[..len].to_string();
        for role in ALL_ROLES {
            for is_self_relation in [false, true] {
                let id = name(role, &base, is_self_relation);
                assert!(
                    id.len() <= 63,
                    "identifier '{}' for role {} is {} bytes",
                    id,
                    role,
                    id.len()
                );
            }
        }
    }
}

#[test]
fn test_naming_is_deterministic() {
    let base = "An Unusually Long Element Name Taken From A Deeply Nested Document Schema";
    for role in ALL_ROLES {
        for is_self_relation in [false, true] {
            assert_eq!(
                name(role, base, is_self_relation),
                name(role, base, is_self_relation)
            );
        }
    }
}

#[test]
fn test_truncation_keeps_prefix_and_suffix() {
    let base = "a".repeat(80);
    let id = name(IdentifierRole::PrimaryKey, &base, false);
    assert_eq!(id.len(), 63);
    assert_eq!(id, format!("{}_id", "a".repeat(60)));
}

#[test]
fn test_multibyte_names_truncate_on_char_boundary() {
    let base = "é".repeat(40);
    let id = name(IdentifierRole::Timestamp, &base, false);
    assert!(id.len() <= 63);
    assert!(id.ends_with("_tmstp"));
    assert!(id.trim_end_matches("_tmstp").chars().all(|c| c == 'é'));
}

#[test]
fn test_custom_limit() {
    let namer = IdentifierNamer::new(10);
    assert_eq!(namer.name(IdentifierRole::Timestamp, "Customer", false), "cust_tmstp");
    assert_eq!(namer.name(IdentifierRole::Table, "Customer", false), "customer");
}

// ============================================================================
// Self-Relation Tests
// ============================================================================

#[test]
fn test_self_relation_prefix() {
    assert_eq!(name(IdentifierRole::PrimaryKey, "Node", true), "parent_node_id");
    assert_eq!(name(IdentifierRole::PrimaryKey, "Node", false), "node_id");
}

#[test]
fn test_self_relation_columns_differ_after_truncation() {
    let base = "category".repeat(12);
    let owner = name(IdentifierRole::PrimaryKey, &base, true);
    let other = name(IdentifierRole::PrimaryKey, &base, false);

    assert_ne!(owner, other);
    assert!(owner.starts_with("parent_"));
    assert!(owner.len() <= 63 && other.len() <= 63);
}

// ============================================================================
// Composite Name Tests
// ============================================================================

#[test]
fn test_join_association_name() {
    let namer = IdentifierNamer::default();
    assert_eq!(namer.join(&["Order", "Customer"]), "order_customer");

    let long = "x".repeat(50);
    assert_eq!(namer.join(&[long.as_str(), long.as_str()]).len(), 63);
}
