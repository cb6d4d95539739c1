//! External ID Strategy Tests

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use rust_exstruct::external_id::{
    insert_trigger, select_strategy, update_trigger, ExternalIdStrategy, TriggerEvent,
    HASH_HEX_LEN,
};
use rust_exstruct::model::{Column, EntityType};
use rust_exstruct::naming::IdentifierNamer;
use rust_exstruct::ExstructError;

fn row(values: &[(&str, &str)]) -> BTreeMap<String, String> {
    values
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Strategy Selection Tests
// ============================================================================

#[test]
fn test_no_sources_means_no_strategy() {
    let entity = EntityType::new("Customer").with_column(Column::new("name", "string"));
    let strategy = select_strategy(&entity, &IdentifierNamer::default()).unwrap();
    assert!(strategy.is_none());
}

#[test]
fn test_single_source_is_direct_copy() {
    let entity = EntityType::new("Order")
        .with_column(Column::new("code", "string"))
        .with_external_id(&["code"]);
    let strategy = select_strategy(&entity, &IdentifierNamer::default())
        .unwrap()
        .unwrap();

    assert_eq!(
        strategy,
        ExternalIdStrategy::Direct {
            source: "code".to_string()
        }
    );
}

#[test]
fn test_several_sources_hash_in_declared_order() {
    let entity = EntityType::new("Line")
        .with_column(Column::new("b", "string"))
        .with_column(Column::new("a", "string"))
        .with_external_id(&["a", "b"]);
    let strategy = select_strategy(&entity, &IdentifierNamer::default())
        .unwrap()
        .unwrap();

    assert_eq!(strategy.sources(), vec!["a", "b"]);
    assert!(matches!(strategy, ExternalIdStrategy::ContentHash { .. }));
}

#[test]
fn test_undeclared_source_is_rejected() {
    let entity = EntityType::new("Order")
        .with_column(Column::new("code", "string"))
        .with_external_id(&["missing"]);
    let err = select_strategy(&entity, &IdentifierNamer::default()).unwrap_err();

    match err {
        ExstructError::MissingExternalIdSource { entity, column } => {
            assert_eq!(entity, "Order");
            assert_eq!(column, "missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Computation Tests
// ============================================================================

#[test]
fn test_direct_copy_follows_updates() {
    let strategy = ExternalIdStrategy::Direct {
        source: "code".to_string(),
    };

    assert_eq!(strategy.compute(&row(&[("code", "X1")])), Some("X1".to_string()));
    assert_eq!(strategy.compute(&row(&[("code", "X2")])), Some("X2".to_string()));
    assert_eq!(strategy.compute(&row(&[])), None);
}

#[test]
fn test_content_hash_of_concatenation() {
    let strategy = ExternalIdStrategy::ContentHash {
        sources: vec!["a".to_string(), "b".to_string()],
    };
    let hash = strategy
        .compute(&row(&[("a", "foo"), ("b", "bar")]))
        .unwrap();

    assert_eq!(hash, hex::encode(Sha256::digest(b"foobar")));
    assert_eq!(hash.len(), HASH_HEX_LEN);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_content_hash_depends_on_order() {
    let forward = ExternalIdStrategy::ContentHash {
        sources: vec!["a".to_string(), "b".to_string()],
    };
    let reverse = ExternalIdStrategy::ContentHash {
        sources: vec!["b".to_string(), "a".to_string()],
    };
    let values = row(&[("a", "foo"), ("b", "bar")]);

    assert_ne!(forward.compute(&values), reverse.compute(&values));
}

#[test]
fn test_content_hash_treats_null_as_empty() {
    let strategy = ExternalIdStrategy::ContentHash {
        sources: vec!["a".to_string(), "b".to_string()],
    };
    let hash = strategy.compute(&row(&[("b", "bar")])).unwrap();
    assert_eq!(hash, hex::encode(Sha256::digest(b"bar")));
}

// ============================================================================
// Trigger Tests
// ============================================================================

#[test]
fn test_insert_and_update_triggers() {
    let namer = IdentifierNamer::default();
    let strategy = ExternalIdStrategy::Direct {
        source: "code".to_string(),
    };

    let insert = insert_trigger("shop", "order", "order_ext_id", &strategy, &namer);
    let update = update_trigger("shop", "order", "order_ext_id", &strategy, &namer);

    assert_eq!(insert.event, TriggerEvent::Insert);
    assert_eq!(insert.name, "order_ins_ext_id");
    assert_eq!(insert.function, "order_ins_ext_id_fn");
    assert_eq!(update.event, TriggerEvent::Update);
    assert_eq!(update.name, "order_upd_ext_id");
    assert_eq!(update.function, "order_upd_ext_id_fn");

    assert_eq!(insert.target_column, update.target_column);
    assert_eq!(insert.strategy, update.strategy);
}

#[test]
fn test_trigger_names_respect_limit() {
    let namer = IdentifierNamer::default();
    let table = "t".repeat(63);
    let strategy = ExternalIdStrategy::Direct {
        source: "code".to_string(),
    };

    let trigger = update_trigger("shop", &table, "ext", &strategy, &namer);
    assert!(trigger.name.len() <= 63);
    assert!(trigger.function.len() <= 63);
    assert!(trigger.function.ends_with("_upd_ext_id_fn"));
}
