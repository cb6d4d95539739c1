//! Shared schema models for unit tests

use rust_exstruct::model::{Column, EntityType, SchemaModel};

/// `Order` owns a relation to `Customer`; only `Order` has an external id.
pub fn order_customer_model() -> SchemaModel {
    let mut model = SchemaModel::new();
    model
        .add_entity(
            EntityType::new("Order")
                .with_column(Column::new("order_number", "string"))
                .with_column(Column::new("total", "float"))
                .with_external_id(&["order_number"]),
        )
        .unwrap();
    model
        .add_entity(EntityType::new("Customer").with_column(Column::new("name", "string")))
        .unwrap();
    model.relate("Order", "Customer").unwrap();
    model
}

/// Single entity type with the given columns and no relations
pub fn single_entity_model(entity: EntityType) -> SchemaModel {
    let mut model = SchemaModel::new();
    model.add_entity(entity).unwrap();
    model
}
