//! Input schema model

mod builder;
mod elements;
mod schema_model;

pub use builder::{build_from_mapping, load_mapping};
pub use elements::*;
pub use schema_model::{load_model, SchemaModel};
