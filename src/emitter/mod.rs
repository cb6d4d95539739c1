//! Schema description assembly

mod description;
mod schema_emitter;

pub use description::*;
pub use schema_emitter::{emit_schema, SchemaEmitter};
