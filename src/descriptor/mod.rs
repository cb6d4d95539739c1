//! Type descriptors and their cache

mod cache;
mod type_descriptor;

pub use cache::{cache_key, is_boolean_only, TypeDescriptorCache};
pub use type_descriptor::{ColumnDescriptor, TypeDescriptor};
