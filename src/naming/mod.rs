//! Identifier derivation and collision checks

mod identifier;
mod namespace;

pub use identifier::{name, sanitize, IdentifierNamer, IdentifierRole, SELF_RELATION_PREFIX};
pub use namespace::Namespace;
