//! Many-to-many relation resolution

mod resolver;

pub use resolver::{resolve_associations, AssociationColumn, AssociationTable};
