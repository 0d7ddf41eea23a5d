//! graphdump-core: Record types and row errors shared by the graphdump crates.
//!
//! - Node and relationship records, as read from either source
//! - Property values with the literal typing used for replay statements
//! - Per-row error types

pub mod error;
pub mod types;

pub use error::{MalformedRow, RecordError};
pub use types::{
    is_identifier, NodeRecord, PropertyMap, PropertyValue, RelationshipProperties,
    RelationshipRecord, SourceKind,
};
