//! Schema subsystem
//!
//! A schema is the introspected shape of a record type: its fields in
//! declaration order, each with an explicit key and a kind.
//!
//! # Design Principles
//!
//! - Every field declares its key; there is no name-based fallback
//! - Keys are unique within a record
//! - Kinds form a closed set, matched exhaustively
//! - Schemas are immutable once built and cached per type

mod errors;
mod introspect;
mod loader;
mod record;
mod types;

pub use errors::{SchemaDefinitionError, SchemaResult};
pub use introspect::introspect;
pub use loader::{FieldDefinition, KindDefinition, SchemaDefinition, SchemaLoader};
pub use record::{FieldSpec, FieldType, Record, RecordDescriptor, RecordRef, Shape};
pub use types::{FieldEntry, FieldKind, Schema};

impl Schema {
    /// Returns the (cached) schema of a record type.
    pub fn of<T: Record>() -> SchemaResult<std::sync::Arc<Schema>> {
        introspect::<T>()
    }
}
