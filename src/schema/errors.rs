//! Schema definition errors
//!
//! These are programmer errors in a record type or a schema file, never data
//! errors. They are FATAL at the call site: fix the schema, don't retry.

use thiserror::Error;

/// Result type for schema construction and introspection
pub type SchemaResult<T> = Result<T, SchemaDefinitionError>;

/// A malformed schema: missing or duplicate keys, unsupported shapes, or a
/// record type whose assembly disagrees with its own descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaDefinitionError {
    /// A field declares no serialization key
    #[error("json key not set for field '{field}' of '{record}'")]
    MissingKey { record: String, field: String },

    /// Two fields of one record declare the same key
    #[error("key '{key}' is declared more than once in '{record}'")]
    DuplicateKey { record: String, key: String },

    /// `Vec<Vec<_>>` and friends: inner elements would escape structural checks
    #[error("field '{field}' of '{record}' is a sequence of sequences, which strict decoding does not support")]
    NestedSequence { record: String, field: String },

    /// A record type contains itself
    #[error("record '{record}' is defined in terms of itself")]
    Cyclic { record: String },

    /// `assemble` asked for a key the descriptor never declared
    #[error("'{record}' reads undeclared key '{key}'")]
    UndeclaredRead { record: String, key: String },

    /// `assemble` asked for the same key twice
    #[error("'{record}' reads field '{key}' more than once")]
    RepeatedRead { record: String, key: String },

    /// `assemble` read a field as a different kind than declared
    #[error("'{record}' declares field '{key}' as {declared} but reads it as {read}")]
    KindMismatch {
        record: String,
        key: String,
        declared: &'static str,
        read: &'static str,
    },

    /// `assemble` returned without reading a declared field
    #[error("'{record}' never reads declared field '{key}'")]
    UnreadField { record: String, key: String },

    /// A schema definition file could not be read or parsed
    #[error("malformed schema definition '{origin}': {reason}")]
    Malformed { origin: String, reason: String },

    /// A schema name was registered twice
    #[error("schema '{name}' is already registered")]
    AlreadyRegistered { name: String },
}

impl SchemaDefinitionError {
    pub(crate) fn malformed(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Returns the record (or schema file) the error was found in, if any
    pub fn record(&self) -> Option<&str> {
        match self {
            Self::MissingKey { record, .. }
            | Self::DuplicateKey { record, .. }
            | Self::NestedSequence { record, .. }
            | Self::Cyclic { record }
            | Self::UndeclaredRead { record, .. }
            | Self::RepeatedRead { record, .. }
            | Self::KindMismatch { record, .. }
            | Self::UnreadField { record, .. } => Some(record),
            Self::Malformed { origin, .. } => Some(origin),
            Self::AlreadyRegistered { name } => Some(name),
        }
    }
}
