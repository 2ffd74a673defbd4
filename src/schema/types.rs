//! Runtime schema types
//!
//! A `Schema` is the introspected shape of one record type:
//! - fields in declaration order
//! - each field's declared key (non-empty, unique)
//! - each field's kind, with the nested schema for records
//!
//! Schemas are immutable once built and shared through `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::errors::{SchemaDefinitionError, SchemaResult};

/// Semantic kind of a field.
///
/// Closed set: every dispatch over it is an exhaustive `match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Leaf value, decoded by the tolerant scalar decoder
    Scalar,
    /// Nested record, validated strictly
    Record(Arc<Schema>),
    /// Sequence of leaf values, no per-element structural check
    SequenceOfScalar,
    /// Sequence of records, every element validated strictly
    SequenceOfRecord(Arc<Schema>),
}

impl FieldKind {
    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Record(_) => "record",
            FieldKind::SequenceOfScalar => "sequence_of_scalar",
            FieldKind::SequenceOfRecord(_) => "sequence_of_record",
        }
    }

    /// Returns the nested schema for record kinds
    pub fn nested_schema(&self) -> Option<&Arc<Schema>> {
        match self {
            FieldKind::Record(schema) | FieldKind::SequenceOfRecord(schema) => Some(schema),
            FieldKind::Scalar | FieldKind::SequenceOfScalar => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// One declared field of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    /// Field identity in the host type
    pub name: String,
    /// Declared serialization key
    pub key: String,
    /// Field kind
    pub kind: FieldKind,
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            kind,
        }
    }

    pub fn scalar(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(name, key, FieldKind::Scalar)
    }

    pub fn record(name: impl Into<String>, key: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self::new(name, key, FieldKind::Record(schema))
    }

    pub fn sequence_of_scalar(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(name, key, FieldKind::SequenceOfScalar)
    }

    pub fn sequence_of_record(
        name: impl Into<String>,
        key: impl Into<String>,
        schema: Arc<Schema>,
    ) -> Self {
        Self::new(name, key, FieldKind::SequenceOfRecord(schema))
    }
}

/// Introspected shape of one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldEntry>,
    positions: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema, rejecting empty and duplicate keys.
    pub fn new(name: impl Into<String>, fields: Vec<FieldEntry>) -> SchemaResult<Self> {
        let name = name.into();
        let mut positions = HashMap::with_capacity(fields.len());

        for (position, entry) in fields.iter().enumerate() {
            if entry.key.is_empty() {
                return Err(SchemaDefinitionError::MissingKey {
                    record: name,
                    field: entry.name.clone(),
                });
            }
            if positions.insert(entry.key.clone(), position).is_some() {
                return Err(SchemaDefinitionError::DuplicateKey {
                    record: name,
                    key: entry.key.clone(),
                });
            }
        }

        Ok(Self {
            name,
            fields,
            positions,
        })
    }

    /// Returns the record name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// Looks up a field by declared key
    pub fn field(&self, key: &str) -> Option<&FieldEntry> {
        self.position(key).map(|position| &self.fields[position])
    }

    /// Returns the declaration position of a key
    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Returns true if the schema declares `key`
    pub fn declares(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Declared keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|entry| entry.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Nesting depth: 1 for a record of scalars, +1 per nested record level
    pub fn depth(&self) -> usize {
        1 + self
            .fields
            .iter()
            .filter_map(|entry| entry.kind.nested_schema())
            .map(|nested| nested.depth())
            .max()
            .unwrap_or(0)
    }
}
