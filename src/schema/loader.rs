//! Schema definition files
//!
//! Runtime schemas can be loaded from JSON definition files, one schema per
//! file, for documents whose shape is not known at build time:
//!
//! ```json
//! {
//!   "name": "Order",
//!   "fields": [
//!     { "key": "order_id", "kind": "scalar" },
//!     { "key": "lines", "kind": "sequence_of_record",
//!       "schema": { "name": "Line", "fields": [ { "key": "sku", "kind": "scalar" } ] } }
//!   ]
//! }
//! ```
//!
//! Definition files go through the same checks as introspected record types:
//! empty or duplicate keys are schema-definition errors.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{SchemaDefinitionError, SchemaResult};
use super::types::{FieldEntry, FieldKind, Schema};

/// On-disk form of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

/// On-disk form of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field identity; defaults to the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared key. Left empty it is reported as a missing key, naming the field.
    #[serde(default)]
    pub key: String,
    #[serde(flatten)]
    pub kind: KindDefinition,
}

/// On-disk form of a field kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindDefinition {
    Scalar,
    Record { schema: SchemaDefinition },
    SequenceOfScalar,
    SequenceOfRecord { schema: SchemaDefinition },
}

impl SchemaDefinition {
    /// Builds the runtime schema, checking keys at every level.
    pub fn to_schema(&self) -> SchemaResult<Arc<Schema>> {
        let mut entries = Vec::with_capacity(self.fields.len());

        for (position, field) in self.fields.iter().enumerate() {
            let name = match (&field.name, field.key.is_empty()) {
                (Some(name), _) => name.clone(),
                (None, false) => field.key.clone(),
                (None, true) => format!("#{}", position),
            };

            let kind = match &field.kind {
                KindDefinition::Scalar => FieldKind::Scalar,
                KindDefinition::Record { schema } => FieldKind::Record(schema.to_schema()?),
                KindDefinition::SequenceOfScalar => FieldKind::SequenceOfScalar,
                KindDefinition::SequenceOfRecord { schema } => {
                    FieldKind::SequenceOfRecord(schema.to_schema()?)
                }
            };

            entries.push(FieldEntry::new(name, field.key.clone(), kind));
        }

        Ok(Arc::new(Schema::new(self.name.clone(), entries)?))
    }
}

impl From<&Schema> for SchemaDefinition {
    fn from(schema: &Schema) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|entry| FieldDefinition {
                name: (entry.name != entry.key).then(|| entry.name.clone()),
                key: entry.key.clone(),
                kind: match &entry.kind {
                    FieldKind::Scalar => KindDefinition::Scalar,
                    FieldKind::Record(nested) => KindDefinition::Record {
                        schema: nested.as_ref().into(),
                    },
                    FieldKind::SequenceOfScalar => KindDefinition::SequenceOfScalar,
                    FieldKind::SequenceOfRecord(nested) => KindDefinition::SequenceOfRecord {
                        schema: nested.as_ref().into(),
                    },
                },
            })
            .collect();

        Self {
            name: schema.name().to_string(),
            fields,
        }
    }
}

/// Loads schema definition files and keeps them indexed by name.
pub struct SchemaLoader {
    /// Directory containing `*.json` definition files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by name
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaLoader {
    /// Creates a loader for definition files in `schema_dir`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file in the schema directory.
    ///
    /// Files are read in name order so duplicate-name errors are reproducible.
    /// A missing directory is not an error: there is simply nothing to load.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaDefinitionError::malformed(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaDefinitionError::malformed(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let schema = Self::read_file(&path)?;
            self.register(schema)?;
        }

        debug!(
            dir = %self.schema_dir.display(),
            schemas = self.schemas.len(),
            "loaded schema definitions"
        );
        Ok(())
    }

    /// Reads and builds a single definition file without registering it.
    pub fn read_file(path: &Path) -> SchemaResult<Arc<Schema>> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaDefinitionError::malformed(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let definition: SchemaDefinition = serde_json::from_str(&content).map_err(|e| {
            SchemaDefinitionError::malformed(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        definition.to_schema()
    }

    /// Registers a schema. Names are immutable once registered.
    pub fn register(&mut self, schema: Arc<Schema>) -> SchemaResult<()> {
        if self.schemas.contains_key(schema.name()) {
            return Err(SchemaDefinitionError::AlreadyRegistered {
                name: schema.name().to_string(),
            });
        }

        self.schemas.insert(schema.name().to_string(), schema);
        Ok(())
    }

    /// Gets a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Checks if a schema exists.
    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns all loaded schemas.
    pub fn all_schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
