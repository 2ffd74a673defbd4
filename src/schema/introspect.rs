//! Schema introspection with a process-wide cache
//!
//! - One schema per record type, keyed by `TypeId`
//! - Built on first use, immutable afterwards
//! - Cache fills are compute-or-fetch: a concurrent duplicate computation is
//!   harmless and the first inserted schema wins

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, trace};

use super::errors::{SchemaDefinitionError, SchemaResult};
use super::record::{FieldSpec, Record, RecordRef, Shape};
use super::types::{FieldEntry, FieldKind, Schema};

type SchemaCache = RwLock<HashMap<TypeId, Arc<Schema>>>;

static CACHE: OnceLock<SchemaCache> = OnceLock::new();

thread_local! {
    /// Record types currently being introspected on this thread
    static IN_PROGRESS: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

fn cache() -> &'static SchemaCache {
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the schema for `T`, introspecting it on first use.
pub fn introspect<T: Record>() -> SchemaResult<Arc<Schema>> {
    introspect_ref(RecordRef::of::<T>())
}

pub(crate) fn introspect_ref(record: RecordRef) -> SchemaResult<Arc<Schema>> {
    let type_id = record.type_id();

    if let Some(schema) = cached(type_id) {
        trace!(record = schema.name(), "schema cache hit");
        return Ok(schema);
    }

    let descriptor = record.describe();

    let entered = IN_PROGRESS.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.contains(&type_id) {
            false
        } else {
            stack.push(type_id);
            true
        }
    });
    if !entered {
        return Err(SchemaDefinitionError::Cyclic {
            record: descriptor.name.to_string(),
        });
    }

    let built = build(descriptor.name, &descriptor.fields);

    IN_PROGRESS.with(|stack| {
        stack.borrow_mut().retain(|id| *id != type_id);
    });

    let schema = Arc::new(built?);
    debug!(
        record = schema.name(),
        fields = schema.len(),
        depth = schema.depth(),
        "introspected record schema"
    );
    Ok(store(type_id, schema))
}

fn build(name: &'static str, specs: &[FieldSpec]) -> SchemaResult<Schema> {
    let mut entries = Vec::with_capacity(specs.len());

    for spec in specs {
        if spec.key.is_empty() {
            return Err(SchemaDefinitionError::MissingKey {
                record: name.to_string(),
                field: spec.name.to_string(),
            });
        }

        let kind = match spec.shape {
            Shape::Scalar => FieldKind::Scalar,
            Shape::Record(nested) => FieldKind::Record(introspect_ref(nested)?),
            Shape::SequenceOfScalar => FieldKind::SequenceOfScalar,
            Shape::SequenceOfRecord(nested) => FieldKind::SequenceOfRecord(introspect_ref(nested)?),
            Shape::NestedSequence => {
                return Err(SchemaDefinitionError::NestedSequence {
                    record: name.to_string(),
                    field: spec.name.to_string(),
                })
            }
        };

        entries.push(FieldEntry::new(spec.name, spec.key, kind));
    }

    Schema::new(name, entries)
}

fn cached(type_id: TypeId) -> Option<Arc<Schema>> {
    cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
        .cloned()
}

fn store(type_id: TypeId, schema: Arc<Schema>) -> Arc<Schema> {
    cache()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(type_id)
        .or_insert(schema)
        .clone()
}
