//! Bidirectional key-set validation
//!
//! Validation semantics:
//! - Every declared key is present
//! - No undeclared key is present
//! - Both hold at every nesting level and for every element of every
//!   sequence of records
//!
//! Reporting is deterministic: missing keys are checked first, in schema
//! declaration order; unexpected keys next, in document order.

use serde_json::value::RawValue;
use tracing::trace;

use super::errors::{DecodeError, DecodeResult};
use super::raw::{parse_sequence, RawDocument};
use crate::schema::{FieldKind, Schema};

/// Checks that the document's key set equals the schema's declared key set.
pub fn validate_keys(schema: &Schema, document: &RawDocument<'_>) -> DecodeResult<()> {
    for key in schema.keys() {
        if !document.contains(key) {
            return Err(DecodeError::MissingField {
                key: key.to_string(),
            });
        }
    }

    for key in document.keys() {
        if !schema.declares(key) {
            return Err(DecodeError::UnexpectedField {
                key: key.to_string(),
            });
        }
    }

    Ok(())
}

/// Parses one record level and validates its key set.
pub(crate) fn open_record<'a>(schema: &Schema, raw: &'a RawValue) -> DecodeResult<RawDocument<'a>> {
    let document = RawDocument::from_raw(raw)?;
    validate_keys(schema, &document)?;
    Ok(document)
}

/// Structurally validates a whole document against a runtime schema.
///
/// This is the untyped counterpart of [`StrictDecoder::decode`]: it walks the
/// same levels in the same order and reports the same structural errors, but
/// leaves leaf values untyped. Use it with schemas loaded from definition
/// files.
///
/// [`StrictDecoder::decode`]: super::StrictDecoder::decode
pub fn validate(bytes: &[u8], schema: &Schema) -> DecodeResult<()> {
    let document = RawDocument::parse(bytes)?;
    validate_keys(schema, &document)?;
    validate_fields(schema, &document)
}

fn validate_fields(schema: &Schema, document: &RawDocument<'_>) -> DecodeResult<()> {
    trace!(record = schema.name(), "validating record level");

    for entry in schema.fields() {
        // Presence was established by validate_keys
        let Some(raw) = document.get(&entry.key) else {
            return Err(DecodeError::MissingField {
                key: entry.key.clone(),
            });
        };

        match &entry.kind {
            FieldKind::Scalar => {}
            FieldKind::Record(nested) => {
                validate_record(nested, raw).map_err(|e| e.nested(&entry.key, None))?;
            }
            FieldKind::SequenceOfScalar => {
                parse_sequence(raw).map_err(|cause| DecodeError::ScalarDecode {
                    key: entry.key.clone(),
                    index: None,
                    cause,
                })?;
            }
            FieldKind::SequenceOfRecord(nested) => {
                let items = parse_sequence(raw).map_err(|cause| DecodeError::ScalarDecode {
                    key: entry.key.clone(),
                    index: None,
                    cause,
                })?;
                // Every element's key set first, then each element's fields,
                // the same order the typed decoder assembles them in.
                let mut documents = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let document =
                        open_record(nested, item).map_err(|e| e.nested(&entry.key, Some(index)))?;
                    documents.push(document);
                }
                for (index, document) in documents.iter().enumerate() {
                    validate_fields(nested, document)
                        .map_err(|e| e.nested(&entry.key, Some(index)))?;
                }
            }
        }
    }

    Ok(())
}

fn validate_record(schema: &Schema, raw: &RawValue) -> DecodeResult<()> {
    let document = open_record(schema, raw)?;
    validate_fields(schema, &document)
}
