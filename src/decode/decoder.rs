//! Strict decoder
//!
//! At every record level:
//! 1. Parse the level into a `RawDocument`
//! 2. Validate the key set in both directions
//! 3. Read each field in declaration order, dispatching on its kind
//! 4. Assemble the value
//!
//! The first error anywhere aborts the whole decode. No partially populated
//! value is ever returned.

use serde_json::value::RawValue;
use tracing::trace;

use super::errors::{DecodeError, DecodeResult};
use super::raw::{parse_sequence, RawDocument};
use super::validator::{open_record, validate_keys};
use crate::schema::{introspect, FieldEntry, FieldKind, Record, Schema, SchemaDefinitionError};

/// Default document size limit (16 MiB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Decodes JSON documents into record types, strictly.
///
/// Stateless apart from its size limit; one decoder can be shared freely
/// across threads.
#[derive(Debug, Clone, Copy)]
pub struct StrictDecoder {
    max_document_bytes: usize,
}

impl Default for StrictDecoder {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl StrictDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest document, in bytes, the decoder will accept.
    pub fn with_max_document_bytes(mut self, limit: usize) -> Self {
        self.max_document_bytes = limit;
        self
    }

    pub fn max_document_bytes(&self) -> usize {
        self.max_document_bytes
    }

    /// Decodes `bytes` into `T`.
    ///
    /// # Errors
    ///
    /// - `SchemaDefinition` if `T`'s descriptor is malformed, regardless of
    ///   the document
    /// - `MissingField` / `UnexpectedField` if the key sets differ at any level
    /// - `ScalarDecode` if a leaf value does not fit its type
    /// - `NestedField` wrapping any of these below the root
    pub fn decode<T: Record>(&self, bytes: &[u8]) -> DecodeResult<T> {
        let schema = introspect::<T>()?;
        self.check_size(bytes)?;

        let document = RawDocument::parse(bytes)?;
        validate_keys(&schema, &document)?;
        RecordInput::new(&schema, document).assemble()
    }

    /// Structurally validates `bytes` against a runtime schema.
    pub fn validate(&self, bytes: &[u8], schema: &Schema) -> DecodeResult<()> {
        self.check_size(bytes)?;
        super::validator::validate(bytes, schema)
    }

    fn check_size(&self, bytes: &[u8]) -> DecodeResult<()> {
        if bytes.len() > self.max_document_bytes {
            return Err(DecodeError::DocumentTooLarge {
                limit: self.max_document_bytes,
                actual: bytes.len(),
            });
        }
        Ok(())
    }
}

/// A field value after structural dispatch, before typing.
///
/// Record levels inside have already passed key-set validation.
pub enum FieldValue<'a> {
    Scalar(&'a RawValue),
    Record(RecordInput<'a>),
    SequenceOfScalar(Vec<&'a RawValue>),
    SequenceOfRecord(Vec<RecordInput<'a>>),
}

/// Failure converting a [`FieldValue`] into a field type.
///
/// The reader attaches the key when turning it into a [`DecodeError`].
#[derive(Debug)]
pub enum FieldError {
    /// The tolerant scalar decoder rejected the value
    Scalar {
        index: Option<usize>,
        cause: serde_json::Error,
    },
    /// A nested record failed to decode
    Nested {
        index: Option<usize>,
        cause: DecodeError,
    },
    /// The field type's shape disagrees with the declared kind
    KindMismatch { read: &'static str },
}

impl FieldError {
    /// Tags the error with a sequence element index.
    pub fn at(self, index: usize) -> Self {
        match self {
            FieldError::Scalar { index: None, cause } => FieldError::Scalar {
                index: Some(index),
                cause,
            },
            FieldError::Nested { index: None, cause } => FieldError::Nested {
                index: Some(index),
                cause,
            },
            other => other,
        }
    }

    fn into_decode_error(self, schema: &Schema, entry: &FieldEntry) -> DecodeError {
        match self {
            FieldError::Scalar { index, cause } => DecodeError::ScalarDecode {
                key: entry.key.clone(),
                index,
                cause,
            },
            FieldError::Nested { index, cause } => cause.nested(&entry.key, index),
            FieldError::KindMismatch { read } => SchemaDefinitionError::KindMismatch {
                record: schema.name().to_string(),
                key: entry.key.clone(),
                declared: entry.kind.kind_name(),
                read,
            }
            .into(),
        }
    }
}

/// A key-validated record level together with its schema
pub struct RecordInput<'a> {
    schema: &'a Schema,
    document: RawDocument<'a>,
}

impl<'a> RecordInput<'a> {
    fn new(schema: &'a Schema, document: RawDocument<'a>) -> Self {
        Self { schema, document }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Runs `R::assemble` over this level and checks every field was read.
    pub fn assemble<R: Record>(self) -> DecodeResult<R> {
        trace!(record = self.schema.name(), "assembling record level");
        let mut reader = FieldReader::new(self.schema, self.document);
        let value = R::assemble(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

/// Converts a dispatched record field into `R`.
///
/// This is the `FieldType::from_field` body for every record type.
pub fn record_from_field<R: Record>(value: FieldValue<'_>) -> Result<R, FieldError> {
    match value {
        FieldValue::Record(input) => input
            .assemble::<R>()
            .map_err(|cause| FieldError::Nested { index: None, cause }),
        FieldValue::Scalar(_) | FieldValue::SequenceOfScalar(_) | FieldValue::SequenceOfRecord(_) => {
            Err(FieldError::KindMismatch { read: "record" })
        }
    }
}

/// Hands out the fields of one validated record level.
pub struct FieldReader<'a> {
    schema: &'a Schema,
    /// Raw value per declared field, by declaration position; `None` once read
    slots: Vec<Option<&'a RawValue>>,
}

impl<'a> FieldReader<'a> {
    fn new(schema: &'a Schema, document: RawDocument<'a>) -> Self {
        let mut slots = vec![None; schema.len()];
        for (key, raw) in document.into_entries() {
            if let Some(position) = schema.position(&key) {
                slots[position] = Some(raw);
            }
        }
        Self { schema, slots }
    }

    /// Reads and decodes the field declared under `key`.
    pub fn take<T: crate::schema::FieldType>(&mut self, key: &str) -> DecodeResult<T> {
        let position = self.schema.position(key).ok_or_else(|| {
            SchemaDefinitionError::UndeclaredRead {
                record: self.schema.name().to_string(),
                key: key.to_string(),
            }
        })?;

        let raw = self.slots[position].take().ok_or_else(|| {
            SchemaDefinitionError::RepeatedRead {
                record: self.schema.name().to_string(),
                key: key.to_string(),
            }
        })?;

        let schema: &'a Schema = self.schema;
        let entry = &schema.fields()[position];
        let value = dispatch(entry, raw)?;
        T::from_field(value).map_err(|e| e.into_decode_error(schema, entry))
    }

    fn finish(self) -> DecodeResult<()> {
        for (entry, slot) in self.schema.fields().iter().zip(&self.slots) {
            if slot.is_some() {
                return Err(SchemaDefinitionError::UnreadField {
                    record: self.schema.name().to_string(),
                    key: entry.key.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Routes one raw field value by its declared kind.
fn dispatch<'a>(entry: &'a FieldEntry, raw: &'a RawValue) -> DecodeResult<FieldValue<'a>> {
    let key = &entry.key;

    match &entry.kind {
        FieldKind::Scalar => Ok(FieldValue::Scalar(raw)),
        FieldKind::Record(nested) => {
            let document = open_record(nested, raw).map_err(|e| e.nested(key, None))?;
            Ok(FieldValue::Record(RecordInput::new(nested, document)))
        }
        FieldKind::SequenceOfScalar => {
            let items = parse_sequence(raw).map_err(|cause| DecodeError::ScalarDecode {
                key: key.clone(),
                index: None,
                cause,
            })?;
            Ok(FieldValue::SequenceOfScalar(items))
        }
        FieldKind::SequenceOfRecord(nested) => {
            let items = parse_sequence(raw).map_err(|cause| DecodeError::ScalarDecode {
                key: key.clone(),
                index: None,
                cause,
            })?;

            // Parsed once: the same per-element documents are validated here
            // and decoded by the element type.
            let mut inputs = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let document = open_record(nested, item).map_err(|e| e.nested(key, Some(index)))?;
                inputs.push(RecordInput::new(nested, document));
            }
            Ok(FieldValue::SequenceOfRecord(inputs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, RecordDescriptor};

    crate::strict_record! {
        #[derive(Debug, PartialEq)]
        struct Point {
            #[key = "x"]
            x: i64,
            #[key = "y"]
            y: i64,
        }
    }

    /// Declares `a` and `b` but forgets to read `b`
    #[derive(Debug)]
    struct Forgetful {
        a: i64,
    }

    impl Record for Forgetful {
        fn describe() -> RecordDescriptor {
            RecordDescriptor::new(
                "Forgetful",
                vec![FieldSpec::of::<i64>("a", "a"), FieldSpec::of::<i64>("b", "b")],
            )
        }

        fn assemble(fields: &mut FieldReader<'_>) -> DecodeResult<Self> {
            Ok(Self { a: fields.take("a")? })
        }
    }

    /// Reads a key it never declared
    #[derive(Debug)]
    struct Snooping;

    impl Record for Snooping {
        fn describe() -> RecordDescriptor {
            RecordDescriptor::new("Snooping", vec![FieldSpec::of::<i64>("a", "a")])
        }

        fn assemble(fields: &mut FieldReader<'_>) -> DecodeResult<Self> {
            let _: i64 = fields.take("a")?;
            let _: i64 = fields.take("secret")?;
            Ok(Self)
        }
    }

    /// Declares a record but reads it as a scalar
    #[derive(Debug)]
    struct Confused;

    impl Record for Confused {
        fn describe() -> RecordDescriptor {
            RecordDescriptor::new("Confused", vec![FieldSpec::of::<Point>("point", "point")])
        }

        fn assemble(fields: &mut FieldReader<'_>) -> DecodeResult<Self> {
            let _: i64 = fields.take("point")?;
            Ok(Self)
        }
    }

    /// Reads the same key twice
    #[derive(Debug)]
    struct Greedy;

    impl Record for Greedy {
        fn describe() -> RecordDescriptor {
            RecordDescriptor::new("Greedy", vec![FieldSpec::of::<i64>("a", "a")])
        }

        fn assemble(fields: &mut FieldReader<'_>) -> DecodeResult<Self> {
            let _: i64 = fields.take("a")?;
            let _: i64 = fields.take("a")?;
            Ok(Self)
        }
    }

    fn schema_error<T: Record + std::fmt::Debug>(bytes: &[u8]) -> SchemaDefinitionError {
        match StrictDecoder::new().decode::<T>(bytes) {
            Err(DecodeError::SchemaDefinition(err)) => err,
            other => panic!("expected schema definition error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_point() {
        let point: Point = StrictDecoder::new().decode(br#"{"y": 2, "x": 1}"#).unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[test]
    fn test_unread_field_is_schema_error() {
        let err = schema_error::<Forgetful>(br#"{"a": 1, "b": 2}"#);
        assert_eq!(
            err,
            SchemaDefinitionError::UnreadField {
                record: "Forgetful".into(),
                key: "b".into(),
            }
        );
    }

    #[test]
    fn test_undeclared_read_is_schema_error() {
        let err = schema_error::<Snooping>(br#"{"a": 1}"#);
        assert!(matches!(err, SchemaDefinitionError::UndeclaredRead { ref key, .. } if key == "secret"));
    }

    #[test]
    fn test_kind_mismatch_is_schema_error() {
        let err = schema_error::<Confused>(br#"{"point": {"x": 1, "y": 2}}"#);
        assert_eq!(
            err,
            SchemaDefinitionError::KindMismatch {
                record: "Confused".into(),
                key: "point".into(),
                declared: "record",
                read: "scalar",
            }
        );
    }

    #[test]
    fn test_repeated_read_is_schema_error() {
        let err = schema_error::<Greedy>(br#"{"a": 1}"#);
        assert!(matches!(err, SchemaDefinitionError::RepeatedRead { ref key, .. } if key == "a"));
    }

    #[test]
    fn test_size_limit() {
        let decoder = StrictDecoder::new().with_max_document_bytes(8);
        let err = decoder.decode::<Point>(br#"{"x": 1, "y": 2}"#).unwrap_err();
        assert!(matches!(err, DecodeError::DocumentTooLarge { limit: 8, actual: 16 }));
        assert_eq!(decoder.max_document_bytes(), 8);
    }

    #[test]
    fn test_field_error_index_is_set_once() {
        let cause = serde_json::from_str::<i64>("true").unwrap_err();
        let err = FieldError::Scalar { index: None, cause }.at(3).at(7);
        assert!(matches!(err, FieldError::Scalar { index: Some(3), .. }));
    }
}
