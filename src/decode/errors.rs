//! Decode error taxonomy
//!
//! Error codes:
//! - STRICT_SCHEMA_DEFINITION (FATAL)
//! - STRICT_MALFORMED_DOCUMENT (REJECT)
//! - STRICT_DOCUMENT_TOO_LARGE (REJECT)
//! - STRICT_DUPLICATE_FIELD (REJECT)
//! - STRICT_MISSING_FIELD (REJECT)
//! - STRICT_UNEXPECTED_FIELD (REJECT)
//! - STRICT_SCALAR_DECODE (REJECT)
//! - STRICT_NESTED_FIELD (takes the severity of its cause)

use std::fmt;

use thiserror::Error;

use crate::schema::SchemaDefinitionError;

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Severity levels for decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The document and the schema disagree; report it to whoever owns either
    Reject,
    /// The schema itself is broken; fix it, don't retry
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Stable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorCode {
    SchemaDefinition,
    MalformedDocument,
    DocumentTooLarge,
    DuplicateField,
    MissingField,
    UnexpectedField,
    ScalarDecode,
    NestedField,
}

impl DecodeErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DecodeErrorCode::SchemaDefinition => "STRICT_SCHEMA_DEFINITION",
            DecodeErrorCode::MalformedDocument => "STRICT_MALFORMED_DOCUMENT",
            DecodeErrorCode::DocumentTooLarge => "STRICT_DOCUMENT_TOO_LARGE",
            DecodeErrorCode::DuplicateField => "STRICT_DUPLICATE_FIELD",
            DecodeErrorCode::MissingField => "STRICT_MISSING_FIELD",
            DecodeErrorCode::UnexpectedField => "STRICT_UNEXPECTED_FIELD",
            DecodeErrorCode::ScalarDecode => "STRICT_SCALAR_DECODE",
            DecodeErrorCode::NestedField => "STRICT_NESTED_FIELD",
        }
    }
}

impl fmt::Display for DecodeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Why a strict decode failed.
///
/// Nested failures are wrapped in [`DecodeError::NestedField`] once per level,
/// so the chain names every key (and element index) from the root down.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The target type or schema is malformed
    #[error(transparent)]
    SchemaDefinition(#[from] SchemaDefinitionError),

    /// The bytes at this level are not a JSON object
    #[error("malformed JSON object: {cause}")]
    MalformedDocument {
        #[source]
        cause: serde_json::Error,
    },

    /// The document exceeds the decoder's size limit
    #[error("document is {actual} bytes, limit is {limit}")]
    DocumentTooLarge { limit: usize, actual: usize },

    /// The same key appears twice at one level
    #[error("field '{key}' appears more than once in JSON")]
    DuplicateField { key: String },

    /// A declared key is absent from the document
    #[error("field '{key}' is missing from JSON")]
    MissingField { key: String },

    /// The document has a key the schema does not declare
    #[error("unexpected field '{key}' found in JSON")]
    UnexpectedField { key: String },

    /// A leaf value does not match its declared scalar type
    #[error("field '{}': {cause}", segment(.key, .index))]
    ScalarDecode {
        key: String,
        index: Option<usize>,
        #[source]
        cause: serde_json::Error,
    },

    /// Any of the above, inside a nested record or a sequence element
    #[error("in field '{}': {cause}", segment(.key, .index))]
    NestedField {
        key: String,
        index: Option<usize>,
        #[source]
        cause: Box<DecodeError>,
    },
}

fn segment(key: &str, index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("{}[{}]", key, index),
        None => key.to_string(),
    }
}

impl DecodeError {
    pub(crate) fn malformed(cause: serde_json::Error) -> Self {
        Self::MalformedDocument { cause }
    }

    /// Wraps this error with the key (and element index) it occurred under.
    pub(crate) fn nested(self, key: impl Into<String>, index: Option<usize>) -> Self {
        Self::NestedField {
            key: key.into(),
            index,
            cause: Box::new(self),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DecodeErrorCode {
        match self {
            DecodeError::SchemaDefinition(_) => DecodeErrorCode::SchemaDefinition,
            DecodeError::MalformedDocument { .. } => DecodeErrorCode::MalformedDocument,
            DecodeError::DocumentTooLarge { .. } => DecodeErrorCode::DocumentTooLarge,
            DecodeError::DuplicateField { .. } => DecodeErrorCode::DuplicateField,
            DecodeError::MissingField { .. } => DecodeErrorCode::MissingField,
            DecodeError::UnexpectedField { .. } => DecodeErrorCode::UnexpectedField,
            DecodeError::ScalarDecode { .. } => DecodeErrorCode::ScalarDecode,
            DecodeError::NestedField { .. } => DecodeErrorCode::NestedField,
        }
    }

    /// Returns the severity level; nested errors take their cause's severity
    pub fn severity(&self) -> Severity {
        match self.root_cause() {
            DecodeError::SchemaDefinition(_) => Severity::Fatal,
            _ => Severity::Reject,
        }
    }

    /// Returns whether this is a fatal (schema) error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Unwraps every `NestedField` level
    pub fn root_cause(&self) -> &DecodeError {
        let mut current = self;
        while let DecodeError::NestedField { cause, .. } = current {
            current = cause;
        }
        current
    }

    /// Returns the key this error names at its own level, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodeError::DuplicateField { key }
            | DecodeError::MissingField { key }
            | DecodeError::UnexpectedField { key }
            | DecodeError::ScalarDecode { key, .. }
            | DecodeError::NestedField { key, .. } => Some(key),
            DecodeError::SchemaDefinition(_)
            | DecodeError::MalformedDocument { .. }
            | DecodeError::DocumentTooLarge { .. } => None,
        }
    }

    /// Path of the offending key from the document root,
    /// e.g. `slice_of_structs[0].struct_only_field`.
    ///
    /// Errors that concern a whole level rather than a key end at that level;
    /// an error at the root itself is `$root`.
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut current = self;

        loop {
            match current {
                DecodeError::NestedField { key, index, cause } => {
                    push_segment(&mut path, key, *index);
                    current = cause;
                }
                DecodeError::ScalarDecode { key, index, .. } => {
                    push_segment(&mut path, key, *index);
                    break;
                }
                DecodeError::DuplicateField { key }
                | DecodeError::MissingField { key }
                | DecodeError::UnexpectedField { key } => {
                    push_segment(&mut path, key, None);
                    break;
                }
                DecodeError::SchemaDefinition(_)
                | DecodeError::MalformedDocument { .. }
                | DecodeError::DocumentTooLarge { .. } => break,
            }
        }

        if path.is_empty() {
            "$root".to_string()
        } else {
            path
        }
    }
}

/// Appends a field path segment.
fn push_segment(path: &mut String, key: &str, index: Option<usize>) {
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(&segment(key, &index));
}
