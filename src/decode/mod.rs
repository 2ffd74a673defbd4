//! Strict decode subsystem
//!
//! Decoding succeeds only when the document's keys and the schema's declared
//! keys are exactly equal, at every level.
//!
//! # Design Principles
//!
//! - Missing keys and undeclared keys both abort
//! - Duplicate keys abort
//! - No coercion beyond the scalar decoder, no defaults
//! - First error wins; no partial results
//! - Deterministic error reporting

mod decoder;
mod errors;
mod raw;
mod scalar;
mod validator;

pub use decoder::{
    record_from_field, FieldError, FieldReader, FieldValue, RecordInput, StrictDecoder,
    DEFAULT_MAX_DOCUMENT_BYTES,
};
pub use errors::{DecodeError, DecodeErrorCode, DecodeResult, Severity};
pub use raw::RawDocument;
pub use scalar::decode_scalar;
pub use validator::{validate, validate_keys};
