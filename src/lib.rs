//! strictjson - strict, bidirectional JSON decoding
//!
//! A document decodes into a record type only when its keys and the record's
//! declared keys are exactly equal, at every level of nesting and for every
//! element of every sequence of records. A missing key, an extra key, or a
//! repeated key aborts the whole decode with an error naming the key.
//!
//! ```
//! use strictjson::{strict_record, DecodeError};
//!
//! strict_record! {
//!     #[derive(Debug)]
//!     pub struct Line {
//!         #[key = "sku"]
//!         pub sku: String,
//!     }
//! }
//!
//! strict_record! {
//!     #[derive(Debug)]
//!     pub struct Order {
//!         #[key = "order_id"]
//!         pub order_id: u64,
//!         #[key = "lines"]
//!         pub lines: Vec<Line>,
//!     }
//! }
//!
//! let order: Order =
//!     strictjson::from_str(r#"{"order_id": 7, "lines": [{"sku": "A-1"}]}"#).unwrap();
//! assert_eq!(order.lines[0].sku, "A-1");
//!
//! let err = strictjson::from_str::<Order>(r#"{"order_id": 7, "lines": [{}]}"#).unwrap_err();
//! assert!(matches!(err.root_cause(), DecodeError::MissingField { key } if key == "sku"));
//! assert_eq!(err.path(), "lines[0].sku");
//! ```

pub mod cli;
pub mod decode;
pub mod schema;
pub mod transport;

pub use decode::{DecodeError, DecodeErrorCode, DecodeResult, Severity, StrictDecoder};
pub use schema::{FieldType, Record, Schema, SchemaDefinitionError, SchemaResult};

/// Strictly decodes `bytes` into `T` with the default decoder.
pub fn from_slice<T: Record>(bytes: &[u8]) -> DecodeResult<T> {
    StrictDecoder::default().decode(bytes)
}

/// Strictly decodes `text` into `T` with the default decoder.
pub fn from_str<T: Record>(text: &str) -> DecodeResult<T> {
    from_slice(text.as_bytes())
}
