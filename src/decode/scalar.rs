//! Tolerant scalar decoding
//!
//! Leaf values are handed to `serde_json` as-is. Strict decoding adds the
//! key-set guarantees on top and never second-guesses a leaf.

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

/// Decodes one raw leaf value into `T`.
pub fn decode_scalar<T: DeserializeOwned>(raw: &RawValue) -> Result<T, serde_json::Error> {
    serde_json::from_str(raw.get())
}

/// Registers `serde` types as scalar fields.
///
/// ```
/// use serde::Deserialize;
/// use strictjson::{impl_scalar, strict_record};
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// #[serde(rename_all = "lowercase")]
/// pub enum Status {
///     Open,
///     Closed,
/// }
///
/// impl_scalar!(Status);
///
/// strict_record! {
///     pub struct Ticket {
///         #[key = "status"]
///         pub status: Status,
///     }
/// }
///
/// let ticket: Ticket = strictjson::from_str(r#"{"status": "open"}"#).unwrap();
/// assert_eq!(ticket.status, Status::Open);
/// ```
#[macro_export]
macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::schema::FieldType for $ty {
                fn shape() -> $crate::schema::Shape {
                    $crate::schema::Shape::Scalar
                }

                fn from_field(
                    value: $crate::decode::FieldValue<'_>,
                ) -> ::std::result::Result<Self, $crate::decode::FieldError> {
                    match value {
                        $crate::decode::FieldValue::Scalar(raw) => {
                            $crate::decode::decode_scalar(raw).map_err(|cause| {
                                $crate::decode::FieldError::Scalar { index: None, cause }
                            })
                        }
                        _ => Err($crate::decode::FieldError::KindMismatch { read: "scalar" }),
                    }
                }
            }
        )*
    };
}

impl_scalar!(
    bool,
    char,
    String,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    serde_json::Value,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDate,
    uuid::Uuid,
);
