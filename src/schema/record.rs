//! Compile-time record descriptors
//!
//! A record type describes itself through [`Record::describe`]: one
//! [`FieldSpec`] per field, each with an explicit key. The [`strict_record!`]
//! macro generates the descriptor and the assembly from a single declaration,
//! and refuses (at build time) any field without a `#[key = "..."]`.
//!
//! [`strict_record!`]: crate::strict_record

use std::any::TypeId;

use crate::decode::{DecodeResult, FieldError, FieldReader, FieldValue};

/// A record type that can be strictly decoded.
pub trait Record: Sized + 'static {
    /// Describes the record's fields in declaration order.
    fn describe() -> RecordDescriptor;

    /// Builds the value from a key-validated document level.
    ///
    /// Every declared field must be read exactly once through `fields`.
    fn assemble(fields: &mut FieldReader<'_>) -> DecodeResult<Self>;
}

/// A type that can appear as a field of a record.
pub trait FieldType: Sized {
    /// Structural shape of the type
    fn shape() -> Shape;

    /// Converts a dispatched field value into `Self`.
    fn from_field(value: FieldValue<'_>) -> Result<Self, FieldError>;
}

/// Field list of a record type
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl RecordDescriptor {
    pub fn new(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self { name, fields }
    }
}

/// One field of a record descriptor
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field identity in the host type
    pub name: &'static str,
    /// Declared serialization key
    pub key: &'static str,
    pub shape: Shape,
}

impl FieldSpec {
    /// Describes a field of type `T`.
    pub fn of<T: FieldType>(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            shape: T::shape(),
        }
    }
}

/// Structural shape of a field type, before introspection.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Scalar,
    Record(RecordRef),
    SequenceOfScalar,
    SequenceOfRecord(RecordRef),
    /// A sequence whose elements are themselves sequences
    NestedSequence,
}

/// Type-erased handle to a record type's descriptor
#[derive(Clone, Copy)]
pub struct RecordRef {
    type_id: fn() -> TypeId,
    describe: fn() -> RecordDescriptor,
}

impl RecordRef {
    pub fn of<R: Record>() -> Self {
        Self {
            type_id: TypeId::of::<R>,
            describe: R::describe,
        }
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn describe(&self) -> RecordDescriptor {
        (self.describe)()
    }
}

impl std::fmt::Debug for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RecordRef").field(&self.describe().name).finish()
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn shape() -> Shape {
        match T::shape() {
            Shape::Scalar => Shape::SequenceOfScalar,
            Shape::Record(record) => Shape::SequenceOfRecord(record),
            Shape::SequenceOfScalar | Shape::SequenceOfRecord(_) | Shape::NestedSequence => {
                Shape::NestedSequence
            }
        }
    }

    fn from_field(value: FieldValue<'_>) -> Result<Self, FieldError> {
        match value {
            FieldValue::SequenceOfScalar(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, raw)| T::from_field(FieldValue::Scalar(raw)).map_err(|e| e.at(index)))
                .collect(),
            FieldValue::SequenceOfRecord(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, input)| {
                    T::from_field(FieldValue::Record(input)).map_err(|e| e.at(index))
                })
                .collect(),
            FieldValue::Scalar(_) | FieldValue::Record(_) => {
                Err(FieldError::KindMismatch { read: "sequence" })
            }
        }
    }
}

/// Declares a struct together with its strict-decoding descriptor.
///
/// Every field must carry `#[key = "..."]`; a field without one does not
/// match the macro grammar and fails the build.
///
/// ```
/// use strictjson::strict_record;
///
/// strict_record! {
///     #[derive(Debug, PartialEq)]
///     pub struct Line {
///         #[key = "sku"]
///         pub sku: String,
///         #[key = "qty"]
///         pub quantity: u32,
///     }
/// }
///
/// let line: Line = strictjson::from_str(r#"{"sku": "A-1", "qty": 2}"#).unwrap();
/// assert_eq!(line.quantity, 2);
/// assert!(strictjson::from_str::<Line>(r#"{"sku": "A-1"}"#).is_err());
/// ```
#[macro_export]
macro_rules! strict_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                #[key = $key:literal]
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::schema::Record for $name {
            fn describe() -> $crate::schema::RecordDescriptor {
                $crate::schema::RecordDescriptor::new(
                    stringify!($name),
                    vec![
                        $( $crate::schema::FieldSpec::of::<$ty>(stringify!($field), $key), )*
                    ],
                )
            }

            fn assemble(
                fields: &mut $crate::decode::FieldReader<'_>,
            ) -> $crate::decode::DecodeResult<Self> {
                Ok(Self {
                    $( $field: fields.take::<$ty>($key)?, )*
                })
            }
        }

        $crate::impl_record_field!($name);
    };
}

/// Makes a hand-written [`Record`] usable as a field (nested or in a `Vec`).
#[macro_export]
macro_rules! impl_record_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::schema::FieldType for $ty {
                fn shape() -> $crate::schema::Shape {
                    $crate::schema::Shape::Record($crate::schema::RecordRef::of::<Self>())
                }

                fn from_field(
                    value: $crate::decode::FieldValue<'_>,
                ) -> ::std::result::Result<Self, $crate::decode::FieldError> {
                    $crate::decode::record_from_field::<Self>(value)
                }
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::strict_record! {
        #[derive(Debug)]
        struct Inner {
            #[key = "field_2"]
            field_2: i64,
        }
    }

    #[test]
    fn test_vec_shapes() {
        assert!(matches!(<Vec<i64>>::shape(), Shape::SequenceOfScalar));
        assert!(matches!(<Vec<Inner>>::shape(), Shape::SequenceOfRecord(_)));
        assert!(matches!(<Vec<Vec<i64>>>::shape(), Shape::NestedSequence));
        assert!(matches!(<Vec<Vec<Inner>>>::shape(), Shape::NestedSequence));
    }

    #[test]
    fn test_macro_descriptor() {
        let descriptor = Inner::describe();
        assert_eq!(descriptor.name, "Inner");
        assert_eq!(descriptor.fields.len(), 1);
        assert_eq!(descriptor.fields[0].name, "field_2");
        assert_eq!(descriptor.fields[0].key, "field_2");
        assert!(matches!(descriptor.fields[0].shape, Shape::Scalar));
    }

    #[test]
    fn test_record_ref_identity() {
        let record = RecordRef::of::<Inner>();
        assert_eq!(record.type_id(), TypeId::of::<Inner>());
        assert_eq!(record.describe().name, "Inner");
    }
}
