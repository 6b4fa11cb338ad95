//! Conversions between Rust field types and [`FieldValue`].
//!
//! Reads are lenient in the same way SQLite's column affinity is: a number
//! stored in a `TEXT` column parses back into a numeric field, and a number
//! read into a `String` field takes its string form.

use crate::error::ValueError;
use crate::value::FieldValue;

/// Converts an entity field into the value stored for it.
///
/// Returns `None` when the field is null, which omits its column from the
/// row entirely.
pub trait ToFieldValue {
    /// Returns the stored form of this field, or `None` if it is null.
    fn to_field_value(&self) -> Option<FieldValue>;
}

/// Converts a stored value back into an entity field type.
pub trait FromFieldValue: Sized {
    /// Converts `value`, failing if it cannot represent `Self`.
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError>;

    /// The field value a null column reads as, or `None` if `Self` has no
    /// null form and the field should keep its current value.
    fn from_null() -> Option<Self> {
        None
    }
}

impl ToFieldValue for FieldValue {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(self.clone())
    }
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Text(self.clone()))
    }
}

impl ToFieldValue for &str {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Text((*self).to_string()))
    }
}

impl ToFieldValue for bool {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Integer(i64::from(*self)))
    }
}

impl ToFieldValue for f64 {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Real(*self))
    }
}

impl ToFieldValue for f32 {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Real(f64::from(*self)))
    }
}

impl ToFieldValue for Vec<u8> {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Blob(self.clone()))
    }
}

impl<V: ToFieldValue> ToFieldValue for Option<V> {
    fn to_field_value(&self) -> Option<FieldValue> {
        self.as_ref().and_then(ToFieldValue::to_field_value)
    }
}

macro_rules! integer_conversions {
    ($($ty:ty),*) => {
        $(
            impl ToFieldValue for $ty {
                fn to_field_value(&self) -> Option<FieldValue> {
                    Some(FieldValue::Integer(i64::from(*self)))
                }
            }

            impl FromFieldValue for $ty {
                fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
                    let wide = i64::from_field_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| ValueError::OutOfRange {
                        value: wide.to_string(),
                        target: stringify!($ty),
                    })
                }
            }
        )*
    };
}

integer_conversions!(i8, i16, i32, u8, u16, u32);

impl ToFieldValue for i64 {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Integer(*self))
    }
}

impl FromFieldValue for i64 {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        match value {
            FieldValue::Integer(i) => Ok(i),
            FieldValue::Real(r) if r.fract() == 0.0 => {
                if r >= i64::MIN as f64 && r < i64::MAX as f64 {
                    Ok(r as i64)
                } else {
                    Err(ValueError::OutOfRange {
                        value: r.to_string(),
                        target: "i64",
                    })
                }
            }
            FieldValue::Text(text) => text.trim().parse().map_err(|_| ValueError::Parse {
                text,
                target: "i64",
            }),
            other => Err(ValueError::TypeMismatch {
                expected: "integer",
                found: other.kind(),
            }),
        }
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        match value {
            FieldValue::Real(r) => Ok(r),
            FieldValue::Integer(i) => Ok(i as f64),
            FieldValue::Text(text) => text.trim().parse().map_err(|_| ValueError::Parse {
                text,
                target: "f64",
            }),
            other => Err(ValueError::TypeMismatch {
                expected: "real",
                found: other.kind(),
            }),
        }
    }
}

impl FromFieldValue for f32 {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        f64::from_field_value(value).map(|r| r as f32)
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        match value {
            FieldValue::Integer(i) => Ok(i != 0),
            FieldValue::Text(text) => match text.trim() {
                "1" | "true" => Ok(true),
                "0" | "false" => Ok(false),
                _ => Err(ValueError::Parse {
                    text,
                    target: "bool",
                }),
            },
            other => Err(ValueError::TypeMismatch {
                expected: "integer",
                found: other.kind(),
            }),
        }
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        match value {
            FieldValue::Text(s) => Ok(s),
            FieldValue::Blob(_) => Err(ValueError::TypeMismatch {
                expected: "text",
                found: "blob",
            }),
            other => Ok(other.to_string()),
        }
    }
}

impl FromFieldValue for Vec<u8> {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        match value {
            FieldValue::Blob(bytes) => Ok(bytes),
            FieldValue::Text(s) => Ok(s.into_bytes()),
            other => Err(ValueError::TypeMismatch {
                expected: "blob",
                found: other.kind(),
            }),
        }
    }
}

impl FromFieldValue for FieldValue {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl<V: FromFieldValue> FromFieldValue for Option<V> {
    fn from_field_value(value: FieldValue) -> Result<Self, ValueError> {
        V::from_field_value(value).map(Some)
    }

    fn from_null() -> Option<Self> {
        Some(None)
    }
}
