//! Driver value conversions for mapped fields.
//!
//! # Responsibility
//! - Convert between `rusqlite::types::Value` and declared field types.
//! - Report unrepresentable conversions instead of coercing lossily.

use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Conversion failure between a driver value and a declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoerceError {
    /// The entity does not declare the requested field.
    UnknownField(String),
    /// The driver value cannot represent the declared field type.
    Incompatible {
        expected: &'static str,
        found: &'static str,
    },
}

impl Display for CoerceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(field) => write!(f, "unknown mapped field `{field}`"),
            Self::Incompatible { expected, found } => {
                write!(f, "cannot coerce {found} value into {expected} field")
            }
        }
    }
}

impl Error for CoerceError {}

/// Conversion into the driver value representation.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Conversion out of the driver value representation.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, CoerceError>;
}

fn incompatible(expected: &'static str, value: &Value) -> CoerceError {
    CoerceError::Incompatible {
        expected,
        found: value_type_name(value),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Integer(_) => "INTEGER",
        Value::Real(_) => "REAL",
        Value::Text(_) => "TEXT",
        Value::Blob(_) => "BLOB",
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        Ok(value)
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Integer(n) => Ok(n),
            other => Err(incompatible("i64", &other)),
        }
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Integer(n) => {
                i32::try_from(n).map_err(|_| incompatible("i32", &Value::Integer(n)))
            }
            other => Err(incompatible("i32", &other)),
        }
    }
}

impl ToValue for u32 {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Integer(n) => {
                u32::try_from(n).map_err(|_| incompatible("u32", &Value::Integer(n)))
            }
            other => Err(incompatible("u32", &other)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Real(x) => Ok(x),
            // SQLite numeric affinity stores whole numbers as integers.
            Value::Integer(n) => Ok(n as f64),
            other => Err(incompatible("f64", &other)),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            other => Err(incompatible("bool", &other)),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(incompatible("String", &other)),
        }
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Blob(bytes) => Ok(bytes),
            other => Err(incompatible("Vec<u8>", &other)),
        }
    }
}

impl ToValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Text(text) => {
                Uuid::parse_str(&text).map_err(|_| incompatible("Uuid", &Value::Text(text)))
            }
            other => Err(incompatible("Uuid", &other)),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoerceError, FromValue, ToValue};
    use rusqlite::types::Value;
    use uuid::Uuid;

    #[test]
    fn integer_round_trip() {
        assert_eq!(i64::from_value(7_i64.to_value()), Ok(7));
        assert_eq!(i32::from_value(Value::Integer(-3)), Ok(-3));
        assert!(matches!(
            u32::from_value(Value::Integer(-1)),
            Err(CoerceError::Incompatible { expected: "u32", .. })
        ));
    }

    #[test]
    fn text_into_numeric_is_rejected() {
        let err = i64::from_value(Value::Text("12".to_string())).unwrap_err();
        assert!(matches!(
            err,
            CoerceError::Incompatible {
                expected: "i64",
                found: "TEXT"
            }
        ));
    }

    #[test]
    fn real_accepts_integer_affinity() {
        assert_eq!(f64::from_value(Value::Integer(4)), Ok(4.0));
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(
            Option::<String>::from_value(Value::Text("x".to_string())),
            Ok(Some("x".to_string()))
        );
    }

    #[test]
    fn uuid_round_trips_as_text() {
        let id = Uuid::new_v4();
        assert_eq!(Uuid::from_value(id.to_value()), Ok(id));
        assert!(Uuid::from_value(Value::Text("not-a-uuid".to_string())).is_err());
    }

    #[test]
    fn bool_accepts_only_zero_and_one() {
        assert_eq!(bool::from_value(Value::Integer(1)), Ok(true));
        assert!(bool::from_value(Value::Integer(2)).is_err());
    }
}
