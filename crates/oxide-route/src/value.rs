//! Typed values bound from a request URI.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::types::{ParamType, ScalarType};

/// Format used when a date-time is written into a URI.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A parameter value bound from a URI.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value.
    Text(String),
    /// Decimal value.
    Decimal(Decimal),
    /// 64-bit float value.
    Double(f64),
    /// 32-bit float value.
    Float(f32),
    /// 16-bit integer value.
    Int16(i16),
    /// 32-bit integer value.
    Int32(i32),
    /// 64-bit integer value.
    Int64(i64),
    /// Unsigned 16-bit integer value.
    UInt16(u16),
    /// Unsigned 32-bit integer value.
    UInt32(u32),
    /// Unsigned 64-bit integer value.
    UInt64(u64),
    /// Byte value.
    Byte(u8),
    /// Boolean value.
    Bool(bool),
    /// Date-time value.
    DateTime(NaiveDateTime),
    /// Character value.
    Char(char),
    /// Ordered sequence of scalar values.
    List(Vec<Value>),
}

impl Value {
    /// Returns a short name for the kind of value, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Decimal(_) => "decimal",
            Self::Double(_) => "double",
            Self::Float(_) => "float",
            Self::Int16(_) => "short",
            Self::Int32(_) => "int",
            Self::Int64(_) => "long",
            Self::UInt16(_) => "ushort",
            Self::UInt32(_) => "uint",
            Self::UInt64(_) => "ulong",
            Self::Byte(_) => "byte",
            Self::Bool(_) => "bool",
            Self::DateTime(_) => "datetime",
            Self::Char(_) => "char",
            Self::List(_) => "list",
        }
    }

    /// Returns the scalar type of this value, or `None` for lists.
    #[must_use]
    pub const fn scalar_type(&self) -> Option<ScalarType> {
        let ty = match self {
            Self::Text(_) => ScalarType::Text,
            Self::Decimal(_) => ScalarType::Decimal,
            Self::Double(_) => ScalarType::Double,
            Self::Float(_) => ScalarType::Float,
            Self::Int16(_) => ScalarType::Int16,
            Self::Int32(_) => ScalarType::Int32,
            Self::Int64(_) => ScalarType::Int64,
            Self::UInt16(_) => ScalarType::UInt16,
            Self::UInt32(_) => ScalarType::UInt32,
            Self::UInt64(_) => ScalarType::UInt64,
            Self::Byte(_) => ScalarType::Byte,
            Self::Bool(_) => ScalarType::Boolean,
            Self::DateTime(_) => ScalarType::DateTime,
            Self::Char(_) => ScalarType::Char,
            Self::List(_) => return None,
        };
        Some(ty)
    }

    /// Returns true if this value can be bound to a parameter of `ty`.
    #[must_use]
    pub fn conforms_to(&self, ty: &ParamType) -> bool {
        match (self, ty) {
            (Self::List(items), ParamType::Sequence(element)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (_, ParamType::Scalar(scalar)) => self.scalar_type() == Some(*scalar),
            _ => false,
        }
    }

    /// Returns the text if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns any signed or unsigned integer that fits in an `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int16(n) => Some(i64::from(n)),
            Self::Int32(n) => Some(i64::from(n)),
            Self::Int64(n) => Some(n),
            Self::UInt16(n) => Some(i64::from(n)),
            Self::UInt32(n) => Some(i64::from(n)),
            Self::UInt64(n) => i64::try_from(n).ok(),
            Self::Byte(n) => Some(i64::from(n)),
            _ => None,
        }
    }

    /// Returns any non-negative integer as a `u64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::UInt64(n) => Some(n),
            _ => self.as_i64().and_then(|n| u64::try_from(n).ok()),
        }
    }

    /// Returns a floating point value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Double(f) => Some(f),
            Self::Float(f) => Some(f64::from(f)),
            _ => None,
        }
    }

    /// Returns the decimal if this is a decimal value.
    #[must_use]
    pub const fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the character if this is a character value.
    #[must_use]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the date-time if this is a date-time value.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the elements if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

/// Writes the textual form that the binder parses back. Lists are
/// `;`-joined without any escaping.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Double(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Int16(n) => write!(f, "{n}"),
            Self::Int32(n) => write!(f, "{n}"),
            Self::Int64(n) => write!(f, "{n}"),
            Self::UInt16(n) => write!(f, "{n}"),
            Self::UInt32(n) => write!(f, "{n}"),
            Self::UInt64(n) => write!(f, "{n}"),
            Self::Byte(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Self::Char(c) => write!(f, "{c}"),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(String::from(s))
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Float(n)
    }
}

impl From<i16> for Value {
    fn from(n: i16) -> Self {
        Self::Int16(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int64(n)
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Self::UInt16(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::UInt32(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::UInt64(n)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Self::Byte(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conforms_to() {
        let ids = Value::from(vec![1, 2, 3]);
        assert!(ids.conforms_to(&ParamType::sequence_of(ScalarType::Int32)));
        assert!(!ids.conforms_to(&ParamType::sequence_of(ScalarType::Int64)));
        assert!(!ids.conforms_to(&ScalarType::Int32.into()));
        assert!(Value::from("x").conforms_to(&ScalarType::Text.into()));
        assert!(!Value::from("x").conforms_to(&ParamType::custom("Widget")));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Byte(7).as_i64(), Some(7));
        assert_eq!(Value::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(Value::UInt64(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Value::Int32(-1).as_u64(), None);
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::from("a").as_str(), Some("a"));
        assert_eq!(Value::Bool(true).as_str(), None);
    }

    #[test]
    fn test_display() {
        let dt = NaiveDateTime::parse_from_str("2024-03-01T10:20:30", DATETIME_FORMAT).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-01T10:20:30");
        assert_eq!(Value::from(vec!['a', 'b']).to_string(), "a;b");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}
