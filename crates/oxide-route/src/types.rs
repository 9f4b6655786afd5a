//! The registry of types that can be bound from a request URI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Scalar types eligible for URI binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 text.
    Text,
    /// Exact decimal number.
    Decimal,
    /// 64-bit float.
    Double,
    /// 32-bit float.
    Float,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Unsigned 8-bit integer.
    Byte,
    /// Boolean.
    Boolean,
    /// Date and time without an offset.
    DateTime,
    /// A single character.
    Char,
}

impl ScalarType {
    /// All scalar types, in registry order.
    pub const ALL: [Self; 14] = [
        Self::Text,
        Self::Decimal,
        Self::Double,
        Self::Float,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Byte,
        Self::Boolean,
        Self::DateTime,
        Self::Char,
    ];

    /// Returns the canonical type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Decimal => "decimal",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int16 => "short",
            Self::Int32 => "int",
            Self::Int64 => "long",
            Self::UInt16 => "ushort",
            Self::UInt32 => "uint",
            Self::UInt64 => "ulong",
            Self::Byte => "byte",
            Self::Boolean => "bool",
            Self::DateTime => "datetime",
            Self::Char => "char",
        }
    }

    /// Looks up a scalar type by name. Accepts the canonical names and the
    /// equivalent Rust primitive names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Self::Text,
            "decimal" => Self::Decimal,
            "double" | "f64" => Self::Double,
            "float" | "single" | "f32" => Self::Float,
            "short" | "int16" | "i16" => Self::Int16,
            "int" | "int32" | "i32" => Self::Int32,
            "long" | "int64" | "i64" => Self::Int64,
            "ushort" | "uint16" | "u16" => Self::UInt16,
            "uint" | "uint32" | "u32" => Self::UInt32,
            "ulong" | "uint64" | "u64" => Self::UInt64,
            "byte" | "u8" => Self::Byte,
            "bool" | "boolean" => Self::Boolean,
            "datetime" | "date" => Self::DateTime,
            "char" => Self::Char,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared type of a handler parameter.
///
/// Any type can be declared, but only scalars and sequences of scalars can
/// be bound from a URI. Everything else is only usable as the content
/// parameter, which is deserialized outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A single scalar value.
    Scalar(ScalarType),
    /// An ordered sequence of values, `;`-separated in the URI.
    Sequence(Box<ParamType>),
    /// A type the registry knows nothing about.
    Custom(String),
}

impl ParamType {
    /// Shorthand for a sequence of scalars.
    #[must_use]
    pub fn sequence_of(element: ScalarType) -> Self {
        Self::Sequence(Box::new(Self::Scalar(element)))
    }

    /// Shorthand for a custom type.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Returns true if values of this type can be bound from a URI.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Scalar(_) => true,
            Self::Sequence(element) => matches!(element.as_ref(), Self::Scalar(_)),
            Self::Custom(_) => false,
        }
    }

    /// Returns the scalar type if this is a scalar.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Returns the element scalar type if this is a sequence of scalars.
    #[must_use]
    pub fn element(&self) -> Option<ScalarType> {
        match self {
            Self::Sequence(element) => element.as_scalar(),
            _ => None,
        }
    }
}

impl From<ScalarType> for ParamType {
    fn from(scalar: ScalarType) -> Self {
        Self::Scalar(scalar)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Sequence(element) => write!(f, "list<{element}>"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

impl FromStr for ParamType {
    type Err = std::convert::Infallible;

    /// Parses a type name such as `int`, `list<string>` or `[u8]`.
    /// Unknown names parse as [`ParamType::Custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        let element = name
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
            .or_else(|| name.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')));
        if let Some(element) = element {
            let element: Self = element.parse()?;
            return Ok(Self::Sequence(Box::new(element)));
        }

        Ok(ScalarType::from_name(name).map_or_else(|| Self::Custom(name.to_string()), Self::Scalar))
    }
}

impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(name
            .parse::<Self>()
            .unwrap_or_else(|never| match never {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_are_valid() {
        for scalar in ScalarType::ALL {
            assert!(ParamType::Scalar(scalar).is_valid(), "{scalar}");
            assert!(ParamType::sequence_of(scalar).is_valid(), "list<{scalar}>");
        }
    }

    #[test]
    fn test_invalid_types() {
        assert!(!ParamType::custom("User").is_valid());
        assert!(!ParamType::Sequence(Box::new(ParamType::custom("User"))).is_valid());
        let nested = ParamType::Sequence(Box::new(ParamType::sequence_of(ScalarType::Int32)));
        assert!(!nested.is_valid());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("int".parse::<ParamType>().unwrap(), ScalarType::Int32.into());
        assert_eq!("u8".parse::<ParamType>().unwrap(), ScalarType::Byte.into());
        assert_eq!("Boolean".parse::<ParamType>().unwrap(), ScalarType::Boolean.into());
        assert_eq!(
            "list<string>".parse::<ParamType>().unwrap(),
            ParamType::sequence_of(ScalarType::Text)
        );
        assert_eq!(
            "[char]".parse::<ParamType>().unwrap(),
            ParamType::sequence_of(ScalarType::Char)
        );
        assert_eq!(
            "Widget".parse::<ParamType>().unwrap(),
            ParamType::custom("Widget")
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let ty = ParamType::sequence_of(ScalarType::UInt64);
        assert_eq!(ty.to_string(), "list<ulong>");
        assert_eq!(ty.to_string().parse::<ParamType>().unwrap(), ty);
    }

    #[test]
    fn test_deserialize() {
        let ty: ParamType = serde_json::from_str("\"list<long>\"").unwrap();
        assert_eq!(ty.element(), Some(ScalarType::Int64));
    }
}
