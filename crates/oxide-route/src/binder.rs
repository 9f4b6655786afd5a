//! Conversion of captured URI text into typed values.
//!
//! Scalars are parsed by a small registry of pure parsers keyed by
//! [`ScalarType`]. Sequences split the captured text on `;` and parse each
//! token with the element parser. Text elements of a sequence are
//! percent-decoded first, so an element may contain an escaped `;` or `/`.
//! Scalar text is never split or decoded.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rust_decimal::Decimal;
use tracing::warn;

use crate::descriptor::Parameter;
use crate::error::BindError;
use crate::template::UriTemplate;
use crate::types::{ParamType, ScalarType};
use crate::value::{Value, DATETIME_FORMAT};

/// Separator between the elements of a multi-valued parameter.
pub const SEQUENCE_SEPARATOR: char = ';';

/// Characters escaped in text sequence elements: everything except the
/// RFC 3986 unreserved set.
const ELEMENT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Naive date-time layouts accepted after RFC 3339.
const DATETIME_LAYOUTS: [&str; 3] = [DATETIME_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A pure conversion from captured text to a value.
pub type ScalarParser = fn(&str) -> Result<Value, String>;

/// Returns the parser registered for a scalar type.
#[must_use]
pub fn parser_for(ty: ScalarType) -> ScalarParser {
    match ty {
        ScalarType::Text => |raw: &str| Ok(Value::Text(raw.to_string())),
        ScalarType::Decimal => |raw: &str| parse_number::<Decimal>(raw).map(Value::Decimal),
        ScalarType::Double => |raw: &str| parse_number::<f64>(raw).map(Value::Double),
        ScalarType::Float => |raw: &str| parse_number::<f32>(raw).map(Value::Float),
        ScalarType::Int16 => |raw: &str| parse_number::<i16>(raw).map(Value::Int16),
        ScalarType::Int32 => |raw: &str| parse_number::<i32>(raw).map(Value::Int32),
        ScalarType::Int64 => |raw: &str| parse_number::<i64>(raw).map(Value::Int64),
        ScalarType::UInt16 => |raw: &str| parse_number::<u16>(raw).map(Value::UInt16),
        ScalarType::UInt32 => |raw: &str| parse_number::<u32>(raw).map(Value::UInt32),
        ScalarType::UInt64 => |raw: &str| parse_number::<u64>(raw).map(Value::UInt64),
        ScalarType::Byte => |raw: &str| parse_number::<u8>(raw).map(Value::Byte),
        ScalarType::Boolean => parse_bool,
        ScalarType::DateTime => parse_datetime,
        ScalarType::Char => parse_char,
    }
}

/// Converts the raw text captured for one parameter.
pub fn bind(name: &str, ty: &ParamType, raw: &str) -> Result<Value, BindError> {
    let conversion = |reason: String| BindError::Conversion {
        name: name.to_string(),
        ty: ty.clone(),
        raw: raw.to_string(),
        reason,
    };

    let result = match ty {
        ParamType::Scalar(scalar) => parser_for(*scalar)(raw),
        ParamType::Sequence(_) => match ty.element() {
            Some(element) => bind_sequence(element, raw),
            None => Err(format!("{ty} cannot be bound from a URI")),
        },
        ParamType::Custom(_) => Err(format!("{ty} cannot be bound from a URI")),
    };

    result.map_err(|reason| {
        warn!(parameter = name, %ty, raw, %reason, "parameter binding failed");
        conversion(reason)
    })
}

/// Runs the extractor against a URI and binds every path parameter, in
/// declaration order.
pub fn extract(
    template: &UriTemplate,
    parameters: &[Parameter],
    uri: &str,
) -> Result<Vec<Value>, BindError> {
    let raw = template.captures(uri).ok_or_else(|| BindError::NoMatch {
        uri: uri.to_string(),
        template: template.as_str().to_string(),
    })?;

    parameters
        .iter()
        .map(|param| {
            let text = raw.get(&param.name).ok_or_else(|| BindError::NoMatch {
                uri: uri.to_string(),
                template: template.as_str().to_string(),
            })?;
            bind(&param.name, &param.ty, text)
        })
        .collect()
}

/// Writes values into a template, the inverse of [`extract`].
///
/// Values are checked against the declared types. Sequences are joined
/// with `;` and their text elements are percent-encoded.
pub fn expand(
    template: &UriTemplate,
    parameters: &[Parameter],
    values: &[Value],
) -> Result<String, BindError> {
    if parameters.len() != values.len() {
        return Err(BindError::ValueCount {
            expected: parameters.len(),
            actual: values.len(),
        });
    }

    let mut segments = HashMap::with_capacity(parameters.len());
    for (param, value) in parameters.iter().zip(values) {
        segments.insert(param.name.clone(), encode(param, value)?);
    }

    template
        .reverse(&segments)
        .ok_or_else(|| BindError::Unrepresentable {
            name: template.as_str().to_string(),
            reason: "template has a placeholder with no parameter".to_string(),
        })
}

fn encode(param: &Parameter, value: &Value) -> Result<String, BindError> {
    if !value.conforms_to(&param.ty) {
        return Err(BindError::ValueType {
            name: param.name.clone(),
            expected: param.ty.clone(),
            actual: value.kind(),
        });
    }

    let unrepresentable = |reason: &str| BindError::Unrepresentable {
        name: param.name.clone(),
        reason: reason.to_string(),
    };

    let text = match value {
        Value::List(items) => {
            let mut elements = Vec::with_capacity(items.len());
            for item in items {
                let element = match item {
                    Value::Text(s) => utf8_percent_encode(s, ELEMENT_ESCAPE).to_string(),
                    other => other.to_string(),
                };
                if !matches!(item, Value::Text(_)) && element.contains(SEQUENCE_SEPARATOR) {
                    return Err(unrepresentable("element contains the ';' separator"));
                }
                elements.push(element);
            }
            elements.join(";")
        }
        scalar => scalar.to_string(),
    };

    if text.is_empty() {
        return Err(unrepresentable("empty value"));
    }
    if text.contains(|c: char| c == '/' || c == '?' || c == '#') {
        return Err(unrepresentable("value contains '/', '?' or '#'"));
    }

    Ok(text)
}

fn bind_sequence(element: ScalarType, raw: &str) -> Result<Value, String> {
    let parse = parser_for(element);

    raw.split(SEQUENCE_SEPARATOR)
        .map(|token| {
            let token = if element == ScalarType::Text {
                percent_decode_str(token)
                    .decode_utf8()
                    .map_err(|e| format!("element '{token}' is not valid UTF-8: {e}"))?
            } else {
                Cow::Borrowed(token)
            };
            parse(&token)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn parse_number<T>(raw: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| e.to_string())
}

fn parse_bool(raw: &str) -> Result<Value, String> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err("expected 'true' or 'false'".to_string())
    }
}

fn parse_datetime(raw: &str) -> Result<Value, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Value::DateTime(dt.naive_utc()));
    }

    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return Ok(Value::DateTime(dt));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Value::DateTime)
        .ok_or_else(|| "expected an ISO 8601 date or date-time".to_string())
}

fn parse_char(raw: &str) -> Result<Value, String> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Char(c)),
        _ => Err("expected exactly one character".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(ty: ScalarType, raw: &str) -> Result<Value, BindError> {
        bind("p", &ty.into(), raw)
    }

    #[test]
    fn test_integers() {
        assert_eq!(scalar(ScalarType::Int32, "42").unwrap(), Value::Int32(42));
        assert_eq!(scalar(ScalarType::Int16, "-7").unwrap(), Value::Int16(-7));
        assert_eq!(
            scalar(ScalarType::UInt64, "18446744073709551615").unwrap(),
            Value::UInt64(u64::MAX)
        );
        assert!(scalar(ScalarType::Byte, "256").is_err());
        assert!(scalar(ScalarType::UInt32, "-1").is_err());
        assert!(scalar(ScalarType::Int32, "0x10").is_err());
        assert!(scalar(ScalarType::Int64, "abc").is_err());
    }

    #[test]
    fn test_floats_and_decimals() {
        assert_eq!(scalar(ScalarType::Double, "2.5").unwrap(), Value::Double(2.5));
        assert_eq!(scalar(ScalarType::Float, "-0.25").unwrap(), Value::Float(-0.25));
        assert_eq!(
            scalar(ScalarType::Decimal, "19.99").unwrap(),
            Value::Decimal(Decimal::new(1999, 2))
        );
        assert!(scalar(ScalarType::Decimal, "1,5").is_err());
    }

    #[test]
    fn test_bool() {
        assert_eq!(scalar(ScalarType::Boolean, "True").unwrap(), Value::Bool(true));
        assert_eq!(scalar(ScalarType::Boolean, "false").unwrap(), Value::Bool(false));
        assert!(scalar(ScalarType::Boolean, "1").is_err());
    }

    #[test]
    fn test_datetime() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap();
        for raw in [
            "2024-03-01T10:20:30",
            "2024-03-01 10:20:30",
            "2024-03-01T12:20:30+02:00",
            "2024-03-01T10:20:30Z",
        ] {
            assert_eq!(
                scalar(ScalarType::DateTime, raw).unwrap(),
                Value::DateTime(expected),
                "{raw}"
            );
        }

        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            scalar(ScalarType::DateTime, "2024-03-01").unwrap(),
            Value::DateTime(midnight)
        );
        assert!(scalar(ScalarType::DateTime, "2024-13-01").is_err());
    }

    #[test]
    fn test_char() {
        assert_eq!(scalar(ScalarType::Char, "x").unwrap(), Value::Char('x'));
        assert_eq!(scalar(ScalarType::Char, "é").unwrap(), Value::Char('é'));
        assert!(scalar(ScalarType::Char, "xy").is_err());
    }

    #[test]
    fn test_text_scalar_is_not_split_or_decoded() {
        assert_eq!(
            scalar(ScalarType::Text, "a;b%2Fc").unwrap(),
            Value::Text("a;b%2Fc".to_string())
        );
    }

    #[test]
    fn test_sequences() {
        let ints = ParamType::sequence_of(ScalarType::Int32);
        assert_eq!(bind("ids", &ints, "1;2;3").unwrap(), Value::from(vec![1, 2, 3]));
        assert_eq!(bind("ids", &ints, "5").unwrap(), Value::from(vec![5]));
        assert!(bind("ids", &ints, "1;;3").is_err());

        let flags = ParamType::sequence_of(ScalarType::Boolean);
        assert_eq!(
            bind("flags", &flags, "true;FALSE").unwrap(),
            Value::from(vec![true, false])
        );

        let chars = ParamType::sequence_of(ScalarType::Char);
        assert_eq!(bind("c", &chars, "a;b").unwrap(), Value::from(vec!['a', 'b']));
    }

    #[test]
    fn test_text_sequence_is_percent_decoded() {
        let tags = ParamType::sequence_of(ScalarType::Text);
        assert_eq!(
            bind("tags", &tags, "a%2Fb;c%3Bd;").unwrap(),
            Value::from(vec!["a/b", "c;d", ""])
        );
        assert!(bind("tags", &tags, "%FF").is_err());
    }

    #[test]
    fn test_conversion_error_details() {
        let err = scalar(ScalarType::Int32, "abc").unwrap_err();
        assert!(err.is_bad_request());
        match err {
            BindError::Conversion { name, ty, raw, .. } => {
                assert_eq!(name, "p");
                assert_eq!(ty, ParamType::Scalar(ScalarType::Int32));
                assert_eq!(raw, "abc");
            }
            other => panic!("Expected conversion error, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_type_is_rejected() {
        assert!(bind("w", &ParamType::custom("Widget"), "1").is_err());
    }
}
