use super::errors::{ParseError, ParseResult};
use super::types::PrimitiveType;
/// Validation utilities for ROS1 message parsing
use regex::Regex;
use std::sync::LazyLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Constants for the ROS1 message format
#[allow(missing_docs)]
pub const PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR: &str = "/";
#[allow(missing_docs)]
pub const COMMENT_DELIMITER: char = '#';
#[allow(missing_docs)]
pub const CONSTANT_SEPARATOR: char = '=';
#[allow(missing_docs)]
pub const SERVICE_REQUEST_RESPONSE_SEPARATOR: &str = "---";
#[allow(missing_docs)]
pub const SERVICE_REQUEST_MESSAGE_SUFFIX: &str = "Request";
#[allow(missing_docs)]
pub const SERVICE_RESPONSE_MESSAGE_SUFFIX: &str = "Response";
#[allow(missing_docs)]
pub const HEADER_PACKAGE: &str = "std_msgs";
#[allow(missing_docs)]
pub const HEADER_TYPE: &str = "Header";

/// Definition of `std_msgs/Header` used when no search path provides one
pub const HEADER_DEFINITION: &str = "uint32 seq\ntime stamp\nstring frame_id";

// Regex patterns for validation
static VALID_PACKAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap());

static VALID_MESSAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap());

static VALID_FIELD_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap());

static VALID_CONSTANT_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap());

static INTEGER_LITERAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

/// Validate a package name
pub fn is_valid_package_name(name: &str) -> bool {
    VALID_PACKAGE_NAME_PATTERN.is_match(name)
}

/// Validate a message name
pub fn is_valid_message_name(name: &str) -> bool {
    VALID_MESSAGE_NAME_PATTERN.is_match(name)
}

/// Validate a field name
pub fn is_valid_field_name(name: &str) -> bool {
    VALID_FIELD_NAME_PATTERN.is_match(name)
}

/// Validate a constant name
pub fn is_valid_constant_name(name: &str) -> bool {
    VALID_CONSTANT_NAME_PATTERN.is_match(name)
}

/// A parsed constant value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum PrimitiveValue {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl std::fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveValue::Bool(v) => write!(f, "{v}"),
            PrimitiveValue::Int8(v) => write!(f, "{v}"),
            PrimitiveValue::UInt8(v) => write!(f, "{v}"),
            PrimitiveValue::Int16(v) => write!(f, "{v}"),
            PrimitiveValue::UInt16(v) => write!(f, "{v}"),
            PrimitiveValue::Int32(v) => write!(f, "{v}"),
            PrimitiveValue::UInt32(v) => write!(f, "{v}"),
            PrimitiveValue::Int64(v) => write!(f, "{v}"),
            PrimitiveValue::UInt64(v) => write!(f, "{v}"),
            PrimitiveValue::Float32(v) => write!(f, "{v}"),
            PrimitiveValue::Float64(v) => write!(f, "{v}"),
            PrimitiveValue::String(v) => write!(f, "{v}"),
        }
    }
}

fn parse_integer(value_string: &str, primitive_type: PrimitiveType) -> ParseResult<i128> {
    if !INTEGER_LITERAL_PATTERN.is_match(value_string) {
        return Err(ParseError::invalid_value(
            value_string,
            primitive_type.name(),
            "must be a decimal integer",
        ));
    }
    value_string
        .parse::<i128>()
        .map_err(|_| ParseError::invalid_value(value_string, primitive_type.name(), "value out of range"))
}

fn convert_integer<T: TryFrom<i128>>(
    value_string: &str,
    primitive_type: PrimitiveType,
) -> ParseResult<T> {
    let wide = parse_integer(value_string, primitive_type)?;
    T::try_from(wide)
        .map_err(|_| ParseError::invalid_value(value_string, primitive_type.name(), "value out of range"))
}

/// Parse a constant value for a builtin type
///
/// Integers are decimal and range-checked, `byte` is signed and `char`
/// unsigned. Booleans accept `true`/`false`/`1`/`0` in any case. String
/// values are taken verbatim.
///
/// # Errors
///
/// Returns an error if:
/// - The type is `time` or `duration`
/// - The value string cannot be parsed for the specified type
/// - The value is out of range for the integer type
pub fn parse_primitive_value_string(
    primitive_type: PrimitiveType,
    value_string: &str,
) -> ParseResult<PrimitiveValue> {
    match primitive_type {
        PrimitiveType::Bool => match value_string.to_lowercase().as_str() {
            "true" | "1" => Ok(PrimitiveValue::Bool(true)),
            "false" | "0" => Ok(PrimitiveValue::Bool(false)),
            _ => Err(ParseError::invalid_value(
                value_string,
                primitive_type.name(),
                "must be either 'true' / '1' or 'false' / '0'",
            )),
        },
        PrimitiveType::Int8 | PrimitiveType::Byte => {
            convert_integer(value_string, primitive_type).map(PrimitiveValue::Int8)
        }
        PrimitiveType::UInt8 | PrimitiveType::Char => {
            convert_integer(value_string, primitive_type).map(PrimitiveValue::UInt8)
        }
        PrimitiveType::Int16 => {
            convert_integer(value_string, primitive_type).map(PrimitiveValue::Int16)
        }
        PrimitiveType::UInt16 => {
            convert_integer(value_string, primitive_type).map(PrimitiveValue::UInt16)
        }
        PrimitiveType::Int32 => {
            convert_integer(value_string, primitive_type).map(PrimitiveValue::Int32)
        }
        PrimitiveType::UInt32 => {
            convert_integer(value_string, primitive_type).map(PrimitiveValue::UInt32)
        }
        PrimitiveType::Int64 => {
            convert_integer(value_string, primitive_type).map(PrimitiveValue::Int64)
        }
        PrimitiveType::UInt64 => {
            convert_integer(value_string, primitive_type).map(PrimitiveValue::UInt64)
        }
        PrimitiveType::Float32 => value_string
            .parse::<f32>()
            .map(PrimitiveValue::Float32)
            .map_err(|_| ParseError::invalid_value(value_string, primitive_type.name(), "must be a valid float")),
        PrimitiveType::Float64 => value_string
            .parse::<f64>()
            .map(PrimitiveValue::Float64)
            .map_err(|_| ParseError::invalid_value(value_string, primitive_type.name(), "must be a valid float")),
        PrimitiveType::String => Ok(PrimitiveValue::String(value_string.to_string())),
        PrimitiveType::Time | PrimitiveType::Duration => Err(ParseError::invalid_value(
            value_string,
            primitive_type.name(),
            "time and duration constants are not supported",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(is_valid_package_name("std_msgs"));
        assert!(is_valid_package_name("rosjava_bootstrap"));
        assert!(!is_valid_package_name("_private"));
        assert!(!is_valid_package_name("bad-name"));

        assert!(is_valid_message_name("Header"));
        assert!(is_valid_message_name("imageInfo"));
        assert!(!is_valid_message_name("9Lives"));

        assert!(is_valid_field_name("frame_id"));
        assert!(is_valid_field_name("mixedCase"));
        assert!(!is_valid_field_name("with space"));

        assert!(is_valid_constant_name("MAX_SIZE"));
        assert!(is_valid_constant_name("lowercase_ok"));
    }

    #[test]
    fn test_integer_ranges() {
        use PrimitiveType as P;
        assert_eq!(
            parse_primitive_value_string(P::Byte, "-128").unwrap(),
            PrimitiveValue::Int8(-128)
        );
        assert!(parse_primitive_value_string(P::Byte, "200").is_err());
        assert_eq!(
            parse_primitive_value_string(P::Char, "200").unwrap(),
            PrimitiveValue::UInt8(200)
        );
        assert!(parse_primitive_value_string(P::Char, "-1").is_err());
        assert_eq!(
            parse_primitive_value_string(P::UInt32, "4294967295").unwrap(),
            PrimitiveValue::UInt32(u32::MAX)
        );
        assert!(parse_primitive_value_string(P::UInt32, "4294967296").is_err());
        assert_eq!(
            parse_primitive_value_string(P::UInt64, "18446744073709551615").unwrap(),
            PrimitiveValue::UInt64(u64::MAX)
        );
        assert_eq!(
            parse_primitive_value_string(P::Int64, "-9223372036854775808").unwrap(),
            PrimitiveValue::Int64(i64::MIN)
        );
        assert!(parse_primitive_value_string(P::Int32, "0x10").is_err());
        assert!(parse_primitive_value_string(P::Int32, "1.5").is_err());
    }

    #[test]
    fn test_bool_and_float_values() {
        use PrimitiveType as P;
        assert_eq!(
            parse_primitive_value_string(P::Bool, "True").unwrap(),
            PrimitiveValue::Bool(true)
        );
        assert_eq!(
            parse_primitive_value_string(P::Bool, "0").unwrap(),
            PrimitiveValue::Bool(false)
        );
        assert!(parse_primitive_value_string(P::Bool, "yes").is_err());

        assert_eq!(
            parse_primitive_value_string(P::Float64, "1e3").unwrap(),
            PrimitiveValue::Float64(1000.0)
        );
        assert!(matches!(
            parse_primitive_value_string(P::Float32, "inf").unwrap(),
            PrimitiveValue::Float32(v) if v.is_infinite()
        ));
        assert!(parse_primitive_value_string(P::Float32, "abc").is_err());
    }

    #[test]
    fn test_string_and_time_values() {
        use PrimitiveType as P;
        assert_eq!(
            parse_primitive_value_string(P::String, "a # not a comment").unwrap(),
            PrimitiveValue::String("a # not a comment".into())
        );
        assert!(parse_primitive_value_string(P::Time, "0").is_err());
        assert!(parse_primitive_value_string(P::Duration, "0").is_err());
    }

    #[test]
    fn test_primitive_value_display() {
        assert_eq!(PrimitiveValue::Int32(-4).to_string(), "-4");
        assert_eq!(PrimitiveValue::Bool(true).to_string(), "true");
        assert_eq!(PrimitiveValue::String("hi".into()).to_string(), "hi");
    }
}
