/// Core types for ROS1 message parsing
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::errors::{ParseError, ParseResult};
use crate::msg::validation::{
    HEADER_PACKAGE, HEADER_TYPE, PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR, PrimitiveValue,
    is_valid_constant_name, is_valid_field_name, is_valid_message_name, is_valid_package_name,
    parse_primitive_value_string,
};

/// Builtin ROS1 types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum PrimitiveType {
    Bool,
    Int8,
    UInt8,
    /// Deprecated alias of `int8`
    Byte,
    /// Deprecated alias of `uint8`
    Char,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
    Time,
    Duration,
}

impl PrimitiveType {
    /// Every builtin type, in declaration order
    pub const ALL: [PrimitiveType; 16] = [
        Self::Bool,
        Self::Int8,
        Self::UInt8,
        Self::Byte,
        Self::Char,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::String,
        Self::Time,
        Self::Duration,
    ];

    /// Look up a builtin by its `.msg` spelling
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The `.msg` spelling of this type
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Time => "time",
            Self::Duration => "duration",
        }
    }

    /// Encoded width in bytes, `None` for `string`
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 | Self::Byte | Self::Char => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Time | Self::Duration => Some(8),
            Self::String => None,
        }
    }

    /// Whether constants may be declared with this type
    #[must_use]
    pub const fn allows_constants(self) -> bool {
        !matches!(self, Self::Time | Self::Duration)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fully qualified reference to a message type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageName {
    /// Package name
    pub package: String,
    /// Message name
    pub name: String,
}

impl MessageName {
    /// Create a new message name without validation
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// The standard header type, `std_msgs/Header`
    #[must_use]
    pub fn header() -> Self {
        Self::new(HEADER_PACKAGE, HEADER_TYPE)
    }

    /// Check if this names the standard header type
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.package == HEADER_PACKAGE && self.name == HEADER_TYPE
    }

    /// Parse a type reference (`Name`, `pkg/Name` or bare `Header`)
    ///
    /// # Errors
    ///
    /// Returns an error if the reference has more than one separator, has no
    /// package and no context package, or contains invalid names.
    pub fn parse(type_string: &str, context_package_name: Option<&str>) -> ParseResult<Self> {
        if type_string == HEADER_TYPE {
            return Ok(Self::header());
        }

        let parts: Vec<&str> = type_string
            .split(PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR)
            .collect();

        let (package, name) = match parts.as_slice() {
            [name] => match context_package_name {
                Some(pkg) => (pkg, *name),
                None => {
                    return Err(ParseError::invalid_type(
                        type_string,
                        "message type requires package name or context package",
                    ));
                }
            },
            [pkg, name] => (*pkg, *name),
            _ => return Err(ParseError::invalid_type(type_string, "invalid type format")),
        };

        if !is_valid_package_name(package) {
            return Err(ParseError::invalid_name(package, "valid package name pattern"));
        }
        if !is_valid_message_name(name) {
            return Err(ParseError::invalid_name(name, "valid message name pattern"));
        }

        Ok(Self::new(package, name))
    }
}

impl fmt::Display for MessageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.name)
    }
}

/// Element type of a field, without array information
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BaseType {
    /// A builtin type
    Primitive(PrimitiveType),
    /// Another message
    Message(MessageName),
}

impl BaseType {
    /// Parse a base type string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is neither a builtin nor a valid
    /// message reference.
    pub fn new(type_string: &str, context_package_name: Option<&str>) -> ParseResult<Self> {
        if let Some(primitive) = PrimitiveType::from_name(type_string) {
            return Ok(Self::Primitive(primitive));
        }
        MessageName::parse(type_string, context_package_name).map(Self::Message)
    }

    /// Check if this is a builtin type
    #[must_use]
    pub fn is_primitive_type(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// The referenced message, if any
    #[must_use]
    pub fn as_message(&self) -> Option<&MessageName> {
        match self {
            Self::Message(name) => Some(name),
            Self::Primitive(_) => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Message(name) => write!(f, "{name}"),
        }
    }
}

/// How many values a field carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Arity {
    /// A single value
    Scalar,
    /// Exactly `n` values, no length prefix on the wire
    FixedArray(u32),
    /// Any number of values, 4-byte count on the wire
    VariableArray,
}

impl Arity {
    /// Check if this is an array of either kind
    #[must_use]
    pub fn is_array(self) -> bool {
        !matches!(self, Self::Scalar)
    }
}

/// Type information including array specifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldType {
    /// Element type
    pub base_type: BaseType,
    /// Array-ness
    pub arity: Arity,
}

impl FieldType {
    /// Create a new type from a type string such as `int32[4]` or `Header`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The array brackets are malformed
    /// - The array size is not a positive integer
    /// - The base type is unknown or invalid
    pub fn new(type_string: &str, context_package_name: Option<&str>) -> ParseResult<Self> {
        let (base_type_string, arity) = if type_string.ends_with(']') {
            let bracket_start = type_string
                .rfind('[')
                .ok_or_else(|| ParseError::invalid_type(type_string, "ends with ']' but missing '['"))?;
            let array_spec = &type_string[bracket_start + 1..type_string.len() - 1];
            let arity = if array_spec.is_empty() {
                Arity::VariableArray
            } else {
                let size = array_spec.parse::<u32>().map_err(|_| {
                    ParseError::invalid_type(type_string, "array size must be a valid positive integer")
                })?;
                if size == 0 {
                    return Err(ParseError::invalid_type(type_string, "array size must be > 0"));
                }
                Arity::FixedArray(size)
            };
            (&type_string[..bracket_start], arity)
        } else {
            (type_string, Arity::Scalar)
        };

        if base_type_string.contains('[') || base_type_string.contains(']') {
            return Err(ParseError::invalid_type(type_string, "nested arrays are not supported"));
        }

        let base_type = BaseType::new(base_type_string, context_package_name)?;
        Ok(Self { base_type, arity })
    }

    /// Create a scalar type
    #[must_use]
    pub fn scalar(base_type: BaseType) -> Self {
        Self {
            base_type,
            arity: Arity::Scalar,
        }
    }

    /// Check if this is a builtin element type
    #[must_use]
    pub fn is_primitive_type(&self) -> bool {
        self.base_type.is_primitive_type()
    }

    /// Check if this is an array of either kind
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.arity.is_array()
    }

    /// Array size for fixed arrays
    #[must_use]
    pub fn array_size(&self) -> Option<u32> {
        match self.arity {
            Arity::FixedArray(n) => Some(n),
            _ => None,
        }
    }

    /// Check if this is a variable-length array
    #[must_use]
    pub fn is_dynamic_array(&self) -> bool {
        matches!(self.arity, Arity::VariableArray)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_type)?;
        match self.arity {
            Arity::Scalar => Ok(()),
            Arity::FixedArray(n) => write!(f, "[{n}]"),
            Arity::VariableArray => write!(f, "[]"),
        }
    }
}

/// Constant definition
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constant {
    /// Builtin type of the constant
    pub primitive_type: PrimitiveType,
    /// Name of the constant
    pub name: String,
    /// Parsed value
    pub value: PrimitiveValue,
    /// Value exactly as written (trimmed), used for fingerprints
    pub value_text: String,
}

impl Constant {
    /// Create a new constant
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The type is not a builtin that allows constants
    /// - The constant name doesn't follow valid naming conventions
    /// - The value string cannot be parsed for the given type
    pub fn new(primitive_type: &str, name: &str, value_string: &str) -> ParseResult<Self> {
        let primitive = PrimitiveType::from_name(primitive_type)
            .filter(|p| p.allows_constants())
            .ok_or_else(|| {
                ParseError::invalid_type(
                    primitive_type,
                    "constant type must be a builtin other than time/duration",
                )
            })?;

        if !is_valid_constant_name(name) {
            return Err(ParseError::invalid_name(name, "valid constant name pattern"));
        }

        let value_text = value_string.trim();
        let value = parse_primitive_value_string(primitive, value_text)?;

        Ok(Constant {
            primitive_type: primitive,
            name: name.to_string(),
            value,
            value_text: value_text.to_string(),
        })
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}={}", self.primitive_type, self.name, self.value_text)
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field {
    /// Type of the field
    pub field_type: FieldType,
    /// Name of the field
    pub name: String,
}

impl Field {
    /// Create a new field
    ///
    /// # Errors
    ///
    /// Returns an error if the field name doesn't follow valid naming conventions.
    pub fn new(field_type: FieldType, name: &str) -> ParseResult<Self> {
        if !is_valid_field_name(name) {
            return Err(ParseError::invalid_name(name, "valid field name pattern"));
        }

        Ok(Field {
            field_type,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field_type, self.name)
    }
}
