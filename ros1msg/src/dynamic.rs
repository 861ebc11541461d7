//! Schema-interpreted codec
//!
//! [`DynamicCodec`] encodes and decodes [`DynamicMessage`] values by walking
//! [`MessageLayout`]s resolved through a [`SchemaRegistry`]. It produces the
//! same bytes as generated code without compiling anything, which makes it
//! usable for tooling and for checking the generated codecs.

use std::fmt;

use ros1_types::{Duration, HashCode, MessageEq, Time, WireReader, WireWriter};
use thiserror::Error;

use crate::layout::{Element, FieldLayout, Framing, MessageLayout};
use crate::msg::{MessageName, PrimitiveType};
use crate::registry::SchemaRegistry;

/// Errors raised by the dynamic codec
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CodecError {
    #[error(transparent)]
    Wire(#[from] ros1_types::Error),

    #[error("Unknown message type '{name}'")]
    UnknownType { name: String },

    #[error("Field '{field}' of {message} expects {expected}, found {found}")]
    TypeMismatch {
        message: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("Field '{field}' missing from {message}")]
    MissingField { message: String, field: String },

    #[error("{message} has no field named '{field}'")]
    UnknownField { message: String, field: String },

    #[error("Field '{field}' of {message} expects {expected} elements, found {actual}")]
    ArrayLength {
        message: String,
        field: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for the dynamic codec
pub type CodecResult<T> = Result<T, CodecError>;

/// A field value
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Time(Time),
    Duration(Duration),
    /// Elements of a fixed or variable array
    Array(Vec<Value>),
    Message(DynamicMessage),
}

impl Value {
    /// Short description of the variant, used in error messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "int8",
            Self::U8(_) => "uint8",
            Self::I16(_) => "int16",
            Self::U16(_) => "uint16",
            Self::I32(_) => "int32",
            Self::U32(_) => "uint32",
            Self::I64(_) => "int64",
            Self::U64(_) => "uint64",
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::String(_) => "string",
            Self::Time(_) => "time",
            Self::Duration(_) => "duration",
            Self::Array(_) => "array",
            Self::Message(_) => "message",
        }
    }

    /// Zero value of a builtin
    #[must_use]
    pub fn zero(primitive: PrimitiveType) -> Self {
        match primitive {
            PrimitiveType::Bool => Self::Bool(false),
            PrimitiveType::Int8 | PrimitiveType::Byte => Self::I8(0),
            PrimitiveType::UInt8 | PrimitiveType::Char => Self::U8(0),
            PrimitiveType::Int16 => Self::I16(0),
            PrimitiveType::UInt16 => Self::U16(0),
            PrimitiveType::Int32 => Self::I32(0),
            PrimitiveType::UInt32 => Self::U32(0),
            PrimitiveType::Int64 => Self::I64(0),
            PrimitiveType::UInt64 => Self::U64(0),
            PrimitiveType::Float32 => Self::F32(0.0),
            PrimitiveType::Float64 => Self::F64(0.0),
            PrimitiveType::String => Self::String(String::new()),
            PrimitiveType::Time => Self::Time(Time::default()),
            PrimitiveType::Duration => Self::Duration(Duration::default()),
        }
    }

    /// The embedded message, if this is one
    #[must_use]
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// The elements, if this is an array
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

// Floats compare by bit pattern, like generated code.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a.message_eq(b),
            (Self::F64(a), Self::F64(b)) => a.message_eq(b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Message(a), Self::Message(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl HashCode for Value {
    fn hash_code(&self) -> i32 {
        match self {
            Self::Bool(v) => v.hash_code(),
            Self::I8(v) => v.hash_code(),
            Self::U8(v) => v.hash_code(),
            Self::I16(v) => v.hash_code(),
            Self::U16(v) => v.hash_code(),
            Self::I32(v) => v.hash_code(),
            Self::U32(v) => v.hash_code(),
            Self::I64(v) => v.hash_code(),
            Self::U64(v) => v.hash_code(),
            Self::F32(v) => v.hash_code(),
            Self::F64(v) => v.hash_code(),
            Self::String(v) => v.hash_code(),
            Self::Time(v) => v.hash_code(),
            Self::Duration(v) => v.hash_code(),
            Self::Array(v) => v.hash_code(),
            Self::Message(v) => v.hash_code(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Time(v) => write!(f, "{v}"),
            Self::Duration(v) => write!(f, "{v}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Message(msg) => write!(f, "{msg}"),
        }
    }
}

/// A message value held as named fields
///
/// Fields are looked up by name: two messages are equal when they have the
/// same type and the same name/value pairs, whatever order they were set in.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    name: MessageName,
    fields: Vec<(String, Value)>,
}

impl DynamicMessage {
    /// Create a message with no field values
    #[must_use]
    pub fn new(name: MessageName) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// `package/Name` of the message
    #[must_use]
    pub fn name(&self) -> &MessageName {
        &self.name
    }

    /// Field values in insertion order
    #[must_use]
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Value of a field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == field).map(|(_, v)| v)
    }

    /// Mutable value of a field
    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == field)
            .map(|(_, v)| v)
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, field: &str, value: Value) -> Option<Value> {
        if let Some(slot) = self.get_mut(field) {
            return Some(std::mem::replace(slot, value));
        }
        self.fields.push((field.to_string(), value));
        None
    }

    /// Builder form of [`DynamicMessage::set`]
    #[must_use]
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.set(field, value);
        self
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for DynamicMessage {}

// Hashed in field-name order so equal messages hash alike.
impl HashCode for DynamicMessage {
    fn hash_code(&self) -> i32 {
        let mut fields: Vec<&(String, Value)> = self.fields.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        fields.into_iter().fold(ros1_types::HASH_SEED, |acc, (_, v)| {
            ros1_types::combine_hash(acc, v.hash_code())
        })
    }
}

impl fmt::Display for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {name}: {value}")?;
        }
        f.write_str(" }")
    }
}

/// Encoder/decoder driven by parsed schemas
#[derive(Debug, Clone, Copy)]
pub struct DynamicCodec<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> DynamicCodec<'r> {
    /// Create a codec over a resolved registry
    #[must_use]
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Layout of a registered message
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownType`] if the message is not registered.
    pub fn layout(&self, name: &MessageName) -> CodecResult<MessageLayout> {
        self.registry
            .get(name)
            .map(MessageLayout::from_spec)
            .ok_or_else(|| CodecError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Default-constructed message: zero numbers, empty strings and
    /// variable arrays, fixed arrays filled with default elements
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownType`] if a message involved is not
    /// registered.
    pub fn default_message(&self, name: &MessageName) -> CodecResult<DynamicMessage> {
        let layout = self.layout(name)?;
        let mut msg = DynamicMessage::new(name.clone());
        for field in &layout.fields {
            let value = match field.framing {
                Framing::Scalar => self.default_element(&field.element)?,
                Framing::Fixed(n) => Value::Array(
                    (0..n)
                        .map(|_| self.default_element(&field.element))
                        .collect::<CodecResult<_>>()?,
                ),
                Framing::Prefixed => Value::Array(Vec::new()),
            };
            msg.fields.push((field.name.clone(), value));
        }
        Ok(msg)
    }

    fn default_element(&self, element: &Element) -> CodecResult<Value> {
        match element {
            Element::Fixed { primitive, .. } => Ok(Value::zero(*primitive)),
            Element::String => Ok(Value::String(String::new())),
            Element::Message(name) => self.default_message(name).map(Value::Message),
        }
    }

    /// Exact encoded size of `msg`
    ///
    /// # Errors
    ///
    /// Returns an error if `msg` does not match its schema.
    pub fn serialization_length(&self, msg: &DynamicMessage) -> CodecResult<usize> {
        let layout = self.layout(&msg.name)?;
        check_known_fields(&layout, msg)?;
        let mut total = 0;
        for field in &layout.fields {
            let value = field_value(&layout, msg, field)?;
            total += match field.framing {
                Framing::Scalar => self.element_length(&layout, field, value)?,
                Framing::Fixed(n) => {
                    let items = array_items(&layout, field, value, Some(n))?;
                    self.elements_length(&layout, field, items)?
                }
                Framing::Prefixed => {
                    let items = array_items(&layout, field, value, None)?;
                    ros1_types::LENGTH_PREFIX_SIZE + self.elements_length(&layout, field, items)?
                }
            };
        }
        Ok(total)
    }

    fn elements_length(
        &self,
        layout: &MessageLayout,
        field: &FieldLayout,
        items: &[Value],
    ) -> CodecResult<usize> {
        if let Some(width) = field.element.fixed_width() {
            for item in items {
                check_primitive(layout, field, item)?;
            }
            return Ok(width * items.len());
        }
        items
            .iter()
            .map(|item| self.element_length(layout, field, item))
            .sum()
    }

    fn element_length(
        &self,
        layout: &MessageLayout,
        field: &FieldLayout,
        value: &Value,
    ) -> CodecResult<usize> {
        match (&field.element, value) {
            (Element::Fixed { width, .. }, _) => {
                check_primitive(layout, field, value)?;
                Ok(*width)
            }
            (Element::String, Value::String(s)) => Ok(ros1_types::LENGTH_PREFIX_SIZE + s.len()),
            (Element::Message(name), Value::Message(inner)) if &inner.name == name => {
                self.serialization_length(inner)
            }
            _ => Err(mismatch(layout, field, value)),
        }
    }

    /// Encode `msg` to bytes
    ///
    /// # Errors
    ///
    /// Returns an error if `msg` does not match its schema.
    pub fn encode(&self, msg: &DynamicMessage) -> CodecResult<Vec<u8>> {
        let mut writer = WireWriter::with_capacity(self.serialization_length(msg)?);
        self.encode_into(msg, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Encode `msg` onto an existing writer
    ///
    /// # Errors
    ///
    /// Returns an error if `msg` does not match its schema.
    pub fn encode_into(&self, msg: &DynamicMessage, writer: &mut WireWriter) -> CodecResult<()> {
        let layout = self.layout(&msg.name)?;
        check_known_fields(&layout, msg)?;
        for field in &layout.fields {
            let value = field_value(&layout, msg, field)?;
            match field.framing {
                Framing::Scalar => self.encode_element(&layout, field, value, writer)?,
                Framing::Fixed(n) => {
                    for item in array_items(&layout, field, value, Some(n))? {
                        self.encode_element(&layout, field, item, writer)?;
                    }
                }
                Framing::Prefixed => {
                    let items = array_items(&layout, field, value, None)?;
                    writer.write_len(items.len())?;
                    for item in items {
                        self.encode_element(&layout, field, item, writer)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn encode_element(
        &self,
        layout: &MessageLayout,
        field: &FieldLayout,
        value: &Value,
        writer: &mut WireWriter,
    ) -> CodecResult<()> {
        match (&field.element, value) {
            (Element::Fixed { primitive, .. }, _) => {
                check_primitive(layout, field, value)?;
                write_primitive(*primitive, value, writer);
                Ok(())
            }
            (Element::String, Value::String(s)) => Ok(writer.write_string(s)?),
            (Element::Message(name), Value::Message(inner)) if &inner.name == name => {
                self.encode_into(inner, writer)
            }
            _ => Err(mismatch(layout, field, value)),
        }
    }

    /// Decode a complete message of type `name` from `bytes`
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are truncated, malformed or not fully
    /// consumed.
    pub fn decode(&self, name: &MessageName, bytes: &[u8]) -> CodecResult<DynamicMessage> {
        let mut reader = WireReader::new(bytes);
        let msg = self.decode_from(name, &mut reader)?;
        reader.finish()?;
        Ok(msg)
    }

    /// Decode one message of type `name` from a reader
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are truncated or malformed.
    pub fn decode_from(
        &self,
        name: &MessageName,
        reader: &mut WireReader<'_>,
    ) -> CodecResult<DynamicMessage> {
        let layout = self.layout(name)?;
        let mut msg = DynamicMessage::new(name.clone());
        for field in &layout.fields {
            let value = match field.framing {
                Framing::Scalar => self.decode_element(&field.element, reader)?,
                Framing::Fixed(n) => {
                    let mut items = Vec::with_capacity(n);
                    for _ in 0..n {
                        items.push(self.decode_element(&field.element, reader)?);
                    }
                    Value::Array(items)
                }
                Framing::Prefixed => {
                    let len = reader.read_len()?;
                    let mut items = Vec::with_capacity(len.min(reader.remaining()));
                    for _ in 0..len {
                        items.push(self.decode_element(&field.element, reader)?);
                    }
                    Value::Array(items)
                }
            };
            msg.fields.push((field.name.clone(), value));
        }
        Ok(msg)
    }

    fn decode_element(&self, element: &Element, reader: &mut WireReader<'_>) -> CodecResult<Value> {
        match element {
            Element::Fixed { primitive, .. } => Ok(read_primitive(*primitive, reader)?),
            Element::String => Ok(Value::String(reader.read_string()?)),
            Element::Message(name) => self.decode_from(name, reader).map(Value::Message),
        }
    }

    /// Deep copy through the wire format
    ///
    /// # Errors
    ///
    /// Returns an error if `msg` does not match its schema.
    pub fn clone_message(&self, msg: &DynamicMessage) -> CodecResult<DynamicMessage> {
        let bytes = self.encode(msg)?;
        self.decode(&msg.name, &bytes)
    }
}

fn field_value<'m>(
    layout: &MessageLayout,
    msg: &'m DynamicMessage,
    field: &FieldLayout,
) -> CodecResult<&'m Value> {
    msg.get(&field.name).ok_or_else(|| CodecError::MissingField {
        message: layout.name.to_string(),
        field: field.name.clone(),
    })
}

fn check_known_fields(layout: &MessageLayout, msg: &DynamicMessage) -> CodecResult<()> {
    match msg
        .fields
        .iter()
        .find(|(name, _)| !layout.fields.iter().any(|f| &f.name == name))
    {
        Some((name, _)) => Err(CodecError::UnknownField {
            message: layout.name.to_string(),
            field: name.clone(),
        }),
        None => Ok(()),
    }
}

fn array_items<'v>(
    layout: &MessageLayout,
    field: &FieldLayout,
    value: &'v Value,
    expected: Option<usize>,
) -> CodecResult<&'v [Value]> {
    let Value::Array(items) = value else {
        return Err(CodecError::TypeMismatch {
            message: layout.name.to_string(),
            field: field.name.clone(),
            expected: "array".to_string(),
            found: value.kind_name().to_string(),
        });
    };
    if let Some(expected) = expected
        && items.len() != expected
    {
        return Err(CodecError::ArrayLength {
            message: layout.name.to_string(),
            field: field.name.clone(),
            expected,
            actual: items.len(),
        });
    }
    Ok(items)
}

fn mismatch(layout: &MessageLayout, field: &FieldLayout, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        message: layout.name.to_string(),
        field: field.name.clone(),
        expected: field.element.to_string(),
        found: value.kind_name().to_string(),
    }
}

fn primitive_matches(primitive: PrimitiveType, value: &Value) -> bool {
    matches!(
        (primitive, value),
        (PrimitiveType::Bool, Value::Bool(_))
            | (PrimitiveType::Int8 | PrimitiveType::Byte, Value::I8(_))
            | (PrimitiveType::UInt8 | PrimitiveType::Char, Value::U8(_))
            | (PrimitiveType::Int16, Value::I16(_))
            | (PrimitiveType::UInt16, Value::U16(_))
            | (PrimitiveType::Int32, Value::I32(_))
            | (PrimitiveType::UInt32, Value::U32(_))
            | (PrimitiveType::Int64, Value::I64(_))
            | (PrimitiveType::UInt64, Value::U64(_))
            | (PrimitiveType::Float32, Value::F32(_))
            | (PrimitiveType::Float64, Value::F64(_))
            | (PrimitiveType::String, Value::String(_))
            | (PrimitiveType::Time, Value::Time(_))
            | (PrimitiveType::Duration, Value::Duration(_))
    )
}

fn check_primitive(layout: &MessageLayout, field: &FieldLayout, value: &Value) -> CodecResult<()> {
    match &field.element {
        Element::Fixed { primitive, .. } if primitive_matches(*primitive, value) => Ok(()),
        _ => Err(mismatch(layout, field, value)),
    }
}

// Callers check the value against the primitive first.
fn write_primitive(primitive: PrimitiveType, value: &Value, writer: &mut WireWriter) {
    debug_assert!(primitive_matches(primitive, value));
    match value {
        Value::Bool(v) => writer.write_bool(*v),
        Value::I8(v) => writer.write_i8(*v),
        Value::U8(v) => writer.write_u8(*v),
        Value::I16(v) => writer.write_i16(*v),
        Value::U16(v) => writer.write_u16(*v),
        Value::I32(v) => writer.write_i32(*v),
        Value::U32(v) => writer.write_u32(*v),
        Value::I64(v) => writer.write_i64(*v),
        Value::U64(v) => writer.write_u64(*v),
        Value::F32(v) => writer.write_f32(*v),
        Value::F64(v) => writer.write_f64(*v),
        Value::Time(v) => writer.write_time(v),
        Value::Duration(v) => writer.write_duration(v),
        Value::String(_) | Value::Array(_) | Value::Message(_) => {}
    }
}

fn read_primitive(primitive: PrimitiveType, reader: &mut WireReader<'_>) -> ros1_types::Result<Value> {
    Ok(match primitive {
        PrimitiveType::Bool => Value::Bool(reader.read_bool()?),
        PrimitiveType::Int8 | PrimitiveType::Byte => Value::I8(reader.read_i8()?),
        PrimitiveType::UInt8 | PrimitiveType::Char => Value::U8(reader.read_u8()?),
        PrimitiveType::Int16 => Value::I16(reader.read_i16()?),
        PrimitiveType::UInt16 => Value::U16(reader.read_u16()?),
        PrimitiveType::Int32 => Value::I32(reader.read_i32()?),
        PrimitiveType::UInt32 => Value::U32(reader.read_u32()?),
        PrimitiveType::Int64 => Value::I64(reader.read_i64()?),
        PrimitiveType::UInt64 => Value::U64(reader.read_u64()?),
        PrimitiveType::Float32 => Value::F32(reader.read_f32()?),
        PrimitiveType::Float64 => Value::F64(reader.read_f64()?),
        PrimitiveType::String => Value::String(reader.read_string()?),
        PrimitiveType::Time => Value::Time(reader.read_time()?),
        PrimitiveType::Duration => Value::Duration(reader.read_duration()?),
    })
}
