//! Wire layout of a message
//!
//! A [`MessageLayout`] reduces a parsed schema to what the encoder needs:
//! for every field, the element written on the wire and how repeated
//! elements are framed. The code generator and [`crate::dynamic`] both walk
//! this representation, so generated and interpreted codecs share one set of
//! framing rules.

use std::fmt;

use crate::msg::{Arity, BaseType, Field, MessageName, MessageSpecification, PrimitiveType};

/// Encoded element of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Builtin with a fixed encoded width (numbers, bool, time, duration)
    Fixed {
        /// Builtin type
        primitive: PrimitiveType,
        /// Encoded width in bytes
        width: usize,
    },
    /// Length-prefixed UTF-8 string
    String,
    /// Embedded message, encoded inline
    Message(MessageName),
}

impl Element {
    /// Element for a field's base type
    #[must_use]
    pub fn from_base_type(base_type: &BaseType) -> Self {
        match base_type {
            BaseType::Primitive(primitive) => match primitive.fixed_width() {
                Some(width) => Self::Fixed {
                    primitive: *primitive,
                    width,
                },
                None => Self::String,
            },
            BaseType::Message(name) => Self::Message(name.clone()),
        }
    }

    /// Encoded width if it does not depend on the value
    #[must_use]
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::Fixed { width, .. } => Some(*width),
            Self::String | Self::Message(_) => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed { primitive, .. } => write!(f, "{primitive}"),
            Self::String => f.write_str("string"),
            Self::Message(name) => write!(f, "{name}"),
        }
    }
}

/// How the elements of a field are framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// One element
    Scalar,
    /// Exactly `n` elements, no prefix
    Fixed(usize),
    /// 4-byte element count followed by the elements
    Prefixed,
}

/// Layout of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Field name as declared
    pub name: String,
    /// Encoded element
    pub element: Element,
    /// Element framing
    pub framing: Framing,
}

impl FieldLayout {
    /// Layout of a parsed field
    #[must_use]
    pub fn from_field(field: &Field) -> Self {
        let framing = match field.field_type.arity {
            Arity::Scalar => Framing::Scalar,
            // Array sizes are parsed as u32 and usize is at least that wide here.
            Arity::FixedArray(n) => Framing::Fixed(n as usize),
            Arity::VariableArray => Framing::Prefixed,
        };
        Self {
            name: field.name.clone(),
            element: Element::from_base_type(&field.field_type.base_type),
            framing,
        }
    }

    /// Encoded size if it does not depend on the value
    ///
    /// Only fixed-width elements outside a prefixed array qualify.
    #[must_use]
    pub fn fixed_size(&self) -> Option<usize> {
        let width = self.element.fixed_width()?;
        match self.framing {
            Framing::Scalar => Some(width),
            Framing::Fixed(n) => Some(width * n),
            Framing::Prefixed => None,
        }
    }
}

/// Layout of a message: its fields in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLayout {
    /// `package/Name` of the message
    pub name: MessageName,
    /// Field layouts in wire order
    pub fields: Vec<FieldLayout>,
}

impl MessageLayout {
    /// Build the layout of a parsed message
    #[must_use]
    pub fn from_spec(spec: &MessageSpecification) -> Self {
        Self {
            name: spec.full_name(),
            fields: spec.fields.iter().map(FieldLayout::from_field).collect(),
        }
    }

    /// Check if the message has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sum of the fixed sizes of every field, if all of them are fixed
    ///
    /// Embedded messages are never counted as fixed here.
    #[must_use]
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields.iter().map(FieldLayout::fixed_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::parse_message_string;

    #[test]
    fn test_framing() {
        let spec = parse_message_string(
            "p",
            "M",
            "uint16 count\nfloat64[] samples\nint32[2] pair\nstring name\nHeader header\n",
        )
        .unwrap();
        let layout = MessageLayout::from_spec(&spec);
        assert_eq!(layout.fields.len(), 5);
        assert_eq!(layout.fields[0].framing, Framing::Scalar);
        assert_eq!(layout.fields[1].framing, Framing::Prefixed);
        assert_eq!(layout.fields[2].framing, Framing::Fixed(2));
        assert_eq!(layout.fields[3].element, Element::String);
        assert_eq!(
            layout.fields[4].element,
            Element::Message(MessageName::header())
        );
    }

    #[test]
    fn test_fixed_sizes() {
        let spec = parse_message_string("p", "M", "int32[2] pair\ntime t\nbool b\n").unwrap();
        let layout = MessageLayout::from_spec(&spec);
        assert_eq!(layout.fields[0].fixed_size(), Some(8));
        assert_eq!(layout.fixed_size(), Some(8 + 8 + 1));

        let spec = parse_message_string("p", "M", "int32 x\nuint8[] data\n").unwrap();
        assert_eq!(MessageLayout::from_spec(&spec).fixed_size(), None);

        let empty = parse_message_string("p", "E", "").unwrap();
        let layout = MessageLayout::from_spec(&empty);
        assert!(layout.is_empty());
        assert_eq!(layout.fixed_size(), Some(0));
    }

    #[test]
    fn test_byte_and_char_widths() {
        let spec = parse_message_string("p", "M", "byte b\nchar c\n").unwrap();
        let layout = MessageLayout::from_spec(&spec);
        assert_eq!(layout.fields[0].element.fixed_width(), Some(1));
        assert_eq!(layout.fields[1].element.to_string(), "char");
    }
}
