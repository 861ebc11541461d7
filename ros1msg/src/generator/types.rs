//! Type mapping from ROS1 types to Rust types

use super::InterfaceKind;
use super::config::{DEFAULT_RUNTIME_PATH, GeneratorConfig, package_module_name};
use crate::msg::{Arity, BaseType, FieldType, MessageName, PrimitiveType, PrimitiveValue};

/// Maps ROS1 types to Rust types
///
/// Builtins map to Rust primitives, `time`/`duration` to the runtime
/// crate's types and embedded messages to a path relative to the file
/// the field is generated in.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    runtime_path: String,
}

impl TypeMapper {
    /// Create a new type mapper using `::ros1_types` as the runtime path
    #[must_use]
    pub fn new() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
        }
    }

    /// Create a new type mapper with a custom runtime path
    pub fn with_runtime_path(path: impl AsRef<str>) -> Self {
        Self {
            runtime_path: path.as_ref().to_string(),
        }
    }

    /// Get the runtime path
    #[must_use]
    pub fn runtime_path(&self) -> &str {
        &self.runtime_path
    }

    /// Map a builtin type to its Rust type
    #[must_use]
    pub fn map_primitive(&self, primitive: PrimitiveType) -> String {
        match primitive {
            PrimitiveType::Bool => "bool".to_string(),
            PrimitiveType::Int8 | PrimitiveType::Byte => "i8".to_string(),
            PrimitiveType::UInt8 | PrimitiveType::Char => "u8".to_string(),
            PrimitiveType::Int16 => "i16".to_string(),
            PrimitiveType::UInt16 => "u16".to_string(),
            PrimitiveType::Int32 => "i32".to_string(),
            PrimitiveType::UInt32 => "u32".to_string(),
            PrimitiveType::Int64 => "i64".to_string(),
            PrimitiveType::UInt64 => "u64".to_string(),
            PrimitiveType::Float32 => "f32".to_string(),
            PrimitiveType::Float64 => "f64".to_string(),
            // Fully qualified so a generated `String` message cannot shadow it
            PrimitiveType::String => "::std::string::String".to_string(),
            PrimitiveType::Time => format!("{}::Time", self.runtime_path),
            PrimitiveType::Duration => format!("{}::Duration", self.runtime_path),
        }
    }

    /// Path of an embedded message type, relative to a generated file
    #[must_use]
    pub fn message_path(&self, name: &MessageName, config: &GeneratorConfig) -> String {
        let kind = InterfaceKind::Message;
        let package = package_module_name(&name.package);
        let module = config.transform_module_name(name, kind);
        let item = config.transform_item_name(name, kind);
        let supers = "super::".repeat(kind.import_depth());
        format!("{supers}{package}::{}::{module}::{item}", kind.dir_name())
    }

    /// Map an element type to its Rust type
    #[must_use]
    pub fn map_base_type(&self, base_type: &BaseType, config: &GeneratorConfig) -> String {
        match base_type {
            BaseType::Primitive(primitive) => self.map_primitive(*primitive),
            BaseType::Message(name) => self.message_path(name, config),
        }
    }

    /// Map a field type to its Rust type
    #[must_use]
    pub fn map_type(&self, field_type: &FieldType, config: &GeneratorConfig) -> String {
        let element = self.map_base_type(&field_type.base_type, config);
        match field_type.arity {
            Arity::Scalar => element,
            Arity::FixedArray(n) => format!("[{element}; {n}]"),
            Arity::VariableArray => format!("::std::vec::Vec<{element}>"),
        }
    }

    /// Default value expression of an element type
    #[must_use]
    pub fn element_default(&self, base_type: &BaseType) -> String {
        match base_type {
            BaseType::Primitive(primitive) => match primitive {
                PrimitiveType::Bool => "false".to_string(),
                PrimitiveType::Float32 | PrimitiveType::Float64 => "0.0".to_string(),
                PrimitiveType::String => "::std::string::String::new()".to_string(),
                PrimitiveType::Time | PrimitiveType::Duration => {
                    format!("{}::default()", self.map_primitive(*primitive))
                }
                _ => "0".to_string(),
            },
            BaseType::Message(_) => "::core::default::Default::default()".to_string(),
        }
    }

    /// Default value expression of a field
    ///
    /// Fixed arrays hold `n` default elements, variable arrays start empty.
    #[must_use]
    pub fn default_value(&self, field_type: &FieldType) -> String {
        let element = self.element_default(&field_type.base_type);
        match field_type.arity {
            Arity::Scalar => element,
            Arity::FixedArray(_) => format!("::core::array::from_fn(|_| {element})"),
            Arity::VariableArray => "::std::vec::Vec::new()".to_string(),
        }
    }

    /// Rust type of a constant
    #[must_use]
    pub fn constant_type(&self, primitive: PrimitiveType) -> String {
        match primitive {
            PrimitiveType::String => "&'static str".to_string(),
            other => self.map_primitive(other),
        }
    }

    /// Rust expression of a constant value
    #[must_use]
    pub fn constant_value(&self, value: &PrimitiveValue) -> String {
        match value {
            PrimitiveValue::String(s) => format!("{s:?}"),
            PrimitiveValue::Float32(v) => float_literal("f32", f64::from(*v), &format!("{v:?}")),
            PrimitiveValue::Float64(v) => float_literal("f64", *v, &format!("{v:?}")),
            other => other.to_string(),
        }
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn float_literal(ty: &str, value: f64, debug_text: &str) -> String {
    if value.is_nan() {
        format!("{ty}::NAN")
    } else if value == f64::INFINITY {
        format!("{ty}::INFINITY")
    } else if value == f64::NEG_INFINITY {
        format!("{ty}::NEG_INFINITY")
    } else {
        debug_text.to_string()
    }
}
