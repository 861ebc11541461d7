//! ROS1 `.msg`/`.srv` grammar and schema model

/// Parse failures with file and line context
pub mod errors;
/// `.msg` text to [`MessageSpecification`]
pub mod message;
/// `.srv` text split on `---` into request and response
pub mod service;
/// Names, builtin types, fields and constants
pub mod types;
/// Name patterns and constant literal parsing
pub mod validation;

pub use errors::{ParseError, ParseResult};
pub use message::{MessageSpecification, parse_message_file, parse_message_string};
pub use service::{ServiceSpecification, parse_service_file, parse_service_string};
pub use types::{Arity, BaseType, Constant, Field, FieldType, MessageName, PrimitiveType};
pub use validation::{
    HEADER_DEFINITION, PrimitiveValue, is_valid_constant_name, is_valid_field_name,
    is_valid_message_name, is_valid_package_name, parse_primitive_value_string,
};

use std::fmt;
use std::path::Path;

/// A parsed `.msg` or `.srv` file
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceSpecification {
    /// From a `.msg` file
    Message(MessageSpecification),
    /// From a `.srv` file
    Service(ServiceSpecification),
}

impl InterfaceSpecification {
    /// Package owning the file
    #[must_use]
    pub fn package_name(&self) -> &str {
        match self {
            Self::Message(msg) => &msg.pkg_name,
            Self::Service(srv) => &srv.pkg_name,
        }
    }

    /// File basename, which is the type name
    #[must_use]
    pub fn interface_name(&self) -> &str {
        match self {
            Self::Message(msg) => &msg.msg_name,
            Self::Service(srv) => &srv.srv_name,
        }
    }

    /// `package/Name` of the interface
    #[must_use]
    pub fn full_name(&self) -> MessageName {
        MessageName::new(self.package_name(), self.interface_name())
    }

    /// The message schemas the file defines: one for a `.msg`, request and
    /// response for a `.srv`
    #[must_use]
    pub fn messages(&self) -> Vec<&MessageSpecification> {
        match self {
            Self::Message(msg) => vec![msg],
            Self::Service(srv) => vec![&srv.request, &srv.response],
        }
    }

    /// The message, for a `.msg` file
    #[must_use]
    pub fn as_message(&self) -> Option<&MessageSpecification> {
        match self {
            Self::Message(msg) => Some(msg),
            Self::Service(_) => None,
        }
    }

    /// The service, for a `.srv` file
    #[must_use]
    pub fn as_service(&self) -> Option<&ServiceSpecification> {
        match self {
            Self::Service(srv) => Some(srv),
            Self::Message(_) => None,
        }
    }
}

impl fmt::Display for InterfaceSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => fmt::Display::fmt(msg, f),
            Self::Service(srv) => fmt::Display::fmt(srv, f),
        }
    }
}

/// Parse a `.msg` or `.srv` file, picking the grammar from the extension
///
/// # Errors
///
/// [`ParseError::UnsupportedInterface`] for any other extension, otherwise
/// whatever reading or parsing the file fails with.
pub fn parse_interface_file(pkg_name: &str, path: &Path) -> ParseResult<InterfaceSpecification> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("msg") => parse_message_file(pkg_name, path).map(InterfaceSpecification::Message),
        Some("srv") => parse_service_file(pkg_name, path).map(InterfaceSpecification::Service),
        _ => Err(ParseError::UnsupportedInterface {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_and_service_views() {
        let point = parse_message_string("geometry_msgs", "Point", "float64 x\n").unwrap();
        let iface = InterfaceSpecification::Message(point);
        assert_eq!(iface.full_name().to_string(), "geometry_msgs/Point");
        assert_eq!(iface.messages().len(), 1);
        assert!(iface.as_message().is_some());
        assert!(iface.as_service().is_none());

        let add = parse_service_string("rospy_tutorials", "AddTwoInts", "int64 a\n---\nint64 sum\n")
            .unwrap();
        let iface = InterfaceSpecification::Service(add);
        assert_eq!(iface.interface_name(), "AddTwoInts");
        let names: Vec<String> = iface.messages().iter().map(|m| m.msg_name.clone()).collect();
        assert_eq!(names, ["AddTwoIntsRequest", "AddTwoIntsResponse"]);
        assert!(iface.as_service().is_some());
    }

    #[test]
    fn test_parse_interface_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let msg_path = dir.path().join("Test.msg");
        std::fs::write(&msg_path, "int32 value\n").unwrap();
        assert!(
            parse_interface_file("test_pkg", &msg_path)
                .unwrap()
                .as_message()
                .is_some()
        );

        let srv_path = dir.path().join("Test.srv");
        std::fs::write(&srv_path, "int32 a\n---\nint32 b\n").unwrap();
        assert!(
            parse_interface_file("test_pkg", &srv_path)
                .unwrap()
                .as_service()
                .is_some()
        );

        let other = dir.path().join("test.action");
        std::fs::write(&other, "int32 x\n").unwrap();
        assert!(matches!(
            parse_interface_file("test_pkg", &other),
            Err(ParseError::UnsupportedInterface { .. })
        ));

        let missing = dir.path().join("Missing.msg");
        assert!(matches!(
            parse_interface_file("test_pkg", &missing),
            Err(ParseError::Io { .. })
        ));
    }
}
