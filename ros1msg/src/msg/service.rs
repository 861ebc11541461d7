/// Service specification parsing
use std::fs;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::errors::{ParseError, ParseResult};
use super::message::{MessageSpecification, parse_message_string};
use crate::msg::types::MessageName;
use crate::msg::validation::{
    SERVICE_REQUEST_MESSAGE_SUFFIX, SERVICE_REQUEST_RESPONSE_SEPARATOR,
    SERVICE_RESPONSE_MESSAGE_SUFFIX, is_valid_message_name,
};

/// Service specification
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServiceSpecification {
    /// Package name
    pub pkg_name: String,
    /// Service name
    pub srv_name: String,
    /// Request message (`<Srv>Request`)
    pub request: MessageSpecification,
    /// Response message (`<Srv>Response`)
    pub response: MessageSpecification,
    /// Raw definition text
    pub text: String,
}

impl ServiceSpecification {
    /// The `package/Name` of this service
    #[must_use]
    pub fn full_name(&self) -> MessageName {
        MessageName::new(&self.pkg_name, &self.srv_name)
    }
}

impl std::fmt::Display for ServiceSpecification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# {}/{}", self.pkg_name, self.srv_name)?;
        write!(f, "{}", self.request)?;
        writeln!(f, "{SERVICE_REQUEST_RESPONSE_SEPARATOR}")?;
        write!(f, "{}", self.response)
    }
}

/// Parse a service file
///
/// # Errors
///
/// Returns [`ParseError`] if the file cannot be read or the service format is invalid.
pub fn parse_service_file<P: AsRef<Path>>(
    pkg_name: &str,
    interface_filename: P,
) -> ParseResult<ServiceSpecification> {
    let path = interface_filename.as_ref();
    let srv_name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ParseError::InvalidServiceSpecification {
            reason: "invalid filename".to_string(),
        })?;

    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_service_string(pkg_name, srv_name, &content)
}

/// Parse a service from string content
///
/// The request and response are separated by the first line starting with
/// `---`.
///
/// # Errors
///
/// Returns [`ParseError`] if the separator is missing or either part is invalid.
pub fn parse_service_string(
    pkg_name: &str,
    srv_name: &str,
    service_string: &str,
) -> ParseResult<ServiceSpecification> {
    if !is_valid_message_name(srv_name) {
        return Err(ParseError::InvalidResourceName {
            name: srv_name.to_string(),
            reason: "invalid service name pattern".to_string(),
        });
    }

    let lines: Vec<&str> = service_string.lines().collect();
    let separator = lines
        .iter()
        .position(|line| line.starts_with(SERVICE_REQUEST_RESPONSE_SEPARATOR))
        .ok_or_else(|| ParseError::InvalidServiceSpecification {
            reason: format!("missing '{SERVICE_REQUEST_RESPONSE_SEPARATOR}' separator"),
        })?;

    let request_text = lines[..separator].join("\n");
    let response_text = lines[separator + 1..].join("\n");

    let request = parse_message_string(
        pkg_name,
        &format!("{srv_name}{SERVICE_REQUEST_MESSAGE_SUFFIX}"),
        &request_text,
    )?;
    let response = parse_message_string(
        pkg_name,
        &format!("{srv_name}{SERVICE_RESPONSE_MESSAGE_SUFFIX}"),
        &response_text,
    )?;

    Ok(ServiceSpecification {
        pkg_name: pkg_name.to_string(),
        srv_name: srv_name.to_string(),
        request,
        response,
        text: service_string.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service() {
        let srv = parse_service_string(
            "rospy_tutorials",
            "AddTwoInts",
            "int64 a\nint64 b\n---\nint64 sum\n",
        )
        .unwrap();
        assert_eq!(srv.request.msg_name, "AddTwoIntsRequest");
        assert_eq!(srv.response.msg_name, "AddTwoIntsResponse");
        assert_eq!(srv.request.fields.len(), 2);
        assert_eq!(srv.response.fields.len(), 1);
        assert_eq!(srv.request.text, "int64 a\nint64 b");
        assert_eq!(srv.response.text, "int64 sum");
        assert_eq!(srv.full_name().to_string(), "rospy_tutorials/AddTwoInts");
    }

    #[test]
    fn test_empty_parts() {
        let srv = parse_service_string("std_srvs", "Empty", "---\n").unwrap();
        assert!(!srv.request.has_fields());
        assert!(!srv.response.has_fields());
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_service_string("p", "S", "int32 a\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidServiceSpecification { .. }));
    }

    #[test]
    fn test_constants_in_request() {
        let srv = parse_service_string("p", "S", "uint8 MODE_A=1\nuint8 mode\n---\nbool ok\n").unwrap();
        assert_eq!(srv.request.constants.len(), 1);
    }
}
