/// Message specification parsing
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::errors::{ParseError, ParseResult};
use crate::msg::types::{Constant, Field, FieldType, MessageName, PrimitiveType};
use crate::msg::validation::{
    COMMENT_DELIMITER, CONSTANT_SEPARATOR, HEADER_PACKAGE, is_valid_message_name,
    is_valid_package_name,
};

/// Message specification
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageSpecification {
    /// Package name
    pub pkg_name: String,
    /// Message name
    pub msg_name: String,
    /// List of fields
    pub fields: Vec<Field>,
    /// List of constants
    pub constants: Vec<Constant>,
    /// Raw definition text
    pub text: String,
}

impl MessageSpecification {
    /// Create a new empty message specification
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidResourceName`] if the package name or message name are invalid.
    pub fn new(pkg_name: String, msg_name: String) -> ParseResult<Self> {
        if !is_valid_package_name(&pkg_name) {
            return Err(ParseError::InvalidResourceName {
                name: pkg_name,
                reason: "invalid package name pattern".to_string(),
            });
        }

        if !is_valid_message_name(&msg_name) {
            return Err(ParseError::InvalidResourceName {
                name: msg_name,
                reason: "invalid message name pattern".to_string(),
            });
        }

        Ok(MessageSpecification {
            pkg_name,
            msg_name,
            fields: Vec::new(),
            constants: Vec::new(),
            text: String::new(),
        })
    }

    /// The `package/Name` of this message
    #[must_use]
    pub fn full_name(&self) -> MessageName {
        MessageName::new(&self.pkg_name, &self.msg_name)
    }

    /// Add a field to the message
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::DuplicateName`] if a field with the same name exists.
    pub fn add_field(&mut self, field: Field) -> ParseResult<()> {
        if self.get_field(&field.name).is_some() {
            return Err(ParseError::DuplicateName {
                name: field.name,
                schema: self.full_name().to_string(),
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Add a constant to the message
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::DuplicateName`] if a constant with the same name exists.
    pub fn add_constant(&mut self, constant: Constant) -> ParseResult<()> {
        if self.get_constant(&constant.name).is_some() {
            return Err(ParseError::DuplicateName {
                name: constant.name,
                schema: self.full_name().to_string(),
            });
        }
        self.constants.push(constant);
        Ok(())
    }

    /// Get field by name
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get constant by name
    #[must_use]
    pub fn get_constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// Check if message has any fields
    #[must_use]
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Check if message has any constants
    #[must_use]
    pub fn has_constants(&self) -> bool {
        !self.constants.is_empty()
    }

    /// Check if this is `std_msgs/Header`
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.full_name().is_header()
    }

    /// Messages referenced directly by fields, in first-use order
    #[must_use]
    pub fn message_dependencies(&self) -> Vec<MessageName> {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .filter_map(|f| f.field_type.base_type.as_message())
            .filter(|name| seen.insert(*name))
            .cloned()
            .collect()
    }

    /// Packages the generated code for this message depends on
    ///
    /// Every package referenced by a field, plus `std_msgs` for the header
    /// unless this message is the header itself. Sorted, without this
    /// message's own package.
    #[must_use]
    pub fn package_dependencies(&self) -> Vec<String> {
        let mut packages: Vec<String> = self
            .message_dependencies()
            .into_iter()
            .map(|name| name.package)
            .collect();
        if !self.is_header() {
            packages.push(HEADER_PACKAGE.to_string());
        }
        packages.retain(|p| p != &self.pkg_name);
        packages.sort();
        packages.dedup();
        packages
    }
}

impl std::fmt::Display for MessageSpecification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# {}/{}", self.pkg_name, self.msg_name)?;

        for constant in &self.constants {
            writeln!(f, "{constant}")?;
        }

        if !self.constants.is_empty() && !self.fields.is_empty() {
            writeln!(f)?;
        }

        for field in &self.fields {
            writeln!(f, "{field}")?;
        }

        Ok(())
    }
}

/// Parse a message file
///
/// # Errors
///
/// Returns [`ParseError`] if the file cannot be read or the message format is invalid.
pub fn parse_message_file<P: AsRef<Path>>(
    pkg_name: &str,
    interface_filename: P,
) -> ParseResult<MessageSpecification> {
    let path = interface_filename.as_ref();
    let msg_name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ParseError::InvalidField {
            reason: "invalid filename".to_string(),
        })?;

    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_message_string(pkg_name, msg_name, &content)
}

/// Parse a message from string content
///
/// # Errors
///
/// Returns [`ParseError`] if the message format is invalid or a field or
/// constant name is declared twice.
pub fn parse_message_string(
    pkg_name: &str,
    msg_name: &str,
    message_string: &str,
) -> ParseResult<MessageSpecification> {
    let mut spec = MessageSpecification::new(pkg_name.to_string(), msg_name.to_string())?;
    spec.text = message_string.to_string();

    for (line_num, raw_line) in message_string.lines().enumerate() {
        let line = raw_line.replace('\t', " ");
        let content = line
            .split(COMMENT_DELIMITER)
            .next()
            .unwrap_or_default()
            .trim();
        if content.is_empty() {
            continue;
        }

        let parsed =
            parse_line_content(content, &line, pkg_name).map_err(|e| ParseError::LineParseError {
                schema: format!("{pkg_name}/{msg_name}"),
                line: line_num + 1,
                content: content.to_string(),
                source: Box::new(e),
            })?;

        match parsed {
            LineContent::Field(field) => spec.add_field(field)?,
            LineContent::Constant(constant) => spec.add_constant(constant)?,
        }
    }

    Ok(spec)
}

/// Content parsed from a line
enum LineContent {
    Field(Field),
    Constant(Constant),
}

/// Parse one declaration; `content` has its comment removed, `full_line`
/// keeps it for string constants.
fn parse_line_content(content: &str, full_line: &str, pkg_name: &str) -> ParseResult<LineContent> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    let type_string = tokens[0];

    if content.contains(CONSTANT_SEPARATOR) {
        let (name, value) = if type_string == PrimitiveType::String.name() {
            // Everything right of '=' is the value, '#' included.
            let declaration = full_line.trim_start();
            let rest = &declaration[type_string.len()..];
            let (name, value) =
                rest.split_once(CONSTANT_SEPARATOR)
                    .ok_or_else(|| ParseError::InvalidConstant {
                        reason: "missing '='".to_string(),
                    })?;
            (name.trim().to_string(), value.to_string())
        } else {
            let joined = tokens[1..].join(" ");
            let parts: Vec<&str> = joined.split(CONSTANT_SEPARATOR).map(str::trim).collect();
            match parts.as_slice() {
                [name, value] => ((*name).to_string(), (*value).to_string()),
                _ => {
                    return Err(ParseError::InvalidConstant {
                        reason: "expected exactly one '='".to_string(),
                    });
                }
            }
        };
        return Constant::new(type_string, &name, &value).map(LineContent::Constant);
    }

    if tokens.len() != 2 {
        return Err(ParseError::InvalidField {
            reason: format!("expected '<type> <name>', found {} tokens", tokens.len()),
        });
    }

    let field_type = FieldType::new(type_string, Some(pkg_name))?;
    Field::new(field_type, tokens[1]).map(LineContent::Field)
}
