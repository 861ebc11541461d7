//! Errors raised while reading, parsing and resolving ROS1 schemas

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read, parse or resolve a `.msg`/`.srv` schema
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum ParseError {
    /// A package, message, field or constant name breaks the ROS1 naming rules
    #[error("Invalid name '{name}': {reason}")]
    InvalidResourceName { name: String, reason: String },

    /// A type token that is neither a builtin nor `[pkg/]Name`, or a bad array suffix
    #[error("Invalid type '{type_string}': {reason}")]
    InvalidType { type_string: String, reason: String },

    /// A constant literal that does not fit its builtin type
    #[error("Invalid {type_info} value '{value}': {reason}")]
    InvalidValue {
        value: String,
        type_info: String,
        reason: String,
    },

    /// A `.srv` file that is not `request --- response`
    #[error("Invalid service: {reason}")]
    InvalidServiceSpecification { reason: String },

    /// A schema line that could not be parsed
    #[error("{schema} line {line} ('{content}'): {source}")]
    LineParseError {
        schema: String,
        line: usize,
        content: String,
        source: Box<ParseError>,
    },

    /// A schema file that could not be read
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file that is neither `.msg` nor `.srv`
    #[error("Not a ROS1 interface file: {}", path.display())]
    UnsupportedInterface { path: PathBuf },

    #[error("Invalid constant definition: {reason}")]
    InvalidConstant { reason: String },

    #[error("Invalid field definition: {reason}")]
    InvalidField { reason: String },

    /// Two fields, or two constants, of one schema share a name
    #[error("Duplicate name '{name}' in {schema}")]
    DuplicateName { name: String, schema: String },

    /// A composite type found neither in the registry nor on the search path
    #[error("Unresolved type {type_name} referenced from {referenced_from}")]
    UnresolvedType {
        type_name: String,
        referenced_from: String,
    },

    /// A schema that embeds itself through its fields
    #[error("Cyclic type reference: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub(crate) fn invalid_name(name: &str, pattern: &str) -> Self {
        Self::InvalidResourceName {
            name: name.to_string(),
            reason: format!("should match {pattern}"),
        }
    }

    pub(crate) fn invalid_value(value: &str, type_info: &str, reason: &str) -> Self {
        Self::InvalidValue {
            value: value.to_string(),
            type_info: type_info.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_type(type_string: &str, reason: &str) -> Self {
        Self::InvalidType {
            type_string: type_string.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Innermost error, looking through line context
    #[must_use]
    pub fn root_cause(&self) -> &ParseError {
        match self {
            Self::LineParseError { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
