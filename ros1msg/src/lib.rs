#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! # ROS1 Message Generator
//!
//! Parses ROS1 `.msg` and `.srv` files, computes their MD5 fingerprints and
//! full definition text, and generates Rust types implementing the ROS1
//! wire format on top of the `ros1-types` runtime.
//!
//! ## Quick Start
//!
//! ```rust
//! use ros1msg::{SchemaRegistry, compute_md5, parse_message_string};
//!
//! let spec = parse_message_string("std_msgs", "String", "string data\n")?;
//! let registry = SchemaRegistry::new();
//! assert_eq!(compute_md5(&registry, &spec)?, "992ce8a1687cec8c8bd883ec73ca41d1");
//! # Ok::<(), ros1msg::ParseError>(())
//! ```
//!
//! ## Modules
//!
//! - [`msg`]: `.msg`/`.srv` parser and schema model
//! - [`registry`]: cross-package type resolution
//! - [`fingerprint`]: MD5 sums and full definition text
//! - [`layout`]: per-field wire layout shared by the generator and the dynamic codec
//! - [`dynamic`]: schema-interpreted encoder/decoder
//! - [`generator`]: bindgen-style Rust code generator

/// ROS1 Message/Service parser
pub mod msg;

/// Schema registry and package search
pub mod registry;

/// MD5 fingerprints and full definition text
pub mod fingerprint;

/// Wire layout of messages
pub mod layout;

/// Dynamic codec over parsed schemas
pub mod dynamic;

/// Code generator for ROS1 interfaces
///
/// This module provides a bindgen-style API for generating Rust code from
/// ROS1 message and service files.
pub mod generator;

pub use fingerprint::{
    all_dependencies, compute_full_text, compute_md5, compute_md5_text, compute_service_md5,
};
pub use msg::{
    Arity, BaseType, Constant, Field, FieldType, InterfaceSpecification, MessageName,
    MessageSpecification, ParseError, ParseResult, PrimitiveType, PrimitiveValue,
    ServiceSpecification, is_valid_constant_name, is_valid_field_name, is_valid_message_name,
    is_valid_package_name, parse_interface_file, parse_message_file, parse_message_string,
    parse_primitive_value_string, parse_service_file, parse_service_string,
};
pub use registry::SchemaRegistry;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
