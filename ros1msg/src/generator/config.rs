//! Configuration for the code generator

use super::InterfaceKind;
use super::callbacks::{FieldInfo, ItemInfo, ParseCallbacks};
use crate::msg::MessageName;
use heck::ToSnakeCase;
use std::path::PathBuf;
use std::sync::Arc;

/// Default path of the runtime crate inside generated code
pub const DEFAULT_RUNTIME_PATH: &str = "::ros1_types";

/// Default prefix of `QUALIFIED_NAME`
pub const DEFAULT_NAMESPACE: &str = "ros";

/// Generator configuration
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Derives to add to all generated structs
    pub derives: Vec<String>,

    /// Raw lines to add at the top of generated files
    pub raw_lines: Vec<String>,

    /// Header comment to add to generated files
    pub header: Option<String>,

    /// Whether to emit cargo:rerun-if-changed directives
    pub emit_rerun_if_changed: bool,

    /// Parse callbacks for customization
    pub parse_callbacks: Option<Arc<dyn ParseCallbacks>>,

    /// Output directory for generated files
    pub output_dir: Option<PathBuf>,

    /// Whether to also generate every package the inputs depend on
    pub allowlist_recursively: bool,

    /// Package search paths for finding dependencies
    pub package_search_paths: Vec<PathBuf>,

    /// Path of the runtime crate as written in generated code
    pub runtime_path: String,

    /// Prefix of the qualified type name (`<namespace>.<pkg>.<Name>`)
    pub namespace: String,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("derives", &self.derives)
            .field("raw_lines", &self.raw_lines)
            .field("header", &self.header)
            .field("emit_rerun_if_changed", &self.emit_rerun_if_changed)
            .field("parse_callbacks", &self.parse_callbacks.is_some())
            .field("output_dir", &self.output_dir)
            .field("allowlist_recursively", &self.allowlist_recursively)
            .field("package_search_paths", &self.package_search_paths)
            .field("runtime_path", &self.runtime_path)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl GeneratorConfig {
    /// Create a new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            derives: vec!["Debug".to_string()],
            raw_lines: Vec::new(),
            header: None,
            emit_rerun_if_changed: false,
            parse_callbacks: None,
            output_dir: None,
            allowlist_recursively: false,
            package_search_paths: Vec::new(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Struct name of a message or service, after the `item_name` hook
    #[must_use]
    pub fn transform_item_name(&self, name: &MessageName, interface_kind: InterfaceKind) -> String {
        let renamed = self.parse_callbacks.as_ref().and_then(|cb| {
            cb.item_name(&ItemInfo::new(name.clone(), interface_kind))
        });
        sanitize_rust_identifier(renamed.as_deref().unwrap_or(&name.name))
    }

    /// Struct field name, after the `field_name` hook
    #[must_use]
    pub fn transform_field_name(&self, info: &FieldInfo) -> String {
        let renamed = self
            .parse_callbacks
            .as_ref()
            .and_then(|cb| cb.field_name(info));
        sanitize_rust_identifier(renamed.as_deref().unwrap_or(info.field_name()))
    }

    /// Module holding a message or service, after the `module_name` hook
    #[must_use]
    pub fn transform_module_name(&self, name: &MessageName, interface_kind: InterfaceKind) -> String {
        let renamed = self.parse_callbacks.as_ref().and_then(|cb| {
            cb.module_name(&ItemInfo::new(name.clone(), interface_kind))
        });
        sanitize_rust_identifier(&renamed.as_deref().unwrap_or(&name.name).to_snake_case())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Module name of a package
pub(crate) fn package_module_name(package: &str) -> String {
    sanitize_rust_identifier(&package.to_snake_case())
}

/// Sanitize an identifier to be valid Rust
///
/// - Escapes Rust keywords with r# prefix
/// - Appends `_` to keywords that cannot be raw identifiers
/// - Converts invalid characters to underscores
#[must_use]
pub fn sanitize_rust_identifier(name: &str) -> String {
    if matches!(name, "self" | "Self" | "super" | "crate" | "_") {
        return format!("{name}_");
    }

    if is_rust_keyword(name) {
        return format!("r#{name}");
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("_{sanitized}")
    } else {
        sanitized
    }
}

fn is_rust_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "break"
            | "const"
            | "continue"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "gen"
            | "macro"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
            | "try"
    )
}
