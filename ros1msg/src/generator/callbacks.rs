//! Hooks for customizing generated code

use std::path::{Path, PathBuf};

use super::InterfaceKind;
use crate::msg::{Field, FieldType, MessageName};

/// Customization hooks, in the spirit of bindgen's `ParseCallbacks`
///
/// Naming hooks (`item_name`, `module_name`, `field_name`) are also consulted
/// when another message refers to a type, so they only see the type's
/// name and kind. The item hooks additionally get the source file and the
/// MD5 sum of the message being generated.
///
/// ```
/// use ros1msg::generator::{ItemInfo, ParseCallbacks};
///
/// struct Serde;
///
/// impl ParseCallbacks for Serde {
///     fn add_derives(&self, _info: &ItemInfo) -> Vec<String> {
///         vec!["serde::Serialize".to_string(), "serde::Deserialize".to_string()]
///     }
///
///     fn include_item(&self, info: &ItemInfo) -> bool {
///         info.package() != "test_msgs"
///     }
/// }
/// ```
pub trait ParseCallbacks: Send + Sync {
    /// Decide whether an input file is generated. Only the file is known
    /// at this point, so [`ItemInfo::md5sum`] is `None`.
    fn include_item(&self, _info: &ItemInfo) -> bool {
        true
    }

    /// Rename a generated struct
    fn item_name(&self, _info: &ItemInfo) -> Option<String> {
        None
    }

    /// Rename the module holding an interface. The result is snake-cased.
    fn module_name(&self, _info: &ItemInfo) -> Option<String> {
        None
    }

    /// Rename a struct field. The declared name stays in the MD5 and
    /// definition text.
    fn field_name(&self, _info: &FieldInfo) -> Option<String> {
        None
    }

    /// Extra derives for a struct. Traits the generator implements by hand
    /// (`Clone`, `PartialEq`, `Eq`, `Hash`, `Default`) are filtered out.
    fn add_derives(&self, _info: &ItemInfo) -> Vec<String> {
        Vec::new()
    }

    /// Attributes placed above a struct, e.g. `#[repr(C)]`
    fn add_attributes(&self, _info: &ItemInfo) -> Vec<String> {
        Vec::new()
    }

    /// Attributes placed above a field
    fn add_field_attributes(&self, _info: &FieldInfo) -> Vec<String> {
        Vec::new()
    }

    /// Rust source appended after a generated struct
    fn custom_impl(&self, _info: &ItemInfo) -> Option<String> {
        None
    }

    /// Text written before a `pub mod` line in a `mod.rs`
    fn pre_module(&self, _info: &ModuleInfo) -> Option<String> {
        None
    }

    /// Text written after a `pub mod` line in a `mod.rs`
    fn post_module(&self, _info: &ModuleInfo) -> Option<String> {
        None
    }
}

/// Which `mod.rs` a module is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleLevel {
    /// `pub mod std_msgs;` in the root `mod.rs`
    Package,
    /// `pub mod msg;` or `pub mod srv;` in a package `mod.rs`
    InterfaceKind(InterfaceKind),
    /// `pub mod header;` in a `msg/` or `srv/` `mod.rs`
    Type(InterfaceKind),
}

/// A module about to be declared in a `mod.rs`
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    module_name: String,
    package: String,
    level: ModuleLevel,
}

impl ModuleInfo {
    pub(super) fn new(module_name: &str, package: &str, level: ModuleLevel) -> Self {
        Self {
            module_name: module_name.to_string(),
            package: package.to_string(),
            level,
        }
    }

    /// Name in the `pub mod` line
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Package module the declaration belongs to
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Where the declaration is written
    #[must_use]
    pub fn module_level(&self) -> ModuleLevel {
        self.level
    }

    /// Path of the module from the output root, e.g. `std_msgs::msg::header`
    #[must_use]
    pub fn path(&self) -> String {
        match self.level {
            ModuleLevel::Package => self.module_name.clone(),
            ModuleLevel::InterfaceKind(_) => format!("{}::{}", self.package, self.module_name),
            ModuleLevel::Type(kind) => format!("{}::{kind}::{}", self.package, self.module_name),
        }
    }
}

/// A message, service or service part being generated
#[derive(Debug, Clone)]
pub struct ItemInfo {
    name: MessageName,
    interface_kind: InterfaceKind,
    source_file: Option<PathBuf>,
    md5sum: Option<String>,
}

impl ItemInfo {
    pub(super) fn new(name: MessageName, interface_kind: InterfaceKind) -> Self {
        Self {
            name,
            interface_kind,
            source_file: None,
            md5sum: None,
        }
    }

    pub(super) fn with_source_file(mut self, path: Option<&Path>) -> Self {
        self.source_file = path.map(Path::to_path_buf);
        self
    }

    pub(super) fn with_md5sum(mut self, md5sum: String) -> Self {
        self.md5sum = Some(md5sum);
        self
    }

    /// Type name as declared (`Header`, `AddTwoIntsRequest`)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name.name
    }

    /// Owning package
    #[must_use]
    pub fn package(&self) -> &str {
        &self.name.package
    }

    /// `package/Name`
    #[must_use]
    pub fn full_name(&self) -> &MessageName {
        &self.name
    }

    /// Whether this came from a `.msg` or a `.srv` file
    #[must_use]
    pub fn interface_kind(&self) -> InterfaceKind {
        self.interface_kind
    }

    /// The `.msg`/`.srv` file, when the item was read from one
    #[must_use]
    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    /// MD5 sum of the item
    #[must_use]
    pub fn md5sum(&self) -> Option<&str> {
        self.md5sum.as_deref()
    }
}

/// A field of a struct being generated
#[derive(Debug, Clone)]
pub struct FieldInfo {
    field: Field,
    rust_type: String,
    parent: MessageName,
}

impl FieldInfo {
    pub(super) fn new(field: &Field, rust_type: String, parent: MessageName) -> Self {
        Self {
            field: field.clone(),
            rust_type,
            parent,
        }
    }

    /// Field name as declared
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field.name
    }

    /// Declared ROS type (`uint8[]`, `std_msgs/Header`)
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field.field_type
    }

    /// Rust type the field is generated with
    #[must_use]
    pub fn rust_type(&self) -> &str {
        &self.rust_type
    }

    /// Message declaring the field
    #[must_use]
    pub fn parent(&self) -> &MessageName {
        &self.parent
    }

    /// Length of a fixed-size array field
    #[must_use]
    pub fn array_size(&self) -> Option<u32> {
        self.field.field_type.array_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_paths() {
        let kind = InterfaceKind::Message;
        assert_eq!(
            ModuleInfo::new("std_msgs", "std_msgs", ModuleLevel::Package).path(),
            "std_msgs"
        );
        let srv = ModuleLevel::InterfaceKind(InterfaceKind::Service);
        assert_eq!(
            ModuleInfo::new("srv", "rospy_tutorials", srv).path(),
            "rospy_tutorials::srv"
        );
        assert_eq!(
            ModuleInfo::new("header", "std_msgs", ModuleLevel::Type(kind)).path(),
            "std_msgs::msg::header"
        );
    }

    #[test]
    fn test_item_info() {
        let info = ItemInfo::new(MessageName::header(), InterfaceKind::Message);
        assert_eq!(info.name(), "Header");
        assert_eq!(info.package(), "std_msgs");
        assert!(info.source_file().is_none());
        assert!(info.md5sum().is_none());

        let info = info
            .with_source_file(Some(Path::new("std_msgs/msg/Header.msg")))
            .with_md5sum("2176decaecbce78abc3b96ef049fabed".to_string());
        assert_eq!(info.source_file(), Some(Path::new("std_msgs/msg/Header.msg")));
        assert_eq!(info.md5sum(), Some("2176decaecbce78abc3b96ef049fabed"));
    }

    #[test]
    fn test_field_info() {
        let field = Field::new(FieldType::new("int32[4]", Some("p")).unwrap(), "corners").unwrap();
        let info = FieldInfo::new(&field, "[i32; 4]".to_string(), MessageName::new("p", "Box"));
        assert_eq!(info.field_name(), "corners");
        assert_eq!(info.field_type().to_string(), "int32[4]");
        assert_eq!(info.rust_type(), "[i32; 4]");
        assert_eq!(info.parent().to_string(), "p/Box");
        assert_eq!(info.array_size(), Some(4));
    }
}
