//! Rust structs from ROS1 `.msg`/`.srv` files
//!
//! A bindgen-style builder. Every input file becomes one `.rs` file under
//! `<output>/<package>/<msg|srv>/`, and `mod.rs` files tie the tree together.
//!
//! ```no_run
//! use ros1msg::generator::Generator;
//!
//! let share = "/opt/ros/noetic/share";
//! Generator::new()
//!     .header("// generated from std_msgs, do not edit")
//!     .raw_line("#![allow(clippy::all)]")
//!     .package_search_path(share)
//!     .include(format!("{share}/std_msgs/msg/Header.msg"))
//!     .include(format!("{share}/std_msgs/msg/String.msg"))
//!     .output_dir("generated")
//!     .emit_rerun_if_changed(true)
//!     .generate()
//!     .expect("std_msgs bindings");
//! ```

mod builder;
mod callbacks;
mod codegen;
mod config;
mod token_gen;
mod types;

pub use builder::Generator;
pub use callbacks::{FieldInfo, ItemInfo, ModuleInfo, ModuleLevel, ParseCallbacks};
pub use codegen::CodeGenerator;
pub use config::{DEFAULT_NAMESPACE, DEFAULT_RUNTIME_PATH, GeneratorConfig, sanitize_rust_identifier};
pub use types::TypeMapper;

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::msg::ParseError;

/// A generator set up with inputs it cannot use
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An input path without `.msg`/`.srv`
    #[error("Input has no extension")]
    NoFileExtension,

    /// An input that is neither `.msg` nor `.srv`
    #[error("Unsupported interface extension: .{extension}")]
    UnsupportedFileExtension {
        /// Extension found
        extension: String,
    },

    /// No `<package>/<msg|srv>/` directory above the input file
    #[error("No package directory above {}", path.display())]
    PackageNameExtractionFailed {
        /// Input file
        path: PathBuf,
    },

    /// The input file has no basename to name its module after
    #[error("Input file has no basename")]
    ModuleNameExtractionFailed,

    /// `generate` without `output_dir`
    #[error("No output directory set")]
    OutputDirectoryRequired,

    /// `generate` with nothing to generate
    #[error("No .msg/.srv inputs or packages given")]
    NoInputFiles,

    /// A named package was not found under the search paths
    #[error("Package '{package}' not found in search paths")]
    PackageNotFound {
        /// The missing package
        package: String,
    },

    /// The runtime path is not a valid Rust path
    #[error("Invalid runtime path: {path}")]
    InvalidRuntimePath {
        /// The rejected path
        path: String,
    },
}

/// Failure while emitting Rust
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Emitted tokens did not form a valid Rust file
    #[error("Generated code for {item} is not valid Rust: {source}")]
    InvalidTokens {
        /// Item being generated
        item: String,
        /// Underlying syntax error
        source: syn::Error,
    },
}

/// Any failure of [`Generator::generate`]
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A schema failed to parse or resolve
    #[error(transparent)]
    MsgParseError(#[from] ParseError),

    /// Reading inputs or writing the output tree failed
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Invalid generator configuration
    #[error(transparent)]
    ConfigError(#[from] ConfigError),

    /// Code generation failed
    #[error(transparent)]
    GenerationError(#[from] GenerationError),
}

#[allow(missing_docs)]
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Extension of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// `.msg`
    Message,
    /// `.srv`
    Service,
}

impl FileType {
    /// Extension without the dot
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Message => "msg",
            Self::Service => "srv",
        }
    }

    /// Inverse of [`FileType::extension`]
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "msg" => Some(Self::Message),
            "srv" => Some(Self::Service),
            _ => None,
        }
    }

    /// Interface kind produced from this file type
    #[must_use]
    pub fn interface_kind(&self) -> InterfaceKind {
        match self {
            Self::Message => InterfaceKind::Message,
            Self::Service => InterfaceKind::Service,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether generated code lands in `msg/` or `srv/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InterfaceKind {
    /// A plain message
    Message,
    /// A request/response pair
    Service,
}

impl InterfaceKind {
    /// `msg` or `srv`
    #[must_use]
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Message => "msg",
            Self::Service => "srv",
        }
    }

    /// Number of `super::` needed to reach the output root from a generated file
    #[must_use]
    pub const fn import_depth(&self) -> usize {
        // output/package/kind/file.rs
        3
    }
}

impl std::fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One generated `.rs` file, before it is written
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    /// Rust source
    pub code: String,

    /// `.msg`/`.srv` the code came from
    pub source_file: PathBuf,

    /// ROS package of the source file
    pub package_name: String,

    /// Module name (snake case of the file basename)
    pub module_name: String,

    /// Extension of `source_file`
    pub file_type: FileType,

    /// Interface kind, decides the msg/srv output directory
    pub interface_kind: InterfaceKind,

    /// Packages whose generated code this file references
    pub dependencies: Vec<String>,
}

impl GeneratedCode {
    /// Write the code to `path`
    ///
    /// The code goes to a temporary sibling first and is renamed into
    /// place, so `path` never holds a partially written file.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created or the file written
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> GeneratorResult<()> {
        write_atomic(path.as_ref(), self.code.as_bytes())?;
        Ok(())
    }

    /// `<module_name>.rs`
    #[must_use]
    pub fn suggested_filename(&self) -> String {
        format!("{}.rs", self.module_name)
    }
}

/// Write `contents` to `path` through a temporary file in the same directory
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_round_trip() {
        for ft in [FileType::Message, FileType::Service] {
            assert_eq!(FileType::from_extension(ft.extension()), Some(ft));
        }
        assert_eq!(FileType::from_extension("action"), None);
        assert_eq!(FileType::Service.interface_kind().dir_name(), "srv");
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.rs");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_atomic_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        std::fs::create_dir_all(target.join("inner")).unwrap();

        assert!(write_atomic(&target, b"code").is_err());
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["taken"]);
    }

    #[test]
    fn test_generated_code_write() {
        let dir = tempfile::tempdir().unwrap();
        let code = GeneratedCode {
            code: "pub struct A;\n".to_string(),
            source_file: PathBuf::from("pkg/msg/A.msg"),
            package_name: "pkg".to_string(),
            module_name: "a".to_string(),
            file_type: FileType::Message,
            interface_kind: InterfaceKind::Message,
            dependencies: Vec::new(),
        };
        let path = dir.path().join(code.suggested_filename());
        code.write_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), code.code);
    }
}
