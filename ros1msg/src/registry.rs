//! Schema registry: resolves message references across packages
//!
//! Messages are looked up in memory first, then under
//! `<search path>/<package>/msg/<Name>.msg`. `std_msgs/Header` falls back to
//! the standard definition when no search path provides it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::msg::{
    HEADER_DEFINITION, MessageName, MessageSpecification, ParseError, ParseResult,
    ServiceSpecification, parse_message_file, parse_message_string,
};

/// Environment variable listing package search paths
pub const ROS_PACKAGE_PATH: &str = "ROS_PACKAGE_PATH";

/// Registry of parsed message schemas keyed by `package/Name`
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    specs: HashMap<MessageName, MessageSpecification>,
    search_paths: Vec<PathBuf>,
}

impl SchemaRegistry {
    /// Create an empty registry with no search paths
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry searching the given package roots
    pub fn with_search_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut registry = Self::new();
        for path in paths {
            registry.add_search_path(path);
        }
        registry
    }

    /// Create a registry searching the roots listed in `ROS_PACKAGE_PATH`
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var_os(ROS_PACKAGE_PATH) {
            Some(value) => Self::with_search_paths(std::env::split_paths(&value)),
            None => Self::new(),
        }
    }

    /// Add a package root to search
    pub fn add_search_path<P: AsRef<Path>>(&mut self, path: P) {
        self.search_paths.push(path.as_ref().to_path_buf());
    }

    /// Package roots searched, in order
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Register a parsed message, replacing any previous definition
    pub fn register(&mut self, spec: MessageSpecification) -> Option<MessageSpecification> {
        self.specs.insert(spec.full_name(), spec)
    }

    /// Register the request and response messages of a service
    pub fn register_service(&mut self, srv: &ServiceSpecification) {
        self.register(srv.request.clone());
        self.register(srv.response.clone());
    }

    /// Look up a registered message
    #[must_use]
    pub fn get(&self, name: &MessageName) -> Option<&MessageSpecification> {
        self.specs.get(name)
    }

    /// Look up a registered message, failing if it is missing
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnresolvedType`] if `name` is not registered.
    pub fn require(
        &self,
        name: &MessageName,
        referenced_from: &MessageName,
    ) -> ParseResult<&MessageSpecification> {
        self.specs.get(name).ok_or_else(|| ParseError::UnresolvedType {
            type_name: name.to_string(),
            referenced_from: referenced_from.to_string(),
        })
    }

    /// Check if a message is registered
    #[must_use]
    pub fn contains(&self, name: &MessageName) -> bool {
        self.specs.contains_key(name)
    }

    /// Number of registered messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if no message is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterate over registered messages in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &MessageSpecification> {
        self.specs.values()
    }

    /// Find the directory of a package under the search paths
    #[must_use]
    pub fn find_package_dir(&self, package: &str) -> Option<PathBuf> {
        self.search_paths.iter().find_map(|root| {
            let candidate = if root.ends_with(package) {
                root.clone()
            } else {
                root.join(package)
            };
            candidate.is_dir().then_some(candidate)
        })
    }

    /// All `.msg` and `.srv` files of a package, sorted
    #[must_use]
    pub fn package_files(&self, package: &str) -> Vec<PathBuf> {
        let Some(package_dir) = self.find_package_dir(package) else {
            return Vec::new();
        };

        let mut files = Vec::new();
        for subdir in ["msg", "srv"] {
            let Ok(entries) = std::fs::read_dir(package_dir.join(subdir)) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == subdir) {
                    files.push(path);
                }
            }
        }
        files.sort();
        files
    }

    fn load_from_search_paths(&self, name: &MessageName) -> ParseResult<Option<MessageSpecification>> {
        let Some(package_dir) = self.find_package_dir(&name.package) else {
            return Ok(None);
        };
        let path = package_dir.join("msg").join(format!("{}.msg", name.name));
        if !path.is_file() {
            return Ok(None);
        }
        debug!("loading {} from {}", name, path.display());
        parse_message_file(&name.package, &path).map(Some)
    }

    /// Get a message, loading it from the search paths if needed
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnresolvedType`] if the message cannot be found,
    /// or the parse error of the file that defines it.
    pub fn load(
        &mut self,
        name: &MessageName,
        referenced_from: &MessageName,
    ) -> ParseResult<&MessageSpecification> {
        if !self.specs.contains_key(name) {
            let spec = match self.load_from_search_paths(name)? {
                Some(spec) => spec,
                None if name.is_header() => {
                    debug!("using builtin definition of {name}");
                    parse_message_string(&name.package, &name.name, HEADER_DEFINITION)?
                }
                None => {
                    return Err(ParseError::UnresolvedType {
                        type_name: name.to_string(),
                        referenced_from: referenced_from.to_string(),
                    });
                }
            };
            self.specs.insert(name.clone(), spec);
        }
        self.require(name, referenced_from)
    }

    /// Load every message `name` depends on, transitively
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnresolvedType`] for a missing message and
    /// [`ParseError::CyclicDependency`] if a message embeds itself.
    pub fn resolve(&mut self, name: &MessageName) -> ParseResult<()> {
        let mut stack = Vec::new();
        let mut done = HashSet::new();
        self.resolve_inner(name, name, &mut stack, &mut done)
    }

    fn resolve_inner(
        &mut self,
        name: &MessageName,
        referenced_from: &MessageName,
        stack: &mut Vec<MessageName>,
        done: &mut HashSet<MessageName>,
    ) -> ParseResult<()> {
        if done.contains(name) {
            return Ok(());
        }
        if let Some(start) = stack.iter().position(|n| n == name) {
            let mut chain: Vec<String> = stack[start..].iter().map(ToString::to_string).collect();
            chain.push(name.to_string());
            return Err(ParseError::CyclicDependency { chain });
        }

        let dependencies = self.load(name, referenced_from)?.message_dependencies();
        stack.push(name.clone());
        for dependency in &dependencies {
            self.resolve_inner(dependency, name, stack, done)?;
        }
        stack.pop();
        done.insert(name.clone());
        Ok(())
    }
}
