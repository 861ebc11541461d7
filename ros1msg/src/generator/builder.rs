//! Builder interface for the code generator
//!
//! Files are processed sequentially: every input shares one schema registry,
//! so a dependency is parsed once no matter how many inputs embed it.
//! All code is generated in memory before the first file is written.
use super::{
    ConfigError, FileType, GeneratedCode, GeneratorResult, InterfaceKind,
    callbacks::{ItemInfo, ModuleInfo, ModuleLevel},
    codegen::{CodeGenerator, extract_package_name},
    config::{GeneratorConfig, package_module_name},
    write_atomic,
};
use crate::fingerprint::all_dependencies;
use crate::msg::MessageName;
use crate::msg::validation::{SERVICE_REQUEST_MESSAGE_SUFFIX, SERVICE_RESPONSE_MESSAGE_SUFFIX};
use crate::registry::SchemaRegistry;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Main generator builder (bindgen-style API)
///
/// # Example
///
/// ```no_run
/// use ros1msg::generator::Generator;
///
/// Generator::new()
///     .header("// Auto-generated - do not edit")
///     .package_search_path("/opt/ros/noetic/share")
///     .include("/opt/ros/noetic/share/std_msgs/msg/Header.msg")
///     .include_package("geometry_msgs")
///     .allowlist_recursively(true)
///     .output_dir("src/generated")
///     .generate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Generator {
    config: GeneratorConfig,
    input_files: Vec<PathBuf>,
    input_packages: Vec<String>,
}

impl Generator {
    /// Create a new generator with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::new(),
            input_files: Vec::new(),
            input_packages: Vec::new(),
        }
    }

    /// Create a generator from an existing configuration
    #[must_use]
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            input_files: Vec::new(),
            input_packages: Vec::new(),
        }
    }

    /// Add a header comment to generated files
    ///
    /// # Example
    ///
    /// ```
    /// use ros1msg::generator::Generator;
    ///
    /// let generator = Generator::new()
    ///     .header("// Auto-generated code - do not edit!");
    /// ```
    #[must_use]
    pub fn header<S: AsRef<str>>(mut self, header: S) -> Self {
        self.config.header = Some(header.as_ref().to_string());
        self
    }

    /// Generate `Debug` implementations (enabled by default)
    #[must_use]
    pub fn derive_debug(mut self, enable: bool) -> Self {
        let debug = "Debug".to_string();
        if enable {
            if !self.config.derives.contains(&debug) {
                self.config.derives.push(debug);
            }
        } else {
            self.config.derives.retain(|d| d != &debug);
        }
        self
    }

    /// Add a derive to every generated struct
    ///
    /// `Clone`, `PartialEq`, `Eq`, `Hash` and `Default` are always
    /// implemented by the generator and are ignored here.
    ///
    /// # Example
    ///
    /// ```
    /// use ros1msg::generator::Generator;
    ///
    /// let generator = Generator::new().derive("serde::Serialize");
    /// ```
    #[must_use]
    pub fn derive<S: AsRef<str>>(mut self, derive: S) -> Self {
        let derive = derive.as_ref().to_string();
        if !self.config.derives.contains(&derive) {
            self.config.derives.push(derive);
        }
        self
    }

    /// Add a raw line of code at the top of generated files
    ///
    /// # Example
    ///
    /// ```
    /// use ros1msg::generator::Generator;
    ///
    /// let generator = Generator::new()
    ///     .raw_line("#[allow(unused_imports)]")
    ///     .raw_line("use serde::{Serialize, Deserialize};");
    /// ```
    #[must_use]
    pub fn raw_line<S: AsRef<str>>(mut self, line: S) -> Self {
        self.config.raw_lines.push(line.as_ref().to_string());
        self
    }

    /// Set the path of the runtime crate in generated code (default: `::ros1_types`)
    ///
    /// # Example
    ///
    /// ```
    /// use ros1msg::generator::Generator;
    ///
    /// let generator = Generator::new().runtime_path("crate::runtime");
    /// ```
    #[must_use]
    pub fn runtime_path<S: AsRef<str>>(mut self, path: S) -> Self {
        self.config.runtime_path = path.as_ref().to_string();
        self
    }

    /// Set the prefix of `QUALIFIED_NAME` (default: `ros`)
    #[must_use]
    pub fn namespace<S: AsRef<str>>(mut self, namespace: S) -> Self {
        self.config.namespace = namespace.as_ref().to_string();
        self
    }

    /// Enable/disable emitting cargo:rerun-if-changed directives
    ///
    /// When enabled, prints cargo directives that can be used in build.rs
    /// to trigger rebuilds when source files change.
    #[must_use]
    pub fn emit_rerun_if_changed(mut self, enable: bool) -> Self {
        self.config.emit_rerun_if_changed = enable;
        self
    }

    /// Add an input file (`.msg` or `.srv`) to generate bindings for
    ///
    /// The file must live in a `<package>/msg/` or `<package>/srv/` directory.
    #[must_use]
    pub fn include<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.input_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Add multiple input files to generate bindings for
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ros1msg::generator::Generator;
    ///
    /// let files = vec![
    ///     "/opt/ros/noetic/share/std_msgs/msg/Header.msg",
    ///     "/opt/ros/noetic/share/std_msgs/msg/String.msg",
    /// ];
    ///
    /// Generator::new()
    ///     .includes(files)
    ///     .output_dir("src/generated")
    ///     .generate()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn includes<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.input_files
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Add every `.msg` and `.srv` file of a package found under the search paths
    #[must_use]
    pub fn include_package<S: AsRef<str>>(mut self, package: S) -> Self {
        self.input_packages.push(package.as_ref().to_string());
        self
    }

    /// Set output directory for generated files
    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set parse callbacks for customization
    ///
    /// # Example
    ///
    /// ```
    /// use ros1msg::generator::{Generator, ParseCallbacks, ItemInfo};
    ///
    /// struct MyCallbacks;
    /// impl ParseCallbacks for MyCallbacks {
    ///     fn item_name(&self, info: &ItemInfo) -> Option<String> {
    ///         Some(format!("Ros{}", info.name()))
    ///     }
    /// }
    ///
    /// let generator = Generator::new()
    ///     .parse_callbacks(Box::new(MyCallbacks));
    /// ```
    #[must_use]
    pub fn parse_callbacks<C: super::ParseCallbacks + 'static>(
        mut self,
        callbacks: Box<C>,
    ) -> Self {
        self.config.parse_callbacks = Some(Arc::from(callbacks as Box<dyn super::ParseCallbacks>));
        self
    }

    /// Also generate every message the inputs embed, transitively
    #[must_use]
    pub fn allowlist_recursively(mut self, enable: bool) -> Self {
        self.config.allowlist_recursively = enable;
        self
    }

    /// Add a directory to search for ROS1 packages
    ///
    /// Embedded messages are loaded from `<path>/<package>/msg/<Name>.msg`.
    ///
    /// # Example
    ///
    /// ```
    /// use ros1msg::generator::Generator;
    ///
    /// let generator = Generator::new()
    ///     .package_search_path("/opt/ros/noetic/share")
    ///     .package_search_path("/home/user/catkin_ws/src");
    /// ```
    #[must_use]
    pub fn package_search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config
            .package_search_paths
            .push(path.as_ref().to_path_buf());
        self
    }

    /// Add multiple directories to search for ROS1 packages
    #[must_use]
    pub fn package_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.config
            .package_search_paths
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Generate bindings and write to output directory
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory is not set, there is no
    /// input, a named package cannot be found, any input fails to parse or
    /// resolve, or a file cannot be written. Nothing is written when
    /// generation fails.
    pub fn generate(self) -> GeneratorResult<()> {
        let output_dir = self
            .config
            .output_dir
            .clone()
            .ok_or(ConfigError::OutputDirectoryRequired)?;

        if self.input_files.is_empty() && self.input_packages.is_empty() {
            return Err(ConfigError::NoInputFiles.into());
        }

        if syn::parse_str::<syn::Path>(&self.config.runtime_path).is_err() {
            return Err(ConfigError::InvalidRuntimePath {
                path: self.config.runtime_path.clone(),
            }
            .into());
        }

        let mut registry = SchemaRegistry::with_search_paths(&self.config.package_search_paths);
        let all_generated = self.generate_all_files(&mut registry)?;

        std::fs::create_dir_all(&output_dir)?;
        self.write_generated_files(&output_dir, &all_generated)?;

        info!(
            "generated {} interface files into {}",
            all_generated.len(),
            output_dir.display()
        );
        Ok(())
    }

    /// Every input file: explicit files first, then the files of each named package
    fn input_paths(&self, registry: &SchemaRegistry) -> GeneratorResult<Vec<PathBuf>> {
        let mut paths = self.input_files.clone();
        for package in &self.input_packages {
            let files = registry.package_files(package);
            if files.is_empty() {
                return Err(ConfigError::PackageNotFound {
                    package: package.clone(),
                }
                .into());
            }
            info!("generating messages for package [{package}]");
            paths.extend(files);
        }
        Ok(paths)
    }

    /// Generate all files including dependencies
    fn generate_all_files(
        &self,
        registry: &mut SchemaRegistry,
    ) -> GeneratorResult<Vec<GeneratedCode>> {
        let codegen = CodeGenerator::new(self.config.clone());

        let mut all_generated = Vec::new();
        for path in self.input_paths(registry)? {
            if !self.should_include(&path)? {
                debug!("skipping {}", path.display());
                continue;
            }
            all_generated.push(self.generate_single_file(&codegen, registry, &path)?);
        }

        if self.config.allowlist_recursively {
            let dependencies = self.dependency_closure(registry, &all_generated)?;
            for name in dependencies {
                all_generated.push(self.generate_dependency(&codegen, registry, &name)?);
            }
        }

        Ok(all_generated)
    }

    fn should_include(&self, path: &Path) -> GeneratorResult<bool> {
        let Some(cb) = &self.config.parse_callbacks else {
            return Ok(true);
        };
        let package = extract_package_name(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or(ConfigError::ModuleNameExtractionFailed)?;
        let kind = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileType::from_extension)
            .map_or(InterfaceKind::Message, |ft| ft.interface_kind());
        let info = ItemInfo::new(MessageName::new(package, name), kind).with_source_file(Some(path));
        Ok(cb.include_item(&info))
    }

    /// Messages embedded by the generated inputs that are not inputs themselves
    fn dependency_closure(
        &self,
        registry: &SchemaRegistry,
        generated: &[GeneratedCode],
    ) -> GeneratorResult<BTreeSet<MessageName>> {
        let mut roots = Vec::new();
        let mut input_messages = HashSet::new();
        for code in generated {
            let package = extract_package_name(&code.source_file)?;
            let name = code
                .source_file
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or(ConfigError::ModuleNameExtractionFailed)?;
            match code.file_type {
                FileType::Message => {
                    let message = MessageName::new(package, name);
                    input_messages.insert(message.clone());
                    roots.push(message);
                }
                FileType::Service => {
                    roots.push(MessageName::new(
                        &package,
                        format!("{name}{SERVICE_REQUEST_MESSAGE_SUFFIX}"),
                    ));
                    roots.push(MessageName::new(
                        &package,
                        format!("{name}{SERVICE_RESPONSE_MESSAGE_SUFFIX}"),
                    ));
                }
            }
        }

        let mut closure = BTreeSet::new();
        for root in &roots {
            let spec = registry.require(root, root)?;
            closure.extend(all_dependencies(registry, spec)?);
        }
        closure.retain(|name| !input_messages.contains(name));
        Ok(closure)
    }

    /// Generate code for a message pulled in as a dependency
    fn generate_dependency(
        &self,
        codegen: &CodeGenerator,
        registry: &SchemaRegistry,
        name: &MessageName,
    ) -> GeneratorResult<GeneratedCode> {
        let spec = registry.require(name, name)?;
        let source_file = registry
            .find_package_dir(&name.package)
            .map(|dir| dir.join("msg").join(format!("{}.msg", name.name)))
            .filter(|path| path.is_file());
        if self.config.emit_rerun_if_changed {
            if let Some(path) = &source_file {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
        debug!("generating dependency {name}");

        let kind = InterfaceKind::Message;
        Ok(GeneratedCode {
            code: codegen.generate_message(registry, spec, source_file.as_deref())?,
            source_file: source_file.unwrap_or_else(|| {
                PathBuf::from(&name.package)
                    .join("msg")
                    .join(format!("{}.msg", name.name))
            }),
            package_name: package_module_name(&name.package),
            module_name: self.config.transform_module_name(name, kind),
            file_type: FileType::Message,
            interface_kind: kind,
            dependencies: spec
                .message_dependencies()
                .into_iter()
                .map(|dep| dep.package)
                .filter(|p| p != &name.package)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        })
    }

    /// Write generated files to disk with proper package structure
    fn write_generated_files(
        &self,
        output_dir: &Path,
        all_generated: &[GeneratedCode],
    ) -> GeneratorResult<()> {
        // package -> kind -> module -> code; later duplicates of an output path are dropped
        let mut packages: BTreeMap<&str, BTreeMap<InterfaceKind, BTreeMap<&str, &GeneratedCode>>> =
            BTreeMap::new();
        for code in all_generated {
            packages
                .entry(code.package_name.as_str())
                .or_default()
                .entry(code.interface_kind)
                .or_default()
                .entry(code.module_name.as_str())
                .or_insert(code);
        }

        for (package_name, kinds) in &packages {
            let package_dir = output_dir.join(package_name);

            for (interface_kind, modules) in kinds {
                let kind_dir = package_dir.join(interface_kind.dir_name());
                for code in modules.values() {
                    let output_path = kind_dir.join(code.suggested_filename());
                    debug!("writing {}", output_path.display());
                    code.write_to_file(output_path)?;
                }

                let module_names: Vec<&str> = modules.keys().copied().collect();
                let kind_mod_rs =
                    self.generate_type_mod_rs(package_name, *interface_kind, &module_names);
                write_atomic(&kind_dir.join("mod.rs"), kind_mod_rs.as_bytes())?;
            }

            let kind_list: Vec<InterfaceKind> = kinds.keys().copied().collect();
            let package_mod_rs = self.generate_interface_mod_rs(package_name, &kind_list);
            write_atomic(&package_dir.join("mod.rs"), package_mod_rs.as_bytes())?;
        }

        let package_list: Vec<&str> = packages.keys().copied().collect();
        let root_mod_rs = self.generate_root_mod_rs(&package_list);
        write_atomic(&output_dir.join("mod.rs"), root_mod_rs.as_bytes())?;

        Ok(())
    }

    /// Generate code from a single file (internal helper)
    fn generate_single_file(
        &self,
        codegen: &CodeGenerator,
        registry: &mut SchemaRegistry,
        path: &Path,
    ) -> GeneratorResult<GeneratedCode> {
        if self.config.emit_rerun_if_changed {
            println!("cargo:rerun-if-changed={}", path.display());
        }

        codegen.generate_from_file(registry, path)
    }

    fn push_header(&self, content: &mut String, with_raw_lines: bool) {
        if let Some(header) = &self.config.header {
            content.push_str(header);
            content.push_str("\n\n");
        }

        if with_raw_lines {
            for raw in &self.config.raw_lines {
                content.push_str(raw);
                content.push('\n');
            }
            if !self.config.raw_lines.is_empty() {
                content.push('\n');
            }
        }
    }

    /// Write `pub mod <name>;` surrounded by the pre/post module callbacks
    fn push_module(&self, content: &mut String, info: &ModuleInfo, reexport: bool) {
        let callbacks = self.config.parse_callbacks.as_ref();
        if let Some(pre) = callbacks.and_then(|cb| cb.pre_module(info)) {
            content.push_str(&pre);
            if !pre.ends_with('\n') {
                content.push('\n');
            }
        }

        let module = info.module_name();
        let _ = writeln!(content, "pub mod {module};");
        if reexport {
            let _ = writeln!(content, "pub use {module}::*;");
        }

        if let Some(post) = callbacks.and_then(|cb| cb.post_module(info)) {
            content.push_str(&post);
            if !post.ends_with('\n') {
                content.push('\n');
            }
        }
    }

    /// Generate root mod.rs content (lists all packages)
    fn generate_root_mod_rs(&self, package_names: &[&str]) -> String {
        let mut content = String::new();
        self.push_header(&mut content, true);

        for package in package_names {
            let info = ModuleInfo::new(package, package, ModuleLevel::Package);
            self.push_module(&mut content, &info, false);
        }

        content
    }

    /// Generate package mod.rs content (lists the msg and srv modules)
    fn generate_interface_mod_rs(&self, package_name: &str, kinds: &[InterfaceKind]) -> String {
        let mut content = String::new();
        self.push_header(&mut content, false);

        for kind in kinds {
            let info =
                ModuleInfo::new(kind.dir_name(), package_name, ModuleLevel::InterfaceKind(*kind));
            self.push_module(&mut content, &info, false);
        }

        content
    }

    /// Generate type mod.rs content, re-exporting every type module
    fn generate_type_mod_rs(
        &self,
        package_name: &str,
        interface_kind: InterfaceKind,
        module_names: &[&str],
    ) -> String {
        let mut content = String::new();
        self.push_header(&mut content, false);

        for module in module_names {
            let info = ModuleInfo::new(module, package_name, ModuleLevel::Type(interface_kind));
            self.push_module(&mut content, &info, true);
        }

        content
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
