//! Code generation implementation

#![allow(clippy::too_many_lines)]

use super::{
    ConfigError, FileType, GeneratedCode, GenerationError, GeneratorResult, InterfaceKind,
    callbacks::{FieldInfo, ItemInfo},
    config::{GeneratorConfig, package_module_name, sanitize_rust_identifier},
    token_gen::{
        self, CodecField, ConstantDef, FieldDefault, MessageMetadata, StructField,
    },
    types::TypeMapper,
};
use crate::fingerprint::{compute_full_text, compute_md5, compute_service_md5};
use crate::layout::FieldLayout;
use crate::msg::{
    InterfaceSpecification, MessageName, MessageSpecification, ServiceSpecification,
    parse_interface_file,
};
use crate::registry::SchemaRegistry;
use proc_macro2::TokenStream;
use std::path::Path;
use tracing::debug;

/// Derives the generator always implements itself
const MANUAL_TRAITS: [&str; 5] = ["Clone", "PartialEq", "Eq", "Hash", "Default"];

/// Code generator implementation
pub struct CodeGenerator {
    config: GeneratorConfig,
    type_mapper: TypeMapper,
}

impl CodeGenerator {
    /// Create a new code generator with the given configuration
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let type_mapper = TypeMapper::with_runtime_path(&config.runtime_path);
        Self {
            config,
            type_mapper,
        }
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate code from a `.msg` or `.srv` file
    ///
    /// The parsed interface is registered in `registry` and its
    /// dependencies are loaded from the registry's search paths.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file has no extension or an unsupported one
    /// - The package name cannot be extracted
    /// - The file cannot be parsed or a dependency cannot be resolved
    /// - Code generation fails
    pub fn generate_from_file(
        &self,
        registry: &mut SchemaRegistry,
        path: &Path,
    ) -> GeneratorResult<GeneratedCode> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(ConfigError::NoFileExtension)?;

        let file_type = FileType::from_extension(extension).ok_or_else(|| {
            ConfigError::UnsupportedFileExtension {
                extension: extension.to_string(),
            }
        })?;

        let package = extract_package_name(path)?;
        debug!("generating {} from {}", file_type, path.display());

        let spec = parse_interface_file(&package, path)?;
        let interface_kind = file_type.interface_kind();
        let module_name = self.config.transform_module_name(
            &MessageName::new(&package, spec.interface_name()),
            interface_kind,
        );
        let code = self.generate_interface(registry, &spec, Some(path))?;

        Ok(GeneratedCode {
            code,
            source_file: path.to_path_buf(),
            package_name: package_module_name(&package),
            module_name,
            file_type,
            interface_kind,
            dependencies: referenced_packages(&spec),
        })
    }

    /// Register `spec`, resolve everything it embeds and generate its code
    ///
    /// `source_file` is passed on to the item callbacks.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency cannot be resolved or code
    /// generation fails.
    pub fn generate_interface(
        &self,
        registry: &mut SchemaRegistry,
        spec: &InterfaceSpecification,
        source_file: Option<&Path>,
    ) -> GeneratorResult<String> {
        match spec {
            InterfaceSpecification::Message(msg) => {
                registry.register(msg.clone());
                registry.resolve(&msg.full_name())?;
                self.generate_message(registry, msg, source_file)
            }
            InterfaceSpecification::Service(srv) => {
                registry.register_service(srv);
                registry.resolve(&srv.request.full_name())?;
                registry.resolve(&srv.response.full_name())?;
                self.generate_service(registry, srv, source_file)
            }
        }
    }

    /// Generate the source unit of a message
    ///
    /// Every message `spec` embeds must already be in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency is missing or the emitted code does
    /// not form valid Rust.
    pub fn generate_message(
        &self,
        registry: &SchemaRegistry,
        spec: &MessageSpecification,
        source_file: Option<&Path>,
    ) -> GeneratorResult<String> {
        let tokens = self.message_tokens(registry, spec, InterfaceKind::Message, source_file)?;
        self.render(&spec.full_name().to_string(), tokens)
    }

    /// Generate the source unit of a service: request, response and the
    /// service marker type
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency is missing or the emitted code does
    /// not form valid Rust.
    pub fn generate_service(
        &self,
        registry: &SchemaRegistry,
        srv: &ServiceSpecification,
        source_file: Option<&Path>,
    ) -> GeneratorResult<String> {
        let kind = InterfaceKind::Service;
        let mut tokens = self.message_tokens(registry, &srv.request, kind, source_file)?;
        tokens.extend(self.message_tokens(registry, &srv.response, kind, source_file)?);

        let name = self.config.transform_item_name(&srv.full_name(), kind);
        let request = self
            .config
            .transform_item_name(&srv.request.full_name(), kind);
        let response = self
            .config
            .transform_item_name(&srv.response.full_name(), kind);
        let data_type = srv.full_name().to_string();
        let md5sum = compute_service_md5(registry, srv)?;

        tokens.push(token_gen::generate_service_impl(
            &name,
            &format!("`{data_type}` service"),
            &self.config.runtime_path,
            &request,
            &response,
            &data_type,
            &md5sum,
        ));

        self.render(&data_type, tokens)
    }

    fn render(&self, item: &str, tokens: Vec<TokenStream>) -> GeneratorResult<String> {
        let body = token_gen::format_token_streams(tokens).map_err(|source| {
            GenerationError::InvalidTokens {
                item: item.to_string(),
                source,
            }
        })?;

        let mut output = String::new();
        if let Some(header) = &self.config.header {
            output.push_str(header);
            output.push_str("\n\n");
        }
        for line in &self.config.raw_lines {
            output.push_str(line);
            output.push('\n');
        }
        if !self.config.raw_lines.is_empty() {
            output.push('\n');
        }
        output.push_str(&body);
        Ok(output)
    }

    fn item_derives(&self, info: &ItemInfo) -> (Vec<String>, Vec<String>) {
        let mut derives = self.config.derives.clone();
        let mut attributes = Vec::new();
        if let Some(cb) = &self.config.parse_callbacks {
            derives.extend(cb.add_derives(info));
            attributes = cb.add_attributes(info);
        }

        let mut seen = std::collections::HashSet::new();
        derives.retain(|d| !MANUAL_TRAITS.contains(&d.as_str()) && seen.insert(d.clone()));
        (derives, attributes)
    }

    /// Every item generated for one message
    fn message_tokens(
        &self,
        registry: &SchemaRegistry,
        spec: &MessageSpecification,
        interface_kind: InterfaceKind,
        source_file: Option<&Path>,
    ) -> GeneratorResult<Vec<TokenStream>> {
        let full_name = spec.full_name();
        let md5sum = compute_md5(registry, spec)?;
        let struct_name = self.config.transform_item_name(&full_name, interface_kind);
        let info = ItemInfo::new(full_name.clone(), interface_kind)
            .with_source_file(source_file)
            .with_md5sum(md5sum.clone());
        let (derives, attributes) = self.item_derives(&info);

        let mut fields = Vec::with_capacity(spec.fields.len());
        let mut defaults = Vec::with_capacity(spec.fields.len());
        let mut codec_fields = Vec::with_capacity(spec.fields.len());
        for field in &spec.fields {
            let rust_type = self.type_mapper.map_type(&field.field_type, &self.config);
            let field_info = FieldInfo::new(field, rust_type.clone(), full_name.clone());
            let field_name = self.config.transform_field_name(&field_info);
            let field_attrs = self
                .config
                .parse_callbacks
                .as_ref()
                .map(|cb| cb.add_field_attributes(&field_info))
                .unwrap_or_default();

            defaults.push(FieldDefault::new(
                field_name.clone(),
                self.type_mapper.default_value(&field.field_type),
            ));
            codec_fields.push(CodecField {
                name: field_name.clone(),
                layout: FieldLayout::from_field(field),
                element_type: self
                    .type_mapper
                    .map_base_type(&field.field_type.base_type, &self.config),
            });
            fields.push(StructField {
                name: field_name,
                rust_type,
                attributes: field_attrs,
            });
        }

        let constants: Vec<ConstantDef> = spec
            .constants
            .iter()
            .map(|c| {
                ConstantDef::new(
                    sanitize_rust_identifier(&c.name),
                    self.type_mapper.constant_type(c.primitive_type),
                    self.type_mapper.constant_value(&c.value),
                )
            })
            .collect();

        let data_type = full_name.to_string();
        let metadata = MessageMetadata {
            md5sum,
            definition: compute_full_text(registry, spec)?,
            qualified_name: self.qualified_name(spec),
            data_type: data_type.clone(),
        };

        let runtime = &self.config.runtime_path;
        let field_names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();

        let mut tokens = vec![
            token_gen::generate_struct(
                &struct_name,
                &format!("`{data_type}` message"),
                &derives,
                &attributes,
                &fields,
            ),
            token_gen::generate_default_impl(&struct_name, &defaults),
            token_gen::generate_constants_impl(&struct_name, &constants),
            token_gen::generate_message_impl(&struct_name, runtime, &metadata, &codec_fields),
            token_gen::generate_clone_impl(&struct_name, runtime),
            token_gen::generate_eq_impls(&struct_name, runtime, &field_names),
            token_gen::generate_hash_impls(&struct_name, runtime, &field_names),
        ];

        let custom_impl = self
            .config
            .parse_callbacks
            .as_ref()
            .and_then(|cb| cb.custom_impl(&info));
        if let Some(custom_impl) = custom_impl {
            let impl_tokens = custom_impl.parse::<TokenStream>().map_err(|e| {
                GenerationError::InvalidTokens {
                    item: data_type.clone(),
                    source: syn::Error::new(proc_macro2::Span::call_site(), e),
                }
            })?;
            tokens.push(impl_tokens);
        }

        Ok(tokens)
    }

    fn qualified_name(&self, spec: &MessageSpecification) -> String {
        if self.config.namespace.is_empty() {
            format!("{}.{}", spec.pkg_name, spec.msg_name)
        } else {
            format!(
                "{}.{}.{}",
                self.config.namespace, spec.pkg_name, spec.msg_name
            )
        }
    }
}

/// Package owning an interface file: the directory above `msg/` or `srv/`
pub(super) fn extract_package_name(path: &Path) -> GeneratorResult<String> {
    let components: Vec<_> = path.components().collect();

    for (i, component) in components.iter().enumerate().rev() {
        if let Some(dir) = component.as_os_str().to_str()
            && matches!(dir, "msg" | "srv")
            && i > 0
            && let Some(pkg) = components[i - 1].as_os_str().to_str()
        {
            return Ok(pkg.to_string());
        }
    }

    Err(ConfigError::PackageNameExtractionFailed {
        path: path.to_path_buf(),
    }
    .into())
}

/// Packages whose generated modules the interface's code refers to
fn referenced_packages(spec: &InterfaceSpecification) -> Vec<String> {
    let mut packages: Vec<String> = spec
        .messages()
        .iter()
        .flat_map(|m| m.message_dependencies())
        .map(|name| name.package)
        .filter(|p| p != spec.package_name())
        .collect();
    packages.sort();
    packages.dedup();
    packages
}
