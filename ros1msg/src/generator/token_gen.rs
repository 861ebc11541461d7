//! TokenStream-based code generation utilities
//!
//! This module provides helper functions for generating Rust code using
//! proc-macro2 `TokenStreams` and the quote macro. The generated code is
//! formatted using prettyplease for consistent output.

use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::quote;
use std::str::FromStr;

use crate::layout::{Element, FieldLayout, Framing};
use crate::msg::PrimitiveType;

/// Parse a type string into a `TokenStream`
///
/// Handles types like:
/// - `u32`, `i64`, `bool`
/// - `::std::vec::Vec<u8>`
/// - `[f64; 9]`
/// - `super::super::super::pkg::msg::name::Name`
pub(super) fn parse_type(type_str: &str) -> TokenStream {
    let type_str = type_str.trim();
    if let Ok(tokens) = TokenStream::from_str(type_str) {
        return tokens;
    }

    // Fallback: create as identifier (shouldn't happen with valid types)
    let ident = Ident::new(type_str, Span::call_site());
    quote! { #ident }
}

/// Parse a derive name into tokens
pub(super) fn parse_derive(derive_str: &str) -> TokenStream {
    // Handle derives with paths like "serde::Serialize"
    if let Ok(tokens) = TokenStream::from_str(derive_str) {
        return tokens;
    }

    let ident = Ident::new(derive_str, Span::call_site());
    quote! { #ident }
}

/// Create a field identifier, handling raw identifiers like `r#type`
pub(super) fn field_ident(name: &str) -> TokenStream {
    if let Some(raw_name) = name.strip_prefix("r#") {
        let ident = Ident::new_raw(raw_name, Span::call_site());
        return quote! { #ident };
    }

    let ident = Ident::new(name, Span::call_site());
    quote! { #ident }
}

fn struct_ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

/// Parse an attribute string into tokens
///
/// The input should be a complete attribute like `#[serde(skip)]`
fn parse_attribute(attr_str: &str) -> Option<TokenStream> {
    TokenStream::from_str(attr_str).ok()
}

fn parse_expr(value_str: &str) -> TokenStream {
    if let Ok(tokens) = TokenStream::from_str(value_str) {
        return tokens;
    }

    quote! { ::core::default::Default::default() }
}

fn usize_literal(value: usize) -> Literal {
    Literal::usize_unsuffixed(value)
}

/// Generate a struct definition with derives and attributes
pub(super) fn generate_struct(
    name: &str,
    doc: &str,
    derives: &[String],
    custom_attrs: &[String],
    fields: &[StructField],
) -> TokenStream {
    let struct_name = struct_ident(name);

    let derive_tokens: Vec<TokenStream> = derives.iter().map(|d| parse_derive(d)).collect();

    let attr_tokens: Vec<TokenStream> = custom_attrs
        .iter()
        .filter_map(|a| parse_attribute(a))
        .collect();

    let field_tokens: Vec<TokenStream> = fields
        .iter()
        .map(|f| {
            let field_name = field_ident(&f.name);
            let field_type = parse_type(&f.rust_type);
            let attrs: Vec<TokenStream> = f
                .attributes
                .iter()
                .filter_map(|a| parse_attribute(a))
                .collect();

            quote! {
                #(#attrs)*
                pub #field_name: #field_type,
            }
        })
        .collect();

    let derives_attr = if derive_tokens.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#derive_tokens),*)] }
    };

    quote! {
        #[doc = #doc]
        #derives_attr
        #[allow(non_snake_case)]
        #(#attr_tokens)*
        pub struct #struct_name {
            #(#field_tokens)*
        }
    }
}

/// Generate a Default implementation
pub(super) fn generate_default_impl(name: &str, field_defaults: &[FieldDefault]) -> TokenStream {
    let struct_name = struct_ident(name);

    let field_inits: Vec<TokenStream> = field_defaults
        .iter()
        .map(|f| {
            let field_name = field_ident(&f.name);
            let default_value = parse_expr(&f.default_value);

            quote! {
                #field_name: #default_value,
            }
        })
        .collect();

    quote! {
        impl ::core::default::Default for #struct_name {
            #[inline]
            fn default() -> Self {
                Self {
                    #(#field_inits)*
                }
            }
        }
    }
}

/// Generate constants in an impl block
pub(super) fn generate_constants_impl(struct_name: &str, constants: &[ConstantDef]) -> TokenStream {
    if constants.is_empty() {
        return quote! {};
    }

    let name = struct_ident(struct_name);

    let const_tokens: Vec<TokenStream> = constants
        .iter()
        .map(|c| {
            let const_name = struct_ident(&c.name);
            let const_type = parse_type(&c.rust_type);
            let const_value = parse_expr(&c.value);

            quote! {
                pub const #const_name: #const_type = #const_value;
            }
        })
        .collect();

    quote! {
        #[allow(non_upper_case_globals)]
        impl #name {
            #(#const_tokens)*
        }
    }
}

fn wire_suffix(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Bool => "bool",
        PrimitiveType::Int8 | PrimitiveType::Byte => "i8",
        PrimitiveType::UInt8 | PrimitiveType::Char => "u8",
        PrimitiveType::Int16 => "i16",
        PrimitiveType::UInt16 => "u16",
        PrimitiveType::Int32 => "i32",
        PrimitiveType::UInt32 => "u32",
        PrimitiveType::Int64 => "i64",
        PrimitiveType::UInt64 => "u64",
        PrimitiveType::Float32 => "f32",
        PrimitiveType::Float64 => "f64",
        PrimitiveType::String => "string",
        PrimitiveType::Time => "time",
        PrimitiveType::Duration => "duration",
    }
}

fn wire_method(prefix: &str, primitive: PrimitiveType) -> Ident {
    Ident::new(
        &format!("{prefix}_{}", wire_suffix(primitive)),
        Span::call_site(),
    )
}

fn is_byte_buffer(field: &CodecField) -> bool {
    matches!(
        field.layout.element,
        Element::Fixed {
            primitive: PrimitiveType::UInt8 | PrimitiveType::Char,
            ..
        }
    ) && field.layout.framing == Framing::Prefixed
}

/// Encoded length of the value-dependent part of a field, `None` if it is fixed
fn dynamic_length(rt: &TokenStream, field: &CodecField) -> Option<TokenStream> {
    let f = field_ident(&field.name);
    let items = match &field.layout.element {
        Element::Fixed { width, .. } => {
            let width = usize_literal(*width);
            match field.layout.framing {
                Framing::Prefixed => quote! { #width * self.#f.len() },
                Framing::Scalar | Framing::Fixed(_) => return None,
            }
        }
        Element::String => match field.layout.framing {
            Framing::Scalar => quote! { #rt::LENGTH_PREFIX_SIZE + self.#f.len() },
            Framing::Fixed(_) | Framing::Prefixed => quote! {
                self.#f
                    .iter()
                    .map(|item| #rt::LENGTH_PREFIX_SIZE + item.len())
                    .sum::<usize>()
            },
        },
        Element::Message(_) => match field.layout.framing {
            Framing::Scalar => quote! { #rt::RosMessage::serialization_length(&self.#f) },
            Framing::Fixed(_) | Framing::Prefixed => quote! {
                self.#f
                    .iter()
                    .map(#rt::RosMessage::serialization_length)
                    .sum::<usize>()
            },
        },
    };

    Some(match field.layout.framing {
        Framing::Prefixed => quote! { #rt::LENGTH_PREFIX_SIZE + #items },
        Framing::Scalar | Framing::Fixed(_) => items,
    })
}

fn serialization_length_body(rt: &TokenStream, fields: &[CodecField]) -> TokenStream {
    let fixed: usize = fields.iter().filter_map(|f| f.layout.fixed_size()).sum();
    let mut terms: Vec<TokenStream> = Vec::new();
    if fixed > 0 || fields.iter().all(|f| f.layout.fixed_size().is_some()) {
        let fixed = usize_literal(fixed);
        terms.push(quote! { #fixed });
    }
    terms.extend(fields.iter().filter_map(|f| dynamic_length(rt, f)));
    quote! { #(#terms)+* }
}

/// Write statements for one element; `value` is the element by value,
/// `reference` a reference to it
fn write_element(
    rt: &TokenStream,
    element: &Element,
    value: &TokenStream,
    reference: &TokenStream,
) -> TokenStream {
    match element {
        Element::Fixed {
            primitive: primitive @ (PrimitiveType::Time | PrimitiveType::Duration),
            ..
        } => {
            let method = wire_method("write", *primitive);
            quote! { writer.#method(#reference); }
        }
        Element::Fixed { primitive, .. } => {
            let method = wire_method("write", *primitive);
            quote! { writer.#method(#value); }
        }
        Element::String => quote! { writer.write_string(#reference)?; },
        Element::Message(_) => quote! { #rt::RosMessage::serialize(#reference, writer)?; },
    }
}

fn serialize_field(rt: &TokenStream, field: &CodecField) -> TokenStream {
    let f = field_ident(&field.name);
    if is_byte_buffer(field) {
        return quote! {
            writer.write_len(self.#f.len())?;
            writer.write_bytes(&self.#f);
        };
    }

    let element = &field.layout.element;
    match field.layout.framing {
        Framing::Scalar => write_element(rt, element, &quote! { self.#f }, &quote! { &self.#f }),
        Framing::Fixed(_) => {
            let write = write_element(rt, element, &quote! { *item }, &quote! { item });
            quote! {
                for item in &self.#f {
                    #write
                }
            }
        }
        Framing::Prefixed => {
            let write = write_element(rt, element, &quote! { *item }, &quote! { item });
            quote! {
                writer.write_len(self.#f.len())?;
                for item in &self.#f {
                    #write
                }
            }
        }
    }
}

/// Expression reading one element, evaluating to `Result<T>`
fn read_element(rt: &TokenStream, field: &CodecField) -> TokenStream {
    match &field.layout.element {
        Element::Fixed { primitive, .. } => {
            let method = wire_method("read", *primitive);
            quote! { reader.#method() }
        }
        Element::String => quote! { reader.read_string() },
        Element::Message(_) => {
            let ty = parse_type(&field.element_type);
            quote! { <#ty as #rt::RosMessage>::deserialize(reader) }
        }
    }
}

fn deserialize_field(rt: &TokenStream, field: &CodecField) -> TokenStream {
    let f = field_ident(&field.name);
    if is_byte_buffer(field) {
        return quote! {
            #f: {
                let len = reader.read_len()?;
                reader.read_bytes(len)?.to_vec()
            },
        };
    }

    let read = read_element(rt, field);
    let value = match field.layout.framing {
        Framing::Scalar => quote! { #read? },
        Framing::Fixed(_) => quote! { reader.read_array(|reader| #read)? },
        Framing::Prefixed => quote! { reader.read_sequence(|reader| #read)? },
    };
    quote! { #f: #value, }
}

/// Generate the `RosMessage` implementation: metadata and the wire codec
pub(super) fn generate_message_impl(
    name: &str,
    runtime_path: &str,
    metadata: &MessageMetadata,
    fields: &[CodecField],
) -> TokenStream {
    let struct_name = struct_ident(name);
    let rt = parse_type(runtime_path);
    let MessageMetadata {
        data_type,
        md5sum,
        definition,
        qualified_name,
    } = metadata;

    let length = serialization_length_body(&rt, fields);
    let writes: Vec<TokenStream> = fields.iter().map(|f| serialize_field(&rt, f)).collect();
    let reads: Vec<TokenStream> = fields.iter().map(|f| deserialize_field(&rt, f)).collect();

    let (writer, reader) = if fields.is_empty() {
        (quote! { _writer }, quote! { _reader })
    } else {
        (quote! { writer }, quote! { reader })
    };

    quote! {
        impl #rt::RosMessage for #struct_name {
            const DATA_TYPE: &'static str = #data_type;
            const MD5SUM: &'static str = #md5sum;
            const DEFINITION: &'static str = #definition;
            const QUALIFIED_NAME: &'static str = #qualified_name;

            #[inline]
            fn serialization_length(&self) -> usize {
                #length
            }

            fn serialize(&self, #writer: &mut #rt::WireWriter) -> #rt::Result<()> {
                #(#writes)*
                Ok(())
            }

            fn deserialize(#reader: &mut #rt::WireReader<'_>) -> #rt::Result<Self> {
                Ok(Self {
                    #(#reads)*
                })
            }
        }
    }
}

/// Generate `Clone` as an encode/decode round trip
pub(super) fn generate_clone_impl(name: &str, runtime_path: &str) -> TokenStream {
    let struct_name = struct_ident(name);
    let rt = parse_type(runtime_path);
    quote! {
        impl ::core::clone::Clone for #struct_name {
            #[inline]
            fn clone(&self) -> Self {
                #rt::clone_via_wire(self)
            }
        }
    }
}

/// Generate field-wise `MessageEq` plus `PartialEq`/`Eq` on top of it
pub(super) fn generate_eq_impls(
    name: &str,
    runtime_path: &str,
    field_names: &[String],
) -> TokenStream {
    let struct_name = struct_ident(name);
    let rt = parse_type(runtime_path);

    let body = if field_names.is_empty() {
        quote! {
            let _ = other;
            true
        }
    } else {
        let comparisons = field_names.iter().map(|n| {
            let f = field_ident(n);
            quote! { #rt::MessageEq::message_eq(&self.#f, &other.#f) }
        });
        quote! { #(#comparisons)&&* }
    };

    quote! {
        impl #rt::MessageEq for #struct_name {
            fn message_eq(&self, other: &Self) -> bool {
                #body
            }
        }

        impl ::core::cmp::PartialEq for #struct_name {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                #rt::MessageEq::message_eq(self, other)
            }
        }

        impl ::core::cmp::Eq for #struct_name {}
    }
}

/// Generate the polynomial `HashCode` plus `Hash` feeding it to the hasher
pub(super) fn generate_hash_impls(
    name: &str,
    runtime_path: &str,
    field_names: &[String],
) -> TokenStream {
    let struct_name = struct_ident(name);
    let rt = parse_type(runtime_path);

    let body = if field_names.is_empty() {
        quote! { #rt::HASH_SEED }
    } else {
        let steps = field_names.iter().map(|n| {
            let f = field_ident(n);
            quote! { result = #rt::combine_hash(result, #rt::HashCode::hash_code(&self.#f)); }
        });
        quote! {
            let mut result = #rt::HASH_SEED;
            #(#steps)*
            result
        }
    };

    quote! {
        impl #rt::HashCode for #struct_name {
            fn hash_code(&self) -> i32 {
                #body
            }
        }

        impl ::core::hash::Hash for #struct_name {
            #[inline]
            fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                state.write_i32(#rt::HashCode::hash_code(self));
            }
        }
    }
}

/// Generate a service marker struct implementing `RosService`
pub(super) fn generate_service_impl(
    name: &str,
    doc: &str,
    runtime_path: &str,
    request: &str,
    response: &str,
    data_type: &str,
    md5sum: &str,
) -> TokenStream {
    let struct_name = struct_ident(name);
    let rt = parse_type(runtime_path);
    let request = struct_ident(request);
    let response = struct_ident(response);

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct #struct_name;

        impl #rt::RosService for #struct_name {
            type Request = #request;
            type Response = #response;
            const DATA_TYPE: &'static str = #data_type;
            const MD5SUM: &'static str = #md5sum;
        }
    }
}

/// Format a `TokenStream` into a pretty-printed string
pub(super) fn format_tokens(tokens: TokenStream) -> Result<String, syn::Error> {
    let syntax_tree = syn::parse2::<syn::File>(tokens)?;
    Ok(prettyplease::unparse(&syntax_tree))
}

/// Format multiple `TokenStreams` into a single pretty-printed string
pub(super) fn format_token_streams(streams: Vec<TokenStream>) -> Result<String, syn::Error> {
    let combined = streams.into_iter().fold(TokenStream::new(), |mut acc, ts| {
        acc.extend(ts);
        acc
    });
    format_tokens(combined)
}

/// Struct field information for code generation
#[derive(Debug, Clone)]
pub(super) struct StructField {
    /// Field name (already sanitized)
    pub name: String,
    /// Rust type string
    pub rust_type: String,
    /// Field-level attributes
    pub attributes: Vec<String>,
}

/// Field default value for Default impl generation
#[derive(Debug, Clone)]
pub(super) struct FieldDefault {
    pub name: String,
    pub default_value: String,
}

impl FieldDefault {
    pub(super) fn new(name: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: default_value.into(),
        }
    }
}

/// Constant definition for impl block generation
#[derive(Debug, Clone)]
pub(super) struct ConstantDef {
    pub name: String,
    pub rust_type: String,
    pub value: String,
}

impl ConstantDef {
    pub(super) fn new(
        name: impl Into<String>,
        rust_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rust_type: rust_type.into(),
            value: value.into(),
        }
    }
}

/// A field as seen by the codec generator
#[derive(Debug, Clone)]
pub(super) struct CodecField {
    /// Rust field name (already sanitized)
    pub name: String,
    /// Wire layout
    pub layout: FieldLayout,
    /// Rust type of one element
    pub element_type: String,
}

/// `RosMessage` metadata constants
#[derive(Debug, Clone)]
pub(super) struct MessageMetadata {
    pub data_type: String,
    pub md5sum: String,
    pub definition: String,
    pub qualified_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::parse_message_string;

    fn codec_fields(text: &str) -> Vec<CodecField> {
        let spec = parse_message_string("test_msgs", "T", text).unwrap();
        spec.fields
            .iter()
            .map(|f| CodecField {
                name: f.name.clone(),
                layout: FieldLayout::from_field(f),
                element_type: "Inner".to_string(),
            })
            .collect()
    }

    fn metadata() -> MessageMetadata {
        MessageMetadata {
            data_type: "test_msgs/T".to_string(),
            md5sum: "0".repeat(32),
            definition: "int32 x\n".to_string(),
            qualified_name: "ros.test_msgs.T".to_string(),
        }
    }

    fn render(tokens: TokenStream) -> String {
        format_tokens(tokens).unwrap()
    }

    #[test]
    fn test_parse_types() {
        assert!(!parse_type("u32").is_empty());
        assert!(!parse_type("[f64; 9]").is_empty());
        assert!(!parse_type("::std::vec::Vec<u8>").is_empty());
    }

    #[test]
    fn test_generate_simple_struct() {
        let fields = vec![
            StructField {
                name: "x".to_string(),
                rust_type: "f64".to_string(),
                attributes: Vec::new(),
            },
            StructField {
                name: "r#type".to_string(),
                rust_type: "u8".to_string(),
                attributes: vec!["#[doc = \"kind\"]".to_string()],
            },
        ];

        let formatted = render(generate_struct(
            "Point",
            "test_msgs/Point",
            &["Debug".to_string()],
            &[],
            &fields,
        ));
        assert!(formatted.contains("pub struct Point"));
        assert!(formatted.contains("pub x: f64"));
        assert!(formatted.contains("pub r#type: u8"));
        assert!(formatted.contains("#[derive(Debug)]"));
    }

    #[test]
    fn test_generate_default_and_constants() {
        let defaults = vec![FieldDefault::new("x", "0.0")];
        let formatted = render(generate_default_impl("Point", &defaults));
        assert!(formatted.contains("impl ::core::default::Default for Point"));
        assert!(formatted.contains("x: 0.0"));

        let constants = vec![
            ConstantDef::new("MAX", "u32", "100"),
            ConstantDef::new("NAME", "&'static str", "\"test\""),
            ConstantDef::new("LOW", "i8", "-3"),
        ];
        let formatted = render(generate_constants_impl("Point", &constants));
        assert!(formatted.contains("pub const MAX: u32 = 100"));
        assert!(formatted.contains("pub const NAME: &'static str = \"test\""));
        assert!(formatted.contains("pub const LOW: i8 = -3"));
    }

    #[test]
    fn test_fixed_length_folds_into_literal() {
        let fields = codec_fields("int32 a\nint32[2] b\ntime t\n");
        let formatted = render(generate_message_impl(
            "T",
            "::ros1_types",
            &metadata(),
            &fields,
        ));
        assert!(formatted.contains("20"));
        assert!(formatted.contains("writer.write_i32(self.a)"));
        assert!(formatted.contains("writer.write_time(&self.t)"));
        assert!(formatted.contains("reader.read_array(|reader| reader.read_i32())?"));
    }

    #[test]
    fn test_dynamic_fields() {
        let fields = codec_fields("uint16 count\nfloat64[] samples\nstring name\nuint8[] data\n");
        let formatted = render(generate_message_impl(
            "T",
            "::ros1_types",
            &metadata(),
            &fields,
        ));
        assert!(formatted.contains("8 * self.samples.len()"));
        assert!(formatted.contains("writer.write_string(&self.name)?"));
        assert!(formatted.contains("reader.read_sequence(|reader| reader.read_f64())?"));
        assert!(formatted.contains("writer.write_bytes(&self.data)"));
    }

    #[test]
    fn test_message_fields() {
        let fields = codec_fields("Inner one\nInner[] many\n");
        let formatted = render(generate_message_impl(
            "T",
            "::ros1_types",
            &metadata(),
            &fields,
        ));
        assert!(formatted.contains("<Inner as ::ros1_types::RosMessage>::deserialize(reader)"));
        assert!(formatted.contains("::ros1_types::RosMessage::serialize(&self.one, writer)?"));
        assert!(formatted.contains(".map(::ros1_types::RosMessage::serialization_length)"));
    }

    #[test]
    fn test_empty_message() {
        let formatted = render(generate_message_impl(
            "T",
            "::ros1_types",
            &metadata(),
            &[],
        ));
        assert!(formatted.contains("_writer"));
        assert!(formatted.contains("_reader"));

        let formatted = render(generate_eq_impls("T", "::ros1_types", &[]));
        assert!(formatted.contains("let _ = other;"));
        let formatted = render(generate_hash_impls("T", "::ros1_types", &[]));
        assert!(formatted.contains("::ros1_types::HASH_SEED"));
    }

    #[test]
    fn test_service_marker() {
        let formatted = render(generate_service_impl(
            "AddTwoInts",
            "srv",
            "::ros1_types",
            "AddTwoIntsRequest",
            "AddTwoIntsResponse",
            "test_msgs/AddTwoInts",
            "6a2e34150c00229791cc89ff309fff21",
        ));
        assert!(formatted.contains("impl ::ros1_types::RosService for AddTwoInts"));
        assert!(formatted.contains("type Request = AddTwoIntsRequest;"));
    }
}
