//! MD5 fingerprints and full definition text
//!
//! The MD5 text of a message lists its constants (`type NAME=value`) and
//! then its fields, one per line. Builtin fields are written as
//! `type name`; message fields are written as `<md5 of the message> name`
//! so a layout change anywhere below changes every fingerprint above.
//! Whitespace and comments never reach the MD5 text.

use std::collections::HashSet;

use md5::{Digest, Md5};

use crate::msg::{
    BaseType, MessageName, MessageSpecification, ParseError, ParseResult, ServiceSpecification,
};
use crate::registry::SchemaRegistry;

/// Separator line between embedded definitions in the full text
pub const DEFINITION_SEPARATOR: &str =
    "================================================================================";

fn md5_hex(text: &str) -> String {
    format!("{:x}", Md5::digest(text.as_bytes()))
}

/// Compute the normalized text the MD5 is taken over
///
/// # Errors
///
/// Returns an error if a referenced message is not in `registry` or the
/// references form a cycle.
pub fn compute_md5_text(
    registry: &SchemaRegistry,
    spec: &MessageSpecification,
) -> ParseResult<String> {
    md5_text_inner(registry, spec, &mut Vec::new())
}

fn md5_text_inner(
    registry: &SchemaRegistry,
    spec: &MessageSpecification,
    visiting: &mut Vec<MessageName>,
) -> ParseResult<String> {
    let full_name = spec.full_name();
    if visiting.contains(&full_name) {
        let mut chain: Vec<String> = visiting.iter().map(ToString::to_string).collect();
        chain.push(full_name.to_string());
        return Err(ParseError::CyclicDependency { chain });
    }
    visiting.push(full_name.clone());

    let mut buff = String::new();
    for constant in &spec.constants {
        buff.push_str(&format!(
            "{} {}={}\n",
            constant.primitive_type, constant.name, constant.value_text
        ));
    }
    for field in &spec.fields {
        match &field.field_type.base_type {
            BaseType::Primitive(_) => {
                buff.push_str(&format!("{} {}\n", field.field_type, field.name));
            }
            BaseType::Message(name) => {
                let sub_spec = registry.require(name, &full_name)?;
                let sub_md5 = md5_hex(&md5_text_inner(registry, sub_spec, visiting)?);
                buff.push_str(&format!("{sub_md5} {}\n", field.name));
            }
        }
    }

    visiting.pop();
    Ok(buff.trim().to_string())
}

/// Compute the MD5 fingerprint of a message
///
/// # Errors
///
/// See [`compute_md5_text`].
pub fn compute_md5(registry: &SchemaRegistry, spec: &MessageSpecification) -> ParseResult<String> {
    compute_md5_text(registry, spec).map(|text| md5_hex(&text))
}

/// Compute the MD5 fingerprint of a service: the request MD5 text
/// immediately followed by the response MD5 text
///
/// # Errors
///
/// See [`compute_md5_text`].
pub fn compute_service_md5(
    registry: &SchemaRegistry,
    srv: &ServiceSpecification,
) -> ParseResult<String> {
    let request = compute_md5_text(registry, &srv.request)?;
    let response = compute_md5_text(registry, &srv.response)?;
    Ok(md5_hex(&format!("{request}{response}")))
}

/// Every message embedded in `spec`, depth first in first-use order
///
/// # Errors
///
/// Returns an error if a referenced message is not in `registry` or the
/// references form a cycle.
pub fn all_dependencies(
    registry: &SchemaRegistry,
    spec: &MessageSpecification,
) -> ParseResult<Vec<MessageName>> {
    let mut ordered = Vec::new();
    let mut seen = HashSet::new();
    let mut visiting = vec![spec.full_name()];
    collect_dependencies(registry, spec, &mut ordered, &mut seen, &mut visiting)?;
    Ok(ordered)
}

fn collect_dependencies(
    registry: &SchemaRegistry,
    spec: &MessageSpecification,
    ordered: &mut Vec<MessageName>,
    seen: &mut HashSet<MessageName>,
    visiting: &mut Vec<MessageName>,
) -> ParseResult<()> {
    let full_name = spec.full_name();
    for dependency in spec.message_dependencies() {
        if visiting.contains(&dependency) {
            let mut chain: Vec<String> = visiting.iter().map(ToString::to_string).collect();
            chain.push(dependency.to_string());
            return Err(ParseError::CyclicDependency { chain });
        }
        let sub_spec = registry.require(&dependency, &full_name)?;
        if seen.insert(dependency.clone()) {
            ordered.push(dependency.clone());
        }
        visiting.push(dependency);
        collect_dependencies(registry, sub_spec, ordered, seen, visiting)?;
        visiting.pop();
    }
    Ok(())
}

/// Compute the full definition text: the message's own text followed by
/// each embedded definition, separated and labelled `MSG: package/Name`
///
/// # Errors
///
/// See [`all_dependencies`].
pub fn compute_full_text(
    registry: &SchemaRegistry,
    spec: &MessageSpecification,
) -> ParseResult<String> {
    let mut buff = String::new();
    buff.push_str(&spec.text);
    buff.push('\n');

    let full_name = spec.full_name();
    for dependency in all_dependencies(registry, spec)? {
        let sub_spec = registry.require(&dependency, &full_name)?;
        buff.push_str(DEFINITION_SEPARATOR);
        buff.push('\n');
        buff.push_str(&format!("MSG: {dependency}\n"));
        buff.push_str(&sub_spec.text);
        buff.push('\n');
    }

    buff.pop();
    Ok(buff)
}
