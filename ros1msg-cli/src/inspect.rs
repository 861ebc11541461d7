//! `md5` and `show` commands

use crate::error::{CliError, CliResult};
use ros1msg::{
    MessageName, SchemaRegistry, ServiceSpecification, compute_full_text, compute_md5,
    compute_service_md5, parse_service_file,
};
use std::path::PathBuf;

enum Interface {
    Message(MessageName),
    Service(ServiceSpecification),
}

/// Load a message, or failing that a service, with everything it depends on
fn load(registry: &mut SchemaRegistry, type_name: &str) -> CliResult<Interface> {
    let name = MessageName::parse(type_name, None)?;

    let srv_path = registry
        .find_package_dir(&name.package)
        .map(|dir| dir.join("srv").join(format!("{}.srv", name.name)))
        .filter(|path| path.is_file());

    if let Some(srv_path) = srv_path {
        let srv = parse_service_file(&name.package, srv_path)?;
        registry.register_service(&srv);
        registry.resolve(&srv.request.full_name())?;
        registry.resolve(&srv.response.full_name())?;
        return Ok(Interface::Service(srv));
    }

    match registry.load(&name, &name) {
        Ok(_) => {}
        Err(ros1msg::ParseError::UnresolvedType { .. }) => {
            return Err(CliError::NotFound {
                name: name.to_string(),
            });
        }
        Err(err) => return Err(err.into()),
    }
    registry.resolve(&name)?;
    Ok(Interface::Message(name))
}

/// Print `package/Name md5` for each type
pub(crate) fn md5(package_paths: &[PathBuf], types: &[String]) -> CliResult<()> {
    let mut registry = SchemaRegistry::with_search_paths(package_paths);
    for type_name in types {
        let sum = match load(&mut registry, type_name)? {
            Interface::Message(name) => {
                let spec = registry.require(&name, &name)?;
                compute_md5(&registry, spec)?
            }
            Interface::Service(srv) => compute_service_md5(&registry, &srv)?,
        };
        println!("{type_name} {sum}");
    }
    Ok(())
}

/// Print the full definition text of a message
pub(crate) fn show(package_paths: &[PathBuf], type_name: &str) -> CliResult<()> {
    let mut registry = SchemaRegistry::with_search_paths(package_paths);
    match load(&mut registry, type_name)? {
        Interface::Message(name) => {
            let spec = registry.require(&name, &name)?;
            println!("{}", compute_full_text(&registry, spec)?);
            Ok(())
        }
        Interface::Service(_) => Err(CliError::NotAMessage {
            name: type_name.to_string(),
        }),
    }
}
