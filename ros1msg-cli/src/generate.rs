use crate::error::CliResult;
use ros1msg::generator::{FileType, Generator};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options of the `generate` command
pub(crate) struct Options {
    pub(crate) output: PathBuf,
    pub(crate) recursive: bool,
    pub(crate) runtime_path: String,
    pub(crate) namespace: String,
    pub(crate) inputs: Vec<String>,
    pub(crate) package_paths: Vec<PathBuf>,
}

/// An input names a file when it carries an interface extension or exists on disk
fn is_interface_file(input: &str) -> bool {
    let path = Path::new(input);
    path.is_file()
        || path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileType::from_extension)
            .is_some()
}

pub(crate) fn run(options: &Options) -> CliResult<()> {
    let mut generator = Generator::new()
        .header("// Auto-generated by ros1msg - do not edit")
        .package_search_paths(&options.package_paths)
        .runtime_path(&options.runtime_path)
        .namespace(&options.namespace)
        .allowlist_recursively(options.recursive)
        .output_dir(&options.output);

    for input in &options.inputs {
        generator = if is_interface_file(input) {
            generator.include(input)
        } else {
            generator.include_package(input)
        };
    }

    generator.generate()?;
    info!("wrote generated code to {}", options.output.display());
    Ok(())
}
