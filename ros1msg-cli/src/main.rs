//! ros1msg CLI - ROS1 message tooling
//!
//! Commands:
//! - `ros1msg generate` - Generate Rust types from packages or interface files
//! - `ros1msg md5` - Print the MD5 sum of messages and services
//! - `ros1msg show` - Print the full definition text of a message

use clap::{Parser, Subcommand};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod error;
mod generate;
mod inspect;
mod logger;

#[derive(Parser)]
#[command(name = "ros1msg")]
#[command(author, version, about = "ROS1 message generator and inspector", long_about = None)]
struct Cli {
    /// Package roots to search, in order, joined like PATH (also read from ROS_PACKAGE_PATH)
    #[arg(long = "package-path", global = true, env = "ROS_PACKAGE_PATH")]
    package_path: Option<OsString>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Rust types for packages or individual .msg/.srv files
    Generate {
        /// Output directory for generated code
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,

        /// Also generate every message the inputs depend on
        #[arg(short, long)]
        recursive: bool,

        /// Path of the runtime crate in generated code
        #[arg(long, default_value = "::ros1_types")]
        runtime_path: String,

        /// Prefix of the generated QUALIFIED_NAME constants
        #[arg(long, default_value = "ros")]
        namespace: String,

        /// Package names or paths to .msg/.srv files
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Print the MD5 sum of messages or services
    Md5 {
        /// Types as package/Name
        #[arg(required = true)]
        types: Vec<String>,
    },

    /// Print the full definition text of a message
    Show {
        /// Type as package/Name
        #[arg(value_name = "TYPE")]
        type_name: String,
    },
}

fn main() -> ExitCode {
    logger::init();
    let cli = Cli::parse();
    let package_paths = split_package_path(cli.package_path.as_deref());

    let result = match cli.command {
        Commands::Generate {
            output,
            recursive,
            runtime_path,
            namespace,
            inputs,
        } => generate::run(&generate::Options {
            output,
            recursive,
            runtime_path,
            namespace,
            inputs,
            package_paths,
        }),
        Commands::Md5 { types } => inspect::md5(&package_paths, &types),
        Commands::Show { type_name } => inspect::show(&package_paths, &type_name),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Split a search path with the platform separator, as `SchemaRegistry::from_env` does
fn split_package_path(value: Option<&OsStr>) -> Vec<PathBuf> {
    value
        .map(|paths| {
            std::env::split_paths(paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}
