use ros1msg::ParseError;
use ros1msg::generator::GeneratorError;
use thiserror::Error;

/// Errors reported by the CLI
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("Cannot locate message/service [{name}] in the package path")]
    NotFound { name: String },

    #[error("[{name}] is a service, it has no definition text of its own")]
    NotAMessage { name: String },
}

pub(crate) type CliResult<T> = Result<T, CliError>;
