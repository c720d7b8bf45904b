//! Errors raised by the dispatcher itself

use thiserror::Error;

/// Argument parsing errors. The message already carries clap's usage text.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing or unrecognised subcommand
    #[error("{0}")]
    UnknownCommand(String),

    /// Bad flag or flag value
    #[error("{0}")]
    InvalidArgument(String),
}
