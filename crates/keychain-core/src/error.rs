//! Error types for keychain operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for keychain operations
pub type Result<T> = std::result::Result<T, KeychainError>;

/// Keychain-related errors
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Keychain does not exist at the given path
    #[error("Keychain not found: {0}")]
    KeychainNotFound(PathBuf),

    /// The credential store refused access to the keychain
    #[error("Access denied to keychain {path}: {reason}")]
    AccessDenied { path: PathBuf, reason: String },

    /// Wrong keychain password
    #[error("Unable to unlock keychain {0}: the password is not correct")]
    AuthenticationFailed(PathBuf),

    /// No certificate files matched the requested patterns
    #[error("Did not find any certificates from specified locations: {patterns}")]
    CertificatesNotFound { patterns: String },

    /// Password value could not be resolved
    #[error("Invalid password value: {0}")]
    InvalidPassword(String),

    /// Tool not found
    #[error("Keychain tool not found: {tool}. {hint}")]
    ToolNotFound { tool: String, hint: String },

    /// Command execution error
    #[error("Command '{command}' failed with exit code {status}: {stderr}")]
    Command {
        command: String,
        status: i32,
        stderr: String,
    },

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

impl KeychainError {
    /// Classify a failed `security` invocation from its stderr.
    ///
    /// `command` must already be redacted, it ends up in user-facing output.
    pub fn from_security_failure(
        keychain: Option<&std::path::Path>,
        command: String,
        status: i32,
        stderr: &str,
    ) -> Self {
        let lowered = stderr.to_lowercase();
        let path = || keychain.map(PathBuf::from).unwrap_or_default();

        if lowered.contains("could not be found") || lowered.contains("no such keychain") {
            Self::KeychainNotFound(path())
        } else if lowered.contains("passphrase you entered is not correct")
            || lowered.contains("incorrect passphrase")
        {
            Self::AuthenticationFailed(path())
        } else if lowered.contains("permission denied")
            || lowered.contains("not permitted")
            || lowered.contains("write permissions error")
        {
            Self::AccessDenied {
                path: path(),
                reason: stderr.trim().to_string(),
            }
        } else {
            Self::Command {
                command,
                status,
                stderr: stderr.trim().to_string(),
            }
        }
    }
}
