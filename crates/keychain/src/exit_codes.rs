//! Exit codes for the CLI

use keychain_core::KeychainError;

use crate::cli::CliError;

/// Success, also used after printing help
pub const SUCCESS: u8 = 0;

/// General error
pub const ERROR: u8 = 1;

/// Unknown command or invalid argument
pub const USAGE_ERROR: u8 = 2;

/// Keychain does not exist
pub const KEYCHAIN_NOT_FOUND: u8 = 3;

/// Credential store denied access
pub const ACCESS_DENIED: u8 = 4;

/// Wrong keychain password
pub const AUTHENTICATION_FAILED: u8 = 5;

/// No certificate files matched
pub const CERTIFICATES_NOT_FOUND: u8 = 6;

/// Pick the exit code for an error returned by a command
pub fn for_error(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.downcast_ref::<CliError>().is_some() {
            return USAGE_ERROR;
        }
        if let Some(keychain_error) = cause.downcast_ref::<KeychainError>() {
            return for_keychain_error(keychain_error);
        }
    }
    ERROR
}

fn for_keychain_error(err: &KeychainError) -> u8 {
    match err {
        KeychainError::KeychainNotFound(_) => KEYCHAIN_NOT_FOUND,
        KeychainError::AccessDenied { .. } => ACCESS_DENIED,
        KeychainError::AuthenticationFailed(_) => AUTHENTICATION_FAILED,
        KeychainError::CertificatesNotFound { .. } => CERTIFICATES_NOT_FOUND,
        KeychainError::InvalidPassword(_) => USAGE_ERROR,
        _ => ERROR,
    }
}
