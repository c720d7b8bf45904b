//! Keychain Core - macOS code signing keychain management
//!
//! This crate provides the pieces behind the `keychain` CLI:
//! - the [`KeychainService`] trait over the operating system credential store
//! - [`SecurityCli`], which drives the macOS `security` utility
//! - code signing certificate, password and configuration types

pub mod certificate;
pub mod config;
pub mod error;
pub mod password;
pub mod security;
pub mod service;

pub use certificate::{CertificateKind, CodeSigningCertificate};
pub use config::{load_config_or_default, Config};
pub use error::{ConfigError, KeychainError, Result};
pub use password::Password;
pub use security::SecurityCli;
pub use service::{generate_keychain_path, ImportOutcome, KeychainService};
