//! Keychain service trait and common types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::certificate::CodeSigningCertificate;
use crate::error::Result;
use crate::password::Password;

/// Outcome of importing a single certificate file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    /// The certificate was added to the keychain
    Imported,
    /// The keychain already contained the certificate
    AlreadyPresent,
}

/// Trait for credential stores that hold code signing keychains
///
/// The production implementation drives the macOS `security` utility.
/// Every keychain operation is a single one-shot call; implementations keep
/// no state between calls.
#[async_trait::async_trait]
pub trait KeychainService: Send + Sync {
    /// Get the name of this service
    fn name(&self) -> &str;

    /// Check if the service is usable on the current system
    fn is_available(&self) -> bool;

    /// Path of the system default keychain
    async fn default_keychain(&self) -> Result<PathBuf>;

    /// Make the keychain the system default
    async fn set_default_keychain(&self, keychain: &Path) -> Result<()>;

    /// Create a keychain and add it to the user search list
    async fn create(&self, keychain: &Path, password: &Password) -> Result<()>;

    /// Delete a keychain and remove it from the search list
    async fn delete(&self, keychain: &Path) -> Result<()>;

    /// Human-readable keychain settings
    async fn show_info(&self, keychain: &Path) -> Result<String>;

    /// Set the auto-lock timeout in seconds, `None` meaning no timeout
    async fn set_timeout(&self, keychain: &Path, timeout: Option<u64>) -> Result<()>;

    /// Lock the keychain
    async fn lock(&self, keychain: &Path) -> Result<()>;

    /// Unlock the keychain.
    ///
    /// With no password the service may prompt for one interactively.
    async fn unlock(&self, keychain: &Path, password: Option<&Password>) -> Result<()>;

    /// List code signing certificates in the keychain
    async fn list_code_signing_certificates(
        &self,
        keychain: &Path,
    ) -> Result<Vec<CodeSigningCertificate>>;

    /// Import a PKCS#12 certificate into the keychain
    async fn import_certificate(
        &self,
        keychain: &Path,
        certificate: &Path,
        password: &Password,
    ) -> Result<ImportOutcome>;

    /// Resolve an optional keychain path, falling back to the system default
    async fn resolve(&self, keychain: Option<&Path>) -> Result<PathBuf> {
        match keychain {
            Some(path) => Ok(path.to_path_buf()),
            None => self.default_keychain().await,
        }
    }
}

/// Generate a fresh `build_*.keychain` path in the temp directory.
///
/// The placeholder file is removed again so that `security` can create the
/// keychain there.
pub fn generate_keychain_path() -> Result<PathBuf> {
    let placeholder = tempfile::Builder::new()
        .prefix("build_")
        .suffix(".keychain")
        .tempfile()?;
    let path = placeholder.path().to_path_buf();
    placeholder.close()?;
    Ok(path)
}
