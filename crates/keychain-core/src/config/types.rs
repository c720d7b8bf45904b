//! Configuration types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default location of the `security` utility
pub const DEFAULT_SECURITY_PATH: &str = "/usr/bin/security";

/// Fallback location of `codesign` when it is not on `PATH`
pub const DEFAULT_CODESIGN_PATH: &str = "/usr/bin/codesign";

/// Where Xcode and CI tooling drop exported `.p12` files
pub const DEFAULT_CERTIFICATE_PATTERN: &str = "~/Library/MobileDevice/Certificates/*.p12";

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credential store tooling
    pub security: SecurityConfig,

    /// Certificate import settings
    pub certificates: CertificatesConfig,
}

/// Tool paths for talking to the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Path to the `security` binary
    pub security_path: PathBuf,

    /// Path to `codesign`, granted access to imported keys.
    /// Looked up on `PATH` when unset.
    pub codesign_path: Option<PathBuf>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            security_path: PathBuf::from(DEFAULT_SECURITY_PATH),
            codesign_path: None,
        }
    }
}

/// Certificate import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificatesConfig {
    /// Glob patterns searched by `add-certificates` when none are given
    pub search_patterns: Vec<String>,
}

impl Default for CertificatesConfig {
    fn default() -> Self {
        Self {
            search_patterns: vec![DEFAULT_CERTIFICATE_PATTERN.to_string()],
        }
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
