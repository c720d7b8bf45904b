//! Add certificates command

use std::path::PathBuf;

use clap::Args;
use keychain_core::config::expand_home;
use keychain_core::{Config, ImportOutcome, KeychainError, KeychainService, Password};
use tracing::{debug, info};

use crate::cli::{output, Cli, CliError};

/// Add p12 certificates to specified keychain
#[derive(Debug, Args)]
pub struct AddCertificatesCommand {
    /// Path to pkcs12 certificate. Can be either a path literal, or a glob
    /// pattern to match certificates [default: from config,
    /// ~/Library/MobileDevice/Certificates/*.p12]
    #[arg(short = 'c', long = "certificate", value_name = "CERTIFICATE_PATH", num_args = 1..)]
    pub certificates: Vec<String>,

    /// Encrypted p12 certificate password
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "KEYCHAIN_CERTIFICATE_PASSWORD",
        hide_env_values = true
    )]
    pub certificate_password: Option<Password>,
}

impl AddCertificatesCommand {
    pub async fn execute(
        &self,
        cli: &Cli,
        keychain: &dyn KeychainService,
        config: &Config,
    ) -> anyhow::Result<()> {
        let patterns = if self.certificates.is_empty() {
            &config.certificates.search_patterns
        } else {
            &self.certificates
        };

        let certificate_paths = find_paths(patterns)?;
        if certificate_paths.is_empty() {
            return Err(KeychainError::CertificatesNotFound {
                patterns: patterns.join(", "),
            }
            .into());
        }

        let path = keychain.resolve(cli.path.as_deref()).await?;
        info!("Add certificates to keychain {}", path.display());

        let password = self.certificate_password.clone().unwrap_or_default();
        for certificate in &certificate_paths {
            info!(
                "Add certificate {} to keychain {}",
                certificate.display(),
                path.display()
            );
            match keychain
                .import_certificate(&path, certificate, &password)
                .await?
            {
                ImportOutcome::Imported => {
                    output::success(cli, &format!("Added {}", certificate.display()))
                }
                ImportOutcome::AlreadyPresent => output::warning(
                    cli,
                    &format!("{} is already in the keychain", certificate.display()),
                ),
            }
        }

        Ok(())
    }
}

/// Expand path literals and glob patterns into existing files, sorted and
/// without duplicates
fn find_paths(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        let expanded = expand_home(pattern);
        if expanded.is_file() {
            paths.push(expanded);
            continue;
        }

        let matches = glob::glob(&expanded.to_string_lossy()).map_err(|e| {
            CliError::InvalidArgument(format!("invalid certificate pattern '{}': {}", pattern, e))
        })?;
        let before = paths.len();
        paths.extend(matches.filter_map(|entry| entry.ok()).filter(|p| p.is_file()));
        debug!(pattern = %pattern, matched = paths.len() - before, "expanded certificate pattern");
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}
