//! List code signing certificates command

use clap::Args;
use keychain_core::KeychainService;
use tracing::info;

use crate::cli::{output, Cli};

/// List available code signing certificates in specified keychain
#[derive(Debug, Args)]
pub struct ListCertificatesCommand {
    /// Print certificates as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl ListCertificatesCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = keychain.resolve(cli.path.as_deref()).await?;
        info!(
            "List available code signing certificates in keychain {}",
            path.display()
        );

        let certificates = keychain.list_code_signing_certificates(&path).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&certificates)?);
        } else if certificates.is_empty() {
            output::note(cli, "No code signing certificates found");
        } else {
            for certificate in &certificates {
                println!("{}", output::certificate_line(certificate));
            }
        }

        Ok(())
    }
}
