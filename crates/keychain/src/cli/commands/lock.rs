//! Lock command

use clap::Args;
use keychain_core::KeychainService;
use tracing::info;

use crate::cli::{output, Cli};

/// Lock the specified keychain
#[derive(Debug, Args)]
pub struct LockCommand {}

impl LockCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = keychain.resolve(cli.path.as_deref()).await?;
        info!("Lock keychain {}", path.display());

        keychain.lock(&path).await?;

        output::success(cli, &format!("Locked keychain {}", path.display()));
        Ok(())
    }
}
