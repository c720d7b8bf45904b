//! Delete command

use clap::Args;
use keychain_core::KeychainService;
use tracing::info;

use crate::cli::{output, Cli};

/// Delete keychains and remove them from the search list
#[derive(Debug, Args)]
pub struct DeleteCommand {}

impl DeleteCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = keychain.resolve(cli.path.as_deref()).await?;
        info!("Delete keychain {}", path.display());

        keychain.delete(&path).await?;

        output::success(cli, &format!("Deleted keychain {}", path.display()));
        Ok(())
    }
}
