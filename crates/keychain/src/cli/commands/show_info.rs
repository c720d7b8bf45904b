//! Show keychain info command

use clap::Args;
use keychain_core::KeychainService;
use tracing::info;

use crate::cli::Cli;

/// Show all settings for the keychain
#[derive(Debug, Args)]
pub struct ShowInfoCommand {}

impl ShowInfoCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = keychain.resolve(cli.path.as_deref()).await?;
        info!("Keychain {} settings:", path.display());

        let settings = keychain.show_info(&path).await?;
        println!("{}", settings);
        Ok(())
    }
}
