//! Create keychain command

use clap::Args;
use keychain_core::KeychainService;
use tracing::info;

use crate::cli::{output, Cli};

use super::PasswordArg;

/// Create a macOS keychain, add it to the search list
#[derive(Debug, Args)]
pub struct CreateCommand {
    #[command(flatten)]
    pub password: PasswordArg,
}

impl CreateCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = keychain.resolve(cli.path.as_deref()).await?;
        info!("Create keychain {}", path.display());

        keychain.create(&path, &self.password.or_empty()).await?;

        output::success(cli, &format!("Created keychain {}", path.display()));
        Ok(())
    }
}
