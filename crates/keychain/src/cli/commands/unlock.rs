//! Unlock command

use clap::Args;
use keychain_core::KeychainService;
use tracing::info;

use crate::cli::{output, Cli};

use super::PasswordArg;

/// Unlock the specified keychain
#[derive(Debug, Args)]
pub struct UnlockCommand {
    #[command(flatten)]
    pub password: PasswordArg,
}

impl UnlockCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = keychain.resolve(cli.path.as_deref()).await?;
        info!("Unlock keychain {}", path.display());

        // Without a password security prompts for one itself
        keychain
            .unlock(&path, self.password.password.as_ref())
            .await?;

        output::success(cli, &format!("Unlocked keychain {}", path.display()));
        Ok(())
    }
}
