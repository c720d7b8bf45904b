//! Default keychain commands

use clap::Args;
use keychain_core::KeychainService;
use tracing::info;

use crate::cli::{output, Cli};

/// Show the system default keychain
#[derive(Debug, Args)]
pub struct GetDefaultCommand {}

/// Set the keychain as the system default keychain
#[derive(Debug, Args)]
pub struct MakeDefaultCommand {}

impl GetDefaultCommand {
    pub async fn execute(&self, _cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        info!("Get system default keychain");

        let path = keychain.default_keychain().await?;
        println!("{}", path.display());
        Ok(())
    }
}

impl MakeDefaultCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = keychain.resolve(cli.path.as_deref()).await?;
        info!("Set keychain {} to system default keychain", path.display());

        keychain.set_default_keychain(&path).await?;

        output::success(
            cli,
            &format!(
                "{} is now the default keychain",
                output::path_style().apply_to(path.display())
            ),
        );
        Ok(())
    }
}
