//! Set keychain timeout command

use clap::Args;
use keychain_core::KeychainService;
use tracing::info;

use crate::cli::{output, Cli};

/// Set timeout settings for the keychain.
/// If seconds are not provided, then no-timeout will be set.
#[derive(Debug, Args)]
pub struct SetTimeoutCommand {
    /// Keychain timeout in seconds, defaults to no timeout
    #[arg(short, long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl SetTimeoutCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = keychain.resolve(cli.path.as_deref()).await?;
        match self.timeout {
            Some(seconds) => info!("Set keychain {} timeout to {} seconds", path.display(), seconds),
            None => info!("Set keychain {} timeout to \"no timeout\"", path.display()),
        }

        keychain.set_timeout(&path, self.timeout).await?;

        output::success(cli, &format!("Updated timeout of keychain {}", path.display()));
        Ok(())
    }
}
