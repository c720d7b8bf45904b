//! Initialize command - create and prepare a keychain for code signing

use clap::Args;
use keychain_core::{generate_keychain_path, KeychainService};
use tracing::info;

use crate::cli::{output, Cli};

use super::PasswordArg;

/// Set up the keychain to be used for code signing. Create the keychain
/// at specified path with specified password with given timeout.
/// Make it default and unlock it for upcoming use.
#[derive(Debug, Args)]
pub struct InitializeCommand {
    #[command(flatten)]
    pub password: PasswordArg,

    /// Keychain timeout in seconds, defaults to no timeout
    #[arg(short, long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl InitializeCommand {
    pub async fn execute(&self, cli: &Cli, keychain: &dyn KeychainService) -> anyhow::Result<()> {
        let path = match &cli.path {
            Some(path) => path.clone(),
            None => generate_keychain_path()?,
        };
        info!(
            "Initialize new keychain to store code signing certificates at {}",
            path.display()
        );

        let password = self.password.or_empty();
        keychain.create(&path, &password).await?;
        keychain.set_timeout(&path, self.timeout).await?;
        keychain.set_default_keychain(&path).await?;
        keychain.unlock(&path, Some(&password)).await?;

        output::success(cli, "Keychain is ready for code signing");
        println!("{}", path.display());
        Ok(())
    }
}
