//! CLI commands

mod add_certificates;
mod create;
mod default;
mod delete;
mod initialize;
mod list_certificates;
mod lock;
mod set_timeout;
mod show_info;
mod unlock;

pub use add_certificates::AddCertificatesCommand;
pub use create::CreateCommand;
pub use default::{GetDefaultCommand, MakeDefaultCommand};
pub use delete::DeleteCommand;
pub use initialize::InitializeCommand;
pub use list_certificates::ListCertificatesCommand;
pub use lock::LockCommand;
pub use set_timeout::SetTimeoutCommand;
pub use show_info::ShowInfoCommand;
pub use unlock::UnlockCommand;

use clap::Args;
use keychain_core::Password;

/// Keychain password flag shared by commands that open or create a keychain.
///
/// `-pw` is accepted as well; the dispatcher rewrites it to `--password`.
#[derive(Debug, Clone, Args)]
pub struct PasswordArg {
    /// Keychain password (short form: -pw). Accepts @env:NAME and @file:PATH
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "KEYCHAIN_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<Password>,
}

impl PasswordArg {
    /// The given password, or an empty one so `security` never prompts
    pub fn or_empty(&self) -> Password {
        self.password.clone().unwrap_or_default()
    }
}
