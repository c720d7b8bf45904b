//! CLI definition and command dispatch

pub mod commands;
mod error;
pub mod output;

#[cfg(test)]
pub(crate) mod test_support;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{error::ErrorKind, Parser, Subcommand};
use keychain_core::{Config, KeychainService, SecurityCli};
use tracing::debug;

pub use error::CliError;

use commands::{
    AddCertificatesCommand, CreateCommand, DeleteCommand, GetDefaultCommand, InitializeCommand,
    ListCertificatesCommand, LockCommand, MakeDefaultCommand, SetTimeoutCommand, ShowInfoCommand,
    UnlockCommand,
};

/// Utility to manage macOS keychains and certificates
#[derive(Debug, Parser)]
#[command(name = "keychain")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable log output for actions
    #[arg(short, long, global = true)]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Choose which stream to use for log output
    #[arg(long, global = true, value_enum, default_value = "stderr")]
    pub log_stream: LogStream,

    /// Keychain path. If not provided, the system default keychain will be used instead
    #[arg(short, long, global = true, value_name = "PATH")]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Stream for log output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogStream {
    /// Standard error
    #[default]
    Stderr,
    /// Standard output
    Stdout,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List available code signing certificates in specified keychain
    ListCertificates(ListCertificatesCommand),

    /// Unlock the specified keychain
    Unlock(UnlockCommand),

    /// Lock the specified keychain
    Lock(LockCommand),

    /// Create a macOS keychain, add it to the search list
    Create(CreateCommand),

    /// Delete keychains and remove them from the search list
    Delete(DeleteCommand),

    /// Show all settings for the keychain
    ShowInfo(ShowInfoCommand),

    /// Set timeout settings for the keychain
    SetTimeout(SetTimeoutCommand),

    /// Show the system default keychain
    GetDefault(GetDefaultCommand),

    /// Set the keychain as the system default keychain
    MakeDefault(MakeDefaultCommand),

    /// Set up a keychain for code signing: create, set timeout, make default and unlock
    Initialize(InitializeCommand),

    /// Add p12 certificates to specified keychain
    AddCertificates(AddCertificatesCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::ListCertificates(_) => "list-certificates",
            Self::Unlock(_) => "unlock",
            Self::Lock(_) => "lock",
            Self::Create(_) => "create",
            Self::Delete(_) => "delete",
            Self::ShowInfo(_) => "show-info",
            Self::SetTimeout(_) => "set-timeout",
            Self::GetDefault(_) => "get-default",
            Self::MakeDefault(_) => "make-default",
            Self::Initialize(_) => "initialize",
            Self::AddCertificates(_) => "add-certificates",
        }
    }
}

/// Result of parsing the process arguments
#[derive(Debug)]
pub enum Invocation {
    /// Run a command
    Run(Cli),
    /// Print help or version text and exit successfully
    Display(String),
}

/// Parse raw process arguments (including the program name)
pub fn parse_args<I, T>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    match Cli::try_parse_from(normalize_args(args)) {
        Ok(cli) => Ok(Invocation::Run(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Ok(Invocation::Display(err.to_string()))
            }
            ErrorKind::InvalidSubcommand
            | ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Err(CliError::UnknownCommand(err.to_string()))
            }
            _ => Err(CliError::InvalidArgument(err.to_string())),
        },
    }
}

/// Rewrite the two-letter `-pw` flag to `--password`, which clap can parse.
/// Arguments after `--` are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let rewritten = match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    None
                }
                Some("-pw") => Some(OsString::from("--password")),
                Some(value) => value
                    .strip_prefix("-pw=")
                    .map(|password| OsString::from(format!("--password={password}"))),
                None => None,
            };
            rewritten.unwrap_or(arg)
        })
        .collect()
}

/// Log stream requested on the command line, for reporting errors that
/// happen before parsing completes
pub fn requested_log_stream(args: &[OsString]) -> LogStream {
    let mut stream = LogStream::Stderr;
    let mut iter = args.iter().filter_map(|a| a.to_str());
    while let Some(arg) = iter.next() {
        let value = match arg {
            "--" => break,
            "--log-stream" => iter.next(),
            other => other.strip_prefix("--log-stream="),
        };
        match value {
            Some("stdout") => stream = LogStream::Stdout,
            Some("stderr") => stream = LogStream::Stderr,
            _ => {}
        }
    }
    stream
}

impl Cli {
    /// Execute the command against the `security` utility
    pub fn execute(&self) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        let (config, _) = keychain_core::load_config_or_default(&cwd);
        let keychain = SecurityCli::from_config(&config.security);

        if !keychain.is_available() {
            debug!(service = keychain.name(), "keychain service binary not found");
        }

        self.execute_with(&keychain, &config)
    }

    /// Execute the command against the given keychain service
    pub fn execute_with(&self, keychain: &dyn KeychainService, config: &Config) -> anyhow::Result<()> {
        debug!(command = self.command.name(), "dispatching command");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(async {
            match &self.command {
                Commands::ListCertificates(cmd) => cmd.execute(self, keychain).await,
                Commands::Unlock(cmd) => cmd.execute(self, keychain).await,
                Commands::Lock(cmd) => cmd.execute(self, keychain).await,
                Commands::Create(cmd) => cmd.execute(self, keychain).await,
                Commands::Delete(cmd) => cmd.execute(self, keychain).await,
                Commands::ShowInfo(cmd) => cmd.execute(self, keychain).await,
                Commands::SetTimeout(cmd) => cmd.execute(self, keychain).await,
                Commands::GetDefault(cmd) => cmd.execute(self, keychain).await,
                Commands::MakeDefault(cmd) => cmd.execute(self, keychain).await,
                Commands::Initialize(cmd) => cmd.execute(self, keychain).await,
                Commands::AddCertificates(cmd) => cmd.execute(self, keychain, config).await,
            }
        })
    }
}
