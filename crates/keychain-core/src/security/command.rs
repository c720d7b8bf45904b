//! Invocations of the `security` utility with secret-aware logging

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{KeychainError, Result};
use crate::password::Password;

/// Placeholder shown instead of secret arguments
pub const OBFUSCATION: &str = "********";

#[derive(Debug, Clone)]
enum Arg {
    Plain(OsString),
    Secret(Password),
}

/// Captured result of a finished invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Stdout, or stderr when stdout is empty. Some `security` verbs only
    /// write to stderr.
    pub fn text(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// A single `security` command line
#[derive(Debug, Clone)]
pub struct SecurityCommand {
    program: PathBuf,
    args: Vec<Arg>,
    interactive: bool,
}

impl SecurityCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    pub fn path(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    /// Add an argument that must never be logged
    pub fn secret(mut self, password: &Password) -> Self {
        self.args.push(Arg::Secret(password.clone()));
        self
    }

    /// Let the child read the terminal, so `security` can prompt
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Shell-like rendering with secrets replaced by [`OBFUSCATION`]
    pub fn redacted(&self) -> String {
        std::iter::once(quote(&self.program.to_string_lossy()))
            .chain(self.args.iter().map(|arg| match arg {
                Arg::Plain(value) => quote(&value.to_string_lossy()),
                Arg::Secret(_) => OBFUSCATION.to_string(),
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion and capture its output
    pub async fn output(&self) -> Result<CommandOutput> {
        debug!(command = %self.redacted(), "running security command");

        let mut command = Command::new(&self.program);
        for arg in &self.args {
            match arg {
                Arg::Plain(value) => command.arg(value),
                Arg::Secret(password) => command.arg(password.expose()),
            };
        }

        command
            .stdin(if self.interactive {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = command.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                KeychainError::ToolNotFound {
                    tool: self.program.display().to_string(),
                    hint: "The security utility ships with macOS; set security.security_path in keychain.toml to override its location".to_string(),
                }
            } else {
                KeychainError::Io(e)
            }
        })?;

        let output = CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        debug!(status = output.status, "security command finished");
        Ok(output)
    }
}

fn quote(value: &str) -> String {
    if value.is_empty() {
        "''".to_string()
    } else if value
        .chars()
        .any(|c| c.is_whitespace() || "'\"$`\\;&|<>()*?".contains(c))
    {
        format!("'{}'", value.replace('\'', r"'\''"))
    } else {
        value.to_string()
    }
}
