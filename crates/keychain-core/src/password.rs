//! Keychain and certificate passwords

use std::str::FromStr;

use zeroize::ZeroizeOnDrop;

use crate::error::KeychainError;

const ENV_PREFIX: &str = "@env:";
const FILE_PREFIX: &str = "@file:";

/// A secret passed to the credential store.
///
/// The value is wiped from memory on drop and never shows up in `Debug`
/// output. Values of the form `@env:NAME` and `@file:PATH` are resolved when
/// parsed, anything else is taken literally.
#[derive(Clone, PartialEq, Eq, Default, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    /// Wrap a literal password
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Empty password, used where `security` would otherwise prompt
    pub fn empty() -> Self {
        Self::default()
    }

    /// Access the secret value
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Password {
    type Err = KeychainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix(ENV_PREFIX) {
            return std::env::var(name).map(Self).map_err(|_| {
                KeychainError::InvalidPassword(format!("environment variable {name} is not set"))
            });
        }

        if let Some(path) = s.strip_prefix(FILE_PREFIX) {
            let path = crate::config::expand_home(path);
            let mut contents = std::fs::read_to_string(&path).map_err(|e| {
                KeychainError::InvalidPassword(format!(
                    "cannot read password file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            if contents.ends_with('\n') {
                contents.pop();
                if contents.ends_with('\r') {
                    contents.pop();
                }
            }
            return Ok(Self(contents));
        }

        Ok(Self(s.to_string()))
    }
}

// Never print the secret itself
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(********)")
    }
}
