//! In-memory keychain service for command tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keychain_core::{
    CodeSigningCertificate, Config, ImportOutcome, KeychainError, KeychainService, Password,
    Result,
};

use super::{parse_args, Invocation};

pub const DEFAULT_KEYCHAIN: &str = "/Users/ci/Library/Keychains/login.keychain-db";
pub const CORRECT_PASSWORD: &str = "correct horse";

/// A recorded service call. Passwords are kept in plain text so tests can
/// check what was passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DefaultKeychain,
    SetDefault(PathBuf),
    Create(PathBuf, String),
    Delete(PathBuf),
    ShowInfo(PathBuf),
    SetTimeout(PathBuf, Option<u64>),
    Lock(PathBuf),
    Unlock(PathBuf, Option<String>),
    ListCertificates(PathBuf),
    Import(PathBuf, PathBuf, String),
}

/// Fake credential store.
///
/// Paths containing `missing` do not exist and paths containing `denied`
/// refuse access. Keychains created through the fake unlock with their own
/// password, all others with [`CORRECT_PASSWORD`].
pub struct RecordingKeychain {
    calls: Mutex<Vec<Call>>,
    created: Mutex<HashMap<PathBuf, String>>,
    certificates: Vec<CodeSigningCertificate>,
}

impl RecordingKeychain {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(HashMap::new()),
            certificates: vec![CodeSigningCertificate::new(
                "0A1B2C3D4E5F60718293A4B5C6D7E8F901234567",
                "Apple Development: Jane Doe (ABCDE12345)",
            )],
        }
    }

    pub fn without_certificates(mut self) -> Self {
        self.certificates.clear();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, keychain: &Path) -> Result<()> {
        let display = keychain.to_string_lossy();
        if display.contains("missing") {
            return Err(KeychainError::KeychainNotFound(keychain.to_path_buf()));
        }
        if display.contains("denied") {
            return Err(KeychainError::AccessDenied {
                path: keychain.to_path_buf(),
                reason: "Permission denied".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeychainService for RecordingKeychain {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn default_keychain(&self) -> Result<PathBuf> {
        self.record(Call::DefaultKeychain);
        Ok(PathBuf::from(DEFAULT_KEYCHAIN))
    }

    async fn set_default_keychain(&self, keychain: &Path) -> Result<()> {
        self.record(Call::SetDefault(keychain.to_path_buf()));
        self.check(keychain)
    }

    async fn create(&self, keychain: &Path, password: &Password) -> Result<()> {
        self.record(Call::Create(
            keychain.to_path_buf(),
            password.expose().to_string(),
        ));
        self.check(keychain)?;
        self.created
            .lock()
            .unwrap()
            .insert(keychain.to_path_buf(), password.expose().to_string());
        Ok(())
    }

    async fn delete(&self, keychain: &Path) -> Result<()> {
        self.record(Call::Delete(keychain.to_path_buf()));
        self.check(keychain)
    }

    async fn show_info(&self, keychain: &Path) -> Result<String> {
        self.record(Call::ShowInfo(keychain.to_path_buf()));
        self.check(keychain)?;
        Ok(format!("Keychain \"{}\" no-timeout", keychain.display()))
    }

    async fn set_timeout(&self, keychain: &Path, timeout: Option<u64>) -> Result<()> {
        self.record(Call::SetTimeout(keychain.to_path_buf(), timeout));
        self.check(keychain)
    }

    async fn lock(&self, keychain: &Path) -> Result<()> {
        self.record(Call::Lock(keychain.to_path_buf()));
        self.check(keychain)
    }

    async fn unlock(&self, keychain: &Path, password: Option<&Password>) -> Result<()> {
        self.record(Call::Unlock(
            keychain.to_path_buf(),
            password.map(|p| p.expose().to_string()),
        ));
        self.check(keychain)?;

        let Some(password) = password else {
            // Stands in for the interactive prompt
            return Ok(());
        };
        let expected = self
            .created
            .lock()
            .unwrap()
            .get(keychain)
            .cloned()
            .unwrap_or_else(|| CORRECT_PASSWORD.to_string());
        if password.expose() == expected {
            Ok(())
        } else {
            Err(KeychainError::AuthenticationFailed(keychain.to_path_buf()))
        }
    }

    async fn list_code_signing_certificates(
        &self,
        keychain: &Path,
    ) -> Result<Vec<CodeSigningCertificate>> {
        self.record(Call::ListCertificates(keychain.to_path_buf()));
        self.check(keychain)?;
        Ok(self.certificates.clone())
    }

    async fn import_certificate(
        &self,
        keychain: &Path,
        certificate: &Path,
        password: &Password,
    ) -> Result<ImportOutcome> {
        self.record(Call::Import(
            keychain.to_path_buf(),
            certificate.to_path_buf(),
            password.expose().to_string(),
        ));
        self.check(keychain)?;
        if certificate.to_string_lossy().contains("dup") {
            Ok(ImportOutcome::AlreadyPresent)
        } else {
            Ok(ImportOutcome::Imported)
        }
    }
}

/// Parse and run a command line against the fake with default config
pub fn run(keychain: &RecordingKeychain, args: &[&str]) -> anyhow::Result<()> {
    run_with_config(keychain, &Config::default(), args)
}

pub fn run_with_config(
    keychain: &RecordingKeychain,
    config: &Config,
    args: &[&str],
) -> anyhow::Result<()> {
    match parse_args(args.iter().copied())? {
        Invocation::Run(cli) => cli.execute_with(keychain, config),
        Invocation::Display(text) => panic!("unexpected help output: {text}"),
    }
}
