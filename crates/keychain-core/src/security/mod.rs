//! Keychain service backed by the macOS `security` utility

mod command;

pub use command::{CommandOutput, SecurityCommand, OBFUSCATION};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::certificate::CodeSigningCertificate;
use crate::config::{SecurityConfig, DEFAULT_CODESIGN_PATH, DEFAULT_SECURITY_PATH};
use crate::error::{KeychainError, Result};
use crate::password::Password;
use crate::service::{ImportOutcome, KeychainService};

const ALREADY_EXISTS: &str = "already exists in the keychain";

/// Keychain service using `security`
pub struct SecurityCli {
    /// Path to security binary
    security_path: PathBuf,
    /// Path to codesign binary, granted access to imported keys
    codesign_path: Option<PathBuf>,
}

impl SecurityCli {
    pub fn new() -> Self {
        Self {
            security_path: PathBuf::from(DEFAULT_SECURITY_PATH),
            codesign_path: None,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            security_path: config.security_path.clone(),
            codesign_path: config.codesign_path.clone(),
        }
    }

    pub fn with_security_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.security_path = path.into();
        self
    }

    pub fn with_codesign_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.codesign_path = Some(path.into());
        self
    }

    fn command(&self, verb: &str) -> SecurityCommand {
        SecurityCommand::new(&self.security_path).arg(verb)
    }

    fn codesign_path(&self) -> PathBuf {
        self.codesign_path
            .clone()
            .or_else(|| which::which("codesign").ok())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CODESIGN_PATH))
    }

    /// Run a command, turning a non-zero exit into a classified error
    async fn run(&self, keychain: Option<&Path>, command: SecurityCommand) -> Result<CommandOutput> {
        let output = command.output().await?;
        if !output.success() {
            return Err(KeychainError::from_security_failure(
                keychain,
                command.redacted(),
                output.status,
                &output.stderr,
            ));
        }
        Ok(output)
    }

    pub(crate) fn create_command(&self, keychain: &Path, password: &Password) -> SecurityCommand {
        self.command("create-keychain")
            .arg("-p")
            .secret(password)
            .path(keychain)
    }

    pub(crate) fn search_list_command(&self, keychain: &Path) -> SecurityCommand {
        self.command("list-keychains")
            .arg("-d")
            .arg("user")
            .arg("-s")
            .arg("login.keychain")
            .path(keychain)
    }

    pub(crate) fn set_timeout_command(&self, keychain: &Path, timeout: Option<u64>) -> SecurityCommand {
        let command = self.command("set-keychain-settings");
        let command = match timeout {
            Some(seconds) => command.arg("-t").arg(seconds.to_string()),
            None => command,
        };
        command.path(keychain)
    }

    pub(crate) fn unlock_command(&self, keychain: &Path, password: Option<&Password>) -> SecurityCommand {
        let command = self.command("unlock-keychain");
        let command = match password {
            Some(password) => command.arg("-p").secret(password),
            None => command.interactive(),
        };
        command.path(keychain)
    }

    pub(crate) fn import_command(
        &self,
        keychain: &Path,
        certificate: &Path,
        password: &Password,
    ) -> SecurityCommand {
        // An explicit -P, even when empty, keeps security from opening a
        // password dialog that would hang non-interactive sessions.
        self.command("import")
            .path(certificate)
            .arg("-f")
            .arg("pkcs12")
            .arg("-k")
            .path(keychain)
            .arg("-T")
            .path(&self.codesign_path())
            .arg("-P")
            .secret(password)
    }
}

impl Default for SecurityCli {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip whitespace and quotes from `security default-keychain` output
pub fn parse_default_keychain(output: &str) -> Option<PathBuf> {
    let cleaned = output.trim().trim_matches('"').trim_matches('\'').trim();
    (!cleaned.is_empty()).then(|| PathBuf::from(cleaned))
}

/// Bare names like `build.keychain` are stored by `security` under
/// `~/Library/Keychains`, not relative to the working directory.
fn has_directory(keychain: &Path) -> bool {
    keychain
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty())
}

#[async_trait::async_trait]
impl KeychainService for SecurityCli {
    fn name(&self) -> &str {
        "security"
    }

    fn is_available(&self) -> bool {
        self.security_path.exists() || which::which(&self.security_path).is_ok()
    }

    async fn default_keychain(&self) -> Result<PathBuf> {
        debug!("resolving system default keychain");
        let command = self.command("default-keychain");
        let output = self.run(None, command.clone()).await?;

        parse_default_keychain(&output.stdout).ok_or_else(|| KeychainError::Command {
            command: command.redacted(),
            status: output.status,
            stderr: "no default keychain reported".to_string(),
        })
    }

    async fn set_default_keychain(&self, keychain: &Path) -> Result<()> {
        info!(keychain = %keychain.display(), "setting system default keychain");
        let command = self.command("default-keychain").arg("-s").path(keychain);
        self.run(Some(keychain), command).await?;
        Ok(())
    }

    async fn create(&self, keychain: &Path, password: &Password) -> Result<()> {
        info!(keychain = %keychain.display(), "creating keychain");
        self.run(Some(keychain), self.create_command(keychain, password))
            .await?;
        self.run(Some(keychain), self.search_list_command(keychain))
            .await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if has_directory(keychain) && keychain.exists() {
                tokio::fs::set_permissions(keychain, std::fs::Permissions::from_mode(0o600))
                    .await?;
            }
        }

        Ok(())
    }

    async fn delete(&self, keychain: &Path) -> Result<()> {
        info!(keychain = %keychain.display(), "deleting keychain");
        let command = self.command("delete-keychain").path(keychain);
        self.run(Some(keychain), command).await?;
        Ok(())
    }

    async fn show_info(&self, keychain: &Path) -> Result<String> {
        let command = self.command("show-keychain-info").path(keychain);
        let output = self.run(Some(keychain), command).await?;
        Ok(output.text().trim().to_string())
    }

    async fn set_timeout(&self, keychain: &Path, timeout: Option<u64>) -> Result<()> {
        match timeout {
            Some(seconds) => info!(keychain = %keychain.display(), seconds, "setting keychain timeout"),
            None => info!(keychain = %keychain.display(), "setting keychain to no timeout"),
        }
        self.run(Some(keychain), self.set_timeout_command(keychain, timeout))
            .await?;
        Ok(())
    }

    async fn lock(&self, keychain: &Path) -> Result<()> {
        info!(keychain = %keychain.display(), "locking keychain");
        let command = self.command("lock-keychain").path(keychain);
        self.run(Some(keychain), command).await?;
        Ok(())
    }

    async fn unlock(&self, keychain: &Path, password: Option<&Password>) -> Result<()> {
        info!(keychain = %keychain.display(), "unlocking keychain");
        self.run(Some(keychain), self.unlock_command(keychain, password))
            .await?;
        Ok(())
    }

    async fn list_code_signing_certificates(
        &self,
        keychain: &Path,
    ) -> Result<Vec<CodeSigningCertificate>> {
        info!(keychain = %keychain.display(), "listing code signing certificates");
        let command = self
            .command("find-identity")
            .arg("-v")
            .arg("-p")
            .arg("codesigning")
            .path(keychain);
        let output = self.run(Some(keychain), command).await?;

        let certificates = CodeSigningCertificate::parse_identities(&output.stdout)
            .into_iter()
            .map(|mut certificate| {
                certificate.keychain = Some(keychain.to_path_buf());
                certificate
            })
            .collect::<Vec<_>>();
        debug!(count = certificates.len(), "found code signing certificates");
        Ok(certificates)
    }

    async fn import_certificate(
        &self,
        keychain: &Path,
        certificate: &Path,
        password: &Password,
    ) -> Result<ImportOutcome> {
        info!(
            keychain = %keychain.display(),
            certificate = %certificate.display(),
            "adding certificate to keychain"
        );
        let command = self.import_command(keychain, certificate, password);
        let output = command.output().await?;

        if output.success() {
            return Ok(ImportOutcome::Imported);
        }
        if output.stderr.contains(ALREADY_EXISTS) {
            debug!(certificate = %certificate.display(), "certificate already in keychain");
            return Ok(ImportOutcome::AlreadyPresent);
        }

        Err(KeychainError::from_security_failure(
            Some(keychain),
            command.redacted(),
            output.status,
            &output.stderr,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> SecurityCli {
        SecurityCli::new()
            .with_security_path("security")
            .with_codesign_path("/usr/bin/codesign")
    }

    #[test]
    fn test_parse_default_keychain() {
        assert_eq!(
            parse_default_keychain("    \"/Users/ci/Library/Keychains/login.keychain-db\"\n"),
            Some(PathBuf::from("/Users/ci/Library/Keychains/login.keychain-db"))
        );
        assert_eq!(
            parse_default_keychain("'/tmp/build.keychain'"),
            Some(PathBuf::from("/tmp/build.keychain"))
        );
        assert_eq!(parse_default_keychain("  \n"), None);
    }

    #[test]
    fn test_has_directory() {
        assert!(has_directory(Path::new("/tmp/build.keychain")));
        assert!(has_directory(Path::new("keychains/build.keychain")));
        assert!(!has_directory(Path::new("build.keychain")));
    }

    #[test]
    fn test_set_timeout_command() {
        let keychain = Path::new("/tmp/build.keychain");
        assert_eq!(
            cli().set_timeout_command(keychain, Some(3600)).redacted(),
            "security set-keychain-settings -t 3600 /tmp/build.keychain"
        );
        assert_eq!(
            cli().set_timeout_command(keychain, None).redacted(),
            "security set-keychain-settings /tmp/build.keychain"
        );
    }

    #[test]
    fn test_unlock_command() {
        let keychain = Path::new("/tmp/build.keychain");
        let password = Password::new("hunter2");
        assert_eq!(
            cli().unlock_command(keychain, Some(&password)).redacted(),
            "security unlock-keychain -p ******** /tmp/build.keychain"
        );
        assert_eq!(
            cli().unlock_command(keychain, None).redacted(),
            "security unlock-keychain /tmp/build.keychain"
        );
    }

    #[test]
    fn test_create_and_search_list_commands() {
        let keychain = Path::new("/tmp/build.keychain");
        let create = cli().create_command(keychain, &Password::new("pw")).redacted();
        assert_eq!(create, "security create-keychain -p ******** /tmp/build.keychain");
        assert!(!create.contains("pw "));

        assert_eq!(
            cli().search_list_command(keychain).redacted(),
            "security list-keychains -d user -s login.keychain /tmp/build.keychain"
        );
    }

    #[test]
    fn test_import_command() {
        let command = cli().import_command(
            Path::new("/tmp/build.keychain"),
            Path::new("/certs/dist.p12"),
            &Password::empty(),
        );
        assert_eq!(
            command.redacted(),
            "security import /certs/dist.p12 -f pkcs12 -k /tmp/build.keychain -T /usr/bin/codesign -P ********"
        );
    }

    #[cfg(unix)]
    mod stub {
        use super::*;
        use std::sync::OnceLock;

        const SCRIPT: &str = r#"#!/bin/sh
case "$1" in
  default-keychain)
    if [ "$2" = "-s" ]; then exit 0; fi
    echo '    "/Users/ci/Library/Keychains/login.keychain-db"'
    ;;
  find-identity)
    case "$5" in
      *missing*)
        echo "security: SecKeychainOpen $5: The specified keychain could not be found." >&2
        exit 50
        ;;
      *locked*)
        echo "security: SecKeychainSearchCreateFromAttributes: Permission denied" >&2
        exit 1
        ;;
      *empty*)
        echo "     0 valid identities found"
        ;;
      *)
        echo '  1) 0A1B2C3D4E5F60718293A4B5C6D7E8F901234567 "Apple Development: Jane Doe (ABCDE12345)"'
        echo '     1 valid identities found'
        ;;
    esac
    ;;
  unlock-keychain)
    if [ "$#" -eq 2 ]; then exit 0; fi
    if [ "$3" = "correct" ]; then exit 0; fi
    echo "security: SecKeychainUnlock $4: The user name or passphrase you entered is not correct." >&2
    exit 51
    ;;
  show-keychain-info)
    echo "Keychain \"$2\" no-timeout" >&2
    ;;
  import)
    case "$2" in
      *dup*)
        echo "security: SecKeychainItemImport: The specified item already exists in the keychain." >&2
        exit 1
        ;;
    esac
    echo "1 identity imported."
    ;;
  *)
    echo "security: unexpected $1" >&2
    exit 2
    ;;
esac
"#;

        // Written once so no test forks while the script is open for writing
        fn stub_path() -> &'static Path {
            static STUB: OnceLock<PathBuf> = OnceLock::new();
            STUB.get_or_init(|| {
                use std::os::unix::fs::PermissionsExt;
                let dir = std::env::temp_dir()
                    .join(format!("keychain-core-security-stub-{}", std::process::id()));
                std::fs::create_dir_all(&dir).unwrap();
                let path = dir.join("security");
                std::fs::write(&path, SCRIPT).unwrap();
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
                path
            })
        }

        fn stub() -> SecurityCli {
            SecurityCli::new()
                .with_security_path(stub_path())
                .with_codesign_path("/usr/bin/codesign")
        }

        #[tokio::test]
        async fn test_default_keychain() {
            let path = stub().default_keychain().await.unwrap();
            assert_eq!(path, Path::new("/Users/ci/Library/Keychains/login.keychain-db"));
        }

        #[tokio::test]
        async fn test_resolve_prefers_explicit_path() {
            let service = stub();
            let explicit = service
                .resolve(Some(Path::new("/tmp/build.keychain")))
                .await
                .unwrap();
            assert_eq!(explicit, Path::new("/tmp/build.keychain"));

            let default = service.resolve(None).await.unwrap();
            assert_eq!(default, Path::new("/Users/ci/Library/Keychains/login.keychain-db"));
        }

        #[tokio::test]
        async fn test_list_certificates() {
            let keychain = Path::new("/tmp/build.keychain");
            let certificates = stub().list_code_signing_certificates(keychain).await.unwrap();

            assert_eq!(certificates.len(), 1);
            assert_eq!(certificates[0].team_id.as_deref(), Some("ABCDE12345"));
            assert_eq!(certificates[0].keychain.as_deref(), Some(keychain));
        }

        #[tokio::test]
        async fn test_list_certificates_empty() {
            let certificates = stub()
                .list_code_signing_certificates(Path::new("/tmp/empty.keychain"))
                .await
                .unwrap();
            assert!(certificates.is_empty());
        }

        #[tokio::test]
        async fn test_list_certificates_missing_keychain() {
            let result = stub()
                .list_code_signing_certificates(Path::new("/tmp/missing.keychain"))
                .await;
            assert!(matches!(result, Err(KeychainError::KeychainNotFound(p)) if p == Path::new("/tmp/missing.keychain")));
        }

        #[tokio::test]
        async fn test_list_certificates_access_denied() {
            let result = stub()
                .list_code_signing_certificates(Path::new("/tmp/locked.keychain"))
                .await;
            assert!(matches!(result, Err(KeychainError::AccessDenied { .. })));
        }

        #[tokio::test]
        async fn test_unlock_correct_password() {
            let result = stub()
                .unlock(Path::new("/tmp/build.keychain"), Some(&Password::new("correct")))
                .await;
            assert!(result.is_ok());
        }

        #[tokio::test]
        async fn test_unlock_wrong_password() {
            let result = stub()
                .unlock(Path::new("/tmp/build.keychain"), Some(&Password::new("wrong")))
                .await;
            assert!(matches!(result, Err(KeychainError::AuthenticationFailed(_))));
        }

        #[tokio::test]
        async fn test_show_info_reads_stderr() {
            let info = stub().show_info(Path::new("/tmp/build.keychain")).await.unwrap();
            assert_eq!(info, "Keychain \"/tmp/build.keychain\" no-timeout");
        }

        #[tokio::test]
        async fn test_import_already_present() {
            let service = stub();
            let keychain = Path::new("/tmp/build.keychain");

            let imported = service
                .import_certificate(keychain, Path::new("/certs/new.p12"), &Password::empty())
                .await
                .unwrap();
            assert_eq!(imported, ImportOutcome::Imported);

            let duplicate = service
                .import_certificate(keychain, Path::new("/certs/dup.p12"), &Password::empty())
                .await
                .unwrap();
            assert_eq!(duplicate, ImportOutcome::AlreadyPresent);
        }

        #[tokio::test]
        async fn test_unexpected_failure_is_command_error() {
            let result = stub().lock(Path::new("/tmp/build.keychain")).await;
            match result {
                Err(KeychainError::Command { command, status, .. }) => {
                    assert!(command.ends_with("lock-keychain /tmp/build.keychain"));
                    assert_eq!(status, 2);
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }
}
