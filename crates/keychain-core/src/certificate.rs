//! Code signing certificates reported by the credential store

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of code signing certificate, derived from its common name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateKind {
    /// Apple Development / iPhone Developer / Mac Developer
    AppleDevelopment,
    /// Apple Distribution / iPhone Distribution / 3rd Party Mac Developer Application
    AppleDistribution,
    /// Developer ID Application
    DeveloperIdApplication,
    /// Developer ID Installer
    DeveloperIdInstaller,
    /// Mac Installer Distribution / 3rd Party Mac Developer Installer
    MacInstallerDistribution,
    /// Anything else usable for code signing
    Generic,
}

impl CertificateKind {
    /// Determine the kind from a certificate common name
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("Developer ID Application") {
            Self::DeveloperIdApplication
        } else if name.starts_with("Developer ID Installer") {
            Self::DeveloperIdInstaller
        } else if name.starts_with("Mac Installer Distribution")
            || name.starts_with("3rd Party Mac Developer Installer")
        {
            Self::MacInstallerDistribution
        } else if name.starts_with("Apple Distribution")
            || name.starts_with("iPhone Distribution")
            || name.starts_with("3rd Party Mac Developer Application")
        {
            Self::AppleDistribution
        } else if name.starts_with("Apple Development")
            || name.starts_with("iPhone Developer")
            || name.starts_with("Mac Developer")
        {
            Self::AppleDevelopment
        } else {
            Self::Generic
        }
    }
}

impl std::fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AppleDevelopment => write!(f, "Apple Development"),
            Self::AppleDistribution => write!(f, "Apple Distribution"),
            Self::DeveloperIdApplication => write!(f, "Developer ID Application"),
            Self::DeveloperIdInstaller => write!(f, "Developer ID Installer"),
            Self::MacInstallerDistribution => write!(f, "Mac Installer Distribution"),
            Self::Generic => write!(f, "Generic"),
        }
    }
}

/// A code signing certificate (with private key) found in a keychain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSigningCertificate {
    /// SHA-1 fingerprint as printed by `security`
    pub fingerprint: String,

    /// Certificate common name
    pub name: String,

    /// Kind of certificate
    #[serde(rename = "type")]
    pub kind: CertificateKind,

    /// Apple Team ID, when the name carries one
    pub team_id: Option<String>,

    /// Keychain the certificate was listed from
    pub keychain: Option<PathBuf>,
}

fn identity_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Format: `  1) 0123ABCD... "Apple Development: Jane Doe (TEAMID1234)"`
    RE.get_or_init(|| {
        Regex::new(r#"^\s*\d+\)\s+([0-9A-Fa-f]{40})\s+"(.+)"(?:\s+\(.*\))?\s*$"#)
            .expect("identity line regex is valid")
    })
}

impl CodeSigningCertificate {
    /// Create a certificate from its fingerprint and common name
    pub fn new(fingerprint: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let team_id = name
            .rfind('(')
            .zip(name.rfind(')'))
            .filter(|(start, end)| start < end)
            .map(|(start, end)| name[start + 1..end].to_string())
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()));

        Self {
            fingerprint: fingerprint.into(),
            kind: CertificateKind::from_name(&name),
            team_id,
            name,
            keychain: None,
        }
    }

    /// Parse one line of `security find-identity` output
    pub fn parse_identity_line(line: &str) -> Option<Self> {
        let captures = identity_line_regex().captures(line)?;
        Some(Self::new(&captures[1], &captures[2]))
    }

    /// Parse the full output of `security find-identity`.
    ///
    /// The same identity may be listed under both "Policy" sections, so
    /// duplicates by fingerprint are dropped.
    pub fn parse_identities(output: &str) -> Vec<Self> {
        let mut certificates: Vec<Self> = Vec::new();
        for certificate in output.lines().filter_map(Self::parse_identity_line) {
            if !certificates
                .iter()
                .any(|c| c.fingerprint == certificate.fingerprint)
            {
                certificates.push(certificate);
            }
        }
        certificates
    }
}

impl std::fmt::Display for CodeSigningCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.fingerprint, self.name)
    }
}
