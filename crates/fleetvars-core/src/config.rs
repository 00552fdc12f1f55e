// ── Runtime session configuration ──
//
// Describes how to reach the fleet API: endpoint, token, TLS, timeout.
// Built by the CLI from a config profile; core never reads config files.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use fleetvars_api::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file, for self-hosted API deployments.
    CustomCa(PathBuf),
    /// Skip verification.
    DangerAcceptInvalid,
}

impl TlsVerification {
    fn to_tls_mode(&self) -> TlsMode {
        match self {
            Self::SystemDefaults => TlsMode::System,
            Self::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Everything needed to open a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// API root, e.g. `https://api.balena-cloud.com/`.
    pub api_url: Url,
    pub token: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,
}

impl SessionConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_url: Url, token: SecretString) -> Self {
        Self {
            api_url,
            token,
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.to_tls_mode(),
            timeout: self.timeout,
        }
    }
}
