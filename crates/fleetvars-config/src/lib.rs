//! Configuration for the fleetvars CLI.
//!
//! TOML profiles, token resolution (env + keyring + token file +
//! plaintext), API URL validation, and the TLS mode a profile implies.
//! The CLI layers its flag overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use fleetvars_core::TlsVerification;

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "BALENA_API_KEY";

/// Keyring service under which tokens are stored (`<profile>/token`).
pub const KEYRING_SERVICE: &str = "fleetvars";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' requires the token in ${var}, which is not set")]
    MissingEnvToken { profile: String, var: &'static str },

    #[error("profile '{0}' not found in config")]
    UnknownProfile(String),

    #[error("failed to read token file {path}: {source}")]
    TokenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The named profile, or the default profile when `name` is `None`.
    ///
    /// A missing *default* profile falls back to built-in settings; a
    /// missing *named* profile is an error.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        match name {
            Some(name) => self
                .profiles
                .get(name)
                .cloned()
                .map(|p| (name.to_owned(), p))
                .ok_or_else(|| ConfigError::UnknownProfile(name.to_owned())),
            None => {
                let name = self.default_profile.as_deref().unwrap_or("default");
                let profile = self.profiles.get(name).cloned().unwrap_or_default();
                Ok((name.to_owned(), profile))
            }
        }
    }
}

/// Settings shared by every profile. Output format and color are
/// per-invocation flags (`--output`, `--color`, `$FLEETVARS_OUTPUT`).
#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds when neither flag nor profile sets one.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named API profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API root. Defaults to the public balenaCloud endpoint.
    pub api_url: Option<String>,

    /// Token file. Defaults to `~/.balena/token`.
    pub token_path: Option<PathBuf>,

    /// Require the token from `$BALENA_API_KEY`.
    #[serde(default)]
    pub use_env_var: bool,

    /// API token (plaintext; prefer the keyring or a token file).
    pub token: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fleetvars", "fleetvars").map_or_else(
        || home_dir().join(".config").join("fleetvars").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn home_dir() -> PathBuf {
    BaseDirs::new().map_or_else(|| PathBuf::from("."), |b| b.home_dir().to_path_buf())
}

/// Default token file written by the balena CLI.
pub fn default_token_path() -> PathBuf {
    home_dir().join(".balena").join("token")
}

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path` (missing file is fine) layered under
/// `FLEETVARS_`-prefixed env vars (`FLEETVARS_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLEETVARS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Render a config as TOML with plaintext tokens masked.
pub fn render_masked(cfg: &Config) -> Result<String, ConfigError> {
    let masked = Config {
        default_profile: cfg.default_profile.clone(),
        defaults: Defaults {
            timeout: cfg.defaults.timeout,
        },
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let mut p = p.clone();
                if p.token.is_some() {
                    p.token = Some("********".into());
                }
                (name.clone(), p)
            })
            .collect(),
    };
    Ok(toml::to_string_pretty(&masked)?)
}

// ── Validation ──────────────────────────────────────────────────────

/// The API URL must be non-empty and use `https://`.
pub fn validate_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Validation {
        field: "api_url".into(),
        reason,
    };

    if raw.trim().is_empty() {
        return Err(invalid("must not be empty".into()));
    }
    if !raw.starts_with("https://") {
        return Err(invalid(format!("must start with https://, got '{raw}'")));
    }
    raw.parse()
        .map_err(|e| invalid(format!("not a valid URL ({e}): {raw}")))
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the API token from the credential chain:
///
/// 1. `$BALENA_API_KEY` (mandatory when the profile sets `use_env_var`)
/// 2. System keyring (`fleetvars` / `<profile>/token`)
/// 3. Token file (`token_path`, default `~/.balena/token`), trimmed
/// 4. Plaintext `token` in the profile
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_token_from(
        profile,
        profile_name,
        |var| std::env::var(var).ok(),
        |user| {
            keyring::Entry::new(KEYRING_SERVICE, user)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_token_from(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let non_empty = |s: String| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    };

    // 1. Environment
    if let Some(token) = env(TOKEN_ENV_VAR).and_then(non_empty) {
        debug!(source = "env", "resolved API token");
        return Ok(SecretString::from(token));
    }
    if profile.use_env_var {
        return Err(ConfigError::MissingEnvToken {
            profile: profile_name.into(),
            var: TOKEN_ENV_VAR,
        });
    }

    // 2. Keyring
    if let Some(token) = keyring(&format!("{profile_name}/token")).and_then(non_empty) {
        debug!(source = "keyring", "resolved API token");
        return Ok(SecretString::from(token));
    }

    // 3. Token file
    let path = profile
        .token_path
        .as_deref()
        .map_or_else(default_token_path, expand_home);
    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            if let Some(token) = non_empty(contents) {
                debug!(source = "file", path = %path.display(), "resolved API token");
                return Ok(SecretString::from(token));
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => return Err(ConfigError::TokenFile { path, source }),
    }

    // 4. Plaintext in config
    if let Some(token) = profile.token.clone().and_then(non_empty) {
        debug!(source = "config", "resolved API token");
        return Ok(SecretString::from(token));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
        .and_then(|entry| entry.set_password(token.trim()))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── TLS ─────────────────────────────────────────────────────────────

/// TLS mode implied by a profile: `insecure` wins over `ca_cert`.
pub fn tls_for(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(expand_home(ca_path))
    } else {
        TlsVerification::SystemDefaults
    }
}
