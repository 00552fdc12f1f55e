//! CLI flag overrides on top of `fleetvars-config` profiles.
//!
//! This is the single boundary where CLI config crosses into core types.

use std::time::Duration;

use secrecy::SecretString;

use fleetvars_config::{Config, load_config, resolve_token, tls_for, validate_api_url};
use fleetvars_core::{DEFAULT_API_URL, SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build a `SessionConfig` from the config file, active profile, and flags.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config()?;
    resolve_session_config(&cfg, global)
}

fn resolve_session_config(cfg: &Config, global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let (profile_name, profile) = cfg.profile(global.profile.as_deref())?;

    // 1. API URL (flag > env > profile > default)
    let raw_url = global
        .api_url
        .as_deref()
        .or(profile.api_url.as_deref())
        .unwrap_or(DEFAULT_API_URL);
    let api_url = validate_api_url(raw_url)?;

    // 2. Timeout (flag > profile > defaults); zero would fail every request
    let timeout_secs = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);
    if timeout_secs == 0 {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    let timeout = Duration::from_secs(timeout_secs);

    // 3. Token (flag > credential chain)
    let token = match global.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => SecretString::from(token.to_owned()),
        _ => resolve_token(&profile, &profile_name)?,
    };

    // 4. TLS verification
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        tls_for(&profile)
    };

    tracing::debug!(profile = %profile_name, %api_url, ?timeout, "resolved session config");
    Ok(SessionConfig {
        api_url,
        token,
        tls,
        timeout,
    })
}

/// Active profile name: `--profile`, else the config's default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}
