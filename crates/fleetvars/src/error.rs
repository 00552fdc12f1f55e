//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fleetvars_config::ConfigError;
use fleetvars_core::{CoreError, VariableScope};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(fleetvars::connection_failed),
        help(
            "Check network access to the API.\n\
             Reason: {reason}\n\
             Self-hosted API with a private CA? Set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(fleetvars::timeout),
        help("Increase the timeout with --timeout or in your profile.")
    )]
    Timeout,

    #[error("Interrupted")]
    #[diagnostic(
        code(fleetvars::cancelled),
        help("A write already sent before the interrupt is not rolled back.")
    )]
    Cancelled,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fleetvars::auth_failed),
        help(
            "The credentials may need to be refreshed.\n\
             Run: fleetvars config set-token, or refresh ~/.balena/token with `balena login`."
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(fleetvars::no_credentials),
        help(
            "Provide a token with --token, $BALENA_API_KEY, `fleetvars config set-token`,\n\
             or a token file (~/.balena/token by default)."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Variable '{name}' not found in {scope}")]
    #[diagnostic(
        code(fleetvars::variable_not_found),
        help("Run: fleetvars vars list to see the variables under this scope")
    )]
    VariableNotFound { name: String, scope: String },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fleetvars::not_found),
        help("Run: fleetvars {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' {reason}")]
    #[diagnostic(code(fleetvars::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
        reason: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}){target}: {message}")]
    #[diagnostic(code(fleetvars::api_error))]
    ApiError {
        code: String,
        target: String,
        message: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetvars::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fleetvars::profile_not_found),
        help("Run: fleetvars config show to list configured profiles")
    )]
    ProfileNotFound { name: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(fleetvars::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(fleetvars::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Cancelled => exit_code::CANCELLED,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::VariableNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { name, scope } => CliError::VariableNotFound {
                name,
                scope: scope.to_string(),
            },

            CoreError::AlreadyExists { name, scope } => CliError::Conflict {
                resource_type: "Variable".into(),
                identifier: name,
                reason: format!("already exists in {scope} (use `vars update` or `vars set`)"),
            },

            CoreError::ConflictAmbiguous { name, scope, count } => CliError::Conflict {
                resource_type: "Variable".into(),
                identifier: name,
                reason: format!("appears {count} times in {scope}; refusing to pick one"),
            },

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::ParentNotFound { kind, identifier } => CliError::NotFound {
                list_command: match kind.as_str() {
                    "service" => "services list --fleet <fleet>".into(),
                    other => format!("{other} get <id>"),
                },
                resource_type: kind,
                identifier,
            },

            CoreError::ParentAmbiguous {
                kind,
                identifier,
                count,
            } => CliError::Conflict {
                resource_type: kind,
                identifier,
                reason: format!("matched {count} entities"),
            },

            CoreError::Remote {
                status,
                message,
                scope,
                name,
            } => CliError::ApiError {
                code: status.map_or_else(|| "transport".into(), |s| s.to_string()),
                target: describe_target(scope, name.as_deref()),
                message,
            },

            CoreError::Decode {
                message,
                scope,
                name,
            } => CliError::ApiError {
                code: "malformed response".into(),
                target: describe_target(scope, name.as_deref()),
                message,
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Timeout => CliError::Timeout,

            CoreError::AuthenticationFailed { status, message } => CliError::AuthFailed {
                message: match status {
                    Some(s) => format!("{message} (HTTP {s})"),
                    None => message,
                },
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

/// ` for variable 'NAME' in fleet 42`, or whichever part is known.
fn describe_target(scope: Option<VariableScope>, name: Option<&str>) -> String {
    match (scope, name) {
        (Some(scope), Some(name)) => format!(" for variable '{name}' in {scope}"),
        (Some(scope), None) => format!(" in {scope}"),
        (None, Some(name)) => format!(" for variable '{name}'"),
        (None, None) => String::new(),
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::MissingEnvToken { .. } => CliError::AuthFailed {
                message: err.to_string(),
            },
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound { name },
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_have_distinct_exit_codes() {
        let scope = VariableScope::fleet(42);
        let not_found: CliError = CoreError::NotFound {
            name: "DEBUG".into(),
            scope,
        }
        .into();
        let exists: CliError = CoreError::AlreadyExists {
            name: "DEBUG".into(),
            scope,
        }
        .into();
        let ambiguous: CliError = CoreError::ConflictAmbiguous {
            name: "DEBUG".into(),
            scope,
            count: 2,
        }
        .into();

        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(exists.exit_code(), exit_code::CONFLICT);
        assert_eq!(ambiguous.exit_code(), exit_code::CONFLICT);
        assert_eq!(not_found.to_string(), "Variable 'DEBUG' not found in fleet 42");
    }

    #[test]
    fn cancellation_exits_130() {
        assert_eq!(CliError::from(CoreError::Cancelled).exit_code(), 130);
    }

    #[test]
    fn config_errors_map_to_usage_and_auth() {
        let invalid: CliError = ConfigError::Validation {
            field: "api_url".into(),
            reason: "must start with https://".into(),
        }
        .into();
        let missing: CliError = ConfigError::NoCredentials {
            profile: "default".into(),
        }
        .into();
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
        assert_eq!(missing.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn remote_failures_name_the_variable_they_hit() {
        let err: CliError = CoreError::Remote {
            status: Some(404),
            message: "no such variable".into(),
            scope: Some(VariableScope::fleet(42)),
            name: Some("DEBUG".into()),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "API error (404) for variable 'DEBUG' in fleet 42: no such variable"
        );

        let untargeted: CliError = CoreError::Decode {
            message: "expected value".into(),
            scope: None,
            name: None,
        }
        .into();
        assert_eq!(
            untargeted.to_string(),
            "API error (malformed response): expected value"
        );
    }

    #[test]
    fn rejected_token_reports_status_and_exits_as_auth() {
        let err: CliError = CoreError::AuthenticationFailed {
            status: Some(401),
            message: "API token rejected".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert_eq!(
            err.to_string(),
            "Authentication failed: API token rejected (HTTP 401)"
        );
    }
}
