// ── Core error types ──
//
// Every reconciliation failure surfaces as a typed `CoreError` carrying the
// scope and variable name involved. The `From<fleetvars_api::Error>` impl
// translates transport-layer errors; nothing here is retried or swallowed.

use thiserror::Error;

use crate::scope::VariableScope;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Variable '{name}' not found in {scope}")]
    NotFound { name: String, scope: VariableScope },

    #[error("Variable '{name}' already exists in {scope}")]
    AlreadyExists { name: String, scope: VariableScope },

    /// The listing holds several variables with the requested name, so no
    /// single remote id can be chosen.
    #[error("Variable '{name}' is ambiguous in {scope}: {count} entries share the name")]
    ConflictAmbiguous {
        name: String,
        scope: VariableScope,
        count: usize,
    },

    #[error("Operation cancelled")]
    Cancelled,

    // ── Parent resolution ────────────────────────────────────────────
    #[error("{kind} '{identifier}' not found")]
    ParentNotFound { kind: String, identifier: String },

    #[error("{kind} '{identifier}' matched {count} entities")]
    ParentAmbiguous {
        kind: String,
        identifier: String,
        count: usize,
    },

    // ── Remote errors ────────────────────────────────────────────────
    /// Non-2xx response, or a transport failure (`status` is `None`).
    ///
    /// `scope` and `name` are filled in by the reconciler for the call that
    /// failed; parent lookups leave them empty.
    #[error("Remote error{}{}: {message}", status_suffix(.status), target_suffix(.scope, .name))]
    Remote {
        status: Option<u16>,
        message: String,
        scope: Option<VariableScope>,
        name: Option<String>,
    },

    /// The response body could not be decoded.
    #[error("Malformed response{}: {message}", target_suffix(.scope, .name))]
    Decode {
        message: String,
        scope: Option<VariableScope>,
        name: Option<String>,
    },

    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Authentication failed{}: {message}", status_suffix(.status))]
    AuthenticationFailed { status: Option<u16>, message: String },

    // ── Input / configuration ────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` for failures reported by (or on the way to) the API.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Remote { .. }
                | Self::Decode { .. }
                | Self::ConnectionFailed { .. }
                | Self::Timeout
                | Self::AuthenticationFailed { .. }
        )
    }

    /// Attach the scope and variable a remote failure belongs to.
    ///
    /// Only `Remote` and `Decode` carry a target; fields already set are
    /// kept, every other variant passes through unchanged.
    #[must_use]
    pub fn with_target(mut self, target: VariableScope, variable: Option<&str>) -> Self {
        if let Self::Remote { scope, name, .. } | Self::Decode { scope, name, .. } = &mut self {
            scope.get_or_insert(target);
            if name.is_none() {
                *name = variable.map(str::to_owned);
            }
        }
        self
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn target_suffix(scope: &Option<VariableScope>, name: &Option<String>) -> String {
    match (scope, name) {
        (Some(scope), Some(name)) => format!(" for variable '{name}' in {scope}"),
        (Some(scope), None) => format!(" in {scope}"),
        (None, Some(name)) => format!(" for variable '{name}'"),
        (None, None) => String::new(),
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fleetvars_api::Error> for CoreError {
    fn from(err: fleetvars_api::Error) -> Self {
        use fleetvars_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed {
                status: None,
                message,
            },
            ApiError::InvalidToken => CoreError::AuthenticationFailed {
                status: None,
                message: "API token is empty or malformed".into(),
            },
            ApiError::Unauthorized => CoreError::AuthenticationFailed {
                status: Some(401),
                message: "API token rejected".into(),
            },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Remote {
                        status: e.status().map(|s| s.as_u16()),
                        message: e.to_string(),
                        scope: None,
                        name: None,
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            ApiError::Api { status, message } => CoreError::Remote {
                status: Some(status),
                message,
                scope: None,
                name: None,
            },
            ApiError::NotFound { entity, identifier } => CoreError::ParentNotFound {
                kind: entity.into(),
                identifier,
            },
            ApiError::Ambiguous {
                entity,
                identifier,
                count,
            } => CoreError::ParentAmbiguous {
                kind: entity.into(),
                identifier,
                count,
            },
            ApiError::Deserialization { message, body: _ } => CoreError::Decode {
                message,
                scope: None,
                name: None,
            },
        }
    }
}
