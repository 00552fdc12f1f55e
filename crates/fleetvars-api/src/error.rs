use thiserror::Error;

/// Top-level error type for the `fleetvars-api` crate.
///
/// Covers every failure mode of the HTTP surface: authentication,
/// transport, non-2xx responses, and malformed bodies.
/// `fleetvars-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected while probing the API.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The token is empty or cannot be used as a header value.
    #[error("Invalid API token")]
    InvalidToken,

    /// The API answered 401 to a data call.
    #[error("API token rejected (HTTP 401)")]
    Unauthorized,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Any non-2xx response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A lookup that must match exactly one entity matched none.
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: &'static str, identifier: String },

    /// A lookup that must match exactly one entity matched several.
    #[error("{count} {entity}s matched {identifier}")]
    Ambiguous {
        entity: &'static str,
        identifier: String,
        count: usize,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credentials were rejected and need refreshing.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::InvalidToken
                | Self::Unauthorized
                | Self::Api { status: 403, .. }
        )
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } | Self::NotFound { .. } => true,
            _ => false,
        }
    }

    /// The HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
