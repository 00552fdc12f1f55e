use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// A bearer token for the fleet API.
///
/// Session tokens and named API keys are both sent as
/// `Authorization: Bearer <token>`; the API does not distinguish them.
#[derive(Debug, Clone)]
pub struct ApiToken(SecretString);

impl ApiToken {
    /// Wrap a raw token. Surrounding whitespace (trailing newlines from
    /// token files, mostly) is stripped.
    pub fn new(raw: &str) -> Self {
        Self(SecretString::from(raw.trim().to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// Default headers carrying this token. The header is marked sensitive
    /// so it never shows up in debug output.
    pub fn headers(&self) -> Result<HeaderMap, Error> {
        if self.is_empty() {
            return Err(Error::InvalidToken);
        }
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0.expose_secret()))
            .map_err(|_| Error::InvalidToken)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

impl From<SecretString> for ApiToken {
    fn from(secret: SecretString) -> Self {
        Self::new(secret.expose_secret())
    }
}
