// Async HTTP client for the fleet API v7 (OData flavoured REST).
//
// Base path: /v7/
// Auth: Authorization: Bearer <token>
// Listing responses are wrapped as `{"d": [...]}`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::ApiToken;
use crate::error::Error;
use crate::models::ListResponse;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

// Most errors come back as plain text; some proxies answer with JSON.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

const ERROR_PREVIEW_LEN: usize = 200;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the fleet API.
///
/// Holds no global state: every consumer is handed an explicit client.
/// Endpoint groups (variables, fleets, devices, services) are inherent
/// methods defined in their own modules.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a bearer token and transport config.
    pub fn from_token(
        base_url: &str,
        token: &ApiToken,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(token.headers()?)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/` so relative joins keep its path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The API base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a versioned resource path (e.g. `"device(uuid='abc')"`) onto the base URL.
    pub(crate) fn url(&self, resource: &str) -> Result<Url, Error> {
        Ok(self
            .base_url
            .join(&format!("{}/{resource}", crate::API_VERSION))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, resource: &str) -> Result<T, Error> {
        let url = self.url(resource)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// GET a collection with an OData `$filter`, unwrapping the `d` envelope.
    pub(crate) async fn list_filtered<T: DeserializeOwned>(
        &self,
        resource: &str,
        filter: &str,
    ) -> Result<Vec<T>, Error> {
        let url = self.url(resource)?;
        debug!("GET {url} $filter={filter:?}");

        let resp = self
            .http
            .get(url)
            .query(&[("$filter", filter)])
            .send()
            .await?;
        let envelope: ListResponse<T> = self.handle_response(resp).await?;
        Ok(envelope.data)
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(resource)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn patch_no_response<B: Serialize + Sync>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(resource)?;
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn delete(&self, resource: &str) -> Result<(), Error> {
        let url = self.url(resource)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = preview(&body);
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(ErrorResponse {
                message: Some(m), ..
            })
            | Ok(ErrorResponse { error: Some(m), .. }) => m,
            _ if raw.trim().is_empty() => status.to_string(),
            _ => preview(raw.trim()).to_owned(),
        };

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Probe the organization endpoint to confirm the token is accepted.
    ///
    /// 401 and 403 both mean the credentials need refreshing.
    pub async fn check_credentials(&self) -> Result<(), Error> {
        let url = self.url("organization")?;
        debug!("GET {url} (credential check)");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: "the credentials may need to be refreshed".into(),
            });
        }
        self.handle_empty(resp).await
    }
}

/// Truncate a body to a short preview on a char boundary.
fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Quote a string literal for an OData key or filter (`'` doubles).
pub(crate) fn odata_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::from_reqwest("https://api.example.com", reqwest::Client::new())
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/");
    }

    #[test]
    fn base_url_path_is_kept() {
        let client =
            ApiClient::from_reqwest("https://example.com/balena/", reqwest::Client::new()).unwrap();
        let url = client.url("device").unwrap();
        assert_eq!(url.as_str(), "https://example.com/balena/v7/device");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ApiClient::from_reqwest("not a url", reqwest::Client::new());
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn odata_quote_escapes_quotes() {
        assert_eq!(odata_quote("o'neil"), "'o''neil'");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        assert_eq!(preview(&long).chars().count(), ERROR_PREVIEW_LEN);
    }
}
