// ── Session: the configured entry point ──
//
// A `Session` owns one authenticated API client and one cancellation
// token. Reconcilers handed out by the session share the client and get a
// child token, so cancelling the session aborts every in-flight call.

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use fleetvars_api::{ApiClient, ApiToken, DeviceRecord, FleetKey, FleetRecord, ServiceRecord};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::reconciler::{Reconciler, cancellable};
use crate::store::ApiVariableStore;

#[derive(Debug, Clone)]
pub struct Session {
    client: ApiClient,
    cancel: CancellationToken,
}

impl Session {
    /// Build the HTTP client described by `config`. No request is sent.
    pub fn new(config: &SessionConfig) -> Result<Self, CoreError> {
        let token = ApiToken::from(config.token.clone());
        let client = ApiClient::from_token(config.api_url.as_str(), &token, &config.transport())?;
        debug!(api_url = %config.api_url, "session configured");
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Abort every pending call made through this session.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A reconciler over the API-backed store.
    pub fn reconciler(&self) -> Reconciler<ApiVariableStore> {
        Reconciler::new(ApiVariableStore::new(self.client.clone()))
            .with_cancellation(self.cancel.child_token())
    }

    // ── Credential check ─────────────────────────────────────────────

    /// Confirm the configured token is accepted.
    pub async fn check(&self) -> Result<(), CoreError> {
        cancellable(&self.cancel, async {
            self.client.check_credentials().await.map_err(CoreError::from)
        })
        .await?;
        info!("credentials accepted");
        Ok(())
    }

    // ── Read-only lookups ────────────────────────────────────────────

    pub async fn fleet(&self, key: &FleetKey) -> Result<FleetRecord, CoreError> {
        cancellable(&self.cancel, async {
            self.client.get_fleet(key).await.map_err(CoreError::from)
        })
        .await
    }

    pub async fn device(&self, uuid: &str) -> Result<DeviceRecord, CoreError> {
        cancellable(&self.cancel, async {
            self.client.get_device(uuid).await.map_err(CoreError::from)
        })
        .await
    }

    /// Device tags folded into `key → value`.
    pub async fn device_tags(&self, uuid: &str) -> Result<IndexMap<String, String>, CoreError> {
        let tags = cancellable(&self.cancel, async {
            self.client.list_device_tags(uuid).await.map_err(CoreError::from)
        })
        .await?;
        Ok(tags.into_iter().map(|t| (t.tag_key, t.value)).collect())
    }

    /// Services of a fleet. The API filters services by app name, so the
    /// fleet is looked up first.
    pub async fn services(&self, fleet: &FleetKey) -> Result<Vec<ServiceRecord>, CoreError> {
        let record = self.fleet(fleet).await?;
        self.services_of(&record).await
    }

    pub(crate) async fn services_of(
        &self,
        fleet: &FleetRecord,
    ) -> Result<Vec<ServiceRecord>, CoreError> {
        let app_name = fleet.app_name.as_deref().ok_or_else(|| CoreError::Decode {
            message: format!("fleet {} has no app name", fleet.id),
            scope: None,
            name: None,
        })?;
        cancellable(&self.cancel, async {
            self.client.list_services(app_name).await.map_err(CoreError::from)
        })
        .await
    }
}
