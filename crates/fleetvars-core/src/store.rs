// ── Variable store capability ──
//
// The reconciler drives exactly four remote calls. Binding them behind a
// trait keeps one reconciliation engine for every scope kind; the
// collection (and parent field) is picked by dispatching on `ScopeKind`.

use std::future::Future;

use tracing::debug;

use fleetvars_api::ApiClient;

use crate::error::CoreError;
use crate::scope::VariableScope;
use crate::variable::{RemoteId, Variable};

/// List, create, update, and delete variables under a scope.
///
/// Implementations make a single attempt per call and never retry.
pub trait VariableStore: Send + Sync {
    /// Every variable under `scope`, in server order. Empty is not an error.
    fn list(
        &self,
        scope: VariableScope,
    ) -> impl Future<Output = Result<Vec<Variable>, CoreError>> + Send;

    fn create(
        &self,
        scope: VariableScope,
        name: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Replace the value of the variable with the given remote id.
    fn update(
        &self,
        scope: VariableScope,
        id: RemoteId,
        value: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete(
        &self,
        scope: VariableScope,
        id: RemoteId,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── API-backed store ─────────────────────────────────────────────────

/// [`VariableStore`] over the fleet API's `*_environment_variable`
/// collections.
#[derive(Debug, Clone)]
pub struct ApiVariableStore {
    client: ApiClient,
}

impl ApiVariableStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl VariableStore for ApiVariableStore {
    async fn list(&self, scope: VariableScope) -> Result<Vec<Variable>, CoreError> {
        let records = self
            .client
            .list_variables(scope.kind.collection(), scope.parent_id)
            .await?;
        debug!(%scope, count = records.len(), "listed variables");
        Ok(records.into_iter().map(Variable::from).collect())
    }

    async fn create(&self, scope: VariableScope, name: &str, value: &str) -> Result<(), CoreError> {
        self.client
            .create_variable(scope.kind.collection(), scope.parent_id, name, value)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        scope: VariableScope,
        id: RemoteId,
        value: &str,
    ) -> Result<(), CoreError> {
        self.client
            .update_variable(scope.kind.collection(), id.0, value)
            .await?;
        Ok(())
    }

    async fn delete(&self, scope: VariableScope, id: RemoteId) -> Result<(), CoreError> {
        self.client
            .delete_variable(scope.kind.collection(), id.0)
            .await?;
        Ok(())
    }
}
