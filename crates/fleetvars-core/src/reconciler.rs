// ── Scoped variable reconciler ──
//
// Per named variable within a scope:
//
//   Absent ──create──▶ Present ──update*──▶ Present ──delete──▶ Absent
//
// `create` from Present is AlreadyExists; `update`/`delete` from Absent is
// NotFound. Each operation is one listing followed by at most one write,
// addressed by the remote id found in that listing. No retries, no
// rollback, no no-op detection: an update is always sent.

use std::future::Future;

use indexmap::IndexMap;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::identity::ResourceIdentity;
use crate::listing::{VariableListing, VariableSnapshot};
use crate::scope::VariableScope;
use crate::store::VariableStore;
use crate::variable::{ReconciliationRequest, RemoteId, Variable, validate_name};

// ── Planning ─────────────────────────────────────────────────────────

/// The single write a reconciliation will issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create { value: String },
    Update { remote_id: RemoteId, value: String },
    Delete { remote_id: RemoteId },
}

impl Action {
    /// Decide the write that moves `name` in `snapshot` to `desired`.
    ///
    /// `desired = None` is a delete intent; deleting an absent variable is
    /// `NotFound`. Duplicate names are `ConflictAmbiguous`.
    pub fn plan(
        snapshot: &VariableSnapshot,
        name: &str,
        desired: Option<&str>,
    ) -> Result<Self, CoreError> {
        let current = snapshot.find(name)?;
        match (current, desired) {
            (None, Some(value)) => Ok(Self::Create {
                value: value.to_owned(),
            }),
            (Some(var), Some(value)) => Ok(Self::Update {
                remote_id: var.remote_id,
                value: value.to_owned(),
            }),
            (Some(var), None) => Ok(Self::Delete {
                remote_id: var.remote_id,
            }),
            (None, None) => Err(CoreError::NotFound {
                name: name.to_owned(),
                scope: snapshot.scope(),
            }),
        }
    }

    /// Short name for logs; never includes the value.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// What [`Reconciler::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub action: AppliedAction,
    pub identity: ResourceIdentity,
}

// ── Reconciler ───────────────────────────────────────────────────────

/// Run `fut` unless `cancel` fires first. Cancellation wins ties.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, CoreError>>,
) -> Result<T, CoreError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CoreError::Cancelled),
        result = fut => result,
    }
}

/// Create, read, update, delete, and converge name-addressed variables.
///
/// Generic over the store, so one engine serves fleet, service, and device
/// scopes. A cancelled token aborts the pending remote call with
/// [`CoreError::Cancelled`]; a write that already reached the API is not
/// undone.
pub struct Reconciler<S> {
    listing: VariableListing<S>,
    cancel: CancellationToken,
}

impl<S: VariableStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self {
            listing: VariableListing::new(store),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn store(&self) -> &S {
        self.listing.store()
    }

    /// Run one remote call under the cancellation token, tagging a remote
    /// failure with the scope (and variable) it was made for.
    async fn guarded<T>(
        &self,
        scope: VariableScope,
        name: Option<&str>,
        fut: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        cancellable(&self.cancel, fut)
            .await
            .map_err(|e| e.with_target(scope, name))
    }

    async fn snapshot(
        &self,
        scope: VariableScope,
        name: Option<&str>,
    ) -> Result<VariableSnapshot, CoreError> {
        self.guarded(scope, name, self.listing.snapshot(scope)).await
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Create `name` under `scope`. Fails with `AlreadyExists` (no write)
    /// if the listing already holds it.
    pub async fn create(
        &self,
        scope: VariableScope,
        name: &str,
        value: &str,
    ) -> Result<ResourceIdentity, CoreError> {
        validate_name(name)?;
        let snapshot = self.snapshot(scope, Some(name)).await?;
        if snapshot.find(name)?.is_some() {
            debug!(%scope, name, "variable already exists");
            return Err(CoreError::AlreadyExists {
                name: name.to_owned(),
                scope,
            });
        }

        debug!(%scope, name, "creating variable");
        self.guarded(scope, Some(name), self.store().create(scope, name, value))
            .await?;
        info!(%scope, name, "variable created");
        Ok(ResourceIdentity::for_variable(scope, name))
    }

    /// Set the value of an existing variable, even if it is unchanged.
    pub async fn update(
        &self,
        scope: VariableScope,
        name: &str,
        value: &str,
    ) -> Result<(), CoreError> {
        let existing = self.existing(scope, name).await?;

        debug!(%scope, name, remote_id = %existing.remote_id, "updating variable");
        self.guarded(
            scope,
            Some(name),
            self.store().update(scope, existing.remote_id, value),
        )
        .await?;
        info!(%scope, name, "variable updated");
        Ok(())
    }

    pub async fn delete(&self, scope: VariableScope, name: &str) -> Result<(), CoreError> {
        let existing = self.existing(scope, name).await?;

        debug!(%scope, name, remote_id = %existing.remote_id, "deleting variable");
        self.guarded(scope, Some(name), self.store().delete(scope, existing.remote_id))
            .await?;
        info!(%scope, name, "variable deleted");
        Ok(())
    }

    pub async fn read(&self, scope: VariableScope, name: &str) -> Result<Variable, CoreError> {
        self.existing(scope, name).await
    }

    /// `name → value` for every variable under `scope`; duplicates are
    /// last-wins.
    pub async fn read_all(&self, scope: VariableScope) -> Result<IndexMap<String, String>, CoreError> {
        Ok(self.snapshot(scope, None).await?.to_map())
    }

    /// Full variable records under `scope`, in server order.
    pub async fn list(&self, scope: VariableScope) -> Result<Vec<Variable>, CoreError> {
        self.guarded(scope, None, self.listing.list(scope)).await
    }

    /// Converge one variable to the requested state with a single write.
    pub async fn apply(&self, request: &ReconciliationRequest) -> Result<Applied, CoreError> {
        validate_name(&request.name)?;
        let scope = request.scope;
        let name = request.name.as_str();

        let snapshot = self.snapshot(scope, Some(name)).await?;
        let action = Action::plan(&snapshot, name, request.desired_value.as_deref())?;
        debug!(%scope, name, action = action.verb(), "planned reconciliation");

        let applied = match action {
            Action::Create { value } => {
                self.guarded(scope, Some(name), self.store().create(scope, name, &value))
                    .await?;
                AppliedAction::Created
            }
            Action::Update { remote_id, value } => {
                self.guarded(scope, Some(name), self.store().update(scope, remote_id, &value))
                    .await?;
                AppliedAction::Updated
            }
            Action::Delete { remote_id } => {
                self.guarded(scope, Some(name), self.store().delete(scope, remote_id))
                    .await?;
                AppliedAction::Deleted
            }
        };

        info!(%scope, name, action = ?applied, "variable reconciled");
        Ok(Applied {
            action: applied,
            identity: ResourceIdentity::for_variable(scope, name),
        })
    }

    async fn existing(&self, scope: VariableScope, name: &str) -> Result<Variable, CoreError> {
        validate_name(name)?;
        self.guarded(scope, Some(name), self.listing.find_by_name(scope, name))
            .await?
            .ok_or_else(|| CoreError::NotFound {
                name: name.to_owned(),
                scope,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::pending;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::memory::{MemoryStore, Write};

    const FLEET: VariableScope = VariableScope {
        kind: crate::scope::ScopeKind::Fleet,
        parent_id: 42,
    };

    fn map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[tokio::test]
    async fn fleet_lifecycle_scenario() {
        let reconciler = Reconciler::new(MemoryStore::default());

        let identity = reconciler.create(FLEET, "DEBUG", "true").await.unwrap();
        assert_eq!(identity.as_str(), "fleet-variable:42:DEBUG");
        assert_eq!(reconciler.read_all(FLEET).await.unwrap(), map(&[("DEBUG", "true")]));

        reconciler.update(FLEET, "DEBUG", "false").await.unwrap();
        assert_eq!(reconciler.read_all(FLEET).await.unwrap(), map(&[("DEBUG", "false")]));

        let again = reconciler.create(FLEET, "DEBUG", "x").await;
        assert!(matches!(again, Err(CoreError::AlreadyExists { .. })));

        reconciler.delete(FLEET, "DEBUG").await.unwrap();
        assert_eq!(reconciler.read_all(FLEET).await.unwrap(), map(&[]));

        let gone = reconciler.delete(FLEET, "DEBUG").await;
        assert!(matches!(gone, Err(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn create_on_existing_issues_no_write() {
        let store = MemoryStore::default();
        store.seed(FLEET, "X", "v");
        let reconciler = Reconciler::new(store);

        let err = reconciler.create(FLEET, "X", "w").await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { .. }));
        assert!(reconciler.store().writes().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_on_absent_issue_no_write() {
        let reconciler = Reconciler::new(MemoryStore::default());

        let update = reconciler.update(FLEET, "X", "v").await.unwrap_err();
        let delete = reconciler.delete(FLEET, "X").await.unwrap_err();
        assert!(matches!(update, CoreError::NotFound { .. }));
        assert!(matches!(delete, CoreError::NotFound { .. }));
        assert!(reconciler.store().writes().is_empty());
    }

    #[tokio::test]
    async fn read_after_write() {
        let reconciler = Reconciler::new(MemoryStore::default());

        reconciler.create(FLEET, "X", "v1").await.unwrap();
        assert_eq!(reconciler.read(FLEET, "X").await.unwrap().value, "v1");

        reconciler.update(FLEET, "X", "v2").await.unwrap();
        assert_eq!(reconciler.read(FLEET, "X").await.unwrap().value, "v2");

        reconciler.delete(FLEET, "X").await.unwrap();
        assert!(matches!(
            reconciler.read(FLEET, "X").await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn read_all_matches_listing_fold() {
        let store = MemoryStore::default();
        store.seed(FLEET, "A", "1");
        store.seed(FLEET, "B", "2");
        store.seed(VariableScope::fleet(43), "C", "3");
        let reconciler = Reconciler::new(store);

        let listed = reconciler.list(FLEET).await.unwrap();
        let folded: IndexMap<String, String> =
            listed.into_iter().map(|v| (v.name, v.value)).collect();
        assert_eq!(reconciler.read_all(FLEET).await.unwrap(), folded);
        assert!(reconciler
            .read_all(VariableScope::fleet(99))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unchanged_update_is_still_sent() {
        let store = MemoryStore::default();
        let id = store.seed(FLEET, "X", "same");
        let reconciler = Reconciler::new(store);

        reconciler.update(FLEET, "X", "same").await.unwrap();
        assert_eq!(
            reconciler.store().writes(),
            vec![Write::Update {
                id,
                value: "same".into()
            }]
        );
    }

    #[tokio::test]
    async fn duplicates_are_ambiguous_and_never_written() {
        let store = MemoryStore::default();
        store.seed(FLEET, "X", "a");
        store.seed(FLEET, "X", "b");
        let reconciler = Reconciler::new(store);

        for result in [
            reconciler.update(FLEET, "X", "c").await,
            reconciler.delete(FLEET, "X").await,
            reconciler.read(FLEET, "X").await.map(|_| ()),
            reconciler.create(FLEET, "X", "c").await.map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(CoreError::ConflictAmbiguous { count: 2, .. })
            ));
        }
        assert!(reconciler.store().writes().is_empty());

        assert_eq!(reconciler.read_all(FLEET).await.unwrap(), map(&[("X", "b")]));
    }

    #[tokio::test]
    async fn each_operation_lists_once() {
        let reconciler = Reconciler::new(MemoryStore::default());
        reconciler.create(FLEET, "X", "v").await.unwrap();
        assert_eq!(reconciler.store().list_calls(), 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_before_any_call() {
        let reconciler = Reconciler::new(MemoryStore::default());
        let err = reconciler.create(FLEET, "", "v").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert_eq!(reconciler.store().list_calls(), 0);
    }

    // ── Converge ─────────────────────────────────────────────────────

    #[test]
    fn plan_covers_every_transition() {
        let present = VariableSnapshot::new(
            FLEET,
            vec![Variable {
                remote_id: RemoteId(7),
                name: "X".into(),
                value: "old".into(),
                created_at: String::new(),
            }],
        );
        let absent = VariableSnapshot::new(FLEET, Vec::new());

        assert_eq!(
            Action::plan(&absent, "X", Some("v")).unwrap(),
            Action::Create { value: "v".into() }
        );
        assert_eq!(
            Action::plan(&present, "X", Some("v")).unwrap(),
            Action::Update {
                remote_id: RemoteId(7),
                value: "v".into()
            }
        );
        assert_eq!(
            Action::plan(&present, "X", None).unwrap(),
            Action::Delete {
                remote_id: RemoteId(7)
            }
        );
        assert!(matches!(
            Action::plan(&absent, "X", None),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn apply_converges() {
        let reconciler = Reconciler::new(MemoryStore::default());
        let set = ReconciliationRequest::set(FLEET, "X", "1").unwrap();

        let created = reconciler.apply(&set).await.unwrap();
        assert_eq!(created.action, AppliedAction::Created);
        assert_eq!(created.identity.as_str(), "fleet-variable:42:X");

        let updated = reconciler.apply(&set).await.unwrap();
        assert_eq!(updated.action, AppliedAction::Updated);

        let remove = ReconciliationRequest::remove(FLEET, "X").unwrap();
        let deleted = reconciler.apply(&remove).await.unwrap();
        assert_eq!(deleted.action, AppliedAction::Deleted);
        assert_eq!(reconciler.store().writes().len(), 3);
    }

    // ── Cancellation ─────────────────────────────────────────────────

    struct StallingStore;

    impl VariableStore for StallingStore {
        async fn list(&self, _scope: VariableScope) -> Result<Vec<Variable>, CoreError> {
            pending().await
        }

        async fn create(&self, _: VariableScope, _: &str, _: &str) -> Result<(), CoreError> {
            pending().await
        }

        async fn update(&self, _: VariableScope, _: RemoteId, _: &str) -> Result<(), CoreError> {
            pending().await
        }

        async fn delete(&self, _: VariableScope, _: RemoteId) -> Result<(), CoreError> {
            pending().await
        }
    }

    #[tokio::test]
    async fn cancellation_aborts_pending_call() {
        let token = CancellationToken::new();
        let reconciler = Reconciler::new(StallingStore).with_cancellation(token.clone());

        let (result, ()) = tokio::join!(reconciler.read_all(FLEET), async {
            tokio::task::yield_now().await;
            token.cancel();
        });
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelled_token_prevents_any_write() {
        let token = CancellationToken::new();
        token.cancel();
        let reconciler = Reconciler::new(MemoryStore::default()).with_cancellation(token);

        let err = reconciler.create(FLEET, "X", "v").await.unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
        assert!(reconciler.store().writes().is_empty());
    }
}
