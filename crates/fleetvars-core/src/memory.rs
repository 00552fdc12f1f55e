// In-memory recording store for reconciler tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CoreError;
use crate::scope::VariableScope;
use crate::store::VariableStore;
use crate::variable::{RemoteId, Variable};

/// A write the store received, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Write {
    Create { name: String, value: String },
    Update { id: RemoteId, value: String },
    Delete { id: RemoteId },
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    rows: Vec<(VariableScope, Variable)>,
    writes: Vec<Write>,
    lists: usize,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a row directly (no write recorded); duplicates allowed.
    pub(crate) fn seed(&self, scope: VariableScope, name: &str, value: &str) -> RemoteId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = RemoteId(inner.next_id);
        inner.rows.push((
            scope,
            Variable {
                remote_id: id,
                name: name.into(),
                value: value.into(),
                created_at: "2024-01-01T00:00:00.000Z".into(),
            },
        ));
        id
    }

    pub(crate) fn writes(&self) -> Vec<Write> {
        self.lock().writes.clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.lock().lists
    }
}

impl VariableStore for MemoryStore {
    async fn list(&self, scope: VariableScope) -> Result<Vec<Variable>, CoreError> {
        let mut inner = self.lock();
        inner.lists += 1;
        Ok(inner
            .rows
            .iter()
            .filter(|(s, _)| *s == scope)
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn create(&self, scope: VariableScope, name: &str, value: &str) -> Result<(), CoreError> {
        self.seed(scope, name, value);
        self.lock().writes.push(Write::Create {
            name: name.into(),
            value: value.into(),
        });
        Ok(())
    }

    async fn update(
        &self,
        _scope: VariableScope,
        id: RemoteId,
        value: &str,
    ) -> Result<(), CoreError> {
        let mut inner = self.lock();
        inner.writes.push(Write::Update {
            id,
            value: value.into(),
        });
        match inner.rows.iter_mut().find(|(_, v)| v.remote_id == id) {
            Some((_, var)) => {
                var.value = value.into();
                Ok(())
            }
            None => Err(CoreError::Remote {
                status: Some(404),
                message: format!("no variable with id {id}"),
                scope: None,
                name: None,
            }),
        }
    }

    async fn delete(&self, _scope: VariableScope, id: RemoteId) -> Result<(), CoreError> {
        let mut inner = self.lock();
        inner.writes.push(Write::Delete { id });
        inner.rows.retain(|(_, v)| v.remote_id != id);
        Ok(())
    }
}
