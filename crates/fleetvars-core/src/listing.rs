// ── Listings and name lookup ──
//
// Every listing is a fresh fetch; nothing is cached between calls. A
// `VariableSnapshot` freezes one fetched listing so a caller can look up
// several names (or plan a reconciliation) against the same state.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::scope::VariableScope;
use crate::store::VariableStore;
use crate::variable::Variable;

/// Fresh listings over a [`VariableStore`].
#[derive(Debug, Clone)]
pub struct VariableListing<S> {
    store: S,
}

impl<S: VariableStore> VariableListing<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch every variable under `scope`.
    pub async fn list(&self, scope: VariableScope) -> Result<Vec<Variable>, CoreError> {
        debug!(%scope, "listing variables");
        self.store.list(scope).await
    }

    pub async fn snapshot(&self, scope: VariableScope) -> Result<VariableSnapshot, CoreError> {
        let variables = self.list(scope).await?;
        Ok(VariableSnapshot::new(scope, variables))
    }

    /// Look up one variable by name in a fresh listing.
    ///
    /// Fails with [`CoreError::ConflictAmbiguous`] when the listing holds
    /// the name more than once.
    pub async fn find_by_name(
        &self,
        scope: VariableScope,
        name: &str,
    ) -> Result<Option<Variable>, CoreError> {
        let snapshot = self.snapshot(scope).await?;
        Ok(snapshot.find(name)?.cloned())
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// One fetched listing, in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSnapshot {
    scope: VariableScope,
    variables: Vec<Variable>,
}

impl VariableSnapshot {
    pub fn new(scope: VariableScope, variables: Vec<Variable>) -> Self {
        Self { scope, variables }
    }

    pub fn scope(&self) -> VariableScope {
        self.scope
    }

    /// The single variable named `name`, if any.
    pub fn find(&self, name: &str) -> Result<Option<&Variable>, CoreError> {
        let mut matches = self.variables.iter().filter(|v| v.name == name);
        let first = matches.next();
        let extra = matches.count();
        if extra > 0 {
            return Err(CoreError::ConflictAmbiguous {
                name: name.to_owned(),
                scope: self.scope,
                count: extra + 1,
            });
        }
        Ok(first)
    }

    /// Names that appear more than once, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for var in &self.variables {
            *counts.entry(var.name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter_map(|(name, n)| (n > 1).then_some(name))
            .collect()
    }

    /// Fold the listing into `name → value`.
    ///
    /// Duplicate names resolve last-wins: the later entry's value replaces
    /// the earlier one (the key keeps its first position).
    pub fn to_map(&self) -> IndexMap<String, String> {
        let duplicates = self.duplicate_names();
        if !duplicates.is_empty() {
            warn!(
                scope = %self.scope,
                names = ?duplicates,
                "listing contains duplicate variable names; later entries win"
            );
        }

        let mut map = IndexMap::with_capacity(self.variables.len());
        for var in &self.variables {
            map.insert(var.name.clone(), var.value.clone());
        }
        map
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::variable::RemoteId;

    fn var(id: u64, name: &str, value: &str) -> Variable {
        Variable {
            remote_id: RemoteId(id),
            name: name.into(),
            value: value.into(),
            created_at: String::new(),
        }
    }

    #[test]
    fn fold_is_last_wins() {
        let snapshot = VariableSnapshot::new(
            VariableScope::fleet(1),
            vec![var(1, "A", "first"), var(2, "B", "b"), var(3, "A", "second")],
        );
        let map = snapshot.to_map();
        assert_eq!(map.get("A").map(String::as_str), Some("second"));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(snapshot.duplicate_names(), vec!["A"]);
    }

    #[test]
    fn find_rejects_duplicates() {
        let snapshot = VariableSnapshot::new(
            VariableScope::fleet(1),
            vec![var(1, "A", "x"), var(2, "A", "y")],
        );
        assert!(matches!(
            snapshot.find("A"),
            Err(CoreError::ConflictAmbiguous { count: 2, .. })
        ));
    }

    #[test]
    fn find_absent_is_none() {
        let snapshot = VariableSnapshot::new(VariableScope::fleet(1), vec![var(1, "A", "x")]);
        assert!(snapshot.find("B").unwrap().is_none());
        assert_eq!(snapshot.find("A").unwrap().unwrap().remote_id, RemoteId(1));
    }

    #[tokio::test]
    async fn empty_scope_lists_empty() {
        let listing = VariableListing::new(MemoryStore::default());
        let snapshot = listing.snapshot(VariableScope::device(5)).await.unwrap();
        assert!(snapshot.to_map().is_empty());
    }

    #[tokio::test]
    async fn listing_is_filtered_by_scope() {
        let store = MemoryStore::default();
        store.seed(VariableScope::fleet(1), "A", "fleet");
        store.seed(VariableScope::service(1), "A", "service");

        let listing = VariableListing::new(store);
        let found = listing
            .find_by_name(VariableScope::service(1), "A")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.value, "service");
    }
}
