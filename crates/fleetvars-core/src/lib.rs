//! Scoped variable reconciliation between declared state and the fleet API.
//!
//! - **[`Reconciler`]**: create / read / update / delete / converge for
//!   name-addressed variables under a fleet, service, or device. Every
//!   operation is one listing followed by at most one write; nothing is
//!   retried, nothing is rolled back.
//!
//! - **[`VariableStore`]**: the capability the reconciler drives
//!   (`list` / `create` / `update` / `delete`). [`ApiVariableStore`] binds it
//!   to the HTTP API and dispatches on [`ScopeKind`] to the right collection.
//!
//! - **[`VariableListing`]**: fresh listings and name lookup, plus
//!   [`VariableSnapshot`] for working against one fetched listing.
//!
//! - **[`ResourceIdentity`]**: deterministic caller-side identity strings
//!   (`fleet-variable:42:DEBUG`), never sent to the API.
//!
//! - **[`Session`]**: owns the configured API client, resolves parents
//!   (fleet slug, service name, device uuid) to numeric scopes, and serves
//!   the read-only fleet/device/service lookups.
//!
//! # Concurrency
//!
//! Create, update, and delete check existence with a listing and then
//! write. Two callers racing on the same `(scope, name)` can both pass the
//! check; the API offers no uniqueness or version guard. Callers needing
//! exclusivity must serialize access themselves (for example a per-scope
//! lock in the calling layer).

pub mod config;
pub mod error;
pub mod identity;
pub mod listing;
pub mod reconciler;
pub mod resolve;
pub mod scope;
pub mod session;
pub mod store;
pub mod variable;

#[cfg(test)]
pub(crate) mod memory;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{SessionConfig, TlsVerification};
pub use error::CoreError;
pub use identity::{ParsedIdentity, ResourceIdentity};
pub use listing::{VariableListing, VariableSnapshot};
pub use reconciler::{Action, Applied, AppliedAction, Reconciler};
pub use resolve::ParentRef;
pub use scope::{ScopeKind, VariableScope};
pub use session::Session;
pub use store::{ApiVariableStore, VariableStore};
pub use variable::{ReconciliationRequest, RemoteId, Variable};

pub use fleetvars_api::{DEFAULT_API_URL, DeviceRecord, FleetKey, FleetRecord, ServiceRecord};
