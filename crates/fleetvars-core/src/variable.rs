// ── Variables and reconciliation requests ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetvars_api::VariableRecord;

use crate::error::CoreError;
use crate::scope::VariableScope;

/// Identifier the API assigns to a variable row.
///
/// Used only to address update and delete calls; caller-side identity is
/// [`ResourceIdentity`](crate::ResourceIdentity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub u64);

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A variable as it exists remotely.
///
/// Values come from a listing, so the remote id is always known. The value
/// may be sensitive; that only affects how consumers display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub remote_id: RemoteId,
    pub name: String,
    pub value: String,
    pub created_at: String,
}

impl Variable {
    /// `created_at` parsed as RFC 3339, if the API sent one.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl From<VariableRecord> for Variable {
    fn from(record: VariableRecord) -> Self {
        Self {
            remote_id: RemoteId(record.id),
            name: record.name,
            value: record.value,
            created_at: record.created_at,
        }
    }
}

/// Desired state for one named variable.
///
/// `desired_value: None` asks for deletion; `Some(v)` asks for the variable
/// to exist with value `v` (created if absent, updated if present).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRequest {
    pub scope: VariableScope,
    pub name: String,
    pub desired_value: Option<String>,
}

impl ReconciliationRequest {
    pub fn new(
        scope: VariableScope,
        name: impl Into<String>,
        desired_value: Option<String>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            scope,
            name,
            desired_value,
        })
    }

    pub fn set(
        scope: VariableScope,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Self::new(scope, name, Some(value.into()))
    }

    pub fn remove(scope: VariableScope, name: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(scope, name, None)
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation {
            message: "variable name must not be empty".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn created_parses_api_timestamps() {
        let var = Variable {
            remote_id: RemoteId(1),
            name: "A".into(),
            value: "b".into(),
            created_at: "2024-06-15T10:30:00.000Z".into(),
        };
        assert_eq!(var.created().unwrap().to_rfc3339(), "2024-06-15T10:30:00+00:00");
    }

    #[test]
    fn missing_timestamp_is_none() {
        let var = Variable {
            remote_id: RemoteId(1),
            name: "A".into(),
            value: "b".into(),
            created_at: String::new(),
        };
        assert!(var.created().is_none());
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = ReconciliationRequest::set(VariableScope::fleet(1), "", "x");
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }
}
