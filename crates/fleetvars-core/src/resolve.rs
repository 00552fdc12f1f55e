// ── Parent resolution ──
//
// Callers name parents the way people do (fleet slug, service name, device
// uuid); variable collections are filtered by numeric id. Numeric ids are
// taken as-is: only the API can say whether they exist.

use std::fmt;

use tracing::debug;

use fleetvars_api::FleetKey;

use crate::error::CoreError;
use crate::scope::VariableScope;
use crate::session::Session;

/// A human-facing reference to a variable's parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    Fleet(FleetKey),
    /// A service addressed by its numeric id.
    ServiceId(u64),
    /// A service addressed by name within a fleet.
    Service { fleet: FleetKey, name: String },
    /// A device addressed by uuid.
    Device(String),
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fleet(key) => write!(f, "fleet {key}"),
            Self::ServiceId(id) => write!(f, "service {id}"),
            Self::Service { fleet, name } => write!(f, "service {name} of fleet {fleet}"),
            Self::Device(uuid) => write!(f, "device {uuid}"),
        }
    }
}

impl Session {
    /// Turn a parent reference into the numeric scope its variables live in.
    pub async fn resolve_scope(&self, parent: &ParentRef) -> Result<VariableScope, CoreError> {
        let scope = match parent {
            ParentRef::Fleet(FleetKey::Id(id)) => VariableScope::fleet(*id),
            ParentRef::Fleet(key) => VariableScope::fleet(self.fleet(key).await?.id),
            ParentRef::ServiceId(id) => VariableScope::service(*id),
            ParentRef::Service { fleet, name } => {
                let record = self.fleet(fleet).await?;
                let services = self.services_of(&record).await?;
                let matches: Vec<u64> = services
                    .iter()
                    .filter(|s| s.service_name == *name)
                    .map(|s| s.id)
                    .collect();
                match matches.as_slice() {
                    [id] => VariableScope::service(*id),
                    [] => {
                        return Err(CoreError::ParentNotFound {
                            kind: "service".into(),
                            identifier: format!("{fleet}/{name}"),
                        });
                    }
                    many => {
                        return Err(CoreError::ParentAmbiguous {
                            kind: "service".into(),
                            identifier: format!("{fleet}/{name}"),
                            count: many.len(),
                        });
                    }
                }
            }
            ParentRef::Device(uuid) => VariableScope::device(self.device(uuid).await?.id),
        };
        debug!(%parent, %scope, "resolved parent");
        Ok(scope)
    }
}
