// ── Variable scopes ──
//
// A scope names the parent collection (fleet, service, device) and the
// numeric id of the parent entity. Scopes are plain values: copying one
// into a request freezes it for the rest of that reconciliation.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use fleetvars_api::VariableCollection;

/// Which parent collection a variable belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScopeKind {
    Fleet,
    Service,
    Device,
}

impl ScopeKind {
    /// The API collection holding this kind's variables.
    pub fn collection(self) -> VariableCollection {
        match self {
            Self::Fleet => VariableCollection::Fleet,
            Self::Service => VariableCollection::Service,
            Self::Device => VariableCollection::Device,
        }
    }

    /// Tag leading every identity string of this kind.
    pub fn identity_tag(self) -> &'static str {
        match self {
            Self::Fleet => "fleet-variable",
            Self::Service => "service-variable",
            Self::Device => "device-variable",
        }
    }

    pub(crate) fn from_identity_tag(tag: &str) -> Option<Self> {
        match tag {
            "fleet-variable" => Some(Self::Fleet),
            "service-variable" => Some(Self::Service),
            "device-variable" => Some(Self::Device),
            _ => None,
        }
    }
}

/// The parent under which a set of variables lives.
///
/// The parent id is not checked locally; a not-found answer from the API
/// is the only signal that it does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableScope {
    pub kind: ScopeKind,
    pub parent_id: u64,
}

impl VariableScope {
    pub fn new(kind: ScopeKind, parent_id: u64) -> Self {
        Self { kind, parent_id }
    }

    pub fn fleet(parent_id: u64) -> Self {
        Self::new(ScopeKind::Fleet, parent_id)
    }

    pub fn service(parent_id: u64) -> Self {
        Self::new(ScopeKind::Service, parent_id)
    }

    pub fn device(parent_id: u64) -> Self {
        Self::new(ScopeKind::Device, parent_id)
    }
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.parent_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in ScopeKind::iter() {
            let parsed: ScopeKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(ScopeKind::from_identity_tag(kind.identity_tag()), Some(kind));
        }
    }

    #[test]
    fn scope_display() {
        assert_eq!(VariableScope::service(7).to_string(), "service 7");
    }
}
