// ── Caller-side resource identities ──
//
// Format (stable; callers persist these):
//
//   singular   <kind>-variable:<parent id>:<name>     fleet-variable:42:DEBUG
//   plural     <kind>-variable:<parent id>            fleet-variable:42
//
// The parent id is rendered in canonical decimal and never contains `:`,
// so the first two separators are unambiguous and names may contain `:`.
// Names are non-empty, so a singular identity always has a third part.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scope::{ScopeKind, VariableScope};

/// A deterministic identity string for a variable or a variable listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceIdentity(String);

/// The components recovered from a variable identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedIdentity {
    Singular { scope: VariableScope, name: String },
    Plural { scope: VariableScope },
}

impl ResourceIdentity {
    /// Identity of one named variable.
    pub fn singular(kind: ScopeKind, parent_id: u64, name: &str) -> Self {
        Self(format!("{}:{parent_id}:{name}", kind.identity_tag()))
    }

    /// Identity of the full variable listing under one parent.
    pub fn plural(kind: ScopeKind, parent_id: u64) -> Self {
        Self(format!("{}:{parent_id}", kind.identity_tag()))
    }

    pub fn for_variable(scope: VariableScope, name: &str) -> Self {
        Self::singular(scope.kind, scope.parent_id, name)
    }

    pub fn for_scope(scope: VariableScope) -> Self {
        Self::plural(scope.kind, scope.parent_id)
    }

    // ── Read-only lookups ────────────────────────────────────────────

    pub fn fleet(fleet_id: u64) -> Self {
        Self(format!("fleet:{fleet_id}"))
    }

    pub fn device(uuid: &str) -> Self {
        Self(format!("device:{uuid}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover scope (and name) from a variable identity.
    pub fn parse(raw: &str) -> Result<ParsedIdentity, CoreError> {
        let invalid = |reason: &str| CoreError::Validation {
            message: format!("invalid variable identity '{raw}': {reason}"),
        };

        let (tag, rest) = raw
            .split_once(':')
            .ok_or_else(|| invalid("missing parent id"))?;
        let kind = ScopeKind::from_identity_tag(tag).ok_or_else(|| invalid("unknown kind"))?;

        let (parent, name) = match rest.split_once(':') {
            Some((parent, name)) => (parent, Some(name)),
            None => (rest, None),
        };

        let parent_id: u64 = parent
            .parse()
            .map_err(|_| invalid("parent id is not a number"))?;
        // Reject `042`, `+42`: they would parse to a different canonical string.
        if parent_id.to_string() != parent {
            return Err(invalid("parent id is not canonical"));
        }

        let scope = VariableScope::new(kind, parent_id);
        match name {
            None => Ok(ParsedIdentity::Plural { scope }),
            Some("") => Err(invalid("empty variable name")),
            Some(name) => Ok(ParsedIdentity::Singular {
                scope,
                name: name.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn scenario_identity() {
        assert_eq!(
            ResourceIdentity::singular(ScopeKind::Fleet, 42, "DEBUG").as_str(),
            "fleet-variable:42:DEBUG"
        );
        assert_eq!(
            ResourceIdentity::plural(ScopeKind::Fleet, 42).as_str(),
            "fleet-variable:42"
        );
    }

    #[test]
    fn identity_is_deterministic() {
        for kind in ScopeKind::iter() {
            assert_eq!(
                ResourceIdentity::singular(kind, 7, "A"),
                ResourceIdentity::singular(kind, 7, "A")
            );
        }
    }

    #[test]
    fn distinct_inputs_never_collide() {
        let names = ["A", "B", "2:x", "x:", ":", "A:B"];
        let parents = [0_u64, 2, 4, 42, 420];

        let mut seen = HashSet::new();
        for kind in ScopeKind::iter() {
            for parent in parents {
                assert!(seen.insert(ResourceIdentity::plural(kind, parent)));
                for name in names {
                    assert!(
                        seen.insert(ResourceIdentity::singular(kind, parent, name)),
                        "collision for {kind}/{parent}/{name}"
                    );
                }
            }
        }
    }

    #[test]
    fn parse_inverts_singular_with_colons_in_name() {
        let id = ResourceIdentity::singular(ScopeKind::Service, 4, "2:x");
        assert_eq!(
            ResourceIdentity::parse(id.as_str()).unwrap(),
            ParsedIdentity::Singular {
                scope: VariableScope::service(4),
                name: "2:x".into()
            }
        );
    }

    #[test]
    fn parse_inverts_plural() {
        let id = ResourceIdentity::plural(ScopeKind::Device, 9);
        assert_eq!(
            ResourceIdentity::parse(id.as_str()).unwrap(),
            ParsedIdentity::Plural {
                scope: VariableScope::device(9)
            }
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        for raw in [
            "fleet-variable",
            "fleet:42",
            "fleet-variable:abc:X",
            "fleet-variable:042:X",
            "fleet-variable:42:",
        ] {
            assert!(
                matches!(ResourceIdentity::parse(raw), Err(CoreError::Validation { .. })),
                "expected rejection of {raw}"
            );
        }
    }
}
