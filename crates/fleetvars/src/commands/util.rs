//! Shared helpers for command handlers.

use std::io::IsTerminal;

use fleetvars_core::{FleetKey, ParentRef, Session, VariableScope};

use crate::cli::ScopeArgs;
use crate::error::CliError;

/// Turn `--fleet` / `--service` / `--device` into a parent reference.
pub fn parent_ref(args: &ScopeArgs) -> Result<ParentRef, CliError> {
    match (&args.fleet, &args.service, &args.device) {
        (_, _, Some(uuid)) => Ok(ParentRef::Device(uuid.clone())),
        // With a fleet, `--service` is always a name, even an all-digit one.
        (Some(fleet), Some(service), None) => Ok(ParentRef::Service {
            fleet: FleetKey::parse(fleet),
            name: service.clone(),
        }),
        (None, Some(service), None) => match service.parse::<u64>() {
            Ok(id) => Ok(ParentRef::ServiceId(id)),
            Err(_) => Err(CliError::Validation {
                field: "--service".into(),
                reason: format!("service name '{service}' needs --fleet to locate it"),
            }),
        },
        (Some(fleet), None, None) => Ok(ParentRef::Fleet(FleetKey::parse(fleet))),
        (None, None, None) => Err(CliError::Validation {
            field: "scope".into(),
            reason: "one of --fleet, --service, or --device is required".into(),
        }),
    }
}

/// Resolve scope flags to the numeric scope the variables live in.
pub async fn resolve_scope(session: &Session, args: &ScopeArgs) -> Result<VariableScope, CliError> {
    let parent = parent_ref(args)?;
    Ok(session.resolve_scope(&parent).await?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scope(fleet: Option<&str>, service: Option<&str>, device: Option<&str>) -> ScopeArgs {
        ScopeArgs {
            fleet: fleet.map(String::from),
            service: service.map(String::from),
            device: device.map(String::from),
        }
    }

    #[test]
    fn fleet_alone_selects_fleet() {
        assert_eq!(
            parent_ref(&scope(Some("42"), None, None)).unwrap(),
            ParentRef::Fleet(FleetKey::Id(42))
        );
    }

    #[test]
    fn named_service_needs_fleet() {
        assert!(matches!(
            parent_ref(&scope(None, Some("main"), None)),
            Err(CliError::Validation { .. })
        ));
        assert_eq!(
            parent_ref(&scope(Some("acme/sensors"), Some("main"), None)).unwrap(),
            ParentRef::Service {
                fleet: FleetKey::Slug("acme/sensors".into()),
                name: "main".into()
            }
        );
    }

    #[test]
    fn numeric_service_is_an_id() {
        assert_eq!(
            parent_ref(&scope(None, Some("4"), None)).unwrap(),
            ParentRef::ServiceId(4)
        );
    }

    #[test]
    fn numeric_service_with_fleet_is_a_name() {
        assert_eq!(
            parent_ref(&scope(Some("acme/sensors"), Some("123"), None)).unwrap(),
            ParentRef::Service {
                fleet: FleetKey::Slug("acme/sensors".into()),
                name: "123".into()
            }
        );
    }

    #[test]
    fn missing_scope_is_usage_error() {
        assert!(matches!(
            parent_ref(&scope(None, None, None)),
            Err(CliError::Validation { .. })
        ));
    }
}
