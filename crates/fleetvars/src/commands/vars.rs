//! Variable command handlers.

use serde::Serialize;
use tabled::Tabled;

use fleetvars_core::{
    Applied, AppliedAction, ParsedIdentity, ReconciliationRequest, ResourceIdentity, Session,
    Variable, VariableScope,
};

use crate::cli::{GlobalOpts, OutputFormat, VarsArgs, VarsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct VariableView {
    identity: ResourceIdentity,
    id: u64,
    name: String,
    value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    created_at: String,
}

impl VariableView {
    fn new(scope: VariableScope, var: Variable) -> Self {
        Self {
            identity: ResourceIdentity::for_variable(scope, &var.name),
            id: var.remote_id.0,
            created_at: created_display(&var),
            name: var.name,
            value: var.value,
        }
    }
}

#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "CREATED")]
    created: String,
}

fn created_display(var: &Variable) -> String {
    var.created().map_or_else(
        || var.created_at.clone(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

fn render_variables(
    format: &OutputFormat,
    views: &[VariableView],
    sensitive: bool,
) -> Result<String, CliError> {
    output::render_list(
        format,
        views,
        |v| VariableRow {
            name: v.name.clone(),
            value: output::mask(&v.value, sensitive),
            id: v.id,
            created: v.created_at.clone(),
        },
        |v| format!("{}={}", v.name, output::mask(&v.value, sensitive)),
    )
}

fn render_variable(
    format: &OutputFormat,
    view: &VariableView,
    sensitive: bool,
) -> Result<String, CliError> {
    output::render_single(
        format,
        view,
        |v| {
            output::detail_lines(&[
                ("identity", Some(v.identity.to_string())),
                ("name", Some(v.name.clone())),
                ("value", Some(output::mask(&v.value, sensitive))),
                ("id", Some(v.id.to_string())),
                (
                    "created",
                    (!v.created_at.is_empty()).then(|| v.created_at.clone()),
                ),
            ])
        },
        |v| output::mask(&v.value, sensitive),
    )
}

/// Mutations report on stderr in table mode and as data otherwise.
fn report(applied: &Applied, global: &GlobalOpts) -> Result<(), CliError> {
    if matches!(global.output, OutputFormat::Table) {
        let verb = match applied.action {
            AppliedAction::Created => "created",
            AppliedAction::Updated => "updated",
            AppliedAction::Deleted => "deleted",
        };
        let line = output::status_line(
            verb,
            applied.identity.as_str(),
            output::should_color(&global.color),
        );
        output::print_status(&line, global.quiet);
        return Ok(());
    }

    let rendered = output::render_single(
        &global.output,
        applied,
        |a| a.identity.to_string(),
        |a| a.identity.to_string(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: VarsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let reconciler = session.reconciler();

    match args.command {
        VarsCommand::List { scope, sensitive } => {
            let scope = util::resolve_scope(session, &scope).await?;
            let views: Vec<VariableView> = reconciler
                .list(scope)
                .await?
                .into_iter()
                .map(|v| VariableView::new(scope, v))
                .collect();
            let rendered = render_variables(&global.output, &views, sensitive)?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        VarsCommand::Get {
            name,
            scope,
            sensitive,
        } => {
            let scope = util::resolve_scope(session, &scope).await?;
            let var = reconciler.read(scope, &name).await?;
            let rendered = render_variable(&global.output, &VariableView::new(scope, var), sensitive)?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        VarsCommand::Set { name, value, scope } => {
            let scope = util::resolve_scope(session, &scope).await?;
            let request = ReconciliationRequest::set(scope, name, value)?;
            let applied = reconciler.apply(&request).await?;
            report(&applied, global)
        }

        VarsCommand::Create { name, value, scope } => {
            let scope = util::resolve_scope(session, &scope).await?;
            let identity = reconciler.create(scope, &name, &value).await?;
            report(
                &Applied {
                    action: AppliedAction::Created,
                    identity,
                },
                global,
            )
        }

        VarsCommand::Update { name, value, scope } => {
            let scope = util::resolve_scope(session, &scope).await?;
            reconciler.update(scope, &name, &value).await?;
            report(
                &Applied {
                    action: AppliedAction::Updated,
                    identity: ResourceIdentity::for_variable(scope, &name),
                },
                global,
            )
        }

        VarsCommand::Delete { name, scope } => {
            let scope = util::resolve_scope(session, &scope).await?;
            if !util::confirm(&format!("Delete variable '{name}' from {scope}?"), global.yes)? {
                return Ok(());
            }
            reconciler.delete(scope, &name).await?;
            report(
                &Applied {
                    action: AppliedAction::Deleted,
                    identity: ResourceIdentity::for_variable(scope, &name),
                },
                global,
            )
        }

        VarsCommand::Inspect {
            identity,
            sensitive,
        } => match ResourceIdentity::parse(&identity)? {
            ParsedIdentity::Singular { scope, name } => {
                let var = reconciler.read(scope, &name).await?;
                let rendered =
                    render_variable(&global.output, &VariableView::new(scope, var), sensitive)?;
                output::print_output(&rendered, global.quiet);
                Ok(())
            }
            ParsedIdentity::Plural { scope } => {
                let views: Vec<VariableView> = reconciler
                    .list(scope)
                    .await?
                    .into_iter()
                    .map(|v| VariableView::new(scope, v))
                    .collect();
                let rendered = render_variables(&global.output, &views, sensitive)?;
                output::print_output(&rendered, global.quiet);
                Ok(())
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleetvars_core::RemoteId;

    use super::*;

    fn view() -> VariableView {
        VariableView::new(
            VariableScope::fleet(42),
            Variable {
                remote_id: RemoteId(7),
                name: "DEBUG".into(),
                value: "true".into(),
                created_at: "2024-06-15T10:30:00.000Z".into(),
            },
        )
    }

    #[test]
    fn view_carries_identity_and_formatted_timestamp() {
        let v = view();
        assert_eq!(v.identity.as_str(), "fleet-variable:42:DEBUG");
        assert_eq!(v.created_at, "2024-06-15 10:30:00 UTC");
    }

    #[test]
    fn sensitive_plain_output_is_masked() {
        let out = render_variables(&OutputFormat::Plain, &[view()], true).unwrap();
        assert_eq!(out, "DEBUG=********");
    }

    #[test]
    fn json_output_keeps_raw_value() {
        let out = render_variable(&OutputFormat::JsonCompact, &view(), true).unwrap();
        insta::assert_snapshot!(out, @r#"{"identity":"fleet-variable:42:DEBUG","id":7,"name":"DEBUG","value":"true","created_at":"2024-06-15 10:30:00 UTC"}"#);
    }
}
