//! Fleet lookup handler.

use fleetvars_core::{FleetKey, FleetRecord, ResourceIdentity, Session};

use crate::cli::{FleetArgs, FleetCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn detail(fleet: &FleetRecord) -> String {
    output::detail_lines(&[
        ("identity", Some(ResourceIdentity::fleet(fleet.id).to_string())),
        ("id", Some(fleet.id.to_string())),
        ("slug", fleet.slug.clone()),
        ("name", fleet.app_name.clone()),
        ("uuid", fleet.uuid.clone()),
        ("organization", fleet.organization_id.map(|id| id.to_string())),
        ("device type", fleet.device_type_id.map(|id| id.to_string())),
        ("release", fleet.release_id.map(|id| id.to_string())),
        ("track latest", Some(fleet.track_latest_release.to_string())),
        ("public", Some(fleet.is_public.to_string())),
        ("host", Some(fleet.is_host.to_string())),
        ("archived", Some(fleet.is_archived.to_string())),
        ("created", fleet.created_at.clone()),
    ])
}

pub async fn handle(session: &Session, args: FleetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FleetCommand::Get { fleet } => {
            let record = session.fleet(&FleetKey::parse(&fleet)).await?;
            let rendered = output::render_single(&global.output, &record, detail, |f| {
                f.id.to_string()
            })?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
    }
}
