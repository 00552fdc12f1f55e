//! Service listing handler.

use tabled::Tabled;

use fleetvars_core::{FleetKey, Session};

use crate::cli::{GlobalOpts, ServicesArgs, ServicesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

pub async fn handle(session: &Session, args: ServicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ServicesCommand::List { fleet } => {
            let services = session.services(&FleetKey::parse(&fleet)).await?;
            let rendered = output::render_list(
                &global.output,
                &services,
                |s| ServiceRow {
                    id: s.id,
                    name: s.service_name.clone(),
                    created: s.created_at.clone(),
                },
                |s| format!("{}\t{}", s.id, s.service_name),
            )?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
    }
}
