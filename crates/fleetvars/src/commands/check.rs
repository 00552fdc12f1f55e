//! Credential check.

use fleetvars_core::Session;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.check().await?;
    let line = output::status_line(
        "credentials accepted by",
        session.client().base_url().as_str(),
        output::should_color(&global.color),
    );
    output::print_status(&line, global.quiet);
    Ok(())
}
