//! Command dispatch: bridges CLI args -> session calls -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod device;
pub mod fleet;
pub mod services;
pub mod util;
pub mod vars;

use fleetvars_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
///
/// `Config` and `Completions` never reach this point: they run without a
/// session and are handled in `main`.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Vars(args) => vars::handle(session, args, global).await,
        Command::Fleet(args) => fleet::handle(session, args, global).await,
        Command::Device(args) => device::handle(session, args, global).await,
        Command::Services(args) => services::handle(session, args, global).await,
        Command::Check => check::handle(session, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "config and completions run without a session".into(),
        }),
    }
}
