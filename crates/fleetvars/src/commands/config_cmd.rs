//! Config subcommand handlers. None of these need a session.

use dialoguer::Password;

use fleetvars_config::{config_path, load_config, render_masked, store_token};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

/// Map a dialoguer failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = load_config()?;
            output::print_output(render_masked(&cfg)?.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken { value } => {
            let cfg = load_config()?;
            let profile_name = active_profile_name(global, &cfg);

            let token = match value {
                Some(value) => value,
                None => Password::new()
                    .with_prompt(format!("API token for profile '{profile_name}'"))
                    .interact()
                    .map_err(prompt_err)?,
            };
            let token = token.trim();
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            store_token(&profile_name, token)?;
            let line = output::status_line(
                "stored token in system keyring for profile",
                &profile_name,
                output::should_color(&global.color),
            );
            output::print_status(&line, global.quiet);
            Ok(())
        }
    }
}
