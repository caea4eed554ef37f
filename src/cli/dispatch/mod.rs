//! Command-line argument dispatch.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action: exactly one session operation per invocation.

use crate::cli::actions::{run, Action};
use crate::cli::commands;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let api_url = matches
        .get_one::<String>(commands::ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;

    commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let session_file = matches
        .get_one::<PathBuf>(commands::ARG_SESSION_FILE)
        .cloned();
    let ephemeral = matches.get_flag(commands::ARG_EPHEMERAL);

    let command = if let Some(token) = matches.get_one::<String>(commands::ARG_VERIFY_TOKEN) {
        run::SessionCommand::VerifyMagicLink {
            token: token.clone(),
        }
    } else if matches.get_flag(commands::ARG_PROVIDER_LOGIN) {
        run::SessionCommand::ProviderLogin {
            redirect: matches.get_one::<String>(commands::ARG_REDIRECT).cloned(),
        }
    } else if let Some(response) = matches.get_one::<String>(commands::ARG_PROVIDER_CALLBACK) {
        run::SessionCommand::ProviderCallback {
            response: response.clone(),
        }
    } else if matches.get_flag(commands::ARG_LOGOUT) {
        run::SessionCommand::Logout {
            revoke_at_provider: !matches.get_flag(commands::ARG_KEEP_PROVIDER_SESSION),
        }
    } else if matches.get_flag(commands::ARG_WHOAMI) {
        run::SessionCommand::Whoami
    } else {
        bail!("no action requested");
    };

    Ok(Action::Run(run::Args {
        api_url,
        session_file,
        ephemeral,
        command,
    }))
}
