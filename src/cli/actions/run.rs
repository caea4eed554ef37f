//! Wire the session stack together and execute one CLI action.

use crate::api::ApiClient;
use crate::auth::flows::{self, FlowStatus, MagicLinkFlow};
use crate::auth::guard;
use crate::auth::profile::ProfileCache;
use crate::auth::session::{Navigator, Session};
use crate::auth::store::{CredentialStore, FileStore, MemoryStore};
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub api_url: String,
    pub session_file: Option<PathBuf>,
    pub ephemeral: bool,
    pub command: SessionCommand,
}

#[derive(Debug)]
pub enum SessionCommand {
    VerifyMagicLink { token: String },
    ProviderLogin { redirect: Option<String> },
    ProviderCallback { response: String },
    Logout { revoke_at_provider: bool },
    Whoami,
}

/// Navigator for a terminal: print where the browsing context should go.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, target: &str) {
        println!("Continue at: {target}");
    }
}

fn default_session_file() -> PathBuf {
    directories::ProjectDirs::from("dev", "clubdesk", "clubdesk")
        .map(|dirs| dirs.data_dir().join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".clubdesk-session.json"))
}

fn open_store(args: &Args) -> Arc<dyn CredentialStore> {
    if args.ephemeral {
        return Arc::new(MemoryStore::default());
    }
    let path = args
        .session_file
        .clone()
        .unwrap_or_else(default_session_file);
    debug!("session file: {}", path.display());
    Arc::new(FileStore::open(path))
}

/// Execute the requested session action.
///
/// # Errors
/// Returns an error when the action itself fails (rejected login link,
/// failed exchange, profile fetch failure). Logout never fails.
pub async fn handle(args: Args) -> Result<()> {
    let store = open_store(&args);
    let session = Session::from_store(store);
    let navigator: Arc<dyn Navigator> = Arc::new(ConsoleNavigator);
    let api = ApiClient::new(&args.api_url, session.clone(), Arc::clone(&navigator))?;

    match args.command {
        SessionCommand::VerifyMagicLink { token } => {
            let flow = MagicLinkFlow::new();
            match flow.verify(&token, &session, api.auth()).await {
                FlowStatus::Success { .. } => {
                    println!("Signed in.");
                    flow.complete(navigator.as_ref()).await;
                }
                FlowStatus::Error(message) => bail!("login link rejected: {message}"),
                FlowStatus::Verifying => unreachable!("verification settles before returning"),
            }
        }
        SessionCommand::ProviderLogin { redirect } => {
            flows::provider_login_start(
                &session,
                api.auth(),
                navigator.as_ref(),
                redirect.as_deref(),
            )
            .await?;
            println!("Finish signing in in your browser, then run --provider-callback.");
        }
        SessionCommand::ProviderCallback { response } => {
            match flows::provider_callback(&session, api.auth(), &response).await {
                FlowStatus::Success { redirect } => {
                    println!("Signed in.");
                    navigator.navigate(&redirect);
                }
                FlowStatus::Error(message) => bail!("provider login failed: {message}"),
                FlowStatus::Verifying => unreachable!("exchange settles before returning"),
            }
        }
        SessionCommand::Logout { revoke_at_provider } => {
            session
                .logout(api.auth(), navigator.as_ref(), revoke_at_provider)
                .await;
            println!("Signed out.");
        }
        SessionCommand::Whoami => {
            if !session.is_authenticated() {
                return Err(crate::auth::Error::NotAuthenticated.into());
            }
            let profile = ProfileCache::new().get(&session, &api).await?;
            println!("{} <{}>", profile.display_name(), profile.email);
            if !profile.setup_completed {
                println!(
                    "Profile setup is not finished; visit {} first.",
                    guard::SETUP_PATH
                );
            }
        }
    }

    Ok(())
}
