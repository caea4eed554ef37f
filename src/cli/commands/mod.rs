pub mod logging;

use clap::{
    Arg, ArgAction, ArgGroup, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_EPHEMERAL: &str = "ephemeral";
pub const ARG_VERIFY_TOKEN: &str = "verify-token";
pub const ARG_PROVIDER_LOGIN: &str = "provider-login";
pub const ARG_PROVIDER_CALLBACK: &str = "provider-callback";
pub const ARG_REDIRECT: &str = "redirect";
pub const ARG_LOGOUT: &str = "logout";
pub const ARG_KEEP_PROVIDER_SESSION: &str = "keep-provider-session";
pub const ARG_WHOAMI: &str = "whoami";

/// Validate argument combinations clap cannot express declaratively.
///
/// # Errors
/// Returns an error string if the API URL does not use an HTTP(S) scheme.
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    let Some(url) = matches.get_one::<String>(ARG_API_URL) else {
        return Ok(()); // Should be handled by required=true in clap
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!(
            "invalid --{ARG_API_URL}: expected http(s)://..., got {url}"
        ));
    }
    Ok(())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("clubdesk")
        .about("Club management client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the clubdesk API")
                .env("CLUBDESK_API_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long("session-file")
                .help("Path of the JSON file holding the persisted session")
                .env("CLUBDESK_SESSION_FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .conflicts_with(ARG_EPHEMERAL),
        )
        .arg(
            Arg::new(ARG_EPHEMERAL)
                .long("ephemeral")
                .help("Keep credentials in memory only; nothing is written to disk")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_VERIFY_TOKEN)
                .long("verify-token")
                .value_name("TOKEN")
                .help("Sign in by verifying a one-time token from a login email"),
        )
        .arg(
            Arg::new(ARG_PROVIDER_LOGIN)
                .long("provider-login")
                .help("Sign in through the identity provider")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_REDIRECT)
                .long("redirect")
                .value_name("PATH")
                .help("Where to land after a provider login completes")
                .requires(ARG_PROVIDER_LOGIN),
        )
        .arg(
            Arg::new(ARG_PROVIDER_CALLBACK)
                .long("provider-callback")
                .value_name("RESPONSE")
                .help("Finish a provider login with the authorization response"),
        )
        .arg(
            Arg::new(ARG_LOGOUT)
                .long("logout")
                .help("Sign out, revoking the provider session as well")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_KEEP_PROVIDER_SESSION)
                .long("keep-provider-session")
                .help("Sign out of clubdesk only, leaving the provider session alone")
                .action(ArgAction::SetTrue)
                .requires(ARG_LOGOUT),
        )
        .arg(
            Arg::new(ARG_WHOAMI)
                .long("whoami")
                .help("Show the signed-in member")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("action")
                .args([
                    ARG_VERIFY_TOKEN,
                    ARG_PROVIDER_LOGIN,
                    ARG_PROVIDER_CALLBACK,
                    ARG_LOGOUT,
                    ARG_WHOAMI,
                ])
                .required(true)
                .multiple(false),
        );

    logging::with_args(command)
}
