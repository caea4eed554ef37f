//! Route guard for protected views.
//!
//! The guard is a pure function of session state, the profile fetch result,
//! and the current location; it holds no state of its own. The four outcomes
//! are an explicit tagged enum so callers handle every transition.

use crate::auth::profile::Profile;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SETUP_PATH: &str = "/signup";

/// What to do with a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Not signed in: go to the login entry point, carrying the current
    /// location so the acquisition flow can restore it.
    RedirectToLogin { to: String },
    /// Signed in, profile fetch still in flight: show a neutral loading
    /// indicator and nothing else.
    Loading,
    /// Signed in but the profile is not set up yet: finish setup first.
    RedirectToSetup { to: String },
    /// Fully signed in and set up: render the protected children.
    Render,
}

/// Evaluate the guard for the current location (`path` includes the query
/// string, e.g. `/clubs/5?tab=members`).
#[must_use]
pub fn evaluate(is_authenticated: bool, profile: Option<&Profile>, path: &str) -> RouteDecision {
    if !is_authenticated {
        return RouteDecision::RedirectToLogin {
            to: login_redirect(path),
        };
    }

    match profile {
        None => RouteDecision::Loading,
        Some(profile) if !profile.setup_completed && !is_setup_path(path) => {
            RouteDecision::RedirectToSetup {
                to: SETUP_PATH.to_string(),
            }
        }
        Some(_) => RouteDecision::Render,
    }
}

/// Login entry point with the current location as a `redirect` parameter.
#[must_use]
pub fn login_redirect(current: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", current)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

fn is_setup_path(path: &str) -> bool {
    path.split('?').next() == Some(SETUP_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(setup_completed: bool) -> Profile {
        Profile {
            id: 1,
            email: "chair@chess.club".to_string(),
            first_name: None,
            last_name: None,
            setup_completed,
        }
    }

    #[test]
    fn unauthenticated_redirects_to_login_with_return_target() {
        let decision = evaluate(false, None, "/clubs/5");
        assert_eq!(
            decision,
            RouteDecision::RedirectToLogin {
                to: "/login?redirect=%2Fclubs%2F5".to_string()
            }
        );
    }

    #[test]
    fn return_target_keeps_the_query_string() {
        let decision = evaluate(false, None, "/clubs/5?tab=members");
        assert_eq!(
            decision,
            RouteDecision::RedirectToLogin {
                to: "/login?redirect=%2Fclubs%2F5%3Ftab%3Dmembers".to_string()
            }
        );
    }

    #[test]
    fn authenticated_without_profile_is_loading() {
        assert_eq!(evaluate(true, None, "/clubs/5"), RouteDecision::Loading);
    }

    #[test]
    fn incomplete_setup_redirects_to_setup() {
        let profile = profile(false);
        assert_eq!(
            evaluate(true, Some(&profile), "/clubs/5"),
            RouteDecision::RedirectToSetup {
                to: "/signup".to_string()
            }
        );
    }

    #[test]
    fn incomplete_setup_on_the_setup_path_renders() {
        let profile = profile(false);
        assert_eq!(evaluate(true, Some(&profile), "/signup"), RouteDecision::Render);
        assert_eq!(
            evaluate(true, Some(&profile), "/signup?step=2"),
            RouteDecision::Render
        );
    }

    #[test]
    fn complete_setup_renders() {
        let profile = profile(true);
        assert_eq!(evaluate(true, Some(&profile), "/clubs/5"), RouteDecision::Render);
        assert_eq!(evaluate(true, Some(&profile), "/signup"), RouteDecision::Render);
    }
}
