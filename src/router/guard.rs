//! Navigation guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs before every transition, the initial load included. It is a pure
//! function of the session and the target route: no I/O, no suspension.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::table::{HOME_PATH, LOGIN_PATH, REGISTER_PATH, RouteMatch};
use crate::state::session::Session;

/// Routes an authenticated user is bounced away from.
pub const AUTH_ONLY_PATHS: [&str; 2] = [LOGIN_PATH, REGISTER_PATH];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Proceed to the target unchanged.
    Allow,
    /// Abort the transition and go to this path instead.
    Redirect(&'static str),
}

#[must_use]
pub fn is_auth_only(path: &str) -> bool {
    AUTH_ONLY_PATHS.contains(&path)
}

/// Core rule over the three inputs that matter.
#[must_use]
pub fn decide(authenticated: bool, requires_auth: bool, path: &str) -> GuardDecision {
    if requires_auth && !authenticated {
        GuardDecision::Redirect(LOGIN_PATH)
    } else if !requires_auth && authenticated && is_auth_only(path) {
        GuardDecision::Redirect(HOME_PATH)
    } else {
        GuardDecision::Allow
    }
}

/// Decide whether `session` may enter `target`.
#[must_use]
pub fn check(session: &Session, target: &RouteMatch<'_>) -> GuardDecision {
    let decision = decide(session.is_authenticated(), target.route.requires_auth, &target.path);
    if let GuardDecision::Redirect(to) = decision {
        tracing::debug!(from = %target.path, %to, "navigation redirected");
    }
    decision
}
