//! Applies the navigation guard to every transition.
//!
//! The navigator owns the route table and a read-only view of the session.
//! `start` is the initial load and is guarded like any other transition;
//! redirect targets are guarded again before they are entered.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::collections::BTreeMap;

use tokio::sync::watch;

use super::guard::{self, GuardDecision};
use super::table::{RouteMatch, RouteTable, View, normalize_path};
use crate::state::session::Session;

/// Redirect hops allowed for a single transition before giving up.
pub const MAX_REDIRECTS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("no route matches {0}")]
    NotFound(String),

    #[error("redirect loop while navigating to {0}")]
    RedirectLoop(String),
}

/// Where the navigator currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub name: &'static str,
    pub view: View,
    pub params: BTreeMap<String, String>,
}

impl From<RouteMatch<'_>> for Location {
    fn from(matched: RouteMatch<'_>) -> Self {
        Self { path: matched.path, name: matched.route.name, view: matched.route.view, params: matched.params }
    }
}

/// Result of a completed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The requested route was entered as-is.
    Arrived(Location),
    /// The guard aborted the request and sent the user elsewhere.
    Redirected { requested: String, location: Location },
}

impl Navigation {
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Self::Arrived(location) | Self::Redirected { location, .. } => location,
        }
    }

    #[must_use]
    pub fn was_redirected(&self) -> bool {
        matches!(self, Self::Redirected { .. })
    }
}

#[derive(Debug)]
pub struct Navigator {
    table: RouteTable,
    session: watch::Receiver<Session>,
    current: Option<Location>,
}

impl Navigator {
    pub fn new(table: RouteTable, session: watch::Receiver<Session>) -> Self {
        Self { table, session, current: None }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    #[must_use]
    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    /// Initial load.
    ///
    /// # Errors
    ///
    /// See [`navigate`](Self::navigate).
    pub fn start(&mut self, initial_path: &str) -> Result<Navigation, NavigationError> {
        self.current = None;
        self.navigate(initial_path)
    }

    /// Attempt a transition to `path`, following guard redirects.
    ///
    /// On error the current location is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NotFound`] when no route matches the path
    /// (or a redirect target), and [`NavigationError::RedirectLoop`] when
    /// redirects do not settle within [`MAX_REDIRECTS`] hops.
    pub fn navigate(&mut self, path: &str) -> Result<Navigation, NavigationError> {
        let session = self.session.borrow().clone();
        let requested = normalize_path(path);
        let mut target = requested.clone();

        for hop in 0..=MAX_REDIRECTS {
            let matched = self.table.resolve(&target).ok_or_else(|| NavigationError::NotFound(target.clone()))?;
            match guard::check(&session, &matched) {
                GuardDecision::Allow => {
                    let location = Location::from(matched);
                    self.current = Some(location.clone());
                    tracing::debug!(path = %location.path, route = location.name, "navigated");
                    return Ok(if hop == 0 {
                        Navigation::Arrived(location)
                    } else {
                        Navigation::Redirected { requested, location }
                    });
                }
                GuardDecision::Redirect(to) => target = to.to_owned(),
            }
        }
        Err(NavigationError::RedirectLoop(requested))
    }

    /// Re-run the guard on the current location, e.g. after logout.
    ///
    /// Returns `None` before the first successful navigation.
    pub fn revalidate(&mut self) -> Option<Result<Navigation, NavigationError>> {
        let path = self.current.as_ref()?.path.clone();
        Some(self.navigate(&path))
    }
}
