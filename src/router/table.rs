//! Static route table and path matching.
//!
//! DESIGN
//! ======
//! Routes are declared once at startup in priority order and never mutated.
//! Each entry names the view the UI layer mounts for it; the router itself
//! never renders anything.

#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;

use std::collections::BTreeMap;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/";

/// View mounted for a route (the UI layer's component loader keys off this).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Register,
    Dashboard,
    News,
    Reports,
    ReportViewer,
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Pattern such as `/report-view/:id`.
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub requires_auth: bool,
}

/// A route resolved against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    /// Normalised concrete path (no query, fragment or trailing slash).
    pub path: String,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// The application's route table.
    #[must_use]
    pub fn standard() -> Self {
        let route = |path: &'static str, name: &'static str, view: View, requires_auth: bool| RouteDescriptor {
            path,
            name,
            view,
            requires_auth,
        };
        Self::new(vec![
            route(LOGIN_PATH, "Login", View::Login, false),
            route(REGISTER_PATH, "Register", View::Register, false),
            route(HOME_PATH, "Dashboard", View::Dashboard, true),
            route("/news", "News", View::News, true),
            route("/reports", "Reports", View::Reports, true),
            route("/report-view/:id", "ReportViewById", View::ReportViewer, true),
            route("/report-view/code/:code", "ReportViewByCode", View::ReportViewer, true),
        ])
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// First route, in table order, whose pattern matches `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = normalize_path(path);
        self.routes.iter().find_map(|route| {
            match_pattern(route.path, &path).map(|params| RouteMatch { route, path: path.clone(), params })
        })
    }
}

/// Strip query and fragment, force a leading `/`, drop a trailing `/`.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let trimmed = raw[..end].trim().trim_matches('/');
    format!("/{trimmed}")
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();
    let mut expected = segments(pattern);
    let mut actual = segments(path);
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return Some(params),
            (Some(want), Some(got)) => {
                if let Some(name) = want.strip_prefix(':') {
                    params.insert(name.to_owned(), got.to_owned());
                } else if want != got {
                    return None;
                }
            }
            _ => return None,
        }
    }
}
