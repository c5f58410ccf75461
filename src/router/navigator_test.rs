use super::*;
use crate::config::ClientConfig;
use crate::router::table::RouteDescriptor;
use crate::state::session::SessionStore;
use crate::state::storage::MemoryTokenStorage;

fn offline_store(token: Option<&str>) -> std::sync::Arc<SessionStore> {
    let storage = token.map(MemoryTokenStorage::with_token).unwrap_or_default();
    SessionStore::open(&ClientConfig::new("http://127.0.0.1:1").unwrap(), storage).unwrap()
}

fn navigator_for(store: &SessionStore) -> Navigator {
    Navigator::new(RouteTable::standard(), store.subscribe())
}

// =============================================================================
// guarded transitions
// =============================================================================

#[test]
fn reports_without_token_redirects_to_login() {
    let store = offline_store(None);
    let mut nav = navigator_for(&store);

    let result = nav.navigate("/reports").unwrap();
    assert_eq!(result, Navigation::Redirected { requested: "/reports".into(), location: nav.current().unwrap().clone() });
    assert_eq!(result.location().path, "/login");
    assert_eq!(result.location().view, View::Login);
}

#[test]
fn login_while_authenticated_redirects_home() {
    let store = offline_store(Some("abc123"));
    let mut nav = navigator_for(&store);

    let result = nav.navigate("/login").unwrap();
    assert!(result.was_redirected());
    assert_eq!(result.location().path, "/");
    assert_eq!(result.location().name, "Dashboard");
}

#[test]
fn news_while_authenticated_is_allowed() {
    let store = offline_store(Some("abc123"));
    let mut nav = navigator_for(&store);

    let result = nav.navigate("/news").unwrap();
    assert!(!result.was_redirected());
    assert_eq!(nav.current().map(|l| l.path.as_str()), Some("/news"));
}

#[test]
fn initial_load_is_guarded() {
    let store = offline_store(None);
    let mut nav = navigator_for(&store);
    assert!(nav.current().is_none());

    let result = nav.start("/").unwrap();
    assert!(result.was_redirected());
    assert_eq!(result.location().path, "/login");
}

#[test]
fn restored_token_passes_guard_on_initial_load() {
    let store = offline_store(Some("persisted"));
    let mut nav = navigator_for(&store);
    let result = nav.start("/report-view/code/RPT-1").unwrap();
    assert_eq!(result.location().params.get("code").map(String::as_str), Some("RPT-1"));
    assert!(!result.was_redirected());
}

#[test]
fn guard_sees_session_changes_immediately() {
    let store = offline_store(None);
    let mut nav = navigator_for(&store);
    assert!(nav.navigate("/news").unwrap().was_redirected());

    store.set_token(Some("abc123"));
    assert!(!nav.navigate("/news").unwrap().was_redirected());
}

#[test]
fn revalidate_after_logout_leaves_protected_route() {
    let store = offline_store(Some("abc123"));
    let mut nav = navigator_for(&store);
    assert!(nav.revalidate().is_none());
    nav.navigate("/reports").unwrap();

    store.logout();
    let result = nav.revalidate().unwrap().unwrap();
    assert!(result.was_redirected());
    assert_eq!(nav.current().map(|l| l.path.as_str()), Some("/login"));
}

// =============================================================================
// failures
// =============================================================================

#[test]
fn unknown_path_keeps_current_location() {
    let store = offline_store(Some("abc123"));
    let mut nav = navigator_for(&store);
    nav.navigate("/news").unwrap();

    let err = nav.navigate("/admin").unwrap_err();
    assert!(matches!(err, NavigationError::NotFound(ref path) if path == "/admin"));
    assert_eq!(nav.current().map(|l| l.path.as_str()), Some("/news"));
}

#[test]
fn table_without_login_route_reports_missing_redirect_target() {
    let store = offline_store(None);
    let table = RouteTable::new(vec![RouteDescriptor {
        path: "/",
        name: "Dashboard",
        view: View::Dashboard,
        requires_auth: true,
    }]);
    let mut nav = Navigator::new(table, store.subscribe());

    let err = nav.navigate("/").unwrap_err();
    assert!(matches!(err, NavigationError::NotFound(ref path) if path == "/login"));
}

#[test]
fn cyclic_table_is_detected() {
    // A guest sent to a protected login page is sent back to it.
    let store = offline_store(None);
    let table = RouteTable::new(vec![RouteDescriptor {
        path: "/login",
        name: "Login",
        view: View::Login,
        requires_auth: true,
    }]);
    let mut nav = Navigator::new(table, store.subscribe());

    let err = nav.navigate("/login").unwrap_err();
    assert!(matches!(err, NavigationError::RedirectLoop(ref path) if path == "/login"));
}
