use std::path::Path;

use reportdesk::state::storage::TokenStorage;

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("reportdesk-cli-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn cli(token_file: &Path, args: &[&str]) -> Cli {
    let mut argv = vec![
        "reportdesk".to_owned(),
        "--base-url".to_owned(),
        closed_port_url(),
        "--token-file".to_owned(),
        token_file.display().to_string(),
    ];
    argv.extend(args.iter().map(|arg| (*arg).to_owned()));
    Cli::try_parse_from(argv).unwrap()
}

// =============================================================================
// offline commands
// =============================================================================

#[tokio::test]
async fn routes_command_succeeds() {
    let dir = scratch_dir("routes");
    run(cli(&dir.join("session.json"), &["routes"])).await.unwrap();
}

#[tokio::test]
async fn navigate_without_token_is_redirected_not_failed() {
    let dir = scratch_dir("navigate-guest");
    run(cli(&dir.join("session.json"), &["navigate", "/reports"])).await.unwrap();
}

#[tokio::test]
async fn navigate_with_stored_token_does_not_wait_for_the_network() {
    let dir = scratch_dir("navigate-token");
    let token_file = dir.join("session.json");
    FileTokenStorage::new(&token_file).save("abc123").unwrap();

    run(cli(&token_file, &["navigate", "/news"])).await.unwrap();
    assert_eq!(FileTokenStorage::new(&token_file).load().unwrap().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn navigate_to_unknown_path_is_an_error() {
    let dir = scratch_dir("navigate-unknown");
    let err = run(cli(&dir.join("session.json"), &["navigate", "/admin"])).await.unwrap_err();
    assert!(matches!(err, CliError::Navigation(NavigationError::NotFound(_))));
}

#[tokio::test]
async fn logout_wipes_the_token_file() {
    let dir = scratch_dir("logout");
    let token_file = dir.join("session.json");
    FileTokenStorage::new(&token_file).save("abc123").unwrap();

    run(cli(&token_file, &["logout"])).await.unwrap();
    assert!(!token_file.exists());
}

#[tokio::test]
async fn whoami_without_token_reports_not_logged_in() {
    let dir = scratch_dir("whoami");
    let err = run(cli(&dir.join("session.json"), &["whoami"])).await.unwrap_err();
    assert!(matches!(err, CliError::NotLoggedIn));
}

// =============================================================================
// API command dispatch
// =============================================================================

#[tokio::test]
async fn api_groups_reach_the_network() {
    let dir = scratch_dir("api-groups");
    let token_file = dir.join("session.json");
    let commands: [&[&str]; 5] = [
        &["company", "list", "--limit", "5"],
        &["news", "latest", "o-1"],
        &["report", "code", "RPT-1A2B"],
        &["report", "analysis", "esg", "--company", "Acme"],
        &["user", "me"],
    ];
    for args in commands {
        let err = run(cli(&token_file, args)).await.unwrap_err();
        assert!(matches!(err, CliError::Api(ApiError::Network(_))), "{args:?}: {err:?}");
    }
}

#[test]
fn unknown_analysis_kind_is_rejected_by_the_parser() {
    let err = Cli::try_parse_from(["reportdesk", "report", "analysis", "horoscope"]).unwrap_err();
    assert!(err.to_string().contains("horoscope"));
}

#[test]
fn invalid_base_url_is_a_config_error() {
    let err = load_config(Some("ftp://example.test"), None).unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::InvalidBaseUrl(_))));
}
