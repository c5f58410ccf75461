use std::sync::Arc;

use super::*;
use crate::config::ClientConfig;
use crate::net::http::{CredentialSource, NoCredentials};
use crate::test_helpers::spawn_mock_api;

struct FixedToken(&'static str);

impl CredentialSource for FixedToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.to_owned())
    }
}

fn client(base_url: &str, credentials: Arc<dyn CredentialSource>) -> HttpClient {
    HttpClient::new(&ClientConfig::new(base_url).unwrap(), credentials).unwrap()
}

// =============================================================================
// endpoint helpers
// =============================================================================

#[test]
fn endpoint_helpers_format_expected_paths() {
    assert_eq!(oem_company_endpoint("o-1"), "/companies/oem/o-1");
    assert_eq!(favorite_endpoint("o-1"), "/companies/oem/o-1/favorite");
    assert_eq!(news_item_endpoint("n-9"), "/news/n-9");
    assert_eq!(company_news_endpoint("o-1"), "/news/company/o-1/latest");
    assert_eq!(report_endpoint("r-1"), "/reports/r-1");
    assert_eq!(report_code_endpoint("RPT-1A2B"), "/reports/code/RPT-1A2B");
}

#[test]
fn endpoint_helpers_keep_ids_inside_one_segment() {
    assert_eq!(report_code_endpoint("a/b?c#d"), "/reports/code/a%2Fb%3Fc%23d");
    assert_eq!(oem_company_endpoint("../users/me"), "/companies/oem/..%2Fusers%2Fme");
}

// =============================================================================
// auth
// =============================================================================

#[tokio::test]
async fn login_posts_form_credentials() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(NoCredentials));
    let token = http.auth().login("user@example.com", "pw").await.unwrap();
    assert_eq!(token.access_token, "abc123");
    assert_eq!(token.token_type, "bearer");
}

#[tokio::test]
async fn login_never_sends_a_stale_bearer() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(FixedToken("stale")));
    let token = http.auth().login("user@example.com", "pw").await.unwrap();
    assert_eq!(token.access_token, "abc123");
}

#[tokio::test]
async fn login_with_bad_password_is_authentication_error() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(NoCredentials));
    let err = http.auth().login("user@example.com", "nope").await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication { ref message } if message == "Incorrect username or password"));
}

#[tokio::test]
async fn register_returns_server_body_verbatim() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(NoCredentials));
    let body = serde_json::json!({ "email": "new@example.com", "name": "New", "password": "secret" });
    let response = http.auth().register(&body).await.unwrap();
    assert_eq!(response, serde_json::json!({ "user_id": "u-2", "email": "new@example.com", "name": "New" }));
}

#[tokio::test]
async fn register_surfaces_conflict_and_validation() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(NoCredentials));

    let taken = serde_json::json!({ "email": "taken@example.com", "name": "T", "password": "secret" });
    let err = http.auth().register(&taken).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict { ref message } if message == "Email already registered"));

    let short = serde_json::json!({ "email": "x@example.com", "name": "X", "password": "p" });
    let err = http.auth().register(&short).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation { ref message } if message == "password too short"));
}

// =============================================================================
// catalogue
// =============================================================================

#[tokio::test]
async fn company_list_omits_unset_filters() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(NoCredentials));

    let companies = http.companies().list(&CompanyQuery::default()).await.unwrap();
    assert_eq!(companies[0].company_name, "Acme Motors");

    let query = CompanyQuery { skip: Some(5), limit: Some(20), country: Some("DE".into()) };
    http.companies().list(&query).await.unwrap();

    assert_eq!(
        mock.requests(),
        vec!["GET /companies/oem?".to_owned(), "GET /companies/oem?country=DE&limit=20&skip=5".to_owned()]
    );
}

#[tokio::test]
async fn toggle_favorite_requires_session() {
    let mock = spawn_mock_api().await;

    let anonymous = client(&mock.base_url, Arc::new(NoCredentials));
    let err = anonymous.companies().toggle_favorite("o-1").await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication { .. }));

    let signed = client(&mock.base_url, Arc::new(FixedToken("valid")));
    let toggle = signed.companies().toggle_favorite("o-1").await.unwrap();
    assert!(toggle.is_favorite);
}

#[tokio::test]
async fn company_news_defaults_limit_to_ten() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(NoCredentials));

    http.news().latest_for_company("o-1", None).await.unwrap();
    let items = http.news().latest_for_company("o-1", Some(3)).await.unwrap();
    assert_eq!(items[0].oem_id, "o-1");

    assert_eq!(
        mock.requests(),
        vec!["GET /news/company/o-1/latest?limit=10".to_owned(), "GET /news/company/o-1/latest?limit=3".to_owned()]
    );
}

#[tokio::test]
async fn report_by_code_maps_missing_to_not_found() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(NoCredentials));

    let report = http.reports().by_code("RPT-1A2B").await.unwrap();
    assert_eq!(report.report_code, "RPT-1A2B");

    let odd = http.reports().by_code("RPT 1/2?x").await.unwrap();
    assert_eq!(odd.report_code, "RPT 1/2?x");

    let err = http.reports().by_code("RPT-MISSING").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { ref message } if message == "Report not found"));
}

#[tokio::test]
async fn user_update_sends_only_set_fields() {
    let mock = spawn_mock_api().await;
    let http = client(&mock.base_url, Arc::new(FixedToken("valid")));

    let update = UserUpdate { name: Some("Renamed".into()), ..UserUpdate::default() };
    let profile = http.users().update(&update).await.unwrap();
    assert_eq!(profile.name, "Renamed");
    assert_eq!(profile.email, "user@example.com");
}
