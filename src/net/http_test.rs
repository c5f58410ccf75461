use std::sync::Mutex;

use serde_json::Value;

use super::*;
use crate::test_helpers::spawn_mock_api;

/// Credential source whose token the test can swap.
#[derive(Default)]
struct SwappableToken(Mutex<Option<String>>);

impl SwappableToken {
    fn set(&self, token: Option<&str>) {
        *self.0.lock().unwrap() = token.map(str::to_owned);
    }
}

impl CredentialSource for SwappableToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.lock().unwrap().clone()
    }
}

fn client_for(base_url: &str, credentials: Arc<dyn CredentialSource>) -> HttpClient {
    HttpClient::new(&ClientConfig::new(base_url).unwrap(), credentials).unwrap()
}

#[test]
fn bearer_value_formats_header() {
    assert_eq!(bearer_value("abc123"), "Bearer abc123");
}

#[test]
fn path_segment_escapes_reserved_characters() {
    assert_eq!(path_segment("RPT-1A2B"), "RPT-1A2B");
    assert_eq!(path_segment("a/b"), "a%2Fb");
    assert_eq!(path_segment("q?x=1#frag"), "q%3Fx=1%23frag");
    assert_eq!(path_segment("two words"), "two%20words");
}

#[test]
fn url_prefixes_api_base() {
    let client = client_for("http://localhost:8000", Arc::new(NoCredentials));
    assert_eq!(client.url("/news"), "http://localhost:8000/api/news");
}

#[test]
fn authorization_header_tracks_credential_source() {
    let token = Arc::new(SwappableToken::default());
    let client = client_for("http://localhost:8000", token.clone());
    assert_eq!(client.authorization_header(), None);

    token.set(Some("abc123"));
    assert_eq!(client.authorization_header().as_deref(), Some("Bearer abc123"));

    token.set(None);
    assert_eq!(client.authorization_header(), None);
}

#[test]
fn request_auth_reflects_token_presence() {
    let token = Arc::new(SwappableToken::default());
    let client = client_for("http://localhost:8000", token.clone());
    assert_eq!(client.request(Method::GET, "/news").auth(), RequestAuth::Anonymous);

    token.set(Some("abc123"));
    assert_eq!(client.request(Method::GET, "/news").auth(), RequestAuth::Bearer);
    assert_eq!(client.anonymous(Method::POST, "/auth/login").auth(), RequestAuth::Anonymous);
}

#[tokio::test]
async fn signed_request_carries_current_token_on_the_wire() {
    let mock = spawn_mock_api().await;
    let token = Arc::new(SwappableToken::default());
    let client = client_for(&mock.base_url, token.clone());

    token.set(Some("valid"));
    let profile: crate::net::types::UserProfile = client.request(Method::GET, "/auth/me").send().await.unwrap();
    assert_eq!(profile.email, "user@example.com");

    token.set(None);
    let err = client.request(Method::GET, "/auth/me").send::<Value>().await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication { .. }));

    assert_eq!(mock.me_auth_headers(), vec![Some("Bearer valid".to_owned()), None]);
}

#[tokio::test]
async fn rejected_bearer_is_session_expired() {
    let mock = spawn_mock_api().await;
    let token = Arc::new(SwappableToken::default());
    token.set(Some("expired"));
    let client = client_for(&mock.base_url, token);

    let err = client.request(Method::GET, "/auth/me").send::<Value>().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired { ref message } if message == "Could not validate credentials"));
}

#[tokio::test]
async fn per_request_timeout_maps_to_timeout_error() {
    let mock = spawn_mock_api().await;
    let token = Arc::new(SwappableToken::default());
    token.set(Some("slow"));
    let client = client_for(&mock.base_url, token);

    let err = client
        .request(Method::GET, "/auth/me")
        .timeout(Duration::from_millis(100))
        .send::<Value>()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client_for(&format!("http://127.0.0.1:{port}"), Arc::new(NoCredentials));
    let err = client.request(Method::GET, "/news").send::<Value>().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
