//! HTTP client binding shared by every API call.
//!
//! SYSTEM CONTEXT
//! ==============
//! All requests go through [`HttpClient`]. It knows the API base path and
//! signs each request with the bearer token it reads from a
//! [`CredentialSource`] at build time. There is no mutable default header:
//! the session store owns the token and the binding only ever reads it.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, RequestAuth};
use crate::config::ClientConfig;

/// Read-only view of the current bearer token.
pub trait CredentialSource: Send + Sync {
    /// The token to attach to the next request, if any.
    fn bearer_token(&self) -> Option<String>;
}

/// Percent-encode one path segment, so an id cannot add segments, a query or
/// a fragment to the request path.
#[must_use]
pub fn path_segment(raw: &str) -> String {
    match reqwest::Url::parse("http://segment.local/") {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(raw);
            }
            url.path().trim_start_matches('/').to_owned()
        }
        Err(_) => String::new(),
    }
}

/// Credential source for clients that never authenticate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// `Authorization` header value for a token.
#[must_use]
pub fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    api_base: String,
    auth_timeout: Duration,
    credentials: Arc<dyn CredentialSource>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_base", &self.api_base)
            .field("auth_timeout", &self.auth_timeout)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Build a client for `config` that signs requests from `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the reqwest client fails to build.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_base: config.api_url(""),
            auth_timeout: config.timeouts.auth,
            credentials,
        })
    }

    /// Absolute URL for an API-relative path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Deadline applied to login, register and profile calls.
    #[must_use]
    pub fn auth_timeout(&self) -> Duration {
        self.auth_timeout
    }

    /// The `Authorization` header the next signed request will carry.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.credentials.bearer_token().map(|token| bearer_value(&token))
    }

    /// Start a request signed with the current session token, if any.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        let builder = self.http.request(method.clone(), self.url(path));
        match self.authorization_header() {
            Some(value) => ApiRequest {
                builder: builder.header(AUTHORIZATION, value),
                auth: RequestAuth::Bearer,
                method,
                path: path.to_owned(),
            },
            None => ApiRequest { builder, auth: RequestAuth::Anonymous, method, path: path.to_owned() },
        }
    }

    /// Start a request that never carries a credential.
    #[must_use]
    pub fn anonymous(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest {
            builder: self.http.request(method.clone(), self.url(path)),
            auth: RequestAuth::Anonymous,
            method,
            path: path.to_owned(),
        }
    }
}

/// A request under construction, remembering how it was authorized.
#[derive(Debug)]
pub struct ApiRequest {
    builder: reqwest::RequestBuilder,
    auth: RequestAuth,
    method: Method,
    path: String,
}

impl ApiRequest {
    #[must_use]
    pub fn query<Q: Serialize + ?Sized>(self, query: &Q) -> Self {
        Self { builder: self.builder.query(query), ..self }
    }

    #[must_use]
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Self {
        Self { builder: self.builder.json(body), ..self }
    }

    /// Form-encoded body (`application/x-www-form-urlencoded`).
    #[must_use]
    pub fn form<F: Serialize + ?Sized>(self, form: &F) -> Self {
        Self { builder: self.builder.form(form), ..self }
    }

    /// Per-request deadline overriding the client-wide request timeout.
    #[must_use]
    pub fn timeout(self, deadline: Duration) -> Self {
        Self { builder: self.builder.timeout(deadline), ..self }
    }

    #[must_use]
    pub fn auth(&self) -> RequestAuth {
        self.auth
    }

    /// Send the request and decode a JSON success body.
    ///
    /// An empty success body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ApiError`] for transport failures, non-success
    /// statuses and undecodable bodies.
    pub async fn send<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let Self { builder, auth, method, path } = self;
        let response = builder.send().await.map_err(|e| {
            let error = ApiError::from_transport(&e);
            tracing::debug!(%method, %path, error = %error, "request failed");
            error
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::from_transport(&e))?;
        tracing::debug!(%method, %path, status, "response received");

        if !(200..300).contains(&status) {
            return Err(ApiError::from_status(status, text, auth));
        }
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
