//! Grouped REST operations over the HTTP client binding.
//!
//! Each service borrows an [`HttpClient`] and maps named operations onto fixed
//! methods and paths. Auth calls run under the client's auth deadline.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use super::http::{HttpClient, path_segment};
use super::types::{
    AnalysisRequest, AnalysisResponse, CompanyQuery, FavoriteToggle, FinancialSummary, NewsItem, NewsQuery,
    OemCompany, Report, ReportGenerateRequest, ReportGenerateResponse, ReportQuery, TokenResponse, UserProfile,
    UserUpdate,
};

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const REGISTER_ENDPOINT: &str = "/auth/register";
pub const CURRENT_USER_ENDPOINT: &str = "/auth/me";

/// Default number of items for a company's latest-news feed.
pub const DEFAULT_COMPANY_NEWS_LIMIT: u32 = 10;

fn oem_company_endpoint(oem_id: &str) -> String {
    format!("/companies/oem/{}", path_segment(oem_id))
}

fn favorite_endpoint(oem_id: &str) -> String {
    format!("/companies/oem/{}/favorite", path_segment(oem_id))
}

fn news_item_endpoint(news_id: &str) -> String {
    format!("/news/{}", path_segment(news_id))
}

fn company_news_endpoint(oem_id: &str) -> String {
    format!("/news/company/{}/latest", path_segment(oem_id))
}

fn report_endpoint(report_id: &str) -> String {
    format!("/reports/{}", path_segment(report_id))
}

fn report_code_endpoint(code: &str) -> String {
    format!("/reports/code/{}", path_segment(code))
}

impl HttpClient {
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService { http: self }
    }

    #[must_use]
    pub fn companies(&self) -> CompanyService<'_> {
        CompanyService { http: self }
    }

    #[must_use]
    pub fn news(&self) -> NewsService<'_> {
        NewsService { http: self }
    }

    #[must_use]
    pub fn reports(&self) -> ReportService<'_> {
        ReportService { http: self }
    }

    #[must_use]
    pub fn users(&self) -> UserService<'_> {
        UserService { http: self }
    }
}

// =============================================================================
// AUTH
// =============================================================================

pub struct AuthService<'a> {
    http: &'a HttpClient,
}

impl AuthService<'_> {
    /// `POST /auth/login` with a form-encoded `username`/`password` body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Authentication`] when the credentials are rejected.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<TokenResponse, ApiError> {
        self.http
            .anonymous(Method::POST, LOGIN_ENDPOINT)
            .form(&[("username", identifier), ("password", secret)])
            .timeout(self.http.auth_timeout())
            .send()
            .await
    }

    /// `POST /auth/register` with a JSON body; the response is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] or [`ApiError::Conflict`] when the
    /// server rejects the registration.
    pub async fn register<B: Serialize + ?Sized>(&self, user_data: &B) -> Result<Value, ApiError> {
        self.http
            .anonymous(Method::POST, REGISTER_ENDPOINT)
            .json(user_data)
            .timeout(self.http.auth_timeout())
            .send()
            .await
    }

    /// `GET /auth/me` signed with the current session token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::SessionExpired`] when the token is rejected.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.http
            .request(Method::GET, CURRENT_USER_ENDPOINT)
            .timeout(self.http.auth_timeout())
            .send()
            .await
    }
}

// =============================================================================
// COMPANIES
// =============================================================================

pub struct CompanyService<'a> {
    http: &'a HttpClient,
}

impl CompanyService<'_> {
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn list(&self, query: &CompanyQuery) -> Result<Vec<OemCompany>, ApiError> {
        self.http.request(Method::GET, "/companies/oem").query(query).send().await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown company.
    pub async fn get(&self, oem_id: &str) -> Result<OemCompany, ApiError> {
        self.http.request(Method::GET, &oem_company_endpoint(oem_id)).send().await
    }

    /// Flip the favorite flag for the current user.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn toggle_favorite(&self, oem_id: &str) -> Result<FavoriteToggle, ApiError> {
        self.http.request(Method::POST, &favorite_endpoint(oem_id)).send().await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn favorites(&self) -> Result<Vec<OemCompany>, ApiError> {
        self.http.request(Method::GET, "/companies/favorites").send().await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn financial_summary(&self) -> Result<FinancialSummary, ApiError> {
        self.http.request(Method::GET, "/companies/financials/summary").send().await
    }
}

// =============================================================================
// NEWS
// =============================================================================

pub struct NewsService<'a> {
    http: &'a HttpClient,
}

impl NewsService<'_> {
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn list(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, ApiError> {
        self.http.request(Method::GET, "/news").query(query).send().await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown news item.
    pub async fn get(&self, news_id: &str) -> Result<NewsItem, ApiError> {
        self.http.request(Method::GET, &news_item_endpoint(news_id)).send().await
    }

    /// Most recent items for one company; `limit` defaults to
    /// [`DEFAULT_COMPANY_NEWS_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn latest_for_company(&self, oem_id: &str, limit: Option<u32>) -> Result<Vec<NewsItem>, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_COMPANY_NEWS_LIMIT);
        self.http
            .request(Method::GET, &company_news_endpoint(oem_id))
            .query(&[("limit", limit)])
            .send()
            .await
    }
}

// =============================================================================
// REPORTS
// =============================================================================

pub struct ReportService<'a> {
    http: &'a HttpClient,
}

impl ReportService<'_> {
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn list(&self, query: &ReportQuery) -> Result<Vec<Report>, ApiError> {
        self.http.request(Method::GET, "/reports").query(query).send().await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown report.
    pub async fn get(&self, report_id: &str) -> Result<Report, ApiError> {
        self.http.request(Method::GET, &report_endpoint(report_id)).send().await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown report code.
    pub async fn by_code(&self, code: &str) -> Result<Report, ApiError> {
        self.http.request(Method::GET, &report_code_endpoint(code)).send().await
    }

    /// Start server-side report generation.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn generate(&self, request: &ReportGenerateRequest) -> Result<ReportGenerateResponse, ApiError> {
        self.http.request(Method::POST, "/reports/generate").json(request).send().await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn run_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ApiError> {
        self.http.request(Method::POST, "/reports/analysis").json(request).send().await
    }
}

// =============================================================================
// USERS
// =============================================================================

pub struct UserService<'a> {
    http: &'a HttpClient,
}

impl UserService<'_> {
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.http.request(Method::GET, "/users/me").send().await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails.
    pub async fn update(&self, update: &UserUpdate) -> Result<UserProfile, ApiError> {
        self.http.request(Method::PUT, "/users/me").json(update).send().await
    }
}
