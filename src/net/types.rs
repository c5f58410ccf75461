//! Wire DTOs for the reporting API.
//!
//! DESIGN
//! ======
//! Field names mirror the server's JSON exactly. Timestamps and dates stay as
//! ISO 8601 strings; the client only displays them.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH / USERS
// =============================================================================

/// The authenticated user's profile as returned by `/auth/me` and `/users/me`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user identifier (UUID string).
    pub user_id: String,
    pub email: String,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// ISO 8601 date (`YYYY-MM-DD`), if provided at registration.
    #[serde(default)]
    pub birth_date: Option<String>,
    /// Access role, e.g. `"viewer"`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

/// Successful login response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Opaque bearer credential.
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Registration payload for `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Partial profile update for `PUT /users/me`. Unset fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

// =============================================================================
// COMPANIES
// =============================================================================

/// An OEM company tracked by the product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OemCompany {
    pub oem_id: String,
    pub company_name: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry_segment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Filters for `GET /companies/oem`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompanyQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Result of toggling a favorite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteToggle {
    pub message: String,
    /// Favorite state after the toggle.
    pub is_favorite: bool,
}

/// Dashboard financial snapshot from `GET /companies/financials/summary`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    #[serde(default)]
    pub our_company: Option<CompanyFinancials>,
    /// Top OEMs by revenue change, descending.
    #[serde(default)]
    pub oem_revenue_change: Vec<RevenueChange>,
    /// Top OEMs by profit margin, descending.
    #[serde(default)]
    pub profit_margins: Vec<ProfitMargin>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    pub company_name: String,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub revenue_change_pct: Option<f64>,
    #[serde(default)]
    pub profit_margin: Option<f64>,
    pub period: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueChange {
    pub company_name: String,
    pub revenue_change_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfitMargin {
    pub company_name: String,
    pub profit_margin: f64,
}

// =============================================================================
// NEWS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub news_id: String,
    pub oem_id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Sentiment label assigned upstream (e.g. `"positive"`).
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Filters for `GET /news`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oem_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// =============================================================================
// REPORTS
// =============================================================================

/// Metadata for a generated HTML report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    /// Human-facing code such as `RPT-1A2B3C4D`.
    pub report_code: String,
    pub title: String,
    pub html_path: String,
    #[serde(default)]
    pub oem_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Filters for `GET /reports`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReportQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oem_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportGenerateRequest {
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oem_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_sections: Option<Vec<String>>,
}

/// Acknowledgement that report generation has started.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportGenerateResponse {
    pub report_id: String,
    pub report_code: String,
    pub status: String,
    pub message: String,
}

/// Which analysis agent to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Stock,
    ValueChain,
    Esg,
    TechSearch,
}

impl std::str::FromStr for AnalysisKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "stock" => Ok(Self::Stock),
            "value_chain" => Ok(Self::ValueChain),
            "esg" => Ok(Self::Esg),
            "tech_search" => Ok(Self::TechSearch),
            other => Err(format!(
                "unknown analysis type '{other}' (expected stock, value_chain, esg or tech_search)"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oem_id: Option<String>,
    pub analysis_type: AnalysisKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: String,
    pub analysis_type: String,
    /// Agent output; shape depends on the analysis type.
    #[serde(default)]
    pub result: serde_json::Value,
}
