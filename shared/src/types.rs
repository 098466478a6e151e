//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Georgian,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Georgian => "ka",
            Language::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ka" => Some(Language::Georgian),
            "en" => Some(Language::English),
            _ => None,
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    50
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    /// Largest page size the API hands out
    pub const MAX_PER_PAGE: u32 = 500;

    /// Clamp to sane bounds and return `(limit, offset)` for SQL
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE) as i64;
        let page = self.page.max(1) as i64;
        (per_page, (page - 1) * per_page)
    }
}

/// Error body returned by the API for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ka: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_page_size() {
        let p = Pagination {
            page: 3,
            per_page: 10_000,
        };
        assert_eq!(p.limit_offset(), (500, 1000));

        let p = Pagination { page: 0, per_page: 0 };
        assert_eq!(p.limit_offset(), (1, 0));
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::default(), Language::Georgian);
        assert_eq!(Language::from_code("en"), Some(Language::English));
        assert_eq!(Language::from_code("th"), None);
    }
}
