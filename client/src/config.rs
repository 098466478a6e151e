//! Client configuration from the environment
//!
//! The backend URL and anon key are looked up under several names so the
//! same `.env` works for this SDK and for the Vite or CRA front-ends.

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Candidate variables for the backend URL, first non-empty wins
pub const URL_VARS: [&str; 3] = ["FARM_API_URL", "VITE_SUPABASE_URL", "REACT_APP_SUPABASE_URL"];

/// Candidate variables for the anon API key, first non-empty wins
pub const KEY_VARS: [&str; 3] = [
    "FARM_API_KEY",
    "VITE_SUPABASE_ANON_KEY",
    "REACT_APP_SUPABASE_ANON_KEY",
];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, without the `/api/v1` suffix
    pub base_url: String,
    /// Sent as the `apikey` header on every request
    pub api_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Read the URL and key from the process environment (and `.env`)
    pub fn from_env() -> ClientResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let base_url = first(&URL_VARS)
            .ok_or_else(|| ClientError::Config(format!("backend URL not set (one of {})", URL_VARS.join(", "))))?;
        let api_key = first(&KEY_VARS)
            .ok_or_else(|| ClientError::Config(format!("API key not set (one of {})", KEY_VARS.join(", "))))?;

        Ok(Self::new(base_url, api_key))
    }

    /// Root of the versioned API
    pub fn api_base(&self) -> String {
        format!("{}/api/v1", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn first_non_empty_variable_wins() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("FARM_API_URL", "  "),
            ("VITE_SUPABASE_URL", "https://farm.example.org/"),
            ("REACT_APP_SUPABASE_URL", "https://other.example.org"),
            ("REACT_APP_SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://farm.example.org/");
        assert_eq!(config.api_key, "anon");
        assert_eq!(config.api_base(), "https://farm.example.org/api/v1");
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[("FARM_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(ref msg) if msg.contains("FARM_API_URL")));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[("FARM_API_URL", "http://localhost:3000")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(ref msg) if msg.contains("FARM_API_KEY")));
    }
}
