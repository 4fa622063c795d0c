//! Console Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how the console reaches the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the evaluator service.
    pub base_url: String,

    /// Path of the evaluation endpoint, relative to `base_url`.
    pub eval_path: String,

    /// Upper bound on one evaluation round-trip.
    pub request_timeout_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_owned(),
            eval_path: "/eval".to_owned(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ConsoleConfig {
    /// Create a config for `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Full URL of the evaluation endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.eval_path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_with_one_slash() {
        assert_eq!(ConsoleConfig::new("http://host").endpoint(), "http://host/eval");
        assert_eq!(ConsoleConfig::new("http://host/").endpoint(), "http://host/eval");

        let config = ConsoleConfig {
            eval_path: "api/eval".into(),
            ..ConsoleConfig::new("http://host//")
        };
        assert_eq!(config.endpoint(), "http://host/api/eval");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = ConsoleConfig::from_json(r#"{ "base_url": "https://eval.example" }"#).unwrap();
        assert_eq!(config.eval_path, "/eval");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.endpoint(), "https://eval.example/eval");
    }
}
