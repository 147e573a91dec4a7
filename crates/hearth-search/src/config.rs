//! Search layer configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, or assembled with the builder methods.

use std::env;
use std::time::Duration;

/// Default endpoint for a local index during development.
const DEFAULT_ENDPOINT: &str = "http://localhost:9200";

/// Bound on the startup health probe. Everything else runs on the HTTP
/// client's defaults; a hung search call blocks its request, by contract.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cap on hits per search request.
const DEFAULT_RESULT_LIMIT: u32 = 10;

/// Search layer configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SearchConfig::from_env();
///
/// // or explicitly, e.g. for tests:
/// let config = SearchConfig::disabled();
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Master switch. When false, no client is constructed and every
    /// index operation is a successful no-op.
    pub enabled: bool,

    /// Base URL of the search backend.
    pub endpoint: String,

    /// Optional API key sent as `Authorization: ApiKey <key>`.
    pub api_key: Option<String>,

    /// Prefix for index names, e.g. `hearth-dev` → `hearth-dev-meals`.
    pub index_prefix: String,

    /// Bound on the startup health probe.
    pub probe_timeout: Duration,

    /// Cap on hits per search request (index path, fallback path, and
    /// the recent listing all honor this).
    pub result_limit: u32,
}

impl SearchConfig {
    /// Creates a configuration pointed at the given endpoint, with
    /// defaults for everything else.
    pub fn new(endpoint: impl Into<String>) -> Self {
        SearchConfig {
            enabled: true,
            endpoint: endpoint.into(),
            api_key: None,
            index_prefix: "hearth-dev".to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    /// Creates a configuration with search switched off entirely.
    pub fn disabled() -> Self {
        SearchConfig {
            enabled: false,
            ..SearchConfig::new(DEFAULT_ENDPOINT)
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the index-name prefix.
    pub fn index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_prefix = prefix.into();
        self
    }

    /// Sets the per-request hit cap.
    pub fn result_limit(mut self, limit: u32) -> Self {
        self.result_limit = limit;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// | Variable                   | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HEARTH_SEARCH_ENABLED`    | `true`                  |
    /// | `HEARTH_SEARCH_ENDPOINT`   | `http://localhost:9200` |
    /// | `HEARTH_SEARCH_API_KEY`    | unset                   |
    /// | `HEARTH_ENV`               | `development`           |
    ///
    /// The index prefix is derived from `HEARTH_ENV`: `hearth-dev` for
    /// `development`, otherwise `hearth-{env}`.
    pub fn from_env() -> Self {
        let enabled = env::var("HEARTH_SEARCH_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        let endpoint =
            env::var("HEARTH_SEARCH_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let api_key = env::var("HEARTH_SEARCH_API_KEY").ok().filter(|k| !k.is_empty());

        let environment = env::var("HEARTH_ENV").unwrap_or_else(|_| "development".to_string());
        let index_prefix = if environment == "development" {
            "hearth-dev".to_string()
        } else {
            format!("hearth-{environment}")
        };

        SearchConfig {
            enabled,
            endpoint,
            api_key,
            index_prefix,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SearchConfig::new("http://search:9200")
            .api_key("secret")
            .index_prefix("hearth-test")
            .result_limit(25);

        assert!(config.enabled);
        assert_eq!(config.endpoint, "http://search:9200");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.index_prefix, "hearth-test");
        assert_eq!(config.result_limit, 25);
    }

    #[test]
    fn test_disabled() {
        let config = SearchConfig::disabled();
        assert!(!config.enabled);
    }
}
