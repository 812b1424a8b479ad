use serde::{Deserialize, Serialize};

use charterdesk_auth::{is_protected_path, normalize_path, LOGIN_PATH};
use charterdesk_observability::LogConfig;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Host configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the REST backend, without trailing slash.
    pub api_base_url: String,
    /// Where unauthenticated visitors are sent.
    pub login_path: String,
    pub log: LogConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            login_path: LOGIN_PATH.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// `CHARTERDESK_API_URL`, `CHARTERDESK_LOGIN_PATH`, plus the logging
    /// variables understood by [`LogConfig`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_base_url = lookup("CHARTERDESK_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_base_url);

        let login_path = match lookup("CHARTERDESK_LOGIN_PATH") {
            Some(path) if !path.trim().starts_with('/') => {
                tracing::warn!(%path, "CHARTERDESK_LOGIN_PATH must start with '/'; using default");
                defaults.login_path
            }
            // A login page on a guarded route would redirect to itself forever.
            Some(path) if is_protected_path(&path) => {
                tracing::warn!(%path, "CHARTERDESK_LOGIN_PATH collides with a protected route; using default");
                defaults.login_path
            }
            Some(path) => normalize_path(&path).to_string(),
            None => defaults.login_path,
        };

        Self {
            api_base_url,
            login_path,
            log: LogConfig::from_lookup(&lookup),
        }
    }

    /// Absolute URL of a backend resource, e.g. `endpoint("flights")`.
    pub fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.api_base_url, resource.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_env_is_empty() {
        let config = DashboardConfig::from_lookup(|_| None);
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.endpoint("/flights"), "http://localhost:5000/api/flights");
    }

    #[test]
    fn trailing_slash_is_stripped_and_bad_login_path_ignored() {
        let config = DashboardConfig::from_lookup(|key| match key {
            "CHARTERDESK_API_URL" => Some("https://ops.example.com/api/".to_string()),
            "CHARTERDESK_LOGIN_PATH" => Some("signin".to_string()),
            _ => None,
        });
        assert_eq!(config.endpoint("flights"), "https://ops.example.com/api/flights");
        assert_eq!(config.login_path, "/login");
    }

    #[test]
    fn custom_login_path_is_normalized() {
        let config = DashboardConfig::from_lookup(|key| {
            (key == "CHARTERDESK_LOGIN_PATH").then(|| "/signin/".to_string())
        });
        assert_eq!(config.login_path, "/signin");
    }

    #[test]
    fn login_path_on_a_protected_route_is_rejected() {
        for path in ["/", "/flights", "/admin/users/"] {
            let config = DashboardConfig::from_lookup(|key| {
                (key == "CHARTERDESK_LOGIN_PATH").then(|| path.to_string())
            });
            assert_eq!(config.login_path, "/login", "{path} should fall back");
        }
    }
}
