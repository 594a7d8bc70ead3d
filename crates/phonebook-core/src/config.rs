use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://phonebook.ddirection.kz";

/// Client configuration, usually read from `config.toml`.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin every endpoint path is appended to.
    pub base_url: String,
    pub refresh_interval_secs: u64,
    /// How long the alert flag stays up after a mutation.
    pub alert_duration_ms: u64,
    pub request_timeout_secs: u64,
    pub initial_items_per_page: u64,
    pub session: SessionPolicy,
}

impl ClientConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn alert_duration(&self) -> Duration {
        Duration::from_millis(self.alert_duration_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval_secs: 5 * 60,
            alert_duration_ms: 2500,
            request_timeout_secs: 30,
            initial_items_per_page: crate::page::DEFAULT_ITEMS_PER_PAGE,
            session: SessionPolicy::default(),
        }
    }
}

/// Session behaviors that are known defects, kept switchable until a
/// product decision is made. Defaults reproduce the deployed client.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SessionPolicy {
    /// Navigate to `/` after a failed login too (the guard bounces it back
    /// to `/login`).
    pub navigate_after_failed_login: bool,
    /// Cancel the refresh timer on logout. Off: a surviving timer keeps
    /// firing and each tick logs out again.
    pub stop_refresh_on_logout: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            navigate_after_failed_login: true,
            stop_refresh_on_logout: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.alert_duration(), Duration::from_millis(2500));
        assert_eq!(config.initial_items_per_page, 10);
        assert!(config.session.navigate_after_failed_login);
        assert!(!config.session.stop_refresh_on_logout);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            base_url = "http://localhost:8080"

            [session]
            stop_refresh_on_logout = true
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.refresh_interval_secs, 300);
        assert!(config.session.stop_refresh_on_logout);
        assert!(config.session.navigate_after_failed_login);
    }
}
