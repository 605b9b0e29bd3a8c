use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_EXIT_COMMAND: &str = "Exit application";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    pub exit_command: String,
    pub poll_interval_ms: u64,
    // Idle scrollback reverts after `max_idle_polls` polls of `idle_poll_ms`
    pub idle_poll_ms: u64,
    pub max_idle_polls: u32,
    pub buffer_cap: u16,
    // Accepted in a query besides letters and digits
    pub allowed_punctuation: String,
    pub pager_indicator: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            exit_command: DEFAULT_EXIT_COMMAND.to_string(),
            poll_interval_ms: 250,
            idle_poll_ms: 100,
            max_idle_polls: 50,
            buffer_cap: 8000,
            allowed_punctuation: " ._".to_string(),
            pager_indicator: "-- more --".to_string(),
        }
    }
}

impl LauncherConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid launcher config")
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    #[must_use]
    pub fn accepts(&self, c: char) -> bool {
        c.is_alphanumeric() || self.allowed_punctuation.contains(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LauncherConfig::from_toml(
            r#"
            exit_command = "quit"
            poll_interval_ms = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.exit_command, "quit");
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.buffer_cap, 8000);
        assert_eq!(config.max_idle_polls, 50);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = LauncherConfig::from_toml("buffer_cap = \"lots\"").unwrap_err();
        assert!(err.to_string().contains("invalid launcher config"));
    }

    #[test]
    fn test_accepted_characters() {
        let config = LauncherConfig::default();
        assert!(config.accepts('a'));
        assert!(config.accepts('7'));
        assert!(config.accepts(' '));
        assert!(config.accepts('_'));
        assert!(!config.accepts('-'));
        assert!(!config.accepts('/'));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = LauncherConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(LauncherConfig::from_toml(&text).unwrap(), config);
    }
}
