//! Driver settings

use serde::{Deserialize, Serialize};

use crate::log::EventFilter;

/// Errors from loading a [`DriverConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid driver config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("driver name must not be empty")]
    EmptyName,
}

/// Settings for a [`Driver`](crate::driver::Driver).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```
/// use unistate_core::config::DriverConfig;
///
/// let config = DriverConfig::from_json(r#"{ "name": "checkout", "log_events": true }"#).unwrap();
/// assert_eq!(config.name, "checkout");
/// assert!(config.filter.allows("SubmitTapped"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Name attached to the driver's log lines
    pub name: String,
    /// Log every admitted event at debug level as it is applied
    pub log_events: bool,
    /// Which events `log_events` covers
    pub filter: EventFilter,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: "driver".to_string(),
            log_events: false,
            filter: EventFilter::default(),
        }
    }
}

impl DriverConfig {
    /// Default settings under a custom name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(config)
    }

    pub fn with_event_logging(mut self, filter: EventFilter) -> Self {
        self.log_events = true;
        self.filter = filter;
        self
    }

    /// Whether an event with this name should be logged as it is applied.
    pub fn logs(&self, event_name: &str) -> bool {
        self.log_events && self.filter.allows(event_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.name, "driver");
        assert!(!config.logs("SubmitTapped"));
    }

    #[test]
    fn test_from_json_partial() {
        let config = DriverConfig::from_json(
            r#"{ "log_events": true, "filter": { "exclude": ["Search*"] } }"#,
        )
        .unwrap();
        assert_eq!(config.name, "driver");
        assert!(config.logs("Tick"));
        assert!(!config.logs("SearchDidLoad"));
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            DriverConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DriverConfig::from_json(r#"{ "name": "  " }"#),
            Err(ConfigError::EmptyName)
        ));
    }

    #[test]
    fn test_with_event_logging() {
        let config = DriverConfig::named("search")
            .with_event_logging(EventFilter::new(Some("Query*"), None));
        assert!(config.logs("QueryChanged"));
        assert!(!config.logs("ResultsDismissed"));
    }
}
