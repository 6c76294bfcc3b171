//! Call panel configuration

use serde::{Deserialize, Serialize};

use crate::voice::DeviceOptions;

/// Path of the token endpoint, resolved against the page URL.
pub const DEFAULT_TOKEN_PATH: &str = "./voice-token";

pub const DEFAULT_LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub token_path: String,
    pub device_options: DeviceOptions,
    /// Activity log lines kept before the oldest are dropped.
    pub log_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            device_options: DeviceOptions::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: UiConfig = serde_json::from_str(r#"{"log_capacity": 10}"#).unwrap();

        assert_eq!(config.log_capacity, 10);
        assert_eq!(config.token_path, "./voice-token");
        assert_eq!(config.device_options.edge, "sao-paulo");
    }
}
