//! Configuration for the Energenie bridge.

use std::path::PathBuf;
use std::time::Duration;

use energenie_bridge_framework::{BridgeConfig, BridgeError, LoggingConfig, MqttConfig};
use energenie_common::TOPIC_ROOT;
use serde::{Deserialize, Serialize};

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergenieBridgeConfig {
    /// MQTT connection settings
    #[serde(default)]
    pub mqtt: MqttConfig,

    /// Bridge loop and topic settings
    #[serde(default)]
    pub energenie: EnergenieConfig,

    /// Radio driver selection
    #[serde(default)]
    pub radio: RadioConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bridge loop and topic settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergenieConfig {
    /// Root namespace segment of every topic (default: "energenie")
    #[serde(default = "default_topic_root")]
    pub topic_root: String,

    /// Delay between bridge loop iterations in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on one radio poll in milliseconds
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,

    /// Seconds an unanswered join is kept before it is dropped (0 keeps it forever)
    #[serde(default = "default_join_timeout_secs")]
    pub join_timeout_secs: u64,
}

fn default_topic_root() -> String {
    TOPIC_ROOT.to_string()
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_receive_timeout_ms() -> u64 {
    100
}

fn default_join_timeout_secs() -> u64 {
    60
}

impl Default for EnergenieConfig {
    fn default() -> Self {
        Self {
            topic_root: default_topic_root(),
            poll_interval_ms: default_poll_interval_ms(),
            receive_timeout_ms: default_receive_timeout_ms(),
            join_timeout_secs: default_join_timeout_secs(),
        }
    }
}

impl EnergenieConfig {
    /// Delay between bridge loop iterations.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Upper bound on one radio poll.
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// How long an unanswered join is kept, or `None` to keep it forever.
    pub fn join_timeout(&self) -> Option<Duration> {
        (self.join_timeout_secs > 0).then(|| Duration::from_secs(self.join_timeout_secs))
    }
}

/// Available radio drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioDriverKind {
    /// In-process radio that logs transmissions.
    #[default]
    Simulated,
}

/// Radio driver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Driver to use
    #[serde(default)]
    pub driver: RadioDriverKind,

    /// Append every transmitted frame to this file as JSON lines
    #[serde(default)]
    pub capture_path: Option<PathBuf>,

    /// Inject the inbound frames listed in this JSON-lines file at startup
    #[serde(default)]
    pub replay_path: Option<PathBuf>,
}

impl BridgeConfig for EnergenieBridgeConfig {
    fn mqtt(&self) -> &MqttConfig {
        &self.mqtt
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn topic_root(&self) -> &str {
        &self.energenie.topic_root
    }

    fn validate(&self) -> Result<(), BridgeError> {
        self.mqtt.validate()?;

        let root = &self.energenie.topic_root;
        if root.is_empty() {
            return Err(BridgeError::validation(
                "energenie.topic_root cannot be empty",
            ));
        }
        if root.contains(['/', '+', '#']) {
            return Err(BridgeError::validation(format!(
                "energenie.topic_root '{}' must be a single topic level without wildcards",
                root
            )));
        }

        if self.energenie.receive_timeout_ms == 0 {
            return Err(BridgeError::validation(
                "energenie.receive_timeout_ms must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            mqtt: { host: "pi.local", port: 1884 },
            energenie: {
                topic_root: "home",
                poll_interval_ms: 20,
                receive_timeout_ms: 250,
                join_timeout_secs: 0,
            },
            radio: {
                driver: "simulated",
                capture_path: "/tmp/frames.jsonl",
            },
            logging: { level: "debug", format: "json" },
        }"#;

        let config: EnergenieBridgeConfig = json5::from_str(json).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.mqtt.host, "pi.local");
        assert_eq!(config.mqtt.port, 1884);
        assert_eq!(config.topic_root(), "home");
        assert_eq!(config.energenie.poll_interval(), Duration::from_millis(20));
        assert_eq!(config.energenie.receive_timeout(), Duration::from_millis(250));
        assert_eq!(config.energenie.join_timeout(), None);
        assert_eq!(config.radio.driver, RadioDriverKind::Simulated);
        assert_eq!(
            config.radio.capture_path,
            Some(PathBuf::from("/tmp/frames.jsonl"))
        );
        assert!(config.radio.replay_path.is_none());
    }

    #[test]
    fn test_defaults() {
        let config: EnergenieBridgeConfig = json5::from_str("{}").unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.mqtt.client_id, "Energenie Controller");
        assert_eq!(config.mqtt.keep_alive_secs, 60);
        assert_eq!(config.topic_root(), "energenie");
        assert_eq!(config.energenie.poll_interval_ms, 10);
        assert_eq!(config.energenie.receive_timeout_ms, 100);
        assert_eq!(config.energenie.join_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_topic_root_validation() {
        for root in ["", "a/b", "home+", "#"] {
            let mut config = EnergenieBridgeConfig::default();
            config.energenie.topic_root = root.to_string();
            assert!(
                matches!(config.validate(), Err(BridgeError::ConfigValidation(_))),
                "root {:?} should be rejected",
                root
            );
        }
    }

    #[test]
    fn test_zero_receive_timeout_rejected() {
        let mut config = EnergenieBridgeConfig::default();
        config.energenie.receive_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mqtt_validation_applies() {
        let mut config = EnergenieBridgeConfig::default();
        config.mqtt.subscribe_qos = 5;
        assert!(matches!(
            config.validate(),
            Err(BridgeError::ConfigValidation(_))
        ));

        let mut config = EnergenieBridgeConfig::default();
        config.mqtt.username = Some("energenie".to_string());
        assert!(matches!(
            config.validate(),
            Err(BridgeError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_unknown_driver_rejected() {
        let result: Result<EnergenieBridgeConfig, _> =
            json5::from_str(r#"{ radio: { driver: "rfm69" } }"#);
        assert!(result.is_err());
    }
}
