use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// MQTT broker connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker host name or IP address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Broker TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Client identifier presented to the broker.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Start every connection with a clean session.
    #[serde(default = "default_clean_session")]
    pub clean_session: bool,

    /// QoS requested for the command subscriptions (0, 1 or 2).
    #[serde(default = "default_subscribe_qos")]
    pub subscribe_qos: u8,

    /// Optional broker username.
    #[serde(default)]
    pub username: Option<String>,

    /// Optional broker password.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "Energenie Controller".to_string()
}

fn default_keep_alive_secs() -> u64 {
    60
}

fn default_clean_session() -> bool {
    true
}

fn default_subscribe_qos() -> u8 {
    2
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_id: default_client_id(),
            keep_alive_secs: default_keep_alive_secs(),
            clean_session: default_clean_session(),
            subscribe_qos: default_subscribe_qos(),
            username: None,
            password: None,
        }
    }
}

impl MqttConfig {
    /// Validate the connection settings.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::Config("mqtt.host cannot be empty".to_string()));
        }
        if self.client_id.is_empty() || self.client_id.starts_with(' ') {
            return Err(Error::Config(format!(
                "mqtt.client_id '{}' is not a valid client identifier",
                self.client_id
            )));
        }
        if self.subscribe_qos > 2 {
            return Err(Error::Config(format!(
                "mqtt.subscribe_qos must be 0, 1 or 2, got {}",
                self.subscribe_qos
            )));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(Error::Config(
                "mqtt.username and mqtt.password must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
