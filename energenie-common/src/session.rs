use std::net::SocketAddr;
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};

use crate::config::MqttConfig;
use crate::error::{Error, Result};

/// Capacity of the request channel between the client handle and its event loop.
pub const REQUEST_CHANNEL_CAPACITY: usize = 64;

/// Convert a numeric QoS level into the MQTT enum.
pub fn qos(level: u8) -> Result<QoS> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(Error::Config(format!("Invalid QoS level: {}", other))),
    }
}

/// Build MQTT client options from configuration.
///
/// The configuration is validated first, since the client library panics on
/// malformed client identifiers.
pub fn mqtt_options(config: &MqttConfig) -> Result<MqttOptions> {
    config.validate()?;

    let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
    options.set_clean_session(config.clean_session);

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        options.set_credentials(username.clone(), password.clone());
    }

    Ok(options)
}

/// Create the client handle and the event loop that drives it.
///
/// No network traffic happens until the event loop is polled.
pub fn create_client(config: &MqttConfig) -> Result<(AsyncClient, EventLoop)> {
    let options = mqtt_options(config)?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        client_id = %config.client_id,
        keep_alive = config.keep_alive_secs,
        clean_session = config.clean_session,
        "Creating MQTT client"
    );

    Ok(AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY))
}

/// Resolve the configured broker address.
///
/// Fails fast when the broker host cannot be resolved, before any worker is started.
pub async fn resolve_broker(config: &MqttConfig) -> Result<SocketAddr> {
    let mut addrs = tokio::net::lookup_host((config.host.as_str(), config.port))
        .await
        .map_err(|e| Error::Resolve(format!("{}:{}: {}", config.host, config.port, e)))?;

    addrs.next().ok_or_else(|| {
        Error::Resolve(format!(
            "{}:{}: no addresses found",
            config.host, config.port
        ))
    })
}
