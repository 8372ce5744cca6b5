//! Telemetry publisher for MQTT.

use rumqttc::{AsyncClient, QoS};

use crate::error::{BridgeError, Result};

/// Destination for outbound telemetry.
///
/// Implementations must be callable from any thread; the radio worker
/// publishes from outside the async runtime.
pub trait TelemetrySink: Send + Sync {
    /// Publish `payload` on `topic` without waiting for delivery.
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<()>;
}

/// Publisher for sending telemetry to the broker.
///
/// Wraps an MQTT client handle. Publications are best effort: QoS 0,
/// not retained, and queued without waiting for the transport worker.
#[derive(Clone, Debug)]
pub struct Publisher {
    client: AsyncClient,
}

impl Publisher {
    /// Create a new publisher.
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }

    /// Publish raw bytes to a full topic.
    pub fn publish_raw(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload)
            .map_err(|e| BridgeError::Publish {
                topic: topic.to_string(),
                message: e.to_string(),
            })
    }
}

impl TelemetrySink for Publisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        self.publish_raw(topic, payload.to_vec())
    }
}
