//! MQTT transport worker.
//!
//! Drives the client event loop on its own task and turns broker events into
//! handler callbacks: subscriptions on connect, message delivery, and
//! subscription acknowledgements.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, ClientError, ConnectReturnCode, Event, EventLoop, Packet, QoS};

/// Delay before polling again after a transport error.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Receiver of inbound MQTT messages.
///
/// Called from the transport worker, concurrently with any other worker.
pub trait MessageHandler: Send + Sync + 'static {
    /// Handle a message delivered on a subscribed topic.
    fn on_message(&self, topic: &str, payload: &[u8]);

    /// Called after the broker accepted the connection and subscriptions were requested.
    fn on_connect(&self) {}
}

/// Something that can request a subscription from the broker.
pub trait Subscriber {
    /// Queue a subscription to `filter` at `qos` without waiting.
    fn subscribe(&self, filter: &str, qos: QoS) -> Result<(), ClientError>;
}

impl Subscriber for AsyncClient {
    fn subscribe(&self, filter: &str, qos: QoS) -> Result<(), ClientError> {
        self.try_subscribe(filter, qos)
    }
}

/// Handle a single event from the MQTT event loop.
///
/// On a successful CONNACK every filter in `subscriptions` is (re)subscribed
/// at `qos`; a refused CONNACK is logged and otherwise ignored.
pub fn handle_event<S, H>(
    event: &Event,
    client: &S,
    handler: &H,
    subscriptions: &[String],
    qos: QoS,
) where
    S: Subscriber + ?Sized,
    H: MessageHandler + ?Sized,
{
    match event {
        Event::Incoming(Packet::ConnAck(ack)) => {
            if ack.code == ConnectReturnCode::Success {
                tracing::info!(session_present = ack.session_present, "Connected to broker");

                for filter in subscriptions {
                    if let Err(e) = client.subscribe(filter, qos) {
                        tracing::error!(filter = %filter, error = %e, "Failed to subscribe");
                    } else {
                        tracing::debug!(filter = %filter, ?qos, "Subscription requested");
                    }
                }

                handler.on_connect();
            } else {
                tracing::warn!(code = ?ack.code, "Connect failed");
            }
        }
        Event::Incoming(Packet::Publish(publish)) => {
            tracing::trace!(topic = %publish.topic, bytes = publish.payload.len(), "Message received");
            handler.on_message(&publish.topic, &publish.payload);
        }
        Event::Incoming(Packet::SubAck(ack)) => {
            tracing::info!(pkid = ack.pkid, granted = ?ack.return_codes, "Subscribed");
        }
        Event::Incoming(packet) => {
            tracing::trace!(?packet, "MQTT incoming");
        }
        Event::Outgoing(outgoing) => {
            tracing::trace!(?outgoing, "MQTT outgoing");
        }
    }
}

/// Poll the event loop forever, dispatching events to `handler`.
///
/// Connection errors are logged; the next poll reconnects.
pub async fn drive_transport<H>(
    mut eventloop: EventLoop,
    client: AsyncClient,
    handler: Arc<H>,
    subscriptions: Vec<String>,
    qos: QoS,
) where
    H: MessageHandler + ?Sized,
{
    loop {
        match eventloop.poll().await {
            Ok(event) => handle_event(&event, &client, handler.as_ref(), &subscriptions, qos),
            Err(e) => {
                tracing::warn!(error = %e, "MQTT connection error");
                tokio::time::sleep(ERROR_BACKOFF).await;
            }
        }
    }
}
