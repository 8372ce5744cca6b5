//! Inbound command routing.
//!
//! Topics are tokenized on `/`, checked against the root namespace and then
//! handed to the decoder for their device kind. Each kind validates its own
//! topic shape and payload and knows how to transmit its commands.

pub mod socket;
pub mod valve;

use std::sync::Arc;

use energenie_bridge_framework::{MessageHandler, TopicBuilder};
use energenie_common::tokenize;
use energenie_common::topic::{ENER002, ETRV};
use tracing::{error, info, trace, warn};

use crate::command::{Command, DeviceKind, RouteError};
use crate::openthings::DeviceIdentity;
use crate::radio::RadioDriver;

/// Cut `text` to at most `max` characters.
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Turns command topics into radio transmissions.
pub struct TopicRouter {
    radio: Arc<dyn RadioDriver>,
    root: String,
    identity: DeviceIdentity,
}

impl TopicRouter {
    /// Create a router for topics under `topics`, sending eTRV-family frames.
    pub fn new(radio: Arc<dyn RadioDriver>, topics: &TopicBuilder) -> Self {
        Self::with_identity(radio, topics, DeviceIdentity::ETRV)
    }

    /// Create a router sending valve frames as `identity`.
    pub fn with_identity(
        radio: Arc<dyn RadioDriver>,
        topics: &TopicBuilder,
        identity: DeviceIdentity,
    ) -> Self {
        Self {
            radio,
            root: topics.root().to_string(),
            identity,
        }
    }

    /// Validate a topic and payload into a command without sending anything.
    pub fn route(&self, topic: &str, payload: &[u8]) -> Result<Command, RouteError> {
        let segments = tokenize(topic);
        for (index, segment) in segments.iter().enumerate() {
            trace!("segment[{}] = {}", index, segment);
        }

        if segments.len() < 2 {
            return Err(RouteError::topic(topic, "too few levels"));
        }
        if segments[1] != self.root {
            return Err(RouteError::topic(
                topic,
                format!("root '{}' does not match '{}'", segments[1], self.root),
            ));
        }

        let Some(kind) = segments.get(2) else {
            return Err(RouteError::topic(topic, "missing device kind"));
        };

        match device_kind(kind) {
            Some(DeviceKind::Socket) => socket::decode(topic, &segments, payload),
            Some(DeviceKind::Valve) => valve::decode(topic, &segments, payload),
            None => Err(RouteError::unsupported(*kind, topic)),
        }
    }

    /// Transmit a validated command.
    pub fn dispatch(&self, command: &Command) -> Result<(), RouteError> {
        match command.kind() {
            DeviceKind::Socket => socket::send(self.radio.as_ref(), command),
            DeviceKind::Valve => valve::send(self.radio.as_ref(), &self.identity, command),
        }
    }

    /// Route and dispatch one inbound message.
    ///
    /// Never fails: rejected messages are logged and dropped. Returns the
    /// command when one was transmitted.
    pub fn handle(&self, topic: &str, payload: &[u8]) -> Option<Command> {
        let result = self
            .route(topic, payload)
            .and_then(|command| self.dispatch(&command).map(|()| command));

        match result {
            Ok(command) => Some(command),
            Err(e) if e.is_unsupported() => {
                warn!(topic = %topic, "{}", e);
                None
            }
            Err(e) => {
                error!(topic = %topic, "{}", e);
                None
            }
        }
    }
}

fn device_kind(segment: &str) -> Option<DeviceKind> {
    match segment {
        ENER002 => Some(DeviceKind::Socket),
        ETRV => Some(DeviceKind::Valve),
        _ => None,
    }
}

impl MessageHandler for TopicRouter {
    fn on_message(&self, topic: &str, payload: &[u8]) {
        self.handle(topic, payload);
    }

    fn on_connect(&self) {
        info!(root = %self.root, "Listening for device commands");
    }
}
