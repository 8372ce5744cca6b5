//! Validated commands and routing errors.

use std::fmt;

use thiserror::Error;

use crate::hex::encode_bytes_to_hex;
use crate::openthings::{OOK_ADDRESS_LENGTH, SensorId};
use crate::radio::RadioError;

/// Device families reachable through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// ENER002 OOK relay socket.
    Socket,
    /// eTRV radiator valve.
    Valve,
}

impl DeviceKind {
    /// The topic segment naming this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Socket => energenie_common::topic::ENER002,
            DeviceKind::Valve => energenie_common::topic::ETRV,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a command is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAddress {
    /// One socket of an ENER002 transmitter address; socket 0 switches all.
    Socket {
        address: [u8; OOK_ADDRESS_LENGTH],
        socket: u8,
    },
    /// A single valve.
    Valve(SensorId),
}

impl DeviceAddress {
    /// The device family this address belongs to.
    pub fn kind(&self) -> DeviceKind {
        match self {
            DeviceAddress::Socket { .. } => DeviceKind::Socket,
            DeviceAddress::Valve(_) => DeviceKind::Valve,
        }
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceAddress::Socket { address, socket } => {
                write!(f, "{}/{}", encode_bytes_to_hex(address), socket)
            }
            DeviceAddress::Valve(id) => write!(f, "{}", id),
        }
    }
}

/// What a command asks the device to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    On,
    Off,
    Identify,
}

/// A validated inbound request, consumed once by the radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub target: DeviceAddress,
    pub action: Action,
    pub payload: Vec<u8>,
}

impl Command {
    /// The device family the command targets.
    pub fn kind(&self) -> DeviceKind {
        self.target.kind()
    }
}

/// Reasons an inbound message produced no command.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Invalid topic '{topic}': {reason}")]
    InvalidTopic { topic: String, reason: String },

    #[error("Invalid payload for {topic}: {reason}")]
    InvalidPayload { topic: String, reason: String },

    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid sensor id '{0}'")]
    InvalidSensorId(String),

    #[error("Unsupported command '{command}' for {target}")]
    UnsupportedCommand { target: String, command: String },

    #[error(transparent)]
    Radio(#[from] RadioError),
}

impl RouteError {
    pub(crate) fn topic(topic: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTopic {
            topic: topic.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn payload(topic: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            topic: topic.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn address(address: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(target: impl Into<String>, command: impl Into<String>) -> Self {
        Self::UnsupportedCommand {
            target: target.into(),
            command: command.into(),
        }
    }

    /// True for well-formed requests the bridge does not implement.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedCommand { .. })
    }
}
