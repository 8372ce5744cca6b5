//! Radio driver interface.
//!
//! The driver owns modulation, SPI access, and frame encryption. The bridge
//! only asks it to send OOK socket frames, to build and send OpenThings FSK
//! frames, and to poll for one decoded inbound frame.

pub mod simulated;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::openthings::OOK_ADDRESS_LENGTH;

pub use simulated::{FrameInjector, SimulatedRadio};

/// Errors raised by a radio driver.
#[derive(Debug, Error)]
pub enum RadioError {
    #[error("Radio initialization failed: {0}")]
    Init(String),

    #[error("Transmit failed: {0}")]
    Transmit(String),

    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Radio I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An OpenThings FSK frame ready to send.
///
/// Holds the clear-text header and parameter bytes; the driver applies
/// encryption and checksum on transmit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FskFrame {
    pub manufacturer_id: u8,
    pub encryption_id: u8,
    pub product_id: u8,
    pub sensor_id: u32,
    pub param_count: u8,
    pub params: Vec<u8>,
}

impl FskFrame {
    /// Assemble a frame; the parameter count is taken from `params`.
    pub fn new(
        manufacturer_id: u8,
        encryption_id: u8,
        product_id: u8,
        sensor_id: u32,
        params: &[u8],
    ) -> Self {
        Self {
            manufacturer_id,
            encryption_id,
            product_id,
            sensor_id,
            param_count: params.len().min(u8::MAX as usize) as u8,
            params: params.to_vec(),
        }
    }

    /// True for a frame without parameters.
    pub fn is_nil(&self) -> bool {
        self.params.is_empty()
    }
}

/// A decoded inbound OpenThings message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// A device announcing itself and asking to join.
    Join {
        manufacturer_id: u8,
        product_id: u8,
        sensor_id: u32,
    },
    /// A temperature report, already rendered as text.
    Temperature { sensor_id: u32, temperature: String },
    /// Any other message, tagged with its sender.
    Other { sensor_id: u32 },
}

impl InboundFrame {
    /// The sensor id of the sending device.
    pub fn sensor_id(&self) -> u32 {
        match self {
            Self::Join { sensor_id, .. }
            | Self::Temperature { sensor_id, .. }
            | Self::Other { sensor_id } => *sensor_id,
        }
    }
}

/// Access to the sub-GHz radio.
///
/// Sends may be issued concurrently from the command path and the radio
/// loop, so implementations serialize access to the hardware themselves.
pub trait RadioDriver: Send + Sync {
    /// Switch one socket (or all, for index 0) of an ENER002 address.
    fn send_ook_frame(
        &self,
        address: &[u8; OOK_ADDRESS_LENGTH],
        socket: u8,
        on: bool,
    ) -> Result<(), RadioError>;

    /// Encrypt and transmit an FSK frame.
    fn send_fsk_frame(&self, frame: &FskFrame) -> Result<(), RadioError>;

    /// Build an FSK frame addressed to `sensor_id`.
    fn build_fsk_frame(
        &self,
        manufacturer_id: u8,
        encryption_id: u8,
        product_id: u8,
        sensor_id: u32,
        params: &[u8],
    ) -> FskFrame {
        FskFrame::new(manufacturer_id, encryption_id, product_id, sensor_id, params)
    }

    /// Wait up to `timeout` for one inbound frame.
    ///
    /// Frames are decrypted with `encryption_id`. Join requests are returned
    /// whatever their origin; other frames only when they come from
    /// `manufacturer_id`/`product_id`. `Ok(None)` means nothing arrived.
    fn receive_fsk_frame(
        &self,
        encryption_id: u8,
        product_id: u8,
        manufacturer_id: u8,
        timeout: Duration,
    ) -> Result<Option<InboundFrame>, RadioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_param_count() {
        let frame = FskFrame::new(0x04, 0xf2, 0x03, 42, &[0xbf, 0x00]);
        assert_eq!(frame.param_count, 2);
        assert!(!frame.is_nil());

        let nil = FskFrame::new(0x04, 0xf2, 0x03, 42, &[]);
        assert_eq!(nil.param_count, 0);
        assert!(nil.is_nil());
    }

    #[test]
    fn test_inbound_frame_json() {
        let frame: InboundFrame =
            serde_json::from_str(r#"{"type":"temperature","sensor_id":7,"temperature":"21.5"}"#)
                .unwrap();
        assert_eq!(
            frame,
            InboundFrame::Temperature {
                sensor_id: 7,
                temperature: "21.5".to_string()
            }
        );
        assert_eq!(frame.sensor_id(), 7);

        let join: InboundFrame = serde_json::from_str(
            r#"{"type":"join","manufacturer_id":4,"product_id":3,"sensor_id":9}"#,
        )
        .unwrap();
        assert_eq!(join.sensor_id(), 9);
    }
}
