//! In-process radio used when no transceiver is attached.
//!
//! Transmitted frames are logged and optionally appended to a capture file as
//! JSON lines. Inbound frames come from a replay file and from
//! [`FrameInjector`] handles.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use super::{FskFrame, InboundFrame, RadioDriver, RadioError};
use crate::config::RadioConfig;
use crate::hex::encode_bytes_to_hex;
use crate::openthings::{DeviceIdentity, OOK_ADDRESS_LENGTH};

/// One transmitted frame as written to the capture file.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum CaptureRecord<'a> {
    Ook {
        timestamp: i64,
        address: String,
        socket: u8,
        on: bool,
    },
    Fsk {
        timestamp: i64,
        frame: &'a FskFrame,
    },
}

/// Handle for feeding inbound frames to a [`SimulatedRadio`].
#[derive(Debug, Clone)]
pub struct FrameInjector {
    tx: Sender<InboundFrame>,
}

impl FrameInjector {
    /// Queue a frame for the next receive. Returns false if the radio is gone.
    pub fn inject(&self, frame: InboundFrame) -> bool {
        self.tx.send(frame).is_ok()
    }
}

/// A radio that transmits into the log.
pub struct SimulatedRadio {
    capture: Option<Mutex<BufWriter<File>>>,
    inbound_tx: Sender<InboundFrame>,
    inbound_rx: Mutex<Receiver<InboundFrame>>,
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRadio {
    /// Create a radio with no capture file and an empty inbound queue.
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel();
        Self {
            capture: None,
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
        }
    }

    /// Create a radio from configuration.
    ///
    /// Opens the capture file for appending and queues every frame of the
    /// replay file. Either file failing to open is an initialization error.
    pub fn open(config: &RadioConfig) -> Result<Self, RadioError> {
        let mut radio = Self::new();

        if let Some(path) = &config.capture_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    RadioError::Init(format!("capture file '{}': {}", path.display(), e))
                })?;
            radio.capture = Some(Mutex::new(BufWriter::new(file)));
        }

        if let Some(path) = &config.replay_path {
            let count = radio.load_replay(path)?;
            debug!(path = %path.display(), frames = count, "Queued replay frames");
        }

        Ok(radio)
    }

    /// A handle for injecting inbound frames.
    pub fn injector(&self) -> FrameInjector {
        FrameInjector {
            tx: self.inbound_tx.clone(),
        }
    }

    fn load_replay(&self, path: &Path) -> Result<usize, RadioError> {
        let file = File::open(path)
            .map_err(|e| RadioError::Init(format!("replay file '{}': {}", path.display(), e)))?;

        let mut count = 0;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: InboundFrame = serde_json::from_str(&line).map_err(|e| {
                RadioError::Init(format!(
                    "replay file '{}' line {}: {}",
                    path.display(),
                    index + 1,
                    e
                ))
            })?;
            // The receiver lives in self, so the send cannot fail.
            let _ = self.inbound_tx.send(frame);
            count += 1;
        }

        Ok(count)
    }

    fn capture(&self, record: &CaptureRecord<'_>) -> Result<(), RadioError> {
        let Some(capture) = &self.capture else {
            return Ok(());
        };

        let mut writer = capture.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl RadioDriver for SimulatedRadio {
    fn send_ook_frame(
        &self,
        address: &[u8; OOK_ADDRESS_LENGTH],
        socket: u8,
        on: bool,
    ) -> Result<(), RadioError> {
        let address = encode_bytes_to_hex(address);
        debug!(address = %address, socket, on, "OOK frame transmitted");

        self.capture(&CaptureRecord::Ook {
            timestamp: chrono::Utc::now().timestamp_millis(),
            address,
            socket,
            on,
        })
    }

    fn send_fsk_frame(&self, frame: &FskFrame) -> Result<(), RadioError> {
        debug!(
            manufacturer_id = frame.manufacturer_id,
            product_id = frame.product_id,
            sensor_id = frame.sensor_id,
            params = %encode_bytes_to_hex(&frame.params),
            "FSK frame transmitted"
        );

        self.capture(&CaptureRecord::Fsk {
            timestamp: chrono::Utc::now().timestamp_millis(),
            frame,
        })
    }

    fn receive_fsk_frame(
        &self,
        encryption_id: u8,
        product_id: u8,
        manufacturer_id: u8,
        timeout: Duration,
    ) -> Result<Option<InboundFrame>, RadioError> {
        let frame = match self.inbound_rx.lock().recv_timeout(timeout) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) => return Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(RadioError::Receive("inbound queue closed".to_string()));
            }
        };

        trace!(?frame, encryption_id, "FSK frame received");

        match &frame {
            InboundFrame::Join { .. } => Ok(Some(frame)),
            // Simulated frames all come from eTRV devices.
            _ if DeviceIdentity::ETRV.matches(manufacturer_id, product_id) => Ok(Some(frame)),
            _ => {
                trace!(
                    sensor_id = frame.sensor_id(),
                    "Dropping frame for another device family"
                );
                Ok(None)
            }
        }
    }
}
