//! Radio receive path.
//!
//! Polls the radio for one frame and records what it carries: join requests
//! and temperature reports go to the [`ProtocolStateTracker`], senders go to
//! the [`SensorRegistry`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::openthings::SensorId;
use crate::radio::{InboundFrame, RadioDriver, RadioError};
use crate::registry::SensorRegistry;
use crate::state::ProtocolStateTracker;

/// Applies inbound radio frames to the shared protocol state.
pub struct RadioReceiver {
    radio: Arc<dyn RadioDriver>,
    state: Arc<ProtocolStateTracker>,
    registry: Arc<SensorRegistry>,
    timeout: Duration,
}

impl RadioReceiver {
    pub fn new(
        radio: Arc<dyn RadioDriver>,
        state: Arc<ProtocolStateTracker>,
        registry: Arc<SensorRegistry>,
        timeout: Duration,
    ) -> Self {
        Self {
            radio,
            state,
            registry,
            timeout,
        }
    }

    /// Wait up to the receive timeout for one frame and apply it.
    pub fn poll(&self) -> Result<Option<InboundFrame>, RadioError> {
        let identity = self.state.identity();
        let frame = self.radio.receive_fsk_frame(
            identity.encryption_id,
            identity.product_id,
            identity.manufacturer_id,
            self.timeout,
        )?;

        if let Some(frame) = &frame {
            self.apply(frame);
        }
        Ok(frame)
    }

    /// Record one decoded frame.
    pub fn apply(&self, frame: &InboundFrame) {
        let Some(sensor_id) = SensorId::new(frame.sensor_id()) else {
            debug!(?frame, "Ignoring frame with sensor id 0");
            return;
        };

        match frame {
            InboundFrame::Join {
                manufacturer_id,
                product_id,
                ..
            } => {
                self.registry.record(sensor_id);
                debug!(
                    sensor_id = %sensor_id,
                    manufacturer_id,
                    product_id,
                    "Join request received"
                );
                let previous = self
                    .state
                    .observe_join(*manufacturer_id, *product_id, sensor_id);
                if let Some(previous) = previous {
                    debug!(sensor_id = %previous.sensor_id, "Unanswered join replaced");
                }
            }
            InboundFrame::Temperature { temperature, .. } => {
                self.registry.record(sensor_id);
                info!(sensor_id = %sensor_id, temperature = %temperature, "Temperature report");
                let previous = self.state.observe_temperature(sensor_id, temperature.as_str());
                if let Some(previous) = previous {
                    debug!(sensor_id = %previous.sensor_id, "Unpublished report replaced");
                }
                self.send_nil(sensor_id);
            }
            InboundFrame::Other { .. } => {
                debug!(sensor_id = %sensor_id, "Frame without a handled parameter");
            }
        }
    }

    /// Acknowledge a report with a frame carrying no parameters.
    fn send_nil(&self, sensor_id: SensorId) {
        let identity = self.state.identity();
        let frame = self.radio.build_fsk_frame(
            identity.manufacturer_id,
            identity.encryption_id,
            identity.product_id,
            sensor_id.get(),
            &[],
        );
        if let Err(e) = self.radio.send_fsk_frame(&frame) {
            warn!(sensor_id = %sensor_id, error = %e, "Failed to send NIL frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openthings::DeviceIdentity;
    use crate::radio::{FskFrame, SimulatedRadio};
    use crate::state::JoinResolution;
    use parking_lot::Mutex;

    /// Radio that records FSK sends and delegates receives to a simulated radio.
    #[derive(Default)]
    struct RecordingRadio {
        inner: SimulatedRadio,
        sent: Mutex<Vec<FskFrame>>,
    }

    impl RadioDriver for RecordingRadio {
        fn send_ook_frame(&self, _: &[u8; 10], _: u8, _: bool) -> Result<(), RadioError> {
            Ok(())
        }

        fn send_fsk_frame(&self, frame: &FskFrame) -> Result<(), RadioError> {
            self.sent.lock().push(frame.clone());
            Ok(())
        }

        fn receive_fsk_frame(
            &self,
            encryption_id: u8,
            product_id: u8,
            manufacturer_id: u8,
            timeout: Duration,
        ) -> Result<Option<InboundFrame>, RadioError> {
            self.inner
                .receive_fsk_frame(encryption_id, product_id, manufacturer_id, timeout)
        }
    }

    fn setup() -> (
        Arc<RecordingRadio>,
        RadioReceiver,
        Arc<ProtocolStateTracker>,
        Arc<SensorRegistry>,
    ) {
        let radio = Arc::new(RecordingRadio::default());
        let state = Arc::new(ProtocolStateTracker::new(DeviceIdentity::ETRV, None));
        let registry = Arc::new(SensorRegistry::new());
        let receiver = RadioReceiver::new(
            radio.clone(),
            state.clone(),
            registry.clone(),
            Duration::from_millis(10),
        );
        (radio, receiver, state, registry)
    }

    #[test]
    fn test_temperature_sets_report_and_sends_nil() {
        let (radio, receiver, state, registry) = setup();
        radio.inner.injector().inject(InboundFrame::Temperature {
            sensor_id: 7,
            temperature: "21.5".to_string(),
        });

        assert!(receiver.poll().unwrap().is_some());

        let report = state.take_report().unwrap();
        assert_eq!(report.sensor_id.get(), 7);
        assert_eq!(report.temperature, "21.5");
        assert!(registry.contains(report.sensor_id));

        let sent = radio.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].sensor_id, 7);
        assert!(sent[0].is_nil());
    }

    #[test]
    fn test_join_sets_pending_join() {
        let (radio, receiver, state, registry) = setup();
        radio.inner.injector().inject(InboundFrame::Join {
            manufacturer_id: 0x04,
            product_id: 0x03,
            sensor_id: 12,
        });

        receiver.poll().unwrap();

        assert_eq!(state.join_state().map(|j| j.sensor_id.get()), Some(12));
        assert!(matches!(state.resolve_join(), JoinResolution::Respond(_)));
        assert_eq!(registry.len(), 1);
        assert!(radio.sent.lock().is_empty());
    }

    #[test]
    fn test_zero_sensor_and_other_frames_leave_state_idle() {
        let (_radio, receiver, state, registry) = setup();
        receiver.apply(&InboundFrame::Temperature {
            sensor_id: 0,
            temperature: "20.0".to_string(),
        });
        receiver.apply(&InboundFrame::Other { sensor_id: 5 });

        assert!(!state.report_pending());
        assert!(state.join_state().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_poll_timeout_is_not_an_error() {
        let (_radio, receiver, _state, _registry) = setup();
        assert!(receiver.poll().unwrap().is_none());
    }
}
