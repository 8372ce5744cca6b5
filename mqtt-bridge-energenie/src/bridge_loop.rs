//! The steady-state radio loop.
//!
//! Each iteration polls the radio once, answers a pending join and publishes
//! a pending temperature report. Commands from the broker are handled on the
//! transport worker and never pass through here.

use std::sync::Arc;
use std::time::Duration;

use energenie_bridge_framework::{TelemetrySink, TopicBuilder};
use tracing::{debug, error, info, warn};

use crate::openthings::{PARAM_JOIN_RESP, SensorId};
use crate::radio::{InboundFrame, RadioDriver};
use crate::receiver::RadioReceiver;
use crate::state::{JoinResolution, PendingJoin, ProtocolStateTracker};

/// What one loop iteration did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationOutcome {
    /// Frame received from the radio, if any.
    pub received: Option<InboundFrame>,
    /// Sensor a join response was sent to.
    pub join_response: Option<SensorId>,
    /// Topic a temperature report was published on.
    pub published: Option<String>,
}

/// Polls the radio and turns protocol state into transmissions and telemetry.
pub struct BridgeLoop {
    receiver: RadioReceiver,
    radio: Arc<dyn RadioDriver>,
    state: Arc<ProtocolStateTracker>,
    sink: Arc<dyn TelemetrySink>,
    topics: TopicBuilder,
    poll_interval: Duration,
}

impl BridgeLoop {
    pub fn new(
        receiver: RadioReceiver,
        radio: Arc<dyn RadioDriver>,
        state: Arc<ProtocolStateTracker>,
        sink: Arc<dyn TelemetrySink>,
        topics: TopicBuilder,
        poll_interval: Duration,
    ) -> Self {
        Self {
            receiver,
            radio,
            state,
            sink,
            topics,
            poll_interval,
        }
    }

    /// Run forever, pausing `poll_interval` between iterations.
    pub fn run(&self) -> ! {
        info!(
            "Starting radio loop (interval: {}ms)",
            self.poll_interval.as_millis()
        );

        loop {
            self.run_iteration();
            std::thread::sleep(self.poll_interval);
        }
    }

    /// Perform a single iteration.
    pub fn run_iteration(&self) -> IterationOutcome {
        let received = match self.receiver.poll() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Radio receive failed: {}", e);
                None
            }
        };

        let join_response = self.resolve_join();
        let published = self.publish_report();

        IterationOutcome {
            received,
            join_response,
            published,
        }
    }

    fn resolve_join(&self) -> Option<SensorId> {
        match self.state.resolve_join() {
            JoinResolution::Idle => None,
            JoinResolution::Respond(join) => self.send_join_response(&join),
            JoinResolution::Mismatch(join) => {
                debug!(
                    "Join from sensor {} (manufacturer {:#04x}, product {:#04x}) does not match",
                    join.sensor_id, join.manufacturer_id, join.product_id
                );
                None
            }
            JoinResolution::Expired(join) => {
                warn!(
                    "Dropping unanswered join from sensor {} (manufacturer {:#04x}, product {:#04x})",
                    join.sensor_id, join.manufacturer_id, join.product_id
                );
                None
            }
        }
    }

    fn send_join_response(&self, join: &PendingJoin) -> Option<SensorId> {
        let frame = self.radio.build_fsk_frame(
            join.manufacturer_id,
            self.state.identity().encryption_id,
            join.product_id,
            join.sensor_id.get(),
            &[PARAM_JOIN_RESP, 0x00],
        );

        match self.radio.send_fsk_frame(&frame) {
            Ok(()) => {
                info!(sensor_id = %join.sensor_id, "Join response sent");
                Some(join.sensor_id)
            }
            Err(e) => {
                error!(sensor_id = %join.sensor_id, "Failed to send join response: {}", e);
                None
            }
        }
    }

    fn publish_report(&self) -> Option<String> {
        let report = self.state.take_report()?;
        let topic = self.topics.temperature_report(report.sensor_id.get());

        debug!(topic = %topic, temperature = %report.temperature, "Publishing temperature");

        match self.sink.publish(&topic, report.temperature.as_bytes()) {
            Ok(()) => Some(topic),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}
