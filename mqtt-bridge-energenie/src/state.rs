//! Cross-path protocol state.
//!
//! The receive path records what it heard; the bridge loop resolves it on its
//! next iteration. Both slots hold at most one value and a newer observation
//! replaces an older one.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::openthings::{DeviceIdentity, SensorId};

/// A join request waiting for its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingJoin {
    pub manufacturer_id: u8,
    pub product_id: u8,
    pub sensor_id: SensorId,
    pub observed_at: Instant,
}

/// A temperature report waiting to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTemperatureReport {
    pub sensor_id: SensorId,
    pub temperature: String,
}

/// Outcome of one join resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinResolution {
    /// No join is pending.
    Idle,
    /// The pending join matched; respond to it. The slot is now empty.
    Respond(PendingJoin),
    /// The pending join is from another device family and stays pending.
    Mismatch(PendingJoin),
    /// The pending join waited longer than the timeout and was dropped.
    Expired(PendingJoin),
}

/// Join handshake and temperature hand-off slots shared by both paths.
#[derive(Debug)]
pub struct ProtocolStateTracker {
    identity: DeviceIdentity,
    join_timeout: Option<Duration>,
    join: Mutex<Option<PendingJoin>>,
    report: Mutex<Option<PendingTemperatureReport>>,
}

impl ProtocolStateTracker {
    /// Create an idle tracker answering joins for `identity`.
    ///
    /// With a `join_timeout`, a join nobody answered is dropped once it is
    /// older than the timeout; without one it stays until answered.
    pub fn new(identity: DeviceIdentity, join_timeout: Option<Duration>) -> Self {
        Self {
            identity,
            join_timeout,
            join: Mutex::new(None),
            report: Mutex::new(None),
        }
    }

    /// The identity joins are matched against.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Record a join request. Returns the join it replaced, if any.
    pub fn observe_join(
        &self,
        manufacturer_id: u8,
        product_id: u8,
        sensor_id: SensorId,
    ) -> Option<PendingJoin> {
        self.join.lock().replace(PendingJoin {
            manufacturer_id,
            product_id,
            sensor_id,
            observed_at: Instant::now(),
        })
    }

    /// Record a temperature report. Returns the report it replaced, if any.
    pub fn observe_temperature(
        &self,
        sensor_id: SensorId,
        temperature: impl Into<String>,
    ) -> Option<PendingTemperatureReport> {
        self.report.lock().replace(PendingTemperatureReport {
            sensor_id,
            temperature: temperature.into(),
        })
    }

    /// Try to resolve the pending join as of now.
    pub fn resolve_join(&self) -> JoinResolution {
        self.resolve_join_at(Instant::now())
    }

    /// Try to resolve the pending join as of `now`.
    pub fn resolve_join_at(&self, now: Instant) -> JoinResolution {
        let mut slot = self.join.lock();
        let Some(join) = *slot else {
            return JoinResolution::Idle;
        };

        if self.identity.matches(join.manufacturer_id, join.product_id) {
            *slot = None;
            return JoinResolution::Respond(join);
        }

        match self.join_timeout {
            Some(timeout) if now.saturating_duration_since(join.observed_at) >= timeout => {
                *slot = None;
                JoinResolution::Expired(join)
            }
            _ => JoinResolution::Mismatch(join),
        }
    }

    /// Take the pending report, leaving the slot empty.
    pub fn take_report(&self) -> Option<PendingTemperatureReport> {
        self.report.lock().take()
    }

    /// The pending join, if any.
    pub fn join_state(&self) -> Option<PendingJoin> {
        *self.join.lock()
    }

    /// True while a report waits to be published.
    pub fn report_pending(&self) -> bool {
        self.report.lock().is_some()
    }
}
