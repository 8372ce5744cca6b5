//! Known valve sensors.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use tracing::info;

use crate::openthings::SensorId;

/// Ordered set of every sensor id heard on the radio.
#[derive(Debug, Default)]
pub struct SensorRegistry {
    sensors: Mutex<BTreeSet<SensorId>>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sensor. Returns true the first time it is seen.
    pub fn record(&self, sensor_id: SensorId) -> bool {
        let added = self.sensors.lock().insert(sensor_id);
        if added {
            info!(sensor_id = %sensor_id, "New sensor");
        }
        added
    }

    pub fn contains(&self, sensor_id: SensorId) -> bool {
        self.sensors.lock().contains(&sensor_id)
    }

    pub fn len(&self) -> usize {
        self.sensors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.lock().is_empty()
    }

    /// Known sensors in ascending order.
    pub fn sensors(&self) -> Vec<SensorId> {
        self.sensors.lock().iter().copied().collect()
    }
}
