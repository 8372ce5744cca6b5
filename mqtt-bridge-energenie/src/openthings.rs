//! Energenie radio protocol constants and identifiers.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Energenie manufacturer id.
pub const ENERGENIE_MANUFACTURER_ID: u8 = 0x04;

/// Product id of the eTRV radiator valve.
pub const ETRV_PRODUCT_ID: u8 = 0x03;

/// Encryption id used by eTRV frames.
pub const ETRV_ENCRYPTION_ID: u8 = 0xf2;

/// Identify request parameter.
pub const PARAM_IDENTIFY: u8 = 0xbf;

/// Join response parameter.
pub const PARAM_JOIN_RESP: u8 = 0xea;

/// Length in bytes of an ENER002 OOK address.
pub const OOK_ADDRESS_LENGTH: usize = 10;

/// Highest socket index on an ENER002 address; 0 addresses every socket.
pub const MAX_SOCKET_INDEX: u8 = 4;

/// Largest sensor id; the frame header carries it in three bytes.
pub const MAX_SENSOR_ID: u32 = 0xff_ffff;

/// Maximum digits in a sensor id field.
pub const MAX_SENSOR_ID_DIGITS: usize = 8;

/// Identifier of a single valve-class device. Zero is never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(NonZeroU32);

impl SensorId {
    /// Wrap a raw id, rejecting zero.
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// The raw id.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Manufacturer, product and encryption ids identifying a device family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub manufacturer_id: u8,
    pub product_id: u8,
    pub encryption_id: u8,
}

impl DeviceIdentity {
    /// The eTRV radiator valve family this bridge speaks for.
    pub const ETRV: Self = Self {
        manufacturer_id: ENERGENIE_MANUFACTURER_ID,
        product_id: ETRV_PRODUCT_ID,
        encryption_id: ETRV_ENCRYPTION_ID,
    };

    /// True if a frame from `manufacturer_id`/`product_id` belongs to this family.
    pub fn matches(&self, manufacturer_id: u8, product_id: u8) -> bool {
        self.manufacturer_id == manufacturer_id && self.product_id == product_id
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self::ETRV
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_id_rejects_zero() {
        assert!(SensorId::new(0).is_none());
        assert_eq!(SensorId::new(42).map(SensorId::get), Some(42));
        assert_eq!(SensorId::new(7).unwrap().to_string(), "7");
    }

    #[test]
    fn test_sensor_id_serde() {
        let id: SensorId = serde_json::from_str("1234").unwrap();
        assert_eq!(id.get(), 1234);
        assert!(serde_json::from_str::<SensorId>("0").is_err());
    }

    #[test]
    fn test_identity_matches() {
        let identity = DeviceIdentity::ETRV;
        assert!(identity.matches(0x04, 0x03));
        assert!(!identity.matches(0x04, 0x02));
        assert!(!identity.matches(0x05, 0x03));
    }
}
