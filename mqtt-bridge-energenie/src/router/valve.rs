//! eTRV valve commands: `/{root}/eTRV/Command/{action}/{sensor_id}`.

use tracing::info;

use super::truncate;
use crate::command::{Action, Command, DeviceAddress, RouteError};
use crate::openthings::{
    DeviceIdentity, MAX_SENSOR_ID, MAX_SENSOR_ID_DIGITS, PARAM_IDENTIFY, SensorId,
};
use crate::radio::RadioDriver;
use energenie_common::topic::{COMMAND, ETRV, IDENTIFY};

/// Minimum segments in a valve command topic, counting the empty first one.
const MIN_SEGMENTS: usize = 5;

/// Decode a valve command from its topic segments and payload.
///
/// The payload is carried along but never inspected.
pub fn decode(topic: &str, segments: &[&str], payload: &[u8]) -> Result<Command, RouteError> {
    if segments.len() < MIN_SEGMENTS {
        return Err(RouteError::topic(
            topic,
            format!("expected at least {} levels, got {}", MIN_SEGMENTS, segments.len()),
        ));
    }
    if segments[3] != COMMAND {
        return Err(RouteError::topic(
            topic,
            format!("expected '{}' after '{}'", COMMAND, ETRV),
        ));
    }

    match segments[4] {
        IDENTIFY => {
            let Some(field) = segments.get(5) else {
                return Err(RouteError::topic(topic, "missing sensor id"));
            };
            let sensor_id = parse_sensor_id(field)?;

            Ok(Command {
                target: DeviceAddress::Valve(sensor_id),
                action: Action::Identify,
                payload: payload.to_vec(),
            })
        }
        other => Err(RouteError::unsupported(ETRV, other)),
    }
}

/// Transmit a decoded valve command.
pub fn send(
    radio: &dyn RadioDriver,
    identity: &DeviceIdentity,
    command: &Command,
) -> Result<(), RouteError> {
    let DeviceAddress::Valve(sensor_id) = command.target else {
        return Err(RouteError::unsupported(command.target.to_string(), "valve"));
    };

    match command.action {
        Action::Identify => {
            info!("Sending Identify to {}", sensor_id);
            let frame = radio.build_fsk_frame(
                identity.manufacturer_id,
                identity.encryption_id,
                identity.product_id,
                sensor_id.get(),
                &[PARAM_IDENTIFY, 0x00],
            );
            radio.send_fsk_frame(&frame)?;
            Ok(())
        }
        Action::On | Action::Off => Err(RouteError::unsupported(ETRV, "switch")),
    }
}

/// Parse a sensor id field with leading-integer semantics.
///
/// The field is cut to [`MAX_SENSOR_ID_DIGITS`] characters. Leading
/// whitespace and a sign are accepted and parsing stops at the first
/// non-digit, so text without leading digits reads as zero. Zero and
/// negative ids are rejected, as are ids above [`MAX_SENSOR_ID`].
pub fn parse_sensor_id(field: &str) -> Result<SensorId, RouteError> {
    let text = truncate(field, MAX_SENSOR_ID_DIGITS);
    let trimmed = text.trim_start();

    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));

    if (negative && value != 0) || value > MAX_SENSOR_ID {
        return Err(RouteError::InvalidSensorId(field.to_string()));
    }

    SensorId::new(value).ok_or_else(|| RouteError::InvalidSensorId(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use energenie_common::tokenize;

    fn decode_topic(topic: &str) -> Result<Command, RouteError> {
        decode(topic, &tokenize(topic), b"")
    }

    #[test]
    fn test_identify_decodes_sensor_id() {
        let command = decode_topic("/energenie/eTRV/Command/Identify/42").unwrap();
        assert_eq!(command.target, DeviceAddress::Valve(SensorId::new(42).unwrap()));
        assert_eq!(command.action, Action::Identify);
    }

    #[test]
    fn test_invalid_sensor_ids() {
        for id in ["0", "abc", "", "-5", "00000000"] {
            assert!(
                matches!(
                    decode_topic(&format!("/energenie/eTRV/Command/Identify/{}", id)),
                    Err(RouteError::InvalidSensorId(_))
                ),
                "sensor id {:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_sensor_id_leading_integer() {
        assert_eq!(parse_sensor_id("12abc").unwrap().get(), 12);
        assert_eq!(parse_sensor_id(" +7").unwrap().get(), 7);
        // Cut to eight characters before parsing.
        assert_eq!(parse_sensor_id("1234567899").unwrap().get(), 12345678);
    }

    #[test]
    fn test_sensor_id_upper_bound() {
        assert_eq!(parse_sensor_id("16777215").unwrap().get(), MAX_SENSOR_ID);
        for id in ["16777216", "99999999"] {
            assert!(
                matches!(parse_sensor_id(id), Err(RouteError::InvalidSensorId(_))),
                "sensor id {:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_missing_sensor_id_segment() {
        assert!(matches!(
            decode_topic("/energenie/eTRV/Command/Identify"),
            Err(RouteError::InvalidTopic { .. })
        ));
    }

    #[test]
    fn test_requires_command_namespace() {
        assert!(matches!(
            decode_topic("/energenie/eTRV/Report/Identify/42"),
            Err(RouteError::InvalidTopic { .. })
        ));
        assert!(matches!(
            decode_topic("/energenie/eTRV/Command"),
            Err(RouteError::InvalidTopic { .. })
        ));
    }

    #[test]
    fn test_other_actions_unsupported() {
        let err = decode_topic("/energenie/eTRV/Command/Temperature/42").unwrap_err();
        assert!(err.is_unsupported());
    }
}
