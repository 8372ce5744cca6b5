//! ENER002 socket commands: `/{root}/ENER002/{address}/{socket}`.

use tracing::{debug, trace};

use super::truncate;
use crate::command::{Action, Command, DeviceAddress, RouteError};
use crate::hex::{byte_dump, decode_fixed, is_hex};
use crate::openthings::{MAX_SOCKET_INDEX, OOK_ADDRESS_LENGTH};
use crate::radio::RadioDriver;

/// Number of segments in a socket command topic, counting the empty first one.
const SEGMENTS: usize = 5;

/// Hex digits in a full address field.
const ADDRESS_DIGITS: usize = OOK_ADDRESS_LENGTH * 2;

/// Decode a socket command from its topic segments and payload.
pub fn decode(topic: &str, segments: &[&str], payload: &[u8]) -> Result<Command, RouteError> {
    if segments.len() != SEGMENTS {
        return Err(RouteError::topic(
            topic,
            format!("expected {} levels, got {}", SEGMENTS, segments.len()),
        ));
    }

    let address_field = truncate(segments[3], ADDRESS_DIGITS);
    let socket_field = truncate(segments[4], 1);

    let action = parse_switch(topic, payload)?;
    let socket = parse_socket(socket_field)?;

    if !is_hex(address_field) {
        return Err(RouteError::address(
            address_field,
            "address must contain only hex digits",
        ));
    }
    let address = decode_fixed::<OOK_ADDRESS_LENGTH>(address_field)
        .ok_or_else(|| RouteError::address(address_field, "address could not be decoded"))?;

    trace!("address bytes\n{}", byte_dump(&address));

    Ok(Command {
        target: DeviceAddress::Socket { address, socket },
        action,
        payload: payload.to_vec(),
    })
}

/// Transmit a decoded socket command.
pub fn send(radio: &dyn RadioDriver, command: &Command) -> Result<(), RouteError> {
    let DeviceAddress::Socket { address, socket } = &command.target else {
        return Err(RouteError::unsupported(
            command.target.to_string(),
            "socket switch",
        ));
    };

    let on = match command.action {
        Action::On => true,
        Action::Off => false,
        Action::Identify => {
            return Err(RouteError::unsupported(command.target.to_string(), "Identify"));
        }
    };

    debug!(device = %command.target, on, "Switching socket");
    radio.send_ook_frame(address, *socket, on)?;
    Ok(())
}

fn parse_switch(topic: &str, payload: &[u8]) -> Result<Action, RouteError> {
    if payload.is_empty() {
        return Err(RouteError::payload(topic, "payload is empty"));
    }

    let text = std::str::from_utf8(payload)
        .map_err(|_| RouteError::payload(topic, "payload is not text"))?;

    if text.eq_ignore_ascii_case("on") {
        Ok(Action::On)
    } else if text.eq_ignore_ascii_case("off") {
        Ok(Action::Off)
    } else {
        Err(RouteError::payload(
            topic,
            format!("expected On or Off, got '{}'", text),
        ))
    }
}

fn parse_socket(field: &str) -> Result<u8, RouteError> {
    match field.bytes().next() {
        Some(digit @ b'0'..=b'9') if digit - b'0' <= MAX_SOCKET_INDEX => Ok(digit - b'0'),
        _ => Err(RouteError::address(
            field,
            format!("socket must be a digit 0-{}", MAX_SOCKET_INDEX),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use energenie_common::tokenize;

    fn decode_topic(topic: &str, payload: &str) -> Result<Command, RouteError> {
        decode(topic, &tokenize(topic), payload.as_bytes())
    }

    #[test]
    fn test_decode_short_address_is_left_padded() {
        let command = decode_topic("/energenie/ENER002/01A/2", "On").unwrap();

        let mut expected = [0u8; OOK_ADDRESS_LENGTH];
        expected[9] = 0x1a;
        assert_eq!(
            command.target,
            DeviceAddress::Socket {
                address: expected,
                socket: 2
            }
        );
        assert_eq!(command.action, Action::On);
        assert_eq!(command.payload, b"On");
    }

    #[test]
    fn test_payload_is_case_insensitive() {
        assert_eq!(
            decode_topic("/energenie/ENER002/1/0", "oFF").unwrap().action,
            Action::Off
        );
        assert_eq!(
            decode_topic("/energenie/ENER002/1/0", "ON").unwrap().action,
            Action::On
        );
    }

    #[test]
    fn test_invalid_payloads() {
        for payload in ["", "toggle", "onn", " on"] {
            assert!(
                matches!(
                    decode_topic("/energenie/ENER002/1/1", payload),
                    Err(RouteError::InvalidPayload { .. })
                ),
                "payload {:?} should be rejected",
                payload
            );
        }
        assert!(matches!(
            decode("/energenie/ENER002/1/1", &tokenize("/energenie/ENER002/1/1"), &[0xff, 0xfe]),
            Err(RouteError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_socket_range() {
        for socket in ["0", "4"] {
            assert!(decode_topic(&format!("/energenie/ENER002/1/{}", socket), "on").is_ok());
        }
        for socket in ["5", "9", "x", ""] {
            assert!(
                matches!(
                    decode_topic(&format!("/energenie/ENER002/1/{}", socket), "on"),
                    Err(RouteError::InvalidAddress { .. })
                ),
                "socket {:?} should be rejected",
                socket
            );
        }
    }

    #[test]
    fn test_socket_field_truncated_to_one_digit() {
        let command = decode_topic("/energenie/ENER002/1/37", "on").unwrap();
        assert!(matches!(
            command.target,
            DeviceAddress::Socket { socket: 3, .. }
        ));
    }

    #[test]
    fn test_non_hex_address_rejected() {
        for address in ["01G", "0x1A", "zz"] {
            assert!(
                matches!(
                    decode_topic(&format!("/energenie/ENER002/{}/1", address), "on"),
                    Err(RouteError::InvalidAddress { .. })
                ),
                "address {:?} should be rejected",
                address
            );
        }
    }

    #[test]
    fn test_empty_address_is_all_zero() {
        let command = decode_topic("/energenie/ENER002//2", "On").unwrap();
        assert_eq!(
            command.target,
            DeviceAddress::Socket {
                address: [0u8; OOK_ADDRESS_LENGTH],
                socket: 2
            }
        );
    }

    #[test]
    fn test_address_truncated_to_field_width() {
        let full = "0123456789ABCDEF0123";
        let command = decode_topic(&format!("/energenie/ENER002/{}FF/1", full), "on").unwrap();
        let DeviceAddress::Socket { address, .. } = command.target else {
            panic!("expected socket address");
        };
        assert_eq!(address[0], 0x01);
        assert_eq!(address[9], 0x23);
    }

    #[test]
    fn test_wrong_segment_count() {
        for topic in ["/energenie/ENER002/1", "/energenie/ENER002/1/1/extra"] {
            assert!(matches!(
                decode_topic(topic, "on"),
                Err(RouteError::InvalidTopic { .. })
            ));
        }
    }
}
