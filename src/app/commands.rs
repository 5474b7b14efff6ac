//! Inbound remote commands.
//!
//! The command topic carries a JSON object with optional string fields
//! `mode` and `motor`, each holding the sentinel `"toggle"` to request the
//! corresponding action:
//!
//! ```json
//! {"mode": "toggle"}
//! {"motor": "toggle"}
//! {"mode": "toggle", "motor": "toggle"}
//! ```
//!
//! Anything else — unknown fields, wrong values, missing fields — is
//! ignored rather than rejected, so a newer publisher can extend the
//! payload without breaking deployed devices.  Only payloads that fail to
//! parse as JSON at all surface as a decode fault.

use serde::Deserialize;

/// The toggle sentinel accepted for both fields.
const TOGGLE: &str = "toggle";

/// Decoded remote command.  Both fields default to absent.
///
/// Fields are kept as raw JSON values: a field of the wrong type (say
/// `{"mode": 5}`) is an ignored field, not a decode fault for the whole
/// payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteCommand {
    #[serde(default)]
    mode: Option<serde_json::Value>,
    #[serde(default)]
    motor: Option<serde_json::Value>,
}

impl RemoteCommand {
    /// Decode a raw payload.  Malformed JSON is the caller's decode fault
    /// to log; it must never crash the loop or touch controller state.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// True when the payload requests a mode toggle.
    pub fn wants_mode_toggle(&self) -> bool {
        self.mode.as_ref().and_then(|v| v.as_str()) == Some(TOGGLE)
    }

    /// True when the payload requests a motor toggle.
    pub fn wants_motor_toggle(&self) -> bool {
        self.motor.as_ref().and_then(|v| v.as_str()) == Some(TOGGLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mode_toggle() {
        let cmd = RemoteCommand::decode(br#"{"mode":"toggle"}"#).unwrap();
        assert!(cmd.wants_mode_toggle());
        assert!(!cmd.wants_motor_toggle());
    }

    #[test]
    fn decodes_both_toggles() {
        let cmd = RemoteCommand::decode(br#"{"mode":"toggle","motor":"toggle"}"#).unwrap();
        assert!(cmd.wants_mode_toggle());
        assert!(cmd.wants_motor_toggle());
    }

    #[test]
    fn empty_object_is_a_noop() {
        let cmd = RemoteCommand::decode(b"{}").unwrap();
        assert!(!cmd.wants_mode_toggle());
        assert!(!cmd.wants_motor_toggle());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cmd = RemoteCommand::decode(br#"{"mode":"toggle","brightness":55}"#).unwrap();
        assert!(cmd.wants_mode_toggle());
    }

    #[test]
    fn wrong_sentinel_is_ignored() {
        let cmd = RemoteCommand::decode(br#"{"motor":"on"}"#).unwrap();
        assert!(!cmd.wants_motor_toggle());
    }

    #[test]
    fn wrong_field_type_is_ignored_not_fatal() {
        let cmd = RemoteCommand::decode(br#"{"mode":5,"motor":"toggle"}"#).unwrap();
        assert!(!cmd.wants_mode_toggle());
        assert!(cmd.wants_motor_toggle());
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        assert!(RemoteCommand::decode(b"not json").is_err());
        assert!(RemoteCommand::decode(b"").is_err());
    }
}
