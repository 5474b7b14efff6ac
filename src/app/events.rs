//! Outbound telemetry records.
//!
//! The [`ControlService`](super::service::ControlService) snapshots one
//! of these per publish cadence and serializes it onto the telemetry
//! topic.  The same struct is decoded on the other side by the
//! `telemetry-relay` binary, so the wire keys live in exactly one place.

use serde::{Deserialize, Serialize};

use crate::control::state::{ControlState, Mode, SensorReading};

/// A point-in-time snapshot of sensor + control state.
///
/// Wire shape (fixed, consumed by deployed dashboards):
/// `{"temp": 24.5, "hum": 61.0, "luz": 73, "modo": "manual", "motor": false}`
/// with `temp`/`hum` null on a climate-sensor fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub temp: Option<f32>,
    pub hum: Option<f32>,
    pub luz: i32,
    pub modo: Mode,
    pub motor: bool,
}

impl TelemetryRecord {
    /// Snapshot the current reading + state.  Taken atomically at publish
    /// time — both inputs are owned by the loop, so no tearing is possible.
    pub fn snapshot(reading: &SensorReading, state: &ControlState) -> Self {
        Self {
            temp: reading.temperature_c,
            hum: reading.humidity_pct,
            luz: reading.light_percent as i32,
            modo: state.mode,
            motor: state.motor_active,
        }
    }
}
