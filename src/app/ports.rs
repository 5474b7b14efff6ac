//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, display, pub/sub link) implement
//! these traits.  The [`ControlService`](super::service::ControlService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! Every method here is required to be non-blocking: the control loop's
//! responsiveness to button presses and sweep steps depends on each port
//! call returning promptly.  A blocking implementation is a defect.

use crate::control::state::ClimateReading;
use crate::error::ChannelError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Read the climate sensor.  Absent fields signal a fault for this
    /// cycle only — implementations must not cache prior good values.
    fn read_climate(&mut self) -> ClimateReading;

    /// Raw light ADC value, 0..=4095.  The domain maps it to a percentage.
    fn read_light_raw(&mut self) -> u16;

    /// Current physical button level (`true` = held down).
    fn button_pressed(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Command the vent servo with a pre-computed PWM duty value.
    fn set_vent_duty(&mut self, duty: u32);

    /// Drive the indicator LED.
    fn set_indicator(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → status screen)
// ───────────────────────────────────────────────────────────────

/// The domain pushes up to four status lines per cycle; the adapter owns
/// layout, fonts and flushing.
pub trait DisplayPort {
    fn render(&mut self, lines: &[String]);
}

// ───────────────────────────────────────────────────────────────
// Message port (driven adapter: domain ↔ pub/sub link)
// ───────────────────────────────────────────────────────────────

/// Inbound command + outbound telemetry over the pub/sub link.
pub trait MessagePort {
    /// Take the next pending inbound command payload, if any.
    /// Must never block waiting for a message.
    fn poll_command(&mut self) -> Option<Vec<u8>>;

    /// Publish a serialized telemetry record.  Failure is non-fatal:
    /// the caller logs and moves on, the next cadence retries.
    fn publish_telemetry(&mut self, payload: &[u8]) -> Result<(), ChannelError>;
}
