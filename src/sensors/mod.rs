//! Sensor drivers.
//!
//! Each driver is dual-target: real peripheral access under
//! `#[cfg(target_os = "espidf")]`, injectable simulation statics on the
//! host so the hardware adapter and the control loop can be exercised in
//! tests without a board.

pub mod dht22;
pub mod light;
