//! Control-loop state and per-cycle sensor value types.
//!
//! `SensorReading` is recreated every iteration — absent climate fields
//! mean the sensor faulted this cycle, and stale values are never carried
//! forward.  `ControlState` lives for the process lifetime.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operating mode
// ---------------------------------------------------------------------------

/// Manual/automatic operating mode.
///
/// Wire labels are the deployed Spanish ones — the telemetry consumers
/// and dashboards key on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "automatico")]
    Automatic,
}

impl Mode {
    /// The opposite mode.  Transitions carry no guard conditions.
    pub fn toggled(self) -> Self {
        match self {
            Self::Manual => Self::Automatic,
            Self::Automatic => Self::Manual,
        }
    }

    /// Display label for the status screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::Manual => "Modo manual",
            Self::Automatic => "Modo automatico",
        }
    }

    /// Wire name, identical to the serde rename.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatico",
        }
    }
}

// ---------------------------------------------------------------------------
// Per-cycle sensor values
// ---------------------------------------------------------------------------

/// Raw climate read: both fields absent signals a sensor fault this cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClimateReading {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
}

/// Unified per-iteration sensor snapshot consumed by the control loop.
#[derive(Debug, Clone, Copy)]
pub struct SensorReading {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    /// Derived brightness percentage, 0 (dark) – 100 (bright).
    pub light_percent: f32,
}

/// Full-scale value of the 12-bit light ADC.
pub const LIGHT_ADC_MAX: u16 = 4095;

/// Map a raw LDR ADC value to a brightness percentage.
///
/// The divider is wired so more light pulls the ADC value down, hence
/// the inversion.
pub fn light_percent_from_raw(raw: u16) -> f32 {
    let raw = raw.min(LIGHT_ADC_MAX);
    100.0 - (f32::from(raw) / f32::from(LIGHT_ADC_MAX)) * 100.0
}

// ---------------------------------------------------------------------------
// Persistent loop state
// ---------------------------------------------------------------------------

/// The mode/motor flags owned by the control loop.
///
/// Single-writer-per-field discipline: each field is written from exactly
/// one of press classification, remote command handling, or the automatic
/// rule within a given iteration — never from two sources in one tick.
#[derive(Debug, Clone, Copy)]
pub struct ControlState {
    pub mode: Mode,
    pub motor_active: bool,
}

impl ControlState {
    /// Boot state: manual mode, motor stopped.
    pub fn new() -> Self {
        Self {
            mode: Mode::Manual,
            motor_active: false,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}
