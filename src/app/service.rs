//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns the mode/motor state, the press classifier,
//! the vent oscillator and the blink/publish cadences.  It exposes a
//! single [`tick`](ControlService::tick) that the main loop calls once
//! per iteration.  All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────────┐ ──▶ ActuatorPort
//!  PressLatch ──▶ │        ControlService        │ ──▶ DisplayPort
//! MessagePort ◀──▶│ press · mode · sweep · blink │
//!                 └─────────────────────────────┘
//! ```
//!
//! The tick is strictly sequential and never blocks: sensor read → press
//! classification → command ingestion → mode/automatic evaluation →
//! actuator/blink step → display refresh → telemetry publish.  The caller
//! sleeps between iterations according to the returned [`Pace`].

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::blink::BlinkScheduler;
use crate::control::press::{PressAction, PressClassifier, PressLatch};
use crate::control::state::{light_percent_from_raw, ControlState, Mode, SensorReading};
use crate::control::vent::VentOscillator;
use crate::drivers::servo::duty_for_angle;

use super::commands::RemoteCommand;
use super::events::TelemetryRecord;
use super::ports::{ActuatorPort, DisplayPort, MessagePort, SensorPort};

// ───────────────────────────────────────────────────────────────
// Pace
// ───────────────────────────────────────────────────────────────

/// Requested end-of-iteration delay class.
///
/// `Active` keeps the sweep smooth and the loop responsive to presses and
/// commands; `Idle` backs off to conserve power while nothing moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Active,
    Idle,
}

impl Pace {
    /// Concrete delay for this pace class.
    pub fn delay_ms(self, config: &SystemConfig) -> u32 {
        match self {
            Self::Active => config.active_delay_ms,
            Self::Idle => config.idle_delay_ms,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

/// The control service orchestrates all domain logic.
pub struct ControlService {
    config: SystemConfig,
    state: ControlState,
    classifier: PressClassifier,
    vent: VentOscillator,
    blink: BlinkScheduler,
    last_publish_ms: u32,
    tick_count: u64,
}

impl ControlService {
    /// Construct the service from configuration.  Boot state is manual
    /// mode, motor stopped, vent closed.
    pub fn new(config: SystemConfig) -> Self {
        let classifier = PressClassifier::new(config.long_press_ms);
        let vent = VentOscillator::new(config.vent_step_deg);
        let blink = BlinkScheduler::new(config.blink_interval_ms);
        Self {
            config,
            state: ControlState::new(),
            classifier,
            vent,
            blink,
            last_publish_ms: 0,
            tick_count: 0,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// * `now_ms` — injected monotonic time (wrapping u32 milliseconds).
    /// * `latch` — the ISR-written press latch, drained here only.
    /// * `hw` — satisfies **all three** hardware ports; a single generic
    ///   bound avoids a triple mutable borrow while keeping the port
    ///   boundary explicit.
    /// * `link` — pub/sub message port.
    pub fn tick(
        &mut self,
        now_ms: u32,
        latch: &PressLatch,
        hw: &mut (impl SensorPort + ActuatorPort + DisplayPort),
        link: &mut impl MessagePort,
    ) -> Pace {
        self.tick_count += 1;

        // 1. Sensor read — fresh every cycle, faults stay absent.
        let climate = hw.read_climate();
        let reading = SensorReading {
            temperature_c: climate.temperature_c,
            humidity_pct: climate.humidity_pct,
            light_percent: light_percent_from_raw(hw.read_light_raw()),
        };

        // 2. Press classification (release-time, drains the latch).
        if let Some(action) = self
            .classifier
            .classify(latch, now_ms, hw.button_pressed())
        {
            self.apply_press(action);
        }

        // 3. Command ingestion — at most one queued message, never blocks.
        if let Some(payload) = link.poll_command() {
            match RemoteCommand::decode(&payload) {
                Ok(cmd) => self.apply_remote(&cmd),
                Err(e) => warn!("remote command decode failed: {e}"),
            }
        }

        // 4. Automatic rule — temperature is the sole motor authority
        //    while automatic; an absent reading leaves the motor as-is.
        if self.state.mode == Mode::Automatic {
            if let Some(temp) = reading.temperature_c {
                self.state.motor_active = temp > self.config.auto_temp_threshold_c;
            }
        }

        // 5. Actuator + blink step.
        if self.state.motor_active {
            let angle = self.vent.advance();
            hw.set_vent_duty(duty_for_angle(angle));
            hw.set_indicator(self.blink.tick(now_ms));
        } else {
            // Servo holds its last position; indicator forced off.
            self.blink.force_off();
            hw.set_indicator(false);
        }

        // 6. Display refresh.
        hw.render(&self.display_lines(&reading));

        // 7. Telemetry publish on cadence.
        if now_ms.wrapping_sub(self.last_publish_ms) >= self.config.publish_interval_ms {
            self.publish(&reading, link);
            // Reset regardless of publish outcome — a persistently
            // failing channel must not turn into a retry storm.
            self.last_publish_ms = now_ms;
        }

        if self.state.motor_active {
            Pace::Active
        } else {
            Pace::Idle
        }
    }

    // ── Press handling ────────────────────────────────────────

    fn apply_press(&mut self, action: PressAction) {
        match action {
            PressAction::ToggleMotor => {
                self.state.motor_active = !self.state.motor_active;
                info!("button: short press -> motor {}", on_off(self.state.motor_active));
            }
            PressAction::ToggleMode => {
                self.state.mode = self.state.mode.toggled();
                info!("button: long press -> {:?} mode", self.state.mode);
            }
        }
    }

    // ── Remote command handling ───────────────────────────────

    /// Apply a decoded remote command, in payload order: mode first,
    /// then motor under the post-toggle mode guard.
    fn apply_remote(&mut self, cmd: &RemoteCommand) {
        if cmd.wants_mode_toggle() {
            self.state.mode = self.state.mode.toggled();
            info!("remote: mode toggle -> {:?}", self.state.mode);
        }
        if cmd.wants_motor_toggle() {
            // In automatic mode the temperature rule is the sole motor
            // authority; remote toggles are silently dropped so the two
            // never fight over the flag.
            if self.state.mode == Mode::Manual {
                self.state.motor_active = !self.state.motor_active;
                info!("remote: motor toggle -> {}", on_off(self.state.motor_active));
            } else {
                info!("remote: motor toggle ignored (automatic mode)");
            }
        }
    }

    // ── Display ───────────────────────────────────────────────

    /// Status screen contents: climate (or fault text), light, mode.
    fn display_lines(&self, reading: &SensorReading) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        match (reading.temperature_c, reading.humidity_pct) {
            (Some(temp), Some(hum)) => {
                lines.push(format!("Temp: {temp:.1}C"));
                lines.push(format!("Hum: {hum:.1}%"));
            }
            _ => lines.push("Error DHT22".to_string()),
        }
        lines.push(format!("Luz: {}%", reading.light_percent as i32));
        lines.push(self.state.mode.label().to_string());
        lines
    }

    // ── Telemetry ─────────────────────────────────────────────

    fn publish(&self, reading: &SensorReading, link: &mut impl MessagePort) {
        let record = TelemetryRecord::snapshot(reading, &self.state);
        match serde_json::to_vec(&record) {
            Ok(payload) => {
                if let Err(e) = link.publish_telemetry(&payload) {
                    warn!("telemetry publish failed: {e}");
                }
            }
            Err(e) => warn!("telemetry serialize failed: {e}"),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current operating mode.
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Whether the vent motor is currently commanded to sweep.
    pub fn motor_active(&self) -> bool {
        self.state.motor_active
    }

    /// Current vent position in degrees.
    pub fn vent_position_deg(&self) -> u8 {
        self.vent.position_deg()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

fn on_off(active: bool) -> &'static str {
    if active {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::state::ClimateReading;
    use crate::error::ChannelError;

    struct NullHw;

    impl SensorPort for NullHw {
        fn read_climate(&mut self) -> ClimateReading {
            ClimateReading {
                temperature_c: Some(22.0),
                humidity_pct: Some(50.0),
            }
        }
        fn read_light_raw(&mut self) -> u16 {
            2048
        }
        fn button_pressed(&self) -> bool {
            false
        }
    }

    impl ActuatorPort for NullHw {
        fn set_vent_duty(&mut self, _duty: u32) {}
        fn set_indicator(&mut self, _on: bool) {}
    }

    impl DisplayPort for NullHw {
        fn render(&mut self, _lines: &[String]) {}
    }

    struct NullLink;

    impl MessagePort for NullLink {
        fn poll_command(&mut self) -> Option<Vec<u8>> {
            None
        }
        fn publish_telemetry(&mut self, _payload: &[u8]) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    #[test]
    fn boots_manual_motor_off_idle_pace() {
        let mut svc = ControlService::new(SystemConfig::default());
        let latch = PressLatch::new();
        let pace = svc.tick(0, &latch, &mut NullHw, &mut NullLink);
        assert_eq!(svc.mode(), Mode::Manual);
        assert!(!svc.motor_active());
        assert_eq!(pace, Pace::Idle);
    }

    #[test]
    fn pace_follows_motor_state() {
        let mut svc = ControlService::new(SystemConfig::default());
        let latch = PressLatch::new();
        // 200 ms short press.
        latch.record(100);
        let pace = svc.tick(300, &latch, &mut NullHw, &mut NullLink);
        assert!(svc.motor_active());
        assert_eq!(pace, Pace::Active);
    }

    #[test]
    fn tick_count_increments() {
        let mut svc = ControlService::new(SystemConfig::default());
        let latch = PressLatch::new();
        for i in 0..5 {
            svc.tick(i * 100, &latch, &mut NullHw, &mut NullLink);
        }
        assert_eq!(svc.tick_count(), 5);
    }

    #[test]
    fn display_shows_fault_line_when_climate_absent() {
        let svc = ControlService::new(SystemConfig::default());
        let reading = SensorReading {
            temperature_c: None,
            humidity_pct: None,
            light_percent: 40.0,
        };
        let lines = svc.display_lines(&reading);
        assert_eq!(lines[0], "Error DHT22");
        assert_eq!(lines[1], "Luz: 40%");
        assert_eq!(lines[2], "Modo manual");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn display_shows_four_lines_when_healthy() {
        let svc = ControlService::new(SystemConfig::default());
        let reading = SensorReading {
            temperature_c: Some(24.46),
            humidity_pct: Some(61.02),
            light_percent: 73.9,
        };
        let lines = svc.display_lines(&reading);
        assert_eq!(
            lines,
            vec!["Temp: 24.5C", "Hum: 61.0%", "Luz: 73%", "Modo manual"]
        );
    }
}
