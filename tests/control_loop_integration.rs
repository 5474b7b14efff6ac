//! Integration tests: ControlService → ports, driven by a virtual clock.
//!
//! The mock hardware records every actuator/display call so tests can
//! assert on the full command history without touching real GPIO/PWM
//! registers; the mock link scripts inbound commands and captures
//! outbound telemetry.

use greenhouse::app::events::TelemetryRecord;
use greenhouse::app::ports::{ActuatorPort, DisplayPort, MessagePort, SensorPort};
use greenhouse::app::service::{ControlService, Pace};
use greenhouse::config::SystemConfig;
use greenhouse::control::press::PressLatch;
use greenhouse::control::state::{ClimateReading, Mode};
use greenhouse::drivers::servo::{duty_for_angle, SERVO_MAX_DUTY};
use greenhouse::error::ChannelError;

use std::collections::VecDeque;

// ── Mock hardware ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum HwCall {
    VentDuty(u32),
    Indicator(bool),
}

struct MockHw {
    climate: ClimateReading,
    light_raw: u16,
    button_down: bool,
    calls: Vec<HwCall>,
    frames: Vec<Vec<String>>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            climate: ClimateReading {
                temperature_c: Some(22.0),
                humidity_pct: Some(55.0),
            },
            light_raw: 2048,
            button_down: false,
            calls: Vec::new(),
            frames: Vec::new(),
        }
    }

    fn last_indicator(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::Indicator(on) => Some(*on),
            HwCall::VentDuty(_) => None,
        })
    }

    fn vent_duties(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::VentDuty(d) => Some(*d),
                HwCall::Indicator(_) => None,
            })
            .collect()
    }

    fn indicator_states(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Indicator(on) => Some(*on),
                HwCall::VentDuty(_) => None,
            })
            .collect()
    }
}

impl SensorPort for MockHw {
    fn read_climate(&mut self) -> ClimateReading {
        self.climate
    }
    fn read_light_raw(&mut self) -> u16 {
        self.light_raw
    }
    fn button_pressed(&self) -> bool {
        self.button_down
    }
}

impl ActuatorPort for MockHw {
    fn set_vent_duty(&mut self, duty: u32) {
        self.calls.push(HwCall::VentDuty(duty));
    }
    fn set_indicator(&mut self, on: bool) {
        self.calls.push(HwCall::Indicator(on));
    }
}

impl DisplayPort for MockHw {
    fn render(&mut self, lines: &[String]) {
        self.frames.push(lines.to_vec());
    }
}

// ── Mock message link ─────────────────────────────────────────

struct MockLink {
    inbound: VecDeque<Vec<u8>>,
    published: Vec<Vec<u8>>,
    fail_publishes: bool,
    publish_attempts: usize,
}

impl MockLink {
    fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            published: Vec::new(),
            fail_publishes: false,
            publish_attempts: 0,
        }
    }

    fn inject(&mut self, payload: &[u8]) {
        self.inbound.push_back(payload.to_vec());
    }

    fn records(&self) -> Vec<TelemetryRecord> {
        self.published
            .iter()
            .map(|p| serde_json::from_slice(p).expect("published payload must decode"))
            .collect()
    }
}

impl MessagePort for MockLink {
    fn poll_command(&mut self) -> Option<Vec<u8>> {
        self.inbound.pop_front()
    }
    fn publish_telemetry(&mut self, payload: &[u8]) -> Result<(), ChannelError> {
        self.publish_attempts += 1;
        if self.fail_publishes {
            return Err(ChannelError::PublishFailed);
        }
        self.published.push(payload.to_vec());
        Ok(())
    }
}

// ── Harness ───────────────────────────────────────────────────

struct Rig {
    service: ControlService,
    latch: PressLatch,
    hw: MockHw,
    link: MockLink,
    now_ms: u32,
}

impl Rig {
    fn new() -> Self {
        Self {
            service: ControlService::new(SystemConfig::default()),
            latch: PressLatch::new(),
            hw: MockHw::new(),
            link: MockLink::new(),
            now_ms: 0,
        }
    }

    /// Run one tick at the current virtual time, then advance it.
    fn step(&mut self, advance_ms: u32) -> Pace {
        let pace = self
            .service
            .tick(self.now_ms, &self.latch, &mut self.hw, &mut self.link);
        self.now_ms = self.now_ms.wrapping_add(advance_ms);
        pace
    }

    /// Simulate a full press/release gesture of `held_ms`, classified on
    /// the next tick.
    fn press_for(&mut self, held_ms: u32) {
        self.latch.record(self.now_ms);
        self.hw.button_down = true;
        self.now_ms = self.now_ms.wrapping_add(held_ms);
        self.hw.button_down = false;
    }
}

// ── Press gestures ────────────────────────────────────────────

#[test]
fn short_press_starts_motor_long_press_flips_mode() {
    let mut rig = Rig::new();
    assert_eq!(rig.service.mode(), Mode::Manual);
    assert!(!rig.service.motor_active());

    rig.press_for(500);
    rig.step(5);
    assert!(rig.service.motor_active(), "short press starts the motor");
    assert_eq!(rig.service.mode(), Mode::Manual, "mode untouched");

    // Blind the automatic rule so the press action itself is observable
    // after the mode flips within the same tick.
    rig.hw.climate.temperature_c = None;
    rig.press_for(3000);
    rig.step(5);
    assert_eq!(rig.service.mode(), Mode::Automatic, "long press flips mode");
    assert!(
        rig.service.motor_active(),
        "long press leaves the motor flag alone"
    );
}

#[test]
fn held_button_defers_classification_until_release() {
    let mut rig = Rig::new();
    rig.latch.record(0);
    rig.hw.button_down = true;

    rig.now_ms = 500;
    rig.step(5);
    assert!(!rig.service.motor_active(), "no action while held");

    rig.hw.button_down = false;
    rig.step(5);
    assert!(rig.service.motor_active(), "classified on release");
}

#[test]
fn stuck_press_never_acts() {
    let mut rig = Rig::new();
    rig.latch.record(0);
    rig.hw.button_down = true;
    for _ in 0..1000 {
        rig.step(100);
    }
    assert!(!rig.service.motor_active());
    assert_eq!(rig.service.mode(), Mode::Manual);
    assert!(!rig.latch.is_armed(), "latch stays occupied forever");
}

// ── Remote commands ───────────────────────────────────────────

#[test]
fn remote_motor_toggle_works_in_manual() {
    let mut rig = Rig::new();
    rig.link.inject(br#"{"motor":"toggle"}"#);
    rig.step(5);
    assert!(rig.service.motor_active());
}

#[test]
fn remote_motor_toggle_ignored_in_automatic() {
    let mut rig = Rig::new();
    rig.hw.climate.temperature_c = Some(35.0);
    rig.link.inject(br#"{"mode":"toggle"}"#);
    rig.step(5);
    assert_eq!(rig.service.mode(), Mode::Automatic);
    assert!(rig.service.motor_active(), "rule started the motor at 35.0");

    // Freeze the rule with a sensor fault so the guard itself is what
    // keeps the flag — a leaked toggle would flip it off.
    rig.hw.climate = ClimateReading::default();
    rig.link.inject(br#"{"motor":"toggle"}"#);
    rig.step(5);
    assert!(
        rig.service.motor_active(),
        "remote motor toggles must be dropped while automatic"
    );
}

#[test]
fn malformed_command_is_a_logged_noop() {
    let mut rig = Rig::new();
    rig.link.inject(b"not json at all {{{");
    rig.step(5);
    assert_eq!(rig.service.mode(), Mode::Manual);
    assert!(!rig.service.motor_active());

    // The loop keeps running and processing afterwards.
    rig.link.inject(br#"{"motor":"toggle"}"#);
    rig.step(5);
    assert!(rig.service.motor_active());
}

#[test]
fn one_command_consumed_per_iteration() {
    let mut rig = Rig::new();
    rig.link.inject(br#"{"motor":"toggle"}"#);
    rig.link.inject(br#"{"motor":"toggle"}"#);
    rig.step(5);
    assert!(rig.service.motor_active(), "first command applied");
    rig.step(5);
    assert!(!rig.service.motor_active(), "second applied next iteration");
}

// ── Automatic rule ────────────────────────────────────────────

#[test]
fn automatic_rule_follows_temperature_threshold() {
    let mut rig = Rig::new();
    rig.link.inject(br#"{"mode":"toggle"}"#);

    rig.hw.climate.temperature_c = Some(31.0);
    rig.step(5);
    assert!(rig.service.motor_active(), "31.0 > 30.0 starts the motor");

    rig.hw.climate.temperature_c = Some(29.0);
    rig.step(5);
    assert!(!rig.service.motor_active(), "29.0 stops it");

    rig.hw.climate.temperature_c = Some(30.0);
    rig.step(5);
    assert!(!rig.service.motor_active(), "threshold is strict");
}

#[test]
fn sensor_fault_freezes_motor_state_in_automatic() {
    let mut rig = Rig::new();
    rig.link.inject(br#"{"mode":"toggle"}"#);
    rig.hw.climate.temperature_c = Some(35.0);
    rig.step(5);
    assert!(rig.service.motor_active());

    // Fault: both fields absent.  The motor must keep its last state.
    rig.hw.climate = ClimateReading::default();
    for _ in 0..10 {
        rig.step(5);
    }
    assert!(rig.service.motor_active(), "fault must not stop the motor");
}

#[test]
fn manual_mode_ignores_temperature() {
    let mut rig = Rig::new();
    rig.hw.climate.temperature_c = Some(40.0);
    for _ in 0..5 {
        rig.step(100);
    }
    assert!(!rig.service.motor_active());
}

// ── Sweep + blink + display ───────────────────────────────────

#[test]
fn end_to_end_sweep_reverses_at_bounds_and_blinks() {
    let mut rig = Rig::new();

    // 500 ms short press → motor on.
    rig.press_for(500);

    // 180 active iterations at 5 ms: 90 steps up to 180°, 90 back to 0°.
    let mut duties = Vec::new();
    let mut reached_top_at = None;
    for i in 0..180 {
        let pace = rig.step(5);
        assert_eq!(pace, Pace::Active);
        let d = *rig.hw.vent_duties().last().unwrap();
        duties.push(d);
        if d == SERVO_MAX_DUTY && reached_top_at.is_none() {
            reached_top_at = Some(i);
        }
    }

    assert_eq!(reached_top_at, Some(89), "exactly 90 steps to the top");
    assert_eq!(*duties.last().unwrap(), duty_for_angle(0), "back at 0°");
    assert_eq!(rig.service.vent_position_deg(), 0);
    assert!(
        duties.iter().all(|&d| d <= SERVO_MAX_DUTY),
        "duty never exceeds the top calibration point"
    );

    // Blink: 180 iterations * 5 ms = 900 ms → one toggle (at 500 ms).
    let toggles = rig
        .hw
        .indicator_states()
        .windows(2)
        .filter(|w| w[0] != w[1])
        .count();
    assert_eq!(toggles, 1, "exactly one indicator toggle in 900 ms");
}

#[test]
fn indicator_forced_off_within_one_iteration_of_motor_stop() {
    let mut rig = Rig::new();
    rig.press_for(100);
    // Run past a blink interval so the indicator is on.
    for _ in 0..110 {
        rig.step(5);
    }
    assert_eq!(rig.hw.last_indicator(), Some(true));

    // Short press again → motor off; indicator off the same iteration.
    rig.press_for(100);
    let pace = rig.step(5);
    assert_eq!(pace, Pace::Idle);
    assert_eq!(rig.hw.last_indicator(), Some(false));
}

#[test]
fn idle_motor_commands_no_vent_motion() {
    let mut rig = Rig::new();
    for _ in 0..50 {
        rig.step(100);
    }
    assert!(rig.hw.vent_duties().is_empty(), "servo holds, no commands");
}

#[test]
fn display_refreshes_every_cycle_with_fault_text() {
    let mut rig = Rig::new();
    rig.step(100);
    rig.hw.climate = ClimateReading::default();
    rig.step(100);

    assert_eq!(rig.hw.frames.len(), 2);
    assert_eq!(rig.hw.frames[0][0], "Temp: 22.0C");
    assert_eq!(rig.hw.frames[1][0], "Error DHT22");
    assert!(rig.hw.frames[1].last().unwrap().contains("manual"));
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_cadence_matches_elapsed_time() {
    let mut rig = Rig::new();
    // 100 ms idle ticks for 20 s of virtual time.
    for _ in 0..200 {
        rig.step(100);
    }
    let published = rig.link.published.len();
    // floor(20_000 / 2000) = 10, ±1 for boundary rounding.
    assert!(
        (9..=11).contains(&published),
        "expected ~10 records, got {published}"
    );
}

#[test]
fn telemetry_cadence_is_independent_of_motor_state() {
    let mut rig = Rig::new();
    rig.press_for(200);
    // Active ticks at 5 ms for 10 s of virtual time.
    for _ in 0..2000 {
        rig.step(5);
    }
    let published = rig.link.published.len();
    assert!(
        (4..=6).contains(&published),
        "expected ~5 records over 10 s, got {published}"
    );
}

#[test]
fn telemetry_snapshot_carries_state_and_nulls() {
    let mut rig = Rig::new();
    rig.hw.climate = ClimateReading::default();
    rig.hw.light_raw = 0; // full brightness after inversion
    for _ in 0..30 {
        rig.step(100);
    }

    let records = rig.link.records();
    assert!(!records.is_empty());
    let r = &records[0];
    assert_eq!(r.temp, None);
    assert_eq!(r.hum, None);
    assert_eq!(r.luz, 100);
    assert_eq!(r.modo, Mode::Manual);
    assert!(!r.motor);
}

#[test]
fn publish_failure_does_not_retry_until_next_cadence() {
    let mut rig = Rig::new();
    rig.link.fail_publishes = true;
    for _ in 0..200 {
        rig.step(100);
    }
    let attempts = rig.link.publish_attempts;
    assert!(
        (9..=11).contains(&attempts),
        "failed publishes must keep the cadence, got {attempts} attempts"
    );
    assert!(rig.link.published.is_empty());

    // Channel recovers — publishing resumes on the next cadence.
    rig.link.fail_publishes = false;
    for _ in 0..25 {
        rig.step(100);
    }
    assert!(!rig.link.published.is_empty());
}
