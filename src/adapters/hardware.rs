//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the sensor and actuator drivers plus the status display,
//! exposing them through [`SensorPort`], [`ActuatorPort`] and
//! [`DisplayPort`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets, the underlying drivers use
//! cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, DisplayPort, SensorPort};
use crate::control::state::ClimateReading;
use crate::drivers::button;
use crate::drivers::indicator::IndicatorLed;
use crate::drivers::oled::OledDisplay;
use crate::drivers::servo::VentServo;
use crate::sensors::dht22::Dht22;
use crate::sensors::light::LightSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    dht: Dht22,
    ldr: LightSensor,
    servo: VentServo,
    indicator: IndicatorLed,
    oled: OledDisplay,
}

impl HardwareAdapter {
    /// Pass in pre-built drivers (built in main where peripheral
    /// ownership is established).
    pub fn new(
        dht: Dht22,
        ldr: LightSensor,
        servo: VentServo,
        indicator: IndicatorLed,
        oled: OledDisplay,
    ) -> Self {
        Self {
            dht,
            ldr,
            servo,
            indicator,
            oled,
        }
    }

    /// Last duty commanded to the vent servo.
    pub fn vent_duty(&self) -> u32 {
        self.servo.current_duty()
    }

    /// Current indicator LED state.
    pub fn indicator_lit(&self) -> bool {
        self.indicator.is_lit()
    }

    /// Last rendered status frame (host only, for tests).
    #[cfg(not(target_os = "espidf"))]
    pub fn last_frame(&self) -> &[String] {
        self.oled.last_lines()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_climate(&mut self) -> ClimateReading {
        self.dht.read_climate()
    }

    fn read_light_raw(&mut self) -> u16 {
        self.ldr.read_raw()
    }

    fn button_pressed(&self) -> bool {
        button::is_pressed()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_vent_duty(&mut self, duty: u32) {
        self.servo.set_duty(duty);
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator.set(on);
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl DisplayPort for HardwareAdapter {
    fn render(&mut self, lines: &[String]) {
        self.oled.render(lines);
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;
    use crate::drivers::servo::duty_for_angle;
    use crate::pins;

    fn make_adapter() -> HardwareAdapter {
        HardwareAdapter::new(
            Dht22::new(pins::DHT_GPIO),
            LightSensor::new(pins::LDR_ADC_GPIO),
            VentServo::new(),
            IndicatorLed::new(),
            OledDisplay::new(),
        )
    }

    #[test]
    fn actuator_calls_land_in_drivers() {
        let mut hw = make_adapter();
        hw.set_vent_duty(duty_for_angle(90));
        hw.set_indicator(true);
        assert_eq!(hw.vent_duty(), 77);
        assert!(hw.indicator_lit());
    }

    #[test]
    fn display_frames_reach_the_oled() {
        let mut hw = make_adapter();
        hw.render(&["Temp: 22.0C".into(), "Modo manual".into()]);
        assert_eq!(hw.last_frame().len(), 2);
    }
}
