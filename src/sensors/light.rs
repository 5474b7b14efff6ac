//! LDR ambient-light sensor.
//!
//! Photoresistor in a voltage-divider to ADC1, 12-bit raw reads.  The
//! raw-to-percent mapping is a control-core concern
//! ([`light_percent_from_raw`](crate::control::state::light_percent_from_raw));
//! this driver only hands back the raw sample.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the LDR channel via the oneshot ADC (initialised by
//! hw_init).  On host/test: reads from a static for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_LIGHT_RAW: AtomicU16 = AtomicU16::new(2048);

/// Inject a simulated raw ADC value (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light_raw(raw: u16) {
    SIM_LIGHT_RAW.store(raw, Ordering::Relaxed);
}

pub struct LightSensor {
    _adc_gpio: i32,
}

impl LightSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            _adc_gpio: adc_gpio,
        }
    }

    /// Raw ADC sample, 0..=4095.  An ADC failure reads as 0 (full
    /// brightness after inversion) rather than an error — the light
    /// value is cosmetic, not a control input.
    pub fn read_raw(&mut self) -> u16 {
        self.read_adc().min(4095)
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_LDR)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_LIGHT_RAW.load(Ordering::Relaxed)
    }
}
