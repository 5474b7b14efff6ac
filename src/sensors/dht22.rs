//! DHT22 (AM2302) climate sensor driver.
//!
//! Single-wire protocol, bit-banged: the host pulls the line low for
//! ~1.1 ms to request a reading, the sensor answers with an 80 µs/80 µs
//! preamble followed by 40 data bits where the high-pulse width encodes
//! the bit value (≈27 µs = 0, ≈70 µs = 1).  Five bytes total: humidity
//! hi/lo, temperature hi/lo, checksum.
//!
//! The device needs ≥2 s between conversions; with the idle loop cadence
//! at 100 ms the sensor is polled far more often than it converts, so it
//! repeats its held conversion — that is fine, only *failed* transfers
//! surface as a fault.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the data GPIO with `esp_rom_delay_us` timing.
//! On host/test: reads from injectable atomics (`sim_set_climate`,
//! `sim_set_fault`).

use crate::control::state::ClimateReading;
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_HUM_BITS: AtomicU32 = AtomicU32::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_FAULT: AtomicBool = AtomicBool::new(false);

/// Inject a simulated climate reading (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUM_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

/// Force subsequent simulated reads to fail (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_fault(fault: bool) {
    SIM_FAULT.store(fault, Ordering::Relaxed);
}

/// One successful conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Dht22 {
    gpio: i32,
}

impl Dht22 {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    /// GPIO pin the sensor data line is attached to.
    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Run one transfer.  Any protocol or checksum failure is returned
    /// as an error; the caller maps it to an absent reading for the
    /// current cycle.
    pub fn read(&mut self) -> Result<ClimateSample, SensorError> {
        let raw = self.read_frame()?;
        Self::decode_frame(&raw)
    }

    /// Convenience wrapper used by the hardware adapter: collapse a
    /// failed transfer into absent fields (never cached).
    pub fn read_climate(&mut self) -> ClimateReading {
        match self.read() {
            Ok(sample) => ClimateReading {
                temperature_c: Some(sample.temperature_c),
                humidity_pct: Some(sample.humidity_pct),
            },
            Err(e) => {
                log::warn!("DHT22 read failed: {e}");
                ClimateReading::default()
            }
        }
    }

    // ── Frame decode (target-independent) ─────────────────────

    fn decode_frame(bytes: &[u8; 5]) -> Result<ClimateSample, SensorError> {
        let sum = bytes[0]
            .wrapping_add(bytes[1])
            .wrapping_add(bytes[2])
            .wrapping_add(bytes[3]);
        if sum != bytes[4] {
            return Err(SensorError::ChecksumMismatch);
        }

        let humidity_pct = f32::from(u16::from_be_bytes([bytes[0], bytes[1]])) / 10.0;

        let temp_raw = u16::from_be_bytes([bytes[2] & 0x7F, bytes[3]]);
        let mut temperature_c = f32::from(temp_raw) / 10.0;
        if bytes[2] & 0x80 != 0 {
            temperature_c = -temperature_c;
        }

        if !(0.0..=100.0).contains(&humidity_pct) || !(-40.0..=80.0).contains(&temperature_c) {
            return Err(SensorError::OutOfRange);
        }

        Ok(ClimateSample {
            temperature_c,
            humidity_pct,
        })
    }

    // ── Wire transfer ─────────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        use esp_idf_svc::sys::{
            esp_rom_delay_us, gpio_get_level, gpio_mode_t_GPIO_MODE_INPUT,
            gpio_mode_t_GPIO_MODE_OUTPUT_OD, gpio_set_direction, gpio_set_level,
        };

        let pin = self.gpio;

        // SAFETY: single-threaded main-loop access to an already
        // configured GPIO; the direction flip is the protocol.
        unsafe {
            // Start signal: drive low >1 ms, then release to the pull-up.
            gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT_OD);
            gpio_set_level(pin, 0);
            esp_rom_delay_us(1100);
            gpio_set_level(pin, 1);
            gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_INPUT);

            // Sensor response preamble: ~80 µs low, ~80 µs high.
            Self::wait_level(pin, 0, 100)?;
            Self::wait_level(pin, 1, 100)?;
            Self::wait_level(pin, 0, 100)?;

            // 40 data bits: 50 µs low separator, then a high pulse whose
            // width encodes the bit.  Sample mid-way at 40 µs.
            let mut bytes = [0u8; 5];
            for bit in 0..40 {
                Self::wait_level(pin, 1, 80)?;
                esp_rom_delay_us(40);
                if gpio_get_level(pin) != 0 {
                    bytes[bit / 8] |= 1 << (7 - (bit % 8));
                    Self::wait_level(pin, 0, 80)?;
                }
            }
            Ok(bytes)
        }
    }

    /// Spin until the line reads `level`, up to `timeout_us`.
    #[cfg(target_os = "espidf")]
    fn wait_level(pin: i32, level: i32, timeout_us: u32) -> Result<(), SensorError> {
        use esp_idf_svc::sys::{esp_rom_delay_us, gpio_get_level};
        let mut waited = 0u32;
        // SAFETY: register reads + busy-wait only.
        unsafe {
            while gpio_get_level(pin) != level {
                if waited >= timeout_us {
                    return Err(SensorError::BusTimeout);
                }
                esp_rom_delay_us(2);
                waited += 2;
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        if SIM_FAULT.load(Ordering::Relaxed) {
            return Err(SensorError::BusTimeout);
        }
        let temperature_c = f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed));
        let humidity_pct = f32::from_bits(SIM_HUM_BITS.load(Ordering::Relaxed));
        Ok(Self::encode_frame(temperature_c, humidity_pct))
    }

    /// Build a valid wire frame from engineering values (simulation).
    #[cfg(not(target_os = "espidf"))]
    fn encode_frame(temperature_c: f32, humidity_pct: f32) -> [u8; 5] {
        let hum = (humidity_pct * 10.0) as u16;
        let temp_abs = (temperature_c.abs() * 10.0) as u16;
        let [mut t_hi, t_lo] = temp_abs.to_be_bytes();
        if temperature_c < 0.0 {
            t_hi |= 0x80;
        }
        let [h_hi, h_lo] = hum.to_be_bytes();
        let sum = h_hi
            .wrapping_add(h_lo)
            .wrapping_add(t_hi)
            .wrapping_add(t_lo);
        [h_hi, h_lo, t_hi, t_lo, sum]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_positive_temperature() {
        // 65.2 %RH, 27.5 °C
        let frame = [0x02, 0x8C, 0x01, 0x13, 0x02u8
            .wrapping_add(0x8C)
            .wrapping_add(0x01)
            .wrapping_add(0x13)];
        let s = Dht22::decode_frame(&frame).unwrap();
        assert!((s.humidity_pct - 65.2).abs() < 0.05);
        assert!((s.temperature_c - 27.5).abs() < 0.05);
    }

    #[test]
    fn decodes_negative_temperature() {
        // -10.1 °C, sign bit in the temperature high byte.
        let frame = [0x01, 0x90, 0x80, 0x65, 0x01u8
            .wrapping_add(0x90)
            .wrapping_add(0x80)
            .wrapping_add(0x65)];
        let s = Dht22::decode_frame(&frame).unwrap();
        assert!((s.temperature_c + 10.1).abs() < 0.05);
    }

    #[test]
    fn rejects_bad_checksum() {
        let frame = [0x02, 0x8C, 0x01, 0x13, 0x00];
        assert_eq!(
            Dht22::decode_frame(&frame),
            Err(SensorError::ChecksumMismatch)
        );
    }

    #[test]
    fn rejects_implausible_humidity() {
        // 3276.7 %RH with a valid checksum.
        let b: [u8; 4] = [0x7F, 0xFF, 0x00, 0xC8];
        let frame = [
            b[0],
            b[1],
            b[2],
            b[3],
            b[0].wrapping_add(b[1]).wrapping_add(b[2]).wrapping_add(b[3]),
        ];
        assert_eq!(Dht22::decode_frame(&frame), Err(SensorError::OutOfRange));
    }

    // Single test for the shared simulation statics — parallel test
    // threads must not interleave fault/climate injection.
    #[test]
    fn sim_roundtrip_and_fault() {
        let mut dht = Dht22::new(2);

        sim_set_fault(false);
        sim_set_climate(31.5, 48.0);
        let r = dht.read_climate();
        assert!((r.temperature_c.unwrap() - 31.5).abs() < 0.05);
        assert!((r.humidity_pct.unwrap() - 48.0).abs() < 0.05);

        sim_set_fault(true);
        let r = dht.read_climate();
        assert!(r.temperature_c.is_none());
        assert!(r.humidity_pct.is_none());
        sim_set_fault(false);
    }
}
