//! GPIO / peripheral pin assignments for the greenhouse controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Assignments match the ESP32-C3 carrier board schematic.

// ---------------------------------------------------------------------------
// I2C bus (SSD1306 status display)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 5;
pub const I2C_SCL_GPIO: i32 = 4;
/// I2C bus frequency for the display (400 kHz fast mode).
pub const I2C_FREQ_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 climate sensor — single-wire data line (open-drain, external pull-up).
pub const DHT_GPIO: i32 = 2;

/// LDR photoresistor — voltage-divider to ADC1 channel 0 (GPIO 0 on ESP32-C3).
pub const LDR_ADC_GPIO: i32 = 0;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Vent servo PWM line (standard 50 Hz hobby-servo signal).
pub const SERVO_PWM_GPIO: i32 = 10;

/// Indicator LED — digital output, active HIGH.
pub const INDICATOR_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// User button (active-high with external pull-down)
// ---------------------------------------------------------------------------

/// Momentary push-button for manual control.  Rising edge fires the ISR.
pub const BUTTON_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  10-bit gives 0 – 1023 duty levels, the
/// range the servo duty constants are calibrated against.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 10;
/// LEDC base frequency for the servo (standard 50 Hz frame).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
