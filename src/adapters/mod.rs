//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                  | Connects to               |
//! |------------|-----------------------------|---------------------------|
//! | `hardware` | SensorPort                  | DHT22, LDR ADC, button    |
//! |            | ActuatorPort                | servo PWM, indicator LED  |
//! |            | DisplayPort                 | SSD1306 over I2C          |
//! | `mqtt`     | MessagePort                 | ESP-IDF MQTT client       |
//! | `wifi`     | —                           | ESP-IDF WiFi STA          |
//! | `time`     | —                           | ESP32 system timer        |

pub mod hardware;
pub mod mqtt;
pub mod time;
pub mod wifi;
