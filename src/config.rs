//! System configuration parameters
//!
//! All tunable parameters for the greenhouse controller.  Values are
//! compiled-in defaults — the controller deliberately carries no persistence
//! layer, so a config change means a rebuild.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Button ---
    /// Hold duration (ms) at or above which a press counts as "long".
    pub long_press_ms: u32,

    // --- Automatic mode ---
    /// Temperature (Celsius) above which automatic mode runs the vent motor.
    pub auto_temp_threshold_c: f32,

    // --- Vent sweep ---
    /// Degrees moved per active loop iteration.
    pub vent_step_deg: i16,

    // --- Indicator ---
    /// Indicator toggle interval while the motor is active (ms).
    pub blink_interval_ms: u32,

    // --- Telemetry ---
    /// Minimum interval between telemetry publishes (ms).
    pub publish_interval_ms: u32,

    // --- Loop pacing ---
    /// End-of-iteration delay while the vent motor is sweeping (ms).
    pub active_delay_ms: u32,
    /// End-of-iteration delay while idle (ms) — power/CPU conservation.
    pub idle_delay_ms: u32,

    // --- Pub/sub ---
    /// Broker URL for the device link.
    pub mqtt_broker_url: String,
    /// MQTT client identifier.
    pub mqtt_client_id: String,
    /// Inbound remote-command topic.
    pub command_topic: String,
    /// Outbound telemetry topic.
    pub telemetry_topic: String,

    // --- WiFi ---
    pub wifi_ssid: String,
    pub wifi_password: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Button
            long_press_ms: 3000,

            // Automatic mode
            auto_temp_threshold_c: 30.0,

            // Vent sweep
            vent_step_deg: 2,

            // Indicator
            blink_interval_ms: 500,

            // Telemetry
            publish_interval_ms: 2000,

            // Loop pacing
            active_delay_ms: 5,
            idle_delay_ms: 100,

            // Pub/sub
            mqtt_broker_url: "mqtt://broker.hivemq.com:1883".into(),
            mqtt_client_id: "invernadero-esp32c3".into(),
            command_topic: "invernadero/control".into(),
            telemetry_topic: "invernadero/sensor/datos".into(),

            // WiFi
            wifi_ssid: "Wokwi-GUEST".into(),
            wifi_password: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.long_press_ms > 0);
        assert!(c.vent_step_deg > 0 && c.vent_step_deg <= 180);
        assert!(c.blink_interval_ms > 0);
        assert!(c.publish_interval_ms > 0);
        assert!(!c.command_topic.is_empty());
        assert!(!c.telemetry_topic.is_empty());
    }

    #[test]
    fn pacing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.active_delay_ms < c.idle_delay_ms,
            "active iterations must run faster than idle ones"
        );
        assert!(
            c.idle_delay_ms < c.publish_interval_ms,
            "even idle iterations must cycle faster than the publish cadence"
        );
        assert!(
            c.blink_interval_ms < c.long_press_ms,
            "blink must be observable within a single long press"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.long_press_ms, c2.long_press_ms);
        assert!((c.auto_temp_threshold_c - c2.auto_temp_threshold_c).abs() < 0.001);
        assert_eq!(c.telemetry_topic, c2.telemetry_topic);
    }
}
