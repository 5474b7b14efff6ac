//! Telemetry → InfluxDB relay.
//!
//! Companion host process: subscribes to the device telemetry topic,
//! decodes each record, and writes one measurement point per message to
//! an InfluxDB v2 bucket over the HTTP line-protocol endpoint.
//!
//! Failure policy mirrors the device side: malformed payloads and store
//! write failures are logged and dropped, never fatal.  Only the initial
//! MQTT connection setup can abort the process.
//!
//! Configuration via environment:
//!   MQTT_HOST / MQTT_PORT  — broker (default broker.hivemq.com:1883)
//!   INFLUX_URL             — base URL (default http://influxdb:8086)
//!   INFLUX_TOKEN           — API token
//!   INFLUX_ORG             — organisation
//!   INFLUX_BUCKET          — target bucket

use std::env;
use std::time::Duration;

use anyhow::Result;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tracing::{error, info, warn};

use greenhouse::app::events::TelemetryRecord;
use greenhouse::config::SystemConfig;

/// Measurement name in the bucket — fixed, dashboards key on it.
const MEASUREMENT: &str = "iot";

const RELAY_CLIENT_ID: &str = "esp32_to_influx";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let broker = env::var("MQTT_HOST").unwrap_or_else(|_| "broker.hivemq.com".to_string());
    let port: u16 = env::var("MQTT_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1883);

    let influx = InfluxWriter::from_env()?;
    let topic = SystemConfig::default().telemetry_topic;

    let mut mqttoptions = MqttOptions::new(RELAY_CLIENT_ID, &broker, port);
    mqttoptions.set_keep_alive(Duration::from_secs(30));

    let (client, mut eventloop) = AsyncClient::new(mqttoptions, 20);
    client.subscribe(&topic, QoS::AtLeastOnce).await?;
    info!("subscribed to {topic} on {broker}:{port}");

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("mqtt connected");
                // Re-subscribe on every (re)connect — the broker may have
                // dropped the session while we were away.
                if let Err(e) = client.subscribe(&topic, QoS::AtLeastOnce).await {
                    error!("re-subscribe failed: {e}");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                handle_message(&influx, &publish.payload).await;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("mqtt error: {e} — retrying in 2s");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

/// Decode one telemetry payload and forward it.  Malformed payloads and
/// store failures are logged and dropped.
async fn handle_message(influx: &InfluxWriter, payload: &[u8]) {
    let record: TelemetryRecord = match serde_json::from_slice(payload) {
        Ok(r) => r,
        Err(e) => {
            warn!("dropping malformed telemetry payload: {e}");
            return;
        }
    };

    if let Err(e) = influx.write_point(&record).await {
        warn!("influx write failed: {e}");
    }
}

// ───────────────────────────────────────────────────────────────
// InfluxDB v2 line-protocol writer
// ───────────────────────────────────────────────────────────────

struct InfluxWriter {
    http: reqwest::Client,
    write_url: String,
    token: String,
}

impl InfluxWriter {
    fn from_env() -> Result<Self> {
        let url = env::var("INFLUX_URL").unwrap_or_else(|_| "http://influxdb:8086".to_string());
        let token = env::var("INFLUX_TOKEN").unwrap_or_default();
        let org = env::var("INFLUX_ORG").unwrap_or_default();
        let bucket = env::var("INFLUX_BUCKET").unwrap_or_default();

        let write_url = format!(
            "{}/api/v2/write?org={}&bucket={}&precision=ms",
            url.trim_end_matches('/'),
            org,
            bucket
        );

        Ok(Self {
            http: reqwest::Client::new(),
            write_url,
            token,
        })
    }

    /// One point per record: `modo` as a tag, the readings as fields.
    /// Records with an absent climate reading are skipped — a fault
    /// cycle carries no values worth charting.
    async fn write_point(&self, record: &TelemetryRecord) -> Result<()> {
        let (Some(temp), Some(hum)) = (record.temp, record.hum) else {
            info!("skipping record with absent climate reading");
            return Ok(());
        };

        let line = line_protocol(record, temp, hum);
        let resp = self
            .http
            .post(&self.write_url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("influx returned {status}: {body}");
        }
        Ok(())
    }
}

/// Render one line-protocol point.
fn line_protocol(record: &TelemetryRecord, temp: f32, hum: f32) -> String {
    format!(
        "{MEASUREMENT},modo={} temp={},hum={},luz={},motor={}i",
        record.modo.wire_name(),
        temp,
        hum,
        record.luz,
        i32::from(record.motor),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenhouse::control::state::Mode;

    #[test]
    fn line_protocol_shape() {
        let record = TelemetryRecord {
            temp: Some(24.5),
            hum: Some(61.0),
            luz: 73,
            modo: Mode::Manual,
            motor: false,
        };
        assert_eq!(
            line_protocol(&record, 24.5, 61.0),
            "iot,modo=manual temp=24.5,hum=61,luz=73,motor=0i"
        );
    }

    #[test]
    fn automatic_mode_tag() {
        let record = TelemetryRecord {
            temp: Some(31.0),
            hum: Some(40.0),
            luz: 10,
            modo: Mode::Automatic,
            motor: true,
        };
        let line = line_protocol(&record, 31.0, 40.0);
        assert!(line.starts_with("iot,modo=automatico "));
        assert!(line.ends_with("motor=1i"));
    }
}
