//! MQTT link adapter — the [`MessagePort`] implementation.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real broker connection via
//!   `esp_idf_svc::mqtt`.  A dedicated receiver thread drains the
//!   connection events into a bounded inbound queue, so the control
//!   loop's `poll_command()` is a lock-and-pop that never blocks on the
//!   network.  The thread re-subscribes to the command topic on every
//!   (re)connect — the broker may have dropped the session.
//! - **all other targets**: in-memory queues with injection/inspection
//!   helpers for tests.
//!
//! Publishes go out QoS 0: a lost telemetry record is cheaper than a
//! blocked loop, and the next cadence replaces it in 2 s anyway.

use crate::app::ports::MessagePort;
#[cfg(not(target_os = "espidf"))]
use crate::config::SystemConfig;
use crate::error::ChannelError;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

/// Oversized inbound payloads are dropped before queueing.
const MAX_INBOUND_PAYLOAD: usize = 1024;
/// Bounded inbound queue — oldest command is dropped on overflow.
const MAX_PENDING_COMMANDS: usize = 8;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp_impl {
    use super::{MAX_INBOUND_PAYLOAD, MAX_PENDING_COMMANDS};
    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
    };
    use log::{info, warn};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    pub struct MqttLink {
        client: Arc<Mutex<EspMqttClient<'static>>>,
        inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
        telemetry_topic: String,
    }

    impl MqttLink {
        /// Connect to the broker and start the receiver thread.
        pub fn connect(config: &crate::config::SystemConfig) -> anyhow::Result<Self> {
            let conf = MqttClientConfiguration {
                client_id: Some(config.mqtt_client_id.as_str()),
                ..Default::default()
            };
            let (client, conn) =
                EspMqttClient::new(config.mqtt_broker_url.as_str(), &conf)?;
            let client = Arc::new(Mutex::new(client));
            let inbound = Arc::new(Mutex::new(VecDeque::with_capacity(MAX_PENDING_COMMANDS)));

            Self::spawn_receiver(
                conn,
                Arc::clone(&client),
                Arc::clone(&inbound),
                config.command_topic.clone(),
            );

            info!("MQTT: connecting to {}", config.mqtt_broker_url);
            Ok(Self {
                client,
                inbound,
                telemetry_topic: config.telemetry_topic.clone(),
            })
        }

        fn spawn_receiver(
            mut conn: EspMqttConnection,
            client: Arc<Mutex<EspMqttClient<'static>>>,
            inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
            command_topic: String,
        ) {
            thread::Builder::new()
                .name("mqtt-rx".into())
                .stack_size(8 * 1024)
                .spawn(move || loop {
                    match conn.next() {
                        Ok(event) => match event.payload() {
                            EventPayload::Connected(_) => {
                                // Session may be fresh — (re)subscribe.
                                info!("MQTT: connected, subscribing to {command_topic}");
                                if let Ok(mut c) = client.lock() {
                                    if let Err(e) = c.subscribe(&command_topic, QoS::AtMostOnce) {
                                        warn!("MQTT: subscribe failed: {e}");
                                    }
                                }
                            }
                            EventPayload::Received { data, details, .. } => {
                                if !matches!(details, Details::Complete) {
                                    continue;
                                }
                                if data.len() > MAX_INBOUND_PAYLOAD {
                                    warn!(
                                        "MQTT: dropping oversized command payload ({} bytes)",
                                        data.len()
                                    );
                                    continue;
                                }
                                if let Ok(mut q) = inbound.lock() {
                                    if q.len() >= MAX_PENDING_COMMANDS {
                                        q.pop_front();
                                    }
                                    q.push_back(data.to_vec());
                                }
                            }
                            EventPayload::Disconnected => {
                                warn!("MQTT: disconnected");
                            }
                            _ => {}
                        },
                        Err(e) => {
                            warn!("MQTT: receive loop error: {e:?}");
                            thread::sleep(Duration::from_secs(2));
                        }
                    }
                })
                .expect("failed to spawn mqtt receiver thread");
        }

        pub(super) fn pop_inbound(&mut self) -> Option<Vec<u8>> {
            self.inbound.lock().ok()?.pop_front()
        }

        pub(super) fn publish(&mut self, payload: &[u8]) -> Result<(), super::ChannelError> {
            let mut client = self
                .client
                .lock()
                .map_err(|_| super::ChannelError::Disconnected)?;
            client
                .publish(&self.telemetry_topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|e| {
                    warn!("MQTT: publish error: {e}");
                    super::ChannelError::PublishFailed
                })
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp_impl::MqttLink;

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct MqttLink {
    inbound: VecDeque<Vec<u8>>,
    published: Vec<Vec<u8>>,
    fail_publishes: bool,
    telemetry_topic: String,
}

#[cfg(not(target_os = "espidf"))]
impl MqttLink {
    pub fn connect(config: &SystemConfig) -> anyhow::Result<Self> {
        log::info!("MQTT(sim): link to {} ready", config.mqtt_broker_url);
        Ok(Self {
            inbound: VecDeque::with_capacity(MAX_PENDING_COMMANDS),
            published: Vec::new(),
            fail_publishes: false,
            telemetry_topic: config.telemetry_topic.clone(),
        })
    }

    /// Queue an inbound command payload as if it arrived from the broker.
    pub fn sim_inject_command(&mut self, payload: &[u8]) {
        if payload.len() > MAX_INBOUND_PAYLOAD {
            return;
        }
        if self.inbound.len() >= MAX_PENDING_COMMANDS {
            self.inbound.pop_front();
        }
        self.inbound.push_back(payload.to_vec());
    }

    /// Everything published so far.
    pub fn sim_published(&self) -> &[Vec<u8>] {
        &self.published
    }

    /// Make subsequent publishes fail (channel fault injection).
    pub fn sim_set_publish_failure(&mut self, fail: bool) {
        self.fail_publishes = fail;
    }

    /// Topic the link would publish to.
    pub fn telemetry_topic(&self) -> &str {
        &self.telemetry_topic
    }

    fn pop_inbound(&mut self) -> Option<Vec<u8>> {
        self.inbound.pop_front()
    }

    fn publish(&mut self, payload: &[u8]) -> Result<(), ChannelError> {
        if self.fail_publishes {
            return Err(ChannelError::PublishFailed);
        }
        self.published.push(payload.to_vec());
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// MessagePort
// ───────────────────────────────────────────────────────────────

impl MessagePort for MqttLink {
    fn poll_command(&mut self) -> Option<Vec<u8>> {
        self.pop_inbound()
    }

    fn publish_telemetry(&mut self, payload: &[u8]) -> Result<(), ChannelError> {
        self.publish(payload)
    }
}
