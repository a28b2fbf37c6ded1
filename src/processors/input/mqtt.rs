use crate::config::BrokerConfig;
use crate::core::message::Message;
use crate::processors::MessageSource;
use crate::processors::common::MqttConnectionConfig;

use anyhow::Context;
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, Packet};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

const CLIENT_PREFIX: &str = "feedbridge";

/// Subscribes to one topic filter and yields every publish delivered on it.
///
/// The event loop is polled by a background task, so keep-alive pings keep
/// flowing while the caller is busy between `recv` calls.
pub struct BusListener {
    // Dropping the client closes the request channel and ends the event loop
    _client: AsyncClient,
    messages: mpsc::UnboundedReceiver<anyhow::Result<Message>>,
    event_task: JoinHandle<()>,
}

impl BusListener {
    /// Queues the subscription and starts polling. The TCP connection is made
    /// by the background task.
    pub async fn connect(config: &BrokerConfig) -> anyhow::Result<Self> {
        let connection = MqttConnectionConfig::from_broker_config(config);
        connection.validate()?;

        let mqttoptions = connection.create_mqtt_options(CLIENT_PREFIX)?;
        let (client, event_loop) = AsyncClient::new(mqttoptions, 10);

        client
            .subscribe(config.topic_filter.as_str(), connection.qos())
            .await
            .with_context(|| format!("Failed to subscribe to topic '{}'", config.topic_filter))?;

        tracing::info!(
            "MQTT listener created (broker: {}, filter: {}, QoS: {})",
            connection.broker_url,
            config.topic_filter,
            connection.qos
        );

        let (tx, messages) = mpsc::unbounded_channel();
        let event_task = tokio::spawn(drive_event_loop(event_loop, config.topic_filter.clone(), tx));

        Ok(Self {
            _client: client,
            messages,
            event_task,
        })
    }
}

impl Drop for BusListener {
    fn drop(&mut self) {
        self.event_task.abort();
    }
}

/// Polls until the connection fails or the listener is dropped. The first
/// error is handed to the receiver and ends the task.
async fn drive_event_loop(
    mut event_loop: EventLoop,
    topic_filter: String,
    tx: mpsc::UnboundedSender<anyhow::Result<Message>>,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let message = message_from_publish(&publish.topic, &publish.payload);
                tracing::debug!("MQTT '{}' payload: {}", message.topic, message.payload);
                if tx.send(Ok(message)).is_err() {
                    return;
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                tracing::info!("Connected to MQTT broker ({:?})", ack.code);
            }
            Ok(Event::Incoming(Packet::SubAck(_))) => {
                tracing::info!("Subscribed to MQTT topic: {}", topic_filter);
            }
            Ok(_) => {}
            Err(e) => {
                let _ = tx.send(Err(anyhow::Error::new(e).context("MQTT connection error")));
                return;
            }
        }
    }
}

#[async_trait]
impl MessageSource for BusListener {
    async fn recv(&mut self) -> anyhow::Result<Message> {
        match self.messages.recv().await {
            Some(result) => result,
            None => Err(anyhow::anyhow!("MQTT event loop stopped")),
        }
    }
}

/// Text payloads pass through unchanged; binary payloads are base64 encoded.
pub fn message_from_publish(topic: &str, payload: &[u8]) -> Message {
    let payload = match std::str::from_utf8(payload) {
        Ok(s) => s.to_owned(),
        Err(_) => BASE64.encode(payload),
    };

    Message::new(topic, &payload)
}
