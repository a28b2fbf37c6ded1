use crate::config::BrokerConfig;
use anyhow::Result;
use rumqttc::{MqttOptions, QoS};
use std::time::Duration;

/// MQTT connection settings for the bus listener
#[derive(Debug, Clone)]
pub struct MqttConnectionConfig {
    pub broker_url: String,
    pub client_id: Option<String>,
    pub qos: u8,
    pub keep_alive_secs: u64,
    pub clean_session: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl MqttConnectionConfig {
    pub fn from_broker_config(config: &BrokerConfig) -> Self {
        Self {
            broker_url: config.broker_url.clone(),
            client_id: config.client_id.clone(),
            qos: config.qos,
            keep_alive_secs: config.keep_alive_secs,
            clean_session: config.clean_session,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Validate MQTT connection parameters
    pub fn validate(&self) -> Result<()> {
        if self.qos > 2 {
            return Err(anyhow::anyhow!("QoS must be between 0 and 2"));
        }
        if self.broker_url.is_empty() {
            return Err(anyhow::anyhow!("Broker URL cannot be empty"));
        }
        if self.keep_alive_secs == 0 {
            return Err(anyhow::anyhow!("Keep-alive must be at least one second"));
        }
        self.parse_broker_url()?;
        Ok(())
    }

    /// Parse broker URL into host and port. IPv6 hosts must be bracketed.
    pub fn parse_broker_url(&self) -> Result<(String, u16)> {
        let url = &self.broker_url;
        let clean_url = url.strip_prefix("mqtt://").unwrap_or(url);
        let clean_url = clean_url.strip_suffix('/').unwrap_or(clean_url);

        let (host, port) = match clean_url.strip_prefix('[') {
            Some(rest) => {
                let (host, after) = rest
                    .split_once(']')
                    .ok_or_else(|| anyhow::anyhow!("Unclosed '[' in broker URL: {}", url))?;
                match after {
                    "" => (host, None),
                    _ => {
                        let port = after.strip_prefix(':').ok_or_else(|| {
                            anyhow::anyhow!("Unexpected text after host in broker URL: {}", url)
                        })?;
                        (host, Some(port))
                    }
                }
            }
            None => match clean_url.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (clean_url, None),
            },
        };

        if host.is_empty() {
            return Err(anyhow::anyhow!("Missing host in broker URL: {}", url));
        }

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("Invalid port in broker URL: {}", url))?,
            None => 1883,
        };

        Ok((host.to_string(), port))
    }

    /// Convert u8 QoS to rumqttc QoS enum
    pub fn qos(&self) -> QoS {
        match self.qos {
            0 => QoS::AtMostOnce,
            1 => QoS::AtLeastOnce,
            2 => QoS::ExactlyOnce,
            _ => QoS::AtMostOnce,
        }
    }

    /// Create MqttOptions from the configuration
    pub fn create_mqtt_options(&self, default_client_prefix: &str) -> Result<MqttOptions> {
        let (host, port) = self.parse_broker_url()?;

        let client_id = self
            .client_id
            .clone()
            .unwrap_or_else(|| format!("{}_{}", default_client_prefix, uuid::Uuid::new_v4()));

        let mut mqttoptions = MqttOptions::new(&client_id, host, port);
        mqttoptions.set_clean_session(self.clean_session);
        mqttoptions.set_keep_alive(Duration::from_secs(self.keep_alive_secs));

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            mqttoptions.set_credentials(username, password);
        }

        Ok(mqttoptions)
    }
}

/// Checks a subscription filter against MQTT wildcard rules.
pub fn valid_filter(filter: &str) -> bool {
    if filter.is_empty() {
        return false;
    }

    let levels: Vec<&str> = filter.split('/').collect();
    for (i, level) in levels.iter().enumerate() {
        if level.contains('#') && (*level != "#" || i != levels.len() - 1) {
            return false;
        }
        if level.contains('+') && *level != "+" {
            return false;
        }
    }
    true
}

/// Whether a concrete `topic` would be delivered to a subscription on `filter`.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    // Wildcards never match system topics at the first level
    if topic.starts_with('$') && (filter.starts_with('+') || filter.starts_with('#')) {
        return false;
    }

    let mut topic_levels = topic.split('/');
    for filter_level in filter.split('/') {
        if filter_level == "#" {
            return true;
        }
        match topic_levels.next() {
            Some(topic_level) if filter_level == "+" || filter_level == topic_level => {}
            _ => return false,
        }
    }
    topic_levels.next().is_none()
}
