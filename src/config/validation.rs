use super::types::*;
use crate::processors::common::mqtt::{MqttConnectionConfig, topic_matches, valid_filter};
use anyhow::anyhow;

pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    MqttConnectionConfig::from_broker_config(&config.broker).validate()?;

    if !valid_filter(&config.broker.topic_filter) {
        return Err(anyhow!(
            "Invalid topic filter '{}'",
            config.broker.topic_filter
        ));
    }

    if config.route.topic.is_empty() {
        return Err(anyhow!("Route topic cannot be empty"));
    }

    // A route the subscription never delivers would silently forward nothing
    if !topic_matches(&config.broker.topic_filter, &config.route.topic) {
        return Err(anyhow!(
            "Route topic '{}' is not covered by topic filter '{}'",
            config.route.topic,
            config.broker.topic_filter
        ));
    }

    let feed_service = &config.feed_service;
    if !(feed_service.base_url.starts_with("http://")
        || feed_service.base_url.starts_with("https://"))
    {
        return Err(anyhow!(
            "Feed service URL must start with http:// or https://, got '{}'",
            feed_service.base_url
        ));
    }
    if feed_service.api_key_env.is_empty() {
        return Err(anyhow!("API key environment variable name cannot be empty"));
    }
    if feed_service.api_key_header.is_empty() {
        return Err(anyhow!("API key header name cannot be empty"));
    }
    if feed_service.request_timeout_secs == 0 {
        return Err(anyhow!("Feed service request timeout must be at least one second"));
    }

    Ok(())
}
