use super::types::Config;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    load_config_from_string(&content)
        .with_context(|| format!("parsing {}", path.display()))
}

/// Load configuration from a string
pub fn load_config_from_string(content: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = load_config_from_string("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.broker.topic_filter, "/1wire/#");
        assert_eq!(config.route.topic, "/1wire/28537FEE02000078/temperature");
        assert_eq!(config.route.feed, 42662);
        assert_eq!(config.route.datastream, 1);
        assert_eq!(config.feed_service.api_key_env, "PACHUBE_API_KEY");
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = load_config_from_string(
            r#"
            [broker]
            broker_url = "mqtt://sensors.lan:1884"
            qos = 1

            [route]
            feed = 1234
            "#,
        )
        .unwrap();

        assert_eq!(config.broker.broker_url, "mqtt://sensors.lan:1884");
        assert_eq!(config.broker.qos, 1);
        assert_eq!(config.broker.topic_filter, DEFAULT_TOPIC_FILTER);
        assert_eq!(config.broker.keep_alive_secs, 10);
        assert_eq!(config.route.feed, 1234);
        assert_eq!(config.route.datastream, DEFAULT_DATASTREAM_ID);
        assert_eq!(config.route.topic, DEFAULT_ROUTE_TOPIC);
        assert_eq!(config.feed_service, FeedServiceConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = load_config_from_string(
            r#"
            [route]
            topics = ["/1wire/a", "/1wire/b"]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_config("/nonexistent/feedbridge.toml").unwrap_err();
        assert!(format!("{err}").contains("/nonexistent/feedbridge.toml"));
    }
}
