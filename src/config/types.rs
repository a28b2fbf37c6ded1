//! Configuration Type Definitions
//!
//! Core configuration structures for feedbridge. Every field has a default
//! matching the bridge's compiled-in behaviour, so an absent or partial TOML
//! file still yields a complete `Config`.

use serde::Deserialize;

/// Default MQTT broker address.
pub const DEFAULT_BROKER_URL: &str = "mqtt://localhost:1883";

/// Default subscription covering every 1-wire sensor topic.
pub const DEFAULT_TOPIC_FILTER: &str = "/1wire/#";

/// Default feed service host.
pub const DEFAULT_FEED_BASE_URL: &str = "http://api.pachube.com";

/// Environment variable holding the feed service API key.
pub const DEFAULT_API_KEY_ENV: &str = "PACHUBE_API_KEY";

/// Header carrying the API key on every outbound request.
pub const DEFAULT_API_KEY_HEADER: &str = "X-PachubeApiKey";

/// Upper bound on a single feed service request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// The single topic whose readings are forwarded.
pub const DEFAULT_ROUTE_TOPIC: &str = "/1wire/28537FEE02000078/temperature";

pub const DEFAULT_FEED_ID: u64 = 42662;
pub const DEFAULT_DATASTREAM_ID: u64 = 1;

/// Root configuration for the bridge.
///
/// # Example Structure
///
/// ```toml
/// [broker]
/// broker_url = "mqtt://localhost:1883"
/// topic_filter = "/1wire/#"
///
/// [feed_service]
/// base_url = "http://api.pachube.com"
///
/// [route]
/// topic = "/1wire/28537FEE02000078/temperature"
/// feed = 42662
/// datastream = 1
/// ```
#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Inbound MQTT connection and subscription
    pub broker: BrokerConfig,

    /// Outbound feed service endpoint and credential lookup
    pub feed_service: FeedServiceConfig,

    /// The one topic mapped to a feed datastream
    pub route: RouteConfig,
}

/// MQTT broker connection parameters for the bus listener.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Broker address, `mqtt://host:port` or bare `host[:port]`
    pub broker_url: String,

    /// Wildcard filter subscribed to at startup
    pub topic_filter: String,

    /// Client identifier; a random one is generated when absent
    pub client_id: Option<String>,

    /// Subscription QoS (0, 1 or 2)
    pub qos: u8,

    /// MQTT keep-alive interval in seconds
    pub keep_alive_secs: u64,

    pub clean_session: bool,

    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            broker_url: DEFAULT_BROKER_URL.to_string(),
            topic_filter: DEFAULT_TOPIC_FILTER.to_string(),
            client_id: None,
            qos: 0,
            keep_alive_secs: 10,
            clean_session: true,
            username: None,
            password: None,
        }
    }
}

/// Remote feed service parameters for the forwarder.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FeedServiceConfig {
    /// Scheme and host the `/v2/feeds/...` path is appended to
    pub base_url: String,

    /// Name of the environment variable the API key is read from
    pub api_key_env: String,

    /// Request header the API key is sent in
    pub api_key_header: String,

    /// Upper bound on one PUT, from connect to the end of the response
    pub request_timeout_secs: u64,
}

impl Default for FeedServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Topic to feed datastream mapping.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RouteConfig {
    /// Exact topic literal, compared byte for byte
    pub topic: String,

    pub feed: u64,
    pub datastream: u64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_ROUTE_TOPIC.to_string(),
            feed: DEFAULT_FEED_ID,
            datastream: DEFAULT_DATASTREAM_ID,
        }
    }
}
