use crate::config::RouteConfig;
use crate::core::message::FeedTarget;

/// Maps exactly one topic literal to one feed target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    topic: String,
    target: FeedTarget,
}

impl Route {
    pub fn new(topic: &str, target: FeedTarget) -> Self {
        Self {
            topic: topic.to_string(),
            target,
        }
    }

    pub fn from_config(config: &RouteConfig) -> Self {
        Self::new(
            &config.topic,
            FeedTarget {
                feed: config.feed,
                datastream: config.datastream,
            },
        )
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Exact match only; wildcards in `topic` are not expanded.
    pub fn target_for(&self, topic: &str) -> Option<&FeedTarget> {
        (topic == self.topic).then_some(&self.target)
    }
}
