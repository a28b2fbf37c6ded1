use serde::Serialize;

/// A single publish received from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

impl Message {
    pub fn new(topic: &str, payload: &str) -> Self {
        Self {
            topic: topic.to_string(),
            payload: payload.to_string(),
        }
    }
}

/// A sensor value taken verbatim from a message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading(String);

impl Reading {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Request body understood by the feed service.
    pub fn to_body(&self) -> ReadingBody<'_> {
        ReadingBody {
            current_value: &self.0,
        }
    }
}

impl From<Message> for Reading {
    fn from(message: Message) -> Self {
        Self(message.payload)
    }
}

impl From<&str> for Reading {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ReadingBody<'a> {
    pub current_value: &'a str,
}

/// Feed and datastream a reading is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTarget {
    pub feed: u64,
    pub datastream: u64,
}
