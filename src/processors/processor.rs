use crate::core::message::{FeedTarget, Message, Reading};

use async_trait::async_trait;

/// Source of bus messages for the bridge loop.
#[async_trait]
pub trait MessageSource: Send {
    /// Waits for the next message.
    /// # Returns
    /// The next message, or an error once the underlying transport has failed.
    /// Errors are terminal; the bridge does not call `recv` again after one.
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

/// Writes a reading to a feed target.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Issues one update for `reading` against `target`.
    /// # Returns
    /// The outcome reported by the remote service. Transport failures, where no
    /// response was received at all, are returned as errors.
    async fn forward(&self, target: &FeedTarget, reading: &Reading) -> anyhow::Result<ForwardOutcome>;
}

/// Result of a single forwarding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub status: u16,
}

impl ForwardOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
