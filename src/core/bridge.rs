use crate::core::message::{Message, Reading};
use crate::processors::output::ConsoleReporter;
use crate::processors::transform::Route;
use crate::processors::{ForwardOutcome, Forwarder, MessageSource};

use std::future::Future;
use std::io::Write;

/// Receives bus messages one at a time and forwards the routed ones.
pub struct Bridge<S, F, W: Write> {
    source: S,
    forwarder: F,
    route: Route,
    console: ConsoleReporter<W>,
}

impl<S, F, W> Bridge<S, F, W>
where
    S: MessageSource,
    F: Forwarder,
    W: Write,
{
    pub fn new(source: S, forwarder: F, route: Route, console: ConsoleReporter<W>) -> Self {
        Self {
            source,
            forwarder,
            route,
            console,
        }
    }

    /// Prints the message, then forwards it if its topic is routed.
    /// # Returns
    /// The forwarding outcome, or `None` when nothing was forwarded or the
    /// request never got a response.
    pub async fn handle(&mut self, message: Message) -> anyhow::Result<Option<ForwardOutcome>> {
        self.console.message(&message)?;

        let Some(target) = self.route.target_for(&message.topic).copied() else {
            return Ok(None);
        };

        let reading = Reading::from(message);
        match self.forwarder.forward(&target, &reading).await {
            Ok(outcome) => {
                self.console.forwarded(&outcome)?;
                Ok(Some(outcome))
            }
            Err(e) => {
                tracing::error!(
                    "Forwarding to feed {} datastream {} failed: {:#}",
                    target.feed,
                    target.datastream,
                    e
                );
                self.console.failed(&e)?;
                Ok(None)
            }
        }
    }

    /// Runs until the source fails or `shutdown` completes.
    pub async fn run<D>(mut self, shutdown: D) -> anyhow::Result<()>
    where
        D: Future<Output = ()>,
    {
        tracing::info!("Bridge running, forwarding '{}'", self.route.topic());
        tokio::pin!(shutdown);

        loop {
            let message = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Bridge stopped");
                    return Ok(());
                }
                message = self.source.recv() => message?,
            };

            self.handle(message).await?;
        }
    }

    #[cfg(test)]
    pub fn console(&self) -> &ConsoleReporter<W> {
        &self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::FeedTarget;

    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    const ROUTED: &str = "/1wire/28537FEE02000078/temperature";
    const TARGET: FeedTarget = FeedTarget {
        feed: 42662,
        datastream: 1,
    };

    type Events = Arc<Mutex<Vec<String>>>;

    /// Yields the scripted messages, then fails like a dropped connection.
    struct ScriptedSource(VecDeque<Message>);

    impl ScriptedSource {
        fn new(messages: &[(&str, &str)]) -> Self {
            Self(messages.iter().map(|(t, p)| Message::new(t, p)).collect())
        }
    }

    #[async_trait]
    impl MessageSource for ScriptedSource {
        async fn recv(&mut self) -> anyhow::Result<Message> {
            self.0
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("connection closed"))
        }
    }

    struct IdleSource;

    #[async_trait]
    impl MessageSource for IdleSource {
        async fn recv(&mut self) -> anyhow::Result<Message> {
            std::future::pending().await
        }
    }

    struct RecordingForwarder {
        events: Events,
        status: u16,
    }

    #[async_trait]
    impl Forwarder for RecordingForwarder {
        async fn forward(&self, target: &FeedTarget, reading: &Reading) -> anyhow::Result<ForwardOutcome> {
            self.events.lock().unwrap().push(format!(
                "forward {}/{} {}",
                target.feed,
                target.datastream,
                reading.as_str()
            ));
            Ok(ForwardOutcome {
                status: self.status,
            })
        }
    }

    struct FailingForwarder;

    #[async_trait]
    impl Forwarder for FailingForwarder {
        async fn forward(&self, _: &FeedTarget, _: &Reading) -> anyhow::Result<ForwardOutcome> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    /// Records each flushed console line into the shared event log.
    struct EventWriter {
        events: Events,
        pending: Vec<u8>,
    }

    impl Write for EventWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.pending.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            let line = String::from_utf8_lossy(&self.pending).trim_end().to_string();
            self.pending.clear();
            self.events.lock().unwrap().push(format!("console {line}"));
            Ok(())
        }
    }

    fn bridge<S: MessageSource>(source: S, status: u16) -> (Bridge<S, RecordingForwarder, EventWriter>, Events) {
        let events = Events::default();
        let forwarder = RecordingForwarder {
            events: events.clone(),
            status,
        };
        let console = ConsoleReporter::new(EventWriter {
            events: events.clone(),
            pending: Vec::new(),
        });
        (
            Bridge::new(source, forwarder, Route::new(ROUTED, TARGET), console),
            events,
        )
    }

    fn snapshot(events: &Events) -> Vec<String> {
        events.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_routed_topic_is_forwarded_once() {
        let (mut bridge, events) = bridge(IdleSource, 200);

        let outcome = bridge.handle(Message::new(ROUTED, "21.375")).await.unwrap();

        assert_eq!(outcome, Some(ForwardOutcome { status: 200 }));
        assert_eq!(
            snapshot(&events),
            vec![
                format!("console {ROUTED}: 21.375"),
                "forward 42662/1 21.375".to_string(),
                "console  * OK".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_other_topics_are_only_printed() {
        let (mut bridge, events) = bridge(IdleSource, 200);

        let outcome = bridge
            .handle(Message::new("/1wire/10A2B3C4D5E6F708/temperature", "19.0"))
            .await
            .unwrap();

        assert_eq!(outcome, None);
        assert_eq!(
            snapshot(&events),
            vec!["console /1wire/10A2B3C4D5E6F708/temperature: 19.0".to_string()]
        );
    }

    #[tokio::test]
    async fn test_error_status_is_printed() {
        let (mut bridge, events) = bridge(IdleSource, 500);

        let outcome = bridge.handle(Message::new(ROUTED, "21.375")).await.unwrap();

        assert_eq!(outcome, Some(ForwardOutcome { status: 500 }));
        assert_eq!(snapshot(&events).last().unwrap(), "console  * FAILED (500)");
    }

    #[tokio::test]
    async fn test_forward_failure_does_not_stop_the_bridge() {
        let console = ConsoleReporter::new(Vec::new());
        let mut bridge = Bridge::new(IdleSource, FailingForwarder, Route::new(ROUTED, TARGET), console);

        assert_eq!(bridge.handle(Message::new(ROUTED, "21.375")).await.unwrap(), None);
        assert_eq!(bridge.handle(Message::new(ROUTED, "21.5")).await.unwrap(), None);

        let output = String::from_utf8(bridge.console().get_ref().clone()).unwrap();
        assert_eq!(output.matches(" * ERROR: connection refused").count(), 2);
    }

    #[tokio::test]
    async fn test_same_value_is_forwarded_every_time() {
        let (mut bridge, events) = bridge(IdleSource, 200);

        bridge.handle(Message::new(ROUTED, "21.375")).await.unwrap();
        bridge.handle(Message::new(ROUTED, "21.375")).await.unwrap();

        let forwards = snapshot(&events)
            .into_iter()
            .filter(|e| e.starts_with("forward"))
            .count();
        assert_eq!(forwards, 2);
    }

    #[tokio::test]
    async fn test_run_prints_every_message_before_forwarding() {
        let source = ScriptedSource::new(&[
            ("/1wire/10A2B3C4D5E6F708/temperature", "19.0"),
            (ROUTED, "21.375"),
            ("/1wire/28537FEE02000078/humidity", "40"),
        ]);
        let (bridge, events) = bridge(source, 200);

        let err = bridge.run(std::future::pending::<()>()).await.unwrap_err();

        assert_eq!(err.to_string(), "connection closed");
        assert_eq!(
            snapshot(&events),
            vec![
                "console /1wire/10A2B3C4D5E6F708/temperature: 19.0".to_string(),
                format!("console {ROUTED}: 21.375"),
                "forward 42662/1 21.375".to_string(),
                "console  * OK".to_string(),
                "console /1wire/28537FEE02000078/humidity: 40".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_returns_on_shutdown() {
        let (bridge, events) = bridge(IdleSource, 200);

        bridge.run(async {}).await.unwrap();

        assert!(snapshot(&events).is_empty());
    }
}
