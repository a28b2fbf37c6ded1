use crate::core::message::Message;
use crate::processors::ForwardOutcome;

use std::io::{self, Stdout, Write};

/// Prints the bridge's line-per-event console output.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// One line per message; a single trailing newline in the payload is not repeated.
    pub fn message(&mut self, message: &Message) -> io::Result<()> {
        let payload = message
            .payload
            .strip_suffix('\n')
            .unwrap_or(&message.payload);
        self.line(format_args!("{}: {}", message.topic, payload))
    }

    pub fn forwarded(&mut self, outcome: &ForwardOutcome) -> io::Result<()> {
        if outcome.is_success() {
            self.line(format_args!(" * OK"))
        } else {
            self.line(format_args!(" * FAILED ({})", outcome.status))
        }
    }

    pub fn failed(&mut self, error: &anyhow::Error) -> io::Result<()> {
        self.line(format_args!(" * ERROR: {error:#}"))
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.out, "{args}")?;
        self.out.flush()
    }
}
