pub mod console;
pub mod feed;

pub use console::ConsoleReporter;
pub use feed::FeedForwarder;
