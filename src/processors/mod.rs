pub mod processor;
pub mod common;
pub mod input;
pub mod transform;
pub mod output;

pub use processor::{ForwardOutcome, Forwarder, MessageSource};
