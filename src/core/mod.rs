pub mod bridge;
pub mod message;
pub mod shutdown;

pub use bridge::Bridge;
