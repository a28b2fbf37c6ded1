pub mod mqtt;

pub use mqtt::BusListener;
