//! Runtime infrastructure - Tokio runtime bridge for chain requests

mod bridge;
mod worker;

pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
