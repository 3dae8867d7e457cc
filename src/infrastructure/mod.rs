//! Infrastructure layer - external service integrations
//!
//! - nodeos HTTP client and an in-memory chain (`chain`)
//! - Tokio runtime bridge for async requests (`runtime`)

pub mod chain;
pub mod runtime;

pub use chain::{HttpChainService, MemoryChainService};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
