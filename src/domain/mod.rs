//! Domain layer - chain-agnostic browsing, forms and session state
//!
//! Nothing here touches the terminal; I/O goes through the `ChainService`
//! trait so the engines run the same against HTTP or memory.

pub mod abi;
pub mod error;
pub mod network;
pub mod session;
pub mod symbol;
pub mod table;

pub use error::{ExplorerError, ExplorerResult};
pub use network::{KnownHosts, Network};
