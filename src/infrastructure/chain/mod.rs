//! Chain API clients

mod http;
mod memory;

pub use http::{build_client, HttpChainService, DEFAULT_REQUEST_TIMEOUT_MS};
pub use memory::MemoryChainService;
