//! Feature modules
//!
//! - export: CSV/JSON dumps of the rows on screen

pub mod export;
