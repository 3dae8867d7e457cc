//! Local persistence

mod history;

pub use history::{HistoryEntry, HistoryStore};
