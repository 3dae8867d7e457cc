//! Selection state, request tickets and location paths

mod location;
mod request;
mod state;

pub use location::{Location, View};
pub use request::{settle, Outcome, Request, RequestKind, Response, Ticket};
pub use state::{Phase, RowsState, Selection, Session, SessionSettings};
