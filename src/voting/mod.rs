//! Voting module - the workflow engine
//!
//! One administrator moves a session through registration, proposals,
//! voting and tally; registered voters submit proposals and vote.

mod models;
mod session;
mod store;
mod workflow;

pub use models::*;
pub use session::{Session, VotingResult};
pub use store::SessionStore;
pub use workflow::{Operation, Transition};
