//! Ballot Engine - single-authority voting workflow
//!
//! One administrator drives a session through four stages while registered
//! voters take part:
//! - Stage 1 (Registration): the administrator registers voters
//! - Stage 2 (Proposals): voters submit proposals
//! - Stage 3 (Voting): each voter casts exactly one vote
//! - Stage 4 (Tally): the most voted proposal wins, lowest ID on ties
//!
//! The engine itself is [`voting::Session`]; everything else exposes it over
//! HTTP. The session lives in memory for the lifetime of the process.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod voting;
