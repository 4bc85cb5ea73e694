//! Session storage
//!
//! Thread-safe handle around the single in-memory session. Mutations hold the
//! write lock for the whole call, so concurrent callers are serialized and
//! each operation applies completely or not at all.

use crate::error::VotingError;
use crate::voting::models::{EventRecord, Identity, Phase, Proposal, Role, SessionStatus, Voter};
use crate::voting::session::{Session, VotingResult};
use crate::voting::workflow::Transition;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared session store
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<RwLock<Session>>,
}

impl SessionStore {
    pub fn new(administrator: Identity) -> Self {
        let session = Session::new(administrator);
        info!(
            "Opened voting session {} (administrator: {})",
            session.id(),
            session.administrator()
        );
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Register a voter (administrator only)
    pub async fn register_voter(&self, caller: &Identity, identity: Identity) -> VotingResult<()> {
        let mut session = self.session.write().await;
        let result = session.register_voter(caller, identity.clone());
        log_outcome("register_voter", caller, &result);
        if result.is_ok() {
            info!("Registered voter {}", identity);
        }
        result.map(|receipt| receipt.value)
    }

    /// Submit a proposal and return its ID
    pub async fn submit_proposal(&self, caller: &Identity, description: &str) -> VotingResult<usize> {
        let mut session = self.session.write().await;
        let result = session.submit_proposal(caller, description);
        log_outcome("submit_proposal", caller, &result);
        result.map(|receipt| receipt.value)
    }

    pub async fn cast_vote(&self, caller: &Identity, proposal_id: usize) -> VotingResult<()> {
        let mut session = self.session.write().await;
        let result = session.cast_vote(caller, proposal_id);
        log_outcome("cast_vote", caller, &result);
        result.map(|receipt| receipt.value)
    }

    /// Apply a workflow transition and return the new phase
    pub async fn advance(&self, caller: &Identity, transition: Transition) -> VotingResult<Phase> {
        let mut session = self.session.write().await;
        let result = session.advance(caller, transition);
        log_outcome(transition.operation().as_str(), caller, &result);
        if let Ok(receipt) = &result {
            info!("Workflow moved to {}", receipt.value);
            if receipt.value == Phase::VotesTallied {
                info!("Votes tallied, winning proposal: {:?}", session.winning_proposal_id());
            }
        }
        result.map(|receipt| receipt.value)
    }

    pub async fn get_voter(&self, caller: &Identity, identity: &Identity) -> VotingResult<Voter> {
        let session = self.session.read().await;
        session.get_voter(caller, identity)
    }

    pub async fn get_proposal(&self, caller: &Identity, proposal_id: usize) -> VotingResult<Proposal> {
        let session = self.session.read().await;
        session.get_proposal(caller, proposal_id)
    }

    pub async fn list_proposals(&self, caller: &Identity) -> VotingResult<Vec<Proposal>> {
        let session = self.session.read().await;
        session.list_proposals(caller)
    }

    pub async fn role_of(&self, identity: &Identity) -> Role {
        let session = self.session.read().await;
        session.role_of(identity)
    }

    pub async fn status(&self) -> SessionStatus {
        let session = self.session.read().await;
        session.status()
    }

    /// Notification log from `since` onwards, oldest first
    pub async fn events_since(&self, since: u64) -> Vec<EventRecord> {
        let session = self.session.read().await;
        session.events_since(since).to_vec()
    }
}

fn log_outcome<T>(operation: &str, caller: &Identity, result: &Result<T, VotingError>) {
    match result {
        Ok(_) => info!(operation, caller = %caller, "Operation accepted"),
        Err(e) => warn!(operation, caller = %caller, code = e.code(), "Operation rejected: {}", e),
    }
}
