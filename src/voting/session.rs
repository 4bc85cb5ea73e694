//! Voting session
//!
//! The engine proper. A `Session` owns the voter and proposal registries and
//! the workflow phase. Every operation takes the caller identity, runs its
//! capability and phase checks first, and only then mutates, so a failed
//! call leaves the session exactly as it was.

use crate::error::VotingError;
use crate::voting::models::{
    Event, EventRecord, Identity, Phase, Proposal, Receipt, Role, SessionStatus, Voter,
};
use crate::voting::workflow::{Operation, Transition};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

pub type VotingResult<T> = Result<T, VotingError>;

pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    administrator: Identity,
    phase: Phase,
    voters: HashMap<Identity, Voter>,
    proposals: Vec<Proposal>,
    winning_proposal_id: Option<usize>,
    log: Vec<EventRecord>,
}

impl Session {
    /// Open a session in `RegisteringVoters`, driven by `administrator`
    pub fn new(administrator: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            administrator,
            phase: Phase::RegisteringVoters,
            voters: HashMap::new(),
            proposals: Vec::new(),
            winning_proposal_id: None,
            log: Vec::new(),
        }
    }

    // =========================================================================
    // ACCESS CONTROL
    // =========================================================================

    pub fn role_of(&self, identity: &Identity) -> Role {
        if *identity == self.administrator {
            Role::Administrator
        } else if self.is_voter(identity) {
            Role::Voter
        } else {
            Role::Outsider
        }
    }

    pub fn is_voter(&self, identity: &Identity) -> bool {
        self.voters
            .get(identity)
            .map(|v| v.is_registered)
            .unwrap_or(false)
    }

    fn require_administrator(&self, caller: &Identity) -> VotingResult<()> {
        if *caller != self.administrator {
            return Err(VotingError::Unauthorized {
                required: Role::Administrator,
            });
        }
        Ok(())
    }

    fn require_voter(&self, caller: &Identity) -> VotingResult<()> {
        if !self.is_voter(caller) {
            return Err(VotingError::Unauthorized {
                required: Role::Voter,
            });
        }
        Ok(())
    }

    fn require_phase(&self, operation: Operation) -> VotingResult<()> {
        let expected = operation.required_phase();
        if self.phase != expected {
            return Err(VotingError::InvalidPhase {
                operation,
                expected,
                current: self.phase,
            });
        }
        Ok(())
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    pub fn register_voter(
        &mut self,
        caller: &Identity,
        identity: Identity,
    ) -> VotingResult<Receipt<()>> {
        self.require_administrator(caller)?;
        self.require_phase(Operation::RegisterVoter)?;
        if self.voters.contains_key(&identity) {
            return Err(VotingError::AlreadyRegistered(identity));
        }

        self.voters.insert(identity.clone(), Voter::registered());
        let events = self.emit(vec![Event::VoterRegistered {
            voter_address: identity,
        }]);
        Ok(Receipt::new((), events))
    }

    pub fn get_voter(&self, caller: &Identity, identity: &Identity) -> VotingResult<Voter> {
        self.require_voter(caller)?;
        Ok(self.voters.get(identity).cloned().unwrap_or_default())
    }

    // =========================================================================
    // PROPOSALS
    // =========================================================================

    /// Returns the new proposal's ID
    pub fn submit_proposal(
        &mut self,
        caller: &Identity,
        description: &str,
    ) -> VotingResult<Receipt<usize>> {
        self.require_voter(caller)?;
        self.require_phase(Operation::SubmitProposal)?;
        if description.is_empty() {
            return Err(VotingError::EmptyProposal);
        }

        let proposal_id = self.proposals.len();
        self.proposals.push(Proposal::new(description));
        let events = self.emit(vec![Event::ProposalRegistered { proposal_id }]);
        Ok(Receipt::new(proposal_id, events))
    }

    pub fn get_proposal(&self, caller: &Identity, proposal_id: usize) -> VotingResult<Proposal> {
        self.require_voter(caller)?;
        self.proposals
            .get(proposal_id)
            .cloned()
            .ok_or(VotingError::NotFound(proposal_id))
    }

    pub fn list_proposals(&self, caller: &Identity) -> VotingResult<Vec<Proposal>> {
        self.require_voter(caller)?;
        Ok(self.proposals.clone())
    }

    // =========================================================================
    // VOTING
    // =========================================================================

    pub fn cast_vote(&mut self, caller: &Identity, proposal_id: usize) -> VotingResult<Receipt<()>> {
        self.require_voter(caller)?;
        self.require_phase(Operation::CastVote)?;
        if self.voters.get(caller).map(|v| v.has_voted).unwrap_or(false) {
            return Err(VotingError::AlreadyVoted(caller.clone()));
        }
        if proposal_id >= self.proposals.len() {
            return Err(VotingError::NotFound(proposal_id));
        }

        if let Some(voter) = self.voters.get_mut(caller) {
            voter.has_voted = true;
            voter.voted_proposal_id = Some(proposal_id);
        }
        self.proposals[proposal_id].vote_count += 1;

        let events = self.emit(vec![Event::Voted {
            voter: caller.clone(),
            proposal_id,
        }]);
        Ok(Receipt::new((), events))
    }

    // =========================================================================
    // WORKFLOW
    // =========================================================================

    /// Apply any administrator transition; `TallyVotes` also computes the winner
    pub fn advance(&mut self, caller: &Identity, transition: Transition) -> VotingResult<Receipt<Phase>> {
        if transition == Transition::TallyVotes {
            return self
                .tally_votes(caller)
                .map(|receipt| Receipt::new(self.phase, receipt.events));
        }
        self.require_administrator(caller)?;
        let events = self.transition(transition.operation())?;
        Ok(Receipt::new(self.phase, events))
    }

    pub fn start_proposals_registering(&mut self, caller: &Identity) -> VotingResult<Receipt<Phase>> {
        self.advance(caller, Transition::StartProposalsRegistering)
    }

    pub fn end_proposals_registering(&mut self, caller: &Identity) -> VotingResult<Receipt<Phase>> {
        self.advance(caller, Transition::EndProposalsRegistering)
    }

    pub fn start_voting_session(&mut self, caller: &Identity) -> VotingResult<Receipt<Phase>> {
        self.advance(caller, Transition::StartVotingSession)
    }

    pub fn end_voting_session(&mut self, caller: &Identity) -> VotingResult<Receipt<Phase>> {
        self.advance(caller, Transition::EndVotingSession)
    }

    /// Close the session and pick the winner: the highest vote count, lowest ID on ties.
    /// Returns `None` only when no proposal was ever submitted.
    pub fn tally_votes(&mut self, caller: &Identity) -> VotingResult<Receipt<Option<usize>>> {
        self.require_administrator(caller)?;
        self.require_phase(Operation::TallyVotes)?;

        let mut winner: Option<usize> = None;
        for (id, proposal) in self.proposals.iter().enumerate() {
            match winner {
                Some(best) if proposal.vote_count <= self.proposals[best].vote_count => {}
                _ => winner = Some(id),
            }
        }
        self.winning_proposal_id = winner;

        let events = self.transition(Operation::TallyVotes)?;
        Ok(Receipt::new(winner, events))
    }

    fn transition(&mut self, operation: Operation) -> VotingResult<Vec<Event>> {
        self.require_phase(operation)?;
        let previous = self.phase;
        let Some(next) = operation.next_phase() else {
            return Ok(Vec::new());
        };
        self.phase = next;
        debug!("Session {} moved {} -> {}", self.id, previous, next);
        Ok(self.emit(vec![Event::status_change(previous, next)]))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn administrator(&self) -> &Identity {
        &self.administrator
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winning_proposal_id(&self) -> Option<usize> {
        self.winning_proposal_id
    }

    pub fn voter_count(&self) -> usize {
        self.voters.len()
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    /// Sum of all proposal vote counts
    pub fn votes_cast(&self) -> u64 {
        self.proposals.iter().map(|p| p.vote_count).sum()
    }

    /// Number of voters whose vote has been recorded
    pub fn voters_who_voted(&self) -> usize {
        self.voters.values().filter(|v| v.has_voted).count()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id,
            administrator: self.administrator.clone(),
            phase: self.phase,
            phase_index: self.phase.index(),
            winning_proposal_id: self.winning_proposal_id,
            voter_count: self.voter_count(),
            proposal_count: self.proposal_count(),
            votes_cast: self.votes_cast(),
            created_at: self.created_at,
        }
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.log
    }

    /// Log entries with `sequence >= since`
    pub fn events_since(&self, since: u64) -> &[EventRecord] {
        let start = usize::try_from(since).unwrap_or(usize::MAX).min(self.log.len());
        &self.log[start..]
    }

    fn emit(&mut self, events: Vec<Event>) -> Vec<Event> {
        let now = Utc::now();
        for event in &events {
            self.log.push(EventRecord {
                sequence: self.log.len() as u64,
                emitted_at: now,
                event: event.clone(),
            });
        }
        events
    }
}
