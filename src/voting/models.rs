//! Voting data models
//!
//! Identities, workflow phases, registry records and the notifications the engine emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque participant identity (an address-like string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Workflow phase of the voting session
///
/// Variants are declared in workflow order, so the derived `Ord` is the
/// order in which a session moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    RegisteringVoters,
    ProposalsRegistrationStarted,
    ProposalsRegistrationEnded,
    VotingSessionStarted,
    VotingSessionEnded,
    VotesTallied,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::RegisteringVoters,
        Phase::ProposalsRegistrationStarted,
        Phase::ProposalsRegistrationEnded,
        Phase::VotingSessionStarted,
        Phase::VotingSessionEnded,
        Phase::VotesTallied,
    ];

    /// Numeric workflow status (0..=5), as emitted to external watchers
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::VotesTallied
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::RegisteringVoters
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::RegisteringVoters => "RegisteringVoters",
            Phase::ProposalsRegistrationStarted => "ProposalsRegistrationStarted",
            Phase::ProposalsRegistrationEnded => "ProposalsRegistrationEnded",
            Phase::VotingSessionStarted => "VotingSessionStarted",
            Phase::VotingSessionEnded => "VotingSessionEnded",
            Phase::VotesTallied => "VotesTallied",
        };
        f.write_str(name)
    }
}

/// Caller role, resolved against a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Drives phase transitions, registers voters, tallies
    Administrator,
    /// Registered participant
    Voter,
    /// Anyone else
    Outsider,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Administrator => write!(f, "the administrator"),
            Role::Voter => write!(f, "a registered voter"),
            Role::Outsider => write!(f, "an outsider"),
        }
    }
}

/// Voter registry record
///
/// `Default` is the zero-value record returned for unknown identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    pub is_registered: bool,
    pub has_voted: bool,
    pub voted_proposal_id: Option<usize>,
}

impl Voter {
    pub fn registered() -> Self {
        Self {
            is_registered: true,
            ..Self::default()
        }
    }
}

/// A candidate option; its ID is its index in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub description: String,
    pub vote_count: u64,
}

impl Proposal {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            vote_count: 0,
        }
    }
}

/// Notification emitted by a successful operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum Event {
    VoterRegistered {
        voter_address: Identity,
    },
    WorkflowStatusChange {
        previous_status: Phase,
        new_status: Phase,
        /// Numeric forms of the two phases, for watchers that track status by index
        previous_status_index: u8,
        new_status_index: u8,
    },
    ProposalRegistered {
        proposal_id: usize,
    },
    Voted {
        voter: Identity,
        proposal_id: usize,
    },
}

impl Event {
    pub fn status_change(previous: Phase, next: Phase) -> Self {
        Event::WorkflowStatusChange {
            previous_status: previous,
            new_status: next,
            previous_status_index: previous.index(),
            new_status_index: next.index(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::VoterRegistered { .. } => "VoterRegistered",
            Event::WorkflowStatusChange { .. } => "WorkflowStatusChange",
            Event::ProposalRegistered { .. } => "ProposalRegistered",
            Event::Voted { .. } => "Voted",
        }
    }
}

/// An event as recorded in the session log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Position in the log, starting at 0
    pub sequence: u64,
    pub emitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

/// Result of a successful mutating operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt<T> {
    pub value: T,
    /// Notifications emitted by this call, in order
    pub events: Vec<Event>,
}

impl<T> Receipt<T> {
    pub fn new(value: T, events: Vec<Event>) -> Self {
        Self { value, events }
    }
}

/// Summary view of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub session_id: uuid::Uuid,
    pub administrator: Identity,
    pub phase: Phase,
    pub phase_index: u8,
    pub winning_proposal_id: Option<usize>,
    pub voter_count: usize,
    pub proposal_count: usize,
    pub votes_cast: u64,
    pub created_at: DateTime<Utc>,
}
