//! Workflow rules
//!
//! Which phase each phase-gated operation requires, and where the
//! administrator transitions lead. The whole state machine lives in
//! [`PHASE_RULES`].

use crate::voting::models::Phase;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase-gated engine operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    RegisterVoter,
    StartProposalsRegistering,
    SubmitProposal,
    EndProposalsRegistering,
    StartVotingSession,
    CastVote,
    EndVotingSession,
    TallyVotes,
}

/// A rule row: operation, phase it requires, phase it moves the session to
pub struct PhaseRule {
    pub operation: Operation,
    pub requires: Phase,
    pub advances_to: Option<Phase>,
}

pub const PHASE_RULES: [PhaseRule; 8] = [
    PhaseRule {
        operation: Operation::RegisterVoter,
        requires: Phase::RegisteringVoters,
        advances_to: None,
    },
    PhaseRule {
        operation: Operation::StartProposalsRegistering,
        requires: Phase::RegisteringVoters,
        advances_to: Some(Phase::ProposalsRegistrationStarted),
    },
    PhaseRule {
        operation: Operation::SubmitProposal,
        requires: Phase::ProposalsRegistrationStarted,
        advances_to: None,
    },
    PhaseRule {
        operation: Operation::EndProposalsRegistering,
        requires: Phase::ProposalsRegistrationStarted,
        advances_to: Some(Phase::ProposalsRegistrationEnded),
    },
    PhaseRule {
        operation: Operation::StartVotingSession,
        requires: Phase::ProposalsRegistrationEnded,
        advances_to: Some(Phase::VotingSessionStarted),
    },
    PhaseRule {
        operation: Operation::CastVote,
        requires: Phase::VotingSessionStarted,
        advances_to: None,
    },
    PhaseRule {
        operation: Operation::EndVotingSession,
        requires: Phase::VotingSessionStarted,
        advances_to: Some(Phase::VotingSessionEnded),
    },
    PhaseRule {
        operation: Operation::TallyVotes,
        requires: Phase::VotingSessionEnded,
        advances_to: Some(Phase::VotesTallied),
    },
];

impl Operation {
    fn rule(self) -> &'static PhaseRule {
        // Rows are laid out in variant order
        &PHASE_RULES[self as usize]
    }

    pub fn required_phase(self) -> Phase {
        self.rule().requires
    }

    pub fn next_phase(self) -> Option<Phase> {
        self.rule().advances_to
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::RegisterVoter => "register_voter",
            Operation::StartProposalsRegistering => "start_proposals_registering",
            Operation::SubmitProposal => "submit_proposal",
            Operation::EndProposalsRegistering => "end_proposals_registering",
            Operation::StartVotingSession => "start_voting_session",
            Operation::CastVote => "cast_vote",
            Operation::EndVotingSession => "end_voting_session",
            Operation::TallyVotes => "tally_votes",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrator-driven phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    StartProposalsRegistering,
    EndProposalsRegistering,
    StartVotingSession,
    EndVotingSession,
    TallyVotes,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Transition::StartProposalsRegistering,
        Transition::EndProposalsRegistering,
        Transition::StartVotingSession,
        Transition::EndVotingSession,
        Transition::TallyVotes,
    ];

    pub fn operation(self) -> Operation {
        match self {
            Transition::StartProposalsRegistering => Operation::StartProposalsRegistering,
            Transition::EndProposalsRegistering => Operation::EndProposalsRegistering,
            Transition::StartVotingSession => Operation::StartVotingSession,
            Transition::EndVotingSession => Operation::EndVotingSession,
            Transition::TallyVotes => Operation::TallyVotes,
        }
    }

    pub fn from_phase(self) -> Phase {
        self.operation().required_phase()
    }

    pub fn to_phase(self) -> Phase {
        self.operation()
            .next_phase()
            .unwrap_or_else(|| self.from_phase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rules_follow_variant_order() {
        for (i, rule) in PHASE_RULES.iter().enumerate() {
            assert_eq!(rule.operation as usize, i, "rule out of place: {}", rule.operation);
        }
    }

    #[test]
    fn test_transitions_form_linear_chain() {
        let mut phase = Phase::RegisteringVoters;
        for transition in Transition::ALL {
            assert_eq!(transition.from_phase(), phase);
            let next = transition.to_phase();
            assert_eq!(next.index(), phase.index() + 1);
            phase = next;
        }
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_only_transitions_advance() {
        assert_eq!(Operation::RegisterVoter.next_phase(), None);
        assert_eq!(Operation::SubmitProposal.next_phase(), None);
        assert_eq!(Operation::CastVote.next_phase(), None);
        assert_eq!(
            Operation::SubmitProposal.required_phase(),
            Phase::ProposalsRegistrationStarted
        );
        assert_eq!(Operation::CastVote.required_phase(), Phase::VotingSessionStarted);
    }

    #[test]
    fn test_transition_path_names() {
        let parsed: Transition = serde_json::from_str("\"start-voting-session\"").unwrap();
        assert_eq!(parsed, Transition::StartVotingSession);
    }
}
