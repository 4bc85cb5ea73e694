//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains all request/response structures used by the API.

use crate::voting::{EventRecord, Phase, Proposal, Role, SessionStatus, Voter};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use validator::Validate;

static IDENTITY_RE: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:@-]{0,127}$").expect("identity pattern is valid")
});

/// Identities are 1-128 characters: letters, digits and `_ . : @ -`, not starting with punctuation
pub fn is_valid_identity(value: &str) -> bool {
    IDENTITY_RE.is_match(value)
}

fn validate_identity(value: &str) -> Result<(), validator::ValidationError> {
    if !is_valid_identity(value) {
        let mut err = validator::ValidationError::new("invalid_identity");
        err.message = Some("Identity must be 1-128 characters of letters, digits, '_', '.', ':', '@' or '-'".into());
        return Err(err);
    }
    Ok(())
}

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl SuccessResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Request to register a voter
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVoterRequest {
    #[validate(custom(function = "validate_identity"))]
    pub identity: String,
}

/// Request to submit a proposal. Emptiness is the engine's call, not validation's.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProposalRequest {
    #[validate(length(max = 4096, message = "Proposal description must be at most 4096 characters"))]
    pub description: String,
}

/// Request to cast a vote
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub proposal_id: usize,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterResponse {
    pub voter: Voter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub proposal_id: usize,
    pub proposal: Proposal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSubmittedResponse {
    pub proposal_id: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResponse {
    pub phase: Phase,
    pub phase_index: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: SessionStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerResponse {
    pub identity: String,
    pub role: Role,
}
