//! Voting route handlers
//!
//! Thin adapters from HTTP to the session store. Authorization and phase
//! rules are enforced by the engine; handlers only validate request shape.

use crate::auth::Caller;
use crate::error::{validation_error, ApiResult};
use crate::models::{
    CallerResponse, CastVoteRequest, EventsQuery, EventsResponse, PhaseResponse,
    ProposalListResponse, ProposalResponse, ProposalSubmittedResponse, RegisterVoterRequest,
    StatusResponse, SubmitProposalRequest, SuccessResponse, VoterResponse,
};
use crate::state::SharedState;
use crate::voting::{Identity, Transition};
use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use validator::Validate;

// =============================================================================
// PUBLIC
// =============================================================================

/// Current workflow status, winner included once tallied
pub async fn get_status(State(state): State<SharedState>) -> Json<SuccessResponse<StatusResponse>> {
    let status = state.session.status().await;
    Json(SuccessResponse::with_data(
        format!("Session is in phase {}", status.phase),
        StatusResponse { status },
    ))
}

/// Notification log
pub async fn list_events(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> Json<SuccessResponse<EventsResponse>> {
    let events = state.session.events_since(query.since).await;
    Json(SuccessResponse::with_data(
        format!("{} event(s)", events.len()),
        EventsResponse { events },
    ))
}

// =============================================================================
// WORKFLOW
// =============================================================================

/// Apply a phase transition (administrator only)
pub async fn advance_workflow(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(transition): Path<Transition>,
) -> ApiResult<Json<SuccessResponse<PhaseResponse>>> {
    debug!("Transition {:?} requested by {}", transition, caller.identity());
    let phase = state.session.advance(caller.identity(), transition).await?;
    Ok(Json(SuccessResponse::with_data(
        format!("Workflow moved to {}", phase),
        PhaseResponse {
            phase,
            phase_index: phase.index(),
        },
    )))
}

/// Who the caller is to this session
pub async fn whoami(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
) -> Json<SuccessResponse<CallerResponse>> {
    let role = state.session.role_of(caller.identity()).await;
    Json(SuccessResponse::with_data(
        format!("Caller is {}", role),
        CallerResponse {
            identity: caller.identity().to_string(),
            role,
        },
    ))
}

// =============================================================================
// VOTERS
// =============================================================================

/// Register a voter (administrator only)
pub async fn register_voter(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<RegisterVoterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<()>>)> {
    let Json(payload) = payload?;
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let identity = Identity::new(payload.identity);
    state
        .session
        .register_voter(caller.identity(), identity.clone())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::message_only(format!(
            "Voter {} registered",
            identity
        ))),
    ))
}

/// Look up a voter record; unknown identities yield an empty record
pub async fn get_voter(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(identity): Path<String>,
) -> ApiResult<Json<SuccessResponse<VoterResponse>>> {
    let voter = state
        .session
        .get_voter(caller.identity(), &Identity::new(identity))
        .await?;
    Ok(Json(SuccessResponse::with_data(
        "Voter retrieved",
        VoterResponse { voter },
    )))
}

// =============================================================================
// PROPOSALS
// =============================================================================

pub async fn submit_proposal(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<SubmitProposalRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ProposalSubmittedResponse>>)> {
    let Json(payload) = payload?;
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let proposal_id = state
        .session
        .submit_proposal(caller.identity(), &payload.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            format!("Proposal {} registered", proposal_id),
            ProposalSubmittedResponse { proposal_id },
        )),
    ))
}

pub async fn get_proposal(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(proposal_id): Path<usize>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    let proposal = state
        .session
        .get_proposal(caller.identity(), proposal_id)
        .await?;
    Ok(Json(SuccessResponse::with_data(
        "Proposal retrieved",
        ProposalResponse {
            proposal_id,
            proposal,
        },
    )))
}

pub async fn list_proposals(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<SuccessResponse<ProposalListResponse>>> {
    let proposals = state.session.list_proposals(caller.identity()).await?;
    let proposals: Vec<ProposalResponse> = proposals
        .into_iter()
        .enumerate()
        .map(|(proposal_id, proposal)| ProposalResponse {
            proposal_id,
            proposal,
        })
        .collect();
    Ok(Json(SuccessResponse::with_data(
        format!("{} proposal(s)", proposals.len()),
        ProposalListResponse { proposals },
    )))
}

// =============================================================================
// VOTES
// =============================================================================

pub async fn cast_vote(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse<()>>> {
    let Json(payload) = payload?;
    state
        .session
        .cast_vote(caller.identity(), payload.proposal_id)
        .await?;
    Ok(Json(SuccessResponse::message_only(format!(
        "Vote recorded for proposal {}",
        payload.proposal_id
    ))))
}
