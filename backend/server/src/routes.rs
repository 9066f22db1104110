use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{self, Path, rejection::JsonRejection},
    http::StatusCode,
};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    branch::Branch,
    envelope::Envelope,
    error::AppError,
    models::{Answer, Candidate, CandidateRequest, LeaderboardEntry, QUESTION_COUNT},
    state::State,
    utils::{decode_all, group_answers, randomize},
};

#[derive(Serialize)]
struct Candidates {
    candidates: Vec<Candidate>,
}

#[derive(Serialize)]
struct Answers {
    answers: [Vec<Answer>; QUESTION_COUNT],
}

#[derive(Serialize)]
struct Leaderboard {
    leaderboard: Vec<LeaderboardEntry>,
}

/// All candidates of the branch, in a fresh random order on every call.
pub async fn candidates_handler(
    extract::State(state): extract::State<Arc<State>>,
    Extension(branch): Extension<Branch>,
) -> Result<Envelope, AppError> {
    let documents = state.store.find_all(branch).await?;

    let mut candidates: Vec<Candidate> = decode_all(documents, "candidate")?;
    randomize(&mut candidates);

    Ok(Envelope::success(Candidates { candidates }))
}

pub async fn create_candidate_handler(
    extract::State(state): extract::State<Arc<State>>,
    Extension(branch): Extension<Branch>,
    payload: Result<Json<CandidateRequest>, JsonRejection>,
) -> Result<(StatusCode, Envelope), AppError> {
    let Json(request) = payload.map_err(|e| {
        debug!("Malformed candidate body: {e}");
        AppError::MalformedPayload
    })?;

    let candidate = request.validate()?;
    let id = candidate.id;

    state
        .store
        .insert(branch, candidate.into_document())
        .await?;
    info!("Created candidate {id} in {branch}");

    Ok((StatusCode::CREATED, Envelope::empty()))
}

/// Adds exactly one vote. An id that matches nothing still succeeds.
pub async fn votes_handler(
    extract::State(state): extract::State<Arc<State>>,
    Extension(branch): Extension<Branch>,
    Path((_, id)): Path<(String, String)>,
) -> Result<Envelope, AppError> {
    let id = ObjectId::parse_str(&id).map_err(|_| AppError::MalformedId)?;

    let matched = state.store.increment_votes(branch, id).await?;
    if matched == 0 {
        debug!("Vote for {id} in {branch} matched no candidate");
    }

    Ok(Envelope::empty())
}

/// Answers grouped by question, each group shuffled on its own.
pub async fn answers_handler(
    extract::State(state): extract::State<Arc<State>>,
    Extension(branch): Extension<Branch>,
) -> Result<Envelope, AppError> {
    let documents = state.store.find_all(branch).await?;
    let candidates: Vec<Candidate> = decode_all(documents, "candidate")?;

    let mut answers = group_answers(&candidates);
    for bucket in answers.iter_mut() {
        randomize(bucket);
    }

    Ok(Envelope::success(Answers { answers }))
}

/// Candidates from most to least votes, ordered by the store.
pub async fn leaderboard_handler(
    extract::State(state): extract::State<Arc<State>>,
    Extension(branch): Extension<Branch>,
) -> Result<Envelope, AppError> {
    let documents = state.store.find_by_votes_desc(branch).await?;
    let leaderboard: Vec<LeaderboardEntry> = decode_all(documents, "leaderboard entry")?;

    Ok(Envelope::success(Leaderboard { leaderboard }))
}

pub async fn questions_handler() -> Result<Envelope, AppError> {
    Err(AppError::NotImplemented)
}
