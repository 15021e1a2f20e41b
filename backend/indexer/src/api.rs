//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::{IndexerError, Result};
use crate::events::{status_name, ContributionRecord, EventRecord, PoolSnapshot};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/pool", get(get_pool))
        .route("/participants", get(get_participants))
        .route("/participants/:address", get(get_participant))
        .route("/participants/:address/events", get(get_participant_events))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ParticipantEventsResponse {
    pub address: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct PoolResponse {
    #[serde(flatten)]
    pub snapshot: PoolSnapshot,
    pub status_name: &'static str,
}

#[derive(Serialize)]
pub struct ParticipantsResponse {
    pub count: usize,
    pub participants: Vec<ContributionRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
///
/// Returns all indexed events for the pool.
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<AllEventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /pool`
///
/// The projected pool record. 404 until the pool's `init` event is indexed.
pub async fn get_pool(State(state): State<Arc<ApiState>>) -> Result<Json<PoolResponse>> {
    let snapshot = db::get_pool_snapshot(&state.pool)
        .await?
        .ok_or_else(|| IndexerError::NotFound("pool has not been indexed yet".to_string()))?;
    Ok(Json(PoolResponse {
        status_name: status_name(snapshot.status),
        snapshot,
    }))
}

/// `GET /participants`
pub async fn get_participants(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ParticipantsResponse>> {
    let participants = db::get_contributions(&state.pool).await?;
    Ok(Json(ParticipantsResponse {
        count: participants.len(),
        participants,
    }))
}

/// `GET /participants/:address`
pub async fn get_participant(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> Result<Json<ContributionRecord>> {
    db::get_contribution(&state.pool, &address)
        .await?
        .map(Json)
        .ok_or_else(|| IndexerError::NotFound(format!("no contribution from {address}")))
}

/// `GET /participants/:address/events`
///
/// Every indexed event whose actor is `address`.
pub async fn get_participant_events(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> Result<Json<ParticipantEventsResponse>> {
    let events = db::get_events_for_actor(&state.pool, &address).await?;
    Ok(Json(ParticipantEventsResponse {
        address,
        count: events.len(),
        events,
    }))
}
