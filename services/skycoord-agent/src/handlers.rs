use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use skycoord_engine::{dispatch, EngineError, Request};
use skycoord_roster::{write_roster, StoreError};
use std::sync::Arc;
use tracing::{error, info};

use crate::state::AppState;

/// Dispatch a coordination request against the roster store.
///
/// Mutating requests hold the store lock across dispatch and write-back, so
/// the tabular files on disk never diverge from a committed state.
pub async fn handle_request(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Request>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let is_mutation = request.is_mutation();
    let mut store = state.store.lock().await;

    let response = dispatch(&mut store, request, &state.config.matching)
        .map_err(|e| (error_status(&e), Json(json!({ "error": e.to_string() }))))?;

    if is_mutation {
        let snapshot = store.snapshot();
        write_roster(
            &snapshot,
            &state.config.roster.pilot_csv,
            &state.config.roster.drone_csv,
            &state.config.roster.mission_csv,
        )
        .map_err(|e| {
            error!("roster write-back failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("roster write-back failed: {}", e) })),
            )
        })?;
        info!("roster written back");
    }

    Ok(Json(json!({ "response": response })))
}

/// Full roster snapshot for dashboards and debugging.
pub async fn snapshot(State(state): State<Arc<AppState>>) -> Json<Value> {
    let store = state.store.lock().await;
    Json(json!({ "snapshot": store.snapshot() }))
}

fn error_status(error: &EngineError) -> StatusCode {
    match error {
        EngineError::UnknownMission(_) => StatusCode::NOT_FOUND,
        EngineError::PreemptionNotJustified { .. }
        | EngineError::NoEligibleOrReassignableResource(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Store(store_error) => match store_error {
            StoreError::UnknownPilot(_)
            | StoreError::UnknownDrone(_)
            | StoreError::UnknownMission(_) => StatusCode::NOT_FOUND,
            StoreError::AlreadyAssigned { .. }
            | StoreError::MissionClosed(_)
            | StoreError::NotAssigned(_)
            | StoreError::StaleProposal(_) => StatusCode::CONFLICT,
            StoreError::NotEligible { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::InvariantViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}
