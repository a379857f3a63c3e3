//! Health and round-status endpoints (operational, outside the envelope).

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::AppState;
use crate::VERSION;

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let (round, _) = state.store.current_round().unwrap_or((0, 0));

    Json(serde_json::json!({
        "status": "healthy",
        "version": VERSION,
        "round": round,
        "participants": state.store.participant_count(),
        "round_period_secs": state.config.round_period_secs,
    }))
}

/// GET /round — the open round plus clock statistics
pub async fn round_handler(State(state): State<AppState>) -> Json<Value> {
    let (round, started_at) = state.store.current_round().unwrap_or((0, 0));
    let pool = state.store.prize_pool().unwrap_or(0);
    let open_wagers = state.store.open_wagers().map(|w| w.len()).unwrap_or(0);

    Json(serde_json::json!({
        "round": round,
        "started_at": started_at,
        "period_secs": state.config.round_period_secs,
        "pool": pool,
        "open_wagers": open_wagers,
        "clock": state.scheduler.stats(),
    }))
}
