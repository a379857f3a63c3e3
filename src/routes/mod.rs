// ============================================================================
// HTTP ROUTES — betting gateway
// ============================================================================
//
// Route organization:
// - bet.rs:    balance query / wager placement / open wagers / prize pool
// - status.rs: health + round status (plain JSON, outside the envelope)
//
// Betting endpoints answer HTTP 200 unconditionally and signal failure
// through the envelope's status/msg fields; clients key off those, not
// off HTTP status codes.
// ============================================================================

pub mod bet;
pub mod status;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::Value;

use crate::config::LotteryConfig;
use crate::error::LotteryError;
use crate::round::SharedScheduler;
use crate::storage::LedgerStore;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: LedgerStore,
    pub scheduler: SharedScheduler,
    pub config: Arc<LotteryConfig>,
}

/// Uniform response envelope: `{status, msg, data}`.
///
/// `data` is `[]` when there is no payload, matching the wire format
/// clients already parse.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    pub msg: String,
    pub data: Value,
}

impl Envelope {
    pub fn ok(data: impl Serialize) -> Self {
        Self {
            status: "ok",
            msg: String::new(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    pub fn failed(err: &LotteryError) -> Self {
        Self {
            status: "failed",
            msg: err.to_string(),
            data: Value::Array(Vec::new()),
        }
    }
}

/// Build the gateway router over the shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/bet", get(bet::open_wagers_handler))
        .route("/bet/{participant}", get(bet::balance_handler))
        .route("/bet/{participant}/{amount}", get(bet::place_bet_handler))
        .route("/prize", get(bet::prize_handler))
        .route("/health", get(status::health_handler))
        .route("/round", get(status::round_handler))
        .with_state(state)
}
