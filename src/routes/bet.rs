//! Betting endpoints: balance query, wager placement, open wagers, prize pool.

use axum::extract::{Path, State};
use axum::Json;
use tracing::{info, warn};

use super::{AppState, Envelope};
use crate::error::LotteryError;
use crate::storage::Participant;

/// GET /bet/{participant} — balance query; first sight registers the id
/// with the starting balance (no password, the id is the account)
pub async fn balance_handler(
    State(state): State<AppState>,
    Path(participant): Path<String>,
) -> Json<Envelope> {
    match state.store.balance_or_register(&participant) {
        Ok(balance) => Json(Envelope::ok(Participant { id: participant, balance })),
        Err(e) => {
            warn!(participant = %participant, error = %e, "Balance query failed");
            Json(Envelope::failed(&e))
        }
    }
}

/// GET /bet/{participant}/{amount} — stake `amount` on the open round.
///
/// The amount segment is parsed here so a malformed value comes back as a
/// normal envelope failure, not a routing error.
pub async fn place_bet_handler(
    State(state): State<AppState>,
    Path((participant, amount)): Path<(String, String)>,
) -> Json<Envelope> {
    let amount = match amount.parse::<u64>() {
        Ok(v) => v,
        Err(_) => return Json(Envelope::failed(&LotteryError::InvalidAmount)),
    };

    match state.store.place_wager(&participant, amount) {
        Ok(placed) => {
            info!(
                participant = %participant,
                amount,
                round = placed.round,
                staked = placed.staked,
                "💰 Wager accepted"
            );
            Json(Envelope::ok(Participant { id: participant, balance: placed.balance }))
        }
        Err(e) => {
            if let LotteryError::Store(_) = e {
                warn!(participant = %participant, error = %e, "Wager failed on store");
            }
            Json(Envelope::failed(&e))
        }
    }
}

/// GET /bet — every open wager in the current round, or a failure envelope
/// when nobody has bet yet
pub async fn open_wagers_handler(State(state): State<AppState>) -> Json<Envelope> {
    match state.store.open_wagers() {
        Ok(wagers) if wagers.is_empty() => Json(Envelope::failed(&LotteryError::EmptyRound)),
        Ok(wagers) => Json(Envelope::ok(wagers)),
        Err(e) => {
            warn!(error = %e, "Open wager listing failed");
            Json(Envelope::failed(&e))
        }
    }
}

/// GET /prize — the pool currently at stake (sum of all open wagers)
pub async fn prize_handler(State(state): State<AppState>) -> Json<Envelope> {
    match state.store.prize_pool() {
        Ok(pool) => Json(Envelope::ok(pool)),
        Err(e) => {
            warn!(error = %e, "Prize pool query failed");
            Json(Envelope::failed(&e))
        }
    }
}
