//! Jackpot — round-based pooled lottery server.
//!
//! Participants bet during a fixed betting window; when the window closes a
//! background clock draws one winner with probability proportional to their
//! stake and pays out the whole pool.
//!
//! ## Architecture
//!
//! - **Storage**: ReDB (ACID, single-writer MVCC) + DashMap balance cache
//! - **Server**: Axum, uniform `{status, msg, data}` envelope
//! - **Clock**: one tokio interval task; resolution is a single atomic
//!   transaction, so a failed payout never drops the pool

pub mod config;
pub mod draw;
pub mod error;
pub mod round;
pub mod routes;
pub mod storage;

pub use config::LotteryConfig;
pub use draw::pick_winner;
pub use error::{LotteryError, LotteryResult};
pub use round::{RoundScheduler, SchedulerStats, SharedScheduler};
pub use routes::{AppState, Envelope};
pub use storage::{LedgerStore, Participant, PlacedWager, RoundOutcome, WagerEntry};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
