//! Error taxonomy for the lottery core.
//!
//! Participant-facing rejections (`InvalidAmount`, `InsufficientFunds`,
//! `UnknownParticipant`, `EmptyRound`) never mutate state and are recovered
//! at the request boundary into the response envelope. `Store` wraps ReDB
//! failures: request handlers report it to the caller, the round clock logs
//! it and retries without advancing the round.

use thiserror::Error;

/// Result type for ledger and round operations
pub type LotteryResult<T> = Result<T, LotteryError>;

#[derive(Debug, Error)]
pub enum LotteryError {
    /// Wager amount failed to parse or was not a positive integer
    #[error("invalid amount")]
    InvalidAmount,

    /// Wager exceeds the participant's current balance
    #[error("insufficient funds")]
    InsufficientFunds { balance: u64, wanted: u64 },

    /// Wager from an id with no balance row (balance query registers it)
    #[error("unknown participant")]
    UnknownParticipant(String),

    /// Open-wager listing requested while the round has no bets
    #[error("no wagers this round")]
    EmptyRound,

    /// Underlying ReDB failure
    #[error("store unavailable: {0}")]
    Store(String),
}

impl From<redb::DatabaseError> for LotteryError {
    fn from(e: redb::DatabaseError) -> Self {
        LotteryError::Store(e.to_string())
    }
}

impl From<redb::TransactionError> for LotteryError {
    fn from(e: redb::TransactionError) -> Self {
        LotteryError::Store(e.to_string())
    }
}

impl From<redb::TableError> for LotteryError {
    fn from(e: redb::TableError) -> Self {
        LotteryError::Store(e.to_string())
    }
}

impl From<redb::StorageError> for LotteryError {
    fn from(e: redb::StorageError) -> Self {
        LotteryError::Store(e.to_string())
    }
}

impl From<redb::CommitError> for LotteryError {
    fn from(e: redb::CommitError) -> Self {
        LotteryError::Store(e.to_string())
    }
}
