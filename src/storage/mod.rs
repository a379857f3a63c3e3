// ============================================================================
// LEDGER STORE — balances, open wagers, round metadata
// ============================================================================
//
// Storage discipline:
// - ReDB: ACID-compliant embedded key-value database (MVCC, single writer)
// - DashMap: lock-free balance cache for hot reads
//
// Three tables:
//   BALANCES  participant id → balance        (durable across rounds/restarts)
//   WAGERS    participant id → staked amount  (the open round's bucket)
//   META      "round" / "round_started_at"    (round counter + start time)
//
// CONCURRENCY MODEL:
// Every mutation is one ReDB write transaction. Writers are serialized, so a
// wager either commits before the resolve transaction (counted in that
// round's pool) or after it (counted toward the next round). The round
// number is read inside the same transaction that records the wager, so the
// stamp and the bucket always agree. Check-and-debit happens inside a single
// transaction: there is no window where two wagers can pass the balance
// check against the same pre-debit value. Resolution (snapshot, winner
// credit, bucket clear, round advance) is likewise one transaction: if any
// step fails, nothing advances and the pool is retried on the next tick.
//
// The cache is updated only AFTER a successful commit.
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use redb::{Database, ReadableTable, TableDefinition};
use serde::Serialize;
use tracing::{info, warn};

use crate::draw::pick_winner;
use crate::error::{LotteryError, LotteryResult};

/// Participant id → balance (the full participant set)
const BALANCES: TableDefinition<&str, u64> = TableDefinition::new("balances");

/// Participant id → accumulated wager for the open round
const WAGERS: TableDefinition<&str, u64> = TableDefinition::new("wagers");

/// Round metadata
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const META_ROUND: &str = "round";
const META_ROUND_STARTED_AT: &str = "round_started_at";

// ============================================================================
// WIRE TYPES
// ============================================================================

/// A participant and their balance, as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    #[serde(rename = "Id")]
    pub id: String,
    pub balance: u64,
}

/// One open wager: a participant's accumulated stake in the current round
#[derive(Debug, Clone, Serialize)]
pub struct WagerEntry {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Round")]
    pub round: u64,
    #[serde(rename = "Amount")]
    pub amount: u64,
}

/// Result of a successful wager
#[derive(Debug, Clone)]
pub struct PlacedWager {
    /// Round the stake was summed into
    pub round: u64,
    /// Balance after the debit
    pub balance: u64,
    /// Participant's accumulated stake this round
    pub staked: u64,
}

/// Outcome of resolving one round
#[derive(Debug, Clone)]
pub enum RoundOutcome {
    /// Nobody bet; the round advanced with no other state change
    NoBets { round: u64 },
    /// The pool went to one winner and a fresh round opened
    Won {
        round: u64,
        winner: String,
        pool: u64,
        bettors: usize,
        winner_balance: u64,
    },
}

// ============================================================================
// LEDGER STORE
// ============================================================================

/// Durable lottery ledger: balances, the open round's wager bucket, and the
/// round counter.
///
/// # Thread Safety
/// - `Clone` is cheap (Arc handles)
/// - balance reads are lock-free via the cache
/// - all writes go through ReDB's serialized write transactions
#[derive(Clone)]
pub struct LedgerStore {
    db: Arc<Database>,

    /// Balance cache, refreshed after each successful commit
    cache: Arc<DashMap<String, u64>>,

    /// Balance granted on first sight of a participant
    starting_balance: u64,
}

impl LedgerStore {
    /// Create or open the ledger database under `path`.
    ///
    /// The round counter restarts at 1 on every boot. Stakes left in the
    /// wager bucket by a previous run were already debited, so they carry
    /// into the opening round rather than vanish.
    pub fn open(path: &str, starting_balance: u64) -> LotteryResult<Self> {
        std::fs::create_dir_all(Path::new(path))
            .map_err(|e| LotteryError::Store(e.to_string()))?;
        let db = Database::create(format!("{}/lottery.redb", path))?;

        let cache = Arc::new(DashMap::new());
        let mut carried_stakes = 0u64;
        let mut carried_bettors = 0usize;

        let write_txn = db.begin_write()?;
        {
            let balances = write_txn.open_table(BALANCES)?;
            let mut iter = balances.iter()?;
            while let Some(entry) = iter.next() {
                let (id, balance) = entry?;
                cache.insert(id.value().to_string(), balance.value());
            }

            let wagers = write_txn.open_table(WAGERS)?;
            let mut iter = wagers.iter()?;
            while let Some(entry) = iter.next() {
                let (_, amount) = entry?;
                carried_stakes += amount.value();
                carried_bettors += 1;
            }

            let mut meta = write_txn.open_table(META)?;
            meta.insert(META_ROUND, 1u64)?;
            meta.insert(META_ROUND_STARTED_AT, unix_now())?;
        }
        write_txn.commit()?;

        info!(participants = cache.len(), "Ledger loaded, round 1 open");
        if carried_bettors > 0 {
            warn!(
                bettors = carried_bettors,
                total = carried_stakes,
                "Carrying debited stakes from a previous run into the opening round"
            );
        }

        Ok(Self {
            db: Arc::new(db),
            cache,
            starting_balance,
        })
    }

    // ========================================================================
    // BALANCES
    // ========================================================================

    /// Get a participant's balance, registering them with the starting
    /// balance on first sight. Provisioning happens exactly once.
    pub fn balance_or_register(&self, id: &str) -> LotteryResult<u64> {
        // Fast path: known participant, lock-free
        if let Some(balance) = self.cache.get(id) {
            return Ok(*balance);
        }

        let write_txn = self.db.begin_write()?;
        let balance = {
            let mut balances = write_txn.open_table(BALANCES)?;
            // read the guard out before the insert so the borrow ends
            let existing = balances.get(id)?.map(|v| v.value());
            match existing {
                Some(balance) => balance,
                None => {
                    balances.insert(id, self.starting_balance)?;
                    self.starting_balance
                }
            }
        };
        write_txn.commit()?;

        self.cache.insert(id.to_string(), balance);
        Ok(balance)
    }

    /// Number of registered participants
    pub fn participant_count(&self) -> usize {
        self.cache.len()
    }

    // ========================================================================
    // WAGERS
    // ========================================================================

    /// Debit `amount` from the participant and stake it on the open round,
    /// as a single atomic step.
    ///
    /// Repeated wagers accumulate into one per-round entry. The returned
    /// round number is read inside the same transaction, so it always names
    /// the round the stake was summed into.
    pub fn place_wager(&self, id: &str, amount: u64) -> LotteryResult<PlacedWager> {
        if amount == 0 {
            return Err(LotteryError::InvalidAmount);
        }

        let write_txn = self.db.begin_write()?;
        let placed = {
            let mut balances = write_txn.open_table(BALANCES)?;
            let balance = match balances.get(id)?.map(|v| v.value()) {
                Some(balance) => balance,
                None => return Err(LotteryError::UnknownParticipant(id.to_string())),
            };
            if amount > balance {
                return Err(LotteryError::InsufficientFunds { balance, wanted: amount });
            }
            let new_balance = balance - amount;
            balances.insert(id, new_balance)?;

            let mut wagers = write_txn.open_table(WAGERS)?;
            let staked = wagers.get(id)?.map(|v| v.value()).unwrap_or(0) + amount;
            wagers.insert(id, staked)?;

            let meta = write_txn.open_table(META)?;
            let round = meta.get(META_ROUND)?.map(|v| v.value()).unwrap_or(1);

            PlacedWager { round, balance: new_balance, staked }
        };
        write_txn.commit()?;

        self.cache.insert(id.to_string(), placed.balance);
        Ok(placed)
    }

    /// All open wagers in ranked order (amount ascending, then id), stamped
    /// with the round they belong to. One MVCC snapshot, so the stamp and
    /// the entries always agree.
    pub fn open_wagers(&self) -> LotteryResult<Vec<WagerEntry>> {
        let read_txn = self.db.begin_read()?;
        let wagers = read_txn.open_table(WAGERS)?;
        let meta = read_txn.open_table(META)?;
        let round = meta.get(META_ROUND)?.map(|v| v.value()).unwrap_or(1);

        let mut entries = Vec::new();
        let mut iter = wagers.iter()?;
        while let Some(entry) = iter.next() {
            let (id, amount) = entry?;
            entries.push(WagerEntry {
                id: id.value().to_string(),
                round,
                amount: amount.value(),
            });
        }
        entries.sort_by(|a, b| a.amount.cmp(&b.amount).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    /// Sum of all open wagers, i.e. the amount at stake this round
    pub fn prize_pool(&self) -> LotteryResult<u64> {
        let read_txn = self.db.begin_read()?;
        let wagers = read_txn.open_table(WAGERS)?;

        let mut pool = 0u64;
        let mut iter = wagers.iter()?;
        while let Some(entry) = iter.next() {
            let (_, amount) = entry?;
            pool += amount.value();
        }
        Ok(pool)
    }

    /// Current round number and its start time (unix seconds)
    pub fn current_round(&self) -> LotteryResult<(u64, u64)> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(META)?;
        let round = meta.get(META_ROUND)?.map(|v| v.value()).unwrap_or(1);
        let started_at = meta.get(META_ROUND_STARTED_AT)?.map(|v| v.value()).unwrap_or(0);
        Ok((round, started_at))
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    /// Resolve the open round in one atomic transaction: snapshot the wager
    /// bucket, draw a winner, credit them the pool, clear the bucket, and
    /// open the next round.
    ///
    /// `draw` maps the pool total to a ticket in `[0, pool]`; it is a
    /// parameter so the clock passes a fresh uniform draw and tests pass a
    /// fixed one.
    ///
    /// If anything fails the transaction aborts: no stake is lost, the
    /// round does not advance, and the next tick retries.
    pub fn resolve_round(&self, draw: impl FnOnce(u64) -> u64) -> LotteryResult<RoundOutcome> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut wagers = write_txn.open_table(WAGERS)?;

            let mut entries: Vec<(String, u64)> = Vec::new();
            {
                let mut iter = wagers.iter()?;
                while let Some(entry) = iter.next() {
                    let (id, amount) = entry?;
                    entries.push((id.value().to_string(), amount.value()));
                }
            }
            entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

            let mut meta = write_txn.open_table(META)?;
            let round = meta.get(META_ROUND)?.map(|v| v.value()).unwrap_or(1);

            if entries.is_empty() {
                meta.insert(META_ROUND, round + 1)?;
                meta.insert(META_ROUND_STARTED_AT, unix_now())?;
                RoundOutcome::NoBets { round }
            } else {
                let pool: u64 = entries.iter().map(|(_, amount)| amount).sum();
                let ticket = draw(pool);
                let winner = match pick_winner(&entries, ticket) {
                    Some(id) => id.to_string(),
                    // not reachable: entries is non-empty
                    None => return Err(LotteryError::Store("draw selected no winner".to_string())),
                };

                let mut balances = write_txn.open_table(BALANCES)?;
                let winner_balance =
                    balances.get(winner.as_str())?.map(|v| v.value()).unwrap_or(0) + pool;
                balances.insert(winner.as_str(), winner_balance)?;

                for (id, _) in &entries {
                    wagers.remove(id.as_str())?;
                }

                meta.insert(META_ROUND, round + 1)?;
                meta.insert(META_ROUND_STARTED_AT, unix_now())?;

                RoundOutcome::Won {
                    round,
                    winner,
                    pool,
                    bettors: entries.len(),
                    winner_balance,
                }
            }
        };
        write_txn.commit()?;

        if let RoundOutcome::Won { winner, winner_balance, .. } = &outcome {
            self.cache.insert(winner.clone(), *winner_balance);
        }
        Ok(outcome)
    }
}

fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}
