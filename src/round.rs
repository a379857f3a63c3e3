//! Round clock — drives the betting window on a fixed period.
//!
//! One background task owns the round lifecycle: every period it asks the
//! ledger to resolve the open round (snapshot, draw, credit, clear, advance)
//! as a single atomic step. Wager submissions run concurrently against the
//! same ledger; the store's transaction ordering decides which round each
//! wager lands in. A failed tick leaves the round open and is retried on
//! the next period, so the pool is never dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use rand::Rng;
use serde::Serialize;
use tracing::{error, info};

use crate::storage::{LedgerStore, RoundOutcome};

/// Shared handle to the round clock
pub type SharedScheduler = Arc<RoundScheduler>;

/// Summary of the most recently settled round
#[derive(Debug, Clone, Serialize)]
pub struct LastSettlement {
    pub round: u64,
    pub winner: String,
    pub pool: u64,
    pub bettors: usize,
}

/// Clock statistics for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStats {
    pub is_running: bool,
    pub rounds_settled: u64,
    pub quiet_rounds: u64,
    pub failed_ticks: u64,
    pub last_settlement: Option<LastSettlement>,
}

/// Owns round advancement: one timer task, one resolution per tick.
pub struct RoundScheduler {
    store: LedgerStore,
    period: Duration,

    is_running: AtomicBool,
    rounds_settled: AtomicU64,
    quiet_rounds: AtomicU64,
    failed_ticks: AtomicU64,
    last_settlement: RwLock<Option<LastSettlement>>,
}

impl RoundScheduler {
    pub fn new(store: LedgerStore, period: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            period,
            is_running: AtomicBool::new(false),
            rounds_settled: AtomicU64::new(0),
            quiet_rounds: AtomicU64::new(0),
            failed_ticks: AtomicU64::new(0),
            last_settlement: RwLock::new(None),
        })
    }

    /// Start the round loop (call once on startup).
    pub fn start(self: &Arc<Self>) {
        self.is_running.store(true, Ordering::SeqCst);

        let scheduler = self.clone();
        tokio::spawn(async move {
            info!(period_secs = scheduler.period.as_secs(), "🎲 Round clock started");

            let mut timer = tokio::time::interval(scheduler.period);
            // the first interval tick completes immediately; consume it so
            // the opening round gets a full betting window
            timer.tick().await;

            while scheduler.is_running.load(Ordering::SeqCst) {
                timer.tick().await;
                scheduler.run_tick();
            }

            info!("Round clock stopped");
        });
    }

    /// Stop the round loop after the current tick.
    pub fn stop(&self) {
        self.is_running.store(false, Ordering::SeqCst);
    }

    /// Resolve the open round once. Split out of the loop for tests.
    pub fn run_tick(&self) {
        let result = self
            .store
            .resolve_round(|pool| rand::thread_rng().gen_range(0..=pool));

        match result {
            Ok(RoundOutcome::NoBets { round }) => {
                self.quiet_rounds.fetch_add(1, Ordering::Relaxed);
                info!(round, "No wagers placed this round");
            }
            Ok(RoundOutcome::Won { round, winner, pool, bettors, .. }) => {
                self.rounds_settled.fetch_add(1, Ordering::Relaxed);
                info!(round, winner = %winner, pool, bettors, "🏆 Round settled, pool paid out");
                *self.last_settlement.write() =
                    Some(LastSettlement { round, winner, pool, bettors });
            }
            Err(e) => {
                self.failed_ticks.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Round resolution failed, round stays open for retry");
            }
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            is_running: self.is_running.load(Ordering::SeqCst),
            rounds_settled: self.rounds_settled.load(Ordering::Relaxed),
            quiet_rounds: self.quiet_rounds.load(Ordering::Relaxed),
            failed_ticks: self.failed_ticks.load(Ordering::Relaxed),
            last_settlement: self.last_settlement.read().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LedgerStore;

    fn test_store() -> (LedgerStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::open(dir.path().to_str().unwrap(), 1000).unwrap();
        (store, dir)
    }

    #[test]
    fn test_quiet_tick_advances_round_and_counts() {
        let (store, _dir) = test_store();
        let scheduler = RoundScheduler::new(store.clone(), Duration::from_secs(60));

        scheduler.run_tick();

        assert_eq!(scheduler.stats().quiet_rounds, 1);
        assert_eq!(store.current_round().unwrap().0, 2);
    }

    #[test]
    fn test_settled_tick_records_last_settlement() {
        let (store, _dir) = test_store();
        store.balance_or_register("alice").unwrap();
        store.place_wager("alice", 400).unwrap();

        let scheduler = RoundScheduler::new(store.clone(), Duration::from_secs(60));
        scheduler.run_tick();

        let stats = scheduler.stats();
        assert_eq!(stats.rounds_settled, 1);
        let last = stats.last_settlement.expect("settlement recorded");
        assert_eq!(last.winner, "alice");
        assert_eq!(last.pool, 400);
        assert_eq!(last.round, 1);
    }
}
