//! Round Resolution Tests
//!
//! The round lifecycle: snapshot, draw, payout, clear, advance — all or
//! nothing. Currency is conserved across every transition.

use jackpot::{LedgerStore, RoundOutcome};

fn open_store(dir: &tempfile::TempDir) -> LedgerStore {
    LedgerStore::open(dir.path().to_str().unwrap(), 1000).unwrap()
}

/// Sum of every balance plus the open pool — must be invariant across a
/// round transition
fn total_in_play(store: &LedgerStore, ids: &[&str]) -> u64 {
    let balances: u64 = ids.iter().map(|id| store.balance_or_register(id).unwrap()).sum();
    balances + store.prize_pool().unwrap()
}

// ============================================================================
// RESOLUTION
// ============================================================================

#[test]
fn test_two_bettor_round_pays_the_drawn_winner() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    // A registers and stakes 300, B registers and stakes 900
    assert_eq!(store.balance_or_register("A").unwrap(), 1000);
    assert_eq!(store.place_wager("A", 300).unwrap().balance, 700);
    assert_eq!(store.prize_pool().unwrap(), 300);

    assert_eq!(store.balance_or_register("B").unwrap(), 1000);
    assert_eq!(store.place_wager("B", 900).unwrap().balance, 100);
    assert_eq!(store.prize_pool().unwrap(), 1200);

    // ticket 250 falls inside A's 300-wide slice
    let outcome = store.resolve_round(|pool| {
        assert_eq!(pool, 1200);
        250
    });

    match outcome.unwrap() {
        RoundOutcome::Won { round, winner, pool, bettors, winner_balance } => {
            assert_eq!(round, 1);
            assert_eq!(winner, "A");
            assert_eq!(pool, 1200);
            assert_eq!(bettors, 2);
            assert_eq!(winner_balance, 1900);
        }
        other => panic!("expected a winner, got {:?}", other),
    }

    assert_eq!(store.balance_or_register("A").unwrap(), 1900);
    assert_eq!(store.balance_or_register("B").unwrap(), 100);

    // fresh round: empty bucket, zero pool
    assert_eq!(store.current_round().unwrap().0, 2);
    assert_eq!(store.prize_pool().unwrap(), 0);
    assert!(store.open_wagers().unwrap().is_empty());
}

#[test]
fn test_quiet_round_advances_without_touching_balances() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.balance_or_register("alice").unwrap();

    let outcome = store.resolve_round(|_| unreachable!("draw must not run on an empty round"));
    assert!(matches!(outcome.unwrap(), RoundOutcome::NoBets { round: 1 }));

    assert_eq!(store.current_round().unwrap().0, 2);
    assert_eq!(store.balance_or_register("alice").unwrap(), 1000);
    assert_eq!(store.prize_pool().unwrap(), 0);
}

#[test]
fn test_round_numbers_advance_strictly_by_one() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    for expected in 1..=5u64 {
        let (round, _) = store.current_round().unwrap();
        assert_eq!(round, expected);
        store.resolve_round(|_| 0).unwrap();
    }
    assert_eq!(store.current_round().unwrap().0, 6);
}

#[test]
fn test_currency_is_conserved_across_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let ids = ["A", "B", "C"];
    for id in &ids {
        store.balance_or_register(id).unwrap();
    }

    store.place_wager("A", 120).unwrap();
    store.place_wager("B", 450).unwrap();
    store.place_wager("C", 30).unwrap();
    let before = total_in_play(&store, &ids);
    assert_eq!(before, 3000);

    store.resolve_round(|pool| pool / 2).unwrap();

    assert_eq!(total_in_play(&store, &ids), before);
}

#[test]
fn test_single_bettor_gets_their_stake_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.balance_or_register("solo").unwrap();
    store.place_wager("solo", 777).unwrap();

    let outcome = store.resolve_round(|pool| pool).unwrap();
    match outcome {
        RoundOutcome::Won { winner, pool, .. } => {
            assert_eq!(winner, "solo");
            assert_eq!(pool, 777);
        }
        other => panic!("expected a winner, got {:?}", other),
    }
    assert_eq!(store.balance_or_register("solo").unwrap(), 1000);
}

#[test]
fn test_bets_after_resolution_count_toward_the_next_round() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.balance_or_register("alice").unwrap();

    assert_eq!(store.place_wager("alice", 100).unwrap().round, 1);
    store.resolve_round(|_| 0).unwrap();

    let placed = store.place_wager("alice", 100).unwrap();
    assert_eq!(placed.round, 2);

    let wagers = store.open_wagers().unwrap();
    assert_eq!(wagers[0].round, 2);
    assert_eq!(wagers[0].amount, 100);
}

#[test]
fn test_winner_balance_accumulates_over_wins() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.balance_or_register("alice").unwrap();

    // start 1000: stake 100 and win it back, three times
    for _ in 0..3 {
        store.place_wager("alice", 100).unwrap();
        store.resolve_round(|_| 0).unwrap();
    }
    assert_eq!(store.balance_or_register("alice").unwrap(), 1000);
}
