//! Weighted winner selection.
//!
//! Pure cumulative-subtraction draw: each entry covers a slice of the
//! `[0, Σweight]` range proportional to its weight, so win probability is
//! exactly `weight / pool` for any uniformly drawn ticket.

/// Pick the winner for a ranked `(id, weight)` list and a ticket drawn
/// uniformly from `[0, Σweight]` inclusive.
///
/// Walks the list in order, subtracting each weight from the ticket; the
/// first entry that drives the running value to zero or below wins. Returns
/// `None` only for an empty list. A ticket beyond the cumulative weight
/// falls to the last entry (cannot happen for an in-range draw).
pub fn pick_winner(entries: &[(String, u64)], ticket: u64) -> Option<&str> {
    let mut remaining = ticket as i128;
    let mut winner = None;
    for (id, weight) in entries {
        winner = Some(id.as_str());
        remaining -= *weight as i128;
        if remaining <= 0 {
            break;
        }
    }
    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn entries(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
        pairs.iter().map(|(id, w)| (id.to_string(), *w)).collect()
    }

    #[test]
    fn test_empty_list_has_no_winner() {
        assert_eq!(pick_winner(&[], 0), None);
    }

    #[test]
    fn test_single_bettor_always_wins() {
        let list = entries(&[("solo", 50)]);
        for ticket in [0, 1, 25, 50] {
            assert_eq!(pick_winner(&list, ticket), Some("solo"));
        }
    }

    #[test]
    fn test_ticket_250_lands_on_the_300_stake() {
        // A staked 300, B staked 900; ticket 250 is inside A's slice
        let list = entries(&[("A", 300), ("B", 900)]);
        assert_eq!(pick_winner(&list, 250), Some("A"));
    }

    #[test]
    fn test_slice_boundaries() {
        let list = entries(&[("A", 300), ("B", 900)]);
        assert_eq!(pick_winner(&list, 0), Some("A"));
        assert_eq!(pick_winner(&list, 300), Some("A"));
        assert_eq!(pick_winner(&list, 301), Some("B"));
        assert_eq!(pick_winner(&list, 1200), Some("B"));
    }

    #[test]
    fn test_win_frequency_tracks_stake_share() {
        let list = entries(&[("A", 300), ("B", 900)]);
        let pool: u64 = 1200;
        let mut rng = StdRng::seed_from_u64(7);

        let draws: u32 = 20_000;
        let mut a_wins = 0u32;
        for _ in 0..draws {
            let ticket = rng.gen_range(0..=pool);
            if pick_winner(&list, ticket) == Some("A") {
                a_wins += 1;
            }
        }

        // A covers 301 of the 1201 tickets (~25%)
        let freq = f64::from(a_wins) / f64::from(draws);
        assert!((freq - 0.25).abs() < 0.02, "A won {:.3} of draws", freq);
    }
}
