//! Generic weighted-choice table.
//!
//! Node-type and terrain-type selection both draw from ordered weight tables
//! rather than inline probability thresholds, so the distributions stay
//! testable and reusable.

use rand::Rng;

/// An ordered table of `(weight, outcome)` pairs consumed by a single
/// cumulative-weight selection routine.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(u32, T)>,
    total: u32,
}

impl<T: Clone> WeightedTable<T> {
    /// Build a table from weight/outcome pairs. Zero-weight entries are kept
    /// but can never be chosen.
    #[must_use]
    pub fn new(entries: Vec<(u32, T)>) -> Self {
        let total = entries.iter().map(|(w, _)| *w).sum();
        Self { entries, total }
    }

    /// Pick one outcome proportionally to its weight.
    /// Returns `None` only for an empty or all-zero table.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        if self.total == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..self.total);
        for (weight, outcome) in &self.entries {
            if roll < *weight {
                return Some(outcome.clone());
            }
            roll -= weight;
        }
        None
    }

    /// Sum of all entry weights.
    #[must_use]
    pub const fn total_weight(&self) -> u32 {
        self.total
    }
}

/// Pick a random element of a slice. `None` on an empty slice.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(rng.gen_range(0..items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn empty_table_yields_none() {
        let table: WeightedTable<u8> = WeightedTable::new(Vec::new());
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert!(table.choose(&mut rng).is_none());
    }

    #[test]
    fn zero_weight_entries_never_chosen() {
        let table = WeightedTable::new(vec![(0, "never"), (1, "always")]);
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        for _ in 0..50 {
            assert_eq!(table.choose(&mut rng), Some("always"));
        }
    }

    #[test]
    fn distribution_tracks_weights() {
        let table = WeightedTable::new(vec![(60, 'a'), (25, 'b'), (15, 'c')]);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut counts = [0u32; 3];
        for _ in 0..10_000 {
            match table.choose(&mut rng) {
                Some('a') => counts[0] += 1,
                Some('b') => counts[1] += 1,
                Some('c') => counts[2] += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert!(counts[0] > counts[1] && counts[1] > counts[2]);
        assert!((5_500..6_500).contains(&counts[0]), "a count {}", counts[0]);
    }

    #[test]
    fn pick_handles_empty_and_single() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let empty: [u8; 0] = [];
        assert!(pick(&mut rng, &empty).is_none());
        assert_eq!(pick(&mut rng, &[7]), Some(&7));
    }
}
