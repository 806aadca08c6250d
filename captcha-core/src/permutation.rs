use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::{CaptchaError, Result};

/// Tile arrangement: `order[p]` is the source tile shown at screen position `p`.
///
/// Always a permutation of `0..len`. The only mutators are [`shuffle`] and
/// [`swap`], both of which preserve that.
///
/// [`shuffle`]: GridPermutation::shuffle
/// [`swap`]: GridPermutation::swap
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridPermutation {
    order: Vec<usize>,
}

impl GridPermutation {
    pub fn identity(len: usize) -> Self {
        GridPermutation {
            order: (0..len).collect(),
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Source tile displayed at `position`.
    pub fn source_of(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    pub fn reset(&mut self) {
        for (i, v) in self.order.iter_mut().enumerate() {
            *v = i;
        }
    }

    /// Uniform Fisher-Yates shuffle of the current arrangement.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
        debug_assert!(self.is_valid());
    }

    /// Exchange the tiles at two positions. `a == b` is a no-op.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.order.len();
        for index in [a, b] {
            if index >= len {
                return Err(CaptchaError::OutOfBoundsIndex { index, len });
            }
        }
        self.order.swap(a, b);
        debug_assert!(self.is_valid());
        Ok(())
    }

    /// Solved: every position shows its own tile.
    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(i, &v)| i == v)
    }

    /// No duplicates, no omissions.
    pub fn is_valid(&self) -> bool {
        let mut seen = vec![false; self.order.len()];
        for &v in &self.order {
            match seen.get_mut(v) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn identity_is_solved_and_valid() {
        let p = GridPermutation::identity(16);
        assert!(p.is_identity());
        assert!(p.is_valid());
        assert_eq!(p.len(), 16);
    }

    #[test]
    fn one_adjacent_transposition_is_not_solved() {
        let mut p = GridPermutation::identity(16);
        p.swap(5, 6).unwrap();
        assert!(!p.is_identity());
        assert!(p.is_valid());
        p.swap(6, 5).unwrap();
        assert!(p.is_identity());
    }

    #[test]
    fn self_swap_leaves_order_unchanged() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut p = GridPermutation::identity(16);
        p.shuffle(&mut rng);
        let before = p.clone();
        p.swap(3, 3).unwrap();
        assert_eq!(p, before);
    }

    #[test]
    fn out_of_bounds_swap_is_rejected_without_mutation() {
        let mut p = GridPermutation::identity(16);
        assert_eq!(
            p.swap(0, 16),
            Err(CaptchaError::OutOfBoundsIndex { index: 16, len: 16 })
        );
        assert!(p.is_identity());
    }

    #[test]
    fn reset_restores_identity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut p = GridPermutation::identity(16);
        p.shuffle(&mut rng);
        p.reset();
        assert!(p.is_identity());
    }

    #[test]
    fn shuffle_is_rarely_identity() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut identities = 0;
        for _ in 0..1000 {
            let mut p = GridPermutation::identity(16);
            p.shuffle(&mut rng);
            assert!(p.is_valid());
            if p.is_identity() {
                identities += 1;
            }
        }
        assert_eq!(identities, 0);
    }

    #[test]
    fn shuffle_spreads_values_across_positions() {
        const TRIALS: usize = 16_000;
        let mut rng = SmallRng::seed_from_u64(0x5EED);
        let mut counts = [[0usize; 16]; 16];
        for _ in 0..TRIALS {
            let mut p = GridPermutation::identity(16);
            p.shuffle(&mut rng);
            for (pos, &v) in p.as_slice().iter().enumerate() {
                counts[pos][v] += 1;
            }
        }
        // Expected 1000 per cell; allow a wide band.
        for row in &counts {
            for &c in row {
                assert!((800..=1200).contains(&c), "cell count {c} far from uniform");
            }
        }
    }

    #[test]
    fn detects_duplicates() {
        let p = GridPermutation {
            order: vec![0, 1, 1, 3],
        };
        assert!(!p.is_valid());
        let p = GridPermutation {
            order: vec![0, 1, 4, 3],
        };
        assert!(!p.is_valid());
    }
}
