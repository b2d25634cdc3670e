//! Randomness seam for the games.
//!
//! Every random choice goes through [`CellPicker`], so production code can
//! use a real RNG while tests replay a fixed script of picks.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform indices.
pub trait CellPicker {
    /// A uniform index in `0..upper`. `upper` is never zero.
    fn index(&mut self, upper: usize) -> usize;
}

/// [`CellPicker`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngPicker<R: Rng> {
    rng: R,
}

impl<R: Rng> RngPicker<R> {
    /// Wrap an RNG.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngPicker<StdRng> {
    /// Seeded from OS entropy; sequences differ between runs.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic picker for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> CellPicker for RngPicker<R> {
    fn index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

/// Replays a fixed list of picks, each reduced modulo `upper`.
///
/// Once the list is exhausted every pick returns `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicker {
    picks: VecDeque<usize>,
}

impl ScriptedPicker {
    /// Create a picker that will return `picks` in order.
    #[must_use]
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }

    /// Queue more picks.
    pub fn push(&mut self, pick: usize) {
        self.picks.push_back(pick);
    }

    /// Picks not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl CellPicker for ScriptedPicker {
    fn index(&mut self, upper: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % upper.max(1)
    }
}

/// Fisher–Yates shuffle driven by a picker.
///
/// Walks from the back, swapping each slot with a uniformly chosen slot at
/// or before it.
pub fn shuffle<T>(picker: &mut dyn CellPicker, items: &mut [T]) {
    for n in (1..items.len()).rev() {
        let k = picker.index(n + 1);
        items.swap(k, n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_picker_wraps_and_defaults() {
        let mut picker = ScriptedPicker::new([5, 1]);
        assert_eq!(picker.index(4), 1);
        assert_eq!(picker.index(4), 1);
        assert_eq!(picker.index(4), 0);
    }

    #[test]
    fn identity_shuffle_with_max_picks() {
        // Picking `n` at every step swaps each slot with itself.
        let mut picker = ScriptedPicker::new([3, 2, 1]);
        let mut items = [10, 20, 30, 40];
        shuffle(&mut picker, &mut items);
        assert_eq!(items, [10, 20, 30, 40]);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut picker = RngPicker::seeded(7);
        let mut items: Vec<u32> = (0..16).collect();
        shuffle(&mut picker, &mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn seeded_pickers_agree() {
        let mut a = RngPicker::seeded(42);
        let mut b = RngPicker::seeded(42);
        for upper in 1..50 {
            assert_eq!(a.index(upper), b.index(upper));
        }
    }
}
