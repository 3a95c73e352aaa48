//! Finite eligibility trace.
//!
//! Instead of per-weight trace values the engine remembers the last
//! `horizon + 1` positions it learned from and replays them, newest first,
//! with geometrically decaying factors.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::core::Board;

/// Equivalent boards of one position, the position itself first.
pub type EquivBoards = SmallVec<[Board; 8]>;

/// One remembered position.
#[derive(Clone, Debug, PartialEq)]
pub struct EquivState {
    /// Symmetric boards; `boards[0]` is the position that was learned from.
    pub boards: EquivBoards,

    /// Squash derivative `e` in effect when the position was pushed.
    pub squash_derivative: f64,
}

impl EquivState {
    pub fn new(boards: EquivBoards, squash_derivative: f64) -> Self {
        Self {
            boards,
            squash_derivative,
        }
    }
}

/// Most-recent-first list of positions, at most `horizon + 1` long.
///
/// Storage grows with the entries actually pushed, so a horizon close to
/// `usize::MAX` costs nothing up front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EligibilityHistory {
    entries: VecDeque<EquivState>,
    horizon: usize,
}

impl EligibilityHistory {
    #[must_use]
    pub fn new(horizon: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            horizon,
        }
    }

    #[must_use]
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Largest number of entries kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.horizon.saturating_add(1)
    }

    /// Push `state` as the newest entry and evict what falls off the end.
    /// Returns the number of evicted entries.
    pub fn push(&mut self, state: EquivState) -> usize {
        self.entries.push_front(state);
        self.truncate()
    }

    /// Change the horizon, dropping the oldest entries if it shrank.
    /// Returns the number of dropped entries.
    pub fn set_horizon(&mut self, horizon: usize) -> usize {
        self.horizon = horizon;
        self.truncate()
    }

    fn truncate(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.truncate(self.capacity());
        before - self.entries.len()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &EquivState> {
        self.entries.iter()
    }

    /// Newest entry.
    #[must_use]
    pub fn front(&self) -> Option<&EquivState> {
        self.entries.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn state(tag: u8) -> EquivState {
        EquivState::new(smallvec![vec![tag]], 1.0)
    }

    #[test]
    fn test_newest_first() {
        let mut history = EligibilityHistory::new(2);
        history.push(state(1));
        history.push(state(2));

        let tags: Vec<u8> = history.iter().map(|s| s.boards[0][0]).collect();
        assert_eq!(tags, vec![2, 1]);
        assert_eq!(history.front().map(|s| s.boards[0][0]), Some(2));
    }

    #[test]
    fn test_evicts_beyond_horizon_plus_one() {
        let mut history = EligibilityHistory::new(1);
        assert_eq!(history.push(state(1)), 0);
        assert_eq!(history.push(state(2)), 0);
        assert_eq!(history.push(state(3)), 1);

        assert_eq!(history.len(), 2);
        let tags: Vec<u8> = history.iter().map(|s| s.boards[0][0]).collect();
        assert_eq!(tags, vec![3, 2]);
    }

    #[test]
    fn test_zero_horizon_keeps_one() {
        let mut history = EligibilityHistory::new(0);
        history.push(state(1));
        history.push(state(2));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_shrinking_horizon_truncates() {
        let mut history = EligibilityHistory::new(3);
        for tag in 0..4 {
            history.push(state(tag));
        }
        assert_eq!(history.len(), 4);

        assert_eq!(history.set_horizon(1), 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.front().map(|s| s.boards[0][0]), Some(3));

        assert_eq!(history.set_horizon(5), 0);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_huge_horizon_allocates_lazily() {
        let mut history = EligibilityHistory::new(usize::MAX);
        assert_eq!(history.capacity(), usize::MAX);
        assert_eq!(history.push(state(1)), 0);
        assert_eq!(history.push(state(2)), 0);
        assert_eq!(history.len(), 2);
    }
}
