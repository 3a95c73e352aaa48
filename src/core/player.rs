//! Player identification and per-player weight storage.
//!
//! Every player owns an independent copy of each n-tuple table, so the
//! network is stored as a `PlayerMap<Vec<NTuple>>`: O(1) access by
//! [`PlayerId`], one entry per player.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::error::ConfigError;

/// Player identifier supporting 1-255 players.
///
/// Player indices are 0-based: the player to move first is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    ///
    /// ```
    /// use ntuple_td::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(2).collect();
    /// assert_eq!(players, vec![PlayerId::new(0), PlayerId::new(1)]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count.min(255) as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player storage backed by a `Vec<T>`.
///
/// ```
/// use ntuple_td::core::{PlayerId, PlayerMap};
/// use ntuple_td::error::ConfigError;
///
/// let mut sums = PlayerMap::try_new(2, |_| Ok::<f64, ConfigError>(0.0)).unwrap();
/// sums[PlayerId::new(1)] += 0.5;
/// assert_eq!(sums[PlayerId::new(1)], 0.5);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a fallible factory function.
    ///
    /// Fails with [`ConfigError::NoPlayers`] unless `1..=255` players are
    /// requested, otherwise stops at the first factory error.
    pub fn try_new<E>(
        player_count: usize,
        mut factory: impl FnMut(PlayerId) -> Result<T, E>,
    ) -> Result<Self, E>
    where
        E: From<ConfigError>,
    {
        if !(1..=255).contains(&player_count) {
            return Err(ConfigError::NoPlayers.into());
        }

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect::<Result<Vec<_>, E>>()?;

        Ok(Self { data })
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data, or `None` if out of range.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Get a mutable reference to a player's data, or `None` if out of range.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over mutable entries in player order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }

    /// Map every entry, keeping the player layout.
    pub fn map<U>(&self, mut f: impl FnMut(PlayerId, &T) -> U) -> PlayerMap<U> {
        PlayerMap {
            data: self.iter().map(|(p, v)| f(p, v)).collect(),
        }
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}
