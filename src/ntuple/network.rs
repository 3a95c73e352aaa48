//! The n-tuple network: one copy of every n-tuple per player.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tc::TcConfig;
use super::tuple::{NTuple, WeightInit};
use crate::core::{Board, BoardGeometry, PlayerId, PlayerMap, WeightRng};
use crate::error::{ConfigError, Error, ValidationError};

/// All weight tables, indexed by player and tuple number.
///
/// Every player has the same sample points but independent weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NTupleNetwork {
    tuples: PlayerMap<Vec<NTuple>>,
}

impl NTupleNetwork {
    /// Build zero-initialised tables for every player.
    pub fn new(
        sample_points: &[Vec<usize>],
        geometry: &BoardGeometry,
        tc: Option<&TcConfig>,
    ) -> Result<Self, Error> {
        geometry.validate()?;
        if sample_points.is_empty() {
            return Err(ConfigError::NoTuples.into());
        }
        for (tuple, points) in sample_points.iter().enumerate() {
            if points.is_empty() {
                return Err(ConfigError::EmptyTuple { tuple }.into());
            }
            if let Some(&point) = points.iter().find(|&&p| p >= geometry.num_cells) {
                return Err(ValidationError::SamplePointOutOfRange {
                    tuple,
                    point,
                    num_cells: geometry.num_cells,
                }
                .into());
            }
        }

        let tuples = PlayerMap::try_new(geometry.num_players, |_| {
            sample_points
                .iter()
                .map(|points| NTuple::new(points, geometry.num_position_values, tc))
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(Self { tuples })
    }

    /// Fill every table, player-major then tuple order, one RNG fork each.
    pub fn init_weights(&mut self, init: WeightInit, seed: u64) {
        let mut rng = WeightRng::new(seed);
        for tuples in self.tuples.values_mut() {
            for tuple in tuples {
                let mut tuple_rng = rng.fork();
                tuple.init_weights(init, &mut tuple_rng);
            }
        }
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.tuples.player_count()
    }

    #[must_use]
    pub fn num_tuples(&self) -> usize {
        self.tuples.iter().next().map_or(0, |(_, t)| t.len())
    }

    /// Total number of weights over all players and tuples.
    #[must_use]
    pub fn num_weights(&self) -> usize {
        self.tuples
            .iter()
            .flat_map(|(_, t)| t.iter())
            .map(NTuple::num_weights)
            .sum()
    }

    /// Sample points of every tuple, in tuple order.
    #[must_use]
    pub fn sample_points(&self) -> Vec<Vec<usize>> {
        self.tuples
            .iter()
            .next()
            .map(|(_, t)| t.iter().map(|n| n.sample_points().to_vec()).collect())
            .unwrap_or_default()
    }

    /// Tables of `player`, or `None` for an unknown player.
    #[must_use]
    pub fn tuples(&self, player: PlayerId) -> Option<&[NTuple]> {
        self.tuples.get(player).map(Vec::as_slice)
    }

    pub(crate) fn tuples_mut(&mut self, player: PlayerId) -> Option<&mut [NTuple]> {
        self.tuples.get_mut(player).map(Vec::as_mut_slice)
    }

    /// Un-squashed network output: every tuple over every equivalent board.
    pub fn raw_score(&self, player: PlayerId, boards: &[Board]) -> Result<f64, ValidationError> {
        let tuples = self
            .tuples(player)
            .ok_or(ValidationError::PlayerOutOfRange {
                player: player.index(),
                num_players: self.num_players(),
            })?;

        let mut score = 0.0;
        for tuple in tuples {
            for board in boards {
                score += tuple.score(board)?;
            }
        }
        Ok(score)
    }

    /// Refresh TC factors of every table; returns the number of refreshed weights.
    pub fn update_tc(&mut self) -> usize {
        self.tuples
            .values_mut()
            .flat_map(|t| t.iter_mut())
            .map(NTuple::update_tc)
            .sum()
    }

    /// Per-player, per-tuple weight sums.
    #[must_use]
    pub fn lut_summary(&self) -> LutSummary {
        LutSummary {
            players: self.tuples.map(|_, tuples| {
                tuples
                    .iter()
                    .map(|t| TupleSums {
                        sum: t.lut_sum(),
                        sum_abs: t.lut_sum_abs(),
                        hash_sum: t.lut_hash_sum(),
                    })
                    .collect()
            }),
        }
    }

    /// Check a deserialized network against the geometry it claims to serve.
    pub(crate) fn check_consistency(
        &self,
        geometry: &BoardGeometry,
        tc: Option<&TcConfig>,
    ) -> Result<(), String> {
        if self.num_players() != geometry.num_players {
            return Err(format!(
                "{} player tables for a {}-player game",
                self.num_players(),
                geometry.num_players
            ));
        }
        let reference = self.sample_points();
        if reference.is_empty() {
            return Err("network has no n-tuples".to_string());
        }
        for (player, tuples) in self.tuples.iter() {
            let points: Vec<Vec<usize>> =
                tuples.iter().map(|t| t.sample_points().to_vec()).collect();
            if points != reference {
                return Err(format!("{player} has different sample points"));
            }
            for (i, tuple) in tuples.iter().enumerate() {
                if tuple.num_position_values() != geometry.num_position_values {
                    return Err(format!("n-tuple {i} of {player} has a foreign value range"));
                }
                if tuple.sample_points().iter().any(|&p| p >= geometry.num_cells) {
                    return Err(format!("n-tuple {i} of {player} samples outside the board"));
                }
                if !tuple.is_consistent() {
                    return Err(format!("n-tuple {i} of {player} has a malformed table"));
                }
                if tuple.tc().map(|t| t.config()) != tc {
                    return Err(format!(
                        "n-tuple {i} of {player} disagrees with the temporal coherence settings"
                    ));
                }
                if let Some(w) = tuple.weights().iter().position(|w| !w.is_finite()) {
                    return Err(format!("weight {w} of n-tuple {i} of {player} is not finite"));
                }
            }
        }
        Ok(())
    }
}

/// Weight sums of one tuple table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TupleSums {
    pub sum: f64,
    pub sum_abs: f64,
    pub hash_sum: f64,
}

/// Read-only weight diagnostics for the whole network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LutSummary {
    pub players: PlayerMap<Vec<TupleSums>>,
}

impl LutSummary {
    /// Sum of all weights.
    #[must_use]
    pub fn total_sum(&self) -> f64 {
        self.players.iter().flat_map(|(_, t)| t.iter()).map(|s| s.sum).sum()
    }

    /// Sum of all absolute weights.
    #[must_use]
    pub fn total_sum_abs(&self) -> f64 {
        self.players.iter().flat_map(|(_, t)| t.iter()).map(|s| s.sum_abs).sum()
    }

    /// Sum of all per-tuple hash sums.
    #[must_use]
    pub fn total_hash_sum(&self) -> f64 {
        self.players.iter().flat_map(|(_, t)| t.iter()).map(|s| s.hash_sum).sum()
    }
}

impl fmt::Display for LutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (player, sums) in self.players.iter() {
            write!(f, "LUT sum {player}:")?;
            for s in sums {
                write!(f, " {:+.5}|", s.sum)?;
            }
            writeln!(f)?;
            write!(f, "LUT abs {player}:")?;
            for s in sums {
                write!(f, " {:+.5}|", s.sum_abs)?;
            }
            writeln!(f)?;
            write!(f, "LUT hash sum {player}:")?;
            for s in sums {
                write!(f, " {:+.5}|", s.hash_sum)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
