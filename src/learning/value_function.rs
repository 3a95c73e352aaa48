//! N-tuple value function trained with finite-horizon TD(lambda).

use std::fmt;
use std::path::Path;

use tracing::{debug, info, trace, warn};

use super::config::{check_param, horizon_for, TargetMode, TdConfig};
use super::history::{EligibilityHistory, EquivBoards, EquivState};
use super::snapshot::{Snapshot, SNAPSHOT_VERSION};
use crate::core::{BoardGeometry, Cell, PlayerId};
use crate::error::{ConfigError, Error, Result, SnapshotError, ValidationError};
use crate::ntuple::{LutSummary, NTupleNetwork};
use crate::symmetry::{GameAdapter, Identity, SymmetryExpander};

/// What a single TD update did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateOutcome {
    /// Score of the current board before the update.
    pub v_old: f64,
    /// TD target the score was moved towards.
    pub target: f64,
    /// `target - v_old`.
    pub delta: f64,
    /// Number of weights changed, over all history entries.
    pub weights_touched: usize,
}

/// Value function of an n-tuple network with a finite eligibility trace.
///
/// Scoring is pure. Every update validates all of its input before the
/// first weight changes, so a failed call leaves the engine untouched.
///
/// ```
/// use ntuple_td::core::{BoardGeometry, PlayerId};
/// use ntuple_td::learning::{NTupleValueFunction, TdConfig};
///
/// let config = TdConfig::default().with_alpha(0.5).with_sigmoid(false);
/// let mut vf = NTupleValueFunction::with_identity(
///     &[vec![0]],
///     BoardGeometry::new(4, 2, 1),
///     config,
/// )
/// .unwrap();
///
/// let p = PlayerId::new(0);
/// vf.update_weights(&[1, 0, 0, 0], p, &[], p, true, 1.0).unwrap();
/// assert_eq!(vf.score(&[1, 0, 0, 0], p).unwrap(), 0.5);
/// ```
pub struct NTupleValueFunction {
    geometry: BoardGeometry,
    config: TdConfig,
    alpha: f64,
    network: NTupleNetwork,
    history: EligibilityHistory,
    expander: Box<dyn SymmetryExpander + Send + Sync>,
}

impl NTupleValueFunction {
    /// Build an engine with freshly initialised tables.
    pub fn new<S>(
        sample_points: &[Vec<usize>],
        geometry: BoardGeometry,
        config: TdConfig,
        expander: S,
    ) -> Result<Self>
    where
        S: SymmetryExpander + Send + Sync + 'static,
    {
        config.validate()?;
        let mut network = NTupleNetwork::new(sample_points, &geometry, config.tc.as_ref())?;
        network.init_weights(config.weight_init, config.seed);

        let alpha = config.alpha;
        let engine = Self::assemble(geometry, config, alpha, network, Box::new(expander))?;
        debug!(
            tuples = engine.network.num_tuples(),
            players = geometry.num_players,
            weights = engine.network.num_weights(),
            horizon = engine.history.horizon(),
            "built n-tuple value function"
        );
        Ok(engine)
    }

    /// Engine without symmetries.
    pub fn with_identity(
        sample_points: &[Vec<usize>],
        geometry: BoardGeometry,
        config: TdConfig,
    ) -> Result<Self> {
        Self::new(sample_points, geometry, config, Identity)
    }

    /// Engine for a game adapter; geometry and symmetries come from the adapter.
    pub fn from_adapter<A>(sample_points: &[Vec<usize>], adapter: A, config: TdConfig) -> Result<Self>
    where
        A: GameAdapter + Send + Sync + 'static,
    {
        let geometry = adapter.geometry();
        Self::new(sample_points, geometry, config, adapter)
    }

    fn assemble(
        geometry: BoardGeometry,
        config: TdConfig,
        alpha: f64,
        network: NTupleNetwork,
        expander: Box<dyn SymmetryExpander + Send + Sync>,
    ) -> Result<Self> {
        let horizon = config.horizon()?;
        Ok(Self {
            geometry,
            config,
            alpha,
            network,
            history: EligibilityHistory::new(horizon),
            expander,
        })
    }

    // === Scoring ===

    /// Value of `board` for `player`: every tuple over every equivalent
    /// board, squashed with `tanh` when sigmoid output is on.
    pub fn score(&self, board: &[Cell], player: PlayerId) -> Result<f64> {
        self.geometry.validate_player(player)?;
        let boards = self.equivalents(board)?;
        Ok(self.score_boards(player, &boards)?)
    }

    fn score_boards(&self, player: PlayerId, boards: &[Vec<Cell>]) -> Result<f64, ValidationError> {
        let raw = self.network.raw_score(player, boards)?;
        Ok(if self.config.use_sigmoid { raw.tanh() } else { raw })
    }

    /// Equivalent boards of `board`, validated.
    ///
    /// Without symmetry this is `board` alone.
    pub fn equivalents(&self, board: &[Cell]) -> Result<EquivBoards, ValidationError> {
        self.geometry.validate_board(board)?;
        if !self.config.use_symmetry {
            let mut boards = EquivBoards::new();
            boards.push(board.to_vec());
            return Ok(boards);
        }

        let boards: EquivBoards = self.expander.expand(board).into_iter().collect();
        match boards.first() {
            None => return Err(ValidationError::EmptyEquivalenceSet),
            Some(first) if first.as_slice() != board => {
                return Err(ValidationError::EquivalenceFirstNotInput)
            }
            Some(_) => {}
        }
        for (index, equivalent) in boards.iter().enumerate() {
            if equivalent.len() != self.geometry.num_cells {
                return Err(ValidationError::EquivalenceLengthMismatch {
                    index,
                    expected: self.geometry.num_cells,
                    actual: equivalent.len(),
                });
            }
            self.geometry.validate_board(equivalent)?;
        }
        Ok(boards)
    }

    // === Learning ===

    /// Episodic TD update: target is `reward` when `finished`, otherwise
    /// `gamma * score(next, next_player)`.
    ///
    /// `next` is not looked at when `finished` is set.
    pub fn update_weights(
        &mut self,
        current: &[Cell],
        current_player: PlayerId,
        next: &[Cell],
        next_player: PlayerId,
        finished: bool,
        reward: f64,
    ) -> Result<UpdateOutcome> {
        check_reward(reward)?;
        let (boards, v_old) = self.evaluate(current, current_player)?;
        let target = if finished {
            reward
        } else {
            self.config.gamma * self.score(next, next_player)?
        };
        Ok(self.learn(current_player, boards, v_old, target)?)
    }

    /// Continuing TD update: target is `reward + gamma * score(next, next_player)`.
    pub fn update_weights_continuing(
        &mut self,
        current: &[Cell],
        current_player: PlayerId,
        next: &[Cell],
        next_player: PlayerId,
        reward: f64,
    ) -> Result<UpdateOutcome> {
        check_reward(reward)?;
        let (boards, v_old) = self.evaluate(current, current_player)?;
        let target = reward + self.config.gamma * self.score(next, next_player)?;
        Ok(self.learn(current_player, boards, v_old, target)?)
    }

    /// Update towards 0, for positions after which the game is over.
    pub fn update_weights_terminal(
        &mut self,
        current: &[Cell],
        current_player: PlayerId,
    ) -> Result<UpdateOutcome> {
        let (boards, v_old) = self.evaluate(current, current_player)?;
        Ok(self.learn(current_player, boards, v_old, 0.0)?)
    }

    fn evaluate(
        &self,
        board: &[Cell],
        player: PlayerId,
    ) -> Result<(EquivBoards, f64), ValidationError> {
        self.geometry.validate_player(player)?;
        let boards = self.equivalents(board)?;
        let v_old = self.score_boards(player, &boards)?;
        Ok((boards, v_old))
    }

    /// Push the current position into the history and replay the history
    /// newest to oldest with factors `1, lambda, lambda^2, ...`.
    fn learn(
        &mut self,
        player: PlayerId,
        boards: EquivBoards,
        v_old: f64,
        target: f64,
    ) -> Result<UpdateOutcome, ValidationError> {
        let delta = target - v_old;
        let e = if self.config.use_sigmoid {
            let squared = v_old * v_old;
            if !(0.0..=1.0).contains(&squared) {
                warn!(v_old, "squared score outside [0, 1], clamping");
            }
            1.0 - squared.clamp(0.0, 1.0)
        } else {
            1.0
        };

        let alpha = match self.config.target_mode {
            TargetMode::Plain => self.alpha,
            TargetMode::Normalized => {
                self.alpha / (self.network.num_tuples() * boards.len()) as f64
            }
        };

        let num_players = self.network.num_players();
        let tuples = self
            .network
            .tuples_mut(player)
            .ok_or(ValidationError::PlayerOutOfRange {
                player: player.index(),
                num_players,
            })?;
        self.history.push(EquivState::new(boards, e));

        let mut weights_touched = 0;
        let mut lam_factor = 1.0;
        for entry in self.history.iter() {
            let step = lam_factor * entry.squash_derivative;
            for tuple in tuples.iter_mut() {
                tuple.clear_indices();
                for board in &entry.boards {
                    if tuple.apply_update(board, alpha, delta, step)? {
                        weights_touched += 1;
                    }
                }
            }
            lam_factor *= self.config.lambda;
        }

        trace!(%player, v_old, target, delta, weights_touched, "TD update");
        Ok(UpdateOutcome {
            v_old,
            target,
            delta,
            weights_touched,
        })
    }

    /// Decay the learning rate at the end of an episode.
    pub fn finish_update_weights(&mut self) {
        let before = self.alpha;
        self.alpha *= self.config.alpha_decay_ratio;
        debug!(before, after = self.alpha, "decayed alpha");
    }

    /// Fold pending TC signals into the factors of every table.
    /// Returns the number of refreshed weights.
    pub fn update_tc(&mut self) -> usize {
        let refreshed = self.network.update_tc();
        trace!(refreshed, "refreshed TC factors");
        refreshed
    }

    /// Forget the eligibility history, e.g. between episodes.
    pub fn clear_equiv_list(&mut self) {
        self.history.clear();
    }

    /// Re-derive the horizon from the configured lambda.
    pub fn set_horizon(&mut self) -> Result<usize, ValidationError> {
        let horizon = horizon_for(self.config.lambda)?;
        if horizon != self.history.horizon() {
            let dropped = self.history.set_horizon(horizon);
            debug!(horizon, dropped, "changed eligibility horizon");
        }
        Ok(horizon)
    }

    // === Parameters ===

    pub fn set_alpha(&mut self, alpha: f64) -> Result<(), ConfigError> {
        check_param("alpha", alpha, |v| v >= 0.0)?;
        self.alpha = alpha;
        Ok(())
    }

    pub fn set_alpha_decay_ratio(&mut self, ratio: f64) -> Result<(), ConfigError> {
        check_param("alpha_decay_ratio", ratio, |v| v > 0.0)?;
        self.config.alpha_decay_ratio = ratio;
        Ok(())
    }

    /// Change lambda and re-derive the horizon; returns the new horizon.
    pub fn set_lambda(&mut self, lambda: f64) -> Result<usize, ValidationError> {
        horizon_for(lambda)?;
        self.config.lambda = lambda;
        self.set_horizon()
    }

    pub fn set_gamma(&mut self, gamma: f64) -> Result<(), ConfigError> {
        check_param("gamma", gamma, |v| (0.0..=1.0).contains(&v))?;
        self.config.gamma = gamma;
        Ok(())
    }

    // === Introspection ===

    /// Current (decayed) learning rate.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub fn horizon(&self) -> usize {
        self.history.horizon()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn history(&self) -> &EligibilityHistory {
        &self.history
    }

    #[must_use]
    pub fn config(&self) -> &TdConfig {
        &self.config
    }

    #[must_use]
    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn network(&self) -> &NTupleNetwork {
        &self.network
    }

    #[must_use]
    pub fn lut_summary(&self) -> LutSummary {
        self.network.lut_summary()
    }

    #[must_use]
    pub fn lut_sum(&self) -> f64 {
        self.lut_summary().total_sum()
    }

    #[must_use]
    pub fn lut_sum_abs(&self) -> f64 {
        self.lut_summary().total_sum_abs()
    }

    #[must_use]
    pub fn lut_hash_sum(&self) -> f64 {
        self.lut_summary().total_hash_sum()
    }

    // === Persistence ===

    /// Capture tables and parameters. The history is not part of it.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            geometry: self.geometry,
            sample_points: self.network.sample_points(),
            config: self.config.clone(),
            alpha: self.alpha,
            tables: self.network.clone(),
        }
    }

    /// Rebuild an engine from a snapshot with an empty history.
    pub fn from_snapshot<S>(snapshot: Snapshot, expander: S) -> Result<Self>
    where
        S: SymmetryExpander + Send + Sync + 'static,
    {
        snapshot.check()?;
        let Snapshot {
            geometry,
            config,
            alpha,
            tables,
            ..
        } = snapshot;
        Self::assemble(geometry, config, alpha, tables, Box::new(expander))
    }

    /// Write a snapshot to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.snapshot().to_bytes()?;
        std::fs::write(path, &bytes).map_err(SnapshotError::from)?;
        info!(path = %path.display(), bytes = bytes.len(), "saved value function");
        Ok(())
    }

    /// Read a snapshot from `path`. Symmetries are not stored and must be
    /// supplied again.
    pub fn load<S>(path: impl AsRef<Path>, expander: S) -> Result<Self>
    where
        S: SymmetryExpander + Send + Sync + 'static,
    {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(SnapshotError::from)?;
        let engine = Self::from_snapshot(Snapshot::from_bytes(&bytes)?, expander)?;
        info!(
            path = %path.display(),
            weights = engine.network.num_weights(),
            alpha = engine.alpha,
            "loaded value function"
        );
        Ok(engine)
    }
}

fn check_reward(reward: f64) -> Result<(), Error> {
    if reward.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite {
            name: "reward",
            value: reward,
        }
        .into())
    }
}

impl fmt::Debug for NTupleValueFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NTupleValueFunction")
            .field("geometry", &self.geometry)
            .field("config", &self.config)
            .field("alpha", &self.alpha)
            .field("tuples", &self.network.num_tuples())
            .field("horizon", &self.history.horizon())
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}
