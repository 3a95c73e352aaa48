//! A single n-tuple: sample points plus a dense weight table.
//!
//! The values found at the sample points form a mixed-radix number (first
//! sample point least significant, radix `num_position_values`) which
//! addresses one weight. The table is dense, so an address that was never
//! updated reads 0 (or its random initial value).

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::tc::{TcConfig, TcTable};
use crate::core::{Cell, WeightRng};
use crate::error::{ConfigError, ValidationError};

/// Largest table a single n-tuple may allocate.
pub const MAX_TABLE_SIZE: usize = 1 << 28;

/// Sample point list, inline up to 8 points.
pub type SamplePoints = SmallVec<[usize; 8]>;

/// Validated address of one weight inside an n-tuple table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TupleKey(usize);

impl TupleKey {
    /// Raw table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Initial contents of a weight table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// All weights 0.
    #[default]
    Zero,
    /// Uniform in `[-scale, scale]`.
    Random { scale: f64 },
}

/// One n-tuple with its lookup table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NTuple {
    sample_points: SamplePoints,
    num_position_values: usize,
    weights: Vec<f64>,
    tc: Option<TcTable>,

    /// Keys updated since the last `clear_indices`.
    #[serde(skip)]
    touched: FxHashSet<TupleKey>,
}

impl NTuple {
    /// Create a zero-initialised n-tuple.
    ///
    /// Sample points are not checked against the board size here; the
    /// network does that with the tuple number at hand.
    pub fn new(
        sample_points: &[usize],
        num_position_values: usize,
        tc: Option<&TcConfig>,
    ) -> Result<Self, ConfigError> {
        let too_large = || ConfigError::TableTooLarge {
            arity: sample_points.len(),
            num_position_values,
            limit: MAX_TABLE_SIZE,
        };
        let arity = u32::try_from(sample_points.len()).map_err(|_| too_large())?;
        let size = num_position_values
            .checked_pow(arity)
            .filter(|&size| size <= MAX_TABLE_SIZE)
            .ok_or_else(too_large)?;

        Ok(Self {
            sample_points: SmallVec::from_slice(sample_points),
            num_position_values,
            weights: vec![0.0; size],
            tc: tc.map(|config| TcTable::new(*config, size)),
            touched: FxHashSet::default(),
        })
    }

    /// Refill the table: zeros, or uniform random values drawn from `rng`.
    pub fn init_weights(&mut self, init: WeightInit, rng: &mut WeightRng) {
        match init {
            WeightInit::Zero => self.weights.fill(0.0),
            WeightInit::Random { scale } => {
                for w in &mut self.weights {
                    *w = rng.uniform(scale);
                }
            }
        }
    }

    #[must_use]
    pub fn sample_points(&self) -> &[usize] {
        &self.sample_points
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.sample_points.len()
    }

    #[must_use]
    pub fn num_position_values(&self) -> usize {
        self.num_position_values
    }

    #[must_use]
    pub fn num_weights(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn tc(&self) -> Option<&TcTable> {
        self.tc.as_ref()
    }

    /// Sample `board` at this tuple's points and form the table key.
    pub fn key(&self, board: &[Cell]) -> Result<TupleKey, ValidationError> {
        let mut index = 0;
        let mut place = 1;
        for &point in &self.sample_points {
            let value = board
                .get(point)
                .map(|&v| usize::from(v))
                .ok_or(ValidationError::BoardTooShort {
                    point,
                    len: board.len(),
                })?;
            if value >= self.num_position_values {
                return Err(ValidationError::PositionValueOutOfRange {
                    cell: point,
                    value,
                    limit: self.num_position_values,
                });
            }
            index += value * place;
            place *= self.num_position_values;
        }
        Ok(TupleKey(index))
    }

    /// Key for an explicit value combination, one value per sample point.
    pub fn key_from_values(&self, values: &[Cell]) -> Result<TupleKey, ValidationError> {
        if values.len() != self.arity() {
            return Err(ValidationError::BoardLength {
                expected: self.arity(),
                actual: values.len(),
            });
        }
        let mut index = 0;
        let mut place = 1;
        for (slot, &v) in values.iter().enumerate() {
            let value = usize::from(v);
            if value >= self.num_position_values {
                return Err(ValidationError::PositionValueOutOfRange {
                    cell: slot,
                    value,
                    limit: self.num_position_values,
                });
            }
            index += value * place;
            place *= self.num_position_values;
        }
        Ok(TupleKey(index))
    }

    /// Weight addressed by `board`.
    pub fn score(&self, board: &[Cell]) -> Result<f64, ValidationError> {
        Ok(self.weights[self.key(board)?.0])
    }

    /// Weight stored for an explicit value combination.
    pub fn weight(&self, values: &[Cell]) -> Result<f64, ValidationError> {
        Ok(self.weights[self.key_from_values(values)?.0])
    }

    /// Add `alpha * tc_factor * delta * e` to the weight addressed by `board`.
    ///
    /// A key that was already updated since the last [`clear_indices`]
    /// is left alone and `false` is returned, so symmetric boards that
    /// collapse onto the same key count once per pass.
    ///
    /// [`clear_indices`]: NTuple::clear_indices
    pub fn apply_update(
        &mut self,
        board: &[Cell],
        alpha: f64,
        delta: f64,
        e: f64,
    ) -> Result<bool, ValidationError> {
        let key = self.key(board)?;
        Ok(self.apply_update_key(key, alpha, delta, e))
    }

    fn apply_update_key(&mut self, key: TupleKey, alpha: f64, delta: f64, e: f64) -> bool {
        if !self.touched.insert(key) {
            return false;
        }
        let factor = match self.tc.as_mut() {
            Some(tc) => {
                let factor = tc.factor(key.0);
                tc.record(key.0, delta * e);
                factor
            }
            None => 1.0,
        };
        self.weights[key.0] += alpha * factor * delta * e;
        true
    }

    /// Forget which keys were updated in the current pass.
    pub fn clear_indices(&mut self) {
        self.touched.clear();
    }

    /// Refresh TC factors; returns how many weights changed. No-op without TC.
    pub fn update_tc(&mut self) -> usize {
        self.tc.as_mut().map_or(0, TcTable::update)
    }

    #[must_use]
    pub fn lut_sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    #[must_use]
    pub fn lut_sum_abs(&self) -> f64 {
        self.weights.iter().map(|w| w.abs()).sum()
    }

    /// Position-weighted checksum `sum((i + 1) * w_i)`.
    ///
    /// Unlike [`lut_sum`](NTuple::lut_sum) it changes when weights move
    /// between entries.
    #[must_use]
    pub fn lut_hash_sum(&self) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, w)| (i + 1) as f64 * w)
            .sum()
    }

    pub(crate) fn is_consistent(&self) -> bool {
        let expected = u32::try_from(self.arity())
            .ok()
            .and_then(|arity| self.num_position_values.checked_pow(arity));
        expected == Some(self.weights.len())
            && self
                .tc
                .as_ref()
                .map_or(true, |tc| tc.is_consistent(self.weights.len()))
    }
}
