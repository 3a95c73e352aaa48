//! Temporal coherence (TC) bookkeeping.
//!
//! Every weight gets a reliability factor that scales its learning rate.
//! Two accumulators per weight track the learning signal `s = delta * e`:
//!
//! - `n`: signed sum of `s`
//! - `a`: sum of `|s|`
//!
//! The raw factor is `|n| / a`. It stays at 1 while successive signals
//! agree in sign and drops toward 0 when they keep flipping. Weights that
//! never received a signal use [`TcConfig::init`].
//!
//! In accumulating mode the signals of one interval are collected in a
//! pending buffer and folded in by [`TcTable::update`], which the trainer
//! calls every few episodes. In immediate mode every signal is folded in at
//! once and `update` has nothing to do.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Mapping from the raw `|n| / a` ratio to the applied factor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TcTransfer {
    /// Use the ratio directly.
    #[default]
    Identity,
    /// `exp(beta * (ratio - 1))`: 1 for a fully coherent weight, sharper
    /// damping of incoherent weights for larger `beta`.
    Exponential { beta: f64 },
}

impl TcTransfer {
    /// Apply the transfer function to a raw ratio in `[0, 1]`.
    #[must_use]
    pub fn apply(self, ratio: f64) -> f64 {
        match self {
            Self::Identity => ratio,
            Self::Exponential { beta } => (beta * (ratio - 1.0)).exp(),
        }
    }
}

/// Temporal coherence parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TcConfig {
    /// Factor used for weights that have not received any signal yet.
    pub init: f64,

    /// Fold signals in on every update instead of on `update_tc`.
    pub immediate: bool,

    /// Ratio-to-factor mapping.
    pub transfer: TcTransfer,
}

impl Default for TcConfig {
    fn default() -> Self {
        Self {
            init: 1.0,
            immediate: false,
            transfer: TcTransfer::Identity,
        }
    }
}

impl TcConfig {
    /// Set the initial factor.
    #[must_use]
    pub fn with_init(mut self, init: f64) -> Self {
        self.init = init;
        self
    }

    /// Fold every signal in as soon as it is recorded.
    #[must_use]
    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }

    /// Use the exponential transfer with the given `beta`.
    #[must_use]
    pub fn with_exponential(mut self, beta: f64) -> Self {
        self.transfer = TcTransfer::Exponential { beta };
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.init.is_finite() || self.init < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "tc.init",
                value: self.init,
            });
        }
        if let TcTransfer::Exponential { beta } = self.transfer {
            if !beta.is_finite() || beta < 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name: "tc.beta",
                    value: beta,
                });
            }
        }
        Ok(())
    }

    fn factor(&self, n: f64, a: f64) -> f64 {
        if a == 0.0 {
            self.init
        } else {
            self.transfer.apply(n.abs() / a)
        }
    }
}

/// Per-weight TC accumulators for one n-tuple table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TcTable {
    config: TcConfig,
    n: Vec<f64>,
    a: Vec<f64>,
    pending: Vec<f64>,
    factor: Vec<f64>,
}

impl TcTable {
    /// Create accumulators for `len` weights.
    #[must_use]
    pub fn new(config: TcConfig, len: usize) -> Self {
        Self {
            config,
            n: vec![0.0; len],
            a: vec![0.0; len],
            pending: if config.immediate { Vec::new() } else { vec![0.0; len] },
            factor: vec![config.init; len],
        }
    }

    #[must_use]
    pub fn config(&self) -> &TcConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factor.is_empty()
    }

    /// Current reliability factor of weight `index`.
    #[must_use]
    pub fn factor(&self, index: usize) -> f64 {
        self.factor[index]
    }

    /// Record one learning signal for weight `index`.
    pub fn record(&mut self, index: usize, signal: f64) {
        if self.config.immediate {
            self.fold(index, signal);
        } else {
            self.pending[index] += signal;
        }
    }

    /// Fold pending signals into the accumulators and refresh factors.
    ///
    /// Returns the number of weights whose factor was refreshed. A second
    /// call without new signals returns 0 and changes nothing.
    pub fn update(&mut self) -> usize {
        if self.config.immediate {
            return 0;
        }
        let mut refreshed = 0;
        for index in 0..self.pending.len() {
            let signal = std::mem::take(&mut self.pending[index]);
            if signal != 0.0 {
                self.fold(index, signal);
                refreshed += 1;
            }
        }
        refreshed
    }

    fn fold(&mut self, index: usize, signal: f64) {
        self.n[index] += signal;
        self.a[index] += signal.abs();
        self.factor[index] = self.config.factor(self.n[index], self.a[index]);
    }

    pub(crate) fn is_consistent(&self, len: usize) -> bool {
        let pending_len = if self.config.immediate { 0 } else { len };
        self.n.len() == len
            && self.a.len() == len
            && self.factor.len() == len
            && self.pending.len() == pending_len
    }
}
