//! TD learning parameters.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, ValidationError};
use crate::ntuple::{TcConfig, WeightInit};

/// How the per-weight step size relates to `alpha`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    /// Every active weight moves by `alpha * delta * e`.
    #[default]
    Plain,
    /// Divide `alpha` by `num_tuples * |equivalent boards|`, so that one
    /// update moves the summed output by roughly `alpha * delta * e`.
    Normalized,
}

/// TD learning configuration.
///
/// Passed to the engine at construction and owned by it. `alpha` is the
/// initial learning rate; the engine keeps the decayed value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TdConfig {
    /// Initial learning rate.
    pub alpha: f64,

    /// Factor applied to `alpha` after every finished episode.
    pub alpha_decay_ratio: f64,

    /// Eligibility trace decay, in `[0, 1)`.
    pub lambda: f64,

    /// Discount applied to the value of the next state.
    pub gamma: f64,

    /// Squash the summed output with `tanh`.
    pub use_sigmoid: bool,

    /// Share learning across the boards returned by the symmetry expander.
    pub use_symmetry: bool,

    /// Step-size normalisation.
    pub target_mode: TargetMode,

    /// Initial weight table contents.
    pub weight_init: WeightInit,

    /// Seed for random weight initialisation.
    pub seed: u64,

    /// Temporal coherence; `None` disables it.
    pub tc: Option<TcConfig>,
}

impl Default for TdConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            alpha_decay_ratio: 0.9998,
            lambda: 0.0,
            gamma: 1.0,
            use_sigmoid: true,
            use_symmetry: true,
            target_mode: TargetMode::Plain,
            weight_init: WeightInit::Zero,
            seed: 42,
            tc: None,
        }
    }
}

impl TdConfig {
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_alpha_decay_ratio(mut self, ratio: f64) -> Self {
        self.alpha_decay_ratio = ratio;
        self
    }

    /// Start at `alpha_init` and decay geometrically so that `alpha` equals
    /// `alpha_final` after `episodes` finished episodes.
    ///
    /// ```
    /// use ntuple_td::learning::TdConfig;
    ///
    /// let config = TdConfig::default().with_alpha_schedule(0.1, 0.001, 2);
    /// assert!((config.alpha_decay_ratio - 0.1).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn with_alpha_schedule(mut self, alpha_init: f64, alpha_final: f64, episodes: u32) -> Self {
        self.alpha = alpha_init;
        self.alpha_decay_ratio = if episodes == 0 || alpha_init == 0.0 {
            1.0
        } else {
            (alpha_final / alpha_init).powf(1.0 / f64::from(episodes))
        };
        self
    }

    #[must_use]
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    #[must_use]
    pub fn with_sigmoid(mut self, use_sigmoid: bool) -> Self {
        self.use_sigmoid = use_sigmoid;
        self
    }

    #[must_use]
    pub fn with_symmetry(mut self, use_symmetry: bool) -> Self {
        self.use_symmetry = use_symmetry;
        self
    }

    #[must_use]
    pub fn with_target_mode(mut self, mode: TargetMode) -> Self {
        self.target_mode = mode;
        self
    }

    #[must_use]
    pub fn with_weight_init(mut self, init: WeightInit) -> Self {
        self.weight_init = init;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_tc(mut self, tc: TcConfig) -> Self {
        self.tc = Some(tc);
        self
    }

    /// Reject parameters the engine cannot learn with.
    pub fn validate(&self) -> Result<(), Error> {
        check_param("alpha", self.alpha, |v| v >= 0.0)?;
        check_param("alpha_decay_ratio", self.alpha_decay_ratio, |v| v > 0.0)?;
        check_param("gamma", self.gamma, |v| (0.0..=1.0).contains(&v))?;
        if let WeightInit::Random { scale } = self.weight_init {
            check_param("weight_init.scale", scale, |v| v >= 0.0)?;
        }
        if let Some(tc) = &self.tc {
            tc.validate()?;
        }
        horizon_for(self.lambda)?;
        Ok(())
    }

    /// Trace horizon derived from `lambda`, see [`horizon_for`].
    pub fn horizon(&self) -> Result<usize, ValidationError> {
        horizon_for(self.lambda)
    }
}

pub(crate) fn check_param(name: &'static str, value: f64, ok: impl Fn(f64) -> bool) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

/// Number of past steps whose trace weight `lambda^k` is still at least
/// 10% of the current step's: `floor(ln 0.1 / ln lambda)`, 0 for
/// `lambda == 0`.
///
/// `lambda` must lie in `[0, 1)`.
///
/// ```
/// use ntuple_td::learning::horizon_for;
///
/// assert_eq!(horizon_for(0.0).unwrap(), 0);
/// assert_eq!(horizon_for(0.5).unwrap(), 3);
/// assert!(horizon_for(1.0).is_err());
/// ```
pub fn horizon_for(lambda: f64) -> Result<usize, ValidationError> {
    if !(0.0..1.0).contains(&lambda) {
        return Err(ValidationError::InvalidLambda(lambda));
    }
    if lambda == 0.0 {
        return Ok(0);
    }
    Ok((0.1f64.ln() / lambda.ln()).floor() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TdConfig::default();
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.alpha_decay_ratio, 0.9998);
        assert_eq!(config.lambda, 0.0);
        assert!(config.use_sigmoid);
        assert!(config.use_symmetry);
        assert!(config.tc.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = TdConfig::default()
            .with_alpha(0.5)
            .with_lambda(0.8)
            .with_gamma(0.9)
            .with_sigmoid(false)
            .with_symmetry(false)
            .with_target_mode(TargetMode::Normalized)
            .with_seed(7)
            .with_tc(TcConfig::default());

        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.lambda, 0.8);
        assert_eq!(config.gamma, 0.9);
        assert!(!config.use_sigmoid);
        assert!(!config.use_symmetry);
        assert_eq!(config.target_mode, TargetMode::Normalized);
        assert_eq!(config.seed, 7);
        assert!(config.tc.is_some());
    }

    #[test]
    fn test_horizon_values() {
        assert_eq!(horizon_for(0.0), Ok(0));
        assert_eq!(horizon_for(0.5), Ok(3));
        assert_eq!(horizon_for(0.8), Ok(10));
        assert_eq!(horizon_for(0.05), Ok(0));
        assert_eq!(horizon_for(1.0), Err(ValidationError::InvalidLambda(1.0)));
        assert!(horizon_for(-0.1).is_err());
        assert!(horizon_for(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(matches!(
            TdConfig::default().with_alpha(f64::NAN).validate(),
            Err(Error::Config(ConfigError::InvalidParameter { name: "alpha", .. }))
        ));
        assert!(TdConfig::default().with_alpha_decay_ratio(0.0).validate().is_err());
        assert!(TdConfig::default().with_gamma(1.5).validate().is_err());
        assert!(matches!(
            TdConfig::default().with_lambda(1.0).validate(),
            Err(Error::Validation(ValidationError::InvalidLambda(_)))
        ));
        assert!(TdConfig::default()
            .with_weight_init(WeightInit::Random { scale: -1.0 })
            .validate()
            .is_err());
    }

    #[test]
    fn test_alpha_schedule() {
        let config = TdConfig::default().with_alpha_schedule(0.1, 0.01, 1000);
        assert_eq!(config.alpha, 0.1);
        let final_alpha = config.alpha * config.alpha_decay_ratio.powi(1000);
        assert!((final_alpha - 0.01).abs() < 1e-12);

        let flat = TdConfig::default().with_alpha_schedule(0.1, 0.01, 0);
        assert_eq!(flat.alpha_decay_ratio, 1.0);
    }

    #[test]
    fn test_serialization() {
        let config = TdConfig::default()
            .with_lambda(0.5)
            .with_weight_init(WeightInit::Random { scale: 0.001 })
            .with_tc(TcConfig::default().with_exponential(2.0));
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: TdConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
