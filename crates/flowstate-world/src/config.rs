//! World configuration, validation, and error types.
//!
//! [`WorldConfig`] is the input for [`World::new`](crate::World::new).
//! [`validate()`](WorldConfig::validate) checks its invariants before the
//! world is built.

use std::error::Error;
use std::fmt;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`WorldConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `batch_size` was set to zero.
    ZeroBatchSize,
    /// `default_dt` is NaN, infinite, or zero.
    InvalidDefaultDt {
        /// The invalid value.
        value: f64,
    },
    /// `max_sweeps` was set to zero.
    ZeroMaxSweeps,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBatchSize => write!(f, "batch_size must be at least 1"),
            Self::InvalidDefaultDt { value } => {
                write!(f, "default_dt must be finite and non-zero, got {value}")
            }
            Self::ZeroMaxSweeps => write!(f, "max_sweeps must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

// ── WorldConfig ────────────────────────────────────────────────────

/// Configuration for constructing a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Batch size given to grids built by the typed `add_*` constructors.
    /// `None` builds unbatched grids.
    pub batch_size: Option<usize>,
    /// Time step of [`World::step_default`](crate::World::step_default).
    /// Default: 1.0.
    pub default_dt: f64,
    /// Sweep bound of the scheduler. `None` bounds by the number of states.
    pub max_sweeps: Option<usize>,
    /// Log a warning when a physics does not advance age by `dt`.
    /// Default: true.
    pub check_age_contract: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            default_dt: 1.0,
            max_sweeps: None,
            check_age_contract: true,
        }
    }
}

impl WorldConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == Some(0) {
            return Err(ConfigError::ZeroBatchSize);
        }
        if !self.default_dt.is_finite() || self.default_dt == 0.0 {
            return Err(ConfigError::InvalidDefaultDt {
                value: self.default_dt,
            });
        }
        if self.max_sweeps == Some(0) {
            return Err(ConfigError::ZeroMaxSweeps);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_batch_rejected() {
        let config = WorldConfig {
            batch_size: Some(0),
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBatchSize));
    }

    #[test]
    fn bad_default_dt_rejected() {
        for value in [0.0, f64::INFINITY, f64::NAN] {
            let config = WorldConfig {
                default_dt: value,
                ..WorldConfig::default()
            };
            match config.validate() {
                Err(ConfigError::InvalidDefaultDt { .. }) => {}
                other => panic!("expected InvalidDefaultDt for {value}, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_default_dt_allowed() {
        let config = WorldConfig {
            default_dt: -0.5,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_sweeps_rejected() {
        let config = WorldConfig {
            max_sweeps: Some(0),
            ..WorldConfig::default()
        };
        assert_eq!(
            config.validate().map_err(|e| e.to_string()),
            Err("max_sweeps must be at least 1".to_string())
        );
    }
}
