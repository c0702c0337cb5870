//! Range checks for setup files and parameter values.
//!
//! The engine clamps everything it is given, so an out-of-range value never
//! breaks audio. Validation exists so that a typo in a setup file is reported
//! instead of silently clamped.
//!
//! # Example
//!
//! ```rust
//! use grit_config::{GritConfig, ValidationError};
//!
//! let mut config = GritConfig::default();
//! config.params.mix = 1.5;
//! config.engine.pool_blocks = 0;
//!
//! match config.validate() {
//!     Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
//!     other => panic!("expected two errors, got {other:?}"),
//! }
//! ```

use grit_core::{BlockPool, ParamId};
use thiserror::Error;

use crate::config::GritConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Value out of range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted field name, e.g. `params.mix`.
        field: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// A combination of fields that cannot work together.
    #[error("'{field}': {reason}")]
    Inconsistent {
        /// Dotted field name.
        field: String,
        /// Description of the problem.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collects errors so a whole file is reported at once.
#[derive(Default)]
struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    fn range(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !(value.is_finite() && (min..=max).contains(&value)) {
            self.errors.push(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min,
                max,
            });
        }
    }

    fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}

/// Checks one parameter value against its range.
pub fn validate_param(id: ParamId, value: f32) -> ValidationResult<()> {
    let spec = id.spec();
    let mut checker = Checker::default();
    checker.range(
        &format!("params.{}", id.name()),
        f64::from(value),
        f64::from(spec.min),
        f64::from(spec.max),
    );
    checker.finish()
}

/// Checks every field of a setup file.
pub fn validate_config(config: &GritConfig) -> ValidationResult<()> {
    let mut c = Checker::default();

    let engine = &config.engine;
    c.range(
        "engine.sample_rate",
        f64::from(engine.sample_rate),
        8_000.0,
        384_000.0,
    );
    c.range(
        "engine.pool_blocks",
        engine.pool_blocks as f64,
        1.0,
        BlockPool::MAX_CAPACITY as f64,
    );
    c.range("engine.queue_depth", engine.queue_depth as f64, 1.0, 64.0);

    let delay = &config.delay;
    c.range("delay.max_ms", f64::from(delay.max_ms), 1.0, 10_000.0);
    c.range("delay.left_ms", f64::from(delay.left_ms), 0.0, 10_000.0);
    c.range("delay.right_ms", f64::from(delay.right_ms), 0.0, 10_000.0);
    for (field, tap) in [("delay.left_ms", delay.left_ms), ("delay.right_ms", delay.right_ms)] {
        if tap > delay.max_ms {
            c.errors.push(ValidationError::Inconsistent {
                field: field.to_string(),
                reason: format!("tap of {tap} ms exceeds delay.max_ms ({} ms)", delay.max_ms),
            });
        }
    }

    let nyquist = f64::from(engine.sample_rate) / 2.0;
    c.range(
        "filter.cutoff_hz",
        f64::from(config.filter.cutoff_hz),
        20.0,
        nyquist.max(20.0),
    );
    c.range(
        "filter.resonance",
        f64::from(config.filter.resonance),
        f64::from(grit_core::svf::MIN_RESONANCE),
        f64::from(grit_core::svf::MAX_RESONANCE),
    );

    let limiter = &config.limiter;
    c.range("limiter.attack_ms", f64::from(limiter.attack_ms), 0.0, 1_000.0);
    c.range("limiter.hold_ms", f64::from(limiter.hold_ms), 0.0, 5_000.0);
    c.range("limiter.release_ms", f64::from(limiter.release_ms), 0.0, 5_000.0);
    c.range("limiter.threshold_db", f64::from(limiter.threshold_db), -60.0, 0.0);

    for id in ParamId::ALL {
        let spec = id.spec();
        c.range(
            &format!("params.{}", id.name()),
            f64::from(config.params.get(id)),
            f64::from(spec.min),
            f64::from(spec.max),
        );
    }

    c.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&GritConfig::default()), Ok(()));
    }

    #[test]
    fn single_error_is_not_wrapped() {
        let mut config = GritConfig::default();
        config.params.noise = 61;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { ref field, .. } if field == "params.noise"
        ));
    }

    #[test]
    fn tap_longer_than_line_is_inconsistent() {
        let mut config = GritConfig::default();
        config.delay.max_ms = 100.0;
        let err = validate_config(&config).unwrap_err();
        let ValidationError::Multiple(errors) = err else {
            panic!("both taps should be reported");
        };
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, ValidationError::Inconsistent { .. }))
        );
    }

    #[test]
    fn nan_is_out_of_range() {
        let mut config = GritConfig::default();
        config.filter.cutoff_hz = f32::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn cutoff_limited_by_sample_rate() {
        let mut config = GritConfig::default();
        config.engine.sample_rate = 8000;
        config.filter.cutoff_hz = 5000.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn single_param_check() {
        assert!(validate_param(ParamId::Mix, 0.3).is_ok());
        assert!(validate_param(ParamId::Feedback, 1.01).is_err());
        assert!(validate_param(ParamId::Density, 100.0).is_ok());
    }

    #[test]
    fn multiple_display_joins_messages() {
        let err = ValidationError::Multiple(vec![
            ValidationError::Inconsistent {
                field: "a".into(),
                reason: "x".into(),
            },
            ValidationError::Inconsistent {
                field: "b".into(),
                reason: "y".into(),
            },
        ]);
        assert_eq!(err.to_string(), "multiple validation errors: 'a': x; 'b': y");
    }
}
