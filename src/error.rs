use thiserror::Error;

/// Construction-time configuration failures.
///
/// These are the only fatal errors in the core: an invalid metric range,
/// step, threshold pair, or timer interval prevents startup. Everything
/// after construction degrades to a logged no-op instead of failing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid range for {metric}: min {min} > max {max}")]
    InvalidRange {
        metric: &'static str,
        min: f32,
        max: f32,
    },

    #[error("invalid step for {metric}: {step} (must be >= 0)")]
    InvalidStep { metric: &'static str, step: f32 },

    #[error("initial value for {metric} out of range: {value} not in [{min}, {max}]")]
    ValueOutOfRange {
        metric: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("irrigation thresholds inverted: low {low} >= high {high}")]
    InvalidThresholds { low: f32, high: f32 },

    #[error("timer interval must be positive")]
    InvalidInterval,

    #[error("probability {value} for {name} not in [0, 1]")]
    InvalidProbability { name: &'static str, value: f32 },
}
