use visaflow_core::{AppError, AppResult};

/// Chance that a single admission check also sweeps expired windows.
pub const DEFAULT_SWEEP_PROBABILITY: f64 = 0.01;

/// Tunables for the rate limit service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitSettings {
    sweep_probability: f64,
}

impl RateLimitSettings {
    /// Creates settings with the given sweep probability in `[0, 1]`.
    pub fn new(sweep_probability: f64) -> AppResult<Self> {
        if !(0.0..=1.0).contains(&sweep_probability) {
            return Err(AppError::Validation(format!(
                "rate limit sweep probability must be within [0, 1], got {sweep_probability}"
            )));
        }

        Ok(Self { sweep_probability })
    }

    /// Returns the per-check sweep probability.
    #[must_use]
    pub fn sweep_probability(&self) -> f64 {
        self.sweep_probability
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            sweep_probability: DEFAULT_SWEEP_PROBABILITY,
        }
    }
}
