//! Analysis parameters.
//!
//! Times share the unit of `HitRecord::hit_time` (nanoseconds in every
//! producer shipped so far).

use crate::{HitError, HitResult};

/// Parameters for the end-of-run analysis of a module.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisConfig {
    /// Coincidence window for multiplicity counting.
    pub time_window: f64,

    /// Weight per-sensor counts by each hit's detection probability instead of
    /// counting raw hits.
    pub weighted_counts: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_window:     20.0,
            weighted_counts: false,
        }
    }
}

impl AnalysisConfig {
    /// Reject windows that are negative or not finite.
    pub fn validate(&self) -> HitResult<()> {
        if !self.time_window.is_finite() || self.time_window < 0.0 {
            return Err(HitError::Config(format!(
                "time_window must be a finite, non-negative number (got {})",
                self.time_window
            )));
        }
        Ok(())
    }
}
