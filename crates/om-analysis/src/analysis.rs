//! `HitAnalysis` — the consumer-side calls on a hit context.
//!
//! Implemented for [`HitManager`] and [`HitHandle`]; both read the merged
//! store under its lock.  Result sizing follows the module's registered
//! sensor count:
//!
//! | Module state                       | Result                               |
//! |------------------------------------|--------------------------------------|
//! | never registered, no hits          | empty `Vec`                          |
//! | registered, no hits                | zeros, sized by the sensor count     |
//! | hits but never registered          | `HitError::UnregisteredModule`       |

use om_core::{AnalysisConfig, HitError, HitResult, HitStats, ModuleId};
use om_store::{HitHandle, HitManager};
use tracing::debug;

use crate::sort::sort_by_time;
use crate::{HitCounter, MultiplicityAnalyzer};

/// Counts and multiplicity of one module, as produced by
/// [`HitAnalysis::summarize`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleSummary {
    pub module:       ModuleId,
    pub hits:         usize,
    /// Per-sensor counts followed by the total.
    pub counts:       Vec<f64>,
    pub multiplicity: Vec<u64>,
}

/// Resolve the sensor count for a module that may or may not hold hits.
/// `Ok(None)` means "no data yet".
fn sizing(module: ModuleId, stats: Option<&HitStats>, sensor_count: Option<usize>) -> HitResult<Option<usize>> {
    let has_hits = stats.is_some_and(|s| !s.is_empty());
    match (sensor_count, has_hits) {
        (Some(n), _)  => Ok(Some(n)),
        (None, false) => Ok(None),
        (None, true)  => Err(HitError::UnregisteredModule(module)),
    }
}

pub trait HitAnalysis {
    /// Run `f` on the merged hits of `module` and its sensor count.
    fn with_merged<R>(
        &self,
        module: ModuleId,
        f: impl FnOnce(Option<&mut HitStats>, Option<usize>) -> R,
    ) -> HitResult<R>;

    /// Sort the merged hits of `module` by time, in place.
    fn sort_merged_by_time(&self, module: ModuleId) -> HitResult<()> {
        self.with_merged(module, |stats, _| {
            if let Some(stats) = stats {
                sort_by_time(stats);
            }
        })
    }

    /// Per-sensor hit counts of the merged store, plus the total in the last
    /// slot.  `weighted` weights each hit by its detection probability.
    fn count_merged_hits(&self, module: ModuleId, weighted: bool) -> HitResult<Vec<f64>> {
        self.with_merged(module, |stats, sensor_count| -> HitResult<Vec<f64>> {
            let Some(n) = sizing(module, stats.as_deref(), sensor_count)? else {
                return Ok(Vec::new());
            };
            let counter = HitCounter::new(n, weighted);
            Ok(match stats {
                Some(stats) => counter.count(stats),
                None        => counter.count(&HitStats::new()),
            })
        })?
    }

    /// Alias of [`count_merged_hits`](Self::count_merged_hits).
    fn count_hits(&self, module: ModuleId, weighted: bool) -> HitResult<Vec<f64>> {
        self.count_merged_hits(module, weighted)
    }

    /// Coincidence histogram of `module` for `time_window` (see
    /// [`MultiplicityAnalyzer`]).  Sorts the merged hits by time first.
    fn calculate_multiplicity(&self, time_window: f64, module: ModuleId) -> HitResult<Vec<u64>> {
        AnalysisConfig { time_window, weighted_counts: false }.validate()?;
        self.with_merged(module, |stats, sensor_count| -> HitResult<Vec<u64>> {
            let Some(n) = sizing(module, stats.as_deref(), sensor_count)? else {
                return Ok(Vec::new());
            };
            let analyzer = MultiplicityAnalyzer::new(n, time_window);
            Ok(match stats {
                Some(stats) => analyzer.analyze(stats),
                None        => vec![0; n],
            })
        })?
    }

    /// Counts and multiplicity of `module` under `config`.
    fn summarize(&self, module: ModuleId, config: &AnalysisConfig) -> HitResult<ModuleSummary> {
        config.validate()?;
        let counts = self.count_merged_hits(module, config.weighted_counts)?;
        let multiplicity = self.calculate_multiplicity(config.time_window, module)?;
        let hits = self.with_merged(module, |stats, _| stats.map_or(0, |s| s.len()))?;
        debug!(%module, hits, "module summarized");
        Ok(ModuleSummary { module, hits, counts, multiplicity })
    }
}

impl HitAnalysis for HitManager {
    fn with_merged<R>(
        &self,
        module: ModuleId,
        f: impl FnOnce(Option<&mut HitStats>, Option<usize>) -> R,
    ) -> HitResult<R> {
        Ok(self.with_merged_module(module, f))
    }
}

impl HitAnalysis for HitHandle {
    fn with_merged<R>(
        &self,
        module: ModuleId,
        f: impl FnOnce(Option<&mut HitStats>, Option<usize>) -> R,
    ) -> HitResult<R> {
        self.with_merged_module(module, f)
    }
}
