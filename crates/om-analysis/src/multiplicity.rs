//! Coincidence multiplicity: how many distinct sensors fire close together.
//!
//! # Algorithm
//!
//! A single forward pass over time-sorted hits.  Hit `i` anchors a window
//! `[t_i, t_i + W]`; every later hit inside it marks its sensor.  The first
//! hit outside the window becomes the next anchor, and hits up to it are never
//! anchors themselves.  A window that runs to the end of the data never finds
//! such a hit, so the skip point stays where it was and each remaining hit
//! anchors its own window.
//!
//! Away from the tail this under-counts compared with anchoring a window at
//! every hit: two overlapping windows that start at different hits are
//! counted once.  Histograms stay comparable across runs that use the same
//! rule.

use om_core::HitStats;
use tracing::trace;

use crate::sort::sort_by_time;

/// Sliding-window coincidence counter for one module.
#[derive(Clone, Debug)]
pub struct MultiplicityAnalyzer {
    sensor_count: usize,
    time_window:  f64,
}

impl MultiplicityAnalyzer {
    /// `sensor_count` sizes the histogram; `time_window` uses the unit of
    /// `hit_time`.
    pub fn new(sensor_count: usize, time_window: f64) -> Self {
        Self { sensor_count, time_window }
    }

    pub fn sensor_count(&self) -> usize {
        self.sensor_count
    }

    pub fn time_window(&self) -> f64 {
        self.time_window
    }

    /// Sort `stats` by time if needed, then count.
    pub fn analyze(&self, stats: &mut HitStats) -> Vec<u64> {
        sort_by_time(stats);
        self.analyze_sorted(stats)
    }

    /// Histogram of window multiplicities: `histogram[k - 1]` is the number
    /// of windows in which exactly `k` distinct sensors fired.  Length is
    /// `sensor_count`.
    ///
    /// `stats` must already be sorted by `hit_time`.
    ///
    /// # Panics
    ///
    /// Panics if any hit's sensor index is `>= sensor_count`.
    pub fn analyze_sorted(&self, stats: &HitStats) -> Vec<u64> {
        debug_assert!(stats.is_time_sorted());

        let times = &stats.hit_time;
        let sensors = &stats.sensor;
        let n = times.len();

        let mut histogram = vec![0u64; self.sensor_count];
        let mut fired = vec![false; self.sensor_count];
        let mut skip_until = 0;

        for i in 0..n {
            if i < skip_until {
                continue;
            }
            fired.fill(false);
            fired[sensors[i].index()] = true;

            for j in (i + 1)..n {
                if times[j] - times[i] > self.time_window {
                    skip_until = j;
                    break;
                }
                fired[sensors[j].index()] = true;
            }

            let distinct = fired.iter().filter(|&&f| f).count();
            histogram[distinct - 1] += 1;
        }

        trace!(hits = n, windows = histogram.iter().sum::<u64>(), "multiplicity computed");
        histogram
    }
}
