//! Per-sensor hit tallies.

use om_core::HitStats;

/// Counts hits per sensor of one module.
///
/// The output has `sensor_count + 1` slots: one per sensor followed by the
/// total over all sensors.  In weighted mode each hit contributes its
/// `detection_probability` instead of 1.
#[derive(Clone, Copy, Debug)]
pub struct HitCounter {
    sensor_count: usize,
    weighted:     bool,
}

impl HitCounter {
    pub fn new(sensor_count: usize, weighted: bool) -> Self {
        Self { sensor_count, weighted }
    }

    /// # Panics
    ///
    /// Panics if any hit's sensor index is `>= sensor_count`.
    pub fn count(&self, stats: &HitStats) -> Vec<f64> {
        let mut counts = vec![0.0; self.sensor_count + 1];
        let (per_sensor, total) = counts.split_at_mut(self.sensor_count);
        for (sensor, response) in stats.sensor.iter().zip(&stats.response) {
            let weight = if self.weighted { response.detection_probability } else { 1.0 };
            per_sensor[sensor.index()] += weight;
            total[0] += weight;
        }
        counts
    }
}
