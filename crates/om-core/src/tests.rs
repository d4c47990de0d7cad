//! Unit tests for om-core primitives.

#[cfg(test)]
mod ids {
    use crate::{ModuleId, SensorId};

    #[test]
    fn index_roundtrip() {
        let id = SensorId(23);
        assert_eq!(id.index(), 23);
        assert_eq!(SensorId::try_from(23usize).unwrap(), id);
    }

    #[test]
    fn sensor_id_rejects_overflow() {
        assert!(SensorId::try_from(70_000usize).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(ModuleId(3).to_string(), "ModuleId(3)");
    }
}

#[cfg(test)]
mod vector {
    use crate::Vec3;

    #[test]
    fn length_and_distance() {
        assert_eq!(Vec3::new(3.0, 4.0, 0.0).length(), 5.0);
        assert_eq!(Vec3::ZERO.distance(Vec3::new(0.0, 0.0, 2.0)), 2.0);
    }

    #[test]
    fn default_is_origin() {
        assert_eq!(Vec3::default(), Vec3::ZERO);
        let hit = crate::HitRecord::default();
        assert_eq!(hit.global_position, Vec3::ZERO);
        assert_eq!(hit.direction.length(), 0.0);
    }
}

#[cfg(test)]
mod stats {
    use crate::{HitError, HitRecord, HitStats, PulseResponse, SensorId, Vec3};

    fn hit(event_id: u64, t: f64, sensor: u16) -> HitRecord {
        HitRecord {
            event_id,
            hit_time:  t,
            energy:    2.5e-6 * (sensor as f64 + 1.0),
            sensor:    SensorId(sensor),
            direction: Vec3::new(0.0, 0.0, -1.0),
            response:  PulseResponse {
                charge:                1.0,
                transit_time:          t * 0.1,
                detection_probability: 0.8,
            },
            ..HitRecord::default()
        }
    }

    #[test]
    fn new_is_empty() {
        let stats = HitStats::new();
        assert!(stats.is_empty());
        assert_eq!(stats.len(), 0);
        assert!(stats.get(0).is_none());
        assert!(stats.check_columns().is_ok());
    }

    #[test]
    fn push_keeps_columns_in_step() {
        let mut stats = HitStats::new();
        stats.push(hit(1, 10.0, 0));
        stats.push(hit(1, 5.0, 3));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.event_id.len(), 2);
        assert_eq!(stats.response.len(), 2);
        assert_eq!(stats.sensor, vec![SensorId(0), SensorId(3)]);
        stats.check_columns().unwrap();
    }

    #[test]
    fn get_returns_the_pushed_row() {
        let mut stats = HitStats::new();
        let a = hit(7, 1.5, 2);
        stats.push(a);
        assert_eq!(stats.get(0), Some(a));
        assert_eq!(stats.get(1), None);
    }

    #[test]
    fn records_iterate_in_storage_order() {
        let input = vec![hit(0, 3.0, 1), hit(1, 1.0, 0), hit(2, 2.0, 1)];
        let stats: HitStats = input.iter().copied().collect();
        let rows: Vec<_> = stats.records().collect();
        assert_eq!(rows, input);
        assert_eq!(stats.records().len(), 3);
    }

    #[test]
    fn append_moves_all_columns() {
        let mut a: HitStats = [hit(0, 1.0, 0)].into_iter().collect();
        let mut b: HitStats = [hit(1, 2.0, 1), hit(2, 3.0, 2)].into_iter().collect();
        a.append(&mut b);
        assert_eq!(a.len(), 3);
        assert!(b.is_empty());
        assert_eq!(a.event_id, vec![0, 1, 2]);
        a.check_columns().unwrap();
        b.check_columns().unwrap();
    }

    #[test]
    fn clear_empties_every_column() {
        let mut stats: HitStats = [hit(0, 1.0, 0), hit(1, 2.0, 0)].into_iter().collect();
        stats.clear();
        assert!(stats.is_empty());
        assert!(stats.direction.is_empty());
        assert!(stats.generation_distance.is_empty());
    }

    #[test]
    fn check_columns_reports_the_short_column() {
        let mut stats: HitStats = [hit(0, 1.0, 0), hit(1, 2.0, 0)].into_iter().collect();
        stats.energy.pop();
        match stats.check_columns() {
            Err(HitError::ColumnLengthMismatch { expected, got, what }) => {
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
                assert_eq!(what, "energy");
            }
            other => panic!("expected a length mismatch, got {other:?}"),
        }
    }

    #[test]
    fn visitor_sees_every_column() {
        struct Names(Vec<&'static str>);
        impl crate::stats::ColumnVisitor for Names {
            fn visit<T>(&mut self, name: &'static str, _column: &mut Vec<T>) {
                self.0.push(name);
            }
        }
        let mut names = Names(vec![]);
        HitStats::new().visit_columns_mut(&mut names);
        assert_eq!(names.0.len(), 11);
        assert_eq!(names.0.first(), Some(&"event_id"));
        assert!(names.0.contains(&"response"));
    }

    #[test]
    fn time_sorted_detection() {
        let sorted: HitStats = [hit(0, 1.0, 0), hit(1, 1.0, 1), hit(2, 4.0, 0)].into_iter().collect();
        let unsorted: HitStats = [hit(0, 2.0, 0), hit(1, 1.0, 1)].into_iter().collect();
        assert!(sorted.is_time_sorted());
        assert!(!unsorted.is_time_sorted());
        assert!(HitStats::new().is_time_sorted());
    }
}

#[cfg(test)]
mod config {
    use crate::AnalysisConfig;

    #[test]
    fn default_is_valid() {
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_negative_and_nan_windows() {
        let negative = AnalysisConfig { time_window: -1.0, ..Default::default() };
        let nan = AnalysisConfig { time_window: f64::NAN, ..Default::default() };
        assert!(negative.validate().is_err());
        assert!(nan.validate().is_err());
    }

    #[test]
    fn zero_window_is_allowed() {
        let cfg = AnalysisConfig { time_window: 0.0, weighted_counts: true };
        cfg.validate().unwrap();
    }
}
