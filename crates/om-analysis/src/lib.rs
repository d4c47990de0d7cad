//! `om-analysis` — end-of-run analysis of merged optical-module hits.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`sort`]          | `time_order`, `apply_permutation`, `sort_by_time`         |
//! | [`multiplicity`]  | `MultiplicityAnalyzer` — sliding coincidence window        |
//! | [`counter`]       | `HitCounter` — per-sensor tallies, optionally weighted     |
//! | [`analysis`]      | `HitAnalysis` trait on `HitManager`/`HitHandle`, `ModuleSummary` |
//!
//! All analyses run after every worker has merged; none of them synchronise
//! with producers beyond the merge lock they read under.
//!
//! ```rust
//! use om_analysis::HitAnalysis;
//! use om_core::{HitRecord, ModuleId, SensorId};
//! use om_store::HitManager;
//!
//! let manager = HitManager::new();
//! manager.register_sensor_count(ModuleId(0), 3);
//! let handle = manager.handle();
//! for (sensor, t) in [(0, 0.0), (1, 2.0), (2, 50.0)] {
//!     let hit = HitRecord { sensor: SensorId(sensor), hit_time: t, ..HitRecord::default() };
//!     handle.append_hit(ModuleId(0), hit).unwrap();
//! }
//! handle.merge_thread_local().unwrap();
//!
//! let histogram = manager.calculate_multiplicity(5.0, ModuleId(0)).unwrap();
//! assert_eq!(histogram, vec![1, 1, 0]);
//! ```

pub mod analysis;
pub mod counter;
pub mod multiplicity;
pub mod sort;


pub use analysis::{HitAnalysis, ModuleSummary};
pub use counter::HitCounter;
pub use multiplicity::MultiplicityAnalyzer;
pub use sort::{apply_permutation, sort_by_time, time_order};
