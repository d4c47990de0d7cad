//! `om-store` — multi-threaded hit accumulation for the optical-module engine.
//!
//! # Data flow
//!
//! ```text
//! worker thread ──append_hit──▶ ThreadLocalHitStore (one per thread, no lock)
//!                                      │
//!                         merge_thread_local (end of run)
//!                                      ▼
//!                              GlobalHitMerger (one Mutex, shared)
//!                                      │
//!                          merged_hits / om-analysis
//! ```
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`local`]       | `ThreadLocalHitStore` — one thread's per-module buffers   |
//! | [`merger`]      | `GlobalHitMerger` — mutex-guarded cross-thread store      |
//! | [`registry`]    | `SensorRegistry` — module → sensor count                  |
//! | [`manager`]     | `HitManager` (owning context), `HitHandle` (worker handle)|
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Adds `HitHandle::run_workers` on Rayon's thread pool.  |
//!
//! # Quick-start
//!
//! ```rust
//! use om_core::{HitRecord, ModuleId, SensorId};
//! use om_store::HitManager;
//!
//! let manager = HitManager::new();
//! manager.register_sensor_count(ModuleId(0), 24);
//!
//! let handle = manager.handle();
//! std::thread::scope(|s| {
//!     for t in 0..4u16 {
//!         let handle = handle.clone();
//!         s.spawn(move || {
//!             let hit = HitRecord { sensor: SensorId(t), ..HitRecord::default() };
//!             handle.append_hit(ModuleId(0), hit).unwrap();
//!             handle.merge_thread_local().unwrap();
//!         });
//!     }
//! });
//! assert_eq!(manager.merged_hits(ModuleId(0)).len(), 4);
//! ```

pub mod local;
pub mod manager;
pub mod merger;
pub mod registry;


pub use local::ThreadLocalHitStore;
pub use manager::{HitHandle, HitManager};
pub use merger::GlobalHitMerger;
pub use registry::SensorRegistry;
