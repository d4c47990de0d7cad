//! `om-core` — data model for the optical-module hit engine.
//!
//! Every other `om-*` crate depends on this one.  It has no `om-*`
//! dependencies and a single required external one (`thiserror`), plus
//! optional `serde`.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `ModuleId`, `SensorId`                                |
//! | [`vector`]      | `Vec3`                                                |
//! | [`hit`]         | `HitRecord`, `PulseResponse`                          |
//! | [`stats`]       | `HitStats` (column store), `ColumnVisitor`            |
//! | [`config`]      | `AnalysisConfig`                                      |
//! | [`error`]       | `HitError`, `HitResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |

pub mod config;
pub mod error;
pub mod hit;
pub mod ids;
pub mod stats;
pub mod vector;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::AnalysisConfig;
pub use error::{HitError, HitResult};
pub use hit::{HitRecord, PulseResponse};
pub use ids::{ModuleId, SensorId};
pub use stats::{ColumnVisitor, HitStats};
pub use vector::Vec3;
