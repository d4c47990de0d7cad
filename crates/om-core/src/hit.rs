//! The logical hit record and the sensor pulse attached to it.
//!
//! `HitRecord` is the array-of-structs view of one row of
//! [`HitStats`](crate::HitStats).  Producers build one per detected photon;
//! storage is always column-oriented.

use crate::{SensorId, Vec3};

/// Sensor response to one detected photon.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PulseResponse {
    /// Charge in photoelectrons.
    pub charge: f64,
    /// Transit time relative to the sensor's mean response.
    pub transit_time: f64,
    /// Modelled probability in `[0, 1]` that the photon was registered.
    pub detection_probability: f64,
}

/// One detected photon.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitRecord {
    /// Simulation event that produced the photon.
    pub event_id: u64,
    /// Absolute detection time.
    pub hit_time: f64,
    /// Time of flight from generation to detection.
    pub flight_time: f64,
    pub path_length: f64,
    pub energy: f64,
    /// Must be `< sensor_count` of the module the hit is appended to.
    pub sensor: SensorId,
    pub direction: Vec3,
    pub local_position: Vec3,
    pub global_position: Vec3,
    /// Distance between the photon's generation point and its detection point.
    pub generation_distance: f64,
    pub response: PulseResponse,
}
