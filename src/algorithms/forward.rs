//! Forward time-of-flight model
//!
//! Computes the round-trip travel time the array would record for a
//! hypothesized object position. Used to synthesize receiver readings in
//! tests and simulations; the resolver inverts this model.

use nalgebra::Vector3;

use crate::core::{SensorArray, NUM_RECEIVERS};

/// Exact round-trip travel time: emitter (at the origin) to the object, then
/// object to the given receiver, at the given wave speed.
pub fn travel_time(object: Vector3<f64>, receiver: Vector3<f64>, wave_speed: f64) -> f64 {
    (object.norm() + (object - receiver).norm()) / wave_speed
}

/// Quantize a time upward to the next multiple of the sample interval.
///
/// A sampled receiver reports the first sample at or after the true arrival,
/// so round-trip times are always rounded up, never down. A positive input
/// never quantizes to zero.
pub fn quantize_up(time: f64, sample_rate: u32) -> f64 {
    let interval = 1.0 / sample_rate as f64;
    time - time % interval + interval
}

/// Round-trip time for one receiver, exact or quantized to the sampling
/// interval.
pub fn forward_time(
    object: Vector3<f64>,
    receiver: Vector3<f64>,
    wave_speed: f64,
    sample_rate: u32,
    exact: bool,
) -> f64 {
    let time = travel_time(object, receiver, wave_speed);
    if exact {
        time
    } else {
        quantize_up(time, sample_rate)
    }
}

/// Readings every receiver in the array would record for one object.
pub fn receiver_times(
    object: Vector3<f64>,
    array: &SensorArray,
    exact: bool,
) -> [f64; NUM_RECEIVERS] {
    let mut times = [0.0; NUM_RECEIVERS];
    for (slot, receiver) in times.iter_mut().zip(array.receivers()) {
        *slot = forward_time(
            object,
            *receiver,
            array.wave_speed(),
            array.sample_rate(),
            exact,
        );
    }
    times
}
