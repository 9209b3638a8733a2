//! Receiver array geometry
//!
//! The emitter sits at the coordinate origin and doubles as receiver 0.
//! Receivers 1 and 2 are offset along the x axis, receiver 3 along the z
//! axis. This fixed baseline layout is what the staged resolver relies on.

use nalgebra::Vector3;
use thiserror::Error;

use crate::core::constants::{NUM_RECEIVERS, SPEED_OF_SOUND_WATER};

/// Errors raised when constructing a sensor array from malformed geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A non-reference receiver coincides with the emitter, which makes the
    /// bistatic constraint degenerate for every possible reading
    #[error("receiver {index} is coincident with the emitter")]
    ReceiverCoincident { index: usize },
    #[error("wave speed must be positive, got {value}")]
    InvalidWaveSpeed { value: f64 },
    #[error("sample rate must be positive, got {value}")]
    InvalidSampleRate { value: u32 },
}

/// Immutable receiver array configuration shared by all resolver calls
#[derive(Debug, Clone, PartialEq)]
pub struct SensorArray {
    receivers: [Vector3<f64>; NUM_RECEIVERS],
    wave_speed: f64,
    sample_rate: u32,
}

impl SensorArray {
    /// Build the baseline array: receiver 1 at `(x1, 0, 0)`, receiver 2 at
    /// `(x2, 0, 0)`, receiver 3 at `(0, 0, z3)`, with the default wave speed.
    pub fn linear(x1: f64, x2: f64, z3: f64, sample_rate: u32) -> Result<Self, GeometryError> {
        Self::with_wave_speed(x1, x2, z3, SPEED_OF_SOUND_WATER, sample_rate)
    }

    /// Build the baseline array with an explicit wave propagation speed.
    pub fn with_wave_speed(
        x1: f64,
        x2: f64,
        z3: f64,
        wave_speed: f64,
        sample_rate: u32,
    ) -> Result<Self, GeometryError> {
        if !(wave_speed > 0.0) {
            return Err(GeometryError::InvalidWaveSpeed { value: wave_speed });
        }
        if sample_rate == 0 {
            return Err(GeometryError::InvalidSampleRate { value: sample_rate });
        }

        let receivers = [
            Vector3::zeros(),
            Vector3::new(x1, 0.0, 0.0),
            Vector3::new(x2, 0.0, 0.0),
            Vector3::new(0.0, 0.0, z3),
        ];

        for (index, offset) in receivers.iter().enumerate().skip(1) {
            if offset.norm() == 0.0 {
                return Err(GeometryError::ReceiverCoincident { index });
            }
        }

        Ok(Self {
            receivers,
            wave_speed,
            sample_rate,
        })
    }

    /// Offset of receiver `index` from the emitter
    pub fn receiver(&self, index: usize) -> Vector3<f64> {
        self.receivers[index]
    }

    /// All receiver offsets in order, receiver 0 first
    pub fn receivers(&self) -> &[Vector3<f64>; NUM_RECEIVERS] {
        &self.receivers
    }

    /// Wave propagation speed (m/s)
    pub fn wave_speed(&self) -> f64 {
        self.wave_speed
    }

    /// Receiver sample rate (Hz)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration of one sample interval (s)
    pub fn sample_interval(&self) -> f64 {
        1.0 / self.sample_rate as f64
    }

    /// Maximum round-trip time skew between receiver 0 and receiver `index`,
    /// implied by their baseline separation. A reading pair whose times differ
    /// by more than this bound cannot describe the same object, which is what
    /// the assignment engine uses to prune its scan.
    pub fn skew_bound(&self, index: usize) -> f64 {
        self.receivers[index].norm() / self.wave_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_layout() {
        let array = SensorArray::linear(-0.15, 0.25, 0.2, 200_000).unwrap();

        assert_eq!(array.receiver(0), Vector3::zeros());
        assert_eq!(array.receiver(1), Vector3::new(-0.15, 0.0, 0.0));
        assert_eq!(array.receiver(2), Vector3::new(0.25, 0.0, 0.0));
        assert_eq!(array.receiver(3), Vector3::new(0.0, 0.0, 0.2));
        assert_eq!(array.wave_speed(), SPEED_OF_SOUND_WATER);
    }

    #[test]
    fn test_coincident_receiver_rejected() {
        let result = SensorArray::linear(0.0, 0.25, 0.2, 200_000);
        assert_eq!(
            result.unwrap_err(),
            GeometryError::ReceiverCoincident { index: 1 }
        );

        let result = SensorArray::linear(-0.15, 0.25, 0.0, 200_000);
        assert_eq!(
            result.unwrap_err(),
            GeometryError::ReceiverCoincident { index: 3 }
        );
    }

    #[test]
    fn test_invalid_medium_parameters() {
        assert!(SensorArray::with_wave_speed(-0.15, 0.25, 0.2, 0.0, 200_000).is_err());
        assert!(SensorArray::with_wave_speed(-0.15, 0.25, 0.2, 1482.0, 0).is_err());
    }

    #[test]
    fn test_skew_bounds_follow_baselines() {
        let array = SensorArray::linear(-0.15, 0.25, 0.2, 200_000).unwrap();

        assert_eq!(array.skew_bound(1), 0.15 / SPEED_OF_SOUND_WATER);
        assert_eq!(array.skew_bound(2), 0.25 / SPEED_OF_SOUND_WATER);
        assert_eq!(array.skew_bound(3), 0.2 / SPEED_OF_SOUND_WATER);
    }
}
