//! Core geometry types and constants

pub mod array;
pub mod constants;

pub use array::{GeometryError, SensorArray};
pub use constants::{DEFAULT_TOL_DIST, DEFAULT_TOL_OBJ, NUM_RECEIVERS, SPEED_OF_SOUND_WATER};
