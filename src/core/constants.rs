//! Physical constants and system parameters

/// Speed of sound in water under standard conditions (m/s)
pub const SPEED_OF_SOUND_WATER: f64 = 1482.0;

/// Default tolerance for accepting two quadric intercepts as the same
/// point of intersection (m)
pub const DEFAULT_TOL_DIST: f64 = 3.0;

/// Default axis-wise tolerance for merging two resolved positions into a
/// single detected object (m)
pub const DEFAULT_TOL_OBJ: f64 = 0.25;

/// Number of receivers in the array, including the co-located emitter
pub const NUM_RECEIVERS: usize = 4;
