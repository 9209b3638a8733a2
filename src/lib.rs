//! Multi-Target Sonar Localization
//!
//! Closed-form 3D localization of echo sources from a four-receiver sonar
//! array. Each receiver reading constrains the source to a quadric surface;
//! intersecting them yields the position directly, without iteration. An
//! assignment engine matches unlabeled per-receiver readings to objects and
//! deduplicates the resolved positions.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    GeometryError, SensorArray, DEFAULT_TOL_DIST, DEFAULT_TOL_OBJ, NUM_RECEIVERS,
    SPEED_OF_SOUND_WATER,
};
pub use crate::algorithms::forward::{forward_time, receiver_times};
pub use crate::algorithms::resolver::{ResolveObserver, Resolver, TraceEvent};
pub use crate::processing::assignment::{
    AssignmentEngine, InputError, PassResult, PassStats, TimeTable,
};
pub use crate::processing::worker::{Command, ResolverWorker, WorkerError};
pub use crate::utils::config::{ConfigError, SonarConfig};
