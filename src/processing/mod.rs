//! Multi-target processing: candidate assignment over unlabeled readings
//! and the background resolution worker

pub mod assignment;
pub mod worker;

pub use assignment::{
    AssignmentEngine, InputError, PassResult, PassStats, QuadrupleScan, TimeTable,
};
pub use worker::{Command, ResolverWorker, WorkerError};
