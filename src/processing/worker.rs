//! Resolution worker
//!
//! Owns a background thread that blocks on a command channel, runs one
//! resolution pass per submitted time table, and ships the results back on
//! an output channel. Commands are handled in submission order, so a pass
//! already queued ahead of a shutdown always runs to completion.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use thiserror::Error;

use crate::core::SensorArray;
use crate::processing::assignment::{AssignmentEngine, PassResult, TimeTable};

/// Commands accepted by the worker thread
#[derive(Debug, Clone)]
pub enum Command {
    /// Run one resolution pass over the table
    Resolve(TimeTable),
    /// Drain nothing further and exit
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("worker thread is no longer running")]
    Disconnected,
}

/// Handle to a background resolution thread
pub struct ResolverWorker {
    commands: Sender<Command>,
    results: Receiver<PassResult>,
    handle: Option<JoinHandle<()>>,
}

impl ResolverWorker {
    /// Spawn the worker thread. The thread blocks on the command channel;
    /// it never polls.
    pub fn spawn(array: SensorArray, tol_dist: f64, tol_obj: f64) -> Self {
        let (command_tx, command_rx) = channel::unbounded::<Command>();
        let (result_tx, result_rx) = channel::unbounded::<PassResult>();

        let handle = thread::spawn(move || {
            let engine = AssignmentEngine::new(&array, tol_dist, tol_obj);
            while let Ok(command) = command_rx.recv() {
                match command {
                    Command::Resolve(table) => {
                        let result = engine.run_pass(&table);
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                    Command::Shutdown => break,
                }
            }
        });

        Self {
            commands: command_tx,
            results: result_rx,
            handle: Some(handle),
        }
    }

    /// Queue one table for resolution.
    pub fn submit(&self, table: TimeTable) -> Result<(), WorkerError> {
        self.commands
            .send(Command::Resolve(table))
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Block until the next pass result is available.
    pub fn recv_result(&self) -> Result<PassResult, WorkerError> {
        self.results.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// A clonable handle to the result channel, for consumers that outlive
    /// this worker handle.
    pub fn results(&self) -> Receiver<PassResult> {
        self.results.clone()
    }

    /// Request shutdown and wait for the thread to finish. Passes queued
    /// before the shutdown command still run.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Send may fail if the thread already exited; join regardless.
            let _ = self.commands.send(Command::Shutdown);
            let _ = handle.join();
        }
    }
}

impl Drop for ResolverWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::forward::receiver_times;
    use crate::core::{DEFAULT_TOL_DIST, DEFAULT_TOL_OBJ, NUM_RECEIVERS};
    use nalgebra::Vector3;

    fn test_array() -> SensorArray {
        SensorArray::linear(-0.15, 0.25, 0.2, 200_000).unwrap()
    }

    fn table_for(objects: &[Vector3<f64>], array: &SensorArray) -> TimeTable {
        let mut readings: [Vec<f64>; NUM_RECEIVERS] = Default::default();
        for &object in objects {
            let times = receiver_times(object, array, true);
            for (list, time) in readings.iter_mut().zip(times) {
                list.push(time);
            }
        }
        TimeTable::new(readings).unwrap()
    }

    #[test]
    fn test_worker_resolves_submitted_table() {
        let array = test_array();
        let objects = vec![Vector3::new(-1.0, 10.0, 0.0), Vector3::new(-10.0, 30.0, -4.0)];
        let table = table_for(&objects, &array);

        let worker = ResolverWorker::spawn(array, DEFAULT_TOL_DIST, DEFAULT_TOL_OBJ);
        worker.submit(table).unwrap();

        let result = worker.recv_result().unwrap();
        assert_eq!(result.positions.len(), 2);
        worker.shutdown();
    }

    #[test]
    fn test_worker_handles_commands_in_order() {
        let array = test_array();
        let first = table_for(&[Vector3::new(-1.0, 10.0, 0.0)], &array);
        let second = table_for(
            &[Vector3::new(-5.0, 20.0, -7.0), Vector3::new(2.0, 15.0, 3.0)],
            &array,
        );

        let worker = ResolverWorker::spawn(array, DEFAULT_TOL_DIST, DEFAULT_TOL_OBJ);
        worker.submit(first).unwrap();
        worker.submit(second).unwrap();

        assert_eq!(worker.recv_result().unwrap().positions.len(), 1);
        assert_eq!(worker.recv_result().unwrap().positions.len(), 2);
        worker.shutdown();
    }

    #[test]
    fn test_queued_pass_completes_before_shutdown() {
        let array = test_array();
        let table = table_for(&[Vector3::new(-3.0, 10.0, 0.0)], &array);

        let worker = ResolverWorker::spawn(array, DEFAULT_TOL_DIST, DEFAULT_TOL_OBJ);
        let results = worker.results();
        worker.submit(table).unwrap();
        worker.shutdown();

        // The resolve command was queued ahead of the shutdown, so its
        // result must be waiting on the channel.
        let result = results.try_recv().unwrap();
        assert_eq!(result.positions.len(), 1);
    }

    #[test]
    fn test_result_channel_disconnects_after_shutdown() {
        let array = test_array();

        let worker = ResolverWorker::spawn(array, DEFAULT_TOL_DIST, DEFAULT_TOL_OBJ);
        let results = worker.results();
        worker.shutdown();

        assert!(results.recv().is_err());
    }
}
