//! Assignment and deduplication engine
//!
//! Consumes four unlabeled per-receiver time lists, enumerates candidate
//! receiver-reading quadruples under geometric pruning bounds, resolves each
//! surviving quadruple, and merges the results into a deduplicated set of
//! object positions. Readings that contribute to an accepted position are
//! claimed so later quadruples in the same pass cannot reuse them.

use nalgebra::Vector3;
use thiserror::Error;

use crate::algorithms::resolver::Resolver;
use crate::core::{SensorArray, NUM_RECEIVERS};

/// Input-contract violations detected at the engine boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("receiver {receiver} has {len} readings, expected {expected}")]
    MismatchedLengths {
        receiver: usize,
        len: usize,
        expected: usize,
    },
    #[error("receiver {receiver} reading {index} is not a positive finite time: {value}")]
    InvalidReading {
        receiver: usize,
        index: usize,
        value: f64,
    },
}

/// Four equal-length per-receiver lists of round-trip readings for one
/// acquisition cycle. The same slot index across lists does not imply the
/// readings belong to the same object.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTable {
    readings: [Vec<f64>; NUM_RECEIVERS],
}

impl TimeTable {
    /// Validate and wrap four per-receiver reading lists.
    ///
    /// All lists must have the same length and every reading must be a
    /// positive finite number of seconds. Zero is rejected: a genuine
    /// detection never quantizes to zero, so a zero can only be a stale
    /// consumed-sentinel leaking in from an upstream producer.
    pub fn new(readings: [Vec<f64>; NUM_RECEIVERS]) -> Result<Self, InputError> {
        let expected = readings[0].len();
        for (receiver, list) in readings.iter().enumerate() {
            if list.len() != expected {
                return Err(InputError::MismatchedLengths {
                    receiver,
                    len: list.len(),
                    expected,
                });
            }
            for (index, &value) in list.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(InputError::InvalidReading {
                        receiver,
                        index,
                        value,
                    });
                }
            }
        }
        Ok(Self { readings })
    }

    /// Number of reading slots per receiver
    pub fn len(&self) -> usize {
        self.readings[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reading `index` of receiver `receiver`
    pub fn reading(&self, receiver: usize, index: usize) -> f64 {
        self.readings[receiver][index]
    }
}

/// Lazily enumerates receiver-reading quadruples that survive the geometric
/// pruning bounds.
///
/// Readings from receivers 1..3 can only belong to the same object as a
/// receiver-0 reading when their times differ by at most the travel-time
/// skew implied by the baseline separation, so whole index subtrees are
/// skipped as soon as a bound fails.
pub struct QuadrupleScan<'t> {
    table: &'t TimeTable,
    bounds: [f64; NUM_RECEIVERS - 1],
    outer_end: usize,
    i: usize,
    j: usize,
    k: usize,
    l: usize,
}

impl<'t> QuadrupleScan<'t> {
    /// Scan the full table.
    pub fn new(table: &'t TimeTable, array: &SensorArray) -> Self {
        Self::with_outer_range(table, array, 0, table.len())
    }

    /// Scan only outer (receiver 0) indices in `outer_start..outer_end`;
    /// used to split the search across workers.
    pub fn with_outer_range(
        table: &'t TimeTable,
        array: &SensorArray,
        outer_start: usize,
        outer_end: usize,
    ) -> Self {
        Self {
            table,
            bounds: [array.skew_bound(1), array.skew_bound(2), array.skew_bound(3)],
            outer_end: outer_end.min(table.len()),
            i: outer_start,
            j: 0,
            k: 0,
            l: 0,
        }
    }

    fn in_bound(&self, receiver: usize, index: usize, t0: f64) -> bool {
        (self.table.reading(receiver, index) - t0).abs() <= self.bounds[receiver - 1]
    }
}

impl<'t> Iterator for QuadrupleScan<'t> {
    type Item = [usize; NUM_RECEIVERS];

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.table.len();
        loop {
            if self.i >= self.outer_end {
                return None;
            }
            if self.j >= n {
                self.i += 1;
                self.j = 0;
                continue;
            }
            if self.k >= n {
                self.j += 1;
                self.k = 0;
                continue;
            }
            if self.l >= n {
                self.k += 1;
                self.l = 0;
                continue;
            }

            let t0 = self.table.reading(0, self.i);
            if !self.in_bound(1, self.j, t0) {
                self.j += 1;
                self.k = 0;
                self.l = 0;
                continue;
            }
            if !self.in_bound(2, self.k, t0) {
                self.k += 1;
                self.l = 0;
                continue;
            }

            let item = [self.i, self.j, self.k, self.l];
            let accept = self.in_bound(3, self.l, t0);
            self.l += 1;
            if accept {
                return Some(item);
            }
        }
    }
}

/// Statistics for one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Number of resolver invocations (quadruples that survived pruning)
    pub resolver_runs: usize,
    /// Number of positions accepted into the output set
    pub accepted: usize,
}

/// Output of one resolution pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    /// Deduplicated object positions, in acceptance order
    pub positions: Vec<Vector3<f64>>,
    pub stats: PassStats,
}

/// Drives the resolver over all candidate quadruples of a time table
#[derive(Debug, Clone)]
pub struct AssignmentEngine<'a> {
    array: &'a SensorArray,
    tol_dist: f64,
    tol_obj: f64,
}

impl<'a> AssignmentEngine<'a> {
    /// `tol_dist` is the resolver's intercept-matching tolerance, `tol_obj`
    /// the axis-wise box inside which two resolved positions count as the
    /// same object.
    pub fn new(array: &'a SensorArray, tol_dist: f64, tol_obj: f64) -> Self {
        Self {
            array,
            tol_dist,
            tol_obj,
        }
    }

    /// Run one full sequential pass.
    ///
    /// Quadruples are visited in lexicographic index order; readings are
    /// claimed greedily, so the first quadruple that resolves a new object
    /// wins its readings. The table itself is never mutated, which makes a
    /// repeated pass over the same table produce the same result.
    pub fn run_pass(&self, table: &TimeTable) -> PassResult {
        let resolver = Resolver::new(self.array, self.tol_dist);
        let mut claimed = ClaimMap::new(table.len());
        let mut positions: Vec<Vector3<f64>> = Vec::new();
        let mut runs = 0;

        for quad in QuadrupleScan::new(table, self.array) {
            if claimed.any(&quad) {
                continue;
            }
            runs += 1;
            if let Some(position) = resolver.resolve(self.quad_times(table, &quad)) {
                if self.is_duplicate(&positions, position) {
                    continue;
                }
                positions.push(position);
                claimed.claim(&quad);
            }
        }

        let stats = PassStats {
            resolver_runs: runs,
            accepted: positions.len(),
        };
        PassResult { positions, stats }
    }

    /// Run one pass with the outer index range split across `workers`
    /// scoped threads.
    ///
    /// Workers resolve candidates independently; the merge then replays the
    /// claim/deduplicate step serially in lexicographic quadruple order, so
    /// the output is identical to [`run_pass`](Self::run_pass). Resolver-run
    /// counts differ: workers cannot see each other's claims, so they
    /// resolve quadruples the sequential pass would have skipped.
    pub fn run_pass_parallel(&self, table: &TimeTable, workers: usize) -> PassResult {
        let n = table.len();
        if workers <= 1 || n < 2 {
            return self.run_pass(table);
        }

        let chunk = n.div_ceil(workers);
        let (candidates, runs) = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    let start = w * chunk;
                    let end = n.min(start + chunk);
                    scope.spawn(move |_| {
                        let resolver = Resolver::new(self.array, self.tol_dist);
                        let mut found = Vec::new();
                        let mut runs = 0;
                        for quad in
                            QuadrupleScan::with_outer_range(table, self.array, start, end)
                        {
                            runs += 1;
                            if let Some(position) =
                                resolver.resolve(self.quad_times(table, &quad))
                            {
                                found.push((quad, position));
                            }
                        }
                        (found, runs)
                    })
                })
                .collect();

            let mut candidates = Vec::new();
            let mut runs = 0;
            for handle in handles {
                let (found, worker_runs) = handle.join().unwrap();
                candidates.extend(found);
                runs += worker_runs;
            }
            (candidates, runs)
        })
        .unwrap();

        // Workers cover increasing disjoint outer ranges and each emits in
        // scan order, so `candidates` is already in lexicographic quadruple
        // order and the serialized merge reproduces the greedy pass.
        let mut claimed = ClaimMap::new(n);
        let mut positions: Vec<Vector3<f64>> = Vec::new();
        for (quad, position) in candidates {
            if claimed.any(&quad) || self.is_duplicate(&positions, position) {
                continue;
            }
            positions.push(position);
            claimed.claim(&quad);
        }

        let stats = PassStats {
            resolver_runs: runs,
            accepted: positions.len(),
        };
        PassResult { positions, stats }
    }

    fn quad_times(&self, table: &TimeTable, quad: &[usize; NUM_RECEIVERS]) -> [f64; NUM_RECEIVERS] {
        [
            table.reading(0, quad[0]),
            table.reading(1, quad[1]),
            table.reading(2, quad[2]),
            table.reading(3, quad[3]),
        ]
    }

    fn is_duplicate(&self, accepted: &[Vector3<f64>], position: Vector3<f64>) -> bool {
        accepted.iter().any(|p| {
            (p.x - position.x).abs() <= self.tol_obj
                && (p.y - position.y).abs() <= self.tol_obj
                && (p.z - position.z).abs() <= self.tol_obj
        })
    }
}

/// Per-reading claimed flags, one lane per receiver.
///
/// Replaces the zero-overwrite consumed sentinel: a reading keeps its value
/// for the whole pass and consumption is tracked separately.
struct ClaimMap {
    lanes: [Vec<bool>; NUM_RECEIVERS],
}

impl ClaimMap {
    fn new(len: usize) -> Self {
        Self {
            lanes: std::array::from_fn(|_| vec![false; len]),
        }
    }

    fn any(&self, quad: &[usize; NUM_RECEIVERS]) -> bool {
        self.lanes
            .iter()
            .zip(quad)
            .any(|(lane, &index)| lane[index])
    }

    fn claim(&mut self, quad: &[usize; NUM_RECEIVERS]) {
        for (lane, &index) in self.lanes.iter_mut().zip(quad) {
            lane[index] = true;
        }
    }
}
