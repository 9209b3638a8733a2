//! Staged position resolver
//!
//! Inverts four round-trip readings into one 3D position by successive
//! quadric intersections. Receiver 0's reading fixes a sphere around the
//! emitter; each remaining receiver adds a bistatic ellipse constraint.
//! The stages short-circuit: the first one that finds no consistent
//! candidate fails the whole resolution.
//!
//! The resolvable half-space is `y >= 0`: the planar stage works in the
//! half-plane swept around the x axis, so the mirror solution below the
//! array is never reported.

use nalgebra::Vector3;

use crate::algorithms::quadratic::circle_ellipse_x_intercepts;
use crate::core::{SensorArray, NUM_RECEIVERS};

/// Trace events emitted while a resolution is in progress.
///
/// Stage names and accept/reject reasons are reported through an injected
/// observer so diagnostics stay out of the control flow.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// A receiver's ellipse/sphere intersection produced two axis intercepts
    Intercepts { receiver: usize, first: f64, second: f64 },
    /// A receiver's constraint was degenerate (no real intersection)
    Degenerate { receiver: usize },
    /// The planar stage fixed a provisional (x, lateral-radius) pair
    PlanarAccepted { x: f64, lateral: f64 },
    /// No intercept pair from receivers 1 and 2 agreed within tolerance
    PlanarMismatch,
    /// A depth candidate failed its consistency check
    DepthRejected { z: f64 },
    /// Resolution succeeded
    Resolved { position: Vector3<f64> },
}

/// Observer for resolution trace events
pub trait ResolveObserver {
    fn on_event(&mut self, event: &TraceEvent);
}

/// Observer that discards all events; the default for production passes
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ResolveObserver for NullObserver {
    fn on_event(&mut self, _event: &TraceEvent) {}
}

/// Observer that records every event, mainly for tests and offline analysis
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<TraceEvent>,
}

impl ResolveObserver for RecordingObserver {
    fn on_event(&mut self, event: &TraceEvent) {
        self.events.push(event.clone());
    }
}

/// Closed-form resolver for one receiver-time quadruple
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    array: &'a SensorArray,
    tol: f64,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the given array with an intercept-matching
    /// tolerance (inclusive on both bounds).
    pub fn new(array: &'a SensorArray, tol: f64) -> Self {
        Self { array, tol }
    }

    /// Resolve four receiver readings into a position, if one exists.
    pub fn resolve(&self, times: [f64; NUM_RECEIVERS]) -> Option<Vector3<f64>> {
        self.resolve_traced(times, &mut NullObserver)
    }

    /// Resolve with trace events delivered to `observer`.
    pub fn resolve_traced(
        &self,
        times: [f64; NUM_RECEIVERS],
        observer: &mut dyn ResolveObserver,
    ) -> Option<Vector3<f64>> {
        let v = self.array.wave_speed();
        // Receiver 0 hears its own echo: sphere of radius t0·v/2.
        let radius_sq = (times[0] * v / 2.0).powi(2);

        // Planar stage: receivers 1 and 2 constrain x in the half-plane
        // swept around the x axis.
        let first = self.axis_candidates(1, self.array.receiver(1).x, times[1], radius_sq, observer)?;
        let second = self.axis_candidates(2, self.array.receiver(2).x, times[2], radius_sq, observer)?;

        let (x, lateral) = match self.match_planar(&first, &second) {
            Some(fix) => fix,
            None => {
                observer.on_event(&TraceEvent::PlanarMismatch);
                return None;
            }
        };
        observer.on_event(&TraceEvent::PlanarAccepted { x, lateral });

        // Depth stage: receiver 3's offset lies along z, so the same
        // intercept computation yields z candidates.
        let depth = self.axis_candidates(3, self.array.receiver(3).z, times[3], radius_sq, observer)?;

        // Consistency stage: a depth candidate must reproduce the y already
        // implied by the planar fix.
        for &(z, companion) in &depth {
            let y_from_lateral_sq = lateral * lateral - z * z;
            let y_from_depth_sq = companion * companion - x * x;
            if y_from_lateral_sq < 0.0 || y_from_depth_sq < 0.0 {
                observer.on_event(&TraceEvent::DepthRejected { z });
                continue;
            }

            let y_from_lateral = y_from_lateral_sq.sqrt();
            let y_from_depth = y_from_depth_sq.sqrt();
            if (y_from_lateral - y_from_depth).abs() <= self.tol {
                // Average the two estimates to damp quantization noise.
                let position = Vector3::new(x, (y_from_lateral + y_from_depth) / 2.0, z);
                observer.on_event(&TraceEvent::Resolved { position });
                return Some(position);
            }
            observer.on_event(&TraceEvent::DepthRejected { z });
        }

        None
    }

    /// Intercepts of receiver `index`'s bistatic ellipse with the monostatic
    /// sphere, paired with the companion radius `√(r² − u²)` about the
    /// receiver's axis. Candidates with a negative radicand are dropped.
    fn axis_candidates(
        &self,
        index: usize,
        offset: f64,
        time: f64,
        radius_sq: f64,
        observer: &mut dyn ResolveObserver,
    ) -> Option<Vec<(f64, f64)>> {
        let a = offset / 2.0;
        let b = (time * self.array.wave_speed() / 2.0).powi(2);

        let (u0, u1) = match circle_ellipse_x_intercepts(a, b, radius_sq) {
            Some(roots) => roots,
            None => {
                observer.on_event(&TraceEvent::Degenerate { receiver: index });
                return None;
            }
        };
        observer.on_event(&TraceEvent::Intercepts {
            receiver: index,
            first: u0,
            second: u1,
        });

        let candidates = [u0, u1]
            .into_iter()
            .filter_map(|u| {
                let companion_sq = radius_sq - u * u;
                (companion_sq >= 0.0).then(|| (u, companion_sq.sqrt()))
            })
            .collect::<Vec<_>>();

        if candidates.is_empty() {
            observer.on_event(&TraceEvent::Degenerate { receiver: index });
            return None;
        }
        Some(candidates)
    }

    /// First pair of x intercepts from the two planar receivers that agree
    /// within tolerance. The accepted pair's candidate from receiver 1
    /// provides the provisional position.
    fn match_planar(
        &self,
        first: &[(f64, f64)],
        second: &[(f64, f64)],
    ) -> Option<(f64, f64)> {
        for &(x_a, lateral) in first {
            for &(x_b, _) in second {
                if (x_a - x_b).abs() <= self.tol {
                    return Some((x_a, lateral));
                }
            }
        }
        None
    }
}
