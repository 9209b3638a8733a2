//! Geometric algorithms: forward time model, quadratic primitives, and the
//! staged position resolver

pub mod forward;
pub mod quadratic;
pub mod resolver;

pub use forward::{forward_time, quantize_up, receiver_times, travel_time};
pub use quadratic::{circle_ellipse_x_intercepts, solve_quadratic};
pub use resolver::{NullObserver, RecordingObserver, ResolveObserver, Resolver, TraceEvent};
