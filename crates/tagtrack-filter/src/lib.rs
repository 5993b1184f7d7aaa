//! Temporal stabilization for per-frame fiducial tag detections.
//!
//! A raw detection stream flickers: a tag briefly lost to motion blur or
//! occlusion vanishes for a frame, and every surviving measurement carries
//! per-frame noise. This crate fixes both, in layers:
//!
//! - [`PersistenceManager`] tracks how long each key has been unseen and
//!   reports which ones to forget;
//! - [`Cache`] keeps the last known value for a key while it survives the
//!   persistence window (pure de-flicker);
//! - [`BlendFilter`] is a cache that additionally low-pass blends re-observed
//!   values with a configurable gain;
//! - [`AveragingFilter`] smooths a single measurement stream over a
//!   gain-controlled window of past samples;
//! - [`DerivativeKalmanFilter`] and [`PoseEstimator`] smooth 3D poses with
//!   constant-derivative Kalman models, and keep producing predictions on
//!   frames with no fresh measurement.
//!
//! All components are single-threaded, synchronous, and meant to be invoked
//! once per video frame; instantiate one set per independent stream.

mod averaging;
mod kalman;
mod persistence;
mod pose;

pub use averaging::{AveragingFilter, CircularBuffer, MAX_FRAMES};
pub use kalman::{DerivativeKalmanFilter, LinearKalman};
pub use persistence::{BlendFilter, Cache, PersistenceManager};
pub use pose::{PoseEstimator, PoseSample};
