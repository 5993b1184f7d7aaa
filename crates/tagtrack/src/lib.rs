//! Umbrella crate: stable identities and poses from noisy fiducial tag
//! detections.
//!
//! An external detector produces, once per video frame, a set of decoded tag
//! matrices and quad corners; an external solver turns corner sets into raw
//! pose measurements. This crate supplies everything in between and after:
//!
//! - [`codec`] encodes tag ids into 6x6 bit matrices and decodes noisy
//!   matrices back, correcting up to two bit errors;
//! - [`filter`] de-flickers and smooths per-frame observations;
//! - [`objects`] binds several markers to one rigid object with known
//!   offsets, for fused object-level poses;
//! - [`TrackingContext`] wires the filters into a per-frame pipeline.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use tagtrack::{quad, Quad, TagId, TrackingContext, TrackingParams};
//!
//! let mut context = TrackingContext::new(TrackingParams::default());
//! let mut detections: BTreeMap<TagId, Quad> = BTreeMap::new();
//! detections.insert(42, quad([(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)]));
//! let stable = context.update_tags(&detections);
//! assert!(stable.contains_key(&42));
//! ```

pub use tagtrack_codec as codec;
pub use tagtrack_filter as filter;
pub use tagtrack_objects as objects;

pub use tagtrack_codec::{Codec, TagBits};
pub use tagtrack_core::{init_with_level, quad, Quad, TagId, Transform};
pub use tagtrack_filter::{PoseEstimator, PoseSample};
pub use tagtrack_objects::{ObjectConfig, ObjectConfigError};

mod context;

pub use context::{TrackingContext, TrackingParams};
