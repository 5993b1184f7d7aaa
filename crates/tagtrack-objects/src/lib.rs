//! Rigid-object configuration for multi-marker fusion.
//!
//! Several physical markers can be glued to the same rigid object with known
//! relative offsets. This crate parses the declarative configuration that
//! describes those bindings and precomputes, once at load time, each
//! marker's corner geometry in the object frame. The external PnP-style
//! solver then consumes the combined corner sets of all markers seen on an
//! object to produce a single object-level pose.
//!
//! The configuration document is JSON: a top-level map from object name to a
//! list of marker entries.
//!
//! ```json
//! {
//!     "table": [
//!         { "marker": 21, "size": 30.0,
//!           "translation": [-50.0, -100.0, 0.0],
//!           "rotation": [0.0, 0.0, 0.0],
//!           "keep": false }
//!     ]
//! }
//! ```

mod config;

pub use config::{
    default_tag_corners, MarkerConfig, Object, ObjectConfig, ObjectConfigError,
};
