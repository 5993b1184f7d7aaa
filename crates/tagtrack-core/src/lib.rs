//! Core types and value contracts for the `tagtrack-*` workspace.
//!
//! This crate is intentionally small. It defines the vocabulary shared by the
//! codec, the temporal filters, and the object configuration: tag
//! identifiers, corner quadrilaterals, rigid transforms, and the value-copy
//! contracts (`Measurement`, `Mix`) that the filters rely on. It does *not*
//! depend on any image type or detection pipeline.

mod logger;
mod measurement;
mod types;

pub use logger::init_with_level;
pub use measurement::{Measurement, Mix};
pub use types::{quad, Quad, TagId, Transform};
