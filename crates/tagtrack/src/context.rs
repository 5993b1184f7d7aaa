//! Per-frame orchestration of the stabilization filters.

use std::collections::BTreeMap;

use tagtrack_core::{Quad, TagId, Transform};
use tagtrack_filter::{BlendFilter, PoseEstimator, PoseSample};

/// Tuning knobs for a [`TrackingContext`].
#[derive(Clone, Copy, Debug)]
pub struct TrackingParams {
    /// Consecutive absent frames a tag survives before it is forgotten.
    pub persistence: u32,
    /// Low-pass gain applied when a cached tag is re-observed;
    /// `0.0` disables corner smoothing.
    pub gain: f64,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            persistence: 5,
            gain: 0.0,
        }
    }
}

/// Drives one camera stream through the full stabilization pipeline.
///
/// Call [`update_tags`](Self::update_tags) once per frame with the raw
/// detections to obtain the de-flickered, smoothed tag set, and
/// [`update_poses`](Self::update_poses) with the raw pose measurements the
/// external solver produced from that set. Pose estimators are created on
/// the first sighting of an object and kept for the lifetime of the
/// context, extrapolating through frames where the object is not measured.
#[derive(Debug)]
pub struct TrackingContext {
    tag_filter: BlendFilter<TagId, Quad>,
    estimators: BTreeMap<String, PoseEstimator>,
}

impl TrackingContext {
    pub fn new(params: TrackingParams) -> Self {
        Self {
            tag_filter: BlendFilter::new(params.persistence, params.gain),
            estimators: BTreeMap::new(),
        }
    }

    /// Reconfigures the tag filter; takes effect from the next frame.
    pub fn set_params(&mut self, params: TrackingParams) {
        self.tag_filter.set_persistence(params.persistence);
        self.tag_filter.set_gain(params.gain);
    }

    /// Stabilizes the raw tag detections of one frame.
    ///
    /// Returns the merged view: every currently detected tag plus tags
    /// still within their persistence window, with corners blended by the
    /// configured gain.
    pub fn update_tags(&mut self, detected: &BTreeMap<TagId, Quad>) -> &BTreeMap<TagId, Quad> {
        let stable = self.tag_filter.update(detected);
        log::debug!(
            "frame: {} detected, {} reported",
            detected.len(),
            stable.len()
        );
        stable
    }

    /// Advances every pose estimator one frame, corrects those with a fresh
    /// measurement, and returns the smoothed transform of every object seen
    /// so far.
    pub fn update_poses(
        &mut self,
        measured: &BTreeMap<String, PoseSample>,
    ) -> BTreeMap<String, Transform> {
        for (name, estimator) in &mut self.estimators {
            estimator.predict();
            if let Some(sample) = measured.get(name) {
                estimator.correct(sample);
            }
        }
        for (name, sample) in measured {
            if !self.estimators.contains_key(name) {
                // The constructor already emits the first prediction.
                self.estimators
                    .insert(name.clone(), PoseEstimator::new(sample));
            }
        }
        self.estimators
            .iter()
            .map(|(name, estimator)| (name.clone(), estimator.transformation_matrix()))
            .collect()
    }

    /// The estimator tracking `name`, if the object has ever been measured.
    pub fn estimator(&self, name: &str) -> Option<&PoseEstimator> {
        self.estimators.get(name)
    }
}
