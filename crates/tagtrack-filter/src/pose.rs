//! Temporal smoothing of 3D rigid poses.

use nalgebra::{DVector, Rotation3, Vector3};

use tagtrack_core::Transform;

use crate::kalman::DerivativeKalmanFilter;

/// Number of derivative orders tracked per pose component: the measured
/// quantity plus one derivative (constant-velocity model).
const POSE_ORDERS: usize = 2;

/// A raw pose measurement from the external pose solver: a translation and
/// an axis-angle rotation, both in the camera frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseSample {
    pub translation: Vector3<f64>,
    pub rotation: Vector3<f64>,
}

impl PoseSample {
    pub fn new(translation: Vector3<f64>, rotation: Vector3<f64>) -> Self {
        Self {
            translation,
            rotation,
        }
    }
}

/// Smooths the pose of one rigid object over time.
///
/// Composes two [`DerivativeKalmanFilter`]s, one over the 3D translation and
/// one over the 3D axis-angle rotation, plus a counter of frames elapsed
/// since the last real measurement. Calling [`predict`](Self::predict)
/// without [`correct`](Self::correct) keeps producing a coherent
/// (extrapolated) transform on frames where the object was not seen; the
/// caller can consult [`measurement_age`](Self::measurement_age) to decide
/// how long it trusts those extrapolations.
#[derive(Clone, Debug)]
pub struct PoseEstimator {
    translation: DerivativeKalmanFilter,
    rotation: DerivativeKalmanFilter,
    measurement_age: u32,
}

impl PoseEstimator {
    /// Creates an estimator initialized on the first observed pose.
    pub fn new(first: &PoseSample) -> Self {
        Self {
            translation: DerivativeKalmanFilter::new(3, POSE_ORDERS, &to_dvector(&first.translation)),
            rotation: DerivativeKalmanFilter::new(3, POSE_ORDERS, &to_dvector(&first.rotation)),
            measurement_age: 0,
        }
    }

    /// Advances both filters one frame without a measurement.
    pub fn predict(&mut self) {
        self.measurement_age = self.measurement_age.saturating_add(1);
        self.translation.predict();
        self.rotation.predict();
    }

    /// Incorporates a fresh pose measurement.
    pub fn correct(&mut self, sample: &PoseSample) {
        self.measurement_age = 0;
        self.translation.correct(&to_dvector(&sample.translation));
        self.rotation.correct(&to_dvector(&sample.rotation));
    }

    /// Frames elapsed since the last [`correct`](Self::correct).
    pub fn measurement_age(&self) -> u32 {
        self.measurement_age
    }

    /// Smoothed translation estimate.
    pub fn translation(&self) -> Vector3<f64> {
        from_dvector(&self.translation.estimate())
    }

    /// Smoothed axis-angle rotation estimate.
    pub fn rotation(&self) -> Vector3<f64> {
        from_dvector(&self.rotation.estimate())
    }

    /// Reconstructs the homogeneous 4×4 transform from the smoothed
    /// translation and rotation.
    pub fn transformation_matrix(&self) -> Transform {
        let rotation = Rotation3::from_scaled_axis(self.rotation());
        let mut transform = Transform::identity();
        transform
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(rotation.matrix());
        transform
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.translation());
        transform
    }
}

fn to_dvector(v: &Vector3<f64>) -> DVector<f64> {
    DVector::from_column_slice(v.as_slice())
}

fn from_dvector(v: &DVector<f64>) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn initial_transform_reproduces_the_first_pose() {
        let sample = PoseSample::new(
            Vector3::new(10.0, 20.0, 30.0),
            Vector3::new(0.0, 0.0, FRAC_PI_2),
        );
        let estimator = PoseEstimator::new(&sample);
        let m = estimator.transformation_matrix();

        // Quarter turn around Z: x-axis maps to y-axis.
        assert_relative_eq!(m[(1, 0)], 1.0, epsilon = 1e-9);
        assert_relative_eq!(m[(0, 1)], -1.0, epsilon = 1e-9);
        assert_relative_eq!(m[(0, 3)], 10.0, epsilon = 1e-9);
        assert_relative_eq!(m[(1, 3)], 20.0, epsilon = 1e-9);
        assert_relative_eq!(m[(2, 3)], 30.0, epsilon = 1e-9);
        assert_relative_eq!(m[(3, 3)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(m[(3, 0)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn predict_without_correct_keeps_producing_transforms() {
        let sample = PoseSample::new(Vector3::new(1.0, 2.0, 3.0), Vector3::zeros());
        let mut estimator = PoseEstimator::new(&sample);
        assert_eq!(estimator.measurement_age(), 0);

        for age in 1..=25 {
            estimator.predict();
            assert_eq!(estimator.measurement_age(), age);
            let m = estimator.transformation_matrix();
            assert!(m.iter().all(|v| v.is_finite()));
        }
        // Zero initial derivatives and no corrections: the pose must not
        // drift away from the initial measurement.
        assert_relative_eq!(
            estimator.translation(),
            Vector3::new(1.0, 2.0, 3.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn correct_resets_the_measurement_age() {
        let sample = PoseSample::new(Vector3::zeros(), Vector3::zeros());
        let mut estimator = PoseEstimator::new(&sample);
        estimator.predict();
        estimator.predict();
        assert_eq!(estimator.measurement_age(), 2);
        estimator.correct(&sample);
        assert_eq!(estimator.measurement_age(), 0);
    }

    #[test]
    fn steady_measurements_converge_to_the_measured_pose() {
        let first = PoseSample::new(Vector3::zeros(), Vector3::zeros());
        let steady = PoseSample::new(
            Vector3::new(5.0, -3.0, 12.0),
            Vector3::new(0.2, -0.1, 0.4),
        );
        let mut estimator = PoseEstimator::new(&first);
        for _ in 0..200 {
            estimator.predict();
            estimator.correct(&steady);
        }
        assert_relative_eq!(estimator.translation(), steady.translation, epsilon = 1e-2);
        assert_relative_eq!(estimator.rotation(), steady.rotation, epsilon = 1e-2);
    }
}
