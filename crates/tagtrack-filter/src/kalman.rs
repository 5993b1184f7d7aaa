//! Linear Kalman filtering primitives.

use nalgebra::{DMatrix, DVector};

/// Process noise applied to every state component, per step.
const PROCESS_NOISE: f64 = 1e-4;

/// Measurement noise assumed for every measured component.
const MEASUREMENT_NOISE: f64 = 1e-2;

/// Initial error covariance: the first measurement is trusted moderately.
const INITIAL_ERROR: f64 = 1.0;

/// A generic discrete-time linear Kalman filter.
///
/// Holds the state vector, the linear models and the covariances, and
/// exposes the standard predict/correct steps. Model construction is left
/// to wrappers such as [`DerivativeKalmanFilter`].
#[derive(Clone, Debug)]
pub struct LinearKalman {
    state: DVector<f64>,
    transition: DMatrix<f64>,
    measurement: DMatrix<f64>,
    process_noise: DMatrix<f64>,
    measurement_noise: DMatrix<f64>,
    covariance: DMatrix<f64>,
}

impl LinearKalman {
    /// Assembles a filter from its models.
    ///
    /// # Panics
    ///
    /// Panics if the matrix dimensions are mutually inconsistent.
    pub fn new(
        state: DVector<f64>,
        transition: DMatrix<f64>,
        measurement: DMatrix<f64>,
        process_noise: DMatrix<f64>,
        measurement_noise: DMatrix<f64>,
        covariance: DMatrix<f64>,
    ) -> Self {
        let n = state.len();
        let m = measurement.nrows();
        assert_eq!(transition.shape(), (n, n), "transition must be {n}x{n}");
        assert_eq!(measurement.ncols(), n, "measurement must have {n} columns");
        assert_eq!(process_noise.shape(), (n, n), "process noise must be {n}x{n}");
        assert_eq!(
            measurement_noise.shape(),
            (m, m),
            "measurement noise must be {m}x{m}"
        );
        assert_eq!(covariance.shape(), (n, n), "covariance must be {n}x{n}");
        Self {
            state,
            transition,
            measurement,
            process_noise,
            measurement_noise,
            covariance,
        }
    }

    /// Advances the filter one time step without new data.
    pub fn predict(&mut self) -> &DVector<f64> {
        self.state = &self.transition * &self.state;
        self.covariance =
            &self.transition * &self.covariance * self.transition.transpose() + &self.process_noise;
        &self.state
    }

    /// Incorporates a true observation.
    pub fn correct(&mut self, measurement: &DVector<f64>) -> &DVector<f64> {
        let innovation = measurement - &self.measurement * &self.state;
        let innovation_cov = &self.measurement * &self.covariance * self.measurement.transpose()
            + &self.measurement_noise;
        let Some(innovation_cov_inv) = innovation_cov.try_inverse() else {
            // Cannot happen with a positive-definite measurement noise, but
            // a skipped correction beats a poisoned state.
            log::warn!("kalman correction skipped: singular innovation covariance");
            return &self.state;
        };
        let gain = &self.covariance * self.measurement.transpose() * innovation_cov_inv;
        self.state += &gain * innovation;
        let identity = DMatrix::identity(self.state.len(), self.state.len());
        self.covariance = (identity - gain * &self.measurement) * &self.covariance;
        &self.state
    }

    /// Current state vector (after the most recent predict or correct).
    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }
}

/// Kalman smoother over an N-dimensional measurement and its K−1 time
/// derivatives.
///
/// The internal state stacks the measured quantities and their derivatives,
/// `[x, x', x'', ...]`, and the transition matrix is a unit-time-step
/// constant-derivative integrator (with `orders = 2`, the familiar
/// position+velocity model). Noise levels are fixed named constants: the
/// filter trusts new measurements moderately while damping jitter, and is
/// not meant to be tuned per call site.
#[derive(Clone, Debug)]
pub struct DerivativeKalmanFilter {
    dims: usize,
    inner: LinearKalman,
}

impl DerivativeKalmanFilter {
    /// Builds the filter around a first measurement of dimension `dims`,
    /// with `orders - 1` tracked derivatives, and immediately emits a first
    /// prediction.
    ///
    /// # Panics
    ///
    /// Panics if `orders` is zero or `first` does not have `dims` rows.
    pub fn new(dims: usize, orders: usize, first: &DVector<f64>) -> Self {
        assert!(orders >= 1, "at least the measured quantities are tracked");
        assert_eq!(first.len(), dims, "first measurement must have {dims} rows");

        let size = dims * orders;
        let mut transition = DMatrix::zeros(size, size);
        for low in 0..orders {
            let mut coefficient = 1.0;
            for high in low..orders {
                if high > low {
                    coefficient /= (high - low) as f64;
                }
                for d in 0..dims {
                    transition[(low * dims + d, high * dims + d)] = coefficient;
                }
            }
        }

        let mut measurement = DMatrix::zeros(dims, size);
        for d in 0..dims {
            measurement[(d, d)] = 1.0;
        }

        let mut state = DVector::zeros(size);
        state.rows_mut(0, dims).copy_from(first);

        let mut filter = Self {
            dims,
            inner: LinearKalman::new(
                state,
                transition,
                measurement,
                DMatrix::identity(size, size) * PROCESS_NOISE,
                DMatrix::identity(dims, dims) * MEASUREMENT_NOISE,
                DMatrix::identity(size, size) * INITIAL_ERROR,
            ),
        };
        filter.inner.predict();
        filter
    }

    /// Advances one time step without new data and returns the position
    /// estimate.
    pub fn predict(&mut self) -> DVector<f64> {
        self.inner.predict();
        self.estimate()
    }

    /// Incorporates a true observation, updating position and derivative
    /// estimates.
    ///
    /// # Panics
    ///
    /// Panics if `measurement` does not match the filter dimension.
    pub fn correct(&mut self, measurement: &DVector<f64>) -> DVector<f64> {
        assert_eq!(
            measurement.len(),
            self.dims,
            "measurement must have {} rows",
            self.dims
        );
        self.inner.correct(measurement);
        self.estimate()
    }

    /// Last computed position estimate; the derivative components are
    /// retained internally but not exposed.
    pub fn estimate(&self) -> DVector<f64> {
        self.inner.state().rows(0, self.dims).into_owned()
    }
}
