//! Value contracts for sample types flowing through the temporal filters.

use nalgebra::{Point2, Vector3};

use crate::{Quad, Transform};

/// Contract for measurement types accepted by the averaging filter.
///
/// Implementations must behave as genuine value types: `Clone` must produce
/// an independent copy, and no method may alias or mutate caller-owned data.
/// The filter accumulates into a clone of its first buffered sample, so a
/// shallow/reference copy would corrupt the buffer.
pub trait Measurement: Clone {
    /// Adds `other` into `self`, component-wise.
    fn accumulate(&mut self, other: &Self);

    /// Returns `self` scaled by `factor`, component-wise.
    fn scaled(&self, factor: f64) -> Self;

    /// Returns the component-wise squared deviation of `self` from `mean`.
    fn squared_deviation(&self, mean: &Self) -> Self;
}

/// Linear interpolation contract used by the blending de-flicker filter.
pub trait Mix: Clone {
    /// Returns `w * self + (1 - w) * other`.
    fn mix(&self, other: &Self, w: f64) -> Self;
}

impl Measurement for f64 {
    fn accumulate(&mut self, other: &Self) {
        *self += other;
    }

    fn scaled(&self, factor: f64) -> Self {
        self * factor
    }

    fn squared_deviation(&self, mean: &Self) -> Self {
        let d = mean - self;
        d * d
    }
}

impl Mix for f64 {
    fn mix(&self, other: &Self, w: f64) -> Self {
        w * self + (1.0 - w) * other
    }
}

impl Measurement for Vector3<f64> {
    fn accumulate(&mut self, other: &Self) {
        *self += other;
    }

    fn scaled(&self, factor: f64) -> Self {
        self * factor
    }

    fn squared_deviation(&self, mean: &Self) -> Self {
        let d = mean - self;
        d.component_mul(&d)
    }
}

impl Measurement for Quad {
    fn accumulate(&mut self, other: &Self) {
        for (corner, o) in self.iter_mut().zip(other.iter()) {
            corner.coords += o.coords;
        }
    }

    fn scaled(&self, factor: f64) -> Self {
        self.map(|corner| Point2::from(corner.coords * factor as f32))
    }

    fn squared_deviation(&self, mean: &Self) -> Self {
        let mut out = *self;
        for (corner, m) in out.iter_mut().zip(mean.iter()) {
            let d = m.coords - corner.coords;
            corner.coords = d.component_mul(&d);
        }
        out
    }
}

impl Mix for Quad {
    fn mix(&self, other: &Self, w: f64) -> Self {
        let w = w as f32;
        let mut out = *self;
        for (corner, o) in out.iter_mut().zip(other.iter()) {
            corner.coords = corner.coords * w + o.coords * (1.0 - w);
        }
        out
    }
}

impl Measurement for Transform {
    fn accumulate(&mut self, other: &Self) {
        *self += other;
    }

    fn scaled(&self, factor: f64) -> Self {
        self * factor
    }

    fn squared_deviation(&self, mean: &Self) -> Self {
        let d = mean - self;
        d.component_mul(&d)
    }
}

impl Mix for Transform {
    fn mix(&self, other: &Self, w: f64) -> Self {
        self * w + other * (1.0 - w)
    }
}
