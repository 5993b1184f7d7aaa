use nalgebra::{Matrix4, Point2};

/// Logical identifier of a physical tag design, in `0..1024`.
pub type TagId = u16;

/// Ordered image-space corners of a detected tag.
///
/// The ordering is established upstream (clockwise from a consistent
/// reference corner) and is preserved by every component in this workspace.
pub type Quad = [Point2<f32>; 4];

/// Homogeneous 4×4 rigid transform, bottom row `[0, 0, 0, 1]`.
pub type Transform = Matrix4<f64>;

/// Builds a [`Quad`] from `(x, y)` pairs.
pub fn quad(corners: [(f32, f32); 4]) -> Quad {
    corners.map(|(x, y)| Point2::new(x, y))
}
