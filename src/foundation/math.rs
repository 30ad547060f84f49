//! Math primitives.
//!
//! Simulation space uses vectors (meters, radians, counter-clockwise);
//! render space uses points (scene units, degrees, clockwise).

/// 2D simulation-space vector.
pub type Vec2 = nalgebra::Vector2<f32>;

/// 2D render-space point.
pub type Point2 = nalgebra::Point2<f32>;

/// 2D cross product (z component of the 3D cross product).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar (angular velocity) with a vector.
#[inline]
pub fn cross_scalar(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}

/// Rotate a vector by `angle` radians.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    nalgebra::Rotation2::new(angle) * v
}
