//! Conversion between simulation units and render units.
//!
//! The physics simulation works in meters; the scene graph works in render
//! units (pixels or points). One scale factor governs the conversion. The
//! mapper is a plain value constructed once at startup and passed to
//! whatever needs it; changing the scale mid-run invalidates every render
//! transform computed so far, so don't.

use crate::foundation::math::{Point2, Vec2};

/// Conventional render-units-per-meter ratio for sprite-based games.
pub const DEFAULT_SCALE: f32 = 32.0;

/// Stateless converter between simulation vectors and render points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale: f32,
}

impl CoordinateMapper {
    /// Create a mapper with the given render-units-per-meter scale.
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not strictly positive.
    pub fn new(scale: f32) -> Self {
        assert!(
            scale.is_finite() && scale > 0.0,
            "coordinate scale must be positive and finite, got {scale}"
        );
        Self { scale }
    }

    /// The render-units-per-meter scale factor.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Convert a simulation-space vector to a render-space point.
    pub fn to_render(&self, v: Vec2) -> Point2 {
        Point2::new(v.x * self.scale, v.y * self.scale)
    }

    /// Convert a render-space point to a simulation-space vector.
    pub fn to_simulation(&self, p: Point2) -> Vec2 {
        Vec2::new(p.x / self.scale, p.y / self.scale)
    }

    /// Convert a scalar length from simulation to render units.
    pub fn to_render_length(&self, len: f32) -> f32 {
        len * self.scale
    }

    /// Convert a scalar length from render to simulation units.
    pub fn to_simulation_length(&self, len: f32) -> f32 {
        len / self.scale
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}

/// Convert a simulation angle (radians, counter-clockwise) to a render
/// rotation (degrees, clockwise).
pub fn render_rotation(angle: f32) -> f32 {
    -angle.to_degrees()
}

/// Convert a render rotation (degrees, clockwise) to a simulation angle
/// (radians, counter-clockwise).
pub fn simulation_angle(rotation: f32) -> f32 {
    -rotation.to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_trips_within_tolerance() {
        let mapper = CoordinateMapper::new(32.0);
        for &(x, y) in &[(0.0, 0.0), (160.0, -48.5), (-3.25, 1024.0), (0.1, 0.1)] {
            let p = Point2::new(x, y);
            let back = mapper.to_render(mapper.to_simulation(p));
            assert_relative_eq!(back.x, p.x, epsilon = 1e-4);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn scales_componentwise() {
        let mapper = CoordinateMapper::new(10.0);
        let p = mapper.to_render(Vec2::new(1.5, -2.0));
        assert_relative_eq!(p.x, 15.0);
        assert_relative_eq!(p.y, -20.0);
        assert_relative_eq!(mapper.to_simulation_length(5.0), 0.5);
    }

    #[test]
    fn rotation_convention_flips_sign() {
        assert_relative_eq!(render_rotation(std::f32::consts::PI), -180.0);
        assert_relative_eq!(
            simulation_angle(render_rotation(1.25)),
            1.25,
            epsilon = 1e-6
        );
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn rejects_non_positive_scale() {
        let _ = CoordinateMapper::new(0.0);
    }
}
