//! Proximity hit testing
//!
//! Items are treated as circles of their template radius. A point hits an
//! item when it comes within `tolerance` of that circle.

use glam::Vec2;

/// Does `point` lie within `tolerance` of the circle at `center`?
#[inline]
pub fn hit_test(center: Vec2, radius: f32, point: Vec2, tolerance: f32) -> bool {
    center.distance_squared(point) <= (radius + tolerance) * (radius + tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_inside_radius() {
        assert!(hit_test(Vec2::ZERO, 10.0, Vec2::new(5.0, 0.0), 0.0));
    }

    #[test]
    fn test_hit_within_tolerance() {
        // radius 10 + tolerance 30 reaches 40 units
        assert!(hit_test(Vec2::ZERO, 10.0, Vec2::new(0.0, 40.0), 30.0));
        assert!(hit_test(Vec2::ZERO, 10.0, Vec2::new(24.0, 32.0), 30.0));
    }

    #[test]
    fn test_miss_beyond_tolerance() {
        assert!(!hit_test(Vec2::ZERO, 10.0, Vec2::new(0.0, 40.5), 30.0));
        assert!(!hit_test(
            Vec2::new(100.0, 100.0),
            14.0,
            Vec2::new(150.0, 100.0),
            30.0
        ));
    }
}
