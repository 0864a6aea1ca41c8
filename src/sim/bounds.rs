//! Play-field bounds resolution
//!
//! Rectangular zones clamp the player inset by half its collision size.
//! Circular zones clamp radially and report the inward wall normal so a
//! riding player can rebound off the fence.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Shape of a zone's outer perimeter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Fence {
    /// The zone's full `width x height` rectangle
    #[default]
    Rect,
    /// A circular perimeter inside the zone extents
    Circle { center: Vec2, radius: f32 },
}

/// Result of a bounds check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsResult {
    /// Position after clamping
    pub pos: Vec2,
    /// Whether the position had to be corrected
    pub hit: bool,
    /// Wall normal pointing back into the play field (zero if no hit)
    pub normal: Vec2,
}

/// Clamp into `[half, width - half] x [half, height - half]`
pub fn clamp_rect(pos: Vec2, width: f32, height: f32, half_size: f32) -> BoundsResult {
    let min = Vec2::splat(half_size);
    let max = Vec2::new((width - half_size).max(half_size), (height - half_size).max(half_size));
    let clamped = pos.clamp(min, max);

    let mut normal = Vec2::ZERO;
    if clamped.x > pos.x {
        normal.x = 1.0;
    } else if clamped.x < pos.x {
        normal.x = -1.0;
    }
    if clamped.y > pos.y {
        normal.y = 1.0;
    } else if clamped.y < pos.y {
        normal.y = -1.0;
    }
    BoundsResult {
        pos: clamped,
        hit: clamped != pos,
        normal: normal.normalize_or_zero(),
    }
}

/// Clamp radially so the player (of `half_size`) stays inside the circle
pub fn clamp_circle(pos: Vec2, center: Vec2, radius: f32, half_size: f32) -> BoundsResult {
    let limit = (radius - half_size).max(0.0);
    let offset = pos - center;
    let dist = offset.length();
    if dist <= limit {
        return BoundsResult {
            pos,
            hit: false,
            normal: Vec2::ZERO,
        };
    }
    let outward = offset.normalize_or_zero();
    BoundsResult {
        pos: center + outward * limit,
        hit: true,
        normal: -outward,
    }
}

/// Resolve `pos` against a zone's fence
pub fn resolve(fence: Fence, pos: Vec2, width: f32, height: f32, half_size: f32) -> BoundsResult {
    match fence {
        Fence::Rect => clamp_rect(pos, width, height, half_size),
        Fence::Circle { center, radius } => clamp_circle(pos, center, radius, half_size),
    }
}

/// Reflect a velocity vector off a surface with the given normal
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_clamp_insets_by_half_size() {
        let result = clamp_rect(Vec2::new(-50.0, 300.0), 800.0, 600.0, 12.0);
        assert!(result.hit);
        assert_eq!(result.pos, Vec2::new(12.0, 300.0));
        assert_eq!(result.normal, Vec2::X);

        let inside = clamp_rect(Vec2::new(400.0, 300.0), 800.0, 600.0, 12.0);
        assert!(!inside.hit);
    }

    #[test]
    fn circle_clamp_is_radial() {
        let center = Vec2::new(500.0, 500.0);
        let result = clamp_circle(Vec2::new(1000.0, 500.0), center, 400.0, 10.0);
        assert!(result.hit);
        assert!((result.pos - Vec2::new(890.0, 500.0)).length() < 1e-3);
        // Normal points back toward the center
        assert!(result.normal.dot(center - result.pos) > 0.0);
    }

    #[test]
    fn reflect_off_wall() {
        let v = reflect_velocity(Vec2::new(3.0, -2.0), Vec2::new(-1.0, 0.0));
        assert_eq!(v, Vec2::new(-3.0, -2.0));
    }
}
