// src/geometry.rs
//
// Coordinate conventions, in one place.
//
// The detector emits normalized rectangles with a BOTTOM-LEFT origin
// (y grows upward). The display and everything downstream of it use
// TOP-LEFT pixel coordinates (y grows downward). Every conversion between
// the two goes through this module; no call site performs its own axis flip.

use crate::types::BoundingBox;
use glam::{Vec2, Vec3};

/// Axis-aligned rectangle in display pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Convert a bottom-left-normalized detection box to a top-left pixel rect.
///
/// Input:  origin at the box's lower-left corner, y up, coordinates in [0,1].
/// Output: origin at the box's upper-left corner, y down, coordinates in pixels.
pub fn bbox_to_display_rect(bbox: &BoundingBox, viewport_w: f32, viewport_h: f32) -> DisplayRect {
    DisplayRect {
        x: bbox.origin_x * viewport_w,
        y: (1.0 - bbox.origin_y - bbox.height) * viewport_h,
        width: bbox.width * viewport_w,
        height: bbox.height * viewport_h,
    }
}

/// Center of a detection box in display pixels (top-left origin).
pub fn bbox_center_display(bbox: &BoundingBox, viewport_w: f32, viewport_h: f32) -> Vec2 {
    let (cx, cy) = bbox.center();
    Vec2::new(cx * viewport_w, (1.0 - cy) * viewport_h)
}

/// Rotate a vector 90° about the vertical (+Y) axis: (x, y, z) → (-z, y, x).
///
/// This is the rotation that extrudes a goal line into its zone footprint;
/// the sign is part of the zone's depth-side convention and is pinned by the
/// zone tests in `goal_model`.
pub fn rotate_90_about_y(v: Vec3) -> Vec3 {
    Vec3::new(-v.z, v.y, v.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The conversion is the highest-risk correctness surface in the system,
    // so the convention is pinned with literal coordinates.

    #[test]
    fn test_bbox_to_display_rect_flips_y() {
        // A box hugging the bottom-left corner of the normalized space must
        // land at the bottom-left of the display: x = 0, y near the bottom.
        let bbox = BoundingBox::new(0.0, 0.0, 0.25, 0.5);
        let rect = bbox_to_display_rect(&bbox, 1280.0, 720.0);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 360.0); // (1 - 0 - 0.5) * 720
        assert_eq!(rect.width, 320.0);
        assert_eq!(rect.height, 360.0);
    }

    #[test]
    fn test_bbox_at_top_of_frame_maps_to_y_zero() {
        // origin_y + height == 1.0 means the box touches the top edge.
        let bbox = BoundingBox::new(0.5, 0.8, 0.1, 0.2);
        let rect = bbox_to_display_rect(&bbox, 1000.0, 500.0);
        assert_eq!(rect.x, 500.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.height, 100.0);
    }

    #[test]
    fn test_centered_bbox_center_is_viewport_center() {
        let bbox = BoundingBox::new(0.4, 0.4, 0.2, 0.2);
        let center = bbox_center_display(&bbox, 1280.0, 720.0);
        assert_eq!(center, Vec2::new(640.0, 360.0));
    }

    #[test]
    fn test_bbox_center_display_flips_y() {
        // Center at normalized (0.5, 0.25) — lower half of the frame in the
        // detector's space, so lower half of the display: y > h/2.
        let bbox = BoundingBox::new(0.45, 0.2, 0.1, 0.1);
        let center = bbox_center_display(&bbox, 1000.0, 800.0);
        assert_eq!(center.x, 500.0);
        assert_eq!(center.y, 600.0); // (1 - 0.25) * 800
    }

    #[test]
    fn test_rect_center_matches_bbox_center() {
        let bbox = BoundingBox::new(0.1, 0.3, 0.2, 0.4);
        let rect = bbox_to_display_rect(&bbox, 640.0, 480.0);
        let center = bbox_center_display(&bbox, 640.0, 480.0);
        assert!((rect.center() - center).length() < 1e-4);
    }

    #[test]
    fn test_rotate_90_about_y() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(rotate_90_about_y(x), Vec3::new(0.0, 0.0, 1.0));
        let z = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(rotate_90_about_y(z), Vec3::new(-1.0, 0.0, 0.0));
        // Vertical component is untouched.
        let v = Vec3::new(2.0, 5.0, -3.0);
        assert_eq!(rotate_90_about_y(v), Vec3::new(3.0, 5.0, 2.0));
    }
}
