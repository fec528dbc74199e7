// src/projector.rs
//
// Maps a 2D detection into the space the goal geometry lives in.
//
// Screen mode is a pure remap into display pixels — it cannot fail.
// World mode casts the detection's center through a hit tester; a miss is
// a normal "no position this frame" outcome, not an error.
//
// Both modes funnel into one engine space (Vec3): world points directly,
// screen points lifted onto the ground plane as (x_px, 0, y_px). Boundaries
// placed from taps go through the same lift, so the zone/line geometry is
// shared between the two variants.

use crate::geometry::{bbox_center_display, bbox_to_display_rect, DisplayRect};
use crate::types::BoundingBox;
use anyhow::{bail, Result};
use glam::{Mat3, Vec2, Vec3};
use tracing::debug;

/// World collaborator boundary: resolve a display point to a world position.
pub trait WorldHitTester: Send {
    fn hit_test(&self, point: Vec2) -> Option<Vec3>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Screen,
    World,
}

/// Outcome of projecting one detection.
#[derive(Debug, Clone, Copy)]
pub enum Projection {
    Screen(DisplayRect),
    World(Vec3),
    /// World-mode cast found no surface under the detection this frame.
    Miss,
}

impl Projection {
    /// The point the crossing detector evaluates, if any. Screen rects are
    /// lifted onto the engine's ground plane here and nowhere else.
    pub fn engine_point(&self) -> Option<Vec3> {
        match self {
            Projection::Screen(rect) => Some(lift_to_ground(rect.center())),
            Projection::World(p) => Some(*p),
            Projection::Miss => None,
        }
    }
}

fn lift_to_ground(p: Vec2) -> Vec3 {
    Vec3::new(p.x, 0.0, p.y)
}

pub struct Projector {
    mode: ProjectionMode,
    viewport_w: f32,
    viewport_h: f32,
    hit_tester: Option<Box<dyn WorldHitTester>>,
}

impl Projector {
    pub fn screen(viewport_w: f32, viewport_h: f32) -> Self {
        Self {
            mode: ProjectionMode::Screen,
            viewport_w,
            viewport_h,
            hit_tester: None,
        }
    }

    pub fn world(viewport_w: f32, viewport_h: f32, hit_tester: Box<dyn WorldHitTester>) -> Self {
        Self {
            mode: ProjectionMode::World,
            viewport_w,
            viewport_h,
            hit_tester: Some(hit_tester),
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// Display rect for the presenter, independent of projection mode.
    pub fn display_rect(&self, bbox: &BoundingBox) -> DisplayRect {
        bbox_to_display_rect(bbox, self.viewport_w, self.viewport_h)
    }

    pub fn project(&self, bbox: &BoundingBox) -> Projection {
        match self.mode {
            ProjectionMode::Screen => Projection::Screen(self.display_rect(bbox)),
            ProjectionMode::World => {
                let center = bbox_center_display(bbox, self.viewport_w, self.viewport_h);
                match self.hit_tester.as_ref().and_then(|t| t.hit_test(center)) {
                    Some(point) => Projection::World(point),
                    None => {
                        debug!(
                            "No surface under detection center ({:.0},{:.0})",
                            center.x, center.y
                        );
                        Projection::Miss
                    }
                }
            }
        }
    }

    /// Resolve a tap (display pixels) to an engine-space point for goal
    /// placement — the same path a detection takes.
    pub fn resolve_tap(&self, tap: Vec2) -> Option<Vec3> {
        match self.mode {
            ProjectionMode::Screen => Some(lift_to_ground(tap)),
            ProjectionMode::World => self.hit_tester.as_ref().and_then(|t| t.hit_test(tap)),
        }
    }
}

// ============================================================================
// GROUND-PLANE HIT TESTER
// ============================================================================

/// Pinhole back-projection against the y=0 ground plane.
///
/// The camera sits at (0, height, 0) looking down +Z, pitched toward the
/// ground by `pitch_down` radians. A display point becomes a camera ray;
/// the intersection with the ground plane is the world position. Rays that
/// never reach the plane (at or above the horizon) miss.
pub struct GroundPlaneHitTester {
    focal_px: f32,
    principal: Vec2,
    camera_height: f32,
    rotation: Mat3,
}

impl GroundPlaneHitTester {
    pub fn new(
        focal_px: f32,
        viewport_w: f32,
        viewport_h: f32,
        camera_height: f32,
        pitch_down_rad: f32,
    ) -> Result<Self> {
        if focal_px <= 0.0 || camera_height <= 0.0 {
            bail!(
                "invalid camera intrinsics: focal={}, height={}",
                focal_px,
                camera_height
            );
        }
        Ok(Self {
            focal_px,
            principal: Vec2::new(viewport_w / 2.0, viewport_h / 2.0),
            camera_height,
            rotation: Mat3::from_rotation_x(pitch_down_rad),
        })
    }
}

impl WorldHitTester for GroundPlaneHitTester {
    fn hit_test(&self, point: Vec2) -> Option<Vec3> {
        // Display y grows downward; camera y grows upward.
        let dir_cam = Vec3::new(
            (point.x - self.principal.x) / self.focal_px,
            (self.principal.y - point.y) / self.focal_px,
            1.0,
        );
        let dir = self.rotation * dir_cam;

        if dir.y >= -1e-6 {
            return None;
        }

        let origin = Vec3::new(0.0, self.camera_height, 0.0);
        let t = -origin.y / dir.y;
        Some(origin + dir * t)
    }
}
