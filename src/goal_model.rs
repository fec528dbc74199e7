// src/goal_model.rs
//
// Goal geometry: user-placed goal lines, their derived zone footprints,
// and the geometric predicates the crossing detector evaluates against.
//
// Boundaries are immutable once placed and ordered by insertion; the order
// defines the team index mapping (first boundary = team 0, second = team 1).
// At most two boundaries exist — the two-team scoring rule has no meaning
// for a third, so placement of one is refused rather than silently accepted.

use crate::geometry::rotate_90_about_y;
use anyhow::{bail, Result};
use glam::Vec3;
use tracing::info;

/// Hard cap on placed boundaries: team scoring is defined for two teams.
pub const MAX_BOUNDARIES: usize = 2;

/// A 1-D goal boundary in world space. Immutable once placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalLine {
    pub start: Vec3,
    pub end: Vec3,
}

impl GoalLine {
    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }
}

/// Rectangular goal footprint extruded from a goal line.
///
/// direction = normalize(end - start); the depth side is direction rotated
/// 90° about the vertical axis, scaled by `depth`. All four corners lie on
/// the ground-aligned plane of the line.
#[derive(Debug, Clone, Copy)]
pub struct GoalZone {
    pub start: Vec3,
    pub end: Vec3,
    pub depth: f32,
    pub corners: [Vec3; 4],
}

impl GoalZone {
    pub fn from_line(line: &GoalLine, depth: f32) -> Self {
        let direction = (line.end - line.start).normalize();
        let perpendicular = rotate_90_about_y(direction) * depth;
        Self {
            start: line.start,
            end: line.end,
            depth,
            corners: [
                line.start,
                line.end,
                line.end + perpendicular,
                line.start + perpendicular,
            ],
        }
    }

    fn length_axis(&self) -> Vec3 {
        (self.end - self.start).normalize()
    }

    fn depth_axis(&self) -> Vec3 {
        rotate_90_about_y(self.length_axis())
    }
}

/// A placed boundary: the line the user tapped out plus its derived zone.
#[derive(Debug, Clone, Copy)]
pub struct Boundary {
    pub line: GoalLine,
    pub zone: GoalZone,
}

/// Ordered storage of goal boundaries. No removal or edit; `reset` drops
/// everything when the whole game restarts.
pub struct GoalModel {
    boundaries: Vec<Boundary>,
    depth: f32,
}

impl GoalModel {
    pub fn new(depth: f32) -> Self {
        Self {
            boundaries: Vec::with_capacity(MAX_BOUNDARIES),
            depth,
        }
    }

    /// Append one boundary. Fails on a degenerate line (coincident endpoints
    /// have no direction to extrude) or once the two-team cap is reached.
    pub fn add_boundary(&mut self, p1: Vec3, p2: Vec3) -> Result<usize> {
        if self.boundaries.len() >= MAX_BOUNDARIES {
            bail!(
                "goal boundary limit reached ({} placed, max {})",
                self.boundaries.len(),
                MAX_BOUNDARIES
            );
        }
        if (p2 - p1).length_squared() <= f32::EPSILON {
            bail!("degenerate goal line: endpoints coincide");
        }

        let line = GoalLine { start: p1, end: p2 };
        let zone = GoalZone::from_line(&line, self.depth);
        self.boundaries.push(Boundary { line, zone });

        let index = self.boundaries.len() - 1;
        info!(
            "Goal boundary {} placed: ({:.2},{:.2},{:.2}) → ({:.2},{:.2},{:.2}), length={:.2}, depth={:.2}",
            index, p1.x, p1.y, p1.z, p2.x, p2.y, p2.z, line.length(), self.depth
        );
        Ok(index)
    }

    /// Insertion order is significant: it defines the team index mapping.
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn reset(&mut self) {
        self.boundaries.clear();
    }
}

// ============================================================================
// GEOMETRIC PREDICATES
// ============================================================================

/// Unclamped projection parameter of `p` onto the line through `a` and `b`:
/// 0 at `a`, 1 at `b`, outside [0,1] beyond either endpoint.
fn segment_parameter(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    (p - a).dot(ab) / ab.length_squared()
}

/// Distance from `p` to the nearest point ON the segment `a`..`b` — the
/// projection parameter is clamped to [0,1], so a point past `b` measures
/// its distance to `b`, not to the infinite line.
pub fn distance_to_segment(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let t = segment_parameter(p, a, b).clamp(0.0, 1.0);
    (p - (a + (b - a) * t)).length()
}

/// True when `p`'s lateral projection falls outside the segment's span —
/// "crossed past the end of the line" as opposed to "near the line but
/// still within it".
pub fn is_beyond_segment(p: Vec3, a: Vec3, b: Vec3) -> bool {
    let t = segment_parameter(p, a, b);
    !(0.0..=1.0).contains(&t)
}

/// Rectangular footprint test: the point's projection onto the zone's length
/// axis must lie within [0, length] AND its projection onto the depth axis
/// within [0, depth]. Both conditions are required — this is a rectangle,
/// not a half-plane.
pub fn is_inside_zone(p: Vec3, zone: &GoalZone) -> bool {
    let rel = p - zone.start;
    let u = rel.dot(zone.length_axis());
    let v = rel.dot(zone.depth_axis());
    let length = (zone.end - zone.start).length();
    u >= 0.0 && u <= length && v >= 0.0 && v <= zone.depth
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_line() -> GoalLine {
        GoalLine {
            start: Vec3::ZERO,
            end: Vec3::new(1.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_zone_corners_from_unit_line() {
        let zone = GoalZone::from_line(&unit_line(), 0.5);
        assert_eq!(zone.corners[0], Vec3::ZERO);
        assert_eq!(zone.corners[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(zone.corners[2], Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(zone.corners[3], Vec3::new(0.0, 0.0, 0.5));
        // All corners coplanar on the ground plane.
        assert!(zone.corners.iter().all(|c| c.y == 0.0));
    }

    #[test]
    fn test_point_inside_zone_footprint() {
        let zone = GoalZone::from_line(&unit_line(), 0.5);
        assert!(is_inside_zone(Vec3::new(0.5, 0.0, 0.25), &zone));
    }

    #[test]
    fn test_point_outside_depth_band() {
        let zone = GoalZone::from_line(&unit_line(), 0.5);
        assert!(!is_inside_zone(Vec3::new(0.5, 0.0, 0.6), &zone));
    }

    #[test]
    fn test_point_outside_length_span() {
        let zone = GoalZone::from_line(&unit_line(), 0.5);
        assert!(!is_inside_zone(Vec3::new(1.5, 0.0, 0.25), &zone));
    }

    #[test]
    fn test_point_behind_depth_side_is_outside() {
        // Negative depth-axis projection: in front of the goal mouth.
        let zone = GoalZone::from_line(&unit_line(), 0.5);
        assert!(!is_inside_zone(Vec3::new(0.5, 0.0, -0.1), &zone));
    }

    #[test]
    fn test_distance_clamps_to_segment_end() {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 0.0, 0.0);
        // Past b: distance is to b itself, not the infinite line (which
        // would give 0.0 here).
        let p = Vec3::new(2.0, 0.0, 0.0);
        assert!((distance_to_segment(p, a, b) - 1.0).abs() < 1e-6);

        let q = Vec3::new(1.5, 0.0, 0.5);
        let expected = (q - b).length();
        assert!((distance_to_segment(q, a, b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_distance_within_span_is_perpendicular() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);
        let p = Vec3::new(1.0, 0.0, 0.3);
        assert!((distance_to_segment(p, a, b) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_is_beyond_segment() {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 0.0, 0.0);
        assert!(is_beyond_segment(Vec3::new(1.2, 0.0, 0.05), a, b));
        assert!(is_beyond_segment(Vec3::new(-0.1, 0.0, 0.0), a, b));
        assert!(!is_beyond_segment(Vec3::new(0.5, 0.0, 5.0), a, b));
    }

    #[test]
    fn test_boundary_cap_rejected() {
        let mut model = GoalModel::new(0.5);
        model.add_boundary(Vec3::ZERO, Vec3::X).unwrap();
        model
            .add_boundary(Vec3::new(0.0, 0.0, 3.0), Vec3::new(1.0, 0.0, 3.0))
            .unwrap();
        let third = model.add_boundary(Vec3::new(5.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0));
        assert!(third.is_err());
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_degenerate_line_rejected() {
        let mut model = GoalModel::new(0.5);
        let p = Vec3::new(1.0, 0.0, 2.0);
        assert!(model.add_boundary(p, p).is_err());
        assert!(model.is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut model = GoalModel::new(0.5);
        let first = model.add_boundary(Vec3::ZERO, Vec3::X).unwrap();
        let second = model
            .add_boundary(Vec3::new(0.0, 0.0, 3.0), Vec3::new(1.0, 0.0, 3.0))
            .unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(model.boundaries()[0].line.start, Vec3::ZERO);
        assert_eq!(model.boundaries()[1].line.start.z, 3.0);
    }

    #[test]
    fn test_reset_drops_all_boundaries() {
        let mut model = GoalModel::new(0.5);
        model.add_boundary(Vec3::ZERO, Vec3::X).unwrap();
        model.reset();
        assert!(model.is_empty());
        // Placement works again after a reset.
        assert!(model.add_boundary(Vec3::ZERO, Vec3::X).is_ok());
    }

    #[test]
    fn test_zone_for_diagonal_line() {
        // A line not aligned with an axis still produces a consistent
        // rectangular footprint.
        let line = GoalLine {
            start: Vec3::ZERO,
            end: Vec3::new(1.0, 0.0, 1.0),
        };
        let zone = GoalZone::from_line(&line, 0.5);
        let mid = Vec3::new(0.5, 0.0, 0.5);
        let inward = zone.depth_axis() * 0.25;
        assert!(is_inside_zone(mid + inward, &zone));
        assert!(!is_inside_zone(mid - inward, &zone));
    }
}
