// src/crossing.rs
//
// Crossing detection against the goal model.
//
// Two scoring modes:
//   - Zone: per-boundary Outside/Inside state, edge-triggered. An event
//     fires on the Outside→Inside transition only; frames with the ball
//     resting inside the footprint score once per entry.
//   - Line: stateless. An event fires when the ball is within the distance
//     threshold of a boundary's line while its projection has passed beyond
//     the segment's span.
//
// One global cooldown gates both modes: for `cooldown_secs` after any score,
// evaluation is skipped entirely — per-boundary occupancy is deliberately
// NOT updated during the window, so the ball must leave and re-enter after
// cooldown rather than being re-detected instantly.
//
// Scoring credits the OPPOSING team: a crossing at boundary 0 is an own
// goal for team 0, so team 1 takes the point, and vice versa.

use crate::goal_model::{distance_to_segment, is_beyond_segment, is_inside_zone, GoalModel};
use glam::Vec3;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    Zone,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occupancy {
    Outside,
    Inside,
}

/// A confirmed crossing. `team` is the credited (opposing) team.
#[derive(Debug, Clone, Copy)]
pub struct ScoreEvent {
    pub boundary_index: usize,
    pub team: usize,
    pub timestamp: f64,
}

pub struct CrossingDetector {
    mode: ScoringMode,
    cooldown_secs: f64,
    line_distance_threshold: f32,

    occupancy: Vec<Occupancy>,
    last_score_time: Option<f64>,
}

impl CrossingDetector {
    pub fn new(mode: ScoringMode, cooldown_secs: f64, line_distance_threshold: f32) -> Self {
        Self {
            mode,
            cooldown_secs,
            line_distance_threshold,
            occupancy: Vec::new(),
            last_score_time: None,
        }
    }

    /// Whether the global cooldown window is open at `now`.
    pub fn in_cooldown(&self, now: f64) -> bool {
        self.last_score_time
            .map(|t| now - t < self.cooldown_secs)
            .unwrap_or(false)
    }

    /// Evaluate one projected ball position against every boundary, in
    /// insertion order. At most one event per call: the first boundary that
    /// scores wins and evaluation returns immediately.
    pub fn evaluate(&mut self, point: Vec3, model: &GoalModel, now: f64) -> Option<ScoreEvent> {
        if self.in_cooldown(now) {
            debug!(
                "Cooldown active ({:.2}s remaining), skipping evaluation",
                self.cooldown_secs - (now - self.last_score_time.unwrap())
            );
            return None;
        }

        // Boundaries placed since the last pass start Outside.
        while self.occupancy.len() < model.len() {
            self.occupancy.push(Occupancy::Outside);
        }

        for (index, boundary) in model.boundaries().iter().enumerate() {
            let scored = match self.mode {
                ScoringMode::Zone => {
                    let inside = is_inside_zone(point, &boundary.zone);
                    let entered = inside && self.occupancy[index] == Occupancy::Outside;
                    self.occupancy[index] = if inside {
                        Occupancy::Inside
                    } else {
                        Occupancy::Outside
                    };
                    entered
                }
                ScoringMode::Line => {
                    let distance =
                        distance_to_segment(point, boundary.line.start, boundary.line.end);
                    distance < self.line_distance_threshold
                        && is_beyond_segment(point, boundary.line.start, boundary.line.end)
                }
            };

            if scored {
                let team = opposing_team(index);
                self.last_score_time = Some(now);
                info!(
                    "GOAL at boundary {} ({:?} mode) → team {} credited, t={:.2}s",
                    index, self.mode, team, now
                );
                return Some(ScoreEvent {
                    boundary_index: index,
                    team,
                    timestamp: now,
                });
            }
        }

        None
    }

    pub fn reset(&mut self) {
        self.occupancy.clear();
        self.last_score_time = None;
    }
}

/// Own-goal mapping for the two-team rule: crossing boundary i credits
/// team 1-i. The goal model caps boundaries at two, so this is total.
fn opposing_team(boundary_index: usize) -> usize {
    1 - boundary_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal_model::GoalModel;

    fn zone_detector() -> CrossingDetector {
        CrossingDetector::new(ScoringMode::Zone, 3.0, 0.1)
    }

    fn one_boundary_model() -> GoalModel {
        let mut model = GoalModel::new(0.5);
        model.add_boundary(Vec3::ZERO, Vec3::X).unwrap();
        model
    }

    fn two_boundary_model() -> GoalModel {
        let mut model = GoalModel::new(0.5);
        model.add_boundary(Vec3::ZERO, Vec3::X).unwrap();
        // Opposite end of the pitch, depth side pointing the other way.
        model
            .add_boundary(Vec3::new(1.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 10.0))
            .unwrap();
        model
    }

    const INSIDE_A: Vec3 = Vec3::new(0.5, 0.0, 0.25);
    const OUTSIDE: Vec3 = Vec3::new(0.5, 0.0, 5.0);

    #[test]
    fn test_zone_entry_scores_opposing_team() {
        let model = one_boundary_model();
        let mut detector = zone_detector();
        let event = detector.evaluate(INSIDE_A, &model, 0.0).unwrap();
        assert_eq!(event.boundary_index, 0);
        assert_eq!(event.team, 1);
    }

    #[test]
    fn test_edge_trigger_scores_once_per_entry() {
        let model = one_boundary_model();
        // No cooldown so only the edge trigger is under test.
        let mut detector = CrossingDetector::new(ScoringMode::Zone, 0.0, 0.1);
        assert!(detector.evaluate(INSIDE_A, &model, 0.0).is_some());
        // Continuous occupancy: no further events.
        for i in 1..5 {
            assert!(detector.evaluate(INSIDE_A, &model, i as f64 * 0.1).is_none());
        }
        // Leave, then re-enter: fires again.
        assert!(detector.evaluate(OUTSIDE, &model, 1.0).is_none());
        assert!(detector.evaluate(INSIDE_A, &model, 1.1).is_some());
    }

    #[test]
    fn test_cooldown_suppresses_second_crossing() {
        let model = two_boundary_model();
        let mut detector = zone_detector();
        assert!(detector.evaluate(INSIDE_A, &model, 0.0).is_some());

        // A genuine crossing at the OTHER boundary inside the window: skipped.
        let inside_b = Vec3::new(0.5, 0.0, 9.75);
        assert!(detector.evaluate(inside_b, &model, 1.5).is_none());
        // Still inside the window at 2.9s.
        assert!(detector.evaluate(inside_b, &model, 2.9).is_none());
        // Window closed: the entry now registers.
        assert!(detector.evaluate(inside_b, &model, 3.0).is_some());
    }

    #[test]
    fn test_crossings_separated_by_cooldown_both_score() {
        let model = one_boundary_model();
        let mut detector = zone_detector();
        assert!(detector.evaluate(INSIDE_A, &model, 0.0).is_some());
        assert!(detector.evaluate(OUTSIDE, &model, 3.5).is_none());
        assert!(detector.evaluate(INSIDE_A, &model, 4.0).is_some());
    }

    #[test]
    fn test_cooldown_preserves_occupancy_state() {
        // The ball scores, stays inside through the cooldown window, and is
        // still inside when the window closes. Because occupancy was not
        // updated during cooldown, the recorded state is still Inside — so
        // no second event until it leaves and re-enters.
        let model = one_boundary_model();
        let mut detector = zone_detector();
        assert!(detector.evaluate(INSIDE_A, &model, 0.0).is_some());
        assert!(detector.evaluate(INSIDE_A, &model, 1.0).is_none()); // cooldown
        assert!(detector.evaluate(INSIDE_A, &model, 3.5).is_none()); // still Inside
        assert!(detector.evaluate(OUTSIDE, &model, 4.0).is_none());
        assert!(detector.evaluate(INSIDE_A, &model, 4.5).is_some());
    }

    #[test]
    fn test_own_goal_mapping_both_directions() {
        let model = two_boundary_model();
        let mut detector = CrossingDetector::new(ScoringMode::Zone, 0.0, 0.1);

        let event_a = detector.evaluate(INSIDE_A, &model, 0.0).unwrap();
        assert_eq!((event_a.boundary_index, event_a.team), (0, 1));

        let inside_b = Vec3::new(0.5, 0.0, 9.75);
        let event_b = detector.evaluate(inside_b, &model, 1.0).unwrap();
        assert_eq!((event_b.boundary_index, event_b.team), (1, 0));
    }

    #[test]
    fn test_first_boundary_wins_tie_break() {
        // Two overlapping boundaries: only the first in insertion order
        // registers, and its entry leaves the second boundary's occupancy
        // untouched for this pass.
        let mut model = GoalModel::new(0.5);
        model.add_boundary(Vec3::ZERO, Vec3::X).unwrap();
        model
            .add_boundary(Vec3::new(0.0, 0.0, -0.25), Vec3::new(1.0, 0.0, -0.25))
            .unwrap();
        let mut detector = CrossingDetector::new(ScoringMode::Zone, 0.0, 0.1);

        // (0.5, 0, 0.1) sits inside both footprints.
        let p = Vec3::new(0.5, 0.0, 0.1);
        let event = detector.evaluate(p, &model, 0.0).unwrap();
        assert_eq!(event.boundary_index, 0);

        // Next pass: boundary 0 is Inside already, boundary 1 now enters.
        let event2 = detector.evaluate(p, &model, 0.1).unwrap();
        assert_eq!(event2.boundary_index, 1);
    }

    #[test]
    fn test_line_mode_requires_close_and_beyond() {
        let model = one_boundary_model();
        let mut detector = CrossingDetector::new(ScoringMode::Line, 0.0, 0.1);

        // Near the line but within its span: no score.
        assert!(detector
            .evaluate(Vec3::new(0.5, 0.0, 0.05), &model, 0.0)
            .is_none());
        // Beyond the end but too far from the line: no score.
        assert!(detector
            .evaluate(Vec3::new(1.5, 0.0, 0.05), &model, 0.1)
            .is_none());
        // Just past the end, still close: score, credited to team 1.
        let event = detector
            .evaluate(Vec3::new(1.05, 0.0, 0.02), &model, 0.2)
            .unwrap();
        assert_eq!(event.team, 1);
    }

    #[test]
    fn test_reset_clears_cooldown_and_occupancy() {
        let model = one_boundary_model();
        let mut detector = zone_detector();
        assert!(detector.evaluate(INSIDE_A, &model, 0.0).is_some());
        detector.reset();
        // Same instant, same point: scores again from a clean slate.
        assert!(detector.evaluate(INSIDE_A, &model, 0.1).is_some());
    }
}
