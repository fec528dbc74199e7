// src/session.rs
//
// GameSession owns every piece of mutable game state: the goal model, the
// crossing detector, the score ledger, the two-tap placement buffer, and
// the event bus. Nothing here is static or shared — the session lives on
// the presentation context and is the only mutator, so the engine runs in
// unit tests without any capture or UI scaffolding.

use crate::crossing::{CrossingDetector, ScoringMode};
use crate::goal_model::GoalModel;
use crate::pipeline::{EventBus, GameEvent};
use crate::score::ScoreState;
use glam::Vec3;
use tracing::{debug, info, warn};

const MAX_PENDING_EVENTS: usize = 32;

pub struct GameSession {
    model: GoalModel,
    crossing: CrossingDetector,
    score: ScoreState,
    pending_tap: Option<Vec3>,
    events: EventBus,
}

impl GameSession {
    pub fn new(
        mode: ScoringMode,
        goal_depth: f32,
        cooldown_secs: f64,
        line_distance_threshold: f32,
    ) -> Self {
        Self {
            model: GoalModel::new(goal_depth),
            crossing: CrossingDetector::new(mode, cooldown_secs, line_distance_threshold),
            score: ScoreState::new(),
            pending_tap: None,
            events: EventBus::new(MAX_PENDING_EVENTS),
        }
    }

    /// One resolved tap in engine space. The first tap of a pair is held as
    /// the pending endpoint and previewed; the second finalizes a boundary.
    pub fn handle_tap(&mut self, point: Vec3) {
        match self.pending_tap.take() {
            None => {
                debug!(
                    "Pending goal endpoint at ({:.2},{:.2},{:.2})",
                    point.x, point.y, point.z
                );
                self.pending_tap = Some(point);
                self.events.publish(GameEvent::BoundaryPreview { point });
            }
            Some(start) => match self.model.add_boundary(start, point) {
                Ok(index) => {
                    self.events.publish(GameEvent::BoundaryPlaced {
                        index,
                        start,
                        end: point,
                    });
                }
                Err(e) => {
                    warn!("Boundary placement refused: {}", e);
                }
            },
        }
    }

    /// NotReady → Active, once at least one boundary exists.
    pub fn start_game(&mut self) -> bool {
        let started = self.score.start(self.model.len());
        if started {
            self.events.publish(GameEvent::GameStarted {
                team_count: self.score.active_team_count(),
            });
        }
        started
    }

    /// Evaluate one projected ball position. Scoring only runs while the
    /// game is Active — pre-game detections are presented but never score.
    pub fn process_point(&mut self, point: Vec3, now: f64) {
        if !self.score.is_active() {
            return;
        }

        if let Some(event) = self.crossing.evaluate(point, &self.model, now) {
            let update = self.score.award_point(event.team);
            self.events.publish(GameEvent::ScoreAwarded {
                boundary_index: event.boundary_index,
                team: update.team,
                score: update.score,
                text: update.text,
                timestamp: event.timestamp,
            });
        }
    }

    /// Whole-game reset: geometry, scores, cooldown, placement buffer.
    pub fn reset(&mut self) {
        info!("Game reset");
        self.model.reset();
        self.crossing.reset();
        self.score.reset();
        self.pending_tap = None;
        self.events.publish(GameEvent::GameReset);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn in_cooldown(&self, now: f64) -> bool {
        self.crossing.in_cooldown(now)
    }

    pub fn model(&self) -> &GoalModel {
        &self.model
    }

    pub fn score_state(&self) -> &ScoreState {
        &self.score
    }
}
