// src/score.rs
//
// Per-team score ledger and the game activity state machine.
// NotReady → Active is the only transition; session end is a UI action
// and never reaches the engine.

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameActivity {
    NotReady,
    Active,
}

impl GameActivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "NOT_READY",
            Self::Active => "ACTIVE",
        }
    }
}

/// Result of awarding a point, carrying the display string the presenter
/// shows verbatim.
#[derive(Debug, Clone)]
pub struct ScoreUpdate {
    pub team: usize,
    pub score: u32,
    pub text: String,
}

pub struct ScoreState {
    scores: [u32; 2],
    activity: GameActivity,
    active_team_count: usize,
}

impl ScoreState {
    pub fn new() -> Self {
        Self {
            scores: [0, 0],
            activity: GameActivity::NotReady,
            active_team_count: 0,
        }
    }

    /// The game can start once at least one boundary exists.
    pub fn ready_to_start(&self, boundary_count: usize) -> bool {
        boundary_count >= 1
    }

    /// NotReady → Active. Fixes the active team count at start time.
    /// Returns false (and changes nothing) when no boundary exists yet.
    pub fn start(&mut self, boundary_count: usize) -> bool {
        if !self.ready_to_start(boundary_count) {
            warn!("Cannot start: no goal boundary placed yet");
            return false;
        }
        if self.activity == GameActivity::Active {
            return true;
        }
        self.activity = GameActivity::Active;
        self.active_team_count = boundary_count.min(2);
        info!(
            "Game state: NOT_READY → ACTIVE ({} team(s))",
            self.active_team_count
        );
        true
    }

    pub fn is_active(&self) -> bool {
        self.activity == GameActivity::Active
    }

    pub fn activity(&self) -> GameActivity {
        self.activity
    }

    pub fn active_team_count(&self) -> usize {
        self.active_team_count
    }

    pub fn award_point(&mut self, team: usize) -> ScoreUpdate {
        self.scores[team] += 1;
        let score = self.scores[team];
        let text = format!("Team {}: {}", team + 1, score);
        info!("Score: {}", text);
        ScoreUpdate { team, score, text }
    }

    pub fn score(&self, team: usize) -> u32 {
        self.scores[team]
    }

    pub fn reset(&mut self) {
        self.scores = [0, 0];
        self.activity = GameActivity::NotReady;
        self.active_team_count = 0;
    }
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}
