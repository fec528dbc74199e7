// src/pipeline/event_bus.rs
//
// Decoupled event system. The engine publishes events instead of reaching
// into the presenter; the presentation loop drains them once per frame.

use glam::Vec3;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub enum GameEvent {
    /// First tap of a boundary placement — the presenter shows a preview
    /// marker at this point until the second tap lands.
    BoundaryPreview { point: Vec3 },

    BoundaryPlaced {
        index: usize,
        start: Vec3,
        end: Vec3,
    },

    GameStarted {
        team_count: usize,
    },

    ScoreAwarded {
        boundary_index: usize,
        team: usize,
        score: u32,
        text: String,
        timestamp: f64,
    },

    GameReset,
}

pub struct EventBus {
    events: VecDeque<GameEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn publish(&mut self, event: GameEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}
