// src/pipeline/metrics.rs
//
// Session observability. Counters are atomics so the capture loop and the
// worker can both bump them; everything else reads them at summary time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SessionMetrics {
    pub frames_seen: Arc<AtomicU64>,
    pub frames_admitted: Arc<AtomicU64>,
    pub gate_refusals: Arc<AtomicU64>,
    pub detections: Arc<AtomicU64>,
    pub empty_frames: Arc<AtomicU64>,
    pub projection_misses: Arc<AtomicU64>,
    pub cooldown_skips: Arc<AtomicU64>,
    pub scores: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            frames_seen: Arc::new(AtomicU64::new(0)),
            frames_admitted: Arc::new(AtomicU64::new(0)),
            gate_refusals: Arc::new(AtomicU64::new(0)),
            detections: Arc::new(AtomicU64::new(0)),
            empty_frames: Arc::new(AtomicU64::new(0)),
            projection_misses: Arc::new(AtomicU64::new(0)),
            cooldown_skips: Arc::new(AtomicU64::new(0)),
            scores: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.frames_seen.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Fraction of observed frames the gate let through.
    pub fn admission_ratio(&self) -> f64 {
        let seen = self.frames_seen.load(Ordering::Relaxed);
        if seen == 0 {
            return 0.0;
        }
        self.frames_admitted.load(Ordering::Relaxed) as f64 / seen as f64
    }

    pub fn log_summary(&self) {
        let seen = self.frames_seen.load(Ordering::Relaxed);
        info!("Session summary:");
        info!(
            "  Frames: {} seen, {} admitted ({:.0}%), {} refused by gate",
            seen,
            self.frames_admitted.load(Ordering::Relaxed),
            self.admission_ratio() * 100.0,
            self.gate_refusals.load(Ordering::Relaxed),
        );
        info!(
            "  Detections: {} ({} empty frames, {} projection misses)",
            self.detections.load(Ordering::Relaxed),
            self.empty_frames.load(Ordering::Relaxed),
            self.projection_misses.load(Ordering::Relaxed),
        );
        info!(
            "  Scoring: {} goals, {} cooldown skips",
            self.scores.load(Ordering::Relaxed),
            self.cooldown_skips.load(Ordering::Relaxed),
        );
        info!("  Processing speed: {:.1} FPS", self.fps());
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
