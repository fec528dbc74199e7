// src/pipeline/mod.rs

pub mod event_bus;
pub mod metrics;
pub mod worker;

pub use event_bus::{EventBus, GameEvent};
pub use metrics::SessionMetrics;
pub use worker::{spawn_detection_worker, DetectionJob, DetectionOutcome};
