// src/frame_gate.rs
//
// Admission control between the frame producer and the detection worker.
// This is the ONLY state shared across the two contexts, so it is all
// atomics: a busy flag for the single-in-flight policy and the last
// admission timestamp (f64 bits) for the time-throttled policy.
//
// Policies:
//   - SingleInFlight: one outstanding detection at a time. Completion —
//     success or failure — releases the flag; `AdmissionGuard` makes the
//     release unconditional on every exit path of the detection call.
//   - TimeThrottled: admissions at most once per interval, measured from
//     admission and independent of completion. Bounds the detection rate
//     (~10/s at the 0.1 s default) even if inference is instantaneous.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdmissionPolicy {
    SingleInFlight,
    TimeThrottled { min_interval_secs: f64 },
}

pub struct FrameGate {
    policy: AdmissionPolicy,
    busy: AtomicBool,
    last_admit_bits: AtomicU64,
}

impl FrameGate {
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self {
            policy,
            busy: AtomicBool::new(false),
            // NEG_INFINITY: any first timestamp is at least one interval later.
            last_admit_bits: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
        }
    }

    /// Try to admit a frame observed at `now` (seconds, source timebase).
    /// Returns true at most once per outstanding detection (single-in-flight)
    /// or at most once per interval (time-throttled).
    pub fn try_admit(&self, now: f64) -> bool {
        match self.policy {
            AdmissionPolicy::SingleInFlight => self
                .busy
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
            AdmissionPolicy::TimeThrottled { min_interval_secs } => loop {
                let last_bits = self.last_admit_bits.load(Ordering::Acquire);
                if now - f64::from_bits(last_bits) < min_interval_secs {
                    return false;
                }
                if self
                    .last_admit_bits
                    .compare_exchange(
                        last_bits,
                        now.to_bits(),
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
                {
                    return true;
                }
                // Lost a race with another admission; re-check against the
                // winner's timestamp.
            },
        }
    }

    /// Mark the outstanding detection complete. No-op under time throttling,
    /// where admission never waits on completion.
    pub fn release(&self) {
        if self.policy == AdmissionPolicy::SingleInFlight {
            self.busy.store(false, Ordering::Release);
            debug!("Frame gate released");
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Scoped release of an admission. The producer creates one per admitted
/// frame and ships it to the worker alongside the image; dropping it —
/// after a successful detection, a detector error, or a panic unwinding
/// through the worker — releases the gate. No exit path can starve the
/// pipeline.
pub struct AdmissionGuard {
    gate: Arc<FrameGate>,
}

impl AdmissionGuard {
    pub fn new(gate: Arc<FrameGate>) -> Self {
        Self { gate }
    }
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.gate.release();
    }
}
