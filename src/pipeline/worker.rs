// src/pipeline/worker.rs
//
// The detection worker thread. The capture loop is the producer; after the
// frame gate admits a frame it ships a DetectionJob over a bounded channel
// and never blocks on inference. Every job carries the gate's admission
// guard, so the gate is released on success, on detector error, and on
// panic unwind alike.
//
// Results flow back one-directionally as DetectionOutcome messages; the
// presentation loop is the only consumer and the only place game state is
// touched. Outcomes are processed in completion order — with a single
// worker and single-in-flight admission that equals submission order, but
// nothing here depends on it.

use crate::detector::ObjectDetector;
use crate::frame_gate::AdmissionGuard;
use crate::types::{BoundingBox, Frame};
use crossbeam_channel::{Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, info};

pub struct DetectionJob {
    pub frame_id: u64,
    pub frame: Frame,
    pub guard: AdmissionGuard,
}

/// One message per admitted frame, detection or not. Detector failures are
/// converted to `bbox: None` here — they never cross the channel as errors.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub frame_id: u64,
    pub timestamp: f64,
    pub bbox: Option<BoundingBox>,
    pub detect_ms: f64,
}

pub fn spawn_detection_worker(
    mut detector: Box<dyn ObjectDetector>,
    jobs: Receiver<DetectionJob>,
    outcomes: Sender<DetectionOutcome>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for job in jobs.iter() {
            let started = Instant::now();
            let bbox = match detector.detect(&job.frame) {
                // At most one detection per frame; the detector already
                // limits itself to the best candidate.
                Ok(detections) => detections.into_iter().next(),
                Err(e) => {
                    debug!("Detection failed on frame {}: {}", job.frame_id, e);
                    None
                }
            };
            let detect_ms = started.elapsed().as_secs_f64() * 1000.0;

            let outcome = DetectionOutcome {
                frame_id: job.frame_id,
                timestamp: job.frame.timestamp,
                bbox,
                detect_ms,
            };

            // Receiver gone means the session ended; the remaining guards
            // still drop and release the gate.
            if outcomes.send(outcome).is_err() {
                break;
            }

            drop(job.guard);
        }
        info!("Detection worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_gate::{AdmissionPolicy, FrameGate};
    use anyhow::Result;
    use crossbeam_channel::bounded;
    use std::sync::Arc;

    struct ScriptedDetector {
        results: Vec<Result<Vec<BoundingBox>>>,
    }

    impl ObjectDetector for ScriptedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<BoundingBox>> {
            self.results.pop().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn test_frame(timestamp: f64) -> Frame {
        Frame {
            data: vec![0; 12],
            width: 2,
            height: 2,
            timestamp,
        }
    }

    #[test]
    fn test_worker_releases_gate_on_detector_error() {
        let gate = Arc::new(FrameGate::new(AdmissionPolicy::SingleInFlight));
        let (job_tx, job_rx) = bounded::<DetectionJob>(1);
        let (out_tx, out_rx) = bounded::<DetectionOutcome>(4);

        let detector = ScriptedDetector {
            results: vec![Err(anyhow::anyhow!("malformed buffer"))],
        };
        let handle = spawn_detection_worker(Box::new(detector), job_rx, out_tx);

        assert!(gate.try_admit(0.0));
        job_tx
            .send(DetectionJob {
                frame_id: 1,
                frame: test_frame(0.0),
                guard: AdmissionGuard::new(gate.clone()),
            })
            .unwrap();

        let outcome = out_rx.recv().unwrap();
        assert_eq!(outcome.frame_id, 1);
        assert!(outcome.bbox.is_none());

        drop(job_tx);
        handle.join().unwrap();

        // The failed detection still released the busy flag.
        assert!(gate.try_admit(1.0));
    }

    #[test]
    fn test_worker_forwards_first_detection_only() {
        let gate = Arc::new(FrameGate::new(AdmissionPolicy::SingleInFlight));
        let (job_tx, job_rx) = bounded::<DetectionJob>(1);
        let (out_tx, out_rx) = bounded::<DetectionOutcome>(4);

        let first = BoundingBox::new(0.1, 0.2, 0.3, 0.3);
        let second = BoundingBox::new(0.5, 0.5, 0.1, 0.1);
        let detector = ScriptedDetector {
            results: vec![Ok(vec![first, second])],
        };
        let handle = spawn_detection_worker(Box::new(detector), job_rx, out_tx);

        assert!(gate.try_admit(0.0));
        job_tx
            .send(DetectionJob {
                frame_id: 7,
                frame: test_frame(0.25),
                guard: AdmissionGuard::new(gate.clone()),
            })
            .unwrap();

        let outcome = out_rx.recv().unwrap();
        assert_eq!(outcome.bbox, Some(first));
        assert_eq!(outcome.timestamp, 0.25);

        drop(job_tx);
        handle.join().unwrap();
    }
}
