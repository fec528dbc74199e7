// src/main.rs

mod config;
mod crossing;
mod detector;
mod frame_gate;
mod geometry;
mod goal_model;
mod pipeline;
mod presenter;
mod projector;
mod score;
mod session;
mod types;
mod video_source;

use anyhow::{bail, Result};
use crossbeam_channel::{bounded, unbounded};
use crossing::ScoringMode;
use detector::BallDetector;
use frame_gate::{AdmissionGuard, AdmissionPolicy, FrameGate};
use glam::Vec2;
use opencv::core::Point as CvPoint;
use pipeline::{spawn_detection_worker, DetectionJob, GameEvent, SessionMetrics};
use presenter::{OverlayPresenter, Presenter};
use projector::{GroundPlaneHitTester, ProjectionMode, Projector};
use session::GameSession;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use types::Config;
use video_source::VideoSource;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("goalcam=info,ort=warn")
        .init();

    info!("⚽ Goal Scoring Overlay Starting");

    let config = Config::load("config.yaml")?;
    info!("✓ Configuration loaded");

    info!(
        "Game config: mode={}, depth={:.2}, cooldown={:.1}s, gate={}",
        config.game.scoring_mode,
        config.game.goal_depth,
        config.game.score_cooldown_secs,
        config.gate.policy
    );

    let source = VideoSource::new(config.clone());
    let video_files = source.find_video_files()?;

    if video_files.is_empty() {
        error!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    info!("Found {} video file(s) to process", video_files.len());

    for (idx, video_path) in video_files.iter().enumerate() {
        info!("\n========================================");
        info!(
            "Processing video {}/{}: {}",
            idx + 1,
            video_files.len(),
            video_path.display()
        );
        info!("========================================\n");

        match run_game(video_path, &source, &config) {
            Ok(stats) => {
                info!("\n✓ Game session complete!");
                info!("  Total frames: {}", stats.total_frames);
                info!("  Ball detections: {}", stats.detections);
                info!(
                    "  Final score — Team 1: {}, Team 2: {}",
                    stats.goals[0], stats.goals[1]
                );
            }
            Err(e) => {
                error!("Failed to process video: {}", e);
            }
        }
    }

    Ok(())
}

struct GameStats {
    total_frames: u64,
    detections: u64,
    goals: [u32; 2],
}

fn parse_scoring_mode(config: &Config) -> Result<ScoringMode> {
    match config.game.scoring_mode.as_str() {
        "zone" => Ok(ScoringMode::Zone),
        "line" => Ok(ScoringMode::Line),
        other => bail!("unknown scoring mode: {}", other),
    }
}

fn parse_admission_policy(config: &Config) -> Result<AdmissionPolicy> {
    match config.gate.policy.as_str() {
        "single_in_flight" => Ok(AdmissionPolicy::SingleInFlight),
        "time_throttled" => Ok(AdmissionPolicy::TimeThrottled {
            min_interval_secs: config.gate.min_interval_secs,
        }),
        other => bail!("unknown gate policy: {}", other),
    }
}

fn build_projector(config: &Config, width: f32, height: f32) -> Result<Projector> {
    match config.projection.mode.as_str() {
        "screen" => Ok(Projector::screen(width, height)),
        "world" => {
            let camera = &config.projection.camera;
            let tester = GroundPlaneHitTester::new(
                camera.focal_px,
                width,
                height,
                camera.height_m,
                camera.pitch_down_deg.to_radians(),
            )?;
            Ok(Projector::world(width, height, Box::new(tester)))
        }
        other => bail!("unknown projection mode: {}", other),
    }
}

/// Place goal boundaries from the configured tap points, two taps per
/// boundary, through the same hit-test path a touch UI would use.
fn place_boundaries(session: &mut GameSession, projector: &Projector, taps: &[[f32; 2]]) {
    if taps.len() % 2 != 0 {
        warn!(
            "Odd number of tap points ({}); the last one is ignored",
            taps.len()
        );
    }

    for pair in taps.chunks_exact(2) {
        let resolved: Vec<_> = pair
            .iter()
            .filter_map(|t| projector.resolve_tap(Vec2::new(t[0], t[1])))
            .collect();
        if resolved.len() < 2 {
            warn!(
                "Tap pair ({:?}, {:?}) did not resolve to the world; skipping boundary",
                pair[0], pair[1]
            );
            continue;
        }
        session.handle_tap(resolved[0]);
        session.handle_tap(resolved[1]);
    }
}

fn run_game(video_path: &Path, source: &VideoSource, config: &Config) -> Result<GameStats> {
    let mut reader = source.open_video(video_path)?;
    let writer = source.create_writer(video_path, reader.width, reader.height, reader.fps)?;

    let projector = build_projector(config, reader.width as f32, reader.height as f32)?;
    let mut session = GameSession::new(
        parse_scoring_mode(config)?,
        config.game.goal_depth,
        config.game.score_cooldown_secs,
        config.game.line_distance_threshold,
    );

    place_boundaries(&mut session, &projector, &config.game.tap_points);
    if session.start_game() {
        info!("✓ Game active with {} boundary(ies)", session.model().len());
    } else {
        warn!("No goal boundaries placed — detections will be shown but nothing can score");
    }

    // Presenter setup. Zone footprints are fixed at placement time; in
    // screen mode engine space is display space, so they draw directly.
    std::fs::create_dir_all(&config.video.output_dir)?;
    let video_name = video_path.file_stem().unwrap().to_str().unwrap();
    let results_path =
        Path::new(&config.video.output_dir).join(format!("{}_goals.jsonl", video_name));
    let mut overlay = OverlayPresenter::new(writer, Some(&results_path))?;
    if projector.mode() == ProjectionMode::Screen {
        for boundary in session.model().boundaries() {
            let corners = boundary
                .zone
                .corners
                .map(|c| CvPoint::new(c.x as i32, c.z as i32));
            overlay.add_goal_footprint(corners);
        }
    }
    let mut presenter: Box<dyn Presenter> = Box::new(overlay);
    for event in session.drain_events() {
        presenter.present_event(&event)?;
    }

    // Detection worker. The job channel holds a single frame; the gate
    // decides what gets submitted, the channel is just the handoff.
    let ball_detector = BallDetector::new(
        &config.model.path,
        config.model.input_size,
        config.model.confidence_threshold,
    )?;
    let gate = Arc::new(FrameGate::new(parse_admission_policy(config)?));
    let (job_tx, job_rx) = bounded::<DetectionJob>(1);
    let (outcome_tx, outcome_rx) = unbounded();
    let worker = spawn_detection_worker(Box::new(ball_detector), job_rx, outcome_tx);

    let metrics = SessionMetrics::new();
    let mut frame_id: u64 = 0;
    let mut last_rect = None;

    while let Some(frame) = reader.read_frame()? {
        frame_id += 1;
        let now = frame.timestamp;
        metrics.inc(&metrics.frames_seen);

        if gate.try_admit(now) {
            metrics.inc(&metrics.frames_admitted);
            let job = DetectionJob {
                frame_id,
                frame: frame.clone(),
                guard: AdmissionGuard::new(gate.clone()),
            };
            if job_tx.try_send(job).is_err() {
                // Worker still chewing on the previous frame under the
                // time-throttled policy; the frame is simply missed.
                debug!("Detection worker busy, dropping admitted frame {}", frame_id);
            }
        } else {
            metrics.inc(&metrics.gate_refusals);
        }

        // Drain completed detections (completion order).
        for outcome in outcome_rx.try_iter() {
            match outcome.bbox {
                Some(bbox) => {
                    metrics.inc(&metrics.detections);
                    last_rect = Some(projector.display_rect(&bbox));

                    match projector.project(&bbox).engine_point() {
                        Some(point) => {
                            if session.score_state().is_active()
                                && session.in_cooldown(outcome.timestamp)
                            {
                                metrics.inc(&metrics.cooldown_skips);
                            }
                            session.process_point(point, outcome.timestamp);
                        }
                        None => metrics.inc(&metrics.projection_misses),
                    }
                }
                None => metrics.inc(&metrics.empty_frames),
            }
        }

        for event in session.drain_events() {
            if matches!(event, GameEvent::ScoreAwarded { .. }) {
                metrics.inc(&metrics.scores);
            }
            presenter.present_event(&event)?;
        }

        presenter.present_frame(&frame, last_rect.as_ref())?;

        if frame_id % 150 == 0 {
            info!(
                "Progress: {:.1}% | {} | Team 1: {} | Team 2: {}",
                reader.progress(),
                session.score_state().activity().as_str(),
                session.score_state().score(0),
                session.score_state().score(1),
            );
        }
    }

    // End of stream: stop the worker and flush the last outcomes.
    drop(job_tx);
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("detection worker panicked"))?;
    for outcome in outcome_rx.try_iter() {
        if let Some(bbox) = outcome.bbox {
            if let Some(point) = projector.project(&bbox).engine_point() {
                session.process_point(point, outcome.timestamp);
            }
        }
    }
    for event in session.drain_events() {
        presenter.present_event(&event)?;
    }

    metrics.log_summary();

    Ok(GameStats {
        total_frames: frame_id,
        detections: metrics
            .detections
            .load(std::sync::atomic::Ordering::Relaxed),
        goals: [
            session.score_state().score(0),
            session.score_state().score(1),
        ],
    })
}
