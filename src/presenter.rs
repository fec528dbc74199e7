// src/presenter.rs
//
// Rendering and score output. The presenter consumes display-space rects
// and engine events; it has no write access back into the engine.

use crate::geometry::DisplayRect;
use crate::pipeline::GameEvent;
use crate::types::Frame;
use anyhow::Result;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
    videoio::{VideoWriter, VideoWriterTrait},
};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub trait Presenter {
    /// Called once per frame with the detection's display rect, if any.
    fn present_frame(&mut self, frame: &Frame, detection: Option<&DisplayRect>) -> Result<()>;

    /// Called for every drained engine event.
    fn present_event(&mut self, event: &GameEvent) -> Result<()>;
}

/// Draws the detection box and score text onto the outgoing video and
/// appends score events to a JSONL results file.
pub struct OverlayPresenter {
    writer: Option<VideoWriter>,
    results_file: Option<File>,
    score_texts: [String; 2],
    goal_footprints: Vec<[core::Point; 4]>,
    preview_point: Option<core::Point>,
}

impl OverlayPresenter {
    pub fn new(writer: Option<VideoWriter>, results_path: Option<&Path>) -> Result<Self> {
        let results_file = match results_path {
            Some(path) => {
                info!("Score events will be written to: {}", path.display());
                Some(File::create(path)?)
            }
            None => None,
        };

        Ok(Self {
            writer,
            results_file,
            score_texts: [String::from("Team 1: 0"), String::from("Team 2: 0")],
            goal_footprints: Vec::new(),
            preview_point: None,
        })
    }

    /// Register a zone footprint to draw, already mapped to display pixels.
    pub fn add_goal_footprint(&mut self, corners: [core::Point; 4]) {
        self.goal_footprints.push(corners);
    }
}

impl Presenter for OverlayPresenter {
    fn present_frame(&mut self, frame: &Frame, detection: Option<&DisplayRect>) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let mat = Mat::from_slice(&frame.data)?;
        let mat = mat.reshape(3, frame.height as i32)?;
        let mut output = Mat::default();
        imgproc::cvt_color(&mat, &mut output, imgproc::COLOR_RGB2BGR, 0)?;

        // Placed goal footprints.
        for corners in &self.goal_footprints {
            for i in 0..4 {
                imgproc::line(
                    &mut output,
                    corners[i],
                    corners[(i + 1) % 4],
                    core::Scalar::new(255.0, 200.0, 0.0, 0.0),
                    2,
                    imgproc::LINE_AA,
                    0,
                )?;
            }
        }

        // Pending-placement preview marker.
        if let Some(point) = self.preview_point {
            imgproc::circle(
                &mut output,
                point,
                6,
                core::Scalar::new(0.0, 200.0, 255.0, 0.0),
                -1,
                imgproc::LINE_AA,
                0,
            )?;
        }

        // Detection box.
        if let Some(rect) = detection {
            imgproc::rectangle(
                &mut output,
                core::Rect::new(
                    rect.x as i32,
                    rect.y as i32,
                    rect.width as i32,
                    rect.height as i32,
                ),
                core::Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                imgproc::LINE_8,
                0,
            )?;
        }

        // Score banner.
        imgproc::rectangle(
            &mut output,
            core::Rect::new(5, 5, 320, 70),
            core::Scalar::new(40.0, 40.0, 40.0, 0.0),
            -1,
            imgproc::LINE_8,
            0,
        )?;
        for (i, text) in self.score_texts.iter().enumerate() {
            imgproc::put_text(
                &mut output,
                text,
                core::Point::new(15, 30 + 28 * i as i32),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.7,
                core::Scalar::new(255.0, 255.0, 255.0, 0.0),
                2,
                imgproc::LINE_8,
                false,
            )?;
        }

        writer.write(&output)?;
        Ok(())
    }

    fn present_event(&mut self, event: &GameEvent) -> Result<()> {
        match event {
            GameEvent::ScoreAwarded { team, text, .. } => {
                self.score_texts[*team] = text.clone();
                if let Some(ref mut file) = self.results_file {
                    let json_line = serde_json::to_string(event)?;
                    writeln!(file, "{}", json_line)?;
                    file.flush()?;
                    info!("💾 Score event saved to JSONL");
                }
            }
            GameEvent::BoundaryPreview { point } => {
                self.preview_point = Some(core::Point::new(point.x as i32, point.z as i32));
            }
            GameEvent::BoundaryPlaced { index, start, end } => {
                self.preview_point = None;
                info!(
                    "Boundary {} overlay: ({:.1},{:.1}) → ({:.1},{:.1})",
                    index, start.x, start.z, end.x, end.z
                );
            }
            GameEvent::GameReset => {
                self.score_texts = [String::from("Team 1: 0"), String::from("Team 2: 0")];
                self.goal_footprints.clear();
                self.preview_point = None;
            }
            _ => {}
        }
        Ok(())
    }
}
