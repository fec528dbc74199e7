// src/detector.rs
//
// Ball detection behind the ObjectDetector trait. The pipeline only ever
// consumes the first returned box, and the YOLO implementation leans into
// that: it keeps the single best sports-ball candidate per frame instead
// of running NMS over a full detection list.
//
// Output boxes are normalized to [0,1] with a BOTTOM-LEFT origin — that
// convention is this detector's contract, and `geometry` owns the one
// conversion to display space.

use crate::types::{BoundingBox, Frame};
use anyhow::{Context, Result};
use ort::{
    execution_providers::CUDAExecutionProvider,
    session::{builder::GraphOptimizationLevel, Session},
};
use tracing::{debug, info};

// COCO class id for "sports ball".
const BALL_CLASS: usize = 32;
const YOLO_CLASSES: usize = 80;

pub trait ObjectDetector: Send {
    /// Zero or one normalized bounding box per frame (best candidate first
    /// if an implementation ever returns more).
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>>;
}

pub struct BallDetector {
    session: Session,
    input_size: usize,
    confidence_threshold: f32,
}

impl BallDetector {
    pub fn new(model_path: &str, input_size: usize, confidence_threshold: f32) -> Result<Self> {
        info!("Loading ball detection model: {}", model_path);

        let session = Session::builder()?
            .with_execution_providers([CUDAExecutionProvider::default().with_device_id(0).build()])?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(model_path)
            .context("Failed to load detection model")?;

        info!("✓ Ball detector initialized");
        Ok(Self {
            session,
            input_size,
            confidence_threshold,
        })
    }

    fn preprocess(&self, frame: &Frame) -> (Vec<f32>, f32, f32, f32) {
        let target = self.input_size;

        // Letterbox: scale to fit, pad to square with gray.
        let scale = (target as f32 / frame.width as f32).min(target as f32 / frame.height as f32);
        let scaled_w = (frame.width as f32 * scale) as usize;
        let scaled_h = (frame.height as f32 * scale) as usize;
        let pad_x = (target - scaled_w) as f32 / 2.0;
        let pad_y = (target - scaled_h) as f32 / 2.0;

        let resized = resize_bilinear(&frame.data, frame.width, frame.height, scaled_w, scaled_h);

        let mut canvas = vec![114u8; target * target * 3];
        for y in 0..scaled_h {
            for x in 0..scaled_w {
                let src_idx = (y * scaled_w + x) * 3;
                let dst_idx = ((y + pad_y as usize) * target + x + pad_x as usize) * 3;
                canvas[dst_idx..dst_idx + 3].copy_from_slice(&resized[src_idx..src_idx + 3]);
            }
        }

        // [0,255] HWC -> [0,1] CHW
        let mut input = vec![0.0f32; 3 * target * target];
        for c in 0..3 {
            for h in 0..target {
                for w in 0..target {
                    input[c * target * target + h * target + w] =
                        canvas[(h * target + w) * 3 + c] as f32 / 255.0;
                }
            }
        }

        (input, scale, pad_x, pad_y)
    }

    fn infer(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let shape = [1, 3, self.input_size, self.input_size];
        let input_value =
            ort::value::Value::from_array((shape.as_slice(), input.to_vec().into_boxed_slice()))?;

        let outputs = self.session.run(ort::inputs!["images" => input_value])?;
        let (_, data) = outputs[0].try_extract_tensor::<f32>()?;
        Ok(data.to_vec())
    }
}

impl ObjectDetector for BallDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>> {
        let (input, scale, pad_x, pad_y) = self.preprocess(frame);
        let output = self.infer(&input)?;

        match select_best_ball(
            &output,
            frame.width as f32,
            frame.height as f32,
            scale,
            pad_x,
            pad_y,
            self.confidence_threshold,
        ) {
            Some((bbox, conf)) => {
                debug!(
                    "Ball at ({:.3},{:.3}) {:.3}x{:.3}, conf={:.2}",
                    bbox.origin_x, bbox.origin_y, bbox.width, bbox.height, conf
                );
                Ok(vec![bbox])
            }
            None => Ok(Vec::new()),
        }
    }
}

/// YOLO output [1, 84, N]: pick the single best sports-ball prediction and
/// map it back through the letterbox into a normalized bottom-left box.
fn select_best_ball(
    output: &[f32],
    frame_w: f32,
    frame_h: f32,
    scale: f32,
    pad_x: f32,
    pad_y: f32,
    confidence_threshold: f32,
) -> Option<(BoundingBox, f32)> {
    let num_preds = output.len() / (4 + YOLO_CLASSES);
    let mut best: Option<(usize, f32)> = None;

    for i in 0..num_preds {
        let conf = output[num_preds * (4 + BALL_CLASS) + i];
        if conf < confidence_threshold {
            continue;
        }
        if best.map(|(_, c)| conf > c).unwrap_or(true) {
            best = Some((i, conf));
        }
    }

    let (i, conf) = best?;
    let cx = output[i];
    let cy = output[num_preds + i];
    let w = output[num_preds * 2 + i];
    let h = output[num_preds * 3 + i];

    // Center format -> corners, undo letterbox, clamp into the frame.
    let x1 = ((cx - w / 2.0 - pad_x) / scale).clamp(0.0, frame_w);
    let y1 = ((cy - h / 2.0 - pad_y) / scale).clamp(0.0, frame_h);
    let x2 = ((cx + w / 2.0 - pad_x) / scale).clamp(0.0, frame_w);
    let y2 = ((cy + h / 2.0 - pad_y) / scale).clamp(0.0, frame_h);

    // Pixel top-left coordinates -> normalized bottom-left box.
    let bbox = BoundingBox::new(
        x1 / frame_w,
        (frame_h - y2) / frame_h,
        (x2 - x1) / frame_w,
        (y2 - y1) / frame_h,
    );
    Some((bbox, conf))
}

fn resize_bilinear(src: &[u8], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<u8> {
    let mut dst = vec![0u8; dst_h * dst_w * 3];
    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx as f32 * x_ratio;
            let sy = dy as f32 * y_ratio;
            let sx0 = sx.floor() as usize;
            let sy0 = sy.floor() as usize;
            let sx1 = (sx0 + 1).min(src_w - 1);
            let sy1 = (sy0 + 1).min(src_h - 1);
            let fx = sx - sx0 as f32;
            let fy = sy - sy0 as f32;

            for c in 0..3 {
                let p00 = src[(sy0 * src_w + sx0) * 3 + c] as f32;
                let p10 = src[(sy0 * src_w + sx1) * 3 + c] as f32;
                let p01 = src[(sy1 * src_w + sx0) * 3 + c] as f32;
                let p11 = src[(sy1 * src_w + sx1) * 3 + c] as f32;

                let val = p00 * (1.0 - fx) * (1.0 - fy)
                    + p10 * fx * (1.0 - fy)
                    + p01 * (1.0 - fx) * fy
                    + p11 * fx * fy;

                dst[(dy * dst_w + dx) * 3 + c] = val.round() as u8;
            }
        }
    }
    dst
}
