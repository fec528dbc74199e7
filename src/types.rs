use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub gate: GateConfig,
    pub game: GameConfig,
    pub projection: ProjectionConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
    pub input_size: usize,
    pub confidence_threshold: f32,
    pub num_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// "single_in_flight" or "time_throttled"
    pub policy: String,
    /// Minimum seconds between admissions under the time_throttled policy.
    #[serde(default = "default_min_interval")]
    pub min_interval_secs: f64,
}

fn default_min_interval() -> f64 {
    0.1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// "zone" or "line"
    pub scoring_mode: String,
    /// Zone depth behind the goal line. Meters in world mode, pixels in screen mode.
    pub goal_depth: f32,
    #[serde(default = "default_cooldown")]
    pub score_cooldown_secs: f64,
    #[serde(default = "default_line_distance")]
    pub line_distance_threshold: f32,
    /// Tap points in display pixels, consumed in pairs; each pair places one
    /// goal boundary through the same hit-test path a touch UI would use.
    pub tap_points: Vec<[f32; 2]>,
}

fn default_cooldown() -> f64 {
    3.0
}

fn default_line_distance() -> f32 {
    0.1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// "screen" or "world"
    pub mode: String,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub focal_px: f32,
    pub height_m: f32,
    pub pitch_down_deg: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub save_annotated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// One captured frame, RGB bytes, with its source timestamp in seconds.
/// All engine time comparisons (throttle, cooldown) use this timestamp.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub timestamp: f64,
}

/// Normalized detection rectangle in [0,1]×[0,1], bottom-left origin.
///
/// The bottom-left convention is fixed by the detector; conversion to the
/// top-left pixel display space happens only in `geometry::bbox_to_display_rect`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(origin_x: f32, origin_y: f32, width: f32, height: f32) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// Center in the same normalized bottom-left space.
    pub fn center(&self) -> (f32, f32) {
        (
            self.origin_x + self.width / 2.0,
            self.origin_y + self.height / 2.0,
        )
    }
}
