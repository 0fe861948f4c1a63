use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

pub const DETECT_PATH: &str = "/detect/";
pub const STATUS_PATH: &str = "/status";
pub const SUMMARY_PATH: &str = "/summary";
pub const MUTE_PATH: &str = "/mute/";
pub const MUTE_STATUS_PATH: &str = "/mute/status";
pub const EXPORT_PATH: &str = "/export";
pub const DETECTION_LOG_PATH: &str = "/detections/log";

/// Multipart field name the backend reads the image from.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Live frames are downsampled to this size before encoding.
pub const INFERENCE_WIDTH: u32 = 320;
pub const INFERENCE_HEIGHT: u32 = 240;

pub const LIVE_JPEG_QUALITY: u8 = 60;
pub const STATIC_JPEG_QUALITY: u8 = 90;

pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const MUTE_DURATION: Duration = Duration::from_secs(5 * 60);
/// How often a muted live loop with no interval checks whether to resume.
pub const MUTED_RECHECK_INTERVAL: Duration = Duration::from_millis(200);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Risk score below this is safe.
pub const RISK_MODERATE_THRESHOLD: f64 = 30.0;
/// Risk score at or above this is high risk and raises an alert.
pub const RISK_HIGH_THRESHOLD: f64 = 60.0;

pub const BOX_LINE_WIDTH: u32 = 3;
pub const LABEL_OFFSET_X: f64 = 5.0;
pub const LABEL_OFFSET_Y: f64 = -8.0;

/// Entries retained by in-memory activity logs.
pub const ACTIVITY_LOG_CAPACITY: usize = 200;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Rendered batches kept for client-side CSV export; oldest are dropped.
pub const HISTORY_CAPACITY: usize = 10_000;
