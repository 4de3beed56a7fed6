//! Constants used throughout the fitting engine

/// Population-average adult face width, used when no measured width is available
pub const AVERAGE_FACE_WIDTH_MM: f64 = 140.0;

/// Face width assumed by the frame selector when no measurement exists yet
pub const FALLBACK_FACE_WIDTH_MM: f64 = 130.0;

/// Width (px) all frame overlay assets are authored against
pub const FRAME_ASSET_BASE_WIDTH_PX: f64 = 400.0;

/// Width (px) of the smaller product-page preview assets
pub const PREVIEW_ASSET_BASE_WIDTH_PX: f64 = 340.0;

/// Head-roll angles under this many degrees are snapped to zero
pub const ROTATION_SNAP_DEG: f64 = 3.0;

/// Frame narrower than the face by at least this many mm reads as tight
pub const FIT_TIGHT_BELOW_MM: f64 = -3.0;

/// Frame wider than the face by at least this many mm reads as loose
pub const FIT_LOOSE_ABOVE_MM: f64 = 5.0;

/// Vertical drop (mm) from the bridge point to the frame anchor, on top of half the lens height
pub const BRIDGE_DROP_MM: f64 = 4.0;

/// Frame width within this many mm of the face width counts as a best match
pub const BEST_MATCH_TOLERANCE_MM: f64 = 8.0;

/// Candidate list keeps frames in [face width, face width + this] mm
pub const CANDIDATE_WINDOW_MM: f64 = 15.0;

/// Lens height derived from lens width when the catalog omits it
pub const LENS_HEIGHT_RATIO: f64 = 0.6;

/// Weight of the previous value in the face-width percent moving average
pub const FACE_WIDTH_SMOOTHING_WEIGHT: f64 = 0.8;

/// Minimum gap between detector invocations (roughly 10 Hz)
pub const DETECTION_INTERVAL_MS: u64 = 100;

/// Identical guidance phrases are not repeated within this window
pub const GUIDANCE_DEBOUNCE_MS: u64 = 2000;

/// Side length of the downsampled square used for brightness/contrast sampling
pub const QUALITY_SAMPLE_SIZE: u32 = 100;

/// Brightness reported when no sample could be taken
pub const DEFAULT_BRIGHTNESS: f64 = 128.0;

/// Contrast reported when no sample could be taken
pub const DEFAULT_CONTRAST: f64 = 0.5;

/// Scale factor converting the nose-offset ratio into approximate degrees of yaw
pub const ROTATION_PROXY_FACTOR: f64 = 60.0;

/// Preview overlay scale bounds
pub const PREVIEW_MIN_SCALE: f64 = 0.26;
pub const PREVIEW_MAX_SCALE: f64 = 0.62;
