//! Configuration management for the fitting engine
//!
//! Every empirically chosen constant (rotation snap, fit band, smoothing
//! weight, distance bands) lives here as a named, overridable field so
//! deployments can tune capture behavior without touching the engine.

use crate::constants::{
    AVERAGE_FACE_WIDTH_MM, BEST_MATCH_TOLERANCE_MM, BRIDGE_DROP_MM, CANDIDATE_WINDOW_MM,
    DETECTION_INTERVAL_MS, FACE_WIDTH_SMOOTHING_WEIGHT, FALLBACK_FACE_WIDTH_MM,
    FIT_LOOSE_ABOVE_MM, FIT_TIGHT_BELOW_MM, FRAME_ASSET_BASE_WIDTH_PX, GUIDANCE_DEBOUNCE_MS,
    PREVIEW_ASSET_BASE_WIDTH_PX, PREVIEW_MAX_SCALE, PREVIEW_MIN_SCALE, ROTATION_SNAP_DEG,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Device class the capture runs on; thresholds differ because expected
/// camera distance and landmark stability differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    Mobile,
    #[default]
    Desktop,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FitConfig {
    /// Device profile used to pick threshold sets
    pub profile: DeviceProfile,

    /// Capture validation thresholds
    pub validation: ValidationConfig,

    /// Frame transform tuning
    pub transform: TransformTuning,

    /// Calibration defaults
    pub measurement: MeasurementConfig,

    /// Candidate frame selection
    pub selection: SelectionConfig,

    /// Detection cycle scheduling
    pub detection: DetectionConfig,

    /// Spoken guidance behavior
    pub guidance: GuidanceConfig,
}

/// Per-device-profile capture thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileThresholds {
    /// Ideal face width as percent of frame width
    pub target_face_width_percent: f64,

    /// Below this percent the user is told to move closer
    pub min_face_width_percent: f64,

    /// Above this percent the user is told to move back
    pub max_face_width_percent: f64,

    /// Minimum normalized lid separation for an eye to count as open
    pub eye_open_threshold: f64,
}

/// Capture validation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum absolute head roll in degrees
    pub max_head_tilt_deg: f64,

    /// Maximum absolute head yaw proxy in degrees
    pub max_head_rotation_deg: f64,

    /// Acceptable mean brightness band (0-255)
    pub min_brightness: f64,
    pub max_brightness: f64,

    /// Minimum sample contrast (0-1)
    pub min_contrast: f64,

    /// Guide oval center in normalized image space
    pub oval_center_x: f64,
    pub oval_center_y: f64,

    /// Face-center offset tolerance from the oval center
    pub max_face_offset_x: f64,
    pub max_face_offset_y: f64,

    /// Mobile-profile distance band and eye threshold
    pub mobile: ProfileThresholds,

    /// Desktop-profile distance band and eye threshold
    pub desktop: ProfileThresholds,
}

impl ValidationConfig {
    /// Threshold set for a device profile
    #[must_use]
    pub fn thresholds(&self, profile: DeviceProfile) -> &ProfileThresholds {
        match profile {
            DeviceProfile::Mobile => &self.mobile,
            DeviceProfile::Desktop => &self.desktop,
        }
    }
}

/// Frame transform tuning
///
/// The rotation snap (3°) and the asymmetric fit band (-3 mm / +5 mm) are
/// empirically chosen values carried over from field use; they are exposed
/// here rather than re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformTuning {
    /// Roll angles under this many degrees render as level
    pub rotation_snap_deg: f64,

    /// width - face diff at or below this reads as tight
    pub tight_below_mm: f64,

    /// width - face diff at or above this reads as loose
    pub loose_above_mm: f64,

    /// Width (px) the full-size overlay assets are authored against
    pub reference_asset_width_px: f64,

    /// Vertical drop (mm) from the bridge before the half-lens-height term
    pub bridge_drop_mm: f64,

    /// Width (px) the product-page preview assets are authored against
    pub preview_asset_width_px: f64,

    /// Preview overlay scale clamp
    pub preview_min_scale: f64,
    pub preview_max_scale: f64,
}

/// Calibration defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementConfig {
    /// Population-average face width used when the remote service is unavailable
    pub assumed_face_width_mm: f64,
}

/// Candidate frame selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// |frame width - face width| within this many mm counts as a best match
    pub best_match_tolerance_mm: f64,

    /// Candidate window keeps frames in [face, face + window] mm
    pub candidate_window_mm: f64,

    /// Face width assumed by the window filter before any measurement exists
    pub fallback_face_width_mm: f64,
}

/// Detection cycle scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum gap between detector invocations in milliseconds
    pub min_interval_ms: u64,

    /// Weight of the previous value in the face-width percent moving average
    pub face_width_smoothing_weight: f64,
}

/// Spoken guidance behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceConfig {
    /// Master switch for the guidance sink
    pub enabled: bool,

    /// Identical phrases are not repeated within this window (ms)
    pub debounce_ms: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_head_tilt_deg: 10.0,
            max_head_rotation_deg: 15.0,
            min_brightness: 80.0,
            max_brightness: 220.0,
            min_contrast: 0.3,
            oval_center_x: 0.5,
            oval_center_y: 0.45,
            max_face_offset_x: 0.12,
            max_face_offset_y: 0.15,
            mobile: ProfileThresholds {
                target_face_width_percent: 30.0,
                min_face_width_percent: 25.0,
                max_face_width_percent: 45.0,
                eye_open_threshold: 0.005,
            },
            desktop: ProfileThresholds {
                target_face_width_percent: 21.0,
                min_face_width_percent: 18.0,
                max_face_width_percent: 24.0,
                eye_open_threshold: 0.01,
            },
        }
    }
}

impl Default for TransformTuning {
    fn default() -> Self {
        Self {
            rotation_snap_deg: ROTATION_SNAP_DEG,
            tight_below_mm: FIT_TIGHT_BELOW_MM,
            loose_above_mm: FIT_LOOSE_ABOVE_MM,
            reference_asset_width_px: FRAME_ASSET_BASE_WIDTH_PX,
            bridge_drop_mm: BRIDGE_DROP_MM,
            preview_asset_width_px: PREVIEW_ASSET_BASE_WIDTH_PX,
            preview_min_scale: PREVIEW_MIN_SCALE,
            preview_max_scale: PREVIEW_MAX_SCALE,
        }
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            assumed_face_width_mm: AVERAGE_FACE_WIDTH_MM,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            best_match_tolerance_mm: BEST_MATCH_TOLERANCE_MM,
            candidate_window_mm: CANDIDATE_WINDOW_MM,
            fallback_face_width_mm: FALLBACK_FACE_WIDTH_MM,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DETECTION_INTERVAL_MS,
            face_width_smoothing_weight: FACE_WIDTH_SMOOTHING_WEIGHT,
        }
    }
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: GUIDANCE_DEBOUNCE_MS,
        }
    }
}

impl FitConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first constraint violation found.
    pub fn validate(&self) -> Result<()> {
        let v = &self.validation;
        if v.max_head_tilt_deg <= 0.0 || v.max_head_rotation_deg <= 0.0 {
            return Err(Error::Config(
                "Head tilt/rotation limits must be positive".to_string(),
            ));
        }
        if !(0.0..=255.0).contains(&v.min_brightness)
            || !(0.0..=255.0).contains(&v.max_brightness)
            || v.min_brightness >= v.max_brightness
        {
            return Err(Error::Config(
                "Brightness band must be an increasing range within 0-255".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&v.min_contrast) {
            return Err(Error::Config(
                "Minimum contrast must be between 0.0 and 1.0".to_string(),
            ));
        }
        for (name, t) in [("mobile", &v.mobile), ("desktop", &v.desktop)] {
            if t.min_face_width_percent <= 0.0
                || t.min_face_width_percent >= t.max_face_width_percent
            {
                return Err(Error::Config(format!(
                    "{name} distance band must be an increasing positive range"
                )));
            }
            if t.eye_open_threshold <= 0.0 {
                return Err(Error::Config(format!(
                    "{name} eye-open threshold must be positive"
                )));
            }
        }

        let t = &self.transform;
        if t.rotation_snap_deg < 0.0 {
            return Err(Error::Config(
                "Rotation snap must be non-negative".to_string(),
            ));
        }
        if t.tight_below_mm >= t.loose_above_mm {
            return Err(Error::Config(
                "Tight bound must be below the loose bound".to_string(),
            ));
        }
        if t.reference_asset_width_px <= 0.0 || t.preview_asset_width_px <= 0.0 {
            return Err(Error::Config(
                "Asset reference widths must be positive".to_string(),
            ));
        }
        if t.preview_min_scale <= 0.0 || t.preview_min_scale >= t.preview_max_scale {
            return Err(Error::Config(
                "Preview scale clamp must be an increasing positive range".to_string(),
            ));
        }

        if self.measurement.assumed_face_width_mm <= 0.0 {
            return Err(Error::Config(
                "Assumed face width must be positive".to_string(),
            ));
        }
        if self.selection.best_match_tolerance_mm < 0.0
            || self.selection.candidate_window_mm < 0.0
            || self.selection.fallback_face_width_mm <= 0.0
        {
            return Err(Error::Config(
                "Selection tolerances must be non-negative and the fallback width positive"
                    .to_string(),
            ));
        }
        if self.detection.min_interval_ms == 0 {
            return Err(Error::Config(
                "Detection interval must be greater than 0".to_string(),
            ));
        }
        let w = self.detection.face_width_smoothing_weight;
        if w <= 0.0 || w >= 1.0 {
            return Err(Error::Config(
                "Smoothing weight must be strictly between 0 and 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Framefit Configuration

profile: desktop

# Capture validation thresholds
validation:
  max_head_tilt_deg: 10.0
  max_head_rotation_deg: 15.0
  min_brightness: 80.0
  max_brightness: 220.0
  min_contrast: 0.3
  oval_center_x: 0.5
  oval_center_y: 0.45
  max_face_offset_x: 0.12
  max_face_offset_y: 0.15
  mobile:
    target_face_width_percent: 30.0
    min_face_width_percent: 25.0
    max_face_width_percent: 45.0
    eye_open_threshold: 0.005
  desktop:
    target_face_width_percent: 21.0
    min_face_width_percent: 18.0
    max_face_width_percent: 24.0
    eye_open_threshold: 0.01

# Frame transform tuning
transform:
  rotation_snap_deg: 3.0
  tight_below_mm: -3.0
  loose_above_mm: 5.0
  reference_asset_width_px: 400.0
  bridge_drop_mm: 4.0
  preview_asset_width_px: 340.0
  preview_min_scale: 0.26
  preview_max_scale: 0.62

# Calibration
measurement:
  assumed_face_width_mm: 140.0

# Candidate selection
selection:
  best_match_tolerance_mm: 8.0
  candidate_window_mm: 15.0
  fallback_face_width_mm: 130.0

# Detection cycle
detection:
  min_interval_ms: 100
  face_width_smoothing_weight: 0.8

# Spoken guidance
guidance:
  enabled: true
  debounce_ms: 2000
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FitConfig::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let parsed: FitConfig = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.transform.rotation_snap_deg, 3.0);
        assert_eq!(parsed.validation.desktop.min_face_width_percent, 18.0);
    }

    #[test]
    fn test_inverted_fit_band_rejected() {
        let mut config = FitConfig::default();
        config.transform.tight_below_mm = 6.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = FitConfig::default();
        config.detection.min_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_profile_thresholds_lookup() {
        let config = ValidationConfig::default();
        assert_eq!(
            config.thresholds(DeviceProfile::Mobile).max_face_width_percent,
            45.0
        );
        assert_eq!(
            config.thresholds(DeviceProfile::Desktop).max_face_width_percent,
            24.0
        );
    }
}
