//! Capture validation engine.
//!
//! A pure projection of the current landmark set and photometric sample into
//! a pass/fail checklist. Every check is evaluated every cycle; nothing is
//! retried internally, re-evaluation happens naturally on the next cycle.
//! The only cross-cycle state is the face-width smoothing filter, which is
//! reset whenever no face is detected.

use crate::config::{DeviceProfile, FitConfig, ValidationConfig};
use crate::constants::ROTATION_PROXY_FACTOR;
use crate::geometry::Point3;
use crate::image_quality::QualitySample;
use crate::landmarks::FaceLandmarks;
use crate::smoothing::ExponentialSmoother;

/// Outcome weight of a validation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Pass,
    Warning,
    Fail,
}

/// One entry of the ordered capture checklist
#[derive(Debug, Clone)]
pub struct ValidationCheck {
    pub id: &'static str,
    pub label: &'static str,
    pub passed: bool,
    /// Human guidance, directional when the check fails
    pub message: String,
    pub severity: Severity,
}

impl ValidationCheck {
    fn new(id: &'static str, label: &'static str, passed: bool, message: impl Into<String>) -> Self {
        Self {
            id,
            label,
            passed,
            message: message.into(),
            severity: if passed { Severity::Pass } else { Severity::Fail },
        }
    }
}

/// Derived capture state, recomputed wholesale every detection cycle
#[derive(Debug, Clone)]
pub struct ValidationState {
    pub face_detected: bool,
    pub face_count: usize,
    /// Head roll in degrees, 0 is level
    pub head_tilt_deg: f64,
    /// Head yaw proxy in degrees, 0 is facing forward
    pub head_rotation_deg: f64,
    /// Smoothed face width as percent of frame width
    pub face_width_percent: f64,
    /// Mean sample brightness, 0-255
    pub brightness: f64,
    /// Sample contrast, 0-1
    pub contrast: f64,
    pub left_eye_open: bool,
    pub right_eye_open: bool,
    pub left_eye_aspect: f64,
    pub right_eye_aspect: f64,
    /// Iris points are plausible enough to place a lens on
    pub pupils_detected: bool,
    pub face_in_guide: bool,
    pub face_offset_x: f64,
    pub face_offset_y: f64,
    pub landmarks: Option<FaceLandmarks>,
    /// Ordered checklist; order is stable across cycles
    pub checks: Vec<ValidationCheck>,
    /// Logical AND of all checks
    pub all_checks_passed: bool,
}

/// Head roll: angle of the line through the two pupils, in degrees
#[must_use]
pub fn head_tilt_deg(landmarks: &FaceLandmarks) -> f64 {
    let delta_y = landmarks.right_eye.y - landmarks.left_eye.y;
    let delta_x = landmarks.right_eye.x - landmarks.left_eye.x;
    delta_y.atan2(delta_x).to_degrees()
}

/// Head yaw proxy: nose-tip offset from the face-edge midpoint, scaled to
/// approximate degrees. A degenerate edge span reads as facing forward; the
/// distance check fails that cycle anyway.
#[must_use]
pub fn head_rotation_deg(landmarks: &FaceLandmarks) -> f64 {
    let span = landmarks.face_right.x - landmarks.face_left.x;
    if span.abs() < f64::EPSILON {
        return 0.0;
    }
    let face_center = (landmarks.face_left.x + landmarks.face_right.x) / 2.0;
    (landmarks.nose_tip.x - face_center) / span * ROTATION_PROXY_FACTOR
}

/// Vertical lid separation in normalized units
#[must_use]
pub fn eye_aspect_ratio(upper: Point3, lower: Point3) -> f64 {
    (upper.y - lower.y).abs()
}

/// Whether the iris points are inside the frame with a plausible separation
#[must_use]
pub fn pupils_valid(landmarks: &FaceLandmarks) -> bool {
    let in_range = |v: f64| (0.02..=0.98).contains(&v);
    let left = landmarks.left_eye;
    let right = landmarks.right_eye;
    if !in_range(left.x) || !in_range(left.y) || !in_range(right.x) || !in_range(right.y) {
        return false;
    }
    let dx = right.x - left.x;
    let dy = right.y - left.y;
    let dist = (dx * dx + dy * dy).sqrt();
    (0.06..=0.6).contains(&dist)
}

fn face_width_percent_raw(landmarks: &FaceLandmarks) -> f64 {
    let raw = (landmarks.face_right.x - landmarks.face_left.x).abs() * 100.0;
    if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Capture validation engine, parameterized by device profile
pub struct CaptureValidator {
    config: ValidationConfig,
    profile: DeviceProfile,
    face_width_smoother: ExponentialSmoother,
}

impl CaptureValidator {
    #[must_use]
    pub fn new(config: &FitConfig) -> Self {
        Self {
            config: config.validation.clone(),
            profile: config.profile,
            face_width_smoother: ExponentialSmoother::new(
                config.detection.face_width_smoothing_weight,
            ),
        }
    }

    /// Forget smoothing history, e.g. when a capture session restarts
    pub fn reset(&mut self) {
        self.face_width_smoother.reset();
    }

    /// Evaluate one detection cycle.
    ///
    /// `landmarks` is the named set of the first detected face, if any;
    /// `face_count` is the total number of faces the detector reported.
    pub fn evaluate(
        &mut self,
        landmarks: Option<&FaceLandmarks>,
        face_count: usize,
        quality: QualitySample,
    ) -> ValidationState {
        let Some(lm) = landmarks else {
            // Stale smoothing must not bias the next capture
            self.face_width_smoother.reset();
            return self.build_state(None, face_count, quality, 0.0, 0.0, 0.0, 0.0, 0.0);
        };

        let tilt = head_tilt_deg(lm);
        let rotation = head_rotation_deg(lm);
        let smoothed_width = self.face_width_smoother.update(face_width_percent_raw(lm));
        let left_aspect = eye_aspect_ratio(lm.left_eye_upper, lm.left_eye_lower);
        let right_aspect = eye_aspect_ratio(lm.right_eye_upper, lm.right_eye_lower);

        self.build_state(
            Some(*lm),
            face_count,
            quality,
            tilt,
            rotation,
            smoothed_width,
            left_aspect,
            right_aspect,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build_state(
        &self,
        landmarks: Option<FaceLandmarks>,
        face_count: usize,
        quality: QualitySample,
        head_tilt_deg: f64,
        head_rotation_deg: f64,
        face_width_percent: f64,
        left_eye_aspect: f64,
        right_eye_aspect: f64,
    ) -> ValidationState {
        let face_detected = landmarks.is_some();
        let eye_threshold = self.config.thresholds(self.profile).eye_open_threshold;
        let left_eye_open = face_detected && left_eye_aspect > eye_threshold;
        let right_eye_open = face_detected && right_eye_aspect > eye_threshold;
        let pupils_detected = landmarks.as_ref().is_some_and(pupils_valid);

        let (face_in_guide, face_offset_x, face_offset_y) = match landmarks.as_ref() {
            Some(lm) => self.guide_offsets(lm),
            None => (false, 0.0, 0.0),
        };

        let checks = self.build_checks(
            face_detected,
            face_count,
            face_in_guide,
            face_offset_x,
            face_offset_y,
            face_width_percent,
            head_tilt_deg,
            head_rotation_deg,
            quality,
            left_eye_open,
            right_eye_open,
        );
        let all_checks_passed = checks.iter().all(|check| check.passed);

        ValidationState {
            face_detected,
            face_count,
            head_tilt_deg,
            head_rotation_deg,
            face_width_percent,
            brightness: quality.brightness,
            contrast: quality.contrast,
            left_eye_open,
            right_eye_open,
            left_eye_aspect,
            right_eye_aspect,
            pupils_detected,
            face_in_guide,
            face_offset_x,
            face_offset_y,
            landmarks,
            checks,
            all_checks_passed,
        }
    }

    /// Face center offset from the guide oval, and whether it is inside tolerance
    fn guide_offsets(&self, landmarks: &FaceLandmarks) -> (bool, f64, f64) {
        let face_center_x = (landmarks.face_left.x + landmarks.face_right.x) / 2.0;
        let face_center_y = (landmarks.forehead.y + landmarks.chin.y) / 2.0;
        let offset_x = face_center_x - self.config.oval_center_x;
        let offset_y = face_center_y - self.config.oval_center_y;
        let in_guide = offset_x.abs() <= self.config.max_face_offset_x
            && offset_y.abs() <= self.config.max_face_offset_y;
        (in_guide, offset_x, offset_y)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_checks(
        &self,
        face_detected: bool,
        face_count: usize,
        face_in_guide: bool,
        face_offset_x: f64,
        face_offset_y: f64,
        face_width_percent: f64,
        head_tilt_deg: f64,
        head_rotation_deg: f64,
        quality: QualitySample,
        left_eye_open: bool,
        right_eye_open: bool,
    ) -> Vec<ValidationCheck> {
        let v = &self.config;
        let t = v.thresholds(self.profile);
        let single_face = face_detected && face_count == 1;

        let face_message = if !face_detected {
            "No face detected"
        } else if face_count > 1 {
            "Multiple faces detected"
        } else {
            "Face detected"
        };

        let guide_message = if !face_detected {
            "Position face in oval"
        } else if face_in_guide {
            "Face centered"
        } else if face_offset_x > 0.05 {
            "Move left"
        } else if face_offset_x < -0.05 {
            "Move right"
        } else if face_offset_y > 0.05 {
            "Move up"
        } else {
            "Move down"
        };

        let distance_ok = face_width_percent >= t.min_face_width_percent
            && face_width_percent <= t.max_face_width_percent;
        let distance_message = if face_width_percent < t.min_face_width_percent {
            "Move closer to camera"
        } else if face_width_percent > t.max_face_width_percent {
            "Move back from camera"
        } else {
            "Perfect distance"
        };

        let tilt_ok = head_tilt_deg.abs() <= v.max_head_tilt_deg;
        let tilt_message = if tilt_ok {
            "Head is straight"
        } else if head_tilt_deg > 0.0 {
            "Tilt head left"
        } else {
            "Tilt head right"
        };

        let rotation_ok = head_rotation_deg.abs() <= v.max_head_rotation_deg;
        let rotation_message = if rotation_ok {
            "Facing forward"
        } else if head_rotation_deg > 0.0 {
            "Turn head left"
        } else {
            "Turn head right"
        };

        let lighting_ok = quality.brightness >= v.min_brightness
            && quality.brightness <= v.max_brightness
            && quality.contrast >= v.min_contrast;
        let lighting_message = if quality.brightness < v.min_brightness {
            "Too dark - add light"
        } else if quality.brightness > v.max_brightness {
            "Too bright"
        } else if quality.contrast < v.min_contrast {
            "Reduce shadows"
        } else {
            "Good lighting"
        };

        let eyes_ok = left_eye_open && right_eye_open;
        let eyes_message = if eyes_ok { "Eyes open" } else { "Keep eyes open" };

        vec![
            ValidationCheck::new("face-detected", "Face Detection", single_face, face_message),
            ValidationCheck::new("face-in-guide", "Face in Oval", face_in_guide, guide_message),
            ValidationCheck::new("distance", "Distance", distance_ok, distance_message),
            ValidationCheck::new("head-straight", "Head Position", tilt_ok, tilt_message),
            ValidationCheck::new("no-rotation", "Face Forward", rotation_ok, rotation_message),
            ValidationCheck::new("lighting", "Lighting", lighting_ok, lighting_message),
            ValidationCheck::new("eyes-open", "Eyes Visible", eyes_ok, eyes_message),
        ]
    }
}
