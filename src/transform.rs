//! Frame transform engine.
//!
//! Maps a frame's physical dimensions and the calibrated landmarks into an
//! on-screen anchor, scale and rotation so the overlay renders life-sized on
//! the wearer's face. Everything here is recomputed from scratch every cycle;
//! user adjustments compose on top and are never baked into the base
//! transform, so recompute stays idempotent.

use crate::adjustment::AdjustmentValues;
use crate::config::TransformTuning;
use crate::frame::Frame;
use crate::geometry::{DisplayRect, Size};
use crate::landmarks::FaceLandmarks;

/// How a frame's physical width compares to the wearer's face width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitCategory {
    Tight,
    Perfect,
    Loose,
}

impl FitCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Tight => "Tight Fit",
            Self::Perfect => "Perfect Fit",
            Self::Loose => "Loose Fit",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Tight => "This frame may feel narrow on your face.",
            Self::Perfect => "This frame fits your face perfectly!",
            Self::Loose => "This frame has a relaxed, looser fit.",
        }
    }
}

/// Classify frame width against face width.
///
/// The band is asymmetric: frames narrower than the face feel tight faster
/// than frames wider than the face feel loose.
#[must_use]
pub fn classify_fit(frame_width_mm: f64, face_width_mm: f64, tuning: &TransformTuning) -> FitCategory {
    let diff = frame_width_mm - face_width_mm;
    if diff <= tuning.tight_below_mm {
        FitCategory::Tight
    } else if diff >= tuning.loose_above_mm {
        FitCategory::Loose
    } else {
        FitCategory::Perfect
    }
}

/// Computed overlay placement, in container pixels. Ephemeral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    /// Anchor point the overlay centers on
    pub mid_x: f64,
    pub mid_y: f64,
    /// Scale applied to the reference-width overlay asset
    pub scale_factor: f64,
    /// Head roll in radians (snapped to 0 near level)
    pub angle_rad: f64,
    pub fit: FitCategory,
    /// Eye-to-eye distance in container pixels used in the computation
    pub eye_distance_px: f64,
}

/// Final values to render with, after composing user adjustments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation_rad: f64,
}

impl FrameTransform {
    /// Compose the user's adjustment values onto the computed transform
    #[must_use]
    pub fn composed(&self, adjustments: &AdjustmentValues) -> RenderTransform {
        RenderTransform {
            x: self.mid_x + adjustments.offset_x,
            y: self.mid_y + adjustments.offset_y,
            scale: self.scale_factor * adjustments.scale_adjust,
            rotation_rad: self.angle_rad + adjustments.rotation_adjust.to_radians(),
        }
    }
}

/// Compute the overlay transform for a captured image shown in a cover-fitted
/// container.
///
/// Returns `None` when the container, the image or the face width is
/// degenerate; callers treat `None` as "do not render".
#[must_use]
pub fn compute_transform(
    frame: &Frame,
    landmarks: &FaceLandmarks,
    face_width_mm: f64,
    container: Size,
    natural: Size,
    tuning: &TransformTuning,
) -> Option<FrameTransform> {
    if face_width_mm <= 0.0 {
        return None;
    }
    let rect = DisplayRect::cover(container, natural)?;

    let left_eye = rect.map_normalized(landmarks.left_eye, natural);
    let right_eye = rect.map_normalized(landmarks.right_eye, natural);
    let bridge = rect.map_normalized(landmarks.bridge_or_midpoint(), natural);
    let face_left = rect.map_normalized(landmarks.face_left, natural);
    let face_right = rect.map_normalized(landmarks.face_right, natural);

    let face_width_px = (face_right.x - face_left.x).abs();
    if face_width_px <= 0.0 {
        return None;
    }

    let dx = right_eye.x - left_eye.x;
    let dy = right_eye.y - left_eye.y;
    let mut angle_rad = dy.atan2(dx);
    if angle_rad.to_degrees().abs() < tuning.rotation_snap_deg {
        angle_rad = 0.0;
    }
    let eye_distance_px = (dx * dx + dy * dy).sqrt();

    let mm_per_pixel = face_width_mm / face_width_px;
    let desired_frame_width_px = frame.width_mm / mm_per_pixel;
    let scale_factor = desired_frame_width_px / tuning.reference_asset_width_px;

    // Anchor under the bridge so the lens center lands on the eye line
    // regardless of frame height
    let vertical_offset_mm = tuning.bridge_drop_mm + frame.lens_height_mm / 2.0;
    let mid_x = bridge.x;
    let mid_y = bridge.y + vertical_offset_mm / mm_per_pixel;

    Some(FrameTransform {
        mid_x,
        mid_y,
        scale_factor,
        angle_rad,
        fit: classify_fit(frame.width_mm, face_width_mm, tuning),
        eye_distance_px,
    })
}

/// Product-page preview placement: position and clamped scale only
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// Compute the static product-page preview transform.
///
/// The preview shows the whole capture (contain mapping) and uses the smaller
/// preview asset set; its scale is clamped so a bad measurement can never
/// blow the overlay up over the page.
#[must_use]
pub fn compute_preview_transform(
    frame: &Frame,
    landmarks: &FaceLandmarks,
    face_width_mm: f64,
    container: Size,
    natural: Size,
    tuning: &TransformTuning,
) -> Option<PreviewTransform> {
    if face_width_mm <= 0.0 {
        return None;
    }
    let rect = DisplayRect::contain(container, natural)?;

    let left_eye = rect.map_normalized(landmarks.left_eye, natural);
    let right_eye = rect.map_normalized(landmarks.right_eye, natural);
    let bridge = rect.map_normalized(landmarks.bridge_or_midpoint(), natural);
    let face_left = rect.map_normalized(landmarks.face_left, natural);
    let face_right = rect.map_normalized(landmarks.face_right, natural);

    // Eye separation doubles as a lower bound when the edge landmarks clump
    let face_width_px = (face_right.x - face_left.x)
        .abs()
        .max((right_eye.x - left_eye.x).abs() * 2.0);
    if face_width_px <= 0.0 {
        return None;
    }

    let mm_per_pixel = face_width_mm / face_width_px;
    let desired_frame_width_px = frame.width_mm / mm_per_pixel;
    let scale = (desired_frame_width_px / tuning.preview_asset_width_px)
        .clamp(tuning.preview_min_scale, tuning.preview_max_scale);

    Some(PreviewTransform {
        x: bridge.x,
        y: bridge.y + tuning.bridge_drop_mm / mm_per_pixel,
        scale,
    })
}
