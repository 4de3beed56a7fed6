//! Capture session state and persistence.
//!
//! The session context owns everything that outlives a single detection
//! cycle: the accepted capture, the currently selected frame and its
//! adjustment values. It is passed explicitly through the pipeline rather
//! than living in ambient globals, so the core stays testable in isolation.

use crate::adjustment::{AdjustmentController, DragOutcome};
use crate::config::TransformTuning;
use crate::frame::Frame;
use crate::geometry::Size;
use crate::landmarks::FaceLandmarks;
use crate::measurement::FaceMeasurements;
use crate::transform::{self, FrameTransform, RenderTransform};
use crate::{Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// A validated capture: landmarks plus the physical measurements taken from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureData {
    pub landmarks: FaceLandmarks,
    pub measurements: FaceMeasurements,
    pub face_shape: String,
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl CaptureData {
    #[must_use]
    pub fn new(landmarks: FaceLandmarks, measurements: FaceMeasurements, face_shape: String) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self {
            landmarks,
            measurements,
            face_shape,
            timestamp_ms,
        }
    }
}

/// Save a capture session as JSON
///
/// # Errors
///
/// Returns an error when serialization or the write fails.
pub fn save_session<P: AsRef<Path>>(path: P, data: &CaptureData) -> Result<()> {
    let content = serde_json::to_string(data)
        .map_err(|e| Error::Session(format!("Failed to serialize session: {e}")))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Restore a capture session. Any failure (missing file, stale format) reads
/// as "no session" so a fresh capture can start.
#[must_use]
pub fn load_session<P: AsRef<Path>>(path: P) -> Option<CaptureData> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("discarding unreadable capture session: {e}");
            None
        }
    }
}

/// Delete a stored capture session, ignoring a missing file
pub fn clear_session<P: AsRef<Path>>(path: P) {
    let _ = std::fs::remove_file(path);
}

/// Per-session try-on state: the capture, the selected frame and the
/// adjustment controller. At most one frame is selected at any time and the
/// adjustments always belong to it; selecting another frame swaps the
/// adjustment values for that frame's stored defaults so no two frames' hand
/// tuning can ever mix.
pub struct TryOnSession {
    capture: Option<CaptureData>,
    selected_frame: Option<Frame>,
    controller: AdjustmentController,
}

impl TryOnSession {
    #[must_use]
    pub fn new(container: Size) -> Self {
        Self {
            capture: None,
            selected_frame: None,
            controller: AdjustmentController::new(container),
        }
    }

    #[must_use]
    pub fn capture(&self) -> Option<&CaptureData> {
        self.capture.as_ref()
    }

    pub fn set_capture(&mut self, capture: Option<CaptureData>) {
        self.capture = capture;
    }

    #[must_use]
    pub fn selected_frame(&self) -> Option<&Frame> {
        self.selected_frame.as_ref()
    }

    /// Select a frame (or none). The adjustment values are replaced by the
    /// frame's stored defaults.
    pub fn select_frame(&mut self, frame: Option<Frame>) {
        self.controller.cancel_drag();
        let offsets = frame.as_ref().map(|f| f.default_offsets);
        self.controller.reset(offsets);
        self.selected_frame = frame;
    }

    /// Restore the selected frame's stored default offsets
    pub fn reset_adjustments(&mut self) {
        let offsets = self.selected_frame.as_ref().map(|f| f.default_offsets);
        self.controller.reset(offsets);
    }

    #[must_use]
    pub fn controller(&self) -> &AdjustmentController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut AdjustmentController {
        &mut self.controller
    }

    /// End the active drag, recalibrating the capture's PD when an eye marker
    /// was released
    pub fn end_drag(&mut self) -> DragOutcome {
        match self.capture.as_mut() {
            Some(capture) => {
                let CaptureData {
                    landmarks,
                    measurements,
                    ..
                } = capture;
                self.controller.release(Some((&*landmarks, measurements)))
            }
            None => self.controller.release(None),
        }
    }

    /// Base overlay transform for the selected frame against the capture
    #[must_use]
    pub fn frame_transform(
        &self,
        container: Size,
        natural: Size,
        tuning: &TransformTuning,
    ) -> Option<FrameTransform> {
        let capture = self.capture.as_ref()?;
        let frame = self.selected_frame.as_ref()?;
        transform::compute_transform(
            frame,
            &capture.landmarks,
            capture.measurements.face_width,
            container,
            natural,
            tuning,
        )
    }

    /// Final render transform: the base transform with the user adjustments
    /// composed on top
    #[must_use]
    pub fn render_transform(
        &self,
        container: Size,
        natural: Size,
        tuning: &TransformTuning,
    ) -> Option<RenderTransform> {
        self.frame_transform(container, natural, tuning)
            .map(|t| t.composed(&self.controller.adjustments()))
    }
}
