//! Interactive adjustment controller.
//!
//! Two kinds of drag target, never active at the same time: the eye markers
//! (recalibrating PD on release) and the frame overlay (accumulating offset
//! deltas against the position captured at drag start, so rapid re-renders
//! cannot make the overlay drift).

use crate::geometry::{DisplayRect, Point2, Size};
use crate::landmarks::FaceLandmarks;
use crate::measurement::FaceMeasurements;
use log::debug;
use serde::{Deserialize, Serialize};

/// User-controlled fine-tune values composed on top of the computed transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentValues {
    /// Horizontal offset in container pixels (positive = right)
    pub offset_x: f64,
    /// Vertical offset in container pixels (positive = down)
    pub offset_y: f64,
    /// Scale multiplier (1.0 = no change)
    pub scale_adjust: f64,
    /// Rotation adjustment in degrees
    pub rotation_adjust: f64,
}

impl Default for AdjustmentValues {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale_adjust: 1.0,
            rotation_adjust: 0.0,
        }
    }
}

/// Which eye marker a drag targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeSide {
    Left,
    Right,
}

/// Active drag target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    LeftEye,
    RightEye,
    Frame,
}

#[derive(Debug, Clone, Copy)]
struct FrameDragStart {
    pointer: Point2,
    offset_x: f64,
    offset_y: f64,
}

/// What a pointer release concluded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// No drag was active
    None,
    /// A frame drag ended; offsets stay as accumulated
    FrameReleased,
    /// An eye drag ended and PD was recalibrated to this value (mm)
    PdRecalibrated(f64),
    /// An eye drag ended but there was no capture to recalibrate against
    EyeReleased,
}

/// Pointer-driven adjustment of eye markers and frame placement.
pub struct AdjustmentController {
    container: Size,
    adjustments: AdjustmentValues,
    left_eye: Point2,
    right_eye: Point2,
    dragging: Option<DragTarget>,
    frame_drag_start: Option<FrameDragStart>,
}

impl AdjustmentController {
    #[must_use]
    pub fn new(container: Size) -> Self {
        Self {
            container,
            adjustments: AdjustmentValues::default(),
            left_eye: Point2::default(),
            right_eye: Point2::default(),
            dragging: None,
            frame_drag_start: None,
        }
    }

    #[must_use]
    pub fn adjustments(&self) -> AdjustmentValues {
        self.adjustments
    }

    /// Replace the adjustment values wholesale, e.g. when a frame is selected
    pub fn set_adjustments(&mut self, values: AdjustmentValues) {
        self.adjustments = values;
    }

    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }

    pub fn set_container(&mut self, container: Size) {
        self.container = container;
    }

    /// Current eye marker positions in container pixels (left, right)
    #[must_use]
    pub fn eye_markers(&self) -> (Point2, Point2) {
        (self.left_eye, self.right_eye)
    }

    #[must_use]
    pub fn dragging(&self) -> Option<DragTarget> {
        self.dragging
    }

    /// Place the markers on the detected pupils via the displayed-image mapping
    pub fn place_eye_markers(
        &mut self,
        landmarks: &FaceLandmarks,
        rect: &DisplayRect,
        natural: Size,
    ) {
        self.left_eye = rect.map_normalized(landmarks.left_eye, natural);
        self.right_eye = rect.map_normalized(landmarks.right_eye, natural);
    }

    /// Start dragging an eye marker. Ignored while another drag is active.
    pub fn begin_eye_drag(&mut self, eye: EyeSide) {
        if self.dragging.is_some() {
            debug!("ignoring eye drag start while another drag is active");
            return;
        }
        self.dragging = Some(match eye {
            EyeSide::Left => DragTarget::LeftEye,
            EyeSide::Right => DragTarget::RightEye,
        });
    }

    /// Start dragging the frame overlay. The pointer position and the offsets
    /// at this instant become the reference all movement deltas add onto.
    pub fn begin_frame_drag(&mut self, pointer: Point2) {
        if self.dragging.is_some() {
            debug!("ignoring frame drag start while another drag is active");
            return;
        }
        self.frame_drag_start = Some(FrameDragStart {
            pointer,
            offset_x: self.adjustments.offset_x,
            offset_y: self.adjustments.offset_y,
        });
        self.dragging = Some(DragTarget::Frame);
    }

    /// Track pointer movement for whichever drag is active
    pub fn pointer_moved(&mut self, pointer: Point2) {
        match self.dragging {
            Some(DragTarget::Frame) => {
                let Some(start) = self.frame_drag_start else {
                    return;
                };
                self.adjustments.offset_x = start.offset_x + (pointer.x - start.pointer.x);
                self.adjustments.offset_y = start.offset_y + (pointer.y - start.pointer.y);
            }
            Some(DragTarget::LeftEye | DragTarget::RightEye) => {
                let clamped = Point2::new(
                    pointer.x.clamp(0.0, self.container.width),
                    pointer.y.clamp(0.0, self.container.height),
                );
                if self.dragging == Some(DragTarget::LeftEye) {
                    self.left_eye = clamped;
                } else {
                    self.right_eye = clamped;
                }
            }
            None => {}
        }
    }

    /// End the active drag.
    ///
    /// Releasing an eye marker recalibrates PD against the initially detected
    /// eye distance: the capture's landmarks anchor the mm-per-pixel ratio,
    /// so a user can correct detector error without a re-measurement call.
    pub fn release(
        &mut self,
        capture: Option<(&FaceLandmarks, &mut FaceMeasurements)>,
    ) -> DragOutcome {
        let outcome = match self.dragging {
            None => DragOutcome::None,
            Some(DragTarget::Frame) => {
                self.frame_drag_start = None;
                DragOutcome::FrameReleased
            }
            Some(DragTarget::LeftEye | DragTarget::RightEye) => match capture {
                Some((landmarks, measurements)) => {
                    let new_pd = self.recalibrated_pd(landmarks, measurements.pd);
                    measurements.set_pd(new_pd);
                    DragOutcome::PdRecalibrated(new_pd)
                }
                None => DragOutcome::EyeReleased,
            },
        };
        self.dragging = None;
        outcome
    }

    /// Drop any active drag without committing, e.g. on teardown. A stale
    /// start reference would corrupt the next drag.
    pub fn cancel_drag(&mut self) {
        self.dragging = None;
        self.frame_drag_start = None;
    }

    /// Restore the selected frame's stored default offsets (or the zero
    /// default when it has none). Idempotent; available at any time.
    pub fn reset(&mut self, default_offsets: Option<AdjustmentValues>) {
        self.adjustments = default_offsets.unwrap_or_default();
    }

    fn recalibrated_pd(&self, landmarks: &FaceLandmarks, original_pd_mm: f64) -> f64 {
        let new_distance = self.left_eye.distance(&self.right_eye);

        let dx = (landmarks.right_eye.x - landmarks.left_eye.x) * self.container.width;
        let dy = (landmarks.right_eye.y - landmarks.left_eye.y) * self.container.height;
        let initial_distance = (dx * dx + dy * dy).sqrt();
        let safe_initial = if initial_distance > 0.0 {
            initial_distance
        } else {
            1.0
        };

        let mm_per_px = original_pd_mm / safe_initial;
        new_distance * mm_per_px
    }
}
