//! Calibration and measurement engine.
//!
//! Converts normalized landmark distances into millimeters using a physical
//! face-width reference. The reference comes from the remote measurement
//! service when available and degrades to a population average otherwise;
//! which one was used is carried alongside the value so callers never mix
//! the two up silently.

use crate::constants::AVERAGE_FACE_WIDTH_MM;
use crate::landmarks::FaceLandmarks;
use crate::Result;
use image::RgbImage;
use log::warn;
use serde::{Deserialize, Serialize};

/// Pupillary-distance measurement derived from one landmark snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdMeasurement {
    /// Left pupil x in source pixels
    pub left_pupil_x: f64,
    /// Right pupil x in source pixels
    pub right_pupil_x: f64,
    pub pd_pixels: f64,
    /// PD rounded to whole millimeters
    pub pd_millimeters: f64,
    pub face_width_pixels: f64,
    pub mm_per_pixel: f64,
}

/// Derive PD from landmarks and a physical face-width reference.
///
/// Returns `None` when the face width in source pixels is not strictly
/// positive; the scale factor is undefined there and must not be computed.
#[must_use]
pub fn measure(
    landmarks: &FaceLandmarks,
    reference_face_width_mm: f64,
    source_width_px: f64,
) -> Option<PdMeasurement> {
    if source_width_px <= 0.0 || reference_face_width_mm <= 0.0 {
        return None;
    }

    let face_width_pixels =
        (landmarks.face_right.x - landmarks.face_left.x).abs() * source_width_px;
    if face_width_pixels <= 0.0 {
        return None;
    }

    let mm_per_pixel = reference_face_width_mm / face_width_pixels;
    let pd_pixels = (landmarks.right_eye.x - landmarks.left_eye.x).abs() * source_width_px;

    Some(PdMeasurement {
        left_pupil_x: landmarks.left_eye.x * source_width_px,
        right_pupil_x: landmarks.right_eye.x * source_width_px,
        pd_pixels,
        pd_millimeters: (pd_pixels * mm_per_pixel).round(),
        face_width_pixels,
        mm_per_pixel,
    })
}

/// Physical face measurements in millimeters, as the remote service reports them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMeasurements {
    pub pd: f64,
    pub pd_left: f64,
    pub pd_right: f64,
    pub nose_bridge_left: f64,
    pub nose_bridge_right: f64,
    pub face_width: f64,
    pub face_height: f64,
    pub face_ratio: f64,
}

impl FaceMeasurements {
    /// Overwrite the PD after a manual recalibration, splitting it evenly
    pub fn set_pd(&mut self, pd_mm: f64) {
        self.pd = pd_mm;
        self.pd_left = pd_mm / 2.0;
        self.pd_right = pd_mm / 2.0;
    }
}

/// Pixel scale metadata reported by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementScale {
    pub mm_per_pixel: f64,
    pub iris_diameter_px: f64,
}

/// Full remote measurement result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMeasurement {
    pub scale: MeasurementScale,
    pub mm: FaceMeasurements,
    pub face_shape: String,
}

/// Remote measurement service, consumed at its interface boundary.
pub trait MeasurementProvider {
    /// Measure physical face dimensions from a captured image
    ///
    /// # Errors
    ///
    /// Returns an error when the service is unreachable or rejects the image;
    /// callers degrade to [`ReferenceWidth::assumed`].
    fn measure_face(&mut self, image: &RgbImage) -> Result<RemoteMeasurement>;
}

/// A physical face-width reference and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceWidth {
    /// Millimeter-accurate value from the remote service
    Measured(f64),
    /// Population-average fallback
    Assumed(f64),
}

impl ReferenceWidth {
    /// The population-average fallback
    #[must_use]
    pub fn assumed() -> Self {
        Self::Assumed(AVERAGE_FACE_WIDTH_MM)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::Measured(v) | Self::Assumed(v) => v,
        }
    }

    #[must_use]
    pub fn is_measured(self) -> bool {
        matches!(self, Self::Measured(_))
    }
}

impl Default for ReferenceWidth {
    fn default() -> Self {
        Self::assumed()
    }
}

/// Ask the remote service for a face-width reference, degrading to the
/// assumed average on any failure so the pipeline stays usable.
pub fn resolve_reference_width(
    provider: &mut dyn MeasurementProvider,
    image: &RgbImage,
) -> ReferenceWidth {
    match provider.measure_face(image) {
        Ok(remote) if remote.mm.face_width > 0.0 => ReferenceWidth::Measured(remote.mm.face_width),
        Ok(remote) => {
            warn!(
                "measurement service returned non-positive face width {}, using assumed average",
                remote.mm.face_width
            );
            ReferenceWidth::assumed()
        }
        Err(e) => {
            warn!("measurement service failed: {e}, using assumed average");
            ReferenceWidth::assumed()
        }
    }
}
