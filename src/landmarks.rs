//! Landmark source adapter: fixed named landmarks from a raw face-mesh result.
//!
//! Detector backends return faces as ordered lists of normalized 3-D points
//! (face-mesh layout with refined iris points). The adapter picks out the
//! fixed indices this engine cares about; everything downstream works on the
//! named set only.

use crate::geometry::Point3;
use crate::{Error, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Face-mesh point indices for the named landmark set.
///
/// Indices 468/473 are the refined iris centers; they are the pupil positions
/// used for lens alignment and require a mesh with iris refinement enabled.
pub mod mesh_index {
    pub const LEFT_IRIS: usize = 468;
    pub const RIGHT_IRIS: usize = 473;
    pub const NOSE_TIP: usize = 1;
    pub const LEFT_EAR: usize = 234;
    pub const RIGHT_EAR: usize = 454;
    pub const CHIN: usize = 152;
    pub const FOREHEAD: usize = 10;
    pub const LEFT_EYE_UPPER: usize = 159;
    pub const LEFT_EYE_LOWER: usize = 145;
    pub const RIGHT_EYE_UPPER: usize = 386;
    pub const RIGHT_EYE_LOWER: usize = 374;
    pub const FACE_LEFT: usize = 234;
    pub const FACE_RIGHT: usize = 454;
    pub const BRIDGE: usize = 168;
}

/// Named landmark set produced once per detection cycle.
///
/// Immutable snapshot; there is no cross-frame identity beyond "most recent".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    /// Left iris center (pupil)
    pub left_eye: Point3,
    /// Right iris center (pupil)
    pub right_eye: Point3,
    pub nose_tip: Point3,
    pub left_ear: Point3,
    pub right_ear: Point3,
    pub chin: Point3,
    pub forehead: Point3,
    pub left_eye_upper: Point3,
    pub left_eye_lower: Point3,
    pub right_eye_upper: Point3,
    pub right_eye_lower: Point3,
    pub face_left: Point3,
    pub face_right: Point3,
    /// Nose-bridge point; absent in sessions recorded by older detectors
    #[serde(default)]
    pub bridge: Option<Point3>,
}

impl FaceLandmarks {
    /// Extract the named set from a raw mesh.
    ///
    /// # Errors
    ///
    /// Returns an error when the mesh is too short to contain the refined
    /// iris points.
    pub fn from_mesh(mesh: &[Point3]) -> Result<Self> {
        if mesh.len() <= mesh_index::RIGHT_IRIS {
            return Err(Error::Detector(format!(
                "mesh has {} points, need at least {} (iris refinement)",
                mesh.len(),
                mesh_index::RIGHT_IRIS + 1
            )));
        }
        Ok(Self {
            left_eye: mesh[mesh_index::LEFT_IRIS],
            right_eye: mesh[mesh_index::RIGHT_IRIS],
            nose_tip: mesh[mesh_index::NOSE_TIP],
            left_ear: mesh[mesh_index::LEFT_EAR],
            right_ear: mesh[mesh_index::RIGHT_EAR],
            chin: mesh[mesh_index::CHIN],
            forehead: mesh[mesh_index::FOREHEAD],
            left_eye_upper: mesh[mesh_index::LEFT_EYE_UPPER],
            left_eye_lower: mesh[mesh_index::LEFT_EYE_LOWER],
            right_eye_upper: mesh[mesh_index::RIGHT_EYE_UPPER],
            right_eye_lower: mesh[mesh_index::RIGHT_EYE_LOWER],
            face_left: mesh[mesh_index::FACE_LEFT],
            face_right: mesh[mesh_index::FACE_RIGHT],
            bridge: mesh.get(mesh_index::BRIDGE).copied(),
        })
    }

    /// Midpoint of the two pupils, the fallback anchor when no bridge point exists
    #[must_use]
    pub fn eye_midpoint(&self) -> Point3 {
        Point3::new(
            (self.left_eye.x + self.right_eye.x) / 2.0,
            (self.left_eye.y + self.right_eye.y) / 2.0,
            (self.left_eye.z + self.right_eye.z) / 2.0,
        )
    }

    /// Bridge point when present, eye midpoint otherwise
    #[must_use]
    pub fn bridge_or_midpoint(&self) -> Point3 {
        self.bridge.unwrap_or_else(|| self.eye_midpoint())
    }
}

/// Black-box face-mesh detector.
///
/// One implementation per available backend (on-device model, remote API),
/// selected at startup. Returns zero or more faces; zero faces is a normal
/// outcome, more than one makes the capture ambiguous and fails validation.
pub trait LandmarkDetector {
    /// Detect faces in an image, each as an ordered normalized point list
    ///
    /// # Errors
    ///
    /// Returns an error when the backend itself fails; the pipeline degrades
    /// this to a "no face" cycle rather than aborting.
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Vec<Point3>>>;
}
