//! Virtual try-on fitting engine for an eyewear storefront.
//!
//! Given a captured face image, per-face landmark positions, a physical
//! face-width measurement and a catalog frame's physical dimensions, this
//! crate computes where and how to render a 2-D frame overlay so it appears
//! life-sized and correctly positioned on the wearer's face.
//!
//! The pipeline is:
//! 1. A landmark detector backend produces a raw face mesh
//! 2. The capture validation engine gates when the image is trustworthy
//! 3. The calibration engine converts landmark distances into millimeters
//! 4. The frame transform engine places the overlay for the selected frame
//! 5. The adjustment controller composes the user's manual fine-tuning
//!
//! External collaborators (landmark detector, remote measurement service,
//! frame catalog, camera, voice output) are consumed through traits with one
//! implementation per backend, selected at startup.
//!
//! # Examples
//!
//! Computing an overlay placement from a known capture:
//!
//! ```
//! use framefit::config::TransformTuning;
//! use framefit::frame::default_frames;
//! use framefit::geometry::{Point3, Size};
//! use framefit::landmarks::{mesh_index, FaceLandmarks};
//! use framefit::transform::compute_transform;
//!
//! let mut mesh = vec![Point3::default(); 478];
//! mesh[mesh_index::LEFT_IRIS] = Point3::new(0.40, 0.45, 0.0);
//! mesh[mesh_index::RIGHT_IRIS] = Point3::new(0.60, 0.45, 0.0);
//! mesh[mesh_index::FACE_LEFT] = Point3::new(0.20, 0.50, 0.0);
//! mesh[mesh_index::FACE_RIGHT] = Point3::new(0.80, 0.50, 0.0);
//! mesh[mesh_index::BRIDGE] = Point3::new(0.50, 0.45, 0.0);
//! let landmarks = FaceLandmarks::from_mesh(&mesh).unwrap();
//!
//! let frame = default_frames().remove(0);
//! let transform = compute_transform(
//!     &frame,
//!     &landmarks,
//!     130.0,
//!     Size::new(400.0, 500.0),
//!     Size::new(800.0, 1000.0),
//!     &TransformTuning::default(),
//! )
//! .expect("well-formed capture");
//! println!("anchor ({:.0}, {:.0}) scale {:.2}", transform.mid_x, transform.mid_y, transform.scale_factor);
//! ```

/// Detection pipeline with throttling, stop token and camera states
pub mod app;

/// Interactive adjustment of eye markers and frame placement
pub mod adjustment;

/// Configuration management
pub mod config;

/// Constants used throughout the fitting engine
pub mod constants;

/// Error types and result handling
pub mod error;

/// Frame catalog entities and dimension parsing
pub mod frame;

/// Geometric primitives and display mappings
pub mod geometry;

/// Spoken guidance sink and prioritization
pub mod guidance;

/// Photometric sampling for the lighting check
pub mod image_quality;

/// Landmark source adapter over face-mesh detector backends
pub mod landmarks;

/// Calibration and PD measurement
pub mod measurement;

/// Capture session state and persistence
pub mod session;

/// Candidate frame selection
pub mod selector;

/// Exponential smoothing
pub mod smoothing;

/// Frame transform engine
pub mod transform;

/// Capture validation engine
pub mod validation;

pub use error::{Error, Result};
