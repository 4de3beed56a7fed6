//! Photometric sampling of a capture frame for the lighting check.

use crate::constants::{DEFAULT_BRIGHTNESS, DEFAULT_CONTRAST, QUALITY_SAMPLE_SIZE};
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Brightness/contrast summary of a downsampled grayscale view of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySample {
    /// Mean gray level, 0-255
    pub brightness: f64,
    /// (max - min) / 255 over the sample, 0-1
    pub contrast: f64,
}

impl Default for QualitySample {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            contrast: DEFAULT_CONTRAST,
        }
    }
}

/// Analyze a capture frame. The image is downsampled to a small fixed square
/// first, so cost is independent of the camera resolution.
///
/// An empty image yields the neutral default sample rather than an error.
#[must_use]
pub fn analyze(image: &RgbImage) -> QualitySample {
    if image.width() == 0 || image.height() == 0 {
        return QualitySample::default();
    }

    let sample = imageops::resize(
        image,
        QUALITY_SAMPLE_SIZE,
        QUALITY_SAMPLE_SIZE,
        FilterType::Triangle,
    );

    let mut sum = 0.0;
    let mut min = 255.0_f64;
    let mut max = 0.0_f64;
    for pixel in sample.pixels() {
        let [r, g, b] = pixel.0;
        let gray = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0;
        sum += gray;
        min = min.min(gray);
        max = max.max(gray);
    }

    let count = f64::from(QUALITY_SAMPLE_SIZE * QUALITY_SAMPLE_SIZE);
    QualitySample {
        brightness: sum / count,
        contrast: (max - min) / 255.0,
    }
}
