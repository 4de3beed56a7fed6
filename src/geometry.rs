//! Geometric primitives and source-image-to-container mappings.

use serde::{Deserialize, Serialize};

/// A 2D point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A landmark point: x/y normalized to [0, 1] image space, z depth left uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// How a source image is fitted into a display container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    /// Uniform scale from source pixels to container pixels
    pub scale: f64,
    /// Left edge of the drawn image in container pixels (negative when cropped)
    pub offset_x: f64,
    /// Top edge of the drawn image in container pixels (negative when cropped)
    pub offset_y: f64,
}

impl DisplayRect {
    /// Cover mapping: scale the source to fill the container, cropping overflow.
    /// Returns `None` for degenerate sizes so callers never divide by zero.
    #[must_use]
    pub fn cover(container: Size, natural: Size) -> Option<Self> {
        if !container.is_positive() || !natural.is_positive() {
            return None;
        }
        let scale = (container.width / natural.width).max(container.height / natural.height);
        Some(Self::centered(container, natural, scale))
    }

    /// Contain mapping: fit the whole source inside the container, letterboxing the rest.
    #[must_use]
    pub fn contain(container: Size, natural: Size) -> Option<Self> {
        if !container.is_positive() || !natural.is_positive() {
            return None;
        }
        let scale = (container.width / natural.width).min(container.height / natural.height);
        Some(Self::centered(container, natural, scale))
    }

    fn centered(container: Size, natural: Size, scale: f64) -> Self {
        let drawn_width = natural.width * scale;
        let drawn_height = natural.height * scale;
        Self {
            scale,
            offset_x: (container.width - drawn_width) / 2.0,
            offset_y: (container.height - drawn_height) / 2.0,
        }
    }

    /// Map a normalized landmark into container pixels.
    #[must_use]
    pub fn map_normalized(&self, p: Point3, natural: Size) -> Point2 {
        Point2::new(
            p.x * natural.width * self.scale + self.offset_x,
            p.y * natural.height * self.scale + self.offset_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_mapping_centers_and_crops() {
        // Wide container, tall image: width governs, vertical overflow is cropped
        let rect = DisplayRect::cover(Size::new(400.0, 200.0), Size::new(100.0, 100.0)).unwrap();
        assert_eq!(rect.scale, 4.0);
        assert_eq!(rect.offset_x, 0.0);
        assert_eq!(rect.offset_y, -100.0);
    }

    #[test]
    fn test_cover_matches_container_aspect() {
        let rect = DisplayRect::cover(Size::new(400.0, 500.0), Size::new(800.0, 1000.0)).unwrap();
        assert_eq!(rect.scale, 0.5);
        assert_eq!(rect.offset_x, 0.0);
        assert_eq!(rect.offset_y, 0.0);
    }

    #[test]
    fn test_contain_letterboxes() {
        let rect = DisplayRect::contain(Size::new(400.0, 200.0), Size::new(100.0, 100.0)).unwrap();
        assert_eq!(rect.scale, 2.0);
        assert_eq!(rect.offset_x, 100.0);
        assert_eq!(rect.offset_y, 0.0);
    }

    #[test]
    fn test_degenerate_sizes_yield_none() {
        let good = Size::new(100.0, 100.0);
        for bad in [
            Size::new(0.0, 100.0),
            Size::new(100.0, 0.0),
            Size::new(-1.0, 100.0),
            Size::new(f64::NAN, 100.0),
        ] {
            assert!(DisplayRect::cover(bad, good).is_none());
            assert!(DisplayRect::cover(good, bad).is_none());
            assert!(DisplayRect::contain(bad, good).is_none());
        }
    }

    #[test]
    fn test_map_normalized() {
        let rect = DisplayRect::cover(Size::new(400.0, 500.0), Size::new(800.0, 1000.0)).unwrap();
        let p = rect.map_normalized(Point3::new(0.5, 0.45, 0.0), Size::new(800.0, 1000.0));
        assert_eq!(p.x, 200.0);
        assert_eq!(p.y, 225.0);
    }

    #[test]
    fn test_point_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
    }
}
