//! Collision geometry for the runner
//!
//! Everything here is stateless: axis-aligned boxes, the narrowed-core
//! horizontal test used for obstacle hits, and center distance for the
//! magnet. Entities test inset "footprints" rather than full sprite bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle; `y` grows upward from the ground baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Footprint inset relative to sprite bounds (smaller than the sprite)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inset {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Inset {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Resolve the footprint for a sprite anchored at (x, y)
    pub fn at(&self, x: f32, y: f32) -> Rect {
        Rect::new(x + self.x, y + self.y, self.w, self.h)
    }
}

/// Strict axis-aligned overlap; touching edges do not count
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Horizontal overlap using only the central 20% of each span.
///
/// Obstacle hits deliberately test this narrow core instead of the full
/// widths, which gives the player generous clipping tolerance at the edges.
pub fn core_spans_overlap(ax: f32, aw: f32, bx: f32, bw: f32) -> bool {
    let a_left = ax + aw * 0.4;
    let a_right = ax + aw * 0.6;
    let b_left = bx + bw * 0.4;
    let b_right = bx + bw * 0.6;
    a_left < b_right && a_right > b_left
}

/// Distance between two rectangle centers
pub fn center_distance(a: &Rect, b: &Rect) -> f32 {
    a.center().distance(b.center())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rects_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(rects_overlap(&a, &b));

        // Fully separated
        let c = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert!(!rects_overlap(&a, &c));

        // Touching edges are not an overlap
        let d = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!rects_overlap(&a, &d));

        // Vertical separation with horizontal overlap
        let e = Rect::new(0.0, 15.0, 10.0, 10.0);
        assert!(!rects_overlap(&a, &e));
    }

    #[test]
    fn test_inset_footprint() {
        let inset = Inset::new(10.0, 5.0, 40.0, 30.0);
        let rect = inset.at(100.0, 60.0);
        assert_eq!(rect, Rect::new(110.0, 65.0, 40.0, 30.0));
    }

    #[test]
    fn test_core_spans_overlap() {
        // Two 60-wide spans at the same x: cores [24,36] overlap trivially
        assert!(core_spans_overlap(0.0, 60.0, 0.0, 60.0));

        // Edges overlapping but cores apart: span at 0..60 vs 50..110,
        // cores [24,36] vs [74,86]
        assert!(!core_spans_overlap(0.0, 60.0, 50.0, 60.0));

        // Cores just meeting: [24,36] vs [36,48] - strict, no overlap
        assert!(!core_spans_overlap(0.0, 60.0, 12.0, 60.0));
        assert!(core_spans_overlap(0.0, 60.0, 11.0, 60.0));
    }

    #[test]
    fn test_center_distance() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(30.0, 0.0, 10.0, 10.0);
        assert!((center_distance(&a, &b) - 30.0).abs() < 1e-6);
    }
}
