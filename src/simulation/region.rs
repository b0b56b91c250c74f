//! Axis-aligned rectangles covered by quadtree nodes.

use crate::simulation::states::{Body, NVec2};

/// Rectangle anchored at its top-left corner `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Region covering the whole world, `[0, width] x [0, height]`.
    pub fn world(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }

    pub fn center(&self) -> NVec2 {
        NVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True if the body's disk touches this rectangle.
    pub fn contains(&self, body: &Body) -> bool {
        overlaps(self, body.x, body.radius())
    }

    /// Split into four quadrants using floor division of the sides.
    ///
    /// Order is top-left, top-right, bottom-left, bottom-right. With an odd
    /// side the quadrants do not reach the far edge: an 801 wide region
    /// yields quadrants covering `[0, 800)` only.
    pub fn quarter(&self) -> [BoundingRegion; 4] {
        let w2 = (self.width / 2.0).floor();
        let h2 = (self.height / 2.0).floor();
        [
            BoundingRegion::new(self.x, self.y, w2, h2),
            BoundingRegion::new(self.x + w2, self.y, w2, h2),
            BoundingRegion::new(self.x, self.y + h2, w2, h2),
            BoundingRegion::new(self.x + w2, self.y + h2, w2, h2),
        ]
    }
}

/// Circle versus rectangle overlap test.
///
/// Over-approximating on purpose: a disk straddling the line between two
/// sibling regions is reported inside both, so no pair across a boundary is
/// ever lost by the broad phase. Edges count as inside.
pub fn overlaps(region: &BoundingRegion, center: NVec2, radius: f64) -> bool {
    let half_w = region.width / 2.0;
    let half_h = region.height / 2.0;
    let dx = (center.x - (region.x + half_w)).abs();
    let dy = (center.y - (region.y + half_h)).abs();

    if dx > half_w + radius || dy > half_h + radius {
        return false;
    }
    if dx <= half_w || dy <= half_h {
        return true;
    }

    let corner_x = dx - half_w;
    let corner_y = dy - half_h;
    corner_x * corner_x + corner_y * corner_y <= radius * radius
}
