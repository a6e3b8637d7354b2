//! Square regions and their four quadrants.
//!
//! A [`Bounds`] is stored by its minimum corner and side length. The `y` axis
//! grows "south", so the north quadrants are the ones with the smaller `y`:
//!
//! ```text
//!   (x, y) ---------- +
//!     |   NW   |  NE  |
//!     |--------+------|
//!     |   SW   |  SE  |
//!     + ------------- +
//! ```

use crate::simulation::states::NVec2;

/// Child slot of a node; the discriminant is the index into `children`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NW = 0,
    NE = 1,
    SW = 2,
    SE = 3,
}

/// Offset of each quadrant's corner from the parent corner, in half-widths
const QUADRANT_DIR: [[f64; 2]; 4] = [
    [0.0, 0.0], // NW
    [1.0, 0.0], // NE
    [0.0, 1.0], // SW
    [1.0, 1.0], // SE
];

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::NW, Quadrant::NE, Quadrant::SW, Quadrant::SE];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn direction(self) -> NVec2 {
        let [dx, dy] = QUADRANT_DIR[self.index()];
        NVec2::new(dx, dy)
    }
}

/// Axis-aligned square: minimum corner `(x, y)` and side `width`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64) -> Self {
        Self { x, y, width }
    }

    /// Square spanning `[-half_width, half_width]` on both axes
    pub fn centered(half_width: f64) -> Self {
        Self::new(-half_width, -half_width, 2.0 * half_width)
    }

    pub fn mid(&self) -> NVec2 {
        let half = 0.5 * self.width;
        NVec2::new(self.x + half, self.y + half)
    }

    /// Closed containment test
    pub fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.width
    }

    /// Bounds of one quadrant: half the side, offset by the direction table
    pub fn quadrant_bounds(&self, q: Quadrant) -> Bounds {
        let half = 0.5 * self.width;
        let dir = q.direction();
        Bounds::new(self.x + dir.x * half, self.y + dir.y * half, half)
    }
}

/// Quadrant of `bounds` containing `p`. Points on a midline go to the lower index.
pub fn determine_quadrant(bounds: &Bounds, p: &NVec2) -> Quadrant {
    let mid = bounds.mid();
    if p.y <= mid.y {
        if p.x <= mid.x { Quadrant::NW } else { Quadrant::NE }
    } else if p.x <= mid.x {
        Quadrant::SW
    } else {
        Quadrant::SE
    }
}
