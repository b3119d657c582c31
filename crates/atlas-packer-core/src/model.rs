use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Axis-aligned rectangle with exclusive `right`/`bottom` edges.
///
/// `y` grows downwards: `top` is the smaller coordinate. A rectangle with
/// `right == left` or `bottom == top` is degenerate (zero area).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Builds a rectangle from its top-left corner and size.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + w,
            bottom: y + h,
        }
    }
    /// Like [`Rect::new`], but `None` when an edge would overflow `i32`.
    pub fn checked_new(x: i32, y: i32, w: i32, h: i32) -> Option<Self> {
        Some(Self {
            left: x,
            top: y,
            right: x.checked_add(w)?,
            bottom: y.checked_add(h)?,
        })
    }
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
    /// A `w`x`h` rectangle anchored at the origin.
    pub fn sized(w: i32, h: i32) -> Self {
        Self::new(0, 0, w, h)
    }
    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }
    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
    #[inline]
    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }
    /// True when the rectangle covers no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
    /// Same size, moved so that the top-left corner sits at `(x, y)`.
    pub fn moved_to(&self, x: i32, y: i32) -> Self {
        Self::new(x, y, self.width(), self.height())
    }
    /// True if the interiors overlap; touching edges do not count.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.left >= other.right
            || other.left >= self.right
            || self.top >= other.bottom
            || other.top >= self.bottom)
    }
    /// Returns true if `r` is fully inside `self` (edges may coincide).
    #[inline]
    pub fn contains(&self, r: &Rect) -> bool {
        r.left >= self.left && r.top >= self.top && r.right <= self.right && r.bottom <= self.bottom
    }
    /// True if `self` fits inside a `w`x`h` box anchored at the origin.
    #[inline]
    pub fn fits_in(&self, w: i32, h: i32) -> bool {
        self.left >= 0 && self.top >= 0 && self.right <= w && self.bottom <= h
    }
}

/// Anchor point ordered by `y` first, then `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A rectangle together with the payload it stands for.
///
/// The engine never looks at `key`; it only carries it from input to output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Frame<K = String> {
    /// User-specified key (e.g., image identifier).
    pub key: K,
    pub rect: Rect,
}

impl<K> Frame<K> {
    pub fn new(key: K, rect: Rect) -> Self {
        Self { key, rect }
    }
    /// Input frame of size `w`x`h` at the origin.
    pub fn sized(key: K, w: i32, h: i32) -> Self {
        Self {
            key,
            rect: Rect::sized(w, h),
        }
    }
    pub fn width(&self) -> i32 {
        self.rect.width()
    }
    pub fn height(&self) -> i32 {
        self.rect.height()
    }
}

/// Output of a placement run: the achieved box and the placed frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackingResult<K = String> {
    pub width: i32,
    pub height: i32,
    pub frames: Vec<Frame<K>>,
}

impl<K> PackingResult<K> {
    pub fn new(width: i32, height: i32, frames: Vec<Frame<K>>) -> Self {
        Self {
            width,
            height,
            frames,
        }
    }

    pub fn empty(width: i32, height: i32) -> Self {
        Self::new(width, height, Vec::new())
    }

    /// Box area (`width * height`).
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Tight bounding box `(max right, max bottom)` of the placed frames.
    pub fn bounds(&self) -> (i32, i32) {
        self.frames.iter().fold((0, 0), |(w, h), f| {
            (w.max(f.rect.right), h.max(f.rect.bottom))
        })
    }

    /// Sum of placed frame areas.
    pub fn used_area(&self) -> i64 {
        self.frames.iter().map(|f| f.rect.area()).sum()
    }

    /// Occupancy ratio: used area / box area (0.0 to 1.0).
    pub fn occupancy(&self) -> f64 {
        let total = self.area();
        if total > 0 {
            self.used_area() as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Wasted space in pixels.
    pub fn wasted_area(&self) -> i64 {
        (self.area() - self.used_area()).max(0)
    }

    /// True if no two placed frames overlap.
    pub fn is_disjoint(&self) -> bool {
        for i in 0..self.frames.len() {
            for j in (i + 1)..self.frames.len() {
                if self.frames[i].rect.intersects(&self.frames[j].rect) {
                    return false;
                }
            }
        }
        true
    }

    /// True if every frame lies within `[0,width]x[0,height]`.
    pub fn fits_within(&self) -> bool {
        self.frames
            .iter()
            .all(|f| f.rect.fits_in(self.width, self.height))
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Box: {}x{}, Frames: {}, Occupancy: {:.2}%, Used Area: {} px², Wasted: {} px²",
            self.width,
            self.height,
            self.frames.len(),
            self.occupancy() * 100.0,
            self.used_area(),
            self.wasted_area(),
        )
    }
}
