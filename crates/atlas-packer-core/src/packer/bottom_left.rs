use std::collections::BTreeSet;

use tracing::{debug, instrument, trace};

use super::{Extent, PlacementAlgorithm, prepare};
use crate::error::Result;
use crate::model::{Frame, PackingResult, Point, Rect};
use crate::progress::{CancelToken, ProgressCallback, ProgressReporter};
use crate::sort::{HeightWidthDescending, ImageSorter};

/// Bottom-Left heuristic: each rectangle goes to the first candidate point (in
/// `y`, then `x` order) where it fits, then slides up and left as far as the
/// already placed rectangles allow.
///
/// Collision tests are linear in the number of placed rectangles, so a full
/// run is quadratic.
// TODO: replace the linear collision scan with a sweep-line over placed edges.
pub struct BottomLeftPlacement {
    sorter: Box<dyn ImageSorter>,
    progress: ProgressReporter,
}

impl BottomLeftPlacement {
    pub fn new() -> Self {
        Self::with_sorter(Box::new(HeightWidthDescending))
    }

    pub fn with_sorter(sorter: Box<dyn ImageSorter>) -> Self {
        Self {
            sorter,
            progress: ProgressReporter::new("bottom-left"),
        }
    }
}

impl Default for BottomLeftPlacement {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> PlacementAlgorithm<K> for BottomLeftPlacement {
    fn name(&self) -> &'static str {
        self.progress.source()
    }

    #[instrument(skip_all, fields(width = width, height = height, count = frames.len()))]
    fn place(
        &mut self,
        width: i32,
        height: i32,
        frames: &[Frame<K>],
        cancel: &CancelToken,
    ) -> Result<Option<PackingResult<K>>> {
        let prepared = prepare(&mut self.progress, self.sorter.as_ref(), width, height, frames)?;
        let total = prepared.placeable.len();

        let mut points: BTreeSet<Point> = BTreeSet::from([Point::new(0, 0)]);
        let mut packing = Packing::default();
        let mut extent = Extent::default();
        let mut placed: Vec<Frame<K>> = Vec::with_capacity(frames.len());

        for frame in prepared.placeable {
            if cancel.is_cancelled() {
                debug!(placed = placed.len(), total, "bottom-left cancelled");
                self.progress.reset();
                return Ok(None);
            }
            let (w, h) = (frame.width(), frame.height());
            let found = points.iter().find_map(|p| {
                let r = Rect::checked_new(p.x, p.y, w, h)?;
                (r.fits_in(width, height) && !packing.collides(&r)).then_some((*p, r))
            });
            let Some((anchor, rect)) = found else {
                debug!(w, h, placed = placed.len(), "no candidate point admits rectangle");
                return Ok(None);
            };

            let rect = packing.slide(rect);
            trace!(?anchor, ?rect, "placed");
            points.remove(&anchor);
            points.insert(Point::new(rect.right, rect.top));
            points.insert(Point::new(rect.left, rect.bottom));
            packing.insert(rect);
            extent.include(&rect);
            placed.push(Frame::new(frame.key, rect));
            self.progress.report_fraction(placed.len(), total);
        }

        placed.extend(prepared.degenerate);
        Ok(Some(PackingResult::new(extent.width, extent.height, placed)))
    }

    fn progress(&self) -> u8 {
        self.progress.get()
    }

    fn on_progress(&mut self, callback: ProgressCallback) {
        self.progress.subscribe(callback);
    }
}

/// Placed rectangles kept sorted by `(left, top)`, so scans can stop at the
/// first rectangle starting right of the probe.
#[derive(Debug, Default)]
struct Packing {
    rects: Vec<Rect>,
}

impl Packing {
    fn insert(&mut self, r: Rect) {
        let at = self
            .rects
            .partition_point(|p| (p.left, p.top) < (r.left, r.top));
        self.rects.insert(at, r);
    }

    fn candidates(&self, right: i32) -> impl Iterator<Item = &Rect> + '_ {
        self.rects.iter().take_while(move |p| p.left < right)
    }

    fn collides(&self, r: &Rect) -> bool {
        self.candidates(r.right).any(|p| p.intersects(r))
    }

    /// Moves `r` up until it touches a rectangle above it or the top edge.
    fn slide_up(&self, r: &Rect) -> Option<Rect> {
        let top = self
            .candidates(r.right)
            .filter(|p| p.right > r.left && p.bottom <= r.top)
            .map(|p| p.bottom)
            .max()
            .unwrap_or(0);
        (top < r.top).then(|| r.moved_to(r.left, top))
    }

    /// Moves `r` left until it touches a rectangle on its left or the left edge.
    fn slide_left(&self, r: &Rect) -> Option<Rect> {
        let left = self
            .candidates(r.right)
            .filter(|p| p.top < r.bottom && p.bottom > r.top && p.right <= r.left)
            .map(|p| p.right)
            .max()
            .unwrap_or(0);
        (left < r.left).then(|| r.moved_to(left, r.top))
    }

    /// Alternates up/left slides until neither direction moves the rectangle.
    fn slide(&self, mut rect: Rect) -> Rect {
        let mut up = true;
        let mut stalled = 0;
        while stalled < 2 {
            let moved = if up {
                self.slide_up(&rect)
            } else {
                self.slide_left(&rect)
            };
            match moved {
                Some(r) => {
                    rect = r;
                    stalled = 0;
                }
                None => stalled += 1,
            }
            up = !up;
        }
        rect
    }
}
