use tracing::{debug, instrument, trace};

use super::{PlacementAlgorithm, prepare};
use crate::error::Result;
use crate::model::{Frame, PackingResult, Rect};
use crate::progress::{CancelToken, ProgressCallback, ProgressReporter};
use crate::sort::{HeightWidthDescending, ImageSorter};

/// One horizontal run of the skyline: `[x, x + w)` is free from `y` downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkylineSegment {
    pub x: i32,
    pub y: i32,
    pub w: i32,
}

impl SkylineSegment {
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }
}

/// Lower envelope of the occupied area across the box width.
#[derive(Clone, Debug)]
pub struct Skyline {
    width: i32,
    height: i32,
    segments: Vec<SkylineSegment>,
}

impl Skyline {
    pub fn new(width: i32, height: i32) -> Self {
        let segments = if width > 0 {
            vec![SkylineSegment { x: 0, y: 0, w: width }]
        } else {
            Vec::new()
        };
        Self {
            width,
            height,
            segments,
        }
    }

    pub fn segments(&self) -> &[SkylineSegment] {
        &self.segments
    }

    /// Position of a `w`x`h` rectangle whose left edge sits on segment `i`,
    /// resting on the highest segment it spans, if it stays inside the box.
    pub fn fit(&self, mut i: usize, w: i32, h: i32) -> Option<Rect> {
        let x = self.segments.get(i)?.x;
        if x as i64 + w as i64 > self.width as i64 {
            return None;
        }
        let mut y = 0;
        let mut width_left = w;
        while width_left > 0 {
            let seg = self.segments.get(i)?;
            y = y.max(seg.y);
            if y as i64 + h as i64 > self.height as i64 {
                return None;
            }
            width_left -= seg.w;
            i += 1;
        }
        Some(Rect::new(x, y, w, h))
    }

    /// Area trapped between the spanned segments and the bottom of `r`.
    pub fn wasted_area(&self, start: usize, r: &Rect) -> i64 {
        let mut area = 0i64;
        let mut width_left = r.width();
        let mut i = start;
        while width_left > 0 && i < self.segments.len() {
            let seg = &self.segments[i];
            let use_w = width_left.min(seg.w);
            if seg.y < r.top {
                area += (r.top - seg.y) as i64 * use_w as i64;
            }
            width_left -= use_w;
            i += 1;
        }
        area
    }

    /// Raises the skyline under `rect`, which was placed on segment `index`.
    fn add(&mut self, index: usize, rect: &Rect) {
        self.segments.insert(
            index,
            SkylineSegment {
                x: rect.left,
                y: rect.bottom,
                w: rect.width(),
            },
        );
        let i = index + 1;
        while i < self.segments.len() {
            let prev_right = self.segments[i - 1].right();
            let seg = self.segments[i];
            if seg.x >= prev_right {
                break;
            }
            let shrink = prev_right - seg.x;
            if seg.w <= shrink {
                self.segments.remove(i);
            } else {
                self.segments[i].x += shrink;
                self.segments[i].w -= shrink;
                break;
            }
        }
        self.merge();
    }

    /// Joins neighbouring segments of equal height.
    fn merge(&mut self) {
        let mut i = 1;
        while i < self.segments.len() {
            if self.segments[i - 1].y == self.segments[i].y {
                let w = self.segments[i].w;
                self.segments[i - 1].w += w;
                self.segments.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

/// Chooses the segment a rectangle is placed on.
pub trait RectPointPicker: Send + Sync {
    /// Segment index and resulting position, or `None` if nothing admits it.
    fn pick(&self, skyline: &Skyline, w: i32, h: i32) -> Option<(usize, Rect)>;
}

/// Least trapped area; ties go to the lower bottom edge, then the leftmost segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinWastePicker;

impl RectPointPicker for MinWastePicker {
    fn pick(&self, skyline: &Skyline, w: i32, h: i32) -> Option<(usize, Rect)> {
        let mut best: Option<(usize, Rect)> = None;
        let mut best_waste = i64::MAX;
        let mut best_bottom = i32::MAX;
        for i in 0..skyline.segments.len() {
            if let Some(r) = skyline.fit(i, w, h) {
                let waste = skyline.wasted_area(i, &r);
                if waste < best_waste || (waste == best_waste && r.bottom < best_bottom) {
                    best_waste = waste;
                    best_bottom = r.bottom;
                    best = Some((i, r));
                }
            }
        }
        best
    }
}

/// First admitting segment from the left.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitPicker;

impl RectPointPicker for FirstFitPicker {
    fn pick(&self, skyline: &Skyline, w: i32, h: i32) -> Option<(usize, Rect)> {
        (0..skyline.segments.len()).find_map(|i| skyline.fit(i, w, h).map(|r| (i, r)))
    }
}

/// Lowest bottom edge; ties go to the narrower segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BottomLeftPicker;

impl RectPointPicker for BottomLeftPicker {
    fn pick(&self, skyline: &Skyline, w: i32, h: i32) -> Option<(usize, Rect)> {
        let mut best: Option<(usize, Rect)> = None;
        let mut best_bottom = i32::MAX;
        let mut best_width = i32::MAX;
        for (i, seg) in skyline.segments.iter().enumerate() {
            if let Some(r) = skyline.fit(i, w, h) {
                if r.bottom < best_bottom || (r.bottom == best_bottom && seg.w < best_width) {
                    best_bottom = r.bottom;
                    best_width = seg.w;
                    best = Some((i, r));
                }
            }
        }
        best
    }
}

/// Skyline placement. Reports the requested box as the result size.
pub struct SkylinePlacement {
    sorter: Box<dyn ImageSorter>,
    picker: Box<dyn RectPointPicker>,
    progress: ProgressReporter,
}

impl SkylinePlacement {
    pub fn new() -> Self {
        Self::with(Box::new(HeightWidthDescending), Box::new(MinWastePicker))
    }

    pub fn with(sorter: Box<dyn ImageSorter>, picker: Box<dyn RectPointPicker>) -> Self {
        Self {
            sorter,
            picker,
            progress: ProgressReporter::new("skyline"),
        }
    }
}

impl Default for SkylinePlacement {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> PlacementAlgorithm<K> for SkylinePlacement {
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
        let mut skyline = Skyline::new(width, height);
        let mut placed: Vec<Frame<K>> = Vec::with_capacity(frames.len());

        for frame in prepared.placeable {
            if cancel.is_cancelled() {
                debug!(placed = placed.len(), total, "skyline cancelled");
                self.progress.reset();
                return Ok(None);
            }
            let (w, h) = (frame.width(), frame.height());
            let Some((index, rect)) = self.picker.pick(&skyline, w, h) else {
                debug!(w, h, placed = placed.len(), "no skyline segment admits rectangle");
                return Ok(None);
            };
            skyline.add(index, &rect);
            trace!(?rect, segments = skyline.segments.len(), "placed");
            placed.push(Frame::new(frame.key, rect));
            self.progress.report_fraction(placed.len(), total);
        }

        placed.extend(prepared.degenerate);
        Ok(Some(PackingResult::new(width, height, placed)))
    }

    fn progress(&self) -> u8 {
        self.progress.get()
    }

    fn on_progress(&mut self, callback: ProgressCallback) {
        self.progress.subscribe(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_raises_and_merges_segments() {
        let mut sky = Skyline::new(100, 100);
        sky.add(0, &Rect::new(0, 0, 30, 10));
        assert_eq!(
            sky.segments(),
            &[
                SkylineSegment { x: 0, y: 10, w: 30 },
                SkylineSegment { x: 30, y: 0, w: 70 },
            ]
        );
        sky.add(1, &Rect::new(30, 0, 20, 10));
        assert_eq!(
            sky.segments(),
            &[
                SkylineSegment { x: 0, y: 10, w: 50 },
                SkylineSegment { x: 50, y: 0, w: 50 },
            ]
        );
    }

    #[test]
    fn fit_rests_on_highest_spanned_segment() {
        let mut sky = Skyline::new(100, 100);
        sky.add(0, &Rect::new(0, 0, 30, 40));
        // Starts on the low segment at x=30, spans only it.
        assert_eq!(sky.fit(1, 20, 20), Some(Rect::new(30, 0, 20, 20)));
        // Starts on the tall segment, spans both.
        assert_eq!(sky.fit(0, 50, 20), Some(Rect::new(0, 40, 50, 20)));
        assert_eq!(sky.fit(0, 50, 70), None);
        assert_eq!(sky.fit(1, 80, 10), None);
    }

    #[test]
    fn min_waste_avoids_gaps() {
        let mut sky = Skyline::new(100, 100);
        sky.add(0, &Rect::new(0, 0, 30, 40));
        // Spanning both segments would trap 30x40; the low segment traps nothing.
        let (i, r) = MinWastePicker.pick(&sky, 40, 10).unwrap();
        assert_eq!(i, 1);
        assert_eq!(r, Rect::new(30, 0, 40, 10));
        assert_eq!(sky.wasted_area(0, &Rect::new(0, 40, 40, 10)), 400);
    }
}
