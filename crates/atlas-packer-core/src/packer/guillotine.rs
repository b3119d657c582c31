use tracing::{debug, instrument, trace};

use super::strategies::FreeRectStrategies;
use super::{Extent, PlacementAlgorithm, prepare};
use crate::config::{GuillotineChoice, GuillotineSplit};
use crate::error::Result;
use crate::model::{Frame, PackingResult, Rect};
use crate::progress::{CancelToken, ProgressCallback, ProgressReporter};
use crate::sort::{HeightWidthDescending, ImageSorter};

/// Free-list placement engine shared by Guillotine and MaxRects.
///
/// Per rectangle: the extractor picks a free rectangle, the rectangle is put in
/// its top-left corner, the splitter cuts the remainder, the merger replaces
/// the consumed entry and the post-processor repairs the rest of the list.
pub struct GuillotinePlacement {
    sorter: Box<dyn ImageSorter>,
    strategies: FreeRectStrategies,
    progress: ProgressReporter,
}

impl GuillotinePlacement {
    pub fn new(
        name: &'static str,
        sorter: Box<dyn ImageSorter>,
        strategies: FreeRectStrategies,
    ) -> Self {
        Self {
            sorter,
            strategies,
            progress: ProgressReporter::new(name),
        }
    }

    /// Best-area-fit, longer-axis split, heights descending.
    pub fn guillotine() -> Self {
        Self::new(
            "guillotine",
            Box::new(HeightWidthDescending),
            FreeRectStrategies::guillotine(),
        )
    }

    pub fn guillotine_with(
        sorter: Box<dyn ImageSorter>,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Self {
        Self::new(
            "guillotine",
            sorter,
            FreeRectStrategies::guillotine_with(choice, split),
        )
    }

    pub fn strategies(&self) -> &FreeRectStrategies {
        &self.strategies
    }
}

impl Default for GuillotinePlacement {
    fn default() -> Self {
        Self::guillotine()
    }
}

impl<K: Clone> PlacementAlgorithm<K> for GuillotinePlacement {
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
        let s = &self.strategies;

        let mut free: Vec<Rect> = Vec::new();
        if width > 0 && height > 0 {
            free.push(Rect::new(0, 0, width, height));
        }
        let mut extent = Extent::default();
        let mut placed: Vec<Frame<K>> = Vec::with_capacity(frames.len());

        for frame in prepared.placeable {
            if cancel.is_cancelled() {
                debug!(placed = placed.len(), total, "guillotine cancelled");
                self.progress.reset();
                return Ok(None);
            }
            let (w, h) = s.orientation.select(frame.width(), frame.height());
            let Some(idx) = s.extractor.extract(&free, w, h) else {
                debug!(w, h, placed = placed.len(), free = free.len(), "no free rectangle admits rectangle");
                return Ok(None);
            };
            let host = free[idx];
            let rect = Rect::new(host.left, host.top, w, h);
            let residue = s.splitter.split(&host, &rect);
            s.merger.merge(&mut free, idx, residue);
            s.post_processor.post_process(&mut free, &rect);
            trace!(?rect, free = free.len(), "placed");

            extent.include(&rect);
            placed.push(Frame::new(frame.key, rect));
            self.progress.report_fraction(placed.len(), total);
        }

        // Quadratic, so checked once per call rather than per placement.
        debug_assert!(
            s.invariant.holds(&free),
            "free list violates {:?}",
            s.invariant
        );
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
