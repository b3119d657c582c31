//! Free-rectangle strategies plugged into the Guillotine engine.
//!
//! The free list handed to every strategy is kept sorted by ascending area by
//! the merger; extractors rely on that order to break ties.

use crate::config::{GuillotineChoice, GuillotineSplit};
use crate::model::Rect;

/// Picks the free rectangle that should host a `w`x`h` rectangle.
pub trait FreeRectExtractor: Send + Sync {
    /// Index into `free`, or `None` if nothing admits the rectangle.
    fn extract(&self, free: &[Rect], w: i32, h: i32) -> Option<usize>;
}

/// Decides whether a rectangle should be turned before the fit test.
pub trait OrientationSelector: Send + Sync {
    fn select(&self, w: i32, h: i32) -> (i32, i32);
}

/// Divides a free rectangle after `placed` was put inside it.
pub trait FreeRectSplitter: Send + Sync {
    fn split(&self, free: &Rect, placed: &Rect) -> Vec<Rect>;
}

/// Replaces the consumed free rectangle with the split products.
pub trait FreeRectMerger: Send + Sync {
    fn merge(&self, free: &mut Vec<Rect>, consumed: usize, new_rects: Vec<Rect>);
}

/// Repairs the free list after a placement.
pub trait FreeRectPostProcessor: Send + Sync {
    fn post_process(&self, free: &mut Vec<Rect>, placed: &Rect);
}

/// What the free list guarantees between placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeListInvariant {
    /// Free rectangles never overlap (guillotine partition).
    Disjoint,
    /// Free rectangles may overlap, but none lies inside another (MaxRects).
    NonContained,
}

impl FreeListInvariant {
    pub fn holds(&self, free: &[Rect]) -> bool {
        for i in 0..free.len() {
            for j in (i + 1)..free.len() {
                let (a, b) = (&free[i], &free[j]);
                let ok = match self {
                    Self::Disjoint => !a.intersects(b),
                    Self::NonContained => !a.contains(b) && !b.contains(a),
                };
                if !ok {
                    return false;
                }
            }
        }
        true
    }
}

/// The full strategy set of one Guillotine-family algorithm.
pub struct FreeRectStrategies {
    pub extractor: Box<dyn FreeRectExtractor>,
    pub orientation: Box<dyn OrientationSelector>,
    pub splitter: Box<dyn FreeRectSplitter>,
    pub merger: Box<dyn FreeRectMerger>,
    pub post_processor: Box<dyn FreeRectPostProcessor>,
    pub invariant: FreeListInvariant,
}

impl FreeRectStrategies {
    /// Classic guillotine: best-area-fit, two-way split along the longer axis.
    pub fn guillotine() -> Self {
        Self::guillotine_with(GuillotineChoice::BestAreaFit, GuillotineSplit::SplitLongerAxis)
    }

    pub fn guillotine_with(choice: GuillotineChoice, split: GuillotineSplit) -> Self {
        Self {
            extractor: Box::new(ChoiceExtractor::new(choice)),
            orientation: Box::new(KeepOrientation),
            splitter: Box::new(AxisSplitter::new(split)),
            merger: Box::new(SortedMerger),
            post_processor: Box::new(NoPostProcessing),
            invariant: FreeListInvariant::Disjoint,
        }
    }
}

/// Scores every admitting free rectangle with a [`GuillotineChoice`] and keeps
/// the lowest; the earliest one wins ties.
#[derive(Debug, Clone)]
pub struct ChoiceExtractor {
    choice: GuillotineChoice,
}

impl ChoiceExtractor {
    pub fn new(choice: GuillotineChoice) -> Self {
        Self { choice }
    }

    fn score(&self, fr: &Rect, w: i32, h: i32) -> i64 {
        let area_fit = fr.area() - w as i64 * h as i64;
        let leftover_h = (fr.width() - w).abs() as i64;
        let leftover_v = (fr.height() - h).abs() as i64;
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        match self.choice {
            GuillotineChoice::BestAreaFit => area_fit,
            GuillotineChoice::BestShortSideFit => short_fit,
            GuillotineChoice::BestLongSideFit => long_fit,
            GuillotineChoice::WorstAreaFit => -area_fit,
            GuillotineChoice::WorstShortSideFit => -short_fit,
            GuillotineChoice::WorstLongSideFit => -long_fit,
        }
    }
}

impl Default for ChoiceExtractor {
    fn default() -> Self {
        Self::new(GuillotineChoice::BestAreaFit)
    }
}

impl FreeRectExtractor for ChoiceExtractor {
    fn extract(&self, free: &[Rect], w: i32, h: i32) -> Option<usize> {
        let mut best_idx = None;
        let mut best_score = i64::MAX;
        for (i, fr) in free.iter().enumerate() {
            if fr.width() >= w && fr.height() >= h {
                let s = self.score(fr, w, h);
                if s < best_score {
                    best_score = s;
                    best_idx = Some(i);
                }
            }
        }
        best_idx
    }
}

/// Never rotates.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOrientation;

impl OrientationSelector for KeepOrientation {
    fn select(&self, w: i32, h: i32) -> (i32, i32) {
        (w, h)
    }
}

/// Two-way guillotine cut. The placed rectangle sits in the top-left corner of
/// the free one; the residue becomes a bottom piece and a right piece, and the
/// [`GuillotineSplit`] rule decides which of the two spans the full side.
#[derive(Debug, Clone)]
pub struct AxisSplitter {
    rule: GuillotineSplit,
}

impl AxisSplitter {
    pub fn new(rule: GuillotineSplit) -> Self {
        Self { rule }
    }

    fn split_horizontal(&self, fr: &Rect, placed: &Rect) -> bool {
        let w_right = (fr.right - placed.right).max(0) as i64;
        let h_bottom = (fr.bottom - placed.bottom).max(0) as i64;
        let (fw, fh) = (fr.width() as i64, fr.height() as i64);
        match self.rule {
            GuillotineSplit::SplitShorterLeftoverAxis => h_bottom < w_right,
            GuillotineSplit::SplitLongerLeftoverAxis => h_bottom > w_right,
            GuillotineSplit::SplitMinimizeArea => w_right * fh <= fw * h_bottom,
            GuillotineSplit::SplitMaximizeArea => w_right * fh >= fw * h_bottom,
            GuillotineSplit::SplitShorterAxis => fh < fw,
            GuillotineSplit::SplitLongerAxis => fh > fw,
        }
    }
}

impl Default for AxisSplitter {
    fn default() -> Self {
        Self::new(GuillotineSplit::SplitLongerAxis)
    }
}

impl FreeRectSplitter for AxisSplitter {
    fn split(&self, fr: &Rect, placed: &Rect) -> Vec<Rect> {
        let (bottom, right) = if self.split_horizontal(fr, placed) {
            (
                Rect::from_edges(fr.left, placed.bottom, fr.right, fr.bottom),
                Rect::from_edges(placed.right, fr.top, fr.right, placed.bottom),
            )
        } else {
            (
                Rect::from_edges(fr.left, placed.bottom, placed.right, fr.bottom),
                Rect::from_edges(placed.right, fr.top, fr.right, fr.bottom),
            )
        };
        [bottom, right].into_iter().filter(|r| !r.is_empty()).collect()
    }
}

/// Removes the consumed rectangle and inserts new ones at their area rank,
/// after existing rectangles of equal area.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedMerger;

impl FreeRectMerger for SortedMerger {
    fn merge(&self, free: &mut Vec<Rect>, consumed: usize, new_rects: Vec<Rect>) {
        free.remove(consumed);
        for r in new_rects {
            let area = r.area();
            let at = free.partition_point(|f| f.area() <= area);
            free.insert(at, r);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPostProcessing;

impl FreeRectPostProcessor for NoPostProcessing {
    fn post_process(&self, _free: &mut Vec<Rect>, _placed: &Rect) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_area_fit_prefers_smallest_and_first_on_tie() {
        let free = vec![
            Rect::new(0, 0, 10, 10),
            Rect::new(20, 0, 10, 10),
            Rect::new(40, 0, 30, 30),
            Rect::new(0, 40, 4, 4),
        ];
        let ex = ChoiceExtractor::default();
        assert_eq!(ex.extract(&free, 8, 8), Some(0));
        assert_eq!(ex.extract(&free, 20, 20), Some(2));
        assert_eq!(ex.extract(&free, 40, 1), None);
    }

    #[test]
    fn longer_axis_split_of_wide_rect_cuts_vertically() {
        let fr = Rect::new(0, 0, 100, 40);
        let placed = Rect::new(0, 0, 30, 10);
        let out = AxisSplitter::default().split(&fr, &placed);
        assert_eq!(
            out,
            vec![Rect::new(0, 10, 30, 30), Rect::new(30, 0, 70, 40)]
        );
    }

    #[test]
    fn longer_axis_split_of_tall_rect_cuts_horizontally() {
        let fr = Rect::new(0, 0, 40, 100);
        let placed = Rect::new(0, 0, 10, 30);
        let out = AxisSplitter::default().split(&fr, &placed);
        assert_eq!(
            out,
            vec![Rect::new(0, 30, 40, 70), Rect::new(10, 0, 30, 30)]
        );
    }

    #[test]
    fn split_drops_empty_residue() {
        let fr = Rect::new(0, 0, 10, 40);
        let placed = Rect::new(0, 0, 10, 15);
        let out = AxisSplitter::default().split(&fr, &placed);
        assert_eq!(out, vec![Rect::new(0, 15, 10, 25)]);
    }

    #[test]
    fn sorted_merger_keeps_area_order() {
        let mut free = vec![
            Rect::new(0, 0, 2, 2),
            Rect::new(0, 0, 5, 5),
            Rect::new(0, 0, 9, 9),
        ];
        SortedMerger.merge(
            &mut free,
            1,
            vec![Rect::new(1, 1, 3, 3), Rect::new(2, 2, 2, 2), Rect::new(0, 0, 10, 10)],
        );
        let areas: Vec<i64> = free.iter().map(|r| r.area()).collect();
        assert_eq!(areas, vec![4, 4, 9, 81, 100]);
        // Equal areas keep insertion order after existing entries.
        assert_eq!(free[1], Rect::new(2, 2, 2, 2));
    }

    #[test]
    fn invariant_checks() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        let c = Rect::new(1, 1, 2, 2);
        assert!(!FreeListInvariant::Disjoint.holds(&[a, b]));
        assert!(FreeListInvariant::NonContained.holds(&[a, b]));
        assert!(!FreeListInvariant::NonContained.holds(&[a, c]));
    }
}
