//! MaxRects as a fixed configuration of the Guillotine engine.
//!
//! The free list holds maximal free rectangles, which may overlap. After each
//! placement every free rectangle hit by the new rectangle is replaced by what
//! remains of it, and rectangles contained in another one are pruned.

use super::guillotine::GuillotinePlacement;
use super::strategies::{
    ChoiceExtractor, FreeListInvariant, FreeRectPostProcessor, FreeRectSplitter,
    FreeRectStrategies, KeepOrientation, SortedMerger,
};
use crate::model::Rect;
use crate::sort::{HeightWidthDescending, ImageSorter};

impl FreeRectStrategies {
    /// Best-area-fit, four-way split, sorted merge, MaxRects repair.
    pub fn max_rects() -> Self {
        Self {
            extractor: Box::new(ChoiceExtractor::default()),
            orientation: Box::new(KeepOrientation),
            splitter: Box::new(FourWaySplitter),
            merger: Box::new(SortedMerger),
            post_processor: Box::new(MaxRectsPostProcessor),
            invariant: FreeListInvariant::NonContained,
        }
    }
}

impl GuillotinePlacement {
    pub fn max_rects() -> Self {
        Self::max_rects_with(Box::new(HeightWidthDescending))
    }

    pub fn max_rects_with(sorter: Box<dyn ImageSorter>) -> Self {
        Self::new("maxrects", sorter, FreeRectStrategies::max_rects())
    }
}

/// The maximal pieces of `fr` lying above, below, left and right of `used`.
/// Pieces may overlap each other; empty ones are dropped.
pub fn remainders(fr: &Rect, used: &Rect) -> Vec<Rect> {
    [
        Rect::from_edges(fr.left, fr.top, fr.right, used.top.min(fr.bottom)),
        Rect::from_edges(fr.left, used.bottom.max(fr.top), fr.right, fr.bottom),
        Rect::from_edges(fr.left, fr.top, used.left.min(fr.right), fr.bottom),
        Rect::from_edges(used.right.max(fr.left), fr.top, fr.right, fr.bottom),
    ]
    .into_iter()
    .filter(|r| !r.is_empty())
    .collect()
}

/// Splits the host into up to four maximal pieces around the placed rectangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct FourWaySplitter;

impl FreeRectSplitter for FourWaySplitter {
    fn split(&self, free: &Rect, placed: &Rect) -> Vec<Rect> {
        remainders(free, placed)
    }
}

/// Subtracts the placed rectangle from every free rectangle it overlaps, then
/// drops free rectangles contained in another one. Leaves the list sorted by
/// ascending area.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxRectsPostProcessor;

impl FreeRectPostProcessor for MaxRectsPostProcessor {
    fn post_process(&self, free: &mut Vec<Rect>, placed: &Rect) {
        let mut next: Vec<Rect> = Vec::with_capacity(free.len() + 4);
        for fr in free.drain(..) {
            if fr.intersects(placed) {
                next.extend(remainders(&fr, placed));
            } else {
                next.push(fr);
            }
        }
        prune_contained(&mut next);
        next.sort_by_key(|r| r.area());
        *free = next;
    }
}

/// Removes every rectangle that lies inside another one (one copy of exact
/// duplicates survives).
fn prune_contained(free: &mut Vec<Rect>) {
    let mut i = 0;
    while i < free.len() {
        let a = free[i];
        let mut remove_i = false;
        let mut j = i + 1;
        while j < free.len() {
            let b = free[j];
            if b.contains(&a) {
                remove_i = true;
                break;
            }
            if a.contains(&b) {
                free.remove(j);
                continue;
            }
            j += 1;
        }
        if remove_i {
            free.remove(i);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_way_split_relative_to_host() {
        let fr = Rect::new(0, 0, 100, 100);
        let used = Rect::new(20, 30, 10, 10);
        let out = remainders(&fr, &used);
        assert_eq!(
            out,
            vec![
                Rect::new(0, 0, 100, 30),
                Rect::new(0, 40, 100, 60),
                Rect::new(0, 0, 20, 100),
                Rect::new(30, 0, 70, 100),
            ]
        );
    }

    #[test]
    fn four_way_split_drops_zero_sized_pieces() {
        let fr = Rect::new(0, 0, 50, 20);
        let used = Rect::new(0, 0, 50, 5);
        assert_eq!(remainders(&fr, &used), vec![Rect::new(0, 5, 50, 15)]);
    }

    #[test]
    fn post_process_cuts_overlapping_and_prunes_contained() {
        let mut free = vec![
            Rect::new(0, 10, 40, 30),
            Rect::new(30, 0, 10, 40),
            Rect::new(32, 2, 2, 2),
        ];
        let placed = Rect::new(30, 10, 10, 10);
        MaxRectsPostProcessor.post_process(&mut free, &placed);
        assert!(free.iter().all(|r| !r.intersects(&placed)));
        assert!(FreeListInvariant::NonContained.holds(&free));
        assert!(free.windows(2).all(|w| w[0].area() <= w[1].area()));
        // The tiny square stays inside the piece above the placement and is pruned.
        assert!(!free.contains(&Rect::new(32, 2, 2, 2)));
        assert!(free.contains(&Rect::new(0, 10, 30, 30)));
        assert!(free.contains(&Rect::new(0, 20, 40, 20)));
    }
}
