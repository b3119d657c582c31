//! Orderings applied to input rectangles before placement.
//!
//! A sorter only computes a permutation; it never mutates its input. All
//! sorts are stable, so equal rectangles keep their input order.

use crate::model::{Frame, Rect};

/// Produces the order in which rectangles are handed to a placement algorithm.
pub trait ImageSorter: Send + Sync {
    /// Returns a permutation of `0..rects.len()`.
    fn order(&self, rects: &[Rect]) -> Vec<usize>;
}

impl<'a> dyn ImageSorter + 'a {
    /// Returns `frames` reordered according to this sorter.
    pub fn sort<K: Clone>(&self, frames: &[Frame<K>]) -> Vec<Frame<K>> {
        let rects: Vec<Rect> = frames.iter().map(|f| f.rect).collect();
        self.order(&rects)
            .into_iter()
            .map(|i| frames[i].clone())
            .collect()
    }
}

/// Tallest first; equal heights are ordered by descending width.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeightWidthDescending;

impl ImageSorter for HeightWidthDescending {
    fn order(&self, rects: &[Rect]) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..rects.len()).collect();
        idx.sort_by(|&a, &b| {
            rects[b]
                .height()
                .cmp(&rects[a].height())
                .then_with(|| rects[b].width().cmp(&rects[a].width()))
        });
        idx
    }
}

/// Shortest first; equal heights are ordered by ascending width.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeightWidthAscending;

impl ImageSorter for HeightWidthAscending {
    fn order(&self, rects: &[Rect]) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..rects.len()).collect();
        idx.sort_by(|&a, &b| {
            rects[a]
                .height()
                .cmp(&rects[b].height())
                .then_with(|| rects[a].width().cmp(&rects[b].width()))
        });
        idx
    }
}

/// Identity ordering: the caller controls the order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveOrder;

impl ImageSorter for PreserveOrder {
    fn order(&self, rects: &[Rect]) -> Vec<usize> {
        (0..rects.len()).collect()
    }
}
