use crate::error::{PackError, Result};
use crate::model::{Frame, PackingResult, Rect};
use crate::progress::{CancelToken, ProgressCallback, ProgressReporter};
use crate::sort::ImageSorter;

pub mod bottom_left;
pub mod guillotine;
pub mod maxrects;
pub mod skyline;
pub mod strategies;

/// A placement algorithm lays out a whole set of rectangles inside a box.
///
/// Implementations must ensure no overlaps and keep every frame inside
/// `[0,width]x[0,height]` of the returned result. `Ok(None)` means no
/// placement exists for the box, or the call was cancelled; it is not an error.
pub trait PlacementAlgorithm<K> {
    /// Short identifier used as the progress source.
    fn name(&self) -> &'static str;

    fn place(
        &mut self,
        width: i32,
        height: i32,
        frames: &[Frame<K>],
        cancel: &CancelToken,
    ) -> Result<Option<PackingResult<K>>>;

    /// Progress of the current (or last) call, 0..=100.
    fn progress(&self) -> u8;

    fn reports_progress(&self) -> bool {
        true
    }

    fn on_progress(&mut self, callback: ProgressCallback);
}

/// Input split into placeable frames (sorted) and zero-area frames.
pub(crate) struct Prepared<K> {
    pub placeable: Vec<Frame<K>>,
    pub degenerate: Vec<Frame<K>>,
}

/// Shared preamble of every placement call: validates arguments, resets
/// progress, drops positions from the input and orders the placeable frames.
pub(crate) fn prepare<K: Clone>(
    progress: &mut ProgressReporter,
    sorter: &dyn ImageSorter,
    width: i32,
    height: i32,
    frames: &[Frame<K>],
) -> Result<Prepared<K>> {
    if width < 0 || height < 0 {
        return Err(PackError::NegativeDimension { width, height });
    }
    validate_frames(frames)?;
    progress.reset();

    let (placeable, degenerate) = split_degenerate(frames);
    Ok(Prepared {
        placeable: sorter.sort(&placeable),
        degenerate,
    })
}

/// Moves every frame to the origin and separates the zero-area ones, which
/// are collapsed to a 0x0 rectangle so they fit inside any result box.
pub(crate) fn split_degenerate<K: Clone>(frames: &[Frame<K>]) -> (Vec<Frame<K>>, Vec<Frame<K>>) {
    let mut placeable = Vec::with_capacity(frames.len());
    let mut degenerate = Vec::new();
    for f in frames {
        if f.rect.is_empty() {
            degenerate.push(Frame::new(f.key.clone(), Rect::default()));
        } else {
            placeable.push(Frame::sized(f.key.clone(), f.width(), f.height()));
        }
    }
    (placeable, degenerate)
}

/// Rejects frames with negative width or height.
pub(crate) fn validate_frames<K>(frames: &[Frame<K>]) -> Result<()> {
    match frames
        .iter()
        .position(|f| f.width() < 0 || f.height() < 0)
    {
        Some(index) => Err(PackError::InvalidRect {
            index,
            width: frames[index].width(),
            height: frames[index].height(),
        }),
        None => Ok(()),
    }
}

/// Tracks the tight bounds of what has been placed so far.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Extent {
    pub width: i32,
    pub height: i32,
}

impl Extent {
    pub fn include(&mut self, r: &Rect) {
        self.width = self.width.max(r.right);
        self.height = self.height.max(r.bottom);
    }
}
