//! Core library for laying out rectangles in texture atlases.
//!
//! - Algorithms: Bottom-Left, Guillotine (choice + split), MaxRects (Guillotine engine with maximal free rects), Skyline (MW/FF/BL)
//! - Finder: genetic search for the smallest box, driving any placement algorithm as its fitness function
//! - Cooperative cancellation (`CancelToken`) and per-instance progress listeners
//! - Data model is serde-serializable; the CLI crate reads and writes it as JSON/YAML.
//!
//! Quick example:
//! ```
//! use atlas_packer_core::prelude::*;
//! # fn main() -> atlas_packer_core::Result<()> {
//! let frames = vec![Frame::sized("a", 64, 32), Frame::sized("b", 32, 32)];
//! let mut packer = PackerConfig::default().build_algorithm::<&str>();
//! let layout = packer.place(128, 128, &frames, &CancelToken::new())?;
//! assert!(layout.is_some_and(|l| l.is_disjoint()));
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod finder;
pub mod model;
pub mod packer;
pub mod progress;
pub mod sort;

pub use config::*;
pub use error::*;
pub use finder::GeneticBoxFinder;
pub use model::*;
pub use packer::PlacementAlgorithm;
pub use progress::{CancelToken, ProgressCallback, ProgressReporter};

/// Convenience prelude for common types and functions.
/// Importing `atlas_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        Algorithm, GuillotineChoice, GuillotineSplit, PackerConfig, PackerConfigBuilder,
        SkylinePicker, SortOrder,
    };
    pub use crate::finder::GeneticBoxFinder;
    pub use crate::model::{Frame, PackingResult, Point, Rect};
    pub use crate::packer::PlacementAlgorithm;
    pub use crate::packer::bottom_left::BottomLeftPlacement;
    pub use crate::packer::guillotine::GuillotinePlacement;
    pub use crate::packer::skyline::SkylinePlacement;
    pub use crate::progress::{CancelToken, ProgressCallback};
    pub use crate::sort::{HeightWidthAscending, HeightWidthDescending, ImageSorter, PreserveOrder};
}
