use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PackError, Result};
use crate::finder::GeneticBoxFinder;
use crate::packer::PlacementAlgorithm;
use crate::packer::bottom_left::BottomLeftPlacement;
use crate::packer::guillotine::GuillotinePlacement;
use crate::packer::skyline::{
    BottomLeftPicker, FirstFitPicker, MinWastePicker, RectPointPicker, SkylinePlacement,
};
use crate::sort::{HeightWidthAscending, HeightWidthDescending, ImageSorter, PreserveOrder};

/// Placement algorithm selection and finder parameters.
/// Key notes:
///   - `algorithm` picks the placement family; the guillotine knobs apply to
///     `Guillotine` only, `skyline_picker` to `Skyline` only
///   - the finder always drives its inner algorithm with preserved order
///   - `allow_rotation` is recorded but placement never rotates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Candidate points with top/left sliding. Quadratic, compact results.
    BottomLeft,
    /// Free-rectangle list with two-way splits.
    Guillotine,
    /// Guillotine engine with maximal (overlapping) free rectangles.
    MaxRects,
    /// Skyline envelope. Fastest; reports the requested box.
    Skyline,
}

impl FromStr for Algorithm {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bl" | "bottomleft" | "bottom_left" | "bottom-left" => Ok(Self::BottomLeft),
            "guillotine" => Ok(Self::Guillotine),
            "maxrects" | "max_rects" => Ok(Self::MaxRects),
            "skyline" => Ok(Self::Skyline),
            _ => Err(()),
        }
    }
}

/// Input ordering applied before placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    HeightWidthDesc,
    HeightWidthAsc,
    Preserve,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "height_width_desc" | "desc" => Ok(Self::HeightWidthDesc),
            "height_width_asc" | "asc" => Ok(Self::HeightWidthAsc),
            "preserve" | "none" => Ok(Self::Preserve),
            _ => Err(()),
        }
    }
}

impl SortOrder {
    pub fn build(self) -> Box<dyn ImageSorter> {
        match self {
            Self::HeightWidthDesc => Box::new(HeightWidthDescending),
            Self::HeightWidthAsc => Box::new(HeightWidthAscending),
            Self::Preserve => Box::new(PreserveOrder),
        }
    }
}

/// Guillotine free-rect choice heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineChoice {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl FromStr for GuillotineChoice {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "waf" | "worstareafit" => Ok(Self::WorstAreaFit),
            "wssf" | "worstshortsidefit" => Ok(Self::WorstShortSideFit),
            "wlsf" | "worstlongsidefit" => Ok(Self::WorstLongSideFit),
            _ => Err(()),
        }
    }
}

/// Guillotine split axis heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineSplit {
    SplitShorterLeftoverAxis,
    SplitLongerLeftoverAxis,
    SplitMinimizeArea,
    SplitMaximizeArea,
    SplitShorterAxis,
    SplitLongerAxis,
}

impl FromStr for GuillotineSplit {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "splitshorterleftoveraxis" => Ok(Self::SplitShorterLeftoverAxis),
            "llas" | "splitlongerleftoveraxis" => Ok(Self::SplitLongerLeftoverAxis),
            "minas" | "splitminimizearea" => Ok(Self::SplitMinimizeArea),
            "maxas" | "splitmaximizearea" => Ok(Self::SplitMaximizeArea),
            "sas" | "splitshorteraxis" => Ok(Self::SplitShorterAxis),
            "las" | "splitlongeraxis" => Ok(Self::SplitLongerAxis),
            _ => Err(()),
        }
    }
}

/// Skyline segment selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkylinePicker {
    MinWaste,
    FirstFit,
    BottomLeft,
}

impl FromStr for SkylinePicker {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mw" | "minwaste" | "min_waste" => Ok(Self::MinWaste),
            "ff" | "firstfit" | "first_fit" => Ok(Self::FirstFit),
            "bl" | "bottomleft" | "bottom_left" => Ok(Self::BottomLeft),
            _ => Err(()),
        }
    }
}

impl SkylinePicker {
    pub fn build(self) -> Box<dyn RectPointPicker> {
        match self {
            Self::MinWaste => Box::new(MinWastePicker),
            Self::FirstFit => Box::new(FirstFitPicker),
            Self::BottomLeft => Box::new(BottomLeftPicker),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackerConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    #[serde(default = "default_g_choice")]
    pub g_choice: GuillotineChoice,
    #[serde(default = "default_g_split")]
    pub g_split: GuillotineSplit,
    #[serde(default = "default_skyline_picker")]
    pub skyline_picker: SkylinePicker,
    /// Recorded for callers; placement itself never rotates.
    #[serde(default)]
    pub allow_rotation: bool,

    // finder
    /// Generations the finder evolves.
    #[serde(default = "default_generations")]
    pub generations: i32,
    /// Individuals per generation (at least 2).
    #[serde(default = "default_population")]
    pub population: usize,
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Fixed seed for reproducible searches. None draws from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            sort_order: default_sort_order(),
            g_choice: default_g_choice(),
            g_split: default_g_split(),
            skyline_picker: default_skyline_picker(),
            allow_rotation: false,
            generations: default_generations(),
            population: default_population(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            seed: None,
        }
    }
}

impl PackerConfig {
    /// Validates the finder parameters.
    ///
    /// The finder repeats the population and generation checks when it runs;
    /// this catches them (and bad rates) before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.population < 2 {
            return Err(PackError::InvalidConfig(format!(
                "population must be at least 2, got {}",
                self.population
            )));
        }
        if self.generations < 0 {
            return Err(PackError::InvalidConfig(format!(
                "generations must not be negative, got {}",
                self.generations
            )));
        }
        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PackError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {rate}"
                )));
            }
        }
        Ok(())
    }

    /// Boxed placement algorithm for this configuration.
    pub fn build_algorithm<K: Clone>(&self) -> Box<dyn PlacementAlgorithm<K> + Send> {
        self.algorithm_with(self.sort_order.build())
    }

    /// Finder driving the configured algorithm with preserved order.
    pub fn build_finder(&self) -> GeneticBoxFinder {
        let mut finder = GeneticBoxFinder::new(self.generations, self.population)
            .with_mutation_rate(self.mutation_rate)
            .with_crossover_rate(self.crossover_rate)
            .with_algorithm(self.algorithm_with(Box::new(PreserveOrder)));
        if let Some(seed) = self.seed {
            finder = finder.with_seed(seed);
        }
        finder
    }

    fn algorithm_with<K: Clone>(
        &self,
        sorter: Box<dyn ImageSorter>,
    ) -> Box<dyn PlacementAlgorithm<K> + Send> {
        match self.algorithm {
            Algorithm::BottomLeft => Box::new(BottomLeftPlacement::with_sorter(sorter)),
            Algorithm::Guillotine => Box::new(GuillotinePlacement::guillotine_with(
                sorter,
                self.g_choice,
                self.g_split,
            )),
            Algorithm::MaxRects => Box::new(GuillotinePlacement::max_rects_with(sorter)),
            Algorithm::Skyline => {
                Box::new(SkylinePlacement::with(sorter, self.skyline_picker.build()))
            }
        }
    }
}

fn default_algorithm() -> Algorithm {
    Algorithm::Skyline
}
fn default_sort_order() -> SortOrder {
    SortOrder::HeightWidthDesc
}
fn default_g_choice() -> GuillotineChoice {
    GuillotineChoice::BestAreaFit
}
fn default_g_split() -> GuillotineSplit {
    GuillotineSplit::SplitLongerAxis
}
fn default_skyline_picker() -> SkylinePicker {
    SkylinePicker::MinWaste
}
fn default_generations() -> i32 {
    100
}
fn default_population() -> usize {
    20
}
fn default_mutation_rate() -> f64 {
    0.2
}
fn default_crossover_rate() -> f64 {
    0.85
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn algorithm(mut self, v: Algorithm) -> Self {
        self.cfg.algorithm = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn g_choice(mut self, v: GuillotineChoice) -> Self {
        self.cfg.g_choice = v;
        self
    }
    pub fn g_split(mut self, v: GuillotineSplit) -> Self {
        self.cfg.g_split = v;
        self
    }
    pub fn skyline_picker(mut self, v: SkylinePicker) -> Self {
        self.cfg.skyline_picker = v;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn generations(mut self, v: i32) -> Self {
        self.cfg.generations = v;
        self
    }
    pub fn population(mut self, v: usize) -> Self {
        self.cfg.population = v;
        self
    }
    pub fn mutation_rate(mut self, v: f64) -> Self {
        self.cfg.mutation_rate = v;
        self
    }
    pub fn crossover_rate(mut self, v: f64) -> Self {
        self.cfg.crossover_rate = v;
        self
    }
    pub fn seed(mut self, v: Option<u64>) -> Self {
        self.cfg.seed = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
