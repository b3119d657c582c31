//! Minimum bounding box search.
//!
//! [`GeneticBoxFinder`] evolves placement orders and trial widths, using an
//! inner [`PlacementAlgorithm`] as a black-box fitness function. Fitness is the
//! area of the tight bounding box the inner algorithm produces; lower wins.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, trace};

use crate::error::{PackError, Result};
use crate::model::{Frame, PackingResult, Rect};
use crate::packer::skyline::{MinWastePicker, SkylinePlacement};
use crate::packer::{PlacementAlgorithm, split_degenerate, validate_frames};
use crate::progress::{CancelToken, ProgressCallback, ProgressReporter};
use crate::sort::{HeightWidthDescending, ImageSorter, PreserveOrder};

pub mod candidates;
pub mod chromosome;

pub use candidates::{candidate_widths, square_width_index};
pub use chromosome::Chromosome;

/// Inner algorithm driven by the finder. Keys are indices into the input.
pub type InnerAlgorithm = Box<dyn PlacementAlgorithm<usize> + Send>;

/// Genetic search for the smallest box holding a set of rectangles.
///
/// Parameters are validated when [`find_minimum_bounding_box`] is called, not
/// at construction. A cancelled search returns the best layout found so far and
/// keeps its progress until the next call starts.
///
/// [`find_minimum_bounding_box`]: GeneticBoxFinder::find_minimum_bounding_box
pub struct GeneticBoxFinder {
    iterations: i32,
    population: usize,
    crossover_rate: f64,
    mutation_rate: f64,
    tournament_size: usize,
    seed: Option<u64>,
    algorithm: InnerAlgorithm,
    progress: ProgressReporter,
}

impl GeneticBoxFinder {
    pub fn new(iterations: i32, population: usize) -> Self {
        Self {
            iterations,
            population,
            crossover_rate: 0.85,
            mutation_rate: 0.2,
            tournament_size: 3,
            seed: None,
            algorithm: Box::new(SkylinePlacement::with(
                Box::new(PreserveOrder),
                Box::new(MinWastePicker),
            )),
            progress: ProgressReporter::new("genetic-finder"),
        }
    }

    /// Replaces the inner algorithm. It should keep the given order
    /// (e.g. use [`PreserveOrder`]) or the evolved permutations have no effect.
    pub fn with_algorithm(mut self, algorithm: InnerAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size.max(1);
        self
    }

    pub fn iterations(&self) -> i32 {
        self.iterations
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Generations completed in the current (or last) call, 0..=100.
    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub fn on_progress(&mut self, callback: ProgressCallback) {
        self.progress.subscribe(callback);
    }

    /// Searches for the smallest box holding `frames`.
    ///
    /// Never yields "no result": when the inner algorithm fails on every trial,
    /// the frames are stacked in a single column. Empty input gives a 0x0 box.
    #[instrument(skip_all, fields(count = frames.len(), iterations = self.iterations, population = self.population))]
    pub fn find_minimum_bounding_box<K: Clone>(
        &mut self,
        frames: &[Frame<K>],
        cancel: &CancelToken,
    ) -> Result<PackingResult<K>> {
        if self.population < 2 {
            return Err(PackError::InvalidPopulation(self.population));
        }
        if self.iterations < 0 {
            return Err(PackError::NegativeIterations(self.iterations));
        }
        validate_frames(frames)?;
        self.progress.reset();

        let (placeable, degenerate) = split_degenerate(frames);
        if placeable.is_empty() {
            self.progress.report(100);
            return Ok(PackingResult::new(0, 0, degenerate));
        }

        let rects: Vec<Rect> = placeable.iter().map(|f| f.rect).collect();
        let widths = candidate_widths(&rects);
        let trial_height = rects
            .iter()
            .map(|r| r.height() as i64)
            .sum::<i64>()
            .min(i32::MAX as i64) as i32;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(candidates = widths.len(), trial_height, "starting search");

        let mut search = Search {
            algorithm: self.algorithm.as_mut(),
            rects: &rects,
            widths: &widths,
            trial_height,
            idle: CancelToken::new(),
            best: None,
        };

        // Individual 0 is the classic heuristic: tallest first, near-square box.
        let mut population = Vec::with_capacity(self.population);
        population.push(Chromosome::new(
            HeightWidthDescending.order(&rects),
            square_width_index(&widths, &rects),
        ));
        while population.len() < self.population {
            population.push(Chromosome::random(rects.len(), widths.len(), &mut rng));
        }
        for individual in population.iter_mut() {
            search.evaluate(individual)?;
        }
        population.sort_by_key(|c| c.fitness);

        let generations = self.iterations as usize;
        for generation in 0..generations {
            if cancel.is_cancelled() {
                debug!(generation, progress = self.progress.get(), "search cancelled");
                break;
            }

            let mut next = Vec::with_capacity(self.population);
            next.push(population[0].clone());
            while next.len() < self.population {
                let a = tournament(&population, self.tournament_size, &mut rng);
                let b = tournament(&population, self.tournament_size, &mut rng);
                let mut child = if rng.gen_bool(self.crossover_rate) {
                    a.order_crossover(b, &mut rng)
                } else {
                    a.clone()
                };
                if rng.gen_bool(self.mutation_rate) {
                    child.mutate(widths.len(), &mut rng);
                }
                if child.fitness == i64::MAX {
                    search.evaluate(&mut child)?;
                }
                next.push(child);
            }
            next.sort_by_key(|c| c.fitness);
            population = next;

            trace!(generation, best = population[0].fitness, "generation done");
            self.progress.report_fraction(generation + 1, generations);
        }
        if generations == 0 {
            self.progress.report(100);
        }

        let layout = match search.best.take() {
            Some(best) => best,
            None => {
                debug!("no trial width admitted the rectangles, stacking in a column");
                column(&rects)
            }
        };
        let (width, height) = layout.bounds();
        let mut out: Vec<Frame<K>> = layout
            .frames
            .into_iter()
            .map(|f| Frame::new(placeable[f.key].key.clone(), f.rect))
            .collect();
        out.extend(degenerate);
        debug!(width, height, "search finished");
        Ok(PackingResult::new(width, height, out))
    }
}

/// Per-call evaluation state.
struct Search<'a> {
    algorithm: &'a mut (dyn PlacementAlgorithm<usize> + Send),
    rects: &'a [Rect],
    widths: &'a [i32],
    trial_height: i32,
    idle: CancelToken,
    best: Option<PackingResult<usize>>,
}

impl Search<'_> {
    /// Decodes `individual` through the inner algorithm, stores its fitness and
    /// keeps the layout if it beats the best one seen.
    fn evaluate(&mut self, individual: &mut Chromosome) -> Result<()> {
        let frames: Vec<Frame<usize>> = individual
            .order
            .iter()
            .map(|&i| Frame::new(i, self.rects[i]))
            .collect();
        let width = self.widths[individual.width_idx];
        let placed = self
            .algorithm
            .place(width, self.trial_height, &frames, &self.idle)?;

        individual.fitness = match placed {
            Some(result) => {
                let (w, h) = result.bounds();
                let area = w as i64 * h as i64;
                let best_area = self.best.as_ref().map_or(i64::MAX, |b| {
                    let (bw, bh) = b.bounds();
                    bw as i64 * bh as i64
                });
                if area < best_area {
                    trace!(width, area, "new best layout");
                    self.best = Some(result);
                }
                area
            }
            None => i64::MAX,
        };
        Ok(())
    }
}

/// Lowest fitness among `size` random picks.
fn tournament<'p, R: Rng>(population: &'p [Chromosome], size: usize, rng: &mut R) -> &'p Chromosome {
    let mut best = rng.gen_range(0..population.len());
    for _ in 1..size {
        let idx = rng.gen_range(0..population.len());
        if population[idx].fitness < population[best].fitness {
            best = idx;
        }
    }
    &population[best]
}

/// All rectangles stacked top to bottom at x = 0.
fn column(rects: &[Rect]) -> PackingResult<usize> {
    let mut y = 0;
    let mut width = 0;
    let frames = rects
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let placed = Rect::from_edges(0, y, r.width(), y.saturating_add(r.height()));
            y = placed.bottom;
            width = width.max(r.width());
            Frame::new(i, placed)
        })
        .collect();
    PackingResult::new(width, y, frames)
}
