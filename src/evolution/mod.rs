pub mod ranking;

use crate::config::GaConfig;
use log::{debug, info, warn};
use rand::prelude::*;
use rand::rng;
use rand::rngs::StdRng;
use ranking::{Objectives, Ranking, NUM_OBJECTIVES};

/// Alias within crate for genome representation: the iteration budget
pub type Genome = u32;

/// This struct represents a candidate iteration budget together with how it scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// The tunable trait, always inside `[min_iterations, max_iterations]`
    pub genome: Genome,
    /// Normalized objectives `[fps_error, cost_ms, -boundary, -density]`, lower is better.
    /// All zeros until the slot is evaluated, and inherited from the parent (stale) after `evolve`.
    pub objectives: Objectives,
    /// Front index from the last ranking pass, 0 being the Pareto front
    pub rank: usize,
    /// Crowding distance from the last ranking pass, may be infinite
    pub crowding_distance: f64,
}

impl Individual {
    fn new(genome: Genome) -> Self {
        Self {
            genome,
            objectives: [0.0; NUM_OBJECTIVES],
            rank: 0,
            crowding_distance: 0.0,
        }
    }

    /// Objectives back in their measured polarity:
    /// `[fps_error, cost_ms, boundary, density]`
    pub fn raw_objectives(&self) -> [f64; NUM_OBJECTIVES] {
        [
            self.objectives[0],
            self.objectives[1],
            -self.objectives[2],
            -self.objectives[3],
        ]
    }
}

/// Where the evaluation cursor stands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CursorState {
    /// The slot is handed out to the host and no fitness has arrived yet
    AwaitingFitness(usize),
    /// Fitness for the slot is stored, the host should advance next
    Idle(usize),
}

impl CursorState {
    pub fn slot(&self) -> usize {
        match *self {
            CursorState::AwaitingFitness(slot) | CursorState::Idle(slot) => slot,
        }
    }
}

/// Steady, frame-driven NSGA-style optimizer over a single integer trait.
///
/// The host drives it one evaluation at a time: read `current_individual`,
/// measure it, hand the numbers to `record_fitness`, then `advance_cursor`.
/// When the cursor wraps the whole population has been measured and the host
/// calls `evolve` to replace it with mutated tournament winners.
///
/// Replacement is generational and non-elitist: parents and children are never
/// merged, the children simply take over.
#[derive(Clone)]
pub struct MultiObjectiveOptimizer<'a, R: Rng = StdRng> {
    /// This is a reference to the user-defined config for a given tuning run
    config: &'a GaConfig,
    /// Owned population, replaced wholesale on every `evolve`
    population: Vec<Individual>,
    /// Evaluation cursor over `population`
    cursor: CursorState,
    /// Number of completed `evolve` calls
    generation: usize,
    /// Single random source for initialization, selection and mutation
    rng: R,
}

impl<'a> MultiObjectiveOptimizer<'a, StdRng> {
    /// Creates an optimizer with a `StdRng`, seeded from `config.seed` when present
    /// and from the thread generator otherwise.
    ///
    /// # Arguments
    /// * `config` - Reference to a validated `GaConfig`
    ///
    /// # Returns
    /// * `Self` - An optimizer holding a random initial population
    pub fn new(config: &'a GaConfig) -> Self {
        let source = match config.seed {
            Some(seed) => {
                info!("Seeding optimizer with {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_rng(&mut rng()),
        };
        Self::with_rng(config, source)
    }
}

impl<'a, R: Rng> MultiObjectiveOptimizer<'a, R> {
    /// Creates an optimizer drawing every random decision from `rng`.
    ///
    /// # Panics
    /// If `population_size` is zero or `min_iterations > max_iterations`.
    /// `Config::validate` rejects both.
    pub fn with_rng(config: &'a GaConfig, rng: R) -> Self {
        assert!(config.population_size > 0, "population_size must be positive");
        assert!(
            config.min_iterations <= config.max_iterations,
            "min_iterations must not exceed max_iterations"
        );

        let mut optimizer = Self {
            config,
            population: Vec::with_capacity(config.population_size),
            cursor: CursorState::AwaitingFitness(0),
            generation: 0,
            rng,
        };
        optimizer.initialize_population();
        optimizer
    }

    /// Draws every genome independently and uniformly from the configured bounds.
    fn initialize_population(&mut self) {
        info!(
            "Initializing population of size {} in [{}, {}]...",
            self.config.population_size, self.config.min_iterations, self.config.max_iterations
        );
        let (lo, hi) = (self.config.min_iterations, self.config.max_iterations);
        self.population = (0..self.config.population_size)
            .map(|_| Individual::new(self.rng.random_range(lo..=hi)))
            .collect();
    }

    /// The individual under the cursor, whose genome the host should evaluate next.
    pub fn current_individual(&self) -> &Individual {
        &self.population[self.cursor.slot()]
    }

    /// Stores the four raw measurements of the current individual.
    ///
    /// The detail and variance metrics are negated so every objective is minimized.
    /// Only the slot under the cursor can ever be written.
    ///
    /// # Arguments
    /// * `fps_error` - Distance between achieved and target frame rate
    /// * `cost_ms` - Measured evaluation cost
    /// * `boundary` - Structural detail, higher is better
    /// * `density` - Tonal variance, higher is better
    pub fn record_fitness(&mut self, fps_error: f64, cost_ms: f64, boundary: f64, density: f64) {
        let slot = self.cursor.slot();
        if let CursorState::Idle(_) = self.cursor {
            debug!("Slot {} evaluated twice in generation {}", slot, self.generation);
        }
        self.population[slot].objectives = [fps_error, cost_ms, -boundary, -density];
        self.cursor = CursorState::Idle(slot);
    }

    /// Moves the cursor to the next slot, wrapping to 0.
    ///
    /// # Returns
    /// * `bool` - `true` when the cursor wrapped, i.e. the whole population was traversed
    pub fn advance_cursor(&mut self) -> bool {
        let slot = self.cursor.slot();
        if let CursorState::AwaitingFitness(_) = self.cursor {
            warn!("Advancing past slot {} without a recorded fitness", slot);
        }
        let next = slot + 1;
        if next == self.population.len() {
            self.cursor = CursorState::AwaitingFitness(0);
            true
        } else {
            self.cursor = CursorState::AwaitingFitness(next);
            false
        }
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Recomputes ranks and crowding distances from scratch and stores them on
    /// the individuals.
    ///
    /// # Returns
    /// * `Ranking` - The fronts and the per-slot metadata that was written back
    pub fn recalc_ranks(&mut self) -> Ranking {
        let objectives: Vec<Objectives> =
            self.population.iter().map(|ind| ind.objectives).collect();
        let ranking = ranking::rank(&objectives);
        for (individual, info) in self.population.iter_mut().zip(&ranking.info) {
            individual.rank = info.rank;
            individual.crowding_distance = info.crowding_distance;
        }
        debug!(
            "Ranked generation {}: {} fronts, front sizes {:?}",
            self.generation,
            ranking.fronts.len(),
            ranking.fronts.iter().map(Vec::len).collect::<Vec<_>>()
        );
        ranking
    }

    /// Rank-0 individuals with their slot index, as of the last `recalc_ranks`.
    pub fn pareto_front(&self) -> Vec<(usize, &Individual)> {
        self.population
            .iter()
            .enumerate()
            .filter(|(_, ind)| ind.rank == 0)
            .collect()
    }

    /// The individual with the lowest frame-rate error, first one on ties.
    ///
    /// Only meaningful once the population has been evaluated; before that every
    /// objective is zero and slot 0 is returned.
    pub fn best(&self) -> &Individual {
        let mut best = &self.population[0];
        for candidate in &self.population[1..] {
            if candidate.objectives[0] < best.objectives[0] {
                best = candidate;
            }
        }
        best
    }

    /// Produces the next generation.
    ///
    /// Ranks the current population, then fills every slot with a copy of a
    /// binary tournament winner whose genome is perturbed with probability
    /// `mutation_probability`. The old population is dropped entirely.
    pub fn evolve(&mut self) {
        let ranking = self.recalc_ranks();

        let mut next_generation = Vec::with_capacity(self.population.len());
        let mut mutated = 0;
        for _ in 0..self.population.len() {
            let mut child = self.tournament();
            if self.rng.random::<f64>() < self.config.mutation_probability {
                child.genome = self.mutate(child.genome);
                mutated += 1;
            }
            next_generation.push(child);
        }

        info!(
            "Evolved generation {}: Pareto front size={} | Fronts={} | Mutated children={}/{}",
            self.generation + 1,
            ranking.fronts.first().map_or(0, Vec::len),
            ranking.fronts.len(),
            mutated,
            next_generation.len()
        );

        self.population = next_generation;
        self.generation += 1;
        self.cursor = CursorState::AwaitingFitness(self.cursor.slot());
    }

    /// Binary tournament with replacement: lower rank wins, then larger crowding
    /// distance, then the first contestant drawn.
    fn tournament(&mut self) -> Individual {
        let n = self.population.len();
        let first = self.rng.random_range(0..n);
        let second = self.rng.random_range(0..n);
        tournament_winner(&self.population[first], &self.population[second]).clone()
    }

    /// Adds a uniform step from `[-mutation_delta, mutation_delta]` and clamps
    /// the result back into the genome bounds.
    fn mutate(&mut self, genome: Genome) -> Genome {
        let delta = i64::from(self.config.mutation_delta);
        let step = self.rng.random_range(-delta..=delta);
        let mutated = clamp_genome(
            i64::from(genome) + step,
            self.config.min_iterations,
            self.config.max_iterations,
        );
        debug!("Mutated genome {} by {} -> {}", genome, step, mutated);
        mutated
    }
}

/// Crowded comparison between two contestants, `a` wins full ties.
fn tournament_winner<'p>(a: &'p Individual, b: &'p Individual) -> &'p Individual {
    if b.rank < a.rank || (b.rank == a.rank && b.crowding_distance > a.crowding_distance) {
        b
    } else {
        a
    }
}

/// Clamps a widened genome into `[lo, hi]`.
fn clamp_genome(value: i64, lo: Genome, hi: Genome) -> Genome {
    value.clamp(i64::from(lo), i64::from(hi)) as Genome
}
