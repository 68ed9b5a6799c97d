//! Repeated relaxation attempts, collecting distinct canonical solutions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::align::{AlignConfig, AlignError, CanonicalAligner};
use crate::constraint::ConstraintSet;
use crate::graph::ConstraintGraph;
use crate::progress::ProgressSink;
use crate::quality;
use crate::registry::{Solution, SolutionRegistry};
use crate::relax::{RelaxError, RelaxationConfig, RelaxationSolver};

/// When to stop searching. All limits unset searches forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopPolicy {
    pub max_attempts: Option<u64>,
    pub max_solutions: Option<usize>,
    pub max_duration: Option<Duration>,
}

impl StopPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn attempts(max_attempts: u64) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            ..Self::default()
        }
    }

    fn reached(&self, attempts: u64, solutions: usize, elapsed: Duration) -> bool {
        self.max_attempts.is_some_and(|m| attempts >= m)
            || self.max_solutions.is_some_and(|m| solutions >= m)
            || self.max_duration.is_some_and(|m| elapsed >= m)
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub relaxation: RelaxationConfig,
    pub align: AlignConfig,
    /// Per-point distance under which two canonical placements are the same.
    pub duplicate_tolerance: f64,
    pub stop: StopPolicy,
    /// Master seed. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            relaxation: RelaxationConfig::default(),
            align: AlignConfig::default(),
            duplicate_tolerance: 1e-3,
            stop: StopPolicy::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("need at least three points to search, got {count}")]
    TooFewPoints { count: usize },
    #[error("alignment failed on attempt {attempt}: {source}")]
    Align {
        attempt: u64,
        #[source]
        source: AlignError,
    },
}

/// Receives every accepted solution.
pub trait SolutionSink {
    fn solution(&mut self, solution: &Solution);
}

impl<F: FnMut(&Solution)> SolutionSink for F {
    fn solution(&mut self, solution: &Solution) {
        self(solution)
    }
}

#[derive(Debug, Clone)]
pub struct SearchSummary {
    pub attempts: u64,
    pub duplicates: u64,
    /// Attempts abandoned at the relaxation cycle limit.
    pub failed: u64,
    pub solutions: Vec<Solution>,
    pub elapsed: Duration,
}

/// What happened to a single attempt.
#[derive(Debug, Clone)]
pub enum Attempt {
    Accepted(Solution),
    Duplicate,
    Abandoned(RelaxError),
}

pub struct SearchLoop {
    set: ConstraintSet,
    graph: ConstraintGraph,
    names: Arc<[String]>,
    solver: RelaxationSolver,
    aligner: CanonicalAligner,
    registry: SolutionRegistry,
    stop: StopPolicy,
    rng: StdRng,
}

impl SearchLoop {
    pub fn new(set: ConstraintSet, config: SearchConfig) -> Result<Self, SearchError> {
        if set.len_points() < 3 {
            return Err(SearchError::TooFewPoints {
                count: set.len_points(),
            });
        }
        let graph = ConstraintGraph::build(&set);
        for id in graph.isolated_points() {
            warn!(point = set.name(id), "point has no constraints and will float freely");
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            names: set.names().into(),
            graph,
            set,
            solver: RelaxationSolver::new(config.relaxation),
            aligner: CanonicalAligner::new(config.align),
            registry: SolutionRegistry::new(config.duplicate_tolerance),
            stop: config.stop,
            rng,
        })
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.set
    }

    pub fn registry(&self) -> &SolutionRegistry {
        &self.registry
    }

    /// Run one attempt: relax from a fresh seed, canonicalize, deduplicate, score.
    pub fn attempt(
        &mut self,
        attempt: u64,
        progress: &mut dyn ProgressSink,
    ) -> Result<Attempt, SearchError> {
        let seed: u64 = self.rng.gen();
        let mut rng = StdRng::seed_from_u64(seed);
        debug!(attempt, seed, "starting attempt");

        let relaxed = match self.solver.solve(
            &self.graph,
            Arc::clone(&self.names),
            &mut rng,
            attempt,
            progress,
        ) {
            Ok(r) => r,
            Err(e) => return Ok(Attempt::Abandoned(e)),
        };

        let canonical = self
            .aligner
            .canonicalize(&relaxed.placement)
            .map_err(|source| SearchError::Align { attempt, source })?;

        if self.registry.is_duplicate(&canonical.placement) {
            return Ok(Attempt::Duplicate);
        }

        let solution = Solution {
            sequence: self.registry.next_sequence(),
            quality: quality::score(&canonical.placement, self.set.edges()),
            flatness: canonical.flatness,
            reference: canonical.reference,
            attempt,
            cycles: relaxed.cycles,
            placement: canonical.placement,
        };
        Ok(Attempt::Accepted(self.registry.accept(solution).clone()))
    }

    /// Search until the stop policy is met. An alignment failure ends the
    /// whole search.
    #[instrument(
        skip_all,
        fields(points = self.set.len_points(), constraints = self.set.constraints().len())
    )]
    pub fn run(
        mut self,
        progress: &mut dyn ProgressSink,
        results: &mut dyn SolutionSink,
    ) -> Result<SearchSummary, SearchError> {
        let started = Instant::now();
        let mut attempts = 0;
        let mut duplicates = 0;
        let mut failed = 0;

        while !self
            .stop
            .reached(attempts, self.registry.len(), started.elapsed())
        {
            attempts += 1;
            match self.attempt(attempts, progress)? {
                Attempt::Accepted(solution) => {
                    info!(
                        sequence = solution.sequence,
                        attempt = attempts,
                        quality = solution.quality,
                        "new solution"
                    );
                    results.solution(&solution);
                }
                Attempt::Duplicate => {
                    duplicates += 1;
                    debug!(attempt = attempts, "duplicate solution discarded");
                }
                Attempt::Abandoned(e) => {
                    failed += 1;
                    warn!(attempt = attempts, error = %e, "attempt abandoned");
                }
            }
        }

        let summary = SearchSummary {
            attempts,
            duplicates,
            failed,
            elapsed: started.elapsed(),
            solutions: self.registry.into_solutions(),
        };
        info!(
            attempts,
            duplicates,
            failed,
            solutions = summary.solutions.len(),
            "search finished"
        );
        Ok(summary)
    }
}
