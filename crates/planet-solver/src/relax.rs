//! Force relaxation of a random placement toward the measured distances.
//!
//! Every constraint acts as a spring between its endpoints. Each micro-step
//! moves every point along its resultant force, clamped to a small maximum
//! length so the placement drifts smoothly instead of oscillating. After each
//! macro-cycle the placement is compared with its state at the start of the
//! cycle; once no point moved further than the convergence threshold the run
//! is over.

use std::sync::Arc;
use std::time::Duration;

use nalgebra::Vector3;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::graph::ConstraintGraph;
use crate::placement::Placement;
use crate::progress::{Progress, ProgressSink, Throttle};

/// Configuration for the relaxation solver.
#[derive(Debug, Clone)]
pub struct RelaxationConfig {
    /// Micro-steps per macro-cycle.
    pub steps_per_cycle: usize,
    /// Maximum distance a point may move in one micro-step.
    pub max_step: f64,
    /// A cycle in which no point moved further than this ends the run.
    pub convergence_threshold: f64,
    /// Give up after this many cycles. `None` relaxes until convergence.
    pub max_cycles: Option<usize>,
    /// Minimum time between two progress updates.
    pub progress_interval: Duration,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            steps_per_cycle: 100,
            max_step: 1e-4,
            convergence_threshold: 5e-4,
            max_cycles: None,
            progress_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelaxError {
    #[error("placement still moving after {cycles} cycles (max force: {max_force})")]
    CycleLimit { cycles: usize, max_force: f64 },
}

/// A converged placement and how long it took to get there.
#[derive(Debug, Clone)]
pub struct Relaxation {
    pub placement: Placement,
    pub cycles: usize,
    /// Largest force magnitude in the final micro-step.
    pub max_force: f64,
}

/// Resultant spring force on every point.
///
/// For each incident constraint the point is pushed along the direction from
/// the other endpoint by `measured - current`. Coincident endpoints have no
/// direction and contribute nothing.
pub fn forces(graph: &ConstraintGraph, placement: &Placement) -> Vec<Vector3<f64>> {
    (0..graph.len())
        .map(|id| {
            let here = placement.location(id);
            graph
                .incident(id)
                .iter()
                .fold(Vector3::zeros(), |acc, inc| {
                    let offset = here - placement.location(inc.other);
                    let current = offset.norm();
                    if current == 0.0 {
                        return acc;
                    }
                    acc + offset * ((inc.distance - current) / current)
                })
        })
        .collect()
}

/// Clamp `force` to at most `max_len`, keeping its direction.
pub fn clamp_force(force: Vector3<f64>, max_len: f64) -> Vector3<f64> {
    let len = force.norm();
    if len > max_len {
        force * (max_len / len)
    } else {
        force
    }
}

/// One micro-step: returns the moved placement and the largest unclamped
/// force magnitude.
pub fn step(graph: &ConstraintGraph, placement: &Placement, max_step: f64) -> (Placement, f64) {
    let forces = forces(graph, placement);
    let max_force = forces.iter().map(|f| f.norm()).fold(0.0, f64::max);
    let locations = placement
        .locations()
        .iter()
        .zip(&forces)
        .map(|(loc, f)| loc + clamp_force(*f, max_step))
        .collect();
    (
        Placement::new(Arc::clone(placement.names()), locations),
        max_force,
    )
}

/// Moves points until the constraint forces balance.
#[derive(Debug, Clone, Default)]
pub struct RelaxationSolver {
    config: RelaxationConfig,
}

impl RelaxationSolver {
    pub fn new(config: RelaxationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelaxationConfig {
        &self.config
    }

    /// Relax a fresh random placement drawn from `rng`.
    pub fn solve(
        &self,
        graph: &ConstraintGraph,
        names: Arc<[String]>,
        rng: &mut impl Rng,
        attempt: u64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Relaxation, RelaxError> {
        let start = Placement::random(names, rng);
        self.relax(graph, start, attempt, sink)
    }

    /// Relax from a given starting placement.
    #[instrument(skip_all, fields(attempt = attempt, points = start.len()))]
    pub fn relax(
        &self,
        graph: &ConstraintGraph,
        start: Placement,
        attempt: u64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Relaxation, RelaxError> {
        let mut throttle = Throttle::new(self.config.progress_interval);
        let mut placement = start;
        let mut cycles = 0;
        let mut max_force = 0.0;

        loop {
            let cycle_start = placement.clone();
            for _ in 0..self.config.steps_per_cycle {
                let (next, force) = step(graph, &placement, self.config.max_step);
                placement = next;
                max_force = force;
            }
            cycles += 1;

            let moved = placement.max_displacement(&cycle_start);
            let converged = moved <= self.config.convergence_threshold;
            trace!(cycles, moved, max_force, "relaxation cycle");

            if converged || throttle.ready() {
                sink.progress(&Progress {
                    attempt,
                    cycle: cycles,
                    max_force,
                });
            }

            if converged {
                debug!(cycles, max_force, "relaxation converged");
                return Ok(Relaxation {
                    placement,
                    cycles,
                    max_force,
                });
            }

            if let Some(limit) = self.config.max_cycles {
                if cycles >= limit {
                    return Err(RelaxError::CycleLimit { cycles, max_force });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Constraint, ConstraintSet};
    use crate::progress::NoProgress;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pair(distance: f64) -> (ConstraintSet, ConstraintGraph) {
        let set = ConstraintSet::new(vec![Constraint::new("A", "B", distance)]).unwrap();
        let graph = ConstraintGraph::build(&set);
        (set, graph)
    }

    #[test]
    fn test_force_pulls_when_too_far() {
        let (set, graph) = pair(1.0);
        let p = Placement::from_set(&set, vec![Vector3::zeros(), Vector3::new(3.0, 0.0, 0.0)]);
        let f = forces(&graph, &p);
        assert_relative_eq!(f[0], Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(f[1], Vector3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_force_pushes_when_too_close() {
        let (set, graph) = pair(2.0);
        let p = Placement::from_set(&set, vec![Vector3::zeros(), Vector3::new(0.0, 0.5, 0.0)]);
        let f = forces(&graph, &p);
        assert_relative_eq!(f[1], Vector3::new(0.0, 1.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_force_at_target_distance() {
        let (set, graph) = pair(1.0);
        let p = Placement::from_set(&set, vec![Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0)]);
        let f = forces(&graph, &p);
        assert_relative_eq!(f[0].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_coincident_points_have_no_force() {
        let (set, graph) = pair(1.0);
        let loc = Vector3::new(0.3, 0.3, 0.3);
        let p = Placement::from_set(&set, vec![loc, loc]);
        let f = forces(&graph, &p);
        assert_eq!(f[0], Vector3::zeros());
        assert_eq!(f[1], Vector3::zeros());
    }

    #[test]
    fn test_step_is_clamped() {
        let (set, graph) = pair(1.0);
        let p = Placement::from_set(&set, vec![Vector3::zeros(), Vector3::new(5.0, 0.0, 0.0)]);
        let (next, max_force) = step(&graph, &p, 1e-4);
        assert_relative_eq!(max_force, 4.0, epsilon = 1e-12);
        assert_relative_eq!(next.location(0), Vector3::new(1e-4, 0.0, 0.0), epsilon = 1e-15);
        assert_relative_eq!(
            next.location(1),
            Vector3::new(5.0 - 1e-4, 0.0, 0.0),
            epsilon = 1e-12
        );
        // Input untouched.
        assert_eq!(p.location(0), Vector3::zeros());
    }

    #[test]
    fn test_clamp_preserves_direction() {
        let f = clamp_force(Vector3::new(3.0, 4.0, 0.0), 0.5);
        assert_relative_eq!(f, Vector3::new(0.3, 0.4, 0.0), epsilon = 1e-12);
        let small = Vector3::new(1e-5, 0.0, 0.0);
        assert_eq!(clamp_force(small, 1e-4), small);
    }

    #[test]
    fn test_pair_converges_to_distance() {
        let (set, graph) = pair(0.5);
        let solver = RelaxationSolver::default();
        let mut rng = StdRng::seed_from_u64(11);
        let result = solver
            .solve(&graph, set.names().into(), &mut rng, 1, &mut NoProgress)
            .unwrap();
        assert!((result.placement.distance(0, 1) - 0.5).abs() < 0.01);
        assert!(result.cycles > 0);
    }

    #[test]
    fn test_cycle_limit() {
        let (set, graph) = pair(1.0);
        let solver = RelaxationSolver::new(RelaxationConfig {
            max_cycles: Some(2),
            ..RelaxationConfig::default()
        });
        let start =
            Placement::from_set(&set, vec![Vector3::zeros(), Vector3::new(50.0, 0.0, 0.0)]);
        let err = solver.relax(&graph, start, 1, &mut NoProgress).unwrap_err();
        assert!(matches!(err, RelaxError::CycleLimit { cycles: 2, .. }));
    }

    #[test]
    fn test_final_cycle_always_reported() {
        let (set, graph) = pair(1.0);
        let solver = RelaxationSolver::new(RelaxationConfig {
            progress_interval: Duration::from_secs(3600),
            ..RelaxationConfig::default()
        });
        let start = Placement::from_set(&set, vec![Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)]);
        let mut seen = Vec::new();
        let mut sink = |p: &Progress| seen.push(p.cycle);
        let result = solver.relax(&graph, start, 1, &mut sink).unwrap();
        assert_eq!(result.cycles, 1);
        assert_eq!(seen, vec![1]);
    }
}
