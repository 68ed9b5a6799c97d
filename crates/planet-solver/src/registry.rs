use crate::constraint::PointId;
use crate::placement::Placement;

/// An accepted, canonical, non-duplicate placement.
#[derive(Debug, Clone)]
pub struct Solution {
    /// 1-based discovery order.
    pub sequence: usize,
    pub quality: f64,
    pub flatness: f64,
    pub reference: [PointId; 3],
    /// Attempt that produced this solution.
    pub attempt: u64,
    /// Relaxation cycles that attempt needed.
    pub cycles: usize,
    pub placement: Placement,
}

/// True when every point of `a` lies within `tolerance` of the same point in `b`.
pub fn placements_match(a: &Placement, b: &Placement, tolerance: f64) -> bool {
    a.len() == b.len()
        && a
            .locations()
            .iter()
            .zip(b.locations())
            .all(|(p, q)| (p - q).norm() <= tolerance)
}

/// Append-only store of accepted solutions.
#[derive(Debug, Clone)]
pub struct SolutionRegistry {
    tolerance: f64,
    solutions: Vec<Solution>,
}

impl Default for SolutionRegistry {
    fn default() -> Self {
        Self::new(1e-3)
    }
}

impl SolutionRegistry {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            solutions: Vec::new(),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Whether `candidate` matches any accepted placement.
    pub fn is_duplicate(&self, candidate: &Placement) -> bool {
        self.solutions
            .iter()
            .any(|s| placements_match(candidate, &s.placement, self.tolerance))
    }

    /// Next sequence number to hand out.
    pub fn next_sequence(&self) -> usize {
        self.solutions.len() + 1
    }

    pub fn accept(&mut self, solution: Solution) -> &Solution {
        self.solutions.push(solution);
        &self.solutions[self.solutions.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// Accepted solutions in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter()
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }
}
