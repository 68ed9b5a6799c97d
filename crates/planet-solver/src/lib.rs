//! Infer 3D positions of named points from pairwise distance measurements.
//!
//! A [`SearchLoop`] repeatedly relaxes a random placement against the
//! constraints, aligns the result into a canonical frame and keeps every
//! placement it has not seen before, scored by how well it fits.

pub mod align;
pub mod constraint;
pub mod graph;
pub mod placement;
pub mod progress;
pub mod quality;
pub mod registry;
pub mod relax;
pub mod search;

pub use align::{AlignConfig, AlignError, Canonical, CanonicalAligner};
pub use constraint::{Constraint, ConstraintError, ConstraintSet, Edge, PointId};
pub use graph::{ConstraintGraph, Incident};
pub use placement::Placement;
pub use progress::{NoProgress, Progress, ProgressSink, Throttle};
pub use registry::{placements_match, Solution, SolutionRegistry};
pub use relax::{RelaxError, Relaxation, RelaxationConfig, RelaxationSolver};
pub use search::{
    Attempt, SearchConfig, SearchError, SearchLoop, SearchSummary, SolutionSink, StopPolicy,
};
