//! Plain-text reports written to stdout.
//!
//! Coordinates are rounded for display only; the search itself always works
//! at full precision.

use std::fmt;
use std::io::Write;

use planet_solver::{
    quality, ConstraintGraph, ConstraintSet, Progress, ProgressSink, SearchSummary, Solution,
    SolutionSink,
};
use tracing::warn;

/// Text block describing one accepted solution.
pub struct SolutionReport<'a> {
    pub solution: &'a Solution,
    pub set: &'a ConstraintSet,
    pub precision: usize,
}

impl SolutionReport<'_> {
    pub fn to_text(&self) -> String {
        let s = self.solution;
        let p = self.precision;
        let mut out = String::new();

        let [r1, r2, r3] = s.reference;
        out.push_str(&format!(
            "=== Solution {} (attempt {}, {} cycles) ===\n",
            s.sequence, s.attempt, s.cycles,
        ));
        out.push_str(&format!(
            "Quality: {:.6}   Flatness: {:.6}\n",
            s.quality, s.flatness,
        ));
        out.push_str(&format!(
            "Reference: {}, {}, {}\n",
            s.placement.name(r1),
            s.placement.name(r2),
            s.placement.name(r3),
        ));

        let width = s.placement.names().iter().map(|n| n.len()).max().unwrap_or(0);
        for (name, loc) in s.placement.iter() {
            out.push_str(&format!(
                "  {:<width$}  {:>w$.p$} {:>w$.p$} {:>w$.p$}\n",
                name,
                round(loc.x, p),
                round(loc.y, p),
                round(loc.z, p),
                width = width,
                w = p + 5,
                p = p,
            ));
        }

        if let Some((index, deviation)) = quality::worst(&s.placement, self.set.edges()) {
            let c = &self.set.constraints()[index];
            out.push_str(&format!(
                "Worst fit: {}-{} off by {:.p$} (measured {:.p$})\n",
                c.point_a,
                c.point_b,
                deviation,
                c.distance,
                p = p.max(2),
            ));
        }
        out
    }
}

impl fmt::Display for SolutionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Round half away from zero, dropping negative zero so `-0.00` prints as `0.00`.
fn round(value: f64, precision: usize) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let r = (value * scale).round() / scale;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Summary of a dataset for the `check` command.
pub struct DatasetReport<'a> {
    pub set: &'a ConstraintSet,
}

impl DatasetReport<'_> {
    pub fn to_text(&self) -> String {
        let graph = ConstraintGraph::build(self.set);
        let mut out = String::new();
        out.push_str(&format!(
            "Dataset: {} planets, {} distances\n",
            self.set.len_points(),
            self.set.constraints().len(),
        ));
        for (id, name) in self.set.names().iter().enumerate() {
            out.push_str(&format!("  {}: {} distances\n", name, graph.degree(id)));
        }
        let isolated = graph.isolated_points();
        if isolated.is_empty() {
            out.push_str("Isolated: none\n");
        } else {
            let names: Vec<&str> = isolated.iter().map(|&id| self.set.name(id)).collect();
            out.push_str(&format!("Isolated: {}\n", names.join(", ")));
        }
        out
    }
}

impl fmt::Display for DatasetReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

pub fn summary_text(summary: &SearchSummary) -> String {
    format!(
        "Search finished: {} attempts, {} solutions, {} duplicates, {} abandoned in {:.1?}\n",
        summary.attempts,
        summary.solutions.len(),
        summary.duplicates,
        summary.failed,
        summary.elapsed,
    )
}

/// Writes solutions to `out` as they are found.
pub struct ConsoleReporter<'a, W: Write> {
    out: W,
    set: &'a ConstraintSet,
    precision: usize,
}

impl<'a, W: Write> ConsoleReporter<'a, W> {
    pub fn new(out: W, set: &'a ConstraintSet, precision: usize) -> Self {
        Self {
            out,
            set,
            precision,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SolutionSink for ConsoleReporter<'_, W> {
    fn solution(&mut self, solution: &Solution) {
        let report = SolutionReport {
            solution,
            set: self.set,
            precision: self.precision,
        };
        if let Err(e) = writeln!(self.out, "{report}").and_then(|_| self.out.flush()) {
            warn!(error = %e, "failed to write solution report");
        }
    }
}

/// Shows relaxation progress on stderr, overwriting one line.
pub struct ProgressLine {
    enabled: bool,
}

impl ProgressLine {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl ProgressSink for ProgressLine {
    fn progress(&mut self, update: &Progress) {
        if self.enabled {
            eprint!(
                "\rattempt {:>5}  cycle {:>7}  max force {:.6}   ",
                update.attempt, update.cycle, update.max_force
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use planet_solver::{Constraint, Placement};

    fn set() -> ConstraintSet {
        ConstraintSet::new(vec![
            Constraint::new("Earth", "Mars", 1.0),
            Constraint::new("Mars", "Venus", 1.0),
            Constraint::new("Earth", "Venus", 1.5),
        ])
        .unwrap()
    }

    fn solution(set: &ConstraintSet) -> Solution {
        let placement = Placement::from_set(
            set,
            vec![
                Vector3::zeros(),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(1.23456, 0.999, -0.0001),
            ],
        );
        Solution {
            sequence: 3,
            quality: 0.125,
            flatness: 0.0,
            reference: [0, 1, 2],
            attempt: 9,
            cycles: 120,
            placement,
        }
    }

    #[test]
    fn test_round_drops_negative_zero() {
        assert_eq!(round(-0.0001, 2), 0.0);
        assert!(round(-0.0001, 2).is_sign_positive());
        assert_eq!(round(1.235, 1), 1.2);
        assert_eq!(round(-1.26, 1), -1.3);
    }

    #[test]
    fn test_solution_report_rounds_coordinates() {
        let set = set();
        let s = solution(&set);
        let text = SolutionReport {
            solution: &s,
            set: &set,
            precision: 2,
        }
        .to_text();
        assert!(text.contains("=== Solution 3 (attempt 9, 120 cycles) ==="), "{text}");
        assert!(text.contains("Quality: 0.125000"), "{text}");
        assert!(text.contains("Reference: Earth, Mars, Venus"), "{text}");
        assert!(text.contains("1.23"), "{text}");
        assert!(text.contains("1.00"), "{text}");
        assert!(!text.contains("-0.00"), "{text}");
        assert!(text.contains("Worst fit: Earth-Venus"), "{text}");
    }

    #[test]
    fn test_reporting_leaves_solution_untouched() {
        let set = set();
        let s = solution(&set);
        let before = s.placement.clone();
        let mut reporter = ConsoleReporter::new(Vec::new(), &set, 2);
        reporter.solution(&s);
        assert_eq!(s.placement, before);
        let written = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(written.starts_with("=== Solution 3"));
    }

    #[test]
    fn test_dataset_report_lists_isolated() {
        let set = ConstraintSet::with_points(
            vec!["Sun".into(), "Earth".into(), "Pluto".into()],
            vec![Constraint::new("Sun", "Earth", 1.0)],
        )
        .unwrap();
        let text = DatasetReport { set: &set }.to_text();
        assert!(text.contains("Dataset: 3 planets, 1 distances"));
        assert!(text.contains("Sun: 1 distances"));
        assert!(text.contains("Isolated: Pluto"));
    }
}
