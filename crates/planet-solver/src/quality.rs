use crate::constraint::Edge;
use crate::placement::Placement;

/// Mean absolute deviation between the placement's distances and the measured
/// ones. Lower is better; zero is a perfect fit.
pub fn score(placement: &Placement, edges: &[Edge]) -> f64 {
    if edges.is_empty() {
        return 0.0;
    }
    let total: f64 = edges.iter().map(|e| deviation(placement, e)).sum();
    total / edges.len() as f64
}

/// The constraint that fits worst, as `(index, deviation)`.
pub fn worst(placement: &Placement, edges: &[Edge]) -> Option<(usize, f64)> {
    edges
        .iter()
        .map(|e| deviation(placement, e))
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

fn deviation(placement: &Placement, edge: &Edge) -> f64 {
    (placement.distance(edge.a, edge.b) - edge.distance).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Constraint, ConstraintSet};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn right_triangle() -> (ConstraintSet, Placement) {
        let set = ConstraintSet::new(vec![
            Constraint::new("A", "B", 3.0),
            Constraint::new("B", "C", 4.0),
            Constraint::new("A", "C", 6.0),
        ])
        .unwrap();
        let p = Placement::from_set(
            &set,
            vec![
                Vector3::zeros(),
                Vector3::new(3.0, 0.0, 0.0),
                Vector3::new(3.0, 4.0, 0.0),
            ],
        );
        (set, p)
    }

    #[test]
    fn test_score_is_mean_absolute_error() {
        let (set, p) = right_triangle();
        // Only A-C is off, by 1.
        assert_relative_eq!(score(&p, set.edges()), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_worst_constraint() {
        let (set, p) = right_triangle();
        let (index, dev) = worst(&p, set.edges()).unwrap();
        assert_eq!(index, 2);
        assert_relative_eq!(dev, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_constraints_scores_zero() {
        let (_, p) = right_triangle();
        assert_eq!(score(&p, &[]), 0.0);
        assert_eq!(worst(&p, &[]), None);
    }

    #[test]
    fn test_score_scales_linearly() {
        let (set, p) = right_triangle();
        let base = score(&p, set.edges());
        for factor in [0.5, 2.0, 10.0] {
            let scaled_edges: Vec<Edge> = set
                .edges()
                .iter()
                .map(|e| Edge {
                    distance: e.distance * factor,
                    ..*e
                })
                .collect();
            let scaled = p.map(|v| v * factor);
            assert_relative_eq!(score(&scaled, &scaled_edges), base * factor, epsilon = 1e-9);
        }
    }
}
