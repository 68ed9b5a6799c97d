use crate::constraint::{ConstraintSet, PointId};

/// One constraint seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Incident {
    pub other: PointId,
    pub distance: f64,
}

/// Per-point adjacency view of a [`ConstraintSet`].
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    adjacency: Vec<Vec<Incident>>,
}

impl ConstraintGraph {
    /// Every constraint is listed under both of its endpoints.
    pub fn build(set: &ConstraintSet) -> Self {
        let mut adjacency = vec![Vec::new(); set.len_points()];
        for edge in set.edges() {
            adjacency[edge.a].push(Incident {
                other: edge.b,
                distance: edge.distance,
            });
            adjacency[edge.b].push(Incident {
                other: edge.a,
                distance: edge.distance,
            });
        }
        Self { adjacency }
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn incident(&self, id: PointId) -> &[Incident] {
        &self.adjacency[id]
    }

    pub fn degree(&self, id: PointId) -> usize {
        self.adjacency[id].len()
    }

    /// Points with no constraints at all. They never feel a force.
    pub fn isolated_points(&self) -> Vec<PointId> {
        (0..self.len()).filter(|&id| self.degree(id) == 0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;

    #[test]
    fn test_incident_lists_are_symmetric() {
        let set = ConstraintSet::new(vec![
            Constraint::new("A", "B", 1.0),
            Constraint::new("B", "C", 2.0),
        ])
        .unwrap();
        let graph = ConstraintGraph::build(&set);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.degree(0), 1);
        assert_eq!(graph.degree(1), 2);
        assert_eq!(
            graph.incident(2),
            &[Incident {
                other: 1,
                distance: 2.0
            }]
        );
        assert!(graph.isolated_points().is_empty());
    }

    #[test]
    fn test_repeated_constraints_contribute_separately() {
        let set = ConstraintSet::new(vec![
            Constraint::new("A", "B", 1.0),
            Constraint::new("A", "B", 3.0),
        ])
        .unwrap();
        let graph = ConstraintGraph::build(&set);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(1), 2);
    }

    #[test]
    fn test_isolated_points() {
        let set = ConstraintSet::with_points(
            vec!["A".into(), "B".into(), "Lonely".into()],
            vec![Constraint::new("A", "B", 1.0)],
        )
        .unwrap();
        let graph = ConstraintGraph::build(&set);
        assert_eq!(graph.isolated_points(), vec![2]);
    }
}
