use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dense index of a point within a [`ConstraintSet`].
pub type PointId = usize;

/// A measured distance between two named points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(rename = "a")]
    pub point_a: String,
    #[serde(rename = "b")]
    pub point_b: String,
    pub distance: f64,
}

impl Constraint {
    pub fn new(point_a: impl Into<String>, point_b: impl Into<String>, distance: f64) -> Self {
        Self {
            point_a: point_a.into(),
            point_b: point_b.into(),
            distance,
        }
    }
}

/// A constraint with both endpoints resolved to point ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: PointId,
    pub b: PointId,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintError {
    #[error("constraint {index} relates {name} to itself")]
    SelfConstraint { index: usize, name: String },
    #[error("constraint {index} ({a}-{b}) has negative distance {distance}")]
    NegativeDistance {
        index: usize,
        a: String,
        b: String,
        distance: f64,
    },
    #[error("constraint {index} ({a}-{b}) has non-finite distance")]
    NonFiniteDistance { index: usize, a: String, b: String },
    #[error("constraint {index} references unknown point {name}")]
    UnknownPoint { index: usize, name: String },
    #[error("point {name} is listed more than once")]
    DuplicatePoint { name: String },
}

/// Immutable collection of distance constraints and the universe of point
/// names they mention.
///
/// Duplicate or contradictory records for the same pair are kept as separate
/// constraints.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    names: Vec<String>,
    index: HashMap<String, PointId>,
    constraints: Vec<Constraint>,
    edges: Vec<Edge>,
}

impl ConstraintSet {
    /// Build a set whose universe is every endpoint name, in first-appearance order.
    pub fn new(constraints: Vec<Constraint>) -> Result<Self, ConstraintError> {
        let mut names = Vec::new();
        let mut index = HashMap::new();
        for c in &constraints {
            for name in [&c.point_a, &c.point_b] {
                if !index.contains_key(name) {
                    index.insert(name.clone(), names.len());
                    names.push(name.clone());
                }
            }
        }
        Self::resolve(names, index, constraints)
    }

    /// Build a set over an explicit list of point names.
    ///
    /// Points that no constraint mentions are allowed; constraints naming a
    /// point outside the list are not.
    pub fn with_points(
        points: Vec<String>,
        constraints: Vec<Constraint>,
    ) -> Result<Self, ConstraintError> {
        let mut index = HashMap::with_capacity(points.len());
        for (id, name) in points.iter().enumerate() {
            if index.insert(name.clone(), id).is_some() {
                return Err(ConstraintError::DuplicatePoint { name: name.clone() });
            }
        }
        Self::resolve(points, index, constraints)
    }

    fn resolve(
        names: Vec<String>,
        index: HashMap<String, PointId>,
        constraints: Vec<Constraint>,
    ) -> Result<Self, ConstraintError> {
        let mut edges = Vec::with_capacity(constraints.len());
        for (i, c) in constraints.iter().enumerate() {
            if c.point_a == c.point_b {
                return Err(ConstraintError::SelfConstraint {
                    index: i,
                    name: c.point_a.clone(),
                });
            }
            if !c.distance.is_finite() {
                return Err(ConstraintError::NonFiniteDistance {
                    index: i,
                    a: c.point_a.clone(),
                    b: c.point_b.clone(),
                });
            }
            if c.distance < 0.0 {
                return Err(ConstraintError::NegativeDistance {
                    index: i,
                    a: c.point_a.clone(),
                    b: c.point_b.clone(),
                    distance: c.distance,
                });
            }
            let lookup = |name: &String| {
                index
                    .get(name)
                    .copied()
                    .ok_or_else(|| ConstraintError::UnknownPoint {
                        index: i,
                        name: name.clone(),
                    })
            };
            edges.push(Edge {
                a: lookup(&c.point_a)?,
                b: lookup(&c.point_b)?,
                distance: c.distance,
            });
        }
        Ok(Self {
            names,
            index,
            constraints,
            edges,
        })
    }

    /// Point names in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len_points(&self) -> usize {
        self.names.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Constraints with endpoints resolved, parallel to [`Self::constraints`].
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn id_of(&self, name: &str) -> Option<PointId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: PointId) -> &str {
        &self.names[id]
    }

    /// True when no distances were given, even if points were listed.
    pub fn has_no_constraints(&self) -> bool {
        self.constraints.is_empty()
    }
}
