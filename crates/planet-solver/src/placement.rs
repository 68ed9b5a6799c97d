use std::sync::Arc;

use nalgebra::Vector3;
use rand::Rng;

use crate::constraint::{ConstraintSet, PointId};

/// A complete assignment of 3D coordinates to every named point.
///
/// The name list is shared between all placements of the same constraint set,
/// so cloning a placement only copies coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    names: Arc<[String]>,
    locations: Vec<Vector3<f64>>,
}

impl Placement {
    /// # Panics
    ///
    /// Panics if `names` and `locations` differ in length.
    pub fn new(names: Arc<[String]>, locations: Vec<Vector3<f64>>) -> Self {
        assert_eq!(
            names.len(),
            locations.len(),
            "placement needs exactly one location per point"
        );
        Self { names, locations }
    }

    /// Every point drawn independently and uniformly from the unit cube.
    pub fn random(names: Arc<[String]>, rng: &mut impl Rng) -> Self {
        let locations = (0..names.len())
            .map(|_| Vector3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()))
            .collect();
        Self { names, locations }
    }

    /// Convenience for tests and callers holding a [`ConstraintSet`].
    pub fn from_set(set: &ConstraintSet, locations: Vec<Vector3<f64>>) -> Self {
        Self::new(set.names().into(), locations)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn names(&self) -> &Arc<[String]> {
        &self.names
    }

    pub fn name(&self, id: PointId) -> &str {
        &self.names[id]
    }

    pub fn location(&self, id: PointId) -> Vector3<f64> {
        self.locations[id]
    }

    pub fn location_of(&self, name: &str) -> Option<Vector3<f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|id| self.locations[id])
    }

    pub fn locations(&self) -> &[Vector3<f64>] {
        &self.locations
    }

    pub fn distance(&self, a: PointId, b: PointId) -> f64 {
        (self.locations[a] - self.locations[b]).norm()
    }

    /// `(name, location)` pairs in point order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vector3<f64>)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.locations.iter().copied())
    }

    /// Apply `f` to every location, producing a new placement.
    pub fn map(&self, f: impl Fn(Vector3<f64>) -> Vector3<f64>) -> Self {
        Self {
            names: Arc::clone(&self.names),
            locations: self.locations.iter().map(|&p| f(p)).collect(),
        }
    }

    /// Largest distance any point moved between `self` and `other`.
    pub fn max_displacement(&self, other: &Placement) -> f64 {
        self.locations
            .iter()
            .zip(&other.locations)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }
}
