//! Canonical orientation of a placement.
//!
//! A placement found by relaxation sits at an arbitrary position and
//! orientation. Aligning it on an ordered reference triple (P1, P2, P3) pins
//! it down: P1 at the origin, P2 on the positive x-axis, P3 in the x/y-plane
//! with non-negative y, and the first remaining point on the non-negative z
//! side. Of all triples, the one leaving the placement flattest in z wins.

use nalgebra::{Rotation3, Unit, Vector3};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::constraint::PointId;
use crate::placement::Placement;

#[derive(Debug, Clone, Copy)]
pub struct AlignConfig {
    /// Largest |z| a reference point may keep after alignment.
    pub plane_tolerance: f64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            plane_tolerance: 1e-4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignError {
    #[error("need at least three points to align, got {count}")]
    TooFewPoints { count: usize },
    #[error("reference point {point} left the x/y-plane after alignment (z = {z})")]
    ReferenceOffPlane { point: String, z: f64 },
}

/// The flattest alignment of a placement.
#[derive(Debug, Clone)]
pub struct Canonical {
    pub placement: Placement,
    /// Standard deviation of the aligned z-coordinates.
    pub flatness: f64,
    pub reference: [PointId; 3],
}

/// Population standard deviation of all z-coordinates.
pub fn flatness(placement: &Placement) -> f64 {
    let n = placement.len();
    if n == 0 {
        return 0.0;
    }
    let zs = placement.locations().iter().map(|p| p.z);
    let mean = zs.clone().sum::<f64>() / n as f64;
    let var = zs.map(|z| (z - mean).powi(2)).sum::<f64>() / n as f64;
    var.sqrt()
}

/// Rotation taking `from` onto the direction of `to` about `from × to`.
///
/// `None` when the two are parallel or either is zero.
fn rotation_onto(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Rotation3<f64>> {
    let axis = Unit::try_new(from.cross(to), f64::EPSILON)?;
    Some(Rotation3::from_axis_angle(&axis, from.angle(to)))
}

#[derive(Debug, Clone, Default)]
pub struct CanonicalAligner {
    config: AlignConfig,
}

impl CanonicalAligner {
    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }

    /// Align `placement` on the ordered reference triple.
    ///
    /// # Panics
    ///
    /// Panics if a reference id is out of range.
    pub fn align(
        &self,
        placement: &Placement,
        triple: [PointId; 3],
    ) -> Result<Placement, AlignError> {
        let [p1, p2, p3] = triple;

        let origin = placement.location(p1);
        let mut aligned = placement.map(|v| v - origin);

        let x_axis = Vector3::x();
        let v2 = aligned.location(p2);
        match rotation_onto(&v2, &x_axis) {
            Some(rot) => aligned = aligned.map(|v| rot * v),
            // On the negative x-axis: half turn about z.
            None if v2.x < 0.0 => {
                let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::PI);
                aligned = aligned.map(|v| rot * v);
            }
            None => {}
        }

        let v3 = aligned.location(p3);
        let offset = Vector3::new(0.0, v3.y, v3.z);
        let target = Vector3::new(0.0, offset.norm(), 0.0);
        match rotation_onto(&offset, &target) {
            Some(rot) => aligned = aligned.map(|v| rot * v),
            // Pointing straight down -y: half turn about x.
            None if offset.y < 0.0 => {
                let rot = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI);
                aligned = aligned.map(|v| rot * v);
            }
            None => {}
        }

        let witness = (0..aligned.len()).find(|id| !triple.contains(id));
        if let Some(id) = witness {
            if aligned.location(id).z < 0.0 {
                aligned = aligned.map(|v| Vector3::new(v.x, v.y, -v.z));
            }
        }

        for id in triple {
            let z = aligned.location(id).z;
            if z.abs() > self.config.plane_tolerance {
                return Err(AlignError::ReferenceOffPlane {
                    point: aligned.name(id).to_string(),
                    z,
                });
            }
        }
        Ok(aligned)
    }

    /// Align on every triple and keep the flattest result. Ties keep the
    /// earliest triple in lexicographic order.
    #[instrument(skip_all, fields(points = placement.len()))]
    pub fn canonicalize(&self, placement: &Placement) -> Result<Canonical, AlignError> {
        let n = placement.len();
        if n < 3 {
            return Err(AlignError::TooFewPoints { count: n });
        }

        let mut best: Option<Canonical> = None;
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let reference = [i, j, k];
                    let aligned = self.align(placement, reference)?;
                    let score = flatness(&aligned);
                    if best.as_ref().map_or(true, |b| score < b.flatness) {
                        best = Some(Canonical {
                            placement: aligned,
                            flatness: score,
                            reference,
                        });
                    }
                }
            }
        }

        let best = best.ok_or(AlignError::TooFewPoints { count: n })?;
        debug!(flatness = best.flatness, reference = ?best.reference, "canonical alignment");
        Ok(best)
    }
}
