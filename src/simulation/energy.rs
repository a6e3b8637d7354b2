//! System energy bookkeeping for validation runs.
//!
//! Kinetic energy is a single pass over the bodies. Potential energy needs a
//! second walk of the tree per body, so it is only computed when the engine's
//! diagnostics flag is on.

use crate::simulation::forces::ForceEvaluator;
use crate::simulation::quadtree::QuadTree;
use crate::simulation::states::Body;

/// Energy triple reported to the outside world.
///
/// `total` is `kinetic + |potential|`, a magnitude-style diagnostic rather
/// than the physical total; [`SystemEnergy::signed_total`] gives `K + U`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemEnergy {
    pub total: f64,
    pub kinetic: f64,
    pub potential: f64,
}

impl SystemEnergy {
    pub fn new(kinetic: f64, potential: f64) -> Self {
        Self {
            total: kinetic + potential.abs(),
            kinetic,
            potential,
        }
    }

    pub fn signed_total(&self) -> f64 {
        self.kinetic + self.potential
    }
}

/// Per-body energies; `potential` counts every pair the body takes part in
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyEnergy {
    pub kinetic: f64,
    pub potential: f64,
}

pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::kinetic_energy).sum()
}

/// Kinetic and potential energy of every body
pub fn body_energies(tree: &QuadTree, bodies: &[Body], evaluator: &ForceEvaluator) -> Vec<BodyEnergy> {
    (0..bodies.len())
        .map(|i| BodyEnergy {
            kinetic: bodies[i].kinetic_energy(),
            potential: evaluator.potential_on(tree, bodies, i),
        })
        .collect()
}

/// Energy of the whole system. Per-body potentials count each pair twice,
/// so their sum is halved.
pub fn system_energy_from(energies: &[BodyEnergy]) -> SystemEnergy {
    let kinetic = energies.iter().map(|e| e.kinetic).sum();
    let potential = 0.5 * energies.iter().map(|e| e.potential).sum::<f64>();
    SystemEnergy::new(kinetic, potential)
}

pub fn compute_system_energy(tree: &QuadTree, bodies: &[Body], evaluator: &ForceEvaluator) -> SystemEnergy {
    system_energy_from(&body_energies(tree, bodies, evaluator))
}
