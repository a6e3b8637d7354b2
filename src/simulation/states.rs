//! Core state types for the N-body simulation.
//!
//! Defines the 2D body/system structs:
//! - `Body` using `NVec2` (position, velocity, mass)
//! - `System` holding the active bodies and the current simulation time `t`

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// Euclidean distance between two points
pub fn distance(a: &NVec2, b: &NVec2) -> f64 {
    (a - b).norm()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass
}

impl Body {
    pub fn new(x: NVec2, v: NVec2, m: f64) -> Self {
        Self { x, v, m }
    }

    /// Overwrite the state of a body acquired from a pool
    pub fn set_parameters(&mut self, x: NVec2, v: NVec2, m: f64) {
        self.x = x;
        self.v = v;
        self.m = m;
    }

    /// Zero everything so the body can be handed back to a pool
    pub fn reset(&mut self) {
        self.x = NVec2::zeros();
        self.v = NVec2::zeros();
        self.m = 0.0;
    }

    /// Apply an impulse-style force: `v += f / m`
    pub fn apply_force(&mut self, f: NVec2) {
        if self.m > 0.0 {
            self.v += f / self.m;
        }
    }

    /// Scale the velocity by `k`
    pub fn damp_motion(&mut self, k: f64) {
        self.v *= k;
    }

    /// A body takes part in the tree only with a positive, finite mass and a finite state.
    /// Non-finite state stands in for an unusable (null) body handed over by a generator.
    pub fn is_valid(&self) -> bool {
        self.m > 0.0
            && self.m.is_finite()
            && self.x.iter().all(|c| c.is_finite())
            && self.v.iter().all(|c| c.is_finite())
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.norm_squared()
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // active bodies
    pub t: f64, // time
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }
}
