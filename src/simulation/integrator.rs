//! Fixed-step time integrators for the N-body system
//!
//! Both schemes consume a body slice and a parallel acceleration slice that
//! the force evaluator filled for the current step:
//! - Leapfrog kick-drift-kick, split so that the caller half-drifts, rebuilds
//!   the tree and evaluates forces, then kicks and half-drifts again
//! - RK4 with the acceleration frozen across all four stages

use serde::Deserialize;

use super::states::{Body, NVec2};

/// Which integration scheme advances the bodies
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorKind {
    #[default]
    #[serde(rename = "leapfrog")] // Kick-drift-kick leapfrog. Symplectic, time-reversible, bounded energy error
    Leapfrog,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta stages, frozen acceleration, not symplectic
    Rk4,
}

/// Drift: x_n+1/2 = x_n + (dt/2) * v_n
pub fn drift_half_step(bodies: &mut [Body], dt: f64) {
    let half_dt = 0.5 * dt;
    for b in bodies.iter_mut() {
        b.x += half_dt * b.v;
    }
}

/// Kick then half drift:
/// v_n+1 = v_n + dt * a_mid
/// x_n+1 = x_n+1/2 + (dt/2) * v_n+1
pub fn kick_drift(bodies: &mut [Body], accels: &[NVec2], dt: f64) {
    let half_dt = 0.5 * dt;
    for (b, a) in bodies.iter_mut().zip(accels.iter()) {
        b.v += dt * *a;
        b.x += half_dt * b.v;
    }
}

/// Advance every body with the RK4 stage weights, reusing the one
/// acceleration computed for this step in all four stages
pub fn rk4_frozen(bodies: &mut [Body], accels: &[NVec2], dt: f64) {
    for (b, a) in bodies.iter_mut().zip(accels.iter()) {
        let k1v = dt * *a;
        let k1x = dt * b.v;

        let k2v = dt * *a;
        let k2x = dt * (b.v + 0.5 * k1v);

        let k3v = dt * *a;
        let k3x = dt * (b.v + 0.5 * k2v);

        let k4v = dt * *a;
        let k4x = dt * (b.v + k3v);

        b.v += (k1v + 2.0 * k2v + 2.0 * k3v + k4v) / 6.0;
        b.x += (k1x + 2.0 * k2x + 2.0 * k3x + k4x) / 6.0;
    }
}

/// Apply the post-force half of a step for `kind`.
///
/// For `Leapfrog` this is the kick and closing half drift; the opening half
/// drift must already have happened before the forces were evaluated.
pub fn integrate(kind: IntegratorKind, bodies: &mut [Body], accels: &[NVec2], dt: f64) {
    match kind {
        IntegratorKind::Leapfrog => kick_drift(bodies, accels, dt),
        IntegratorKind::Rk4 => rk4_frozen(bodies, accels, dt),
    }
}
