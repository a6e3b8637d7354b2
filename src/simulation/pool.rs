//! Body recycling
//!
//! The simulation never creates or drops bodies behind the caller's back:
//! bodies come out of a [`BodyPool`] when a scenario is populated and go back
//! into it when they are discarded (invalid bodies at tree-build time, or a
//! full reset of the scenario).

use tracing::warn;

use crate::simulation::states::Body;

/// Allocator interface for bodies. `acquire` moves a body out of the pool,
/// `release` moves it back in.
pub trait BodyPool {
    fn acquire(&mut self) -> Body;
    fn release(&mut self, body: Body);
    fn available(&self) -> usize;
}

/// Pre-allocated free list of bodies
#[derive(Debug, Clone)]
pub struct BodyStack {
    free: Vec<Body>,
}

impl BodyStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: vec![Body::default(); capacity],
        }
    }
}

impl BodyPool for BodyStack {
    fn acquire(&mut self) -> Body {
        match self.free.pop() {
            Some(body) => body,
            None => {
                warn!("body pool is empty, allocating a fresh body");
                Body::default()
            }
        }
    }

    fn release(&mut self, mut body: Body) {
        body.reset();
        self.free.push(body);
    }

    fn available(&self) -> usize {
        self.free.len()
    }
}

/// Return every body of `bodies` to `pool`, leaving the set empty
pub fn release_all(pool: &mut dyn BodyPool, bodies: &mut Vec<Body>) {
    for body in bodies.drain(..) {
        pool.release(body);
    }
}
