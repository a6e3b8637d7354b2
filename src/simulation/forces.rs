//! Force / acceleration contributors for the n-body engine
//!
//! The Barnes–Hut [`ForceEvaluator`] walks a built [`QuadTree`] once per body.
//! Direct Newtonian gravity and a self-contained Barnes–Hut term are also
//! exposed through the [`Acceleration`] trait so they can be combined in an
//! [`AccelSet`] and compared against each other.

use rayon::prelude::*;

use crate::simulation::params::Parameters;
use crate::simulation::quadtree::QuadTree;
use crate::simulation::states::{distance, Body, NVec2, System};

/// Acceleration on a body at `pos` due to a mass `other_mass` at `other_pos`.
///
/// `distance` is `|other_pos - pos|`. Below `epsilon` the denominator becomes
/// `(distance + epsilon)^3`, which caps the magnitude of close encounters.
/// A massless source or a zero denominator contributes nothing.
#[allow(non_snake_case)]
pub fn acceleration_due_to(pos: &NVec2, other_pos: &NVec2, other_mass: f64, distance: f64, G: f64, epsilon: f64) -> NVec2 {
    if other_mass == 0.0 {
        return NVec2::zeros();
    }
    let d = softened(distance, epsilon);
    let d3 = d * d * d;
    if d3 == 0.0 || !d3.is_finite() {
        return NVec2::zeros();
    }
    (other_pos - pos) * (G * other_mass / d3)
}

/// Potential energy of a pair at `distance`, with the same softening rule
#[allow(non_snake_case)]
pub fn pair_potential(m1: f64, m2: f64, distance: f64, G: f64, epsilon: f64) -> f64 {
    let d = softened(distance, epsilon);
    if d == 0.0 {
        return 0.0;
    }
    -G * m1 * m2 / d
}

fn softened(distance: f64, epsilon: f64) -> f64 {
    if distance < epsilon {
        distance + epsilon
    } else {
        distance
    }
}

// =========================================================================================
// Barnes-Hut tree walk
// =========================================================================================

/// Barnes–Hut force evaluation over a fully built, read-only tree
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceEvaluator {
    pub G: f64, // gravitational constant
    pub epsilon: f64, // softening length
    pub theta: f64, // opening angle
}

impl ForceEvaluator {
    #[allow(non_snake_case)]
    pub fn new(G: f64, epsilon: f64, theta: f64) -> Self {
        Self { G, epsilon, theta }
    }

    /// Net acceleration on body `i` of `bodies`.
    ///
    /// Starting at the root, an internal node is treated as one mass at its
    /// center of mass when `width / distance < theta` and the body is not
    /// inside the node; otherwise its children are visited. Leaves interact
    /// directly, skipping body `i` itself.
    pub fn compute_tree_force(&self, tree: &QuadTree, bodies: &[Body], i: usize) -> NVec2 {
        let mut acc = NVec2::zeros();
        if tree.is_empty() {
            return acc;
        }
        self.traverse_node(tree, tree.root, i, &bodies[i].x, bodies, &mut acc);
        acc
    }

    /// Fill `out[i]` with the acceleration of every body, one walk per body
    pub fn compute_all_forces(&self, tree: &QuadTree, bodies: &[Body], out: &mut [NVec2]) {
        for (i, a) in out.iter_mut().enumerate().take(bodies.len()) {
            *a = self.compute_tree_force(tree, bodies, i);
        }
    }

    /// Same as [`ForceEvaluator::compute_all_forces`] on the rayon pool.
    /// The tree is shared read-only and each task writes only its own slot.
    pub fn compute_all_forces_par(&self, tree: &QuadTree, bodies: &[Body], out: &mut [NVec2]) {
        let n = bodies.len();
        out.par_iter_mut().take(n).enumerate().for_each(|(i, a)| {
            *a = self.compute_tree_force(tree, bodies, i);
        });
    }

    /// Potential energy of body `i` against every other body, using the same MAC
    pub fn potential_on(&self, tree: &QuadTree, bodies: &[Body], i: usize) -> f64 {
        if tree.is_empty() {
            return 0.0;
        }
        self.potential_node(tree, tree.root, i, bodies)
    }

    fn accepts(&self, tree: &QuadTree, node_idx: usize, pos_i: &NVec2) -> Option<f64> {
        let node = tree.node(node_idx);
        let dist = distance(&node.com, pos_i);
        if dist > 0.0 && node.bounds.width / dist < self.theta && !node.bounds.contains(pos_i) {
            Some(dist)
        } else {
            None
        }
    }

    fn traverse_node(&self, tree: &QuadTree, node_idx: usize, body_idx: usize, pos_i: &NVec2, bodies: &[Body], acc: &mut NVec2) {
        let node = tree.node(node_idx);

        // Skip empty nodes
        if node.body_count == 0 {
            return;
        }

        if node.has_children {
            if let Some(dist) = self.accepts(tree, node_idx, pos_i) {
                // Far enough away: approximate this node as a single mass at COM
                *acc += acceleration_due_to(pos_i, &node.com, node.mass, dist, self.G, self.epsilon);
            } else {
                // Too close: recurse into children
                for child_idx in node.children.iter().flatten() {
                    self.traverse_node(tree, *child_idx, body_idx, pos_i, bodies, acc);
                }
            }
            return;
        }

        // Leaf: direct interaction with each occupant, no self-interaction
        for j in node.occupants() {
            if j == body_idx {
                continue;
            }
            let b = &bodies[j];
            let dist = distance(&b.x, pos_i);
            *acc += acceleration_due_to(pos_i, &b.x, b.m, dist, self.G, self.epsilon);
        }
    }

    fn potential_node(&self, tree: &QuadTree, node_idx: usize, body_idx: usize, bodies: &[Body]) -> f64 {
        let node = tree.node(node_idx);
        if node.body_count == 0 {
            return 0.0;
        }

        let me = &bodies[body_idx];
        if node.has_children {
            return match self.accepts(tree, node_idx, &me.x) {
                Some(dist) => pair_potential(me.m, node.mass, dist, self.G, self.epsilon),
                None => node
                    .children
                    .iter()
                    .flatten()
                    .map(|c| self.potential_node(tree, *c, body_idx, bodies))
                    .sum(),
            };
        }

        node.occupants()
            .filter(|j| *j != body_idx)
            .map(|j| {
                let b = &bodies[j];
                pair_potential(me.m, b.m, distance(&b.x, &me.x), self.G, self.epsilon)
            })
            .sum()
    }
}

// =========================================================================================
// Pluggable acceleration terms
// =========================================================================================

/// Acceleration source over a whole [`System`]; adds its share into `out[i]`
pub trait Acceleration {
    fn acceleration(&self, t: f64, sys: &System, out: &mut [NVec2]);
}

/// Sum of acceleration terms, used to run solvers side by side
#[derive(Default)]
pub struct AccelSet(Vec<Box<dyn Acceleration + Send + Sync>>);

impl AccelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, term: impl Acceleration + Send + Sync + 'static) -> Self {
        self.0.push(Box::new(term));
        self
    }

    /// Overwrite `out` with the summed contribution of every term
    pub fn accumulate_accels(&self, t: f64, sys: &System, out: &mut [NVec2]) {
        out.fill(NVec2::zeros());
        for term in &self.0 {
            term.acceleration(t, sys, out);
        }
    }
}

/// Newtonian gravity by direct O(N²) summation, softened like the tree walk
#[allow(non_snake_case)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
    pub epsilon: f64, // softening
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec2]) {
        let n = sys.bodies.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let bi = &sys.bodies[i];
            if !bi.is_valid() {
                continue;
            }

            for j in (i + 1)..n {
                let bj = &sys.bodies[j];
                if !bj.is_valid() {
                    continue;
                }

                // i is pulled toward j, j toward i, with one shared distance
                let dist = distance(&bi.x, &bj.x);
                out[i] += acceleration_due_to(&bi.x, &bj.x, bj.m, dist, self.G, self.epsilon);
                out[j] += acceleration_due_to(&bj.x, &bi.x, bi.m, dist, self.G, self.epsilon);
            }
        }
    }
}

/// Newtonian gravity evaluated via a Barnes–Hut quadtree
/// Builds its own read-only tree from `sys` every call
pub struct BarnesHutGravity {
    pub evaluator: ForceEvaluator,
    pub parameters: Parameters,
    pub parallel: bool,
}

impl BarnesHutGravity {
    pub fn new(parameters: &Parameters, theta: f64) -> Self {
        Self {
            evaluator: ForceEvaluator::new(parameters.G, parameters.epsilon, theta),
            parameters: parameters.clone(),
            parallel: false,
        }
    }
}

impl Acceleration for BarnesHutGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec2]) {
        let (tree, _) = QuadTree::from_bodies(&sys.bodies, &self.parameters);
        let mut acc = vec![NVec2::zeros(); sys.bodies.len()];
        if self.parallel {
            self.evaluator.compute_all_forces_par(&tree, &sys.bodies, &mut acc);
        } else {
            self.evaluator.compute_all_forces(&tree, &sys.bodies, &mut acc);
        }
        for (o, a) in out.iter_mut().zip(acc) {
            *o += a;
        }
    }
}
