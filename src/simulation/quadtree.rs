//! # Barnes–Hut Quadtree (2D)
//!
//! Spatial partition used to approximate gravitational acceleration in a 2D
//! `N`-body system. Distant groups of bodies are replaced by a single
//! pseudo-body at their center of mass, which turns the `O(N²)` all-pairs sum
//! into roughly `O(N log N)` work.
//!
//! - The root covers a fixed square centered on the origin.
//! - Each node splits its square into 4 quadrants (NW, NE, SW, SE).
//! - A leaf holds at most one body, except at `max_depth` where co-located
//!   bodies share a bucket.
//! - Each node stores:
//!   - total mass of its subtree
//!   - center of mass (COM)
//!   - bounds (for the opening criterion and subdivision)
//!
//! Nodes live in one arena (`Vec<QuadNode>`) and refer to each other by
//! index. Bodies are referenced by their index in the body slice the tree was
//! built from, so a tree is only meaningful next to that slice. The tree is
//! rebuilt every step and torn down with [`QuadTree::reset`].

use tracing::{debug, warn};

use crate::simulation::params::{BoundsPolicy, Parameters, MAX_TREE_DEPTH};
use crate::simulation::pool::BodyPool;
use crate::simulation::quadrant::{determine_quadrant, Bounds, Quadrant};
use crate::simulation::states::{Body, NVec2, System};

/// A single quadtree node.
///
/// Each node represents a square region of the plane that may contain:
/// - zero bodies (empty, `body_count == 0`)
/// - exactly one body (leaf, `body = Some(i)`)
/// - several bodies in its children (internal, `has_children`)
/// - several co-located bodies at `max_depth` (leaf with a non-empty `bucket`)
#[derive(Debug, Clone, PartialEq)]
pub struct QuadNode {
    pub bounds: Bounds,
    pub com: NVec2,
    pub mass: f64,
    pub body_count: usize,
    pub depth: usize,
    pub has_children: bool,
    pub children: [Option<usize>; 4], // indices into QuadTree::nodes, by Quadrant
    pub body: Option<usize>,          // Some(i) if this leaf holds body i
    pub bucket: Vec<usize>,           // overflow bodies once max_depth is reached
}

impl QuadNode {
    fn empty(bounds: Bounds, depth: usize) -> Self {
        Self {
            bounds,
            com: NVec2::zeros(),
            mass: 0.0,
            body_count: 0,
            depth,
            has_children: false,
            children: [None; 4],
            body: None,
            bucket: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        !self.has_children
    }

    pub fn child(&self, q: Quadrant) -> Option<usize> {
        self.children[q.index()]
    }

    /// Bodies held directly by this node (single occupant, then bucket)
    pub fn occupants(&self) -> impl Iterator<Item = usize> + '_ {
        self.body.into_iter().chain(self.bucket.iter().copied())
    }
}

/// What happened while building one step's tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub inserted: usize,
    pub removed_invalid: usize,
    pub rejected_out_of_bounds: usize,
    pub bucketed: usize,
    pub root_half_width: f64,
    pub node_count: usize,
    pub max_depth_reached: usize,
}

/// A complete quadtree built over a body slice.
#[derive(Debug, Clone)]
pub struct QuadTree {
    pub nodes: Vec<QuadNode>,
    pub root: usize,
    max_depth: usize,
    bucketed: usize,
}

impl QuadTree {
    /// Empty tree whose root covers `bounds`. `max_depth` is clamped to [`MAX_TREE_DEPTH`].
    pub fn new(bounds: Bounds, max_depth: usize) -> Self {
        Self {
            nodes: vec![QuadNode::empty(bounds, 0)],
            root: 0,
            max_depth: max_depth.min(MAX_TREE_DEPTH),
            bucketed: 0,
        }
    }

    /// Build one step's tree from the active bodies of `sys`.
    ///
    /// 1. Removes invalid bodies from `sys` and hands them back to `pool`.
    /// 2. Sizes the root square from `params` (growing it or rejecting
    ///    outliers according to `params.bounds_policy`).
    /// 3. Inserts every remaining body.
    /// 4. Prunes empty subtrees.
    /// 5. Computes total mass and center-of-mass for every node (bottom-up).
    pub fn build(sys: &mut System, pool: &mut dyn BodyPool, params: &Parameters) -> (Self, BuildReport) {
        let mut tree = QuadTree::new(Bounds::centered(params.root_half_width), params.max_depth);
        let report = tree.rebuild(sys, pool, params);
        (tree, report)
    }

    /// Build a tree over a read-only body slice.
    ///
    /// Invalid bodies are skipped rather than removed; everything else
    /// matches [`QuadTree::build`].
    pub fn from_bodies(bodies: &[Body], params: &Parameters) -> (Self, BuildReport) {
        let mut tree = QuadTree::new(Bounds::centered(params.root_half_width), params.max_depth);
        let report = tree.rebuild_from(bodies, params);
        (tree, report)
    }

    /// [`QuadTree::build`] in place, reusing this tree's arena
    pub fn rebuild(&mut self, sys: &mut System, pool: &mut dyn BodyPool, params: &Parameters) -> BuildReport {
        let removed_invalid = remove_invalid_bodies(sys, pool);
        let mut report = self.rebuild_from(&sys.bodies, params);
        report.removed_invalid = removed_invalid;
        report
    }

    /// [`QuadTree::from_bodies`] in place, reusing this tree's arena
    pub fn rebuild_from(&mut self, bodies: &[Body], params: &Parameters) -> BuildReport {
        let mut half_width = params.root_half_width;
        if params.bounds_policy == BoundsPolicy::Grow {
            half_width = grown_half_width(half_width, bodies);
            if half_width > params.root_half_width {
                warn!(
                    from = params.root_half_width,
                    to = half_width,
                    "bodies outside the root square, growing root bounds"
                );
            }
        }

        self.max_depth = params.max_depth.min(MAX_TREE_DEPTH);
        self.reset_with_bounds(Bounds::centered(half_width));
        let root_bounds = self.root().bounds;
        let mut inserted = 0;
        let mut rejected = 0;

        for (i, body) in bodies.iter().enumerate() {
            if !body.is_valid() {
                continue;
            }
            if !root_bounds.contains(&body.x) {
                rejected += 1;
                continue;
            }
            self.insert(bodies, i);
            inserted += 1;
        }

        if rejected > 0 {
            warn!(rejected, half_width, "bodies outside the root square were left out of this step's tree");
        }

        self.prune_empty_nodes();
        self.compute_mass_distribution(bodies);

        if self.bucketed > 0 {
            warn!(
                bucketed = self.bucketed,
                max_depth = self.max_depth,
                "max depth reached, co-located bodies share a leaf"
            );
        }

        let report = BuildReport {
            inserted,
            removed_invalid: 0,
            rejected_out_of_bounds: rejected,
            bucketed: self.bucketed,
            root_half_width: half_width,
            node_count: self.len(),
            max_depth_reached: self.depth(),
        };
        debug!(
            nodes = report.node_count,
            depth = report.max_depth_reached,
            inserted,
            "quadtree built"
        );

        report
    }

    pub fn root(&self) -> &QuadNode {
        &self.nodes[self.root]
    }

    pub fn node(&self, idx: usize) -> &QuadNode {
        &self.nodes[idx]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().body_count == 0
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of bodies that ended up in a max-depth bucket
    pub fn bucketed(&self) -> usize {
        self.bucketed
    }

    /// Deepest node currently in the arena
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Non-empty leaves (the regions drawn by a visualizer)
    pub fn leaves(&self) -> impl Iterator<Item = &QuadNode> + '_ {
        self.nodes.iter().filter(|n| n.is_leaf() && n.body_count > 0)
    }

    /// Insert body `body_idx` of `bodies`, starting from the root.
    ///
    /// The body must lie inside the root bounds. Masses accumulated here are
    /// provisional; [`QuadTree::compute_mass_distribution`] overwrites them.
    pub fn insert(&mut self, bodies: &[Body], body_idx: usize) {
        self.insert_at(self.root, body_idx, bodies);
    }

    /// Drop all non-root nodes and empty the root, keeping its bounds
    pub fn reset(&mut self) {
        let bounds = self.root().bounds;
        self.reset_with_bounds(bounds);
    }

    /// Free every subtree that holds no body, then compact the arena.
    ///
    /// A node whose children are all gone and which holds no body is freed
    /// as well (its parent's slot is cleared). The root is never freed.
    pub fn prune_empty_nodes(&mut self) {
        if self.prune_at(self.root) {
            let root = &mut self.nodes[self.root];
            root.has_children = false;
            root.children = [None; 4];
        }
        self.compact();
    }

    /// Bottom-up pass setting `mass` and `com` for every node.
    ///
    /// - empty node: zero mass, zero COM
    /// - single occupant: the body's own mass and position
    /// - bucket leaf: mass-weighted aggregate of its occupants
    /// - internal node: mass-weighted aggregate of its non-empty children
    pub fn compute_mass_distribution(&mut self, bodies: &[Body]) {
        self.mass_at(self.root, bodies);
    }

    // helpers ==============================================================================

    fn reset_with_bounds(&mut self, bounds: Bounds) {
        self.nodes.clear();
        self.nodes.push(QuadNode::empty(bounds, 0));
        self.root = 0;
        self.bucketed = 0;
    }

    fn insert_at(&mut self, node_idx: usize, body_idx: usize, bodies: &[Body]) {
        let body = &bodies[body_idx];
        let bounds = self.nodes[node_idx].bounds;

        // Case 1: empty node -> the body becomes the leaf occupant
        if self.nodes[node_idx].body_count == 0 {
            let node = &mut self.nodes[node_idx];
            node.body = Some(body_idx);
            node.body_count = 1;
            node.mass = body.m;
            node.com = body.x;
            return;
        }

        // Leaves at max depth (or already bucketing) keep extra bodies in place
        if !self.nodes[node_idx].has_children
            && (self.nodes[node_idx].depth >= self.max_depth || self.nodes[node_idx].body.is_none())
        {
            self.push_bucket(node_idx, body_idx, body.m);
            return;
        }

        // Case 2: leaf with one occupant -> push both down into quadrants
        if !self.nodes[node_idx].has_children {
            if let Some(existing) = self.nodes[node_idx].body.take() {
                let q_old = determine_quadrant(&bounds, &bodies[existing].x);
                let child = self.child_or_create(node_idx, q_old);
                self.insert_at(child, existing, bodies);
            }
            self.nodes[node_idx].has_children = true;
        }

        // Case 3: node has (or now has) children -> descend into the right child
        let q = determine_quadrant(&bounds, &body.x);
        let child = self.child_or_create(node_idx, q);
        self.insert_at(child, body_idx, bodies);

        let node = &mut self.nodes[node_idx];
        node.body_count += 1;
        node.mass += body.m;
    }

    fn push_bucket(&mut self, node_idx: usize, body_idx: usize, m: f64) {
        let node = &mut self.nodes[node_idx];
        node.bucket.push(body_idx);
        node.body_count += 1;
        node.mass += m;
        self.bucketed += 1;
    }

    fn child_or_create(&mut self, node_idx: usize, q: Quadrant) -> usize {
        if let Some(idx) = self.nodes[node_idx].children[q.index()] {
            return idx;
        }
        let parent = &self.nodes[node_idx];
        let child = QuadNode::empty(parent.bounds.quadrant_bounds(q), parent.depth + 1);
        let new_idx = self.nodes.len();
        self.nodes.push(child);
        self.nodes[node_idx].children[q.index()] = Some(new_idx);
        new_idx
    }

    /// Returns `true` when the node at `node_idx` should be freed by its parent
    fn prune_at(&mut self, node_idx: usize) -> bool {
        let mut remaining = 0;

        for q in Quadrant::ALL {
            let Some(child_idx) = self.nodes[node_idx].child(q) else { continue };
            if self.nodes[child_idx].body_count == 0 || self.prune_at(child_idx) {
                self.nodes[node_idx].children[q.index()] = None;
            } else {
                remaining += 1;
            }
        }

        remaining == 0 && self.nodes[node_idx].body_count == 0
    }

    /// Rebuild the arena with only the nodes reachable from the root
    fn compact(&mut self) {
        let mut remap = vec![usize::MAX; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];

        while let Some(idx) = stack.pop() {
            remap[idx] = order.len();
            order.push(idx);
            for child in self.nodes[idx].children.iter().rev().flatten() {
                stack.push(*child);
            }
        }

        if order.len() == self.nodes.len() && self.root == 0 {
            return;
        }

        let mut old: Vec<Option<QuadNode>> = std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for idx in order {
            if let Some(mut node) = old[idx].take() {
                for child in node.children.iter_mut() {
                    *child = child.map(|c| remap[c]);
                }
                nodes.push(node);
            }
        }
        self.nodes = nodes;
        self.root = 0;
    }

    fn mass_at(&mut self, node_idx: usize, bodies: &[Body]) {
        let node = &self.nodes[node_idx];

        if node.body_count == 0 {
            let node = &mut self.nodes[node_idx];
            node.mass = 0.0;
            node.com = NVec2::zeros();
            return;
        }

        if node.is_leaf() {
            let (mass, com) = match (node.body, node.bucket.is_empty()) {
                (Some(i), true) => (bodies[i].m, bodies[i].x),
                _ => weighted_center(node.occupants().map(|i| (bodies[i].m, bodies[i].x))),
            };
            let node = &mut self.nodes[node_idx];
            node.mass = mass;
            node.com = com;
            return;
        }

        let children = node.children;
        for child_idx in children.iter().flatten() {
            if self.nodes[*child_idx].body_count > 0 {
                self.mass_at(*child_idx, bodies);
            }
        }

        let (mass, com) = weighted_center(
            children
                .iter()
                .flatten()
                .map(|c| &self.nodes[*c])
                .filter(|c| c.body_count > 0)
                .map(|c| (c.mass, c.com)),
        );
        let node = &mut self.nodes[node_idx];
        node.mass = mass;
        node.com = com;
    }
}

/// Total mass and mass-weighted centroid; zero COM when the mass is zero
fn weighted_center(points: impl Iterator<Item = (f64, NVec2)>) -> (f64, NVec2) {
    let mut mass = 0.0;
    let mut com = NVec2::zeros();
    for (m, x) in points {
        mass += m;
        com += x * m;
    }
    if mass > 0.0 {
        com /= mass;
    } else {
        com = NVec2::zeros();
    }
    (mass, com)
}

/// Double `half_width` until the centered square holds every valid body
fn grown_half_width(mut half_width: f64, bodies: &[Body]) -> f64 {
    let extent = bodies
        .iter()
        .filter(|b| b.is_valid())
        .map(|b| b.x.x.abs().max(b.x.y.abs()))
        .fold(0.0, f64::max);
    while half_width < extent {
        half_width *= 2.0;
    }
    half_width
}

/// Move invalid bodies out of `sys` and into `pool`; returns how many were removed
fn remove_invalid_bodies(sys: &mut System, pool: &mut dyn BodyPool) -> usize {
    let mut kept = Vec::with_capacity(sys.bodies.len());
    let mut removed = 0;
    for body in sys.bodies.drain(..) {
        if body.is_valid() {
            kept.push(body);
        } else {
            pool.release(body);
            removed += 1;
        }
    }
    sys.bodies = kept;
    if removed > 0 {
        warn!(removed, "body insertion failed (unusable state or zero mass), returned to pool");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f64, y: f64, m: f64) -> Body {
        Body::new(NVec2::new(x, y), NVec2::zeros(), m)
    }

    #[test]
    fn prune_frees_empty_children_and_compacts() {
        let bodies = vec![body(-10.0, -10.0, 1.0)];
        let mut tree = QuadTree::new(Bounds::centered(100.0), 8);
        tree.insert(&bodies, 0);

        // hang an empty child off the root by hand
        let empty = tree.child_or_create(0, Quadrant::SE);
        assert_eq!(tree.node(empty).body_count, 0);
        assert_eq!(tree.len(), 2);

        tree.prune_empty_nodes();
        assert_eq!(tree.len(), 1);
        assert!(tree.root().children.iter().all(|c| c.is_none()));
        assert_eq!(tree.root().body, Some(0));
    }

    #[test]
    fn prune_keeps_reachable_nodes_consistent() {
        let bodies = vec![body(-10.0, -10.0, 1.0), body(10.0, 10.0, 2.0), body(60.0, -60.0, 3.0)];
        let mut tree = QuadTree::new(Bounds::centered(100.0), 8);
        for i in 0..bodies.len() {
            tree.insert(&bodies, i);
        }
        tree.child_or_create(0, Quadrant::SW);
        tree.prune_empty_nodes();
        tree.compute_mass_distribution(&bodies);

        for node in &tree.nodes {
            assert!(node.body_count > 0);
            for child in node.children.iter().flatten() {
                assert!(*child < tree.len());
                assert_eq!(tree.node(*child).depth, node.depth + 1);
            }
        }
        assert!((tree.root().mass - 6.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_bodies_end_in_a_bucket() {
        let bodies = vec![body(3.0, 3.0, 1.0), body(3.0, 3.0, 1.0), body(3.0, 3.0, 2.0)];
        let mut tree = QuadTree::new(Bounds::centered(64.0), 5);
        for i in 0..bodies.len() {
            tree.insert(&bodies, i);
        }
        tree.compute_mass_distribution(&bodies);

        assert_eq!(tree.bucketed(), 2);
        assert_eq!(tree.depth(), 5);
        let leaf = tree.leaves().next().map(|n| n.body_count);
        assert_eq!(leaf, Some(3));
        assert!((tree.root().com - NVec2::new(3.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn reset_leaves_one_empty_root() {
        let bodies = vec![body(1.0, 1.0, 1.0), body(-1.0, -1.0, 1.0)];
        let mut tree = QuadTree::new(Bounds::centered(10.0), 8);
        tree.insert(&bodies, 0);
        tree.insert(&bodies, 1);
        assert!(tree.len() > 1);

        tree.reset();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().body_count, 0);
        assert_eq!(tree.root().bounds, Bounds::centered(10.0));
    }
}
