//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant and softening length (`G`, `epsilon`),
//! - normal-mode step size `dt`,
//! - tree limits (`max_depth`, `root_half_width`) and the out-of-bounds policy,
//! - body pool capacity

use serde::Deserialize;

use crate::simulation::error::ConfigError;

pub const DEFAULT_G: f64 = 66.743;
pub const DEFAULT_EPSILON: f64 = 50.0;
pub const DEFAULT_DT: f64 = 0.01;
pub const DEFAULT_MAX_DEPTH: usize = 14;
pub const DEFAULT_ROOT_HALF_WIDTH: f64 = 250_000.0;
pub const DEFAULT_POOL_CAPACITY: usize = 1024;
/// Deepest tree level insertion may reach; cells below it are narrower than f64 resolution
pub const MAX_TREE_DEPTH: usize = 64;

/// What the tree builder does with a valid body lying outside the root square
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    #[default]
    #[serde(rename = "grow")] // double the root half-width until every body fits
    Grow,

    #[serde(rename = "reject")] // leave the body out of this step's tree and report it
    Reject,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub G: f64, // gravitational constant
    pub epsilon: f64, // softening length
    pub dt: f64, // step size in normal motion mode
    pub max_depth: usize, // recursion cap for insertion
    pub root_half_width: f64, // root square spans [-h, h] on both axes
    pub bounds_policy: BoundsPolicy,
    pub pool_capacity: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            G: DEFAULT_G,
            epsilon: DEFAULT_EPSILON,
            dt: DEFAULT_DT,
            max_depth: DEFAULT_MAX_DEPTH,
            root_half_width: DEFAULT_ROOT_HALF_WIDTH,
            bounds_policy: BoundsPolicy::Grow,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl Parameters {
    /// Reject settings that would corrupt the simulation before a step runs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.G.is_finite() {
            return Err(ConfigError::InvalidGravity(self.G));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ConfigError::InvalidSoftening(self.epsilon));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimeStep(self.dt));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(ConfigError::MaxDepthTooLarge {
                max_depth: self.max_depth,
                cap: MAX_TREE_DEPTH,
            });
        }
        if !self.root_half_width.is_finite() || self.root_half_width <= 0.0 {
            return Err(ConfigError::InvalidRootBounds(self.root_half_width));
        }
        Ok(())
    }
}
