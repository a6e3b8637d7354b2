//! Error types for configuration and scenario loading.
//!
//! Per-step problems (invalid bodies, out-of-bounds bodies, depth overflow)
//! are not errors: they are recovered inside the step and surface through
//! [`crate::simulation::quadtree::BuildReport`] and the log.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("theta must be finite and >= 0, got {0}")]
    InvalidTheta(f64),

    #[error("time step must be finite and > 0, got {0}")]
    InvalidTimeStep(f64),

    #[error("softening epsilon must be finite and >= 0, got {0}")]
    InvalidSoftening(f64),

    #[error("gravitational constant must be finite, got {0}")]
    InvalidGravity(f64),

    #[error("max_depth must be at least 1")]
    InvalidMaxDepth,

    #[error("max_depth {max_depth} exceeds the supported cap of {cap}")]
    MaxDepthTooLarge { max_depth: usize, cap: usize },

    #[error("root half-width must be finite and > 0, got {0}")]
    InvalidRootBounds(f64),

    #[error("body {index}: `{field}` needs 2 components, got {len}")]
    InvalidBodyVector {
        index: usize,
        field: &'static str,
        len: usize,
    },
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
