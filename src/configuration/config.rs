//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator, motion mode, opening angle, optional passes
//! - [`ParametersConfig`] – physical constants and tree limits
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario matching these types:
//!
//! ```yaml
//! engine:
//!   integrator: "leapfrog"  # or "rk4"
//!   motion: "normal"        # "slow" (dt = 0.001) or "fast" (dt = 0.1)
//!   theta: 1.0
//!   parallel: false
//!   diagnostics: true
//!
//! parameters:
//!   G: 1.0                  # gravitational constant
//!   epsilon: 0.5            # softening length
//!   dt: 0.01                # step size in normal motion
//!   max_depth: 14
//!   root_half_width: 250000.0
//!   bounds_policy: "grow"   # or "reject"
//!   pool_capacity: 64
//!
//! bodies:
//!   - x: [ 0.0, 0.0 ]
//!     v: [ 0.0, 0.0 ]
//!     m: 1000.0
//!   - x: [ 100.0, 0.0 ]
//!     v: [ 0.0, 3.1623 ]
//!     m: 1.0
//! ```
//!
//! Every key under `engine` and `parameters` is optional and falls back to the
//! defaults in [`crate::simulation::params`] and [`crate::simulation::engine`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::simulation::engine::MotionMode;
use crate::simulation::error::Result;
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::params::BoundsPolicy;

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub integrator: IntegratorKind, // time integrator used for advancing the system state
    pub motion: MotionMode, // time dilation mode, picks the step size
    pub theta: Option<f64>, // opening angle for the MAC
    pub parallel: bool, // evaluate forces on the rayon thread pool
    pub diagnostics: bool, // track potential energy each step (second tree walk)
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ParametersConfig {
    pub G: Option<f64>, // gravitational constant
    pub epsilon: Option<f64>, // softening - caps forces at very small separations
    pub dt: Option<f64>, // step size when motion is "normal"
    pub max_depth: Option<usize>, // insertion depth cap
    pub root_half_width: Option<f64>, // root square spans [-h, h]
    pub bounds_policy: BoundsPolicy, // what to do with bodies outside the root square
    pub pool_capacity: Option<usize>, // pre-allocated bodies in the pool
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // initial position in simulation units
    pub v: Vec<f64>, // initial velocity in simulation units per time unit
    pub m: f64,      // mass of the body
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig, // engine-level configuration
    #[serde(default)]
    pub parameters: ParametersConfig, // global numerical and physical parameters
    #[serde(default)]
    pub bodies: Vec<BodyConfig>, // bodies that define the initial state of the system
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }
}
