//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System` with bodies at t = 0)
//! - the body pool the bodies were acquired from
//! - the per-step tree, acceleration array and energy diagnostics
//!
//! `Scenario::step` runs one full simulation step: build the tree, walk it
//! once per body, integrate, and optionally update the energy diagnostics.

use tracing::trace;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::simulation::energy::{body_energies, kinetic_energy, system_energy_from, BodyEnergy, SystemEnergy};
use crate::simulation::engine::{Engine, DEFAULT_THETA};
use crate::simulation::error::{ConfigError, Result};
use crate::simulation::forces::ForceEvaluator;
use crate::simulation::integrator::{drift_half_step, integrate, IntegratorKind};
use crate::simulation::params::Parameters;
use crate::simulation::pool::{release_all, BodyPool, BodyStack};
use crate::simulation::quadrant::Bounds;
use crate::simulation::quadtree::{BuildReport, QuadTree};
use crate::simulation::states::{Body, NVec2, System};

/// Runtime bundle for one simulation
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub pool: Box<dyn BodyPool + Send>,
    pub tree: QuadTree, // tree of the last step, kept for visualization
    pub accelerations: Vec<NVec2>, // parallel to system.bodies
    pub report: BuildReport, // what the last tree build ran into
    pub energy: SystemEnergy,
    pub body_energies: Vec<BodyEnergy>, // filled only with diagnostics on
    pub steps: u64,
}

impl Scenario {
    /// Validate `engine` and `parameters` and wrap `system` into a scenario
    /// backed by a [`BodyStack`] pool
    pub fn new(engine: Engine, parameters: Parameters, system: System) -> std::result::Result<Self, ConfigError> {
        engine.validate()?;
        parameters.validate()?;

        let pool = BodyStack::with_capacity(parameters.pool_capacity);
        let tree = QuadTree::new(Bounds::centered(parameters.root_half_width), parameters.max_depth);
        let n = system.bodies.len();

        Ok(Self {
            engine,
            parameters,
            system,
            pool: Box::new(pool),
            tree,
            accelerations: vec![NVec2::zeros(); n],
            report: BuildReport::default(),
            energy: SystemEnergy::default(),
            body_energies: Vec::new(),
            steps: 0,
        })
    }

    /// Swap in a different body pool
    pub fn with_pool(mut self, pool: impl BodyPool + Send + 'static) -> Self {
        self.pool = Box::new(pool);
        self
    }

    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Parameters (runtime) from ParametersConfig, defaults for anything left out
        let p_cfg = cfg.parameters;
        let defaults = Parameters::default();
        let parameters = Parameters {
            G: p_cfg.G.unwrap_or(defaults.G),
            epsilon: p_cfg.epsilon.unwrap_or(defaults.epsilon),
            dt: p_cfg.dt.unwrap_or(defaults.dt),
            max_depth: p_cfg.max_depth.unwrap_or(defaults.max_depth),
            root_half_width: p_cfg.root_half_width.unwrap_or(defaults.root_half_width),
            bounds_policy: p_cfg.bounds_policy,
            pool_capacity: p_cfg.pool_capacity.unwrap_or(defaults.pool_capacity),
        };

        // Engine (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        let engine = Engine {
            integrator: e_cfg.integrator,
            motion: e_cfg.motion,
            theta: e_cfg.theta.unwrap_or(DEFAULT_THETA),
            parallel: e_cfg.parallel,
            diagnostics: e_cfg.diagnostics,
        };

        let mut scenario = Scenario::new(engine, parameters, System::default())?;

        // Bodies: acquire from the pool and load the configured state
        let mut bodies = Vec::with_capacity(cfg.bodies.len());
        for (i, bc) in cfg.bodies.iter().enumerate() {
            let (x, v) = body_vectors(i, bc)?;
            let mut body = scenario.pool.acquire();
            body.set_parameters(x, v, bc.m);
            bodies.push(body);
        }
        scenario.accelerations = vec![NVec2::zeros(); bodies.len()];
        scenario.system = System::new(bodies);

        Ok(scenario)
    }

    /// Step size for the current motion mode
    pub fn dt(&self) -> f64 {
        self.engine.motion.dt(self.parameters.dt)
    }

    pub fn evaluator(&self) -> ForceEvaluator {
        ForceEvaluator::new(self.parameters.G, self.parameters.epsilon, self.engine.theta)
    }

    /// Rebuild the tree from the current bodies and fill `accelerations`
    pub fn compute_forces(&mut self) -> &[NVec2] {
        self.report = self.tree.rebuild(&mut self.system, self.pool.as_mut(), &self.parameters);

        let n = self.system.bodies.len();
        self.accelerations.clear();
        self.accelerations.resize(n, NVec2::zeros());

        let evaluator = self.evaluator();
        if self.engine.parallel {
            evaluator.compute_all_forces_par(&self.tree, &self.system.bodies, &mut self.accelerations);
        } else {
            evaluator.compute_all_forces(&self.tree, &self.system.bodies, &mut self.accelerations);
        }
        &self.accelerations
    }

    /// Advance the simulation by one step.
    ///
    /// Leapfrog: half drift, tree + forces, kick, half drift.
    /// RK4: tree + forces, frozen-acceleration RK4 update.
    pub fn step(&mut self) -> &BuildReport {
        let dt = self.dt();

        if self.engine.integrator == IntegratorKind::Leapfrog {
            drift_half_step(&mut self.system.bodies, dt);
        }
        self.compute_forces();
        integrate(self.engine.integrator, &mut self.system.bodies, &self.accelerations, dt);

        self.system.t += dt;
        self.steps += 1;
        self.update_energy();

        trace!(step = self.steps, t = self.system.t, bodies = self.system.bodies.len(), "step done");
        &self.report
    }

    /// Run `n` steps
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Recompute `energy` (and `body_energies` with diagnostics on) for the current state
    pub fn update_energy(&mut self) {
        if !self.engine.diagnostics {
            self.body_energies.clear();
            self.energy = SystemEnergy::new(kinetic_energy(&self.system.bodies), 0.0);
            return;
        }

        // positions moved since the step's tree was built, so walk a fresh one
        let (tree, _) = QuadTree::from_bodies(&self.system.bodies, &self.parameters);
        self.body_energies = body_energies(&tree, &self.system.bodies, &self.evaluator());
        self.energy = system_energy_from(&self.body_energies);
    }

    /// Hand every body back to the pool and drop the current tree
    pub fn clear(&mut self) {
        release_all(self.pool.as_mut(), &mut self.system.bodies);
        self.tree.reset();
        self.accelerations.clear();
        self.body_energies.clear();
        self.energy = SystemEnergy::default();
        self.system.t = 0.0;
        self.steps = 0;
    }

    /// Add bodies produced by an external generator, acquiring storage from the pool
    pub fn add_bodies(&mut self, bodies: impl IntoIterator<Item = Body>) {
        for b in bodies {
            let mut body = self.pool.acquire();
            body.set_parameters(b.x, b.v, b.m);
            self.system.bodies.push(body);
        }
        self.accelerations.resize(self.system.bodies.len(), NVec2::zeros());
    }
}

fn body_vectors(index: usize, bc: &BodyConfig) -> std::result::Result<(NVec2, NVec2), ConfigError> {
    let to_vec = |field: &'static str, c: &[f64]| match c {
        [x, y] => Ok(NVec2::new(*x, *y)),
        _ => Err(ConfigError::InvalidBodyVector {
            index,
            field,
            len: c.len(),
        }),
    };
    Ok((to_vec("x", &bc.x)?, to_vec("v", &bc.v)?))
}
