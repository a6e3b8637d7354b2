pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, System, NVec2};
pub use simulation::params::{Parameters, BoundsPolicy};
pub use simulation::engine::{Engine, MotionMode};
pub use simulation::error::{ConfigError, ScenarioError};
pub use simulation::pool::{BodyPool, BodyStack};
pub use simulation::quadrant::{Bounds, Quadrant};
pub use simulation::quadtree::{QuadTree, QuadNode, BuildReport};
pub use simulation::forces::{Acceleration, AccelSet, ForceEvaluator, NewtonianGravity, BarnesHutGravity};
pub use simulation::integrator::IntegratorKind;
pub use simulation::energy::{SystemEnergy, BodyEnergy};
pub use simulation::scenario::Scenario;

pub use configuration::config::{EngineConfig, ParametersConfig, BodyConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_gravity, bench_theta, bench_step};
