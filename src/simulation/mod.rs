pub mod states;
pub mod params;
pub mod engine;
pub mod error;
pub mod pool;
pub mod quadrant;
pub mod quadtree;
pub mod forces;
pub mod integrator;
pub mod energy;
pub mod scenario;
