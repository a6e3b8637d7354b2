use std::time::Instant;
use crate::simulation::states::{Body, System, NVec2};
use crate::simulation::params::Parameters;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{Acceleration, NewtonianGravity, BarnesHutGravity};
use crate::simulation::scenario::Scenario;

/// Helper to build a manual System of size `n`
fn make_system(n: usize) -> System {
    let mut bodies = Vec::with_capacity(n);

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = NVec2::new(
            (i_f * 0.37).sin() * 500.0,
            (i_f * 0.13).cos() * 500.0,
        );

        bodies.push(Body::new(x, NVec2::zeros(), 1.0));
    }

    System::new(bodies)
}

/// Shared parameter template
fn make_params() -> Parameters {
    Parameters {
        G: 0.1,
        epsilon: 0.01,
        dt: 0.001,
        root_half_width: 1000.0,
        pool_capacity: 0,
        ..Parameters::default()
    }
}

/// Direct summation vs Barnes–Hut acceleration for growing n
pub fn bench_gravity() {
    // Different system sizes to test
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let parameters = make_params();

    for n in ns {
        let sys = make_system(n);
        let mut out = vec![NVec2::zeros(); n];

        // Set up gravity models
        let direct = NewtonianGravity {
            G: parameters.G,
            epsilon: parameters.epsilon,
        };
        let bh = BarnesHutGravity::new(&parameters, 0.7);

        // Warm up
        direct.acceleration(0.0, &sys, &mut out);
        bh.acceleration(0.0, &sys, &mut out);

        // Time direct
        let t0 = Instant::now();
        direct.acceleration(0.0, &sys, &mut out);
        let dt_direct = t0.elapsed().as_secs_f64();

        // Time barnes-hut
        let t1 = Instant::now();
        bh.acceleration(0.0, &sys, &mut out);
        let dt_bh = t1.elapsed().as_secs_f64();

        println!("N = {n:5}, direct = {:8.6} s, BH = {:8.6} s", dt_direct, dt_bh);
    }
}

/// Accuracy / time trade-off of the opening angle at a fixed n
/// Paste output directly into excel to graph
pub fn bench_theta() {
    let n = 2000;
    let parameters = make_params();
    let sys = make_system(n);

    // Reference accelerations by direct summation
    let mut exact = vec![NVec2::zeros(); n];
    NewtonianGravity {
        G: parameters.G,
        epsilon: parameters.epsilon,
    }
    .acceleration(0.0, &sys, &mut exact);

    println!("theta,max_rel_err,ms");

    for theta in [0.0, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0] {
        let bh = BarnesHutGravity::new(&parameters, theta);
        let mut out = vec![NVec2::zeros(); n];

        let t0 = Instant::now();
        bh.acceleration(0.0, &sys, &mut out);
        let ms = t0.elapsed().as_secs_f64() * 1000.0;

        let max_err = exact
            .iter()
            .zip(out.iter())
            .filter(|(e, _)| e.norm() > 0.0)
            .map(|(e, a)| (a - e).norm() / e.norm())
            .fold(0.0, f64::max);

        println!("{},{:.6e},{:.6}", theta, max_err, ms);
    }
}

/// Full scenario steps per second, sequential vs rayon force evaluation
pub fn bench_step() {
    // Test different N values
    let ns = [200, 400, 800, 1600, 3200, 6400, 12800];
    let steps = 5; // number of steps per run (tune as needed)

    for n in ns {
        let mut per_step = [0.0; 2];

        for (slot, parallel) in [false, true].into_iter().enumerate() {
            let engine = Engine {
                parallel,
                ..Engine::default()
            };
            let Ok(mut scenario) = Scenario::new(engine, make_params(), make_system(n)) else {
                println!("N = {n:5}, invalid benchmark parameters");
                return;
            };

            // Warm-up
            scenario.step();

            let t0 = Instant::now();
            scenario.run(steps);
            per_step[slot] = t0.elapsed().as_secs_f64() / steps as f64;
        }

        println!("N = {:5}, sequential step = {:8.6} s,   rayon step = {:8.6} s", n, per_step[0], per_step[1]);
    }
}
