#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evo_arena::simulation::config::{AppConfig, SimulationSettings, WorldSettings};
use evo_arena::simulation::controller::{Controller, ControllerError};
use evo_arena::simulation::evaluator::{RenderHook, Simulation, SimulationError};
use ndarray::Array1;

struct ConstController(Vec<f32>);

impl Controller for ConstController {
    fn activate(&self, _sensors: &Array1<f32>) -> Array1<f32> {
        Array1::from_vec(self.0.clone())
    }
}

fn create_test_config() -> AppConfig {
    AppConfig {
        world: WorldSettings {
            obstacles: vec![],
            hazards: vec![],
            target_motion_amplitude: 0.0,
            ..WorldSettings::default()
        },
        simulation: SimulationSettings {
            max_steps: 240,
            ..SimulationSettings::default()
        },
        ..AppConfig::default()
    }
}

fn boxed(actions: Vec<f32>) -> Box<dyn Controller> {
    Box::new(ConstController(actions))
}

#[test]
fn test_idle_controller_earns_survival_reward_only() {
    let config = create_test_config();
    let mut simulation =
        Simulation::new(vec![boxed(vec![0.0, 0.0])], &config, 0).unwrap();

    let scores = simulation.run(None).unwrap();

    // No hazards reached and no fall from rest: the agent survives the
    // whole episode and earns roughly dt per tick.
    assert!(simulation.agents[0].alive);
    let expected = config.simulation.max_steps as f32 * config.simulation.dt();
    assert!((scores[0] - expected).abs() < 1.0);
}

#[test]
fn test_rightward_controller_outscores_idle() {
    let config = create_test_config();
    let mut simulation = Simulation::new(
        vec![boxed(vec![1.0, 0.0]), boxed(vec![0.0, 0.0])],
        &config,
        0,
    )
    .unwrap();

    let scores = simulation.run(None).unwrap();

    // The mover makes progress toward the target before exhausting its
    // energy; progress dominates the idler's survival reward.
    assert!(scores[0] > scores[1]);
    assert!(simulation.agents[0].best_distance.unwrap() < simulation.agents[0].initial_distance);
}

#[test]
fn test_deterministic_fitness_across_episodes() {
    // Full default config: obstacles, hazards, and a moving target.
    let config = AppConfig::default();

    let run = || {
        let controllers = vec![
            boxed(vec![0.3, 0.0]),
            boxed(vec![-0.5, 0.0]),
            boxed(vec![0.8, 1.0]),
        ];
        let mut simulation = Simulation::new(controllers, &config, 0).unwrap();
        simulation.run(None).unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_all_dead_terminates_early() {
    let mut config = create_test_config();
    config.simulation.max_energy = 0.0;

    let mut simulation = Simulation::new(
        vec![boxed(vec![0.0, 0.0]), boxed(vec![1.0, 0.0])],
        &config,
        0,
    )
    .unwrap();
    let scores = simulation.run(None).unwrap();

    assert!(!simulation.any_alive());
    assert!(simulation.step < config.simulation.max_steps);
    assert!(scores.iter().all(|&s| s >= 0.0));
}

#[test]
fn test_fitness_scores_are_floored_at_zero() {
    let mut config = create_test_config();
    config.simulation.max_energy = 0.0;

    let mut simulation = Simulation::new(vec![boxed(vec![0.0, 0.0])], &config, 0).unwrap();
    let scores = simulation.run(None).unwrap();

    assert_eq!(scores.len(), 1);
    assert!(scores[0] >= 0.0);
}

#[test]
fn test_wrong_action_arity_is_surfaced() {
    let config = create_test_config();
    let mut simulation =
        Simulation::new(vec![boxed(vec![0.0, 0.0, 0.0])], &config, 0).unwrap();

    let result = simulation.run(None);
    assert!(matches!(
        result,
        Err(ControllerError::ActionArity {
            got: 3,
            expected: 2
        })
    ));
}

#[test]
fn test_invalid_config_fails_fast() {
    let mut config = create_test_config();
    config.world.width = -1.0;

    let result = Simulation::new(vec![boxed(vec![0.0, 0.0])], &config, 0);
    assert!(matches!(result, Err(SimulationError::Config(_))));
}

#[test]
fn test_render_hook_fires_once_per_tick_without_affecting_results() {
    struct CountingHook {
        calls: u32,
        last_step: u32,
    }

    impl RenderHook for CountingHook {
        fn draw(&mut self, _generation: u32, step: u32, _best_fitness: f32) {
            self.calls += 1;
            self.last_step = step;
        }
    }

    let config = create_test_config();

    let mut hook = CountingHook {
        calls: 0,
        last_step: 0,
    };
    let mut observed = Simulation::new(vec![boxed(vec![0.0, 0.0])], &config, 3).unwrap();
    let observed_scores = observed.run(Some(&mut hook)).unwrap();

    let mut silent = Simulation::new(vec![boxed(vec![0.0, 0.0])], &config, 3).unwrap();
    let silent_scores = silent.run(None).unwrap();

    assert_eq!(hook.calls, observed.step);
    assert_eq!(hook.last_step, observed.step);
    assert_eq!(observed_scores, silent_scores);
}

#[test]
fn test_batch_order_is_preserved() {
    let config = create_test_config();

    // Distinguishable behaviors in a fixed order.
    let controllers = vec![
        boxed(vec![1.0, 0.0]),
        boxed(vec![0.0, 0.0]),
        boxed(vec![1.0, 0.0]),
    ];
    let mut simulation = Simulation::new(controllers, &config, 0).unwrap();
    let scores = simulation.run(None).unwrap();

    assert_eq!(scores.len(), 3);
    // The two movers behave identically and bracket the idler.
    assert_eq!(scores[0], scores[2]);
    assert!(scores[0] > scores[1]);
}
