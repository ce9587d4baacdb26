#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evo_arena::simulation::agent::Agent;
use evo_arena::simulation::config::{SimulationSettings, WorldSettings};
use evo_arena::simulation::controller::Controller;
use evo_arena::simulation::world::World;
use ndarray::Array1;

struct ConstController(Vec<f32>);

impl Controller for ConstController {
    fn activate(&self, _sensors: &Array1<f32>) -> Array1<f32> {
        Array1::from_vec(self.0.clone())
    }
}

fn create_test_world_settings() -> WorldSettings {
    WorldSettings {
        obstacles: vec![],
        hazards: vec![],
        target_motion_amplitude: 0.0,
        ..WorldSettings::default()
    }
}

fn create_test_sim_settings() -> SimulationSettings {
    SimulationSettings::default()
}

const DT: f32 = 1.0 / 60.0;

#[test]
fn test_sensor_vector_shape() {
    let mut world = World::new(&create_test_world_settings());
    let agent = Agent::new(&mut world, &create_test_sim_settings(), None);

    let sensors = agent.sensor_values(&world);
    assert_eq!(sensors.len(), 7);
    assert!(sensors.iter().all(|v| v.is_finite()));
}

#[test]
fn test_sensor_values_at_spawn() {
    let world_settings = create_test_world_settings();
    let mut world = World::new(&world_settings);
    let sim_settings = create_test_sim_settings();
    let agent = Agent::new(&mut world, &sim_settings, None);

    // Default spawn: (radius + 10, ground + radius + 5) = (22, 57).
    let sensors = agent.sensor_values(&world);
    assert!((sensors[0] - (700.0 - 22.0) / 800.0).abs() < 1e-5);
    assert!((sensors[1] - (100.0 - 57.0) / 600.0).abs() < 1e-5);
    assert_eq!(sensors[2], 0.0);
    assert_eq!(sensors[3], 0.0);
    assert!((sensors[4] - (57.0 - 40.0) / 600.0).abs() < 1e-5);
    assert_eq!(sensors[5], 1.0); // no hazards configured
    assert_eq!(sensors[6], 0.0); // static target
}

#[test]
fn test_sensors_are_a_pure_read() {
    let mut world = World::new(&create_test_world_settings());
    let agent = Agent::new(&mut world, &create_test_sim_settings(), None);

    let first = agent.sensor_values(&world);
    let second = agent.sensor_values(&world);
    assert_eq!(first, second);
    assert_eq!(agent.fitness, 0.0);
}

#[test]
fn test_dead_agent_update_is_a_noop() {
    let mut world = World::new(&create_test_world_settings());
    let mut agent = Agent::new(&mut world, &create_test_sim_settings(), None);
    let controller = ConstController(vec![1.0, 1.0]);

    agent.alive = false;
    let energy = agent.energy;
    let fitness = agent.fitness;
    let velocity = world.velocity(agent.body);

    agent.update(&mut world, DT, &controller).unwrap();

    assert!(!agent.alive);
    assert_eq!(agent.energy, energy);
    assert_eq!(agent.fitness, fitness);
    assert_eq!(world.velocity(agent.body), velocity);
}

#[test]
fn test_zero_energy_budget_dies_on_first_update() {
    let mut world = World::new(&create_test_world_settings());
    let settings = SimulationSettings {
        max_energy: 0.0,
        ..create_test_sim_settings()
    };
    let mut agent = Agent::new(&mut world, &settings, None);
    let controller = ConstController(vec![0.0, 0.0]);

    agent.update(&mut world, DT, &controller).unwrap();
    assert!(!agent.alive);

    // Subsequent updates leave the agent frozen.
    let fitness = agent.fitness;
    agent.update(&mut world, DT, &controller).unwrap();
    assert_eq!(agent.fitness, fitness);
}

#[test]
fn test_energy_depletion_from_constant_force() {
    let mut world = World::new(&create_test_world_settings());
    let settings = create_test_sim_settings();
    let mut agent = Agent::new(&mut world, &settings, None);
    let controller = ConstController(vec![1.0, 0.0]);

    // Full force costs move_force * energy_per_force = 1.0 per tick.
    let per_tick = settings.move_force * settings.energy_per_force;
    let ticks_to_exhaust = (settings.max_energy / per_tick).ceil() as usize;

    for _ in 0..ticks_to_exhaust {
        agent.update(&mut world, DT, &controller).unwrap();
        world.step(DT);
    }

    assert!(!agent.alive);
    assert!(agent.energy <= 0.0);
}

#[test]
fn test_death_tick_action_still_lands_in_the_world() {
    let mut world = World::new(&create_test_world_settings());
    let settings = SimulationSettings {
        max_energy: 0.5,
        ..create_test_sim_settings()
    };
    let mut agent = Agent::new(&mut world, &settings, None);
    let controller = ConstController(vec![1.0, 0.0]);

    // Full force costs 1.0 energy, exhausting the 0.5 budget this tick.
    agent.update(&mut world, DT, &controller).unwrap();
    assert!(!agent.alive);

    // The force was applied before the death check took effect.
    world.step(DT);
    assert!(world.velocity(agent.body)[0] > 0.0);
}

#[test]
fn test_hazard_contact_kills_on_that_tick() {
    let world_settings = WorldSettings {
        hazards: vec![(100.0, 60.0, 40.0, 40.0)],
        ..create_test_world_settings()
    };
    let mut world = World::new(&world_settings);
    let settings = create_test_sim_settings();

    // Spawn directly inside the hazard rectangle.
    let spawn = Array1::from_vec(vec![100.0, 60.0]);
    let mut agent = Agent::new(&mut world, &settings, Some(spawn));
    let controller = ConstController(vec![0.0, 0.0]);

    assert!(agent.alive);
    agent.update(&mut world, DT, &controller).unwrap();
    assert!(!agent.alive);
}

#[test]
fn test_falling_below_floor_kills() {
    let mut world = World::new(&create_test_world_settings());
    let settings = create_test_sim_settings();

    // Below ground_height - 5.
    let spawn = Array1::from_vec(vec![100.0, 20.0]);
    let mut agent = Agent::new(&mut world, &settings, Some(spawn));
    let controller = ConstController(vec![0.0, 0.0]);

    agent.update(&mut world, DT, &controller).unwrap();
    assert!(!agent.alive);
}

#[test]
fn test_fitness_is_monotonically_non_decreasing() {
    let mut world = World::new(&create_test_world_settings());
    let settings = SimulationSettings {
        max_energy: 1000.0,
        ..create_test_sim_settings()
    };
    let mut agent = Agent::new(&mut world, &settings, None);
    let controller = ConstController(vec![1.0, 0.0]);

    let mut previous = agent.fitness;
    for _ in 0..120 {
        agent.update(&mut world, DT, &controller).unwrap();
        world.step(DT);
        assert!(agent.fitness >= previous);
        previous = agent.fitness;
    }
    assert!(agent.alive);
}

#[test]
fn test_moving_toward_target_improves_best_distance() {
    let mut world = World::new(&create_test_world_settings());
    let settings = SimulationSettings {
        max_energy: 1000.0,
        ..create_test_sim_settings()
    };
    let mut agent = Agent::new(&mut world, &settings, None);
    let controller = ConstController(vec![1.0, 0.0]);

    let mut previous_x = world.position(agent.body)[0];
    for _ in 0..120 {
        agent.update(&mut world, DT, &controller).unwrap();
        world.step(DT);

        let x = world.position(agent.body)[0];
        assert!(x > previous_x, "x should strictly increase under full force");
        previous_x = x;
    }

    let best = agent.best_distance.expect("best distance recorded");
    assert!(best < agent.initial_distance);
    assert!(agent.fitness > agent.initial_distance - best);
}

#[test]
fn test_grounded_jump_spends_energy_and_lifts() {
    let mut world = World::new(&create_test_world_settings());
    let settings = create_test_sim_settings();
    let mut agent = Agent::new(&mut world, &settings, None);
    let controller = ConstController(vec![0.0, 1.0]);

    // The spawn point is slightly above the grounded-check band; let the
    // body settle onto the ground first.
    for _ in 0..30 {
        world.step(DT);
    }

    agent.update(&mut world, DT, &controller).unwrap();

    assert!((agent.energy - (settings.max_energy - settings.energy_per_jump)).abs() < 1e-5);
    assert!(world.velocity(agent.body)[1] > 0.0);
}

#[test]
fn test_no_mid_air_jump() {
    let mut world = World::new(&create_test_world_settings());
    let settings = create_test_sim_settings();

    let spawn = Array1::from_vec(vec![100.0, 300.0]);
    let mut agent = Agent::new(&mut world, &settings, Some(spawn));
    let controller = ConstController(vec![0.0, 1.0]);

    agent.update(&mut world, DT, &controller).unwrap();

    // No jump energy spent and no upward kick while airborne.
    assert_eq!(agent.energy, settings.max_energy);
    assert!(world.velocity(agent.body)[1] <= 0.0);
}
