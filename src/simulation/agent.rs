//! Agent behavior, sensors, and lifecycle.
//!
//! An agent is one controller's physical presence in the world: a dynamic
//! circular body plus alive/energy state and per-tick fitness bookkeeping.
//! All terminal conditions (hazard contact, energy exhaustion, falling off
//! the world) are state transitions to `alive = false`, never errors; the
//! evaluator detects death by reading the flag.

use ndarray::Array1;

use super::config::SimulationSettings;
use super::controller::{ACTION_COUNT, Controller, ControllerError, SENSOR_COUNT};
use super::physics::BodyId;
use super::world::World;

/// Grounded-check slack above the exact resting height, in world units.
const JUMP_SLACK: f32 = 2.0;

/// How far below the ground line a body may sink before it counts as fallen.
const FLOOR_SLACK: f32 = 5.0;

/// A circular physics agent driven by a [`Controller`].
#[derive(Debug)]
pub struct Agent {
    /// Handle of the agent's body in the shared world.
    pub body: BodyId,
    /// Whether the agent is still participating in the episode. Terminal:
    /// once false it never becomes true again within an episode.
    pub alive: bool,
    /// High-water mark of net progress toward the target, plus survival time.
    /// Monotonically non-decreasing while the agent lives.
    pub fitness: f32,
    /// Smallest distance to the target ever observed, if any.
    pub best_distance: Option<f32>,
    /// Distance to the target at spawn, fixed for the episode.
    pub initial_distance: f32,
    /// Remaining energy budget. Depletes with actions and never refills.
    pub energy: f32,
    settings: SimulationSettings,
}

impl Agent {
    /// Spawns an agent into the world.
    ///
    /// Without a `start_position` the agent spawns near the ground, inset
    /// from the left edge. The initial distance to the target is captured
    /// immediately so fitness measures net progress from the spawn point.
    pub fn new(
        world: &mut World,
        settings: &SimulationSettings,
        start_position: Option<Array1<f32>>,
    ) -> Self {
        let radius = settings.agent_radius;
        let position = start_position.unwrap_or_else(|| {
            Array1::from_vec(vec![
                radius + 10.0,
                world.settings.ground_height + radius + 5.0,
            ])
        });
        let body = world.add_agent_body(radius, position);

        let mut agent = Self {
            body,
            alive: true,
            fitness: 0.0,
            best_distance: None,
            initial_distance: 0.0,
            energy: settings.max_energy,
            settings: settings.clone(),
        };
        agent.initial_distance = agent.distance_to_target(world);
        agent
    }

    fn distance_to_target(&self, world: &World) -> f32 {
        let delta = world.target_position() - world.position(self.body);
        (delta[0] * delta[0] + delta[1] * delta[1]).sqrt()
    }

    fn grounded(&self, world: &World) -> bool {
        let y = world.position(self.body)[1];
        y <= world.settings.ground_height + self.settings.agent_radius + JUMP_SLACK
    }

    /// Collects the agent's sensor readings, in fixed order:
    /// target offset (dx, dy), own velocity (vx, vy), height above ground,
    /// hazard distance, and target x-velocity. Always exactly
    /// [`SENSOR_COUNT`] values; a pure read with no side effects.
    pub fn sensor_values(&self, world: &World) -> Array1<f32> {
        let target = world.target_position();
        let position = world.position(self.body);
        let velocity = world.velocity(self.body);
        let settings = &world.settings;

        let dx = (target[0] - position[0]) / settings.width;
        let dy = (target[1] - position[1]) / settings.height;
        let vx = velocity[0] / self.settings.sensor_range;
        let vy = velocity[1] / self.settings.sensor_range;
        let ground_dist = (position[1] - settings.ground_height) / settings.height;
        let hazard_dist = world.hazard_distance(&position);
        let target_velocity = world.target_velocity()[0] / self.settings.sensor_range.max(1.0);

        let sensors = Array1::from_vec(vec![
            dx,
            dy,
            vx,
            vy,
            ground_dist,
            hazard_dist,
            target_velocity,
        ]);
        debug_assert_eq!(sensors.len(), SENSOR_COUNT);
        sensors
    }

    /// Updates the agent for one tick using the provided controller.
    ///
    /// Dead agents are frozen: the call is a no-op. Otherwise the agent
    /// senses, acts, pays energy, updates fitness, and finally checks its
    /// terminal conditions. The energy spend and physics actuation happen
    /// before the death checks, so an agent can die in the same tick it
    /// acts, with its action already applied to the world.
    pub fn update(
        &mut self,
        world: &mut World,
        dt: f32,
        controller: &dyn Controller,
    ) -> Result<(), ControllerError> {
        if !self.alive {
            return Ok(());
        }

        let sensors = self.sensor_values(world);
        let output = controller.activate(&sensors);
        if output.len() != ACTION_COUNT {
            return Err(ControllerError::ActionArity {
                got: output.len(),
                expected: ACTION_COUNT,
            });
        }

        let force_x = output[0].clamp(-1.0, 1.0) * self.settings.move_force;
        let jump_signal = output[1];

        world.apply_force(self.body, Array1::from_vec(vec![force_x, 0.0]));
        self.energy -= force_x.abs() * self.settings.energy_per_force;

        if self.grounded(world) && jump_signal > 0.5 {
            world.apply_impulse(
                self.body,
                Array1::from_vec(vec![0.0, self.settings.jump_impulse]),
            );
            self.energy -= self.settings.energy_per_jump;
        }

        let current_distance = self.distance_to_target(world);
        if self.best_distance.is_none_or(|best| current_distance < best) {
            self.best_distance = Some(current_distance);
            let improvement = self.initial_distance - current_distance;
            self.fitness = self.fitness.max(improvement);
        }

        self.fitness += dt; // small reward for staying alive

        let position = world.position(self.body);
        if world.hazard_contains(&position) {
            self.alive = false;
        }
        if self.energy <= 0.0 {
            self.alive = false;
        }
        if position[1] < 0.0 || position[1] < world.settings.ground_height - FLOOR_SLACK {
            self.alive = false;
        }

        Ok(())
    }
}
