//! Per-generation evaluation episodes and fitness write-back.
//!
//! A [`Simulation`] runs one batch of controllers through a fresh world in
//! lockstep: every living agent senses and acts, then the world advances
//! exactly once per tick. Agents therefore see the previous tick's world
//! state, which is the intended one-tick-stale sensing model. The episode
//! ends when every agent is dead or the step budget is exhausted.

use thiserror::Error;

use super::agent::Agent;
use super::config::{AppConfig, ConfigError};
use super::controller::{Controller, ControllerError};
use super::world::World;

/// Errors that abort an evaluation episode before it produces fitness.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The configuration failed validation at episode construction.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A controller violated the sensor/action contract mid-episode.
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Per-tick observation callback, invoked after each simulation tick.
///
/// Purely observational: implementations must not influence simulation state
/// or termination.
pub trait RenderHook {
    /// Called once per tick with the current generation, step, and best
    /// fitness across the batch.
    fn draw(&mut self, generation: u32, step: u32, best_fitness: f32);
}

/// Runs a population of controllers through one physics episode.
///
/// The world, the agents, and the controllers are exclusively owned by the
/// simulation for the duration of the episode; agents are updated in batch
/// order each tick, single-threaded, so results are deterministic given
/// deterministic controllers.
pub struct Simulation {
    /// The shared physics world for this episode.
    pub world: World,
    /// One agent per controller, in batch order.
    pub agents: Vec<Agent>,
    /// Ticks executed so far.
    pub step: u32,
    /// Generation number, passed through to the render hook.
    pub generation: u32,
    controllers: Vec<Box<dyn Controller>>,
    dt: f32,
    max_steps: u32,
}

impl Simulation {
    /// Builds an episode for a batch of controllers.
    ///
    /// Validates the configuration first and fails fast before any physics
    /// step occurs. Every agent spawns at the default spawn point; the
    /// pairing between controllers and agents is positional and preserved
    /// through to the fitness write-back.
    pub fn new(
        controllers: Vec<Box<dyn Controller>>,
        config: &AppConfig,
        generation: u32,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut world = World::new(&config.world);
        let agents = controllers
            .iter()
            .map(|_| Agent::new(&mut world, &config.simulation, None))
            .collect();

        Ok(Self {
            world,
            agents,
            step: 0,
            generation,
            controllers,
            dt: config.simulation.dt(),
            max_steps: config.simulation.max_steps,
        })
    }

    /// Whether any agent in the batch is still alive.
    pub fn any_alive(&self) -> bool {
        self.agents.iter().any(|agent| agent.alive)
    }

    /// Whether the episode has terminated (step budget spent or all dead).
    pub fn finished(&self) -> bool {
        self.step >= self.max_steps || !self.any_alive()
    }

    /// Best fitness across the batch so far.
    pub fn best_fitness(&self) -> f32 {
        self.agents
            .iter()
            .map(|agent| agent.fitness)
            .fold(0.0, f32::max)
    }

    /// Advances the episode by exactly one tick.
    ///
    /// All agents act on the world state left by the previous tick, then the
    /// world advances once. Callers that pause (for presentation) simply stop
    /// calling `tick`; pausing consumes no steps and cannot affect fitness.
    pub fn tick(&mut self) -> Result<(), ControllerError> {
        for (agent, controller) in self.agents.iter_mut().zip(&self.controllers) {
            agent.update(&mut self.world, self.dt, controller.as_ref())?;
        }

        self.world.step(self.dt);
        self.step += 1;
        Ok(())
    }

    /// Runs the episode to completion and returns the fitness scores.
    ///
    /// Scores are floored at zero and returned in batch order. The optional
    /// render hook fires once per tick and has no effect on the outcome.
    pub fn run(
        &mut self,
        mut hook: Option<&mut (dyn RenderHook + '_)>,
    ) -> Result<Vec<f32>, ControllerError> {
        while !self.finished() {
            self.tick()?;

            if let Some(hook) = hook.as_deref_mut() {
                hook.draw(self.generation, self.step, self.best_fitness());
            }
        }

        Ok(self.fitness_scores())
    }

    /// Final fitness per agent, floored at zero, in batch order.
    pub fn fitness_scores(&self) -> Vec<f32> {
        self.agents
            .iter()
            .map(|agent| agent.fitness.max(0.0))
            .collect()
    }
}
