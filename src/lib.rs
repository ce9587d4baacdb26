//! # Evo Arena - Evolving Physics Controllers
//!
//! A playground for evolving small neural-network controllers for a 2D
//! physics agent. Each generation a batch of candidate controllers is
//! dropped into a fresh physics world and scored on how close its agent
//! gets to a moving target while staying alive.
//!
//! ## Features
//!
//! - Neural network controllers (MLP with tanh activation)
//! - Genetic algorithm evolution (mutation and crossover)
//! - Deterministic fixed-step 2D physics with obstacles and lethal hazards
//! - Seven-channel sensor model (target offset, velocity, ground, hazards)
//! - Energy budget, jumping, and survival-based fitness shaping
//! - Real-time visualization with macroquad
//! - Checkpointing and best-genome persistence
//!
//! ## Core Modules
//!
//! - [`simulation::world`] - Physics world, static geometry, moving target
//! - [`simulation::agent`] - Agent body, sensors, energy, and fitness
//! - [`simulation::evaluator`] - Per-generation evaluation episodes
//! - [`simulation::brain`] - Neural network implementation
//! - [`evolution`] - Population management and training loop

/// Core simulation logic and data structures.
pub mod simulation {
    /// Agent behavior, sensors, and lifecycle.
    pub mod agent;
    /// Neural network implementation for agent controllers.
    pub mod brain;
    /// Configuration models, TOML loading, and validation.
    pub mod config;
    /// The controller capability interface consumed by agents.
    pub mod controller;
    /// Per-generation evaluation episodes and fitness write-back.
    pub mod evaluator;
    /// Rectangle and segment helpers shared by world and physics.
    pub mod geometry;
    /// Opaque 2D physics backend interface and the built-in planar backend.
    pub mod physics;
    /// Physics world construction, hazards, and the moving target.
    pub mod world;
}

/// Population management, genetic operators, and the training loop.
pub mod evolution;

/// macroquad drawing helpers for the interactive visualization.
pub mod graphics;
