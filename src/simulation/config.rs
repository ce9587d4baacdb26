//! Configuration models, TOML loading, and validation.
//!
//! All settings are plain serde structs with defaults that produce a playable
//! world. Validation runs once, before any episode is constructed, so a
//! malformed configuration fails fast instead of partway through a run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid TOML.
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// A setting violates a structural precondition.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Refused to overwrite an existing file.
    #[error("{} already exists; pass overwrite to replace it", .0.display())]
    AlreadyExists(PathBuf),
}

/// Settings that control simulation timing and agent actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Physics steps per second.
    pub ticks_per_second: u32,
    /// Maximum physics steps per generation.
    pub max_steps: u32,
    /// Normalization range for velocity sensors.
    pub sensor_range: f32,
    /// Force applied for horizontal movement.
    pub move_force: f32,
    /// Impulse applied when jumping.
    pub jump_impulse: f32,
    /// Radius of the circular agent.
    pub agent_radius: f32,
    /// Energy cost per unit of applied horizontal force.
    pub energy_per_force: f32,
    /// Energy cost per jump.
    pub energy_per_jump: f32,
    /// Total energy budget before the agent exhausts.
    pub max_energy: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            max_steps: 600,
            sensor_range: 400.0,
            move_force: 500.0,
            jump_impulse: 1500.0,
            agent_radius: 12.0,
            energy_per_force: 0.002,
            energy_per_jump: 0.5,
            max_energy: 15.0,
        }
    }
}

impl SimulationSettings {
    /// Fixed timestep derived from the tick rate.
    pub fn dt(&self) -> f32 {
        1.0 / self.ticks_per_second as f32
    }

    /// Checks structural preconditions, returning a descriptive error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid(
                "ticks_per_second must be positive".into(),
            ));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be positive".into()));
        }
        if self.agent_radius <= 0.0 {
            return Err(ConfigError::Invalid("agent_radius must be positive".into()));
        }
        if self.sensor_range <= 0.0 {
            return Err(ConfigError::Invalid("sensor_range must be positive".into()));
        }
        Ok(())
    }
}

/// Settings used when constructing the physics world.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// World width in pixels.
    pub width: f32,
    /// World height in pixels.
    pub height: f32,
    /// Horizontal gravity component.
    pub gravity_x: f32,
    /// Vertical gravity component.
    pub gravity_y: f32,
    /// Height of the ground segment from the bottom.
    pub ground_height: f32,
    /// Solid obstacle rectangles as (center x, center y, width, height).
    pub obstacles: Vec<(f32, f32, f32, f32)>,
    /// Hazard rectangles (center x, center y, width, height) that eliminate
    /// agents on contact. Hazards never block movement.
    pub hazards: Vec<(f32, f32, f32, f32)>,
    /// Target base position.
    pub target_position: (f32, f32),
    /// Horizontal oscillation amplitude for the target (0 to disable).
    pub target_motion_amplitude: f32,
    /// Angular speed of the target oscillation.
    pub target_motion_speed: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            gravity_x: 0.0,
            gravity_y: -900.0,
            ground_height: 40.0,
            obstacles: vec![(200.0, 120.0, 120.0, 20.0), (400.0, 200.0, 140.0, 20.0)],
            hazards: vec![(520.0, 70.0, 120.0, 16.0)],
            target_position: (700.0, 100.0),
            target_motion_amplitude: 80.0,
            target_motion_speed: 1.5,
        }
    }
}

impl WorldSettings {
    /// Checks structural preconditions, returning a descriptive error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::Invalid(
                "world dimensions must be positive".into(),
            ));
        }
        if self.ground_height >= self.height {
            return Err(ConfigError::Invalid(
                "ground_height must be below the world height".into(),
            ));
        }
        for &(_, _, w, h) in self.obstacles.iter().chain(self.hazards.iter()) {
            if w <= 0.0 || h <= 0.0 {
                return Err(ConfigError::Invalid(
                    "obstacle and hazard extents must be positive".into(),
                ));
            }
        }
        if self.target_motion_amplitude < 0.0 {
            return Err(ConfigError::Invalid(
                "target_motion_amplitude must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for population size and training goals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationSettings {
    /// Number of genomes per generation.
    pub population_size: usize,
    /// Fitness threshold to stop training early.
    pub fitness_goal: f32,
    /// Maximum generations to run.
    pub max_generations: u32,
    /// Generations between checkpoints.
    pub checkpoint_interval: u32,
    /// Directory for checkpoint files.
    pub checkpoint_dir: PathBuf,
    /// Hidden layer sizes of evolved networks.
    pub hidden_layers: Vec<usize>,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            population_size: 20,
            fitness_goal: 200.0,
            max_generations: 10,
            checkpoint_interval: 5,
            checkpoint_dir: PathBuf::from("checkpoints"),
            hidden_layers: vec![10],
        }
    }
}

impl PopulationSettings {
    /// Checks structural preconditions, returning a descriptive error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::Invalid(
                "population_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Optional rendering controls.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RenderSettings {
    /// Draw sensor overlay lines for each living agent.
    pub show_sensors: bool,
}

/// Top-level configuration container.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Simulation timing and agent action settings.
    pub simulation: SimulationSettings,
    /// Physics world construction settings.
    pub world: WorldSettings,
    /// Population and training settings.
    pub population: PopulationSettings,
    /// Rendering controls.
    pub render: RenderSettings,
}

impl AppConfig {
    /// Validates every settings group, failing fast on the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.world.validate()?;
        self.population.validate()?;
        Ok(())
    }
}

/// Loads configuration from an optional TOML file or returns defaults.
///
/// When `config_path` is `None`, `config.toml` in the working directory is
/// tried; a missing file yields the default configuration.
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = config_path.unwrap_or_else(|| Path::new("config.toml"));
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Writes the default configuration to a TOML file.
///
/// Refuses to replace an existing file unless `overwrite` is set.
pub fn write_default_config(path: &Path, overwrite: bool) -> Result<(), ConfigError> {
    if path.exists() && !overwrite {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    let config = AppConfig::default();
    let payload = toml::to_string_pretty(&config)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    std::fs::write(path, payload)?;
    Ok(())
}
