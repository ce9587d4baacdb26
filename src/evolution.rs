//! Population management, genetic operators, and the training loop.
//!
//! The optimizer side of the system: it owns a population of [`Genome`]s,
//! hands each generation to the evaluator as a batch, reads fitness back,
//! and breeds the next generation. Reproduction follows two strategies,
//! chosen at random per offspring: averaging crossover of two well-ranked
//! parents, or cloning one parent and mutating it with a log-uniform
//! mutation scale. The best genome of each generation is carried forward
//! unchanged.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::simulation::brain::Brain;
use crate::simulation::config::{AppConfig, PopulationSettings};
use crate::simulation::controller::Controller;
use crate::simulation::evaluator::{RenderHook, Simulation, SimulationError};

/// Initial weight scale for fresh random brains.
const INITIAL_WEIGHT_SCALE: f32 = 0.1;

/// Log-uniform sampling bounds for the mutation scale.
const MUTATION_SCALE_MIN: f32 = 0.0002;
const MUTATION_SCALE_MAX: f32 = 0.2;

/// One candidate controller and its externally-visible fitness score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    /// The evolved network.
    pub brain: Brain,
    /// Fitness written back by the last evaluation episode.
    pub fitness: f32,
}

/// A serialized population snapshot for resuming training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Generation the snapshot was taken after.
    pub generation: u32,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// The full population, with fitness from the last evaluation.
    pub population: Vec<Genome>,
}

/// Creates a fresh random population sized per the configuration.
pub fn init_population(config: &AppConfig) -> Vec<Genome> {
    let layer_sizes = Brain::layer_sizes(&config.population.hidden_layers);

    (0..config.population.population_size)
        .map(|_| Genome {
            brain: Brain::new(&layer_sizes, INITIAL_WEIGHT_SCALE),
            fitness: 0.0,
        })
        .collect()
}

/// Evaluates one batch of `(id, genome)` pairs in a single shared episode.
///
/// Mutates each genome's fitness in place, matching input order; the ids are
/// opaque to the evaluator and only preserve the caller's pairing.
pub fn evaluate_batch(
    genomes: &mut [(usize, Genome)],
    config: &AppConfig,
    generation: u32,
    hook: Option<&mut (dyn RenderHook + '_)>,
) -> Result<(), SimulationError> {
    let controllers: Vec<Box<dyn Controller>> = genomes
        .iter()
        .map(|(_, genome)| Box::new(genome.brain.clone()) as Box<dyn Controller>)
        .collect();

    let mut simulation = Simulation::new(controllers, config, generation)?;
    let scores = simulation.run(hook)?;

    for ((_, genome), score) in genomes.iter_mut().zip(scores) {
        genome.fitness = score;
    }
    Ok(())
}

/// Breeds the next generation from an evaluated population.
///
/// The population is ranked by fitness; the best genome survives unchanged
/// and the remaining slots are filled by crossover or clone-and-mutate from
/// the top quarter of the ranking.
pub fn next_generation(population: &[Genome], settings: &PopulationSettings) -> Vec<Genome> {
    let mut ranked = population.to_vec();
    ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

    let mut next = Vec::with_capacity(settings.population_size);
    next.push(ranked[0].clone());

    let parent_pool = (ranked.len() / 4).max(1);

    while next.len() < settings.population_size {
        // Logarithmic random sampling for mutation scale
        let log_min = MUTATION_SCALE_MIN.ln();
        let log_max = MUTATION_SCALE_MAX.ln();
        let mutation_scale = rand::rng().random_range(log_min..log_max).exp();

        let strategy = rand::rng().random_range(0..2);

        let brain = if strategy == 0 && ranked.len() >= 2 {
            let id_a = rand::rng().random_range(0..parent_pool);
            let id_b = rand::rng().random_range(0..parent_pool);
            let mut child = Brain::crossover(&ranked[id_a].brain, &ranked[id_b].brain);
            child.mutate(mutation_scale);
            child
        } else {
            let id = rand::rng().random_range(0..parent_pool);
            let mut child = ranked[id].brain.clone();
            child.mutate(mutation_scale);
            child
        };

        next.push(Genome {
            brain,
            fitness: 0.0,
        });
    }

    next
}

/// Runs training for a set number of generations and returns the best genome.
///
/// Writes periodic population checkpoints and the best genome under the
/// configured checkpoint directory. Stops early when the fitness goal is
/// reached.
pub fn run_training(
    generations: u32,
    config: &AppConfig,
    hook: Option<&mut (dyn RenderHook + '_)>,
) -> Result<Genome, Box<dyn Error>> {
    config.validate()?;
    let mut population = init_population(config);
    train_population(&mut population, 0, generations, config, hook)
}

/// Resumes training from the latest checkpoint, or starts fresh when none
/// exists.
pub fn resume_training(
    config: &AppConfig,
    hook: Option<&mut (dyn RenderHook + '_)>,
) -> Result<Genome, Box<dyn Error>> {
    config.validate()?;
    let generations = config.population.max_generations;

    let Some(path) = find_latest_checkpoint(&config.population.checkpoint_dir)? else {
        println!("No checkpoint found; starting a new training run.");
        return run_training(generations, config, hook);
    };

    let checkpoint = load_checkpoint(&path)?;
    println!(
        "Resuming from {} (generation {})",
        path.display(),
        checkpoint.generation
    );

    let mut population = checkpoint.population;
    train_population(
        &mut population,
        checkpoint.generation + 1,
        generations,
        config,
        hook,
    )
}

/// Loads the saved best genome and replays one evaluation episode with it.
///
/// Returns the fitness the genome achieved in the replay.
pub fn run_best(
    config: &AppConfig,
    hook: Option<&mut (dyn RenderHook + '_)>,
) -> Result<f32, Box<dyn Error>> {
    let path = best_genome_path(&config.population.checkpoint_dir);
    let genome = load_genome(&path)?;

    let mut batch = vec![(0, genome)];
    evaluate_batch(&mut batch, config, 0, hook)?;
    Ok(batch[0].1.fitness)
}

fn train_population(
    population: &mut Vec<Genome>,
    start_generation: u32,
    generations: u32,
    config: &AppConfig,
    mut hook: Option<&mut (dyn RenderHook + '_)>,
) -> Result<Genome, Box<dyn Error>> {
    let checkpoint_dir = config.population.checkpoint_dir.clone();
    fs::create_dir_all(&checkpoint_dir)?;

    let mut best = population[0].clone();

    for generation in start_generation..start_generation + generations {
        let mut batch: Vec<(usize, Genome)> =
            population.drain(..).enumerate().collect();
        evaluate_batch(&mut batch, config, generation, hook.as_deref_mut())?;
        *population = batch.into_iter().map(|(_, genome)| genome).collect();

        let gen_best = population
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
            .cloned()
            .expect("population is never empty");
        let mean: f32 =
            population.iter().map(|g| g.fitness).sum::<f32>() / population.len() as f32;

        println!(
            "generation {generation}: best {:.2}, mean {:.2}",
            gen_best.fitness, mean
        );

        if gen_best.fitness > best.fitness {
            best = gen_best;
        }

        let interval = config.population.checkpoint_interval;
        if interval > 0 && (generation + 1) % interval == 0 {
            let path = save_checkpoint(&checkpoint_dir, generation, population)?;
            println!("checkpoint written to {}", path.display());
        }

        if best.fitness >= config.population.fitness_goal {
            println!(
                "fitness goal {:.2} reached at generation {generation}",
                config.population.fitness_goal
            );
            break;
        }

        *population = next_generation(population, &config.population);
    }

    let best_path = best_genome_path(&checkpoint_dir);
    save_genome(&best, &best_path)?;
    println!(
        "Training finished. Best genome ({:.2}) saved to {}",
        best.fitness,
        best_path.display()
    );

    Ok(best)
}

/// Path of the best-genome file inside a checkpoint directory.
pub fn best_genome_path(checkpoint_dir: &Path) -> PathBuf {
    checkpoint_dir.join("best-genome.json")
}

/// Saves a genome to a JSON file.
pub fn save_genome(genome: &Genome, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(genome)?;
    fs::write(path, json)?;
    Ok(())
}

/// Loads a genome from a JSON file.
pub fn load_genome(path: &Path) -> Result<Genome, Box<dyn Error>> {
    let json = fs::read_to_string(path)?;
    let genome = serde_json::from_str(&json)?;
    Ok(genome)
}

/// Writes a population checkpoint and returns its path.
pub fn save_checkpoint(
    checkpoint_dir: &Path,
    generation: u32,
    population: &[Genome],
) -> Result<PathBuf, Box<dyn Error>> {
    let checkpoint = Checkpoint {
        generation,
        saved_at: Utc::now(),
        population: population.to_vec(),
    };
    // Zero-padded so lexical order matches generation order.
    let path = checkpoint_dir.join(format!("checkpoint-{generation:05}.json"));
    let json = serde_json::to_string_pretty(&checkpoint)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Loads a population checkpoint from a JSON file.
///
/// A checkpoint with an empty population is rejected: the training loop
/// requires at least one genome to rank and breed from.
pub fn load_checkpoint(path: &Path) -> Result<Checkpoint, Box<dyn Error>> {
    let json = fs::read_to_string(path)?;
    let checkpoint: Checkpoint = serde_json::from_str(&json)?;
    if checkpoint.population.is_empty() {
        return Err(format!("checkpoint {} has an empty population", path.display()).into());
    }
    Ok(checkpoint)
}

/// Finds the newest checkpoint file in a directory, by name.
pub fn find_latest_checkpoint(directory: &Path) -> Result<Option<PathBuf>, Box<dyn Error>> {
    if !directory.exists() {
        return Ok(None);
    }

    let mut checkpoints: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("checkpoint-") && name.ends_with(".json"))
        })
        .collect();

    checkpoints.sort();
    Ok(checkpoints.pop())
}
