//! Headless training CLI.
//!
//! Commands:
//!   train [--generations N] [--config PATH]   run a fresh training run
//!   resume [--config PATH]                    continue from the last checkpoint
//!   best [--config PATH]                      replay the saved best genome
//!   init-config [--overwrite] [--config PATH] write a default config.toml

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use evo_arena::evolution;
use evo_arena::simulation::config;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map_or("train", String::as_str);

    let mut generations: Option<u32> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut overwrite = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--generations" => {
                let value = iter
                    .next()
                    .ok_or("--generations requires a value")?;
                generations = Some(value.parse()?);
            }
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                config_path = Some(PathBuf::from(value));
            }
            "--overwrite" => overwrite = true,
            other => return Err(format!("unknown option: {other}").into()),
        }
    }

    match command {
        "train" => {
            let config = config::load_config(config_path.as_deref())?;
            let generations = generations.unwrap_or(config.population.max_generations);
            evolution::run_training(generations, &config, None)?;
        }
        "resume" => {
            let config = config::load_config(config_path.as_deref())?;
            evolution::resume_training(&config, None)?;
        }
        "best" => {
            let config = config::load_config(config_path.as_deref())?;
            let fitness = evolution::run_best(&config, None)?;
            println!("replay fitness: {fitness:.2}");
        }
        "init-config" => {
            let path = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
            config::write_default_config(Path::new(&path), overwrite)?;
            println!("wrote {}", path.display());
        }
        other => {
            return Err(format!(
                "unknown command: {other} (expected train, resume, best, or init-config)"
            )
            .into());
        }
    }

    Ok(())
}
