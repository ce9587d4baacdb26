//! Interactive visualization: watches evolution run generation by generation.
//!
//! Enter starts a run, space pauses the simulation (pausing never consumes a
//! simulation step), and the window renders the world, every agent, and a
//! small HUD. Training itself is identical to the headless `train` binary;
//! only the pacing differs, since episodes advance at the display rate.

use macroquad::prelude::*;

use evo_arena::evolution::{self, Genome};
use evo_arena::graphics;
use evo_arena::simulation::config::{self, AppConfig};
use evo_arena::simulation::controller::Controller;
use evo_arena::simulation::evaluator::Simulation;

struct TrainState {
    population: Vec<Genome>,
    simulation: Simulation,
    generation: u32,
    best_fitness: f32,
    done: bool,
}

fn build_episode(population: &[Genome], config: &AppConfig, generation: u32) -> Simulation {
    let controllers: Vec<Box<dyn Controller>> = population
        .iter()
        .map(|genome| Box::new(genome.brain.clone()) as Box<dyn Controller>)
        .collect();
    Simulation::new(controllers, config, generation).expect("configuration validated at startup")
}

#[macroquad::main("Evo Arena")]
async fn main() {
    let config = match config::load_config(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        return;
    }

    println!("Starting evo-arena visualization");

    let mut state: Option<TrainState> = None;
    let mut paused = false;

    loop {
        if state.is_none() {
            clear_background(LIGHTGRAY);
            let text = "Start a new evolution by pressing Enter";
            let font_size = 30.0;

            let text_size = measure_text(text, None, font_size as _, 1.0);
            draw_text(
                text,
                screen_width() / 2. - text_size.width / 2.,
                screen_height() / 2. - text_size.height / 2.,
                font_size,
                DARKGRAY,
            );

            if is_key_down(KeyCode::Enter) {
                let population = evolution::init_population(&config);
                let simulation = build_episode(&population, &config, 0);
                state = Some(TrainState {
                    population,
                    simulation,
                    generation: 0,
                    best_fitness: 0.0,
                    done: false,
                });
                paused = false;
            }
            next_frame().await;
            continue;
        }

        clear_background(Color::from_rgba(30, 30, 40, 255));

        if is_key_pressed(KeyCode::Space) {
            paused = !paused;
        }

        let mut restart = false;
        if let Some(ref mut train) = state {
            if !paused && !train.done {
                // Keep the episode close to real time regardless of FPS.
                let ticks = (config.simulation.ticks_per_second as f32 * get_frame_time())
                    .ceil()
                    .max(1.0) as u32;
                for _ in 0..ticks {
                    if train.simulation.finished() {
                        break;
                    }
                    if let Err(e) = train.simulation.tick() {
                        eprintln!("error: {e}");
                        return;
                    }
                }

                if train.simulation.finished() {
                    let scores = train.simulation.fitness_scores();
                    for (genome, score) in train.population.iter_mut().zip(&scores) {
                        genome.fitness = *score;
                    }
                    let gen_best = train.simulation.best_fitness();
                    train.best_fitness = train.best_fitness.max(gen_best);
                    println!(
                        "generation {}: best {:.2}",
                        train.generation, gen_best
                    );

                    let goal_reached = train.best_fitness >= config.population.fitness_goal;
                    let out_of_generations =
                        train.generation + 1 >= config.population.max_generations;
                    if goal_reached || out_of_generations {
                        train.done = true;
                    } else {
                        train.population =
                            evolution::next_generation(&train.population, &config.population);
                        train.generation += 1;
                        train.simulation =
                            build_episode(&train.population, &config, train.generation);
                    }
                }
            }

            graphics::draw_world(&train.simulation.world);
            graphics::draw_agents(&train.simulation, &config);
            graphics::draw_hud(
                train.generation,
                train.simulation.step,
                train.best_fitness.max(train.simulation.best_fitness()),
                paused,
            );

            if train.done {
                let text = format!(
                    "Run complete, best fitness {:.2} - press Enter to restart",
                    train.best_fitness
                );
                let size = measure_text(&text, None, 24, 1.0);
                draw_text(
                    &text,
                    screen_width() / 2. - size.width / 2.,
                    screen_height() / 2.,
                    24.0,
                    WHITE,
                );
                if is_key_pressed(KeyCode::Enter) {
                    restart = true;
                }
            }
        }
        if restart {
            state = None;
        }

        next_frame().await
    }
}
