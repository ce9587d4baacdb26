//! macroquad drawing helpers for the interactive visualization.
//!
//! World coordinates have y pointing up with the ground near the bottom;
//! screen coordinates are flipped and scaled so the whole world fits the
//! window regardless of its size.

use macroquad::prelude::*;
use ndarray::Array1;

use crate::simulation::config::{AppConfig, WorldSettings};
use crate::simulation::evaluator::Simulation;
use crate::simulation::geometry::Rect;
use crate::simulation::world::World;

trait ToScreen {
    type Output;
    fn to_screen(&self, settings: &WorldSettings) -> Self::Output;
}

impl ToScreen for Array1<f32> {
    type Output = Array1<f32>;
    fn to_screen(&self, settings: &WorldSettings) -> Array1<f32> {
        let scale_x = screen_width() / settings.width;
        let scale_y = screen_height() / settings.height;
        Array1::from_vec(vec![
            self[0] * scale_x,
            screen_height() - self[1] * scale_y,
        ])
    }
}

impl ToScreen for f32 {
    type Output = f32;
    fn to_screen(&self, settings: &WorldSettings) -> f32 {
        let scale_x = screen_width() / settings.width;
        let scale_y = screen_height() / settings.height;
        self * scale_x.min(scale_y)
    }
}

fn draw_world_rect(rect: &Rect, settings: &WorldSettings, color: Color) {
    let top_left =
        Array1::from_vec(vec![rect.min_x(), rect.max_y()]).to_screen(settings);
    let scale_x = screen_width() / settings.width;
    let scale_y = screen_height() / settings.height;
    draw_rectangle(
        top_left[0],
        top_left[1],
        rect.w * scale_x,
        rect.h * scale_y,
        color,
    );
}

/// Draws the static world: boundaries, obstacles, hazards, and the target.
pub fn draw_world(world: &World) {
    let settings = &world.settings;

    for (a, b) in &world.boundaries {
        let a = a.to_screen(settings);
        let b = b.to_screen(settings);
        draw_line(a[0], a[1], b[0], b[1], 3.0, Color::from_rgba(200, 200, 200, 255));
    }

    for obstacle in &world.obstacles {
        draw_world_rect(obstacle, settings, Color::from_rgba(100, 120, 200, 255));
    }

    for hazard in &world.hazards {
        draw_world_rect(hazard, settings, Color::from_rgba(210, 60, 60, 180));
    }

    let target = world.target_position().to_screen(settings);
    draw_circle(target[0], target[1], 10.0, Color::from_rgba(200, 80, 80, 255));
}

/// Draws every agent in the episode, colored by aliveness.
///
/// With `show_sensors` set, a line from each living agent to the target is
/// drawn as a simple sensor overlay.
pub fn draw_agents(simulation: &Simulation, config: &AppConfig) {
    let world = &simulation.world;
    let settings = &world.settings;
    let target = world.target_position().to_screen(settings);

    for agent in &simulation.agents {
        let pos = world.position(agent.body).to_screen(settings);
        let color = if agent.alive {
            Color::from_rgba(80, 200, 120, 255)
        } else {
            Color::from_rgba(120, 120, 120, 255)
        };
        draw_circle(
            pos[0],
            pos[1],
            config.simulation.agent_radius.to_screen(settings),
            color,
        );

        if config.render.show_sensors && agent.alive {
            draw_line(
                pos[0],
                pos[1],
                target[0],
                target[1],
                1.0,
                Color::from_rgba(210, 180, 90, 120),
            );
        }
    }
}

/// Draws the heads-up display: generation, step, and best fitness.
pub fn draw_hud(generation: u32, step: u32, best_fitness: f32, paused: bool) {
    let lines = [
        format!("Generation: {generation}"),
        format!("Step: {step}"),
        format!("Best fitness: {best_fitness:.2}"),
    ];
    for (i, text) in lines.iter().enumerate() {
        draw_text(text, 10.0, 22.0 + i as f32 * 20.0, 18.0, WHITE);
    }

    if paused {
        let text = "PAUSED (space to resume)";
        let size = measure_text(text, None, 24, 1.0);
        draw_text(
            text,
            screen_width() / 2.0 - size.width / 2.0,
            30.0,
            24.0,
            YELLOW,
        );
    }
}
