//! Physics world construction, hazards, and the moving target.
//!
//! The world owns the physics backend and all static geometry: three
//! boundary segments (ground plus two walls, no ceiling), solid obstacle
//! boxes, sensor-only hazard rectangles, and one target body. Hazards have
//! no collision response; agents query them through [`World::hazard_distance`]
//! and [`World::hazard_contains`].

use ndarray::Array1;

use super::config::WorldSettings;
use super::geometry::Rect;
use super::physics::{BodyDef, BodyId, BodyKind, PhysicsBackend, PlanarBackend};

const BOUNDARY_FRICTION: f32 = 1.0;
const OBSTACLE_FRICTION: f32 = 0.8;
const TARGET_RADIUS: f32 = 12.0;

/// Margin keeping the oscillating target inside the world on the x axis.
const TARGET_CLAMP_MARGIN: f32 = 20.0;

/// Container for the physics backend and static geometry.
///
/// Created once per evaluation episode. The world is the sole authority that
/// creates agent bodies; agents hold [`BodyId`] handles and go through the
/// world for every physics query and actuation.
pub struct World {
    /// Settings the world was built from.
    pub settings: WorldSettings,
    /// Boundary segments as (start, end) pairs: ground, left wall, right wall.
    pub boundaries: Vec<(Array1<f32>, Array1<f32>)>,
    /// Solid obstacle rectangles.
    pub obstacles: Vec<Rect>,
    /// Lethal, non-colliding hazard rectangles.
    pub hazards: Vec<Rect>,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    backend: Box<dyn PhysicsBackend>,
    target: BodyId,
    target_base: Array1<f32>,
}

impl World {
    /// Creates a world with the built-in planar backend.
    pub fn new(settings: &WorldSettings) -> Self {
        Self::with_backend(settings, Box::new(PlanarBackend::new()))
    }

    /// Creates a world on top of a caller-supplied physics backend.
    pub fn with_backend(settings: &WorldSettings, mut backend: Box<dyn PhysicsBackend>) -> Self {
        backend.set_gravity(Array1::from_vec(vec![settings.gravity_x, settings.gravity_y]));

        let width = settings.width;
        let height = settings.height;
        let ground_y = settings.ground_height;

        let boundaries = vec![
            (
                Array1::from_vec(vec![0.0, ground_y]),
                Array1::from_vec(vec![width, ground_y]),
            ),
            (
                Array1::from_vec(vec![0.0, ground_y]),
                Array1::from_vec(vec![0.0, height]),
            ),
            (
                Array1::from_vec(vec![width, ground_y]),
                Array1::from_vec(vec![width, height]),
            ),
        ];
        for (a, b) in &boundaries {
            backend.add_static_segment(a.clone(), b.clone(), BOUNDARY_FRICTION);
        }

        let obstacles: Vec<Rect> = settings
            .obstacles
            .iter()
            .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
            .collect();
        for rect in &obstacles {
            backend.add_static_box(*rect, OBSTACLE_FRICTION);
        }

        let hazards = settings
            .hazards
            .iter()
            .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
            .collect();

        let target_base = Array1::from_vec(vec![
            settings.target_position.0,
            settings.target_position.1,
        ]);
        let target_kind = if settings.target_motion_amplitude > 0.0 {
            BodyKind::Kinematic
        } else {
            BodyKind::Static
        };
        let target = backend.add_body(BodyDef {
            kind: target_kind,
            position: target_base.clone(),
            radius: TARGET_RADIUS,
            mass: 1.0,
            friction: 0.0,
        });

        Self {
            settings: settings.clone(),
            boundaries,
            obstacles,
            hazards,
            time: 0.0,
            backend,
            target,
            target_base,
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// When target motion is enabled, the target position is recomputed as a
    /// pure function of the elapsed time before the backend steps, so the
    /// trajectory is exactly reproducible regardless of the backend.
    pub fn step(&mut self, dt: f32) {
        self.time += dt;

        let amplitude = self.settings.target_motion_amplitude;
        if amplitude > 0.0 {
            let speed = self.settings.target_motion_speed;
            let phase = speed * self.time;
            let x = (self.target_base[0] + amplitude * phase.cos()).clamp(
                TARGET_CLAMP_MARGIN,
                self.settings.width - TARGET_CLAMP_MARGIN,
            );
            let vx = -amplitude * speed * phase.sin();

            self.backend
                .set_position(self.target, Array1::from_vec(vec![x, self.target_base[1]]));
            self.backend
                .set_velocity(self.target, Array1::from_vec(vec![vx, 0.0]));
        }

        self.backend.step(dt);
    }

    /// Normalized distance from `position` to the nearest hazard, in `[0, 1]`.
    ///
    /// Returns 1.0 when no hazards exist. Distances are normalized by the
    /// larger world dimension and clamped to 1.0. This is a sensor reading;
    /// elimination on hazard contact is the agent's concern.
    pub fn hazard_distance(&self, position: &Array1<f32>) -> f32 {
        if self.hazards.is_empty() {
            return 1.0;
        }

        let norm = self.settings.width.max(self.settings.height);
        let min_distance = self
            .hazards
            .iter()
            .map(|rect| rect.distance_to(position))
            .fold(f32::INFINITY, f32::min);

        (min_distance / norm).min(1.0)
    }

    /// Whether `position` lies inside any hazard rectangle.
    pub fn hazard_contains(&self, position: &Array1<f32>) -> bool {
        self.hazards.iter().any(|rect| rect.contains(position))
    }

    /// Current target position.
    pub fn target_position(&self) -> Array1<f32> {
        self.backend.position(self.target)
    }

    /// Current target velocity.
    pub fn target_velocity(&self) -> Array1<f32> {
        self.backend.velocity(self.target)
    }

    /// Creates a dynamic circular body for an agent and returns its handle.
    pub fn add_agent_body(&mut self, radius: f32, position: Array1<f32>) -> BodyId {
        self.backend.add_body(BodyDef {
            kind: BodyKind::Dynamic,
            position,
            radius,
            mass: 1.0,
            friction: 1.0,
        })
    }

    /// Position of a body owned by this world.
    pub fn position(&self, id: BodyId) -> Array1<f32> {
        self.backend.position(id)
    }

    /// Velocity of a body owned by this world.
    pub fn velocity(&self, id: BodyId) -> Array1<f32> {
        self.backend.velocity(id)
    }

    /// Accumulates a force on a body for the next step.
    pub fn apply_force(&mut self, id: BodyId, force: Array1<f32>) {
        self.backend.apply_force(id, force);
    }

    /// Applies an instantaneous impulse to a body.
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Array1<f32>) {
        self.backend.apply_impulse(id, impulse);
    }
}
