//! Opaque 2D physics backend interface and the built-in planar backend.
//!
//! The simulation core only talks to [`PhysicsBackend`]: adding bodies and
//! static shapes, applying forces and impulses, and querying positions and
//! velocities. [`PlanarBackend`] is the default implementation, a fixed-step
//! semi-implicit Euler integrator for circular bodies against static
//! segments and boxes. It is fully deterministic: identical inputs produce
//! bit-identical trajectories.

use ndarray::Array1;

use super::geometry::{Rect, closest_point_on_segment};

/// Handle to a body owned by a physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyId(pub(crate) usize);

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Integrated under gravity, forces, and impulses; collides with statics.
    Dynamic,
    /// Motion prescribed externally via `set_position` / `set_velocity`.
    Kinematic,
    /// Never moves.
    Static,
}

/// Parameters for creating a body.
#[derive(Debug, Clone)]
pub struct BodyDef {
    /// Dynamic, kinematic, or static.
    pub kind: BodyKind,
    /// Initial position.
    pub position: Array1<f32>,
    /// Collision radius (circle shape).
    pub radius: f32,
    /// Mass in arbitrary units. Ignored for non-dynamic bodies.
    pub mass: f32,
    /// Surface friction coefficient.
    pub friction: f32,
}

/// Minimal rigid-body interface the simulation core depends on.
///
/// Forces accumulate until the next `step` and are then cleared; impulses
/// change velocity immediately, the way pymunk-style engines behave.
pub trait PhysicsBackend {
    /// Sets the global gravity vector.
    fn set_gravity(&mut self, gravity: Array1<f32>);

    /// Adds a body and returns its handle.
    fn add_body(&mut self, def: BodyDef) -> BodyId;

    /// Adds a static collision segment from `a` to `b`.
    fn add_static_segment(&mut self, a: Array1<f32>, b: Array1<f32>, friction: f32);

    /// Adds a static solid box.
    fn add_static_box(&mut self, rect: Rect, friction: f32);

    /// Current position of a body.
    fn position(&self, id: BodyId) -> Array1<f32>;

    /// Current velocity of a body.
    fn velocity(&self, id: BodyId) -> Array1<f32>;

    /// Overrides a body's position (kinematic motion).
    fn set_position(&mut self, id: BodyId, position: Array1<f32>);

    /// Overrides a body's velocity (kinematic motion).
    fn set_velocity(&mut self, id: BodyId, velocity: Array1<f32>);

    /// Accumulates a force to be applied during the next `step`.
    fn apply_force(&mut self, id: BodyId, force: Array1<f32>);

    /// Applies an instantaneous impulse (immediate velocity change).
    fn apply_impulse(&mut self, id: BodyId, impulse: Array1<f32>);

    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);
}

#[derive(Debug, Clone)]
struct Body {
    kind: BodyKind,
    position: Array1<f32>,
    velocity: Array1<f32>,
    force: Array1<f32>,
    radius: f32,
    mass: f32,
    friction: f32,
}

#[derive(Debug, Clone)]
struct Segment {
    a: Array1<f32>,
    b: Array1<f32>,
    friction: f32,
}

#[derive(Debug, Clone)]
struct StaticBox {
    rect: Rect,
    friction: f32,
}

/// Deterministic fixed-step planar physics.
///
/// Dynamic circle bodies are integrated with semi-implicit Euler and resolved
/// against static segments and boxes with positional correction, inelastic
/// normal response, and tangential friction damping. Bodies never collide
/// with each other.
#[derive(Debug, Clone, Default)]
pub struct PlanarBackend {
    gravity: Option<Array1<f32>>,
    bodies: Vec<Body>,
    segments: Vec<Segment>,
    boxes: Vec<StaticBox>,
}

impl PlanarBackend {
    /// Creates an empty backend with zero gravity.
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_contact(body: &mut Body, contact: &Array1<f32>, friction: f32, dt: f32) {
        let delta = &body.position - contact;
        let dist = (delta[0] * delta[0] + delta[1] * delta[1]).sqrt();
        if dist >= body.radius || dist <= f32::EPSILON {
            return;
        }

        let normal = &delta / dist;
        body.position = contact + &(&normal * body.radius);

        // Inelastic: cancel the velocity component into the surface.
        let vn = body.velocity[0] * normal[0] + body.velocity[1] * normal[1];
        if vn < 0.0 {
            body.velocity = &body.velocity - &(&normal * vn);
        }

        // Friction damps the tangential component while in contact.
        let combined = (body.friction * friction).sqrt();
        let damping = (1.0 - combined * dt).max(0.0);
        let vn = body.velocity[0] * normal[0] + body.velocity[1] * normal[1];
        let normal_part = &normal * vn;
        let tangential = &body.velocity - &normal_part;
        body.velocity = normal_part + tangential * damping;
    }

    fn resolve_box(body: &mut Body, rect: &Rect, friction: f32, dt: f32) {
        let clamped = Array1::from_vec(vec![
            body.position[0].clamp(rect.min_x(), rect.max_x()),
            body.position[1].clamp(rect.min_y(), rect.max_y()),
        ]);

        if (&clamped - &body.position).iter().all(|c| c.abs() <= f32::EPSILON) {
            // Center inside the box: push out along the shallowest axis.
            let left = body.position[0] - rect.min_x();
            let right = rect.max_x() - body.position[0];
            let down = body.position[1] - rect.min_y();
            let up = rect.max_y() - body.position[1];
            let min_pen = left.min(right).min(down).min(up);
            if min_pen == left {
                body.position[0] = rect.min_x() - body.radius;
                body.velocity[0] = body.velocity[0].min(0.0);
            } else if min_pen == right {
                body.position[0] = rect.max_x() + body.radius;
                body.velocity[0] = body.velocity[0].max(0.0);
            } else if min_pen == down {
                body.position[1] = rect.min_y() - body.radius;
                body.velocity[1] = body.velocity[1].min(0.0);
            } else {
                body.position[1] = rect.max_y() + body.radius;
                body.velocity[1] = body.velocity[1].max(0.0);
            }
            return;
        }

        Self::resolve_contact(body, &clamped, friction, dt);
    }
}

impl PhysicsBackend for PlanarBackend {
    fn set_gravity(&mut self, gravity: Array1<f32>) {
        self.gravity = Some(gravity);
    }

    fn add_body(&mut self, def: BodyDef) -> BodyId {
        let id = BodyId(self.bodies.len());
        self.bodies.push(Body {
            kind: def.kind,
            position: def.position,
            velocity: Array1::zeros(2),
            force: Array1::zeros(2),
            radius: def.radius,
            mass: def.mass.max(f32::EPSILON),
            friction: def.friction,
        });
        id
    }

    fn add_static_segment(&mut self, a: Array1<f32>, b: Array1<f32>, friction: f32) {
        self.segments.push(Segment { a, b, friction });
    }

    fn add_static_box(&mut self, rect: Rect, friction: f32) {
        self.boxes.push(StaticBox { rect, friction });
    }

    fn position(&self, id: BodyId) -> Array1<f32> {
        self.bodies[id.0].position.clone()
    }

    fn velocity(&self, id: BodyId) -> Array1<f32> {
        self.bodies[id.0].velocity.clone()
    }

    fn set_position(&mut self, id: BodyId, position: Array1<f32>) {
        self.bodies[id.0].position = position;
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Array1<f32>) {
        self.bodies[id.0].velocity = velocity;
    }

    fn apply_force(&mut self, id: BodyId, force: Array1<f32>) {
        let body = &mut self.bodies[id.0];
        if body.kind == BodyKind::Dynamic {
            body.force = &body.force + &force;
        }
    }

    fn apply_impulse(&mut self, id: BodyId, impulse: Array1<f32>) {
        let body = &mut self.bodies[id.0];
        if body.kind == BodyKind::Dynamic {
            body.velocity = &body.velocity + &(impulse / body.mass);
        }
    }

    fn step(&mut self, dt: f32) {
        let gravity = self
            .gravity
            .clone()
            .unwrap_or_else(|| Array1::zeros(2));

        for body in &mut self.bodies {
            if body.kind != BodyKind::Dynamic {
                continue;
            }

            let accel = &gravity + &(&body.force / body.mass);
            body.velocity = &body.velocity + &(accel * dt);
            body.position = &body.position + &(&body.velocity * dt);
            body.force = Array1::zeros(2);

            for segment in &self.segments {
                let contact = closest_point_on_segment(&segment.a, &segment.b, &body.position);
                Self::resolve_contact(body, &contact, segment.friction, dt);
            }

            for static_box in &self.boxes {
                Self::resolve_box(body, &static_box.rect, static_box.friction, dt);
            }
        }
    }
}
