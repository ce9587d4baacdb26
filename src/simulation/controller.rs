//! The controller capability interface consumed by agents.
//!
//! Any evolved network (or hand-written policy in tests) implements
//! [`Controller`]: a fixed-length sensor vector in, a fixed-length action
//! vector out. The evaluator checks the action arity once per activation and
//! surfaces a violation immediately instead of truncating or padding.

use ndarray::Array1;
use thiserror::Error;

/// Number of sensor channels an agent exposes to its controller.
pub const SENSOR_COUNT: usize = 7;

/// Number of action channels a controller must produce: `[steer, jump]`.
pub const ACTION_COUNT: usize = 2;

/// Contract violations between an agent and its controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The controller produced the wrong number of action outputs.
    #[error("controller returned {got} outputs, expected {expected}")]
    ActionArity {
        /// Length of the returned action vector.
        got: usize,
        /// Required action vector length.
        expected: usize,
    },
}

/// Maps a sensor vector to an action vector.
///
/// Implementations must be pure given fixed internal state: activating the
/// same controller with the same sensors yields the same actions, which is
/// what makes evaluation episodes reproducible.
pub trait Controller {
    /// Computes the action vector for one tick.
    fn activate(&self, sensors: &Array1<f32>) -> Array1<f32>;
}
