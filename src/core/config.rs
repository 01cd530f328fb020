use crate::core::error::PhysicsError;
use crate::util::linalg::Vec2;

/// Separations (and other lengths) closer to zero than this are treated as exactly zero.
pub const EPSILON: f64 = 1e-10;
/// Magnitude of gravitational acceleration, in m/s².
pub const GRAVITY: f64 = 9.81;
pub const RESTITUTION: f64 = 0.2;
/// Longest stretch of simulated time a single `update()` call will integrate.
pub const MAX_STEP_SECONDS: f64 = 1.0 / 60.0;
/// Sub-steps are not halved below this; a step this short is accepted even if it penetrates.
pub const MIN_STEP_SECONDS: f64 = 1e-6;
/// Width of the band around zero separation (in metres) that counts as being in contact.
pub const CONTACT_TOLERANCE: f64 = 1e-4;
/// Passes over the contacts when pushing interpenetrating bodies apart after a sub-step.
pub const POSITION_ITERATIONS: usize = 16;
pub const DEFAULT_POINTS_PER_METRE: f64 = 200.0;

/// Tunable parameters of a [`PhysicsWorld`](crate::core::world::PhysicsWorld).
///
/// # Examples
///
/// ```
/// use tumble::core::prelude::*;
///
/// let config = WorldConfig::default()
///     .with_restitution(0.5)
///     .with_gravity(Vec2 { x: 0.0, y: -1.62 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldConfig {
    pub gravity: Vec2,
    pub restitution: f64,
    pub max_step_seconds: f64,
    pub min_step_seconds: f64,
    pub contact_tolerance: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2 {
                x: 0.0,
                y: -GRAVITY,
            },
            restitution: RESTITUTION,
            max_step_seconds: MAX_STEP_SECONDS,
            min_step_seconds: MIN_STEP_SECONDS,
            contact_tolerance: CONTACT_TOLERANCE,
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }
    #[must_use]
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }
    #[must_use]
    pub fn with_max_step(mut self, seconds: f64) -> Self {
        self.max_step_seconds = seconds;
        self
    }
    #[must_use]
    pub fn with_min_step(mut self, seconds: f64) -> Self {
        self.min_step_seconds = seconds;
        self
    }
    #[must_use]
    pub fn with_contact_tolerance(mut self, tolerance: f64) -> Self {
        self.contact_tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.gravity.x.is_finite() && self.gravity.y.is_finite()) {
            return Err(PhysicsError::InvalidConfig {
                reason: "gravity must be finite",
            });
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(PhysicsError::InvalidConfig {
                reason: "restitution must lie in [0, 1]",
            });
        }
        if !(self.min_step_seconds.is_finite() && self.min_step_seconds > 0.0) {
            return Err(PhysicsError::InvalidConfig {
                reason: "min step must be positive",
            });
        }
        if !(self.max_step_seconds.is_finite() && self.max_step_seconds >= self.min_step_seconds) {
            return Err(PhysicsError::InvalidConfig {
                reason: "max step must be finite and no shorter than min step",
            });
        }
        if !(self.contact_tolerance.is_finite() && self.contact_tolerance >= EPSILON) {
            return Err(PhysicsError::InvalidConfig {
                reason: "contact tolerance must be at least EPSILON",
            });
        }
        Ok(())
    }
}
