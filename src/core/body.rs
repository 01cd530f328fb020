use crate::core::prelude::*;
use crate::util::gg_float;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a [`RigidBody`], unique within the process and stable for the body's lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(u64);

impl BodyHandle {
    fn next() -> Self {
        Self(NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Display for BodyHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Lifecycle of a body inside a [`PhysicsWorld`].
///
/// `Fixed` is chosen at creation and never changes. `Removed` is terminal: the world culled the
/// body after it left the visible bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BodyState {
    Free,
    Fixed,
    Removed,
}

/// A rectangular rigid body.
///
/// The moment of inertia is that of a uniform rectangular plate of unit areal density,
/// `(1/12)·w·h·(w² + h²)`, fixed at creation. Fixed bodies have zero inverse mass and zero
/// inverse inertia, so impulses never move them.
///
/// # Examples
///
/// ```
/// use tumble::core::prelude::*;
///
/// let body = RigidBody::new(5.0, Vec2 { x: 0.2, y: 0.2 }, Vec2 { x: 1.0, y: 5.0 })?
///     .with_velocity(Vec2 { x: 1.0, y: 0.0 })?;
/// assert_eq!(body.inverse_mass(), 0.2);
/// assert!(RigidBody::new(0.0, Vec2::one(), Vec2::zero()).is_err());
/// # Ok::<(), PhysicsError>(())
/// ```
#[derive(Copy, Clone, Debug)]
pub struct RigidBody {
    handle: BodyHandle,
    fixed: bool,
    mass: f64,
    size: Vec2,
    inverse_mass: f64,
    inverse_moment_of_inertia: f64,

    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) rotation: Angle,
    pub(crate) angular_velocity: f64,
}

impl RigidBody {
    /// Creates a free body centred on `position`.
    pub fn new(mass: f64, size: Vec2, position: Vec2) -> Result<Self, PhysicsError> {
        Self::create(false, mass, size, position)
    }

    /// Creates an immovable body centred on `position`. Its mass is infinite.
    pub fn fixed(size: Vec2, position: Vec2) -> Result<Self, PhysicsError> {
        Self::create(true, f64::INFINITY, size, position)
    }

    fn create(fixed: bool, mass: f64, size: Vec2, position: Vec2) -> Result<Self, PhysicsError> {
        if mass.is_nan() {
            return Err(PhysicsError::InvalidBody {
                reason: "mass must not be NaN",
            });
        }
        if mass.is_infinite() && !fixed {
            return Err(PhysicsError::InvalidBody {
                reason: "infinite mass requires a fixed body",
            });
        }
        if !fixed && mass <= 0.0 {
            return Err(PhysicsError::InvalidBody {
                reason: "mass must be positive",
            });
        }
        if !(gg_float::is_finite_positive(size.x) && gg_float::is_finite_positive(size.y)) {
            return Err(PhysicsError::InvalidBody {
                reason: "width and height must be finite and positive",
            });
        }
        if !position.is_finite() {
            return Err(PhysicsError::InvalidBody {
                reason: "position must be finite",
            });
        }

        let (inverse_mass, inverse_moment_of_inertia) = if fixed {
            (0.0, 0.0)
        } else {
            let moment_of_inertia =
                size.x * size.y * (size.x * size.x + size.y * size.y) / 12.0;
            (1.0 / mass, 1.0 / moment_of_inertia)
        };
        Ok(Self {
            handle: BodyHandle::next(),
            fixed,
            mass,
            size,
            inverse_mass,
            inverse_moment_of_inertia,
            position,
            velocity: Vec2::zero(),
            rotation: Angle::zero(),
            angular_velocity: 0.0,
        })
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Result<Self, PhysicsError> {
        if !velocity.is_finite() {
            return Err(PhysicsError::InvalidBody {
                reason: "velocity must be finite",
            });
        }
        self.velocity = velocity;
        Ok(self)
    }
    pub fn with_rotation(mut self, rotation: Angle) -> Result<Self, PhysicsError> {
        if !rotation.is_finite() {
            return Err(PhysicsError::InvalidBody {
                reason: "rotation must be finite",
            });
        }
        self.rotation = rotation;
        Ok(self)
    }
    pub fn with_angular_velocity(mut self, angular_velocity: f64) -> Result<Self, PhysicsError> {
        if !angular_velocity.is_finite() {
            return Err(PhysicsError::InvalidBody {
                reason: "angular velocity must be finite",
            });
        }
        self.angular_velocity = angular_velocity;
        Ok(self)
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }
    pub fn mass(&self) -> f64 {
        self.mass
    }
    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }
    pub fn inverse_moment_of_inertia(&self) -> f64 {
        self.inverse_moment_of_inertia
    }
    /// Width and height, in metres.
    pub fn size(&self) -> Vec2 {
        self.size
    }
    /// Centre of mass, in metres.
    pub fn position(&self) -> Vec2 {
        self.position
    }
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
    pub fn rotation(&self) -> Angle {
        self.rotation
    }
    /// Counter-clockwise, in radians per second.
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// The four corners, counter-clockwise from the bottom left of the unrotated box.
    pub fn vertices(&self) -> [Vec2; 4] {
        let half = self.size / 2.0;
        [
            Vec2 {
                x: -half.x,
                y: -half.y,
            },
            Vec2 {
                x: half.x,
                y: -half.y,
            },
            Vec2 {
                x: half.x,
                y: half.y,
            },
            Vec2 {
                x: -half.x,
                y: half.y,
            },
        ]
        .map(|corner| self.position + corner.rotated(self.rotation))
    }

    pub fn polygon(&self) -> Polygon {
        Polygon::oriented_box(self.position, self.size / 2.0, self.rotation)
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::bounding(self.vertices()).unwrap_or_default()
    }

    /// Velocity of the material point currently at `point`.
    pub fn velocity_at(&self, point: Vec2) -> Vec2 {
        self.velocity + (point - self.position).cross_scalar(self.angular_velocity)
    }

    pub fn kinetic_energy(&self) -> f64 {
        if self.fixed {
            return 0.0;
        }
        let rotational = if self.inverse_moment_of_inertia > 0.0 {
            self.angular_velocity * self.angular_velocity / self.inverse_moment_of_inertia
        } else {
            0.0
        };
        0.5 * (self.mass * self.velocity.len_squared() + rotational)
    }

    /// Applies `impulse` at offset `arm` from the centre of mass.
    pub(crate) fn apply_impulse(&mut self, impulse: Vec2, arm: Vec2) {
        self.velocity += impulse * self.inverse_mass;
        self.angular_velocity += self.inverse_moment_of_inertia * arm.cross(impulse);
    }

    /// Explicit Euler step under constant acceleration. Fixed bodies do not move.
    pub(crate) fn integrate(&mut self, gravity: Vec2, dt: f64) {
        if self.fixed {
            return;
        }
        self.velocity += gravity * dt;
        self.position += self.velocity * dt;
        self.rotation += Angle::radians(self.angular_velocity * dt);
    }

    /// Shifts the body by `mass_weighted_offset` scaled by its inverse mass. Fixed bodies do
    /// not move.
    pub(crate) fn displace(&mut self, mass_weighted_offset: Vec2) {
        self.position += mass_weighted_offset * self.inverse_mass;
    }

    /// Moves the pose on from `start` using this body's current velocities.
    pub(crate) fn advance_from(&mut self, start: &RigidBody, dt: f64) {
        if self.fixed {
            return;
        }
        self.position = start.position + self.velocity * dt;
        self.rotation = start.rotation + Angle::radians(self.angular_velocity * dt);
    }
}

impl Display for RigidBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} at {} rot {} vel {} ω {:.3}",
            self.handle,
            if self.fixed { " (fixed)" } else { "" },
            self.position,
            self.rotation,
            self.velocity,
            self.angular_velocity
        )
    }
}
