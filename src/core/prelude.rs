#[allow(unused_imports)]
pub use itertools::Itertools;
#[allow(unused_imports)]
pub use num_traits;

#[allow(unused_imports)]
pub use tracing::{debug, error, info, warn};

#[allow(unused_imports)]
pub use crate::{
    core::{
        body::{BodyHandle, BodyState, RigidBody},
        config::*,
        error::PhysicsError,
        viewport::Viewport,
        world::{PhysicsWorld, StepStats},
    },
    util::{
        assert::*,
        collision::{Contact, ContactState, Polygon, SatResult},
        linalg,
        linalg::{AffineMap, Angle, Rect, Vec2},
        UnorderedPair,
    },
};
