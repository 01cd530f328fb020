use std::fmt;

/// Errors raised when building simulation inputs.
///
/// None of these are produced mid-simulation: bodies, viewports and configs are validated when
/// they are constructed or changed, so [`PhysicsWorld::update`](crate::core::world::PhysicsWorld::update)
/// never fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// A zero-length (or non-finite) vector was normalised.
    DegenerateVector,
    /// An affine map with a (near-)zero determinant was inverted.
    DegenerateTransform,
    InvalidBody {
        reason: &'static str,
    },
    InvalidViewport {
        reason: &'static str,
    },
    InvalidConfig {
        reason: &'static str,
    },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateVector => write!(f, "cannot normalise a zero-length vector"),
            Self::DegenerateTransform => write!(f, "affine map is not invertible"),
            Self::InvalidBody { reason } => write!(f, "invalid body: {reason}"),
            Self::InvalidViewport { reason } => write!(f, "invalid viewport: {reason}"),
            Self::InvalidConfig { reason } => write!(f, "invalid world config: {reason}"),
        }
    }
}

impl std::error::Error for PhysicsError {}
