use crate::core::prelude::*;
use crate::util::gg_float;

/// Maps world space (metres, y up) to view space (points) and back.
///
/// The mapping is built from a user transform (e.g. [`AffineMap::flip_y`] for a y-down view),
/// the position of the world origin in unit view space, the view size, and a scale. The composed
/// map and its inverse are cached, and rebuilt whenever an input actually changes.
///
/// # Examples
///
/// ```
/// use tumble::core::prelude::*;
///
/// // A y-down view, 800×1200 points, with the world origin at the bottom centre.
/// let viewport = Viewport::new(Vec2 { x: 800.0, y: 1200.0 })?
///     .with_user_transform(AffineMap::flip_y())?
///     .with_origin(Vec2 { x: 0.5, y: 0.0 })?;
/// assert_eq!(viewport.convert_point_to_view(Vec2::zero()), Vec2 { x: 400.0, y: 1200.0 });
/// assert_eq!(viewport.convert_point_to_view(Vec2::up()), Vec2 { x: 400.0, y: 1000.0 });
/// # Ok::<(), PhysicsError>(())
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Viewport {
    user_transform: AffineMap,
    origin: Vec2,
    size: Vec2,
    points_per_metre: f64,

    transform: AffineMap,
    inverse_transform: AffineMap,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            user_transform: AffineMap::identity(),
            origin: Vec2::zero(),
            size: Vec2::zero(),
            points_per_metre: DEFAULT_POINTS_PER_METRE,
            transform: AffineMap::scale(DEFAULT_POINTS_PER_METRE, DEFAULT_POINTS_PER_METRE),
            inverse_transform: AffineMap::scale(
                1.0 / DEFAULT_POINTS_PER_METRE,
                1.0 / DEFAULT_POINTS_PER_METRE,
            ),
        }
    }
}

impl Viewport {
    pub fn new(size: Vec2) -> Result<Self, PhysicsError> {
        let mut rv = Self::default();
        rv.set_size(size)?;
        Ok(rv)
    }

    pub fn with_user_transform(mut self, user_transform: AffineMap) -> Result<Self, PhysicsError> {
        self.set_user_transform(user_transform)?;
        Ok(self)
    }
    pub fn with_origin(mut self, origin: Vec2) -> Result<Self, PhysicsError> {
        self.set_origin(origin)?;
        Ok(self)
    }
    pub fn with_points_per_metre(mut self, points_per_metre: f64) -> Result<Self, PhysicsError> {
        self.set_points_per_metre(points_per_metre)?;
        Ok(self)
    }

    pub fn user_transform(&self) -> AffineMap {
        self.user_transform
    }
    /// Where the world origin sits, in unit view space with (0, 0) at the lower left.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }
    pub fn size(&self) -> Vec2 {
        self.size
    }
    pub fn points_per_metre(&self) -> f64 {
        self.points_per_metre
    }
    /// The composed world-to-view map.
    pub fn transform(&self) -> AffineMap {
        self.transform
    }
    pub fn inverse_transform(&self) -> AffineMap {
        self.inverse_transform
    }

    pub fn has_area(&self) -> bool {
        self.size.x > 0.0 && self.size.y > 0.0
    }

    pub fn set_user_transform(&mut self, user_transform: AffineMap) -> Result<(), PhysicsError> {
        if !user_transform.is_finite() {
            return Err(PhysicsError::InvalidViewport {
                reason: "user transform must be finite",
            });
        }
        let _ = user_transform.inverse()?;
        if user_transform != self.user_transform {
            let prev = *self;
            self.user_transform = user_transform;
            self.recompute_or_restore(prev)?;
        }
        Ok(())
    }

    pub fn set_origin(&mut self, origin: Vec2) -> Result<(), PhysicsError> {
        if !origin.is_finite() {
            return Err(PhysicsError::InvalidViewport {
                reason: "origin must be finite",
            });
        }
        if origin != self.origin {
            let prev = *self;
            self.origin = origin;
            self.recompute_or_restore(prev)?;
        }
        Ok(())
    }

    /// Sets the view size in points. Zero is allowed (e.g. before layout), but then nothing is
    /// visible and [`bounds`](Viewport::bounds) is empty.
    pub fn set_size(&mut self, size: Vec2) -> Result<(), PhysicsError> {
        if !size.is_finite() || size.x < 0.0 || size.y < 0.0 {
            return Err(PhysicsError::InvalidViewport {
                reason: "size must be finite and non-negative",
            });
        }
        if size != self.size {
            let prev = *self;
            self.size = size;
            self.recompute_or_restore(prev)?;
        }
        Ok(())
    }

    pub fn set_points_per_metre(&mut self, points_per_metre: f64) -> Result<(), PhysicsError> {
        if !gg_float::is_finite_positive(points_per_metre) {
            return Err(PhysicsError::InvalidViewport {
                reason: "points per metre must be finite and positive",
            });
        }
        if points_per_metre != self.points_per_metre {
            let prev = *self;
            self.points_per_metre = points_per_metre;
            self.recompute_or_restore(prev)?;
        }
        Ok(())
    }

    fn recompute_or_restore(&mut self, prev: Viewport) -> Result<(), PhysicsError> {
        if let Err(e) = self.recompute() {
            *self = prev;
            return Err(e);
        }
        Ok(())
    }

    /// Rebuilds the cached maps from the current inputs.
    fn recompute(&mut self) -> Result<(), PhysicsError> {
        let offset = Vec2::splat(0.5);
        let transformed_offset = self.user_transform.apply_point(offset);
        let transformed_origin = self
            .user_transform
            .apply_point(self.origin + transformed_offset - offset);
        let projected = transformed_origin.component_wise(self.size);

        let transform = self
            .user_transform
            .then(AffineMap::scale(self.points_per_metre, self.points_per_metre))
            .then(AffineMap::translation_vec2(projected));
        let inverse_transform = transform.inverse()?;
        self.transform = transform;
        self.inverse_transform = inverse_transform;
        Ok(())
    }

    pub fn convert_point_to_view(&self, point: Vec2) -> Vec2 {
        self.transform.apply_point(point)
    }
    pub fn convert_point_to_world(&self, point: Vec2) -> Vec2 {
        self.inverse_transform.apply_point(point)
    }
    pub fn convert_size_to_view(&self, size: Vec2) -> Vec2 {
        self.transform.apply_size(size)
    }
    pub fn convert_size_to_world(&self, size: Vec2) -> Vec2 {
        self.inverse_transform.apply_size(size)
    }

    /// The visible region of world space: the bounding box of the view's corners mapped back to
    /// world coordinates.
    pub fn bounds(&self) -> Rect {
        let Vec2 { x: w, y: h } = self.size;
        let corners = [
            Vec2::zero(),
            Vec2 { x: w, y: 0.0 },
            Vec2 { x: w, y: h },
            Vec2 { x: 0.0, y: h },
        ]
        .map(|corner| self.convert_point_to_world(corner));
        Rect::bounding(corners).unwrap_or_default()
    }
}
