use crate::core::prelude::*;
use crate::util::{collision, gg_float};
use crate::warn_every_seconds;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Counters describing the most recent call to [`PhysicsWorld::update`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Sub-steps that were accepted and advanced the clock.
    pub substeps: usize,
    /// Sub-steps that were undone because a pair interpenetrated.
    pub rollbacks: usize,
    /// Sub-steps accepted with a pair still interpenetrating, because the step could not be
    /// halved any further.
    pub exhausted: usize,
    /// Contact impulses applied.
    pub impulses: usize,
    /// Bodies culled for leaving the visible bounds.
    pub removed: usize,
}

impl Display for StepStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} substeps, {} rollbacks, {} exhausted, {} impulses, {} removed",
            self.substeps, self.rollbacks, self.exhausted, self.impulses, self.removed
        )
    }
}

/// Contact between `bodies[i]` and `bodies[j]`, `i < j`. The normal points from `j` to `i`.
#[derive(Copy, Clone, Debug)]
struct PairContact {
    i: usize,
    j: usize,
    contact: Contact,
}

/// A collection of rigid bodies, stepped together under gravity.
///
/// Each [`update`](PhysicsWorld::update) advances the simulation clock to the given time in
/// sub-steps. A sub-step that would make two bodies interpenetrate is undone and retried with
/// half the duration, so fast bodies do not pass through thin ones; contacts are then resolved
/// with a single pass of impulses. Free bodies that leave the viewport's visible bounds are
/// removed.
///
/// # Examples
///
/// ```
/// use tumble::core::prelude::*;
///
/// let viewport = Viewport::new(Vec2 { x: 800.0, y: 1200.0 })?
///     .with_user_transform(AffineMap::flip_y())?
///     .with_origin(Vec2 { x: 0.5, y: 0.0 })?;
/// let mut world = PhysicsWorld::new(viewport);
/// world.add(RigidBody::fixed(Vec2 { x: 4.0, y: 0.2 }, Vec2 { x: 0.0, y: 0.1 })?);
/// let ball = world.add(RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: 0.0, y: 3.0 })?);
///
/// for frame in 0..60 {
///     world.update(f64::from(frame) / 60.0, viewport.size());
/// }
/// assert!(world.body(ball).is_some_and(|b| b.position().y < 3.0));
/// # Ok::<(), PhysicsError>(())
/// ```
#[derive(Clone, Debug)]
pub struct PhysicsWorld {
    bodies: Vec<RigidBody>,
    /// Every body culled so far, kept so `state()` can report it until drained by
    /// `take_removed()`.
    removed: BTreeSet<BodyHandle>,
    last_time: f64,
    viewport: Viewport,
    config: WorldConfig,
    last_step_stats: StepStats,
}

impl PhysicsWorld {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            bodies: Vec::new(),
            removed: BTreeSet::new(),
            last_time: f64::NEG_INFINITY,
            viewport,
            config: WorldConfig::default(),
            last_step_stats: StepStats::default(),
        }
    }

    pub fn with_config(mut self, config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn add(&mut self, body: RigidBody) -> BodyHandle {
        let handle = body.handle();
        debug!("adding {body}");
        self.bodies.push(body);
        handle
    }

    /// The live bodies, in insertion order.
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.iter().find(|b| b.handle() == handle)
    }

    /// Returns `None` for handles this world has never seen.
    pub fn state(&self, handle: BodyHandle) -> Option<BodyState> {
        if let Some(body) = self.body(handle) {
            Some(if body.is_fixed() {
                BodyState::Fixed
            } else {
                BodyState::Free
            })
        } else if self.removed.contains(&handle) {
            Some(BodyState::Removed)
        } else {
            None
        }
    }

    /// Drains the handles of bodies culled so far. Their `state()` is `None` afterwards.
    pub fn take_removed(&mut self) -> BTreeSet<BodyHandle> {
        std::mem::take(&mut self.removed)
    }

    /// The simulation time reached by the last update.
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    pub fn last_step_stats(&self) -> StepStats {
        self.last_step_stats
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn convert_point_to_view(&self, point: Vec2) -> Vec2 {
        self.viewport.convert_point_to_view(point)
    }
    pub fn convert_point_to_world(&self, point: Vec2) -> Vec2 {
        self.viewport.convert_point_to_world(point)
    }
    pub fn convert_size_to_view(&self, size: Vec2) -> Vec2 {
        self.viewport.convert_size_to_view(size)
    }
    pub fn convert_size_to_world(&self, size: Vec2) -> Vec2 {
        self.viewport.convert_size_to_world(size)
    }
    pub fn bounds(&self) -> Rect {
        self.viewport.bounds()
    }

    /// Handles of every body whose shape overlaps that of `handle`.
    pub fn colliding_with(&self, handle: BodyHandle) -> Vec<BodyHandle> {
        let Some(body) = self.body(handle) else {
            return Vec::new();
        };
        let polygon = body.polygon();
        self.bodies
            .iter()
            .filter(|other| other.handle() != handle)
            .filter(|other| polygon.collides_with(&other.polygon()))
            .map(RigidBody::handle)
            .collect()
    }

    /// Every pair of bodies whose shapes overlap.
    pub fn colliding_pairs(&self) -> BTreeSet<UnorderedPair<BodyHandle>> {
        let polygons = self.bodies.iter().map(RigidBody::polygon).collect_vec();
        (0..self.bodies.len())
            .tuple_combinations()
            .filter(|&(i, j)| polygons[i].collides_with(&polygons[j]))
            .map(|(i, j)| UnorderedPair::new(self.bodies[i].handle(), self.bodies[j].handle()))
            .collect()
    }

    /// Advances the simulation to `time` (in seconds) and culls bodies outside the view.
    ///
    /// Does nothing if `time` does not move the clock forward. At most
    /// [`max_step_seconds`](WorldConfig::max_step_seconds) of simulated time is integrated per
    /// call; any longer gap since the previous update is skipped.
    pub fn update(&mut self, time: f64, viewport_size: Vec2) {
        if let Err(e) = self.viewport.set_size(viewport_size) {
            warn_every_seconds!(1, "ignoring viewport size {viewport_size}: {e}");
        }

        let mut stats = StepStats::default();
        if !time.is_finite() || time <= self.last_time {
            self.last_step_stats = stats;
            return;
        }

        self.last_time = self.last_time.max(time - self.config.max_step_seconds);
        let mut dt = time - self.last_time;
        let mut before = self.separations();
        while self.last_time < time {
            let snapshot = self.bodies.clone();
            for body in &mut self.bodies {
                body.integrate(self.config.gravity, dt);
            }

            let contacts = self.contacts();
            if self.is_newly_penetrating(&before, &contacts) {
                if dt > self.config.min_step_seconds {
                    self.bodies = snapshot;
                    dt /= 2.0;
                    stats.rollbacks += 1;
                    continue;
                }
                stats.exhausted += 1;
                warn_every_seconds!(
                    1,
                    "accepting interpenetration at t={:.6}: step already {dt:.2e} s",
                    self.last_time
                );
            }

            stats.impulses += self.resolve(&contacts);
            for (body, start) in self.bodies.iter_mut().zip(&snapshot) {
                body.advance_from(start, dt);
            }
            self.correct_positions();
            stats.substeps += 1;

            if dt >= time - self.last_time {
                self.last_time = time;
            } else {
                self.last_time += dt;
            }
            dt = time - self.last_time;
            before = self.separations();
        }

        stats.removed = self.collect_garbage();
        self.last_step_stats = stats;
    }

    /// Pairs `(i, j)`, `i < j`, that could interact: not both fixed, and with bounding boxes
    /// within the contact tolerance of one another.
    fn candidate_pairs(&self, polygons: &[Polygon]) -> Vec<(usize, usize)> {
        let tolerance = self.config.contact_tolerance;
        let boxes = polygons
            .iter()
            .map(|p| {
                let bbox = p.bounding_box();
                Rect::new(bbox.centre(), bbox.half_widths() + Vec2::splat(tolerance))
            })
            .collect_vec();
        (0..self.bodies.len())
            .tuple_combinations()
            .filter(|&(i, j)| !(self.bodies[i].is_fixed() && self.bodies[j].is_fixed()))
            .filter(|&(i, j)| boxes[i].intersects(&boxes[j]))
            .collect()
    }

    fn contacts(&self) -> Vec<PairContact> {
        let tolerance = self.config.contact_tolerance;
        let polygons = self.bodies.iter().map(RigidBody::polygon).collect_vec();
        self.candidate_pairs(&polygons)
            .into_iter()
            .map(|(i, j)| PairContact {
                i,
                j,
                contact: collision::contact(&polygons[i], &polygons[j], tolerance),
            })
            .collect()
    }

    fn separations(&self) -> BTreeMap<(usize, usize), f64> {
        self.contacts()
            .into_iter()
            .map(|c| ((c.i, c.j), c.contact.separation))
            .collect()
    }

    /// True if some pair now overlaps by more than the tolerance, and either did not overlap
    /// that much before the step or has sunk any deeper than it was.
    fn is_newly_penetrating(
        &self,
        before: &BTreeMap<(usize, usize), f64>,
        contacts: &[PairContact],
    ) -> bool {
        let tolerance = self.config.contact_tolerance;
        contacts.iter().any(|c| {
            let separation = c.contact.separation;
            let previous = before.get(&(c.i, c.j)).copied().unwrap_or(f64::INFINITY);
            ContactState::with_tolerance(separation, tolerance) == ContactState::Penetrating
                && (previous >= -tolerance || separation < previous - EPSILON)
        })
    }

    /// Applies one impulse per approaching pair in contact. Returns the number applied.
    fn resolve(&mut self, contacts: &[PairContact]) -> usize {
        let tolerance = self.config.contact_tolerance;
        let restitution = self.config.restitution;
        let mut applied = 0;
        for PairContact { i, j, contact } in contacts.iter().copied() {
            if contact.separation > tolerance {
                continue;
            }
            let (a, b) = (&self.bodies[i], &self.bodies[j]);
            let n = contact.normal;
            let r_a = contact.point - a.position();
            let r_b = contact.point - b.position();
            let relative_velocity = a.velocity_at(contact.point) - b.velocity_at(contact.point);
            let normal_velocity = relative_velocity.dot(n);
            if normal_velocity >= 0.0 {
                continue;
            }

            let r_a_cross_n = r_a.cross(n);
            let r_b_cross_n = r_b.cross(n);
            let denominator = n.dot(n) * (a.inverse_mass() + b.inverse_mass())
                + a.inverse_moment_of_inertia() * r_a_cross_n * r_a_cross_n
                + b.inverse_moment_of_inertia() * r_b_cross_n * r_b_cross_n;
            if !gg_float::is_finite_positive(denominator) {
                continue;
            }
            let impulse = n * (-(1.0 + restitution) * normal_velocity / denominator);

            self.bodies[i].apply_impulse(impulse, r_a);
            self.bodies[j].apply_impulse(-impulse, r_b);
            applied += 1;
        }
        applied
    }

    /// Pushes interpenetrating pairs apart along their contact normals, sharing the distance by
    /// inverse mass. Velocities are untouched.
    fn correct_positions(&mut self) {
        let tolerance = self.config.contact_tolerance;
        let polygons = self.bodies.iter().map(RigidBody::polygon).collect_vec();
        let pairs = self.candidate_pairs(&polygons);
        for _ in 0..POSITION_ITERATIONS {
            let mut corrected = false;
            for &(i, j) in &pairs {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                let contact = collision::contact(&a.polygon(), &b.polygon(), tolerance);
                if ContactState::of(contact.separation) != ContactState::Penetrating {
                    continue;
                }
                let total_inverse_mass = a.inverse_mass() + b.inverse_mass();
                if !gg_float::is_finite_positive(total_inverse_mass) {
                    continue;
                }
                let offset = contact.normal * (-contact.separation / total_inverse_mass);
                self.bodies[i].displace(offset);
                self.bodies[j].displace(-offset);
                corrected = true;
            }
            if !corrected {
                break;
            }
        }
    }

    /// Removes free bodies that no longer overlap the visible bounds. Skipped while the viewport
    /// has no area.
    fn collect_garbage(&mut self) -> usize {
        if !self.viewport.has_area() {
            return 0;
        }
        let bounds = self.viewport.bounds();
        let count_before = self.bodies.len();
        let removed = &mut self.removed;
        self.bodies.retain(|body| {
            let keep = body.is_fixed() || body.bounding_box().intersects(&bounds);
            if !keep {
                info!("removing {body}: left {bounds:?}");
                removed.insert(body.handle());
            }
            keep
        });
        count_before - self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x in [-2, 2], y in [0, 6].
    fn tall_viewport() -> Viewport {
        Viewport::new(Vec2 {
            x: 800.0,
            y: 1200.0,
        })
        .and_then(|v| v.with_user_transform(AffineMap::flip_y()))
        .and_then(|v| v.with_origin(Vec2 { x: 0.5, y: 0.0 }))
        .unwrap()
    }

    fn run(
        world: &mut PhysicsWorld,
        frames: std::ops::Range<u32>,
        mut inspect: impl FnMut(&PhysicsWorld),
    ) {
        let size = world.viewport().size();
        for frame in frames {
            world.update(f64::from(frame) / 60.0, size);
            inspect(world);
        }
    }

    fn zero_gravity(viewport: Viewport) -> PhysicsWorld {
        PhysicsWorld::new(viewport)
            .with_config(WorldConfig::default().with_gravity(Vec2::zero()))
            .unwrap()
    }

    #[test]
    fn box_comes_to_rest_on_floor() {
        let mut world = PhysicsWorld::new(tall_viewport());
        let floor = world.add(
            RigidBody::fixed(Vec2 { x: 10.0, y: 0.2 }, Vec2 { x: 1.0, y: 0.0 }).unwrap(),
        );
        let body = world.add(
            RigidBody::new(5.0, Vec2 { x: 0.2, y: 0.2 }, Vec2 { x: 1.0, y: 5.0 }).unwrap(),
        );

        let mut lowest = f64::INFINITY;
        run(&mut world, 0..180, |world| {
            let y = world.body(body).unwrap().position().y;
            lowest = lowest.min(y);
        });

        let body = world.body(body).unwrap();
        assert!((body.position().y - 0.2).abs() < 0.01, "{body}");
        assert!(body.velocity().y.abs() < 0.1, "{body}");
        assert!((body.position().x - 1.0).abs() < 1e-6, "{body}");
        assert!(lowest >= 0.1, "sank to {lowest}");
        assert_eq!(world.state(floor), Some(BodyState::Fixed));
        assert_eq!(world.body(floor).unwrap().position(), Vec2 { x: 1.0, y: 0.0 });
    }

    #[test]
    fn fast_body_does_not_tunnel_through_thin_floor() {
        let mut world = PhysicsWorld::new(tall_viewport());
        world.add(RigidBody::fixed(Vec2 { x: 4.0, y: 0.02 }, Vec2 { x: 0.0, y: 1.0 }).unwrap());
        let body = world.add(
            RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: 0.0, y: 2.0 })
                .and_then(|b| b.with_velocity(Vec2 { x: 0.0, y: -30.0 }))
                .unwrap(),
        );

        let floor_top = 1.01;
        let mut rollbacks = 0;
        run(&mut world, 0..60, |world| {
            let body = world.body(body).unwrap();
            let bottom = body.bounding_box().bottom();
            assert!(bottom >= floor_top - 2.0 * CONTACT_TOLERANCE, "{body}");
            rollbacks += world.last_step_stats().rollbacks;
        });
        assert!(rollbacks > 0);
        assert_eq!(world.state(body), Some(BodyState::Free));
    }

    #[test]
    fn fast_body_does_not_tunnel_through_free_slab() {
        let mut world = zero_gravity(tall_viewport());
        let slab = world.add(
            RigidBody::new(10.0, Vec2 { x: 1.0, y: 0.02 }, Vec2 { x: 0.0, y: 3.0 }).unwrap(),
        );
        let body = world.add(
            RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: 0.0, y: 4.5 })
                .and_then(|b| b.with_velocity(Vec2 { x: 0.0, y: -30.0 }))
                .unwrap(),
        );

        run(&mut world, 0..30, |world| {
            let slab = world.body(slab).unwrap();
            let body = world.body(body).unwrap();
            assert!(
                body.bounding_box().bottom() >= slab.bounding_box().top() - 2.0 * CONTACT_TOLERANCE,
                "{body} in {slab}"
            );
        });
        let slab = world.body(slab).unwrap();
        let body = world.body(body).unwrap();
        // Momentum -30, and a rebound of 0.2 * 30 apart.
        assert!((body.velocity().y - 30.0 / 11.0).abs() < 1e-9, "{body}");
        assert!((slab.velocity().y + 36.0 / 11.0).abs() < 1e-9, "{slab}");
        assert!(body.angular_velocity().abs() < 1e-9, "{body}");
    }

    #[test]
    fn stacked_boxes_rest_without_sinking() {
        let mut world = PhysicsWorld::new(tall_viewport());
        world.add(RigidBody::fixed(Vec2 { x: 4.0, y: 0.2 }, Vec2 { x: 0.0, y: 0.1 }).unwrap());
        let heights = [0.3, 0.5, 0.7];
        let stack = heights.map(|y| {
            world.add(RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: 0.0, y }).unwrap())
        });

        run(&mut world, 0..1200, |world| {
            let mut support = 0.2;
            for handle in stack {
                let body = world.body(handle).unwrap();
                let bbox = body.bounding_box();
                assert!(bbox.bottom() >= support - 2.0 * CONTACT_TOLERANCE, "{body}");
                support = bbox.top();
            }
        });
        for (handle, y) in stack.into_iter().zip(heights) {
            let body = world.body(handle).unwrap();
            assert!((body.position().y - y).abs() < 0.01, "{body}");
            assert!(body.position().x.abs() < 1e-6, "{body}");
        }
    }

    #[test]
    fn rotated_boxes_land_without_sinking() {
        for degrees in [10.0, 30.0, 45.0, 75.0, 120.0, 200.0, 315.0] {
            let mut world = PhysicsWorld::new(tall_viewport());
            world.add(RigidBody::fixed(Vec2 { x: 4.0, y: 0.2 }, Vec2 { x: 0.0, y: 0.1 }).unwrap());
            let body = world.add(
                RigidBody::new(1.0, Vec2 { x: 0.4, y: 0.2 }, Vec2 { x: 0.0, y: 1.5 })
                    .and_then(|b| b.with_rotation(Angle::degrees(degrees)))
                    .unwrap(),
            );

            let mut rollbacks = 0;
            run(&mut world, 0..300, |world| {
                let body = world.body(body).unwrap();
                let bottom = body.bounding_box().bottom();
                assert!(bottom >= 0.2 - 2.0 * CONTACT_TOLERANCE, "{degrees} deg: {body}");
                rollbacks += world.last_step_stats().rollbacks;
            });
            let body = world.body(body).unwrap();
            assert!(rollbacks > 0, "{degrees} deg");
            assert!(body.bounding_box().bottom() < 0.25, "{degrees} deg: {body}");
            assert!(body.position().x.abs() < 1e-6, "{degrees} deg: {body}");
        }
    }

    #[test]
    fn bounce_off_fixed_floor_uses_restitution() {
        let mut world = zero_gravity(tall_viewport());
        world.add(RigidBody::fixed(Vec2 { x: 10.0, y: 0.2 }, Vec2 { x: 0.0, y: 0.0 }).unwrap());
        let body = world.add(
            RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: 0.0, y: 0.25 })
                .and_then(|b| b.with_velocity(Vec2 { x: 0.0, y: -3.0 }))
                .unwrap(),
        );

        run(&mut world, 0..30, |_| {});
        let body = world.body(body).unwrap();
        assert!((body.velocity().y - 0.6).abs() < 1e-9, "{body}");
        assert!(body.angular_velocity().abs() < 1e-9, "{body}");
    }

    #[test]
    fn rebound_never_exceeds_restitution_under_gravity() {
        let mut world = PhysicsWorld::new(tall_viewport());
        world.add(RigidBody::fixed(Vec2 { x: 10.0, y: 0.2 }, Vec2 { x: 0.0, y: 0.0 }).unwrap());
        let body = world.add(
            RigidBody::new(2.0, Vec2 { x: 0.3, y: 0.2 }, Vec2 { x: 0.0, y: 3.0 }).unwrap(),
        );

        let mut impact_speed: f64 = 0.0;
        let mut rebound_speed: f64 = 0.0;
        let mut bounced = false;
        run(&mut world, 0..120, |world| {
            let vy = world.body(body).unwrap().velocity().y;
            if !bounced && vy < 0.0 {
                impact_speed = impact_speed.max(-vy);
            } else {
                bounced = true;
                rebound_speed = rebound_speed.max(vy);
            }
        });
        assert!(bounced);
        assert!(rebound_speed > 0.0);
        assert!(rebound_speed <= RESTITUTION * (impact_speed + GRAVITY / 60.0));
    }

    #[test]
    fn head_on_collision_conserves_momentum() {
        let mut world = zero_gravity(tall_viewport());
        let left = world.add(
            RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: -0.15, y: 3.0 })
                .and_then(|b| b.with_velocity(Vec2 { x: 1.0, y: 0.0 }))
                .unwrap(),
        );
        let right = world.add(
            RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: 0.15, y: 3.0 })
                .and_then(|b| b.with_velocity(Vec2 { x: -1.0, y: 0.0 }))
                .unwrap(),
        );

        let mut energy = f64::INFINITY;
        run(&mut world, 0..30, |world| {
            let total = world.bodies().iter().map(RigidBody::kinetic_energy).sum::<f64>();
            assert!(total <= energy + 1e-12);
            energy = total;
        });
        let left = world.body(left).unwrap();
        let right = world.body(right).unwrap();
        assert!((left.velocity().x + 0.2).abs() < 1e-9, "{left}");
        assert!((right.velocity().x - 0.2).abs() < 1e-9, "{right}");
        assert!((left.velocity() + right.velocity()).len() < 1e-9);
        assert!(left.angular_velocity().abs() < 1e-9);
    }

    #[test]
    fn deepening_overlap_exhausts_substeps() {
        let mut world = zero_gravity(tall_viewport());
        world.add(RigidBody::fixed(Vec2::splat(100.0), Vec2 { x: 0.0, y: -50.0 }).unwrap());
        // Already sunk 5cm into the block and driving deeper.
        let body = world.add(
            RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: 0.0, y: 0.05 })
                .and_then(|b| b.with_velocity(Vec2 { x: 0.0, y: -1000.0 }))
                .unwrap(),
        );
        world.update(0.0, world.viewport().size());
        let stats = world.last_step_stats();
        assert_eq!(stats.exhausted, 1, "{stats}");
        assert!(stats.rollbacks >= 14, "{stats}");
        assert!(stats.impulses >= 1, "{stats}");
        let body = world.body(body).unwrap();
        assert!((body.velocity().y - 200.0).abs() < 1e-6, "{body}");
    }

    #[test]
    fn bodies_outside_view_are_removed() {
        let mut world = PhysicsWorld::new(tall_viewport());
        let far = world.add(RigidBody::new(1.0, Vec2::one(), Vec2 { x: 100.0, y: 100.0 }).unwrap());
        let near = world.add(RigidBody::new(1.0, Vec2::one(), Vec2 { x: 0.0, y: 3.0 }).unwrap());
        let far_floor =
            world.add(RigidBody::fixed(Vec2::one(), Vec2 { x: -100.0, y: 0.0 }).unwrap());

        world.update(0.0, world.viewport().size());
        assert_eq!(world.last_step_stats().removed, 1);
        assert_eq!(world.state(far), Some(BodyState::Removed));
        assert!(world.body(far).is_none());
        assert_eq!(world.state(near), Some(BodyState::Free));
        assert_eq!(world.state(far_floor), Some(BodyState::Fixed));
        assert_eq!(world.bodies().len(), 2);

        assert_eq!(world.take_removed(), BTreeSet::from([far]));
        assert_eq!(world.state(far), None);
        assert!(world.take_removed().is_empty());
    }

    #[test]
    fn culling_skipped_without_viewport_area() {
        let mut world = PhysicsWorld::new(Viewport::default());
        let far = world.add(RigidBody::new(1.0, Vec2::one(), Vec2 { x: 100.0, y: 100.0 }).unwrap());
        world.update(0.0, Vec2::zero());
        assert_eq!(world.state(far), Some(BodyState::Free));
        assert_eq!(world.last_step_stats().removed, 0);
    }

    #[test]
    fn clock_only_moves_forward() {
        let mut world = PhysicsWorld::new(tall_viewport());
        let body = world.add(RigidBody::new(1.0, Vec2::splat(0.2), Vec2 { x: 0.0, y: 3.0 }).unwrap());
        let size = world.viewport().size();

        // The first update integrates a single clamped step.
        world.update(10.0, size);
        assert_eq!(world.last_time(), 10.0);
        let velocity = world.body(body).unwrap().velocity();
        assert!((velocity.y + GRAVITY * MAX_STEP_SECONDS).abs() < 1e-12);
        assert_eq!(world.last_step_stats().substeps, 1);

        for time in [10.0, 9.0, f64::NAN, f64::INFINITY] {
            world.update(time, size);
            assert_eq!(world.last_time(), 10.0);
            assert_eq!(world.body(body).unwrap().velocity(), velocity);
            assert_eq!(world.last_step_stats(), StepStats::default());
        }

        // A long pause only integrates the clamped step.
        world.update(20.0, size);
        assert_eq!(world.last_time(), 20.0);
        let velocity = world.body(body).unwrap().velocity();
        assert!((velocity.y + 2.0 * GRAVITY * MAX_STEP_SECONDS).abs() < 1e-12);
    }

    #[test]
    fn invalid_viewport_size_is_ignored() {
        let mut world = PhysicsWorld::new(tall_viewport());
        world.update(0.0, Vec2 { x: -1.0, y: 5.0 });
        assert_eq!(
            world.viewport().size(),
            Vec2 {
                x: 800.0,
                y: 1200.0
            }
        );
        world.update(1.0, Vec2 { x: 400.0, y: 600.0 });
        assert_eq!(world.viewport().size(), Vec2 { x: 400.0, y: 600.0 });
        assert!((world.bounds().top() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn collision_queries() {
        let mut world = PhysicsWorld::new(tall_viewport());
        let a = world.add(RigidBody::new(1.0, Vec2::one(), Vec2 { x: 0.0, y: 2.0 }).unwrap());
        let b = world.add(
            RigidBody::new(1.0, Vec2::one(), Vec2 { x: 0.5, y: 2.5 })
                .and_then(|b| b.with_rotation(Angle::degrees(30.0)))
                .unwrap(),
        );
        let c = world.add(RigidBody::new(1.0, Vec2::one(), Vec2 { x: 1.0, y: 2.0 }).unwrap());
        let far = world.add(RigidBody::new(1.0, Vec2::one(), Vec2 { x: -1.5, y: 5.0 }).unwrap());

        assert_eq!(world.colliding_with(a), vec![b]);
        assert!(world.colliding_with(far).is_empty());
        let pairs = world.colliding_pairs();
        assert!(pairs.contains(&UnorderedPair::new(a, b)));
        assert!(pairs.contains(&UnorderedPair::new(b, c)));
        // a and c only touch.
        assert!(!pairs.contains(&UnorderedPair::new(a, c)));
        assert!(pairs.iter().all(|pair| !pair.contains(far)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let world = PhysicsWorld::new(tall_viewport())
            .with_config(WorldConfig::default().with_restitution(1.5));
        assert!(matches!(
            world,
            Err(PhysicsError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn conversions_delegate_to_viewport() {
        let world = PhysicsWorld::new(tall_viewport());
        assert_eq!(
            world.convert_point_to_view(Vec2::zero()),
            Vec2 {
                x: 400.0,
                y: 1200.0
            }
        );
        assert_eq!(
            world.convert_point_to_world(Vec2 {
                x: 400.0,
                y: 1200.0
            }),
            Vec2::zero()
        );
        assert_eq!(
            world.convert_size_to_view(Vec2::one()),
            Vec2::splat(200.0)
        );
        assert_eq!(world.convert_size_to_world(Vec2::splat(200.0)), Vec2::one());
    }
}
