use anyhow::{Context, Result};
use rand::Rng;
use tumble::core::prelude::*;
use tumble::util::log::setup_log;

const FRAMES: u32 = 240;
const FRAMES_PER_SECOND: f64 = 60.0;
const BOX_COUNT: usize = 8;
/// Areal density of the spawned boxes, in kg/m².
const DENSITY: f64 = 100.0;

fn main() -> Result<()> {
    setup_log()?;

    let view_size = Vec2 {
        x: 800.0,
        y: 1200.0,
    };
    let viewport = Viewport::new(view_size)?
        .with_user_transform(AffineMap::flip_y())?
        .with_origin(Vec2 { x: 0.5, y: 0.0 })?;
    let mut world = PhysicsWorld::new(viewport);
    let bounds = world.bounds();
    info!("visible world: {bounds:?}");

    world.add(
        RigidBody::fixed(
            Vec2 {
                x: bounds.extent().x,
                y: 0.2,
            },
            Vec2 {
                x: bounds.centre().x,
                y: 0.1,
            },
        )
        .context("creating floor")?,
    );

    let mut rng = rand::thread_rng();
    for i in 0..BOX_COUNT {
        let size = Vec2 {
            x: rng.gen_range(0.1..0.5),
            y: rng.gen_range(0.1..0.5),
        };
        let position = Vec2 {
            x: rng.gen_range(bounds.left() + 0.5..bounds.right() - 0.5),
            y: 1.5 + 0.6 * i as f64,
        };
        let body = RigidBody::new(DENSITY * size.x * size.y, size, position)
            .and_then(|b| b.with_rotation(Angle::degrees(rng.gen_range(0.0..360.0))))
            .with_context(|| format!("creating box {i}"))?;
        world.add(body);
    }

    for frame in 0..FRAMES {
        world.update(f64::from(frame) / FRAMES_PER_SECOND, view_size);
        if frame % 60 == 0 {
            info!(
                "t={:.2}s: {} bodies, {}, {} overlapping pairs",
                world.last_time(),
                world.bodies().len(),
                world.last_step_stats(),
                world.colliding_pairs().len()
            );
        }
    }

    for body in world.bodies() {
        let view = world.convert_point_to_view(body.position());
        info!("{body} (view {view})");
    }
    Ok(())
}
