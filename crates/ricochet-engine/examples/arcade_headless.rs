//! Headless arcade round: a ship fires at asteroids dropped by a spawn timer.
//!
//! Runs a fixed number of frames without a window, logging the score and
//! frame timings. An optional JSON config path may be passed as the first
//! argument.
//!
//! Run with: `RUST_LOG=ricochet_engine=debug cargo run --example arcade_headless`

use std::cell::Cell;
use std::rc::Rc;

use rand::Rng;
use ricochet_engine::prelude::*;
use tracing::info;

const SHIP_LAYER: u32 = 0;
const ROCK_LAYER: u32 = 1;
const BULLET_LAYER: u32 = 2;

/// Counts draw calls instead of drawing.
#[derive(Default)]
struct CountingCanvas {
    shapes: usize,
    sprites: usize,
}

impl Canvas for CountingCanvas {
    fn circle(&mut self, _x: f64, _y: f64, _radius: f64, _color: Color) {
        self.shapes += 1;
    }
    fn rectangle(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, _rotation: f64, _color: Color) {
        self.shapes += 1;
    }
    fn polygon(&mut self, _x: f64, _y: f64, _points: &[(f64, f64)], _rotation: f64, _color: Color) {
        self.shapes += 1;
    }
    fn sprite(&mut self, _x: f64, _y: f64, _sheet: &str, _frame: u32, _rotation: f64, _scale: f64) {
        self.sprites += 1;
    }
}

/// Fires a bullet straight up every time the space key goes down.
fn ship_controls(world: &mut World, ship: EntityId, _dt: f64) {
    let Some(input) = world.resource::<InputState>() else {
        return;
    };
    let fire = input.just_pressed(&Button::key("Space"));
    let steer = f64::from(u8::from(input.is_pressed(&Button::key("ArrowRight"))))
        - f64::from(u8::from(input.is_pressed(&Button::key("ArrowLeft"))));
    if let Some(p) = world.get_mut::<Physics>(ship) {
        p.vx = steer * 180.0;
    }
    if !fire {
        return;
    }
    let Some((x, y)) = world.get::<Transform>(ship).map(Transform::position) else {
        return;
    };
    world.spawn(
        EntityTemplate::new()
            .with(Transform::new(x, y - 16.0))
            .with(Physics::new().with_velocity(0.0, -420.0))
            .with(
                Collider::circle(3.0)
                    .with_layer(BULLET_LAYER)
                    .with_collides_with([ROCK_LAYER])
                    .as_trigger(),
            )
            .with(Lifetime::new(x, y, 500.0))
            .with(Renderer::circle(3.0).with_color(Color::rgb(255, 230, 120)))
            .with_tag("bullet"),
    );
}

fn main() -> Result<(), anyhow::Error> {
    ricochet_engine::logging::init_default();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut engine = Engine::new(config);

    let score = Rc::new(Cell::new(0u32));
    let s = Rc::clone(&score);
    engine.on_collision("bullet", "rock", move |world, bullet, rock, phase| {
        if phase == CollisionPhase::Start {
            s.set(s.get() + 1);
            world.destroy_entity(bullet);
            world.destroy_entity(rock);
        }
    });

    engine.load_scene(2024, |world, ctx| {
        let (cx, _) = ctx.center();
        world.spawn(
            EntityTemplate::new()
                .with(Transform::new(cx, ctx.height - 40.0))
                .with(
                    Physics::new()
                        .with_friction(0.5)
                        .with_bounds(Bounds::new(0.0, 0.0, ctx.width, ctx.height)),
                )
                .with(
                    Collider::circle(14.0)
                        .with_layer(SHIP_LAYER)
                        .with_collides_with([ROCK_LAYER]),
                )
                .with(ScriptedBehavior::new().with("controls", ship_controls))
                .with(Renderer::sprite("ship", 0).with_z_index(10))
                .with_tag("ship"),
        );
    });

    let mut rocks = engine.spawn_timer(0.4, |rng, ctx| {
        let x = rng.gen_range(20.0..ctx.width - 20.0);
        let radius = rng.gen_range(8.0..22.0);
        EntityTemplate::new()
            .with(Transform::new(x, -radius))
            .with(Physics::new().with_velocity(rng.gen_range(-30.0..30.0), rng.gen_range(60.0..140.0)))
            .with(
                Collider::circle(radius)
                    .with_layer(ROCK_LAYER)
                    .with_collides_with([SHIP_LAYER, ROCK_LAYER]),
            )
            .with(Lifetime::new(x, -radius, ctx.height + 2.0 * radius))
            .with(Renderer::circle(radius).with_color(Color::rgb(150, 140, 130)))
            .with_tag("rock")
    });

    let dt = engine.config().fixed_dt;
    let mut canvas = CountingCanvas::default();
    for frame in 0..1_800u32 {
        // scripted input: sweep left and right, firing twice a second
        let key = if (frame / 120) % 2 == 0 { "ArrowLeft" } else { "ArrowRight" };
        if frame % 120 == 0 {
            engine.push_input(InputEvent::Release(Button::key("ArrowLeft")));
            engine.push_input(InputEvent::Release(Button::key("ArrowRight")));
            engine.push_input(InputEvent::Press(Button::key(key)));
        }
        match frame % 30 {
            0 => engine.push_input(InputEvent::Press(Button::key("Space"))),
            1 => engine.push_input(InputEvent::Release(Button::key("Space"))),
            _ => {}
        }

        rocks.advance(dt);
        engine.advance(dt);
        engine.render(&mut canvas);

        if frame % 600 == 599 {
            let diag = engine.last_diagnostics();
            info!(
                frame = engine.frame_count(),
                entities = diag.entity_count,
                score = score.get(),
                total_us = diag.total_time.as_micros() as u64,
                "progress"
            );
            for (name, elapsed) in &diag.system_times {
                info!(system = %name, us = elapsed.as_micros() as u64, "system time");
            }
        }
    }

    info!(
        score = score.get(),
        rocks_spawned = rocks.fired(),
        shapes_drawn = canvas.shapes,
        sprites_drawn = canvas.sprites,
        "round over"
    );
    Ok(())
}
