//! Headless охота
//!
//! Спавнит стадо, охотник стреляет по случайной цели раз в 2 секунды.
//! Время ручное (1/60 sec на update), поэтому прогон детерминирован.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::Rng;

use hunting_dot_simulation::combat::apply_damage_requests;
use hunting_dot_simulation::*;

/// Каждые 120 fixed тиков (2 sec) - выстрел
const SHOT_EVERY_STEPS: u32 = 120;

/// Снаряды охотника; камень не режет, кровотечения от него нет
const AMMO: [&str; 4] = ["arrow-flint", "arrow-copper", "spear-scrap", "stone"];

fn spawn_herd(mut commands: Commands) {
    for _ in 0..4 {
        commands.spawn((
            Creature,
            Harvestable,
            EntityCode::new("deer-male"),
            Health::new(30.0),
        ));
    }

    // Волк не дичь - кровоточить не будет
    commands.spawn((Creature, EntityCode::new("wolf-male"), Health::new(25.0)));
}

fn hunter_fires(
    mut commands: Commands,
    mut rng: ResMut<DeterministicRng>,
    mut step: Local<u32>,
    targets: Query<Entity, (With<Creature>, Without<Dead>)>,
    mut requests: EventWriter<DamageRequest>,
) {
    *step += 1;
    if *step % SHOT_EVERY_STEPS != 0 {
        return;
    }

    let mut alive: Vec<Entity> = targets.iter().collect();
    if alive.is_empty() {
        return;
    }
    alive.sort_by_key(|entity| entity.index());

    let target = alive[rng.rng.gen_range(0..alive.len())];
    let code = AMMO[rng.rng.gen_range(0..AMMO.len())];
    let damage = rng.rng.gen_range(3.0..8.0_f32);

    let projectile = commands.spawn(projectile(code)).id();
    requests.write(DamageRequest::projectile_hit(target, projectile, damage));
}

fn main() {
    let seed = 42;
    println!("Starting headless hunt (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )))
    .add_plugins(SimulationPlugin)
    .add_systems(Startup, spawn_herd)
    .add_systems(FixedUpdate, hunter_fires.before(apply_damage_requests));

    // 60 секунд симуляции
    for tick in 0..3600 {
        app.update();

        if tick % 600 == 0 {
            let bleeding = app.world().resource::<BleedLedger>().len();
            let world = app.world_mut();
            let mut herd = world.query_filtered::<&Health, With<Creature>>();
            let total_health: f32 = herd.iter(world).map(|health| health.current).sum();

            println!(
                "Tick {}: {} bleeding, herd health {:.2}",
                tick, bleeding, total_health
            );
        }
    }

    println!("Hunt complete!");
}
