//! Hunting Damage-over-Time Simulation Core
//!
//! ECS-симуляция на Bevy 0.16 (headless, server side)
//!
//! Стрелы и копья оставляют раны: подстреленная дичь кровоточит
//! BLEEDING_DURATION_SECONDS секунд и теряет BLEEDING_DAMAGE_PERCENT% урона попадания.
//!
//! Слои:
//! - combat: host damage pipeline (DamageRequest → Health → DamageReceived / EntityDied)
//! - bleeding: classifier + ledger + tick driver поверх hooks host'а

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod bleeding;
pub mod combat;
pub mod components;
pub mod logger;

// Re-export базовых типов для удобства
pub use bleeding::{
    classify, BleedConfig, BleedLedger, BleedState, BleedingEnded, BleedingPlugin,
    BleedingStarted, BLEEDING_DAMAGE_PERCENT, BLEEDING_DURATION_SECONDS,
};
pub use combat::{
    receive_damage, CombatPlugin, DamageReceived, DamageRequest, Dead, EntityDied,
};
pub use components::*;
pub use logger::{init_logger, log, log_error, log_info, log_warning};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<SimulationSide>()
            .init_resource::<DeterministicRng>()
            .add_plugins((CombatPlugin, BleedingPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
