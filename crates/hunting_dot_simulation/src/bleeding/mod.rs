//! Bleeding: damage-over-time от стрел и копий
//!
//! Компоненты:
//! - classifier: DamageReceived → BleedTrigger (arrow/spear, server side)
//! - ledger: BleedLedger resource, Entity → BleedState
//! - ticker: BleedLedger::tick поверх BleedHost (урон раз в секунду)
//! - systems: ECS hooks (damage / death / tick / exit)
//!
//! Поток данных:
//! DamageReceived → start_bleeding_on_projectile_hit → BleedLedger
//! FixedUpdate → tick_bleeding → BleedLedger::tick → receive_damage (Internal/Injury)
//! EntityDied → clear_bleeding_on_death

use bevy::prelude::*;

pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod systems;
pub mod ticker;

#[cfg(test)]
mod ticker_tests;

// Re-export основных типов
pub use classifier::{classify, is_projectile_code, BleedTarget, BleedTrigger};
pub use config::{
    BleedConfig, BLEEDING_DAMAGE_PERCENT, BLEEDING_DURATION_SECONDS, BLEED_TICK_INTERVAL_SECONDS,
    MAX_BLEED_DURATION_SECONDS, MAX_BLEED_TICKS, MIN_BLEED_TICK_DAMAGE,
    MIN_BLEED_TICK_INTERVAL_SECONDS, PROJECTILE_CODE_MARKERS,
};
pub use error::BleedError;
pub use events::{BleedEndReason, BleedingEnded, BleedingStarted};
pub use ledger::{BleedLedger, BleedState, SharedBleedLedger};
pub use systems::{
    clear_bleeding_on_death, clear_bleeding_on_exit, start_bleeding_on_projectile_hit,
    tick_bleeding, WorldBleedHost,
};
pub use ticker::{BleedApplication, BleedHost, TickReport};

use crate::combat::{DamageReceived, EntityDied};
use crate::components::SimulationSide;

/// Bleeding Plugin
///
/// Регистрирует bleed системы в FixedUpdate, после damage pipeline.
///
/// Порядок выполнения:
/// 1. start_bleeding_on_projectile_hit - новые попадания → ledger
/// 2. clear_bleeding_on_death - смерти → удаление из ledger
/// 3. tick_bleeding - отсчёт + урон
///
/// На AppExit (Last) ledger очищается.
pub struct BleedingPlugin;

impl Plugin for BleedingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BleedConfig>()
            .register_type::<BleedConfig>();

        if let Err(err) = app.world().resource::<BleedConfig>().validate() {
            crate::logger::log_error(&format!("{}, falling back to defaults", err));
            app.insert_resource(BleedConfig::default());
        }

        let ledger = BleedLedger::from_config(app.world().resource::<BleedConfig>());
        app.insert_resource(ledger);

        // Hook события host'а (add_event идемпотентен, CombatPlugin тоже их регистрирует)
        app.add_event::<DamageReceived>()
            .add_event::<EntityDied>()
            .add_event::<BleedingStarted>()
            .add_event::<BleedingEnded>();

        app.add_systems(
            FixedUpdate,
            (
                systems::start_bleeding_on_projectile_hit,
                systems::clear_bleeding_on_death,
                systems::tick_bleeding,
            )
                .chain()
                .after(crate::combat::apply_damage_requests),
        );

        app.add_systems(Last, systems::clear_bleeding_on_exit);

        let side = app
            .world()
            .get_resource::<SimulationSide>()
            .copied()
            .unwrap_or_default();
        crate::logger::log_info(&format!(
            "Hunting damage over time loaded ({:?} side)",
            side
        ));
    }
}
