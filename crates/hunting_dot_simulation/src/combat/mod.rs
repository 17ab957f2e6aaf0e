//! Combat module (host damage pipeline)
//!
//! ECS ответственность:
//! - Game state: Health, Dead
//! - Damage rules: receive_damage (invulnerable, already dead, invalid amount)
//! - Events: DamageRequest (вход), DamageReceived / EntityDied (выход, hooks)

use bevy::prelude::*;

pub mod damage;

// Re-export основных типов
pub use damage::{
    apply_damage_requests, mark_dead, receive_damage, DamageCause, DamageKind, DamageReceived,
    DamageRejected, DamageRequest, DamageSource, Dead, EntityDied, SourceEntity,
};

/// Combat Plugin
///
/// Регистрирует damage pipeline в FixedUpdate.
///
/// Порядок выполнения:
/// 1. apply_damage_requests - DamageRequest → Health → DamageReceived / EntityDied
/// 2. mark_dead - Dead маркер для умерших
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageRequest>()
            .add_event::<DamageReceived>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (damage::apply_damage_requests, damage::mark_dead).chain(),
        );
    }
}
