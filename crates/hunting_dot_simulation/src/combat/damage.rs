//! Damage pipeline (host side)
//!
//! DamageRequest → receive_damage → DamageReceived (+ EntityDied)
//!
//! DamageReceived - это hook для всех подписчиков (bleed, UI, звуки).
//! Подписчики только читают урон, изменить его уже нельзя.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{EntityCode, Health, Invulnerable, SimulationSide};

/// Откуда пришёл урон
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum DamageCause {
    /// Другая entity (снаряд, зверь, игрок)
    Entity,
    /// Изнутри (кровотечение, голод)
    Internal,
    /// Окружение (падение, огонь, утопление)
    Environment,
}

/// Тип урона (для armor/resistance правил host'а)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum DamageKind {
    PiercingAttack,
    SlashingAttack,
    BluntAttack,
    Injury,
}

/// Entity-источник урона, с type code на момент попадания
///
/// `code == None` - у источника нет EntityCode (или он уже despawned).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntity {
    pub entity: Entity,
    pub code: Option<String>,
}

impl SourceEntity {
    /// Type code или пустая строка
    pub fn code_or_empty(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }
}

/// Полное описание источника урона
#[derive(Debug, Clone, PartialEq)]
pub struct DamageSource {
    pub cause: DamageCause,
    pub kind: DamageKind,
    pub source_entity: Option<SourceEntity>,
}

impl DamageSource {
    /// Урон от кровотечения: Internal + Injury, без source entity
    pub fn bleeding() -> Self {
        Self {
            cause: DamageCause::Internal,
            kind: DamageKind::Injury,
            source_entity: None,
        }
    }
}

/// Event: host хочет нанести урон (снаряд попал, зверь укусил)
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    pub cause: DamageCause,
    pub kind: DamageKind,
    /// Снаряд / атакующий (EntityCode резолвится в момент обработки)
    pub source_entity: Option<Entity>,
}

impl DamageRequest {
    /// Попадание снарядом (стрела, копьё)
    pub fn projectile_hit(target: Entity, projectile: Entity, amount: f32) -> Self {
        Self {
            target,
            amount,
            cause: DamageCause::Entity,
            kind: DamageKind::PiercingAttack,
            source_entity: Some(projectile),
        }
    }
}

/// Event: урон обработан host'ом
///
/// `applied == false` - host отклонил урон (invulnerable, уже мёртв).
#[derive(Event, Debug, Clone)]
pub struct DamageReceived {
    pub target: Entity,
    pub damage: f32,
    pub source: DamageSource,
    pub side: SimulationSide,
    pub applied: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв (Health <= 0)
///
/// Деспавн не автоматический - туши остаются для разделки.
#[derive(Component, Debug)]
pub struct Dead;

/// Почему host отклонил урон
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DamageRejected {
    #[error("target is invulnerable")]
    Invulnerable,
    #[error("target is already dead")]
    AlreadyDead,
    #[error("invalid damage amount {0}")]
    InvalidAmount(f32),
}

/// Применяет урон к Health по правилам host'а
///
/// Возвращает фактически снятое HP (обрезано до current).
pub fn receive_damage(
    health: &mut Health,
    invulnerable: bool,
    amount: f32,
) -> Result<f32, DamageRejected> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(DamageRejected::InvalidAmount(amount));
    }
    if !health.is_alive() {
        return Err(DamageRejected::AlreadyDead);
    }
    if invulnerable {
        return Err(DamageRejected::Invulnerable);
    }

    Ok(health.take_damage(amount))
}

/// Система: обработка DamageRequest событий
///
/// 1. Резолвим EntityCode источника (снаряд может быть уже despawned)
/// 2. receive_damage → Health
/// 3. DamageReceived для подписчиков (bleed hook читает его)
/// 4. EntityDied на переходе alive → dead
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut received_events: EventWriter<DamageReceived>,
    mut died_events: EventWriter<EntityDied>,
    mut targets: Query<(&mut Health, Has<Invulnerable>)>,
    codes: Query<&EntityCode>,
    side: Option<Res<SimulationSide>>,
) {
    let side = side.map(|s| *s).unwrap_or_default();

    for request in requests.read() {
        let Ok((mut health, invulnerable)) = targets.get_mut(request.target) else {
            crate::logger::log_warning(&format!(
                "DamageRequest: target {:?} has no Health component",
                request.target
            ));
            continue;
        };

        let source_entity = request.source_entity.map(|entity| SourceEntity {
            entity,
            code: codes.get(entity).ok().map(|code| code.0.clone()),
        });

        let was_alive = health.is_alive();
        let outcome = receive_damage(&mut health, invulnerable, request.amount);

        let (damage, applied) = match outcome {
            Ok(taken) => (taken, true),
            Err(reason) => {
                crate::logger::log(&format!(
                    "Damage to {:?} rejected: {}",
                    request.target, reason
                ));
                (request.amount, false)
            }
        };

        received_events.write(DamageReceived {
            target: request.target,
            damage,
            source: DamageSource {
                cause: request.cause,
                kind: request.kind,
                source_entity,
            },
            side,
            applied,
        });

        if was_alive && !health.is_alive() {
            died_events.write(EntityDied {
                entity: request.target,
                killer: request.source_entity,
            });

            crate::logger::log_info(&format!(
                "Entity {:?} killed by {:?}",
                request.target, request.source_entity
            ));
        }
    }
}

/// Система: маркер Dead для умерших
pub fn mark_dead(mut commands: Commands, mut death_events: EventReader<EntityDied>) {
    for event in death_events.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert(Dead);
        }
    }
}
