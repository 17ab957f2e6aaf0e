//! Bleed events (ECS → подписчики: UI, звуки, статистика)

use bevy::prelude::*;

/// Event: кровотечение началось или обновлено новым попаданием
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BleedingStarted {
    pub entity: Entity,
    pub damage_per_second: f32,
    pub duration: f32,
    /// true - entity уже кровоточила, таймер сброшен
    pub refreshed: bool,
}

/// Почему кровотечение закончилось
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleedEndReason {
    /// Таймер истёк
    Expired,
    /// Entity умерла (от кровотечения или от чего угодно)
    Died,
    /// Entity больше не резолвится (despawned)
    Lost,
}

/// Event: кровотечение закончилось, запись удалена из ledger
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BleedingEnded {
    pub entity: Entity,
    pub reason: BleedEndReason,
}
