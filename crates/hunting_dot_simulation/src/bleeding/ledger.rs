//! Bleed Ledger: кто сейчас кровоточит и сколько осталось
//!
//! Инварианты:
//! - запись есть ⇔ entity кровоточит
//! - 0 < remaining_time ≤ duration пока запись существует
//! - damage_per_second ≥ rate_floor > 0

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::{MAX_BLEED_DURATION_SECONDS, MIN_BLEED_TICK_DAMAGE};
use super::ticker::{BleedHost, TickReport};
use super::BleedConfig;

/// Состояние кровотечения одной entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct BleedState {
    /// Урон в секунду (зафиксирован в момент попадания)
    pub damage_per_second: f32,
    /// Сколько секунд осталось
    pub remaining_time: f32,
    /// Накопитель времени внутри текущего интервала
    pub time_since_last_tick: f32,
}

impl BleedState {
    pub fn new(damage_per_second: f32, duration: f32) -> Self {
        Self {
            damage_per_second,
            remaining_time: duration,
            time_since_last_tick: 0.0,
        }
    }
}

/// Ledger всех кровоточащих entities (Resource)
///
/// Владелец - BleedingPlugin: создаётся при build, очищается на AppExit.
#[derive(Resource, Debug, Clone)]
pub struct BleedLedger {
    pub(super) entries: HashMap<Entity, BleedState>,
    rate_floor: f32,
}

impl Default for BleedLedger {
    fn default() -> Self {
        Self::new(MIN_BLEED_TICK_DAMAGE)
    }
}

impl BleedLedger {
    /// Пустой ledger с минимальной скоростью кровотечения
    pub fn new(rate_floor: f32) -> Self {
        Self {
            entries: HashMap::new(),
            rate_floor: if rate_floor.is_finite() && rate_floor > 0.0 {
                rate_floor
            } else {
                MIN_BLEED_TICK_DAMAGE
            },
        }
    }

    pub fn from_config(config: &BleedConfig) -> Self {
        Self::new(config.min_tick_damage)
    }

    /// Начать или обновить кровотечение
    ///
    /// Повторное попадание перезаписывает запись: таймер заново, rate от
    /// последнего попадания, без стакания. `false` - duration невалидна
    /// (не конечна, ≤ 0 или больше MAX_BLEED_DURATION_SECONDS), ledger не изменён.
    pub fn upsert(&mut self, entity: Entity, damage_per_second: f32, duration: f32) -> bool {
        if !duration.is_finite() || duration <= 0.0 || duration > MAX_BLEED_DURATION_SECONDS {
            return false;
        }

        let rate = if damage_per_second.is_finite() {
            damage_per_second.max(self.rate_floor)
        } else {
            self.rate_floor
        };

        self.entries.insert(entity, BleedState::new(rate, duration));
        true
    }

    /// Убрать кровотечение (идемпотентно)
    pub fn remove(&mut self, entity: Entity) -> Option<BleedState> {
        self.entries.remove(&entity)
    }

    pub fn get(&self, entity: Entity) -> Option<&BleedState> {
        self.entries.get(&entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    /// Все активные кровотечения (порядок не определён)
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &BleedState)> {
        self.entries.iter().map(|(entity, state)| (*entity, state))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shutdown: удалить все записи
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Ledger для host'ов, которые дёргают hooks из разных потоков
///
/// Один mutex на upsert/remove/tick: refresh и tick pass не могут
/// пересечься на одной записи.
#[derive(Debug, Clone, Default)]
pub struct SharedBleedLedger(Arc<Mutex<BleedLedger>>);

impl SharedBleedLedger {
    pub fn new(ledger: BleedLedger) -> Self {
        Self(Arc::new(Mutex::new(ledger)))
    }

    /// Poisoned lock не роняет host - берём данные как есть
    fn lock(&self) -> MutexGuard<'_, BleedLedger> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn upsert(&self, entity: Entity, damage_per_second: f32, duration: f32) -> bool {
        self.lock().upsert(entity, damage_per_second, duration)
    }

    pub fn remove(&self, entity: Entity) -> Option<BleedState> {
        self.lock().remove(entity)
    }

    pub fn get(&self, entity: Entity) -> Option<BleedState> {
        self.lock().get(entity).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn tick(
        &self,
        delta_secs: f32,
        config: &BleedConfig,
        host: &mut impl BleedHost,
    ) -> TickReport {
        self.lock().tick(delta_secs, config, host)
    }
}
