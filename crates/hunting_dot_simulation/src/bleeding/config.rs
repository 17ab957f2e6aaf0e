//! Bleed константы и BleedConfig resource

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::BleedError;

/// Процент урона попадания, который уходит в кровотечение (суммарно за всё время)
pub const BLEEDING_DAMAGE_PERCENT: f32 = 50.0;

/// Длительность кровотечения (секунды)
pub const BLEEDING_DURATION_SECONDS: f32 = 15.0;

/// Интервал между применениями bleed урона (секунды)
pub const BLEED_TICK_INTERVAL_SECONDS: f32 = 1.0;

/// Минимальный урон за тик - тик никогда не бывает no-op
pub const MIN_BLEED_TICK_DAMAGE: f32 = 0.0001;

/// Верхняя граница длительности кровотечения (секунды)
pub const MAX_BLEED_DURATION_SECONDS: f32 = 3600.0;

/// Нижняя граница интервала тика (секунды)
pub const MIN_BLEED_TICK_INTERVAL_SECONDS: f32 = 0.01;

/// Максимум тиков за одно кровотечение (duration / interval)
pub const MAX_BLEED_TICKS: f32 = 10_000.0;

/// Подстроки type code снарядов, вызывающих кровотечение (case-sensitive)
pub const PROJECTILE_CODE_MARKERS: [&str; 2] = ["arrow", "spear"];

/// Параметры кровотечения
///
/// Plugin регистрирует через `init_resource`, поэтому host может вставить
/// свой BleedConfig до `add_plugins(BleedingPlugin)`.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
pub struct BleedConfig {
    /// % урона попадания, распределяемый на всё кровотечение
    pub bleed_percent: f32,
    /// Полная длительность (секунды), сбрасывается каждым попаданием
    pub duration_secs: f32,
    /// Интервал применения урона (секунды)
    pub tick_interval_secs: f32,
    /// Нижняя граница урона за тик
    pub min_tick_damage: f32,
    /// Кровоточит только дичь (Harvestable)
    pub harvestable_only: bool,
}

impl Default for BleedConfig {
    fn default() -> Self {
        Self {
            bleed_percent: BLEEDING_DAMAGE_PERCENT,
            duration_secs: BLEEDING_DURATION_SECONDS,
            tick_interval_secs: BLEED_TICK_INTERVAL_SECONDS,
            min_tick_damage: MIN_BLEED_TICK_DAMAGE,
            harvestable_only: true,
        }
    }
}

impl BleedConfig {
    /// Урон в секунду для попадания `damage`
    ///
    /// damage × percent / 100 / duration - за полную длительность
    /// набегает ровно percent% от урона попадания.
    pub fn damage_per_second(&self, damage: f32) -> f32 {
        damage * (self.bleed_percent / 100.0 / self.duration_secs)
    }

    /// Урон одного тика (не меньше min_tick_damage)
    ///
    /// Последний тик платит только за оставшееся время, если duration
    /// не кратна интервалу.
    pub fn tick_damage(&self, damage_per_second: f32, remaining_time: f32) -> f32 {
        let span = self.tick_interval_secs.min(remaining_time.max(0.0));
        (damage_per_second * span).max(self.min_tick_damage)
    }

    pub fn validate(&self) -> Result<(), BleedError> {
        let checks = [
            ("bleed_percent", self.bleed_percent),
            ("duration_secs", self.duration_secs),
            ("tick_interval_secs", self.tick_interval_secs),
            ("min_tick_damage", self.min_tick_damage),
        ];

        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(BleedError::InvalidConfig(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }

        if self.duration_secs > MAX_BLEED_DURATION_SECONDS {
            return Err(BleedError::InvalidConfig(format!(
                "duration_secs must be at most {}, got {}",
                MAX_BLEED_DURATION_SECONDS, self.duration_secs
            )));
        }

        if self.tick_interval_secs < MIN_BLEED_TICK_INTERVAL_SECONDS {
            return Err(BleedError::InvalidConfig(format!(
                "tick_interval_secs must be at least {}, got {}",
                MIN_BLEED_TICK_INTERVAL_SECONDS, self.tick_interval_secs
            )));
        }

        let ticks = self.duration_secs / self.tick_interval_secs;
        if ticks > MAX_BLEED_TICKS {
            return Err(BleedError::InvalidConfig(format!(
                "duration_secs / tick_interval_secs must be at most {}, got {}",
                MAX_BLEED_TICKS, ticks
            )));
        }

        Ok(())
    }
}
