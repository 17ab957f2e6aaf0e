//! Damage Classifier: какой урон запускает кровотечение
//!
//! Чистая функция от DamageReceived. Ledger не трогает - это делает hook система.

use bevy::prelude::*;

use super::config::{BleedConfig, PROJECTILE_CODE_MARKERS};
use crate::combat::DamageReceived;

/// Результат классификации: кровотечение для target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BleedTrigger {
    pub target: Entity,
    pub damage_per_second: f32,
    pub duration: f32,
}

/// Type code принадлежит снаряду (стрела/копьё)?
///
/// Substring match, case-sensitive: "arrow-flint", "spear-copper",
/// "arrowhead_decor" тоже совпадёт.
pub fn is_projectile_code(code: &str) -> bool {
    PROJECTILE_CODE_MARKERS
        .iter()
        .any(|marker| code.contains(marker))
}

/// Кто получил урон - для проверки, может ли он кровоточить
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BleedTarget {
    pub creature: bool,
    pub player: bool,
    pub harvestable: bool,
    pub alive: bool,
}

impl BleedTarget {
    /// Кровоточат только живые существа, не игроки.
    /// С `harvestable_only` - только дичь.
    pub fn is_eligible(&self, config: &BleedConfig) -> bool {
        if !self.creature || self.player || !self.alive {
            return false;
        }

        !config.harvestable_only || self.harvestable
    }
}

/// Классифицирует урон
///
/// Bleed запускается только если:
/// - событие с authoritative стороны (Server)
/// - host реально применил урон
/// - урон конечный и неотрицательный
/// - есть source entity, и её code содержит "arrow" или "spear"
pub fn classify(event: &DamageReceived, config: &BleedConfig) -> Option<BleedTrigger> {
    if !event.side.is_authoritative() || !event.applied {
        return None;
    }

    if !event.damage.is_finite() || event.damage < 0.0 {
        return None;
    }

    let source = event.source.source_entity.as_ref()?;
    if !is_projectile_code(source.code_or_empty()) {
        return None;
    }

    Some(BleedTrigger {
        target: event.target,
        damage_per_second: config.damage_per_second(event.damage),
        duration: config.duration_secs,
    })
}
