//! Tick Driver: отсчёт кровотечения и периодический урон
//!
//! Время копится в `time_since_last_tick`, урон применяется на каждой
//! границе целого интервала. Остаток накопителя не теряется, поэтому
//! 60 Hz FixedUpdate и 1 Hz listener дают одинаковое число применений и
//! одинаковый суммарный урон. При f32 delta вида 1/60 граница может
//! сдвинуться на один host кадр.

use bevy::prelude::*;

use super::ledger::BleedLedger;
use super::{BleedConfig, BleedError};

/// Host seam: liveness lookup + применение урона
///
/// ECS реализация - `WorldBleedHost` (systems.rs).
pub trait BleedHost {
    /// false - entity не резолвится или мертва
    fn is_alive(&self, entity: Entity) -> bool;

    /// Нанести bleed урон (Internal / Injury)
    fn apply_bleed_damage(&mut self, entity: Entity, amount: f32) -> Result<(), BleedError>;
}

/// Одно успешное применение bleed урона
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BleedApplication {
    pub entity: Entity,
    pub amount: f32,
    /// Остаток кровотечения после этого интервала
    pub remaining_time: f32,
}

/// Итог tick pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub applications: Vec<BleedApplication>,
    /// Таймер истёк
    pub expired: Vec<Entity>,
    /// Entity не резолвится / уже мертва до урона
    pub stale: Vec<Entity>,
    /// Умерла от кровотечения в этом pass
    pub died: Vec<Entity>,
    /// Host отклонил урон
    pub rejected: u32,
}

impl TickReport {
    pub fn total_damage(&self) -> f32 {
        self.applications.iter().map(|application| application.amount).sum()
    }

    /// Все entity, удалённые из ledger в этом pass
    pub fn removed(&self) -> impl Iterator<Item = Entity> + '_ {
        self.expired
            .iter()
            .chain(self.stale.iter())
            .chain(self.died.iter())
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
            && self.expired.is_empty()
            && self.stale.is_empty()
            && self.died.is_empty()
            && self.rejected == 0
    }
}

impl BleedLedger {
    /// Один tick pass по всем кровотечениям
    ///
    /// 1. delta ≤ 0 / NaN - ничего не меняется
    /// 2. entity не жива → stale, без урона
    /// 3. на каждой границе интервала: урон, -interval от remaining
    ///    (последний неполный интервал платит пропорционально остатку)
    /// 4. remaining ≤ 0 → expired
    /// 5. удаление после pass (iterator не инвалидируется)
    pub fn tick(
        &mut self,
        delta_secs: f32,
        config: &BleedConfig,
        host: &mut impl BleedHost,
    ) -> TickReport {
        let mut report = TickReport::default();

        if !delta_secs.is_finite() || delta_secs <= 0.0 || self.entries.is_empty() {
            return report;
        }

        // Валидный config гарантирует, что каждый интервал уменьшает remaining
        if let Err(err) = config.validate() {
            crate::logger::log_error(&format!("Bleed tick skipped: {}", err));
            return report;
        }
        let interval = config.tick_interval_secs;

        for (&entity, state) in self.entries.iter_mut() {
            if !host.is_alive(entity) {
                report.stale.push(entity);
                continue;
            }

            state.time_since_last_tick += delta_secs;

            let mut rejected_this_pass = false;
            let mut died = false;

            while state.time_since_last_tick >= interval && state.remaining_time > 0.0 {
                state.time_since_last_tick -= interval;

                if !rejected_this_pass {
                    let amount = config.tick_damage(state.damage_per_second, state.remaining_time);

                    match host.apply_bleed_damage(entity, amount) {
                        Ok(()) => report.applications.push(BleedApplication {
                            entity,
                            amount,
                            remaining_time: state.remaining_time - interval,
                        }),
                        Err(err) => {
                            // Повтор только на следующем интервале
                            rejected_this_pass = true;
                            report.rejected += 1;
                            crate::logger::log(&format!("Bleed tick no-op: {}", err));
                        }
                    }
                }

                state.remaining_time -= interval;

                if !host.is_alive(entity) {
                    died = true;
                    break;
                }
            }

            if died {
                report.died.push(entity);
            } else if state.remaining_time <= 0.0 {
                report.expired.push(entity);
            }
        }

        for entity in report.removed() {
            self.entries.remove(&entity);
        }

        report
    }
}
