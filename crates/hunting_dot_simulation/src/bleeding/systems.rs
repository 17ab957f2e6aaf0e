//! Bleed ECS systems: hooks host'а → classifier / ledger / tick driver

use bevy::prelude::*;

use super::classifier::{classify, BleedTarget};
use super::events::{BleedEndReason, BleedingEnded, BleedingStarted};
use super::ledger::BleedLedger;
use super::ticker::BleedHost;
use super::{BleedConfig, BleedError};
use crate::combat::{
    receive_damage, DamageReceived, DamageRejected, DamageSource, EntityDied,
};
use crate::components::{
    Creature, EntityCode, Harvestable, Health, Invulnerable, Player, SimulationSide,
};

/// Query целей кровотечения (Health + флаг неуязвимости)
pub type BleedTargets<'w, 's> = Query<'w, 's, (&'static mut Health, Has<Invulnerable>)>;

/// Type code для логов ("deer-male" / "unknown")
fn code_of(codes: &Query<&EntityCode>, entity: Entity) -> String {
    codes
        .get(entity)
        .map(|code| code.0.clone())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// BleedHost поверх ECS мира
///
/// Урон идёт через тот же `receive_damage`, что и обычные попадания,
/// с источником Internal / Injury. Результаты копятся и отправляются
/// событиями после tick pass.
pub struct WorldBleedHost<'a, 'w, 's> {
    targets: &'a mut BleedTargets<'w, 's>,
    side: SimulationSide,
    received: Vec<DamageReceived>,
    killed: Vec<Entity>,
}

impl<'a, 'w, 's> WorldBleedHost<'a, 'w, 's> {
    pub fn new(targets: &'a mut BleedTargets<'w, 's>, side: SimulationSide) -> Self {
        Self {
            targets,
            side,
            received: Vec::new(),
            killed: Vec::new(),
        }
    }
}

impl BleedHost for WorldBleedHost<'_, '_, '_> {
    fn is_alive(&self, entity: Entity) -> bool {
        self.targets
            .get(entity)
            .is_ok_and(|(health, _)| health.is_alive())
    }

    fn apply_bleed_damage(&mut self, entity: Entity, amount: f32) -> Result<(), BleedError> {
        let Ok((mut health, invulnerable)) = self.targets.get_mut(entity) else {
            return Err(BleedError::DamageRejected {
                entity,
                reason: DamageRejected::AlreadyDead,
            });
        };

        let taken = receive_damage(&mut health, invulnerable, amount)
            .map_err(|reason| BleedError::DamageRejected { entity, reason })?;

        self.received.push(DamageReceived {
            target: entity,
            damage: taken,
            source: DamageSource::bleeding(),
            side: self.side,
            applied: true,
        });

        if !health.is_alive() {
            self.killed.push(entity);
        }

        Ok(())
    }
}

/// Система: damage hook → кровотечение
///
/// 1. classify (сторона, applied, снаряд arrow/spear)
/// 2. цель - живое существо, не игрок, дичь
/// 3. upsert: новый таймер, без стакания
pub fn start_bleeding_on_projectile_hit(
    mut damage_events: EventReader<DamageReceived>,
    targets: Query<(Has<Creature>, Has<Player>, Has<Harvestable>, Option<&Health>)>,
    codes: Query<&EntityCode>,
    config: Res<BleedConfig>,
    mut ledger: ResMut<BleedLedger>,
    mut started_events: EventWriter<BleedingStarted>,
) {
    for event in damage_events.read() {
        let Some(trigger) = classify(event, &config) else {
            continue;
        };

        let Ok((creature, player, harvestable, health)) = targets.get(trigger.target) else {
            continue;
        };

        let target = BleedTarget {
            creature,
            player,
            harvestable,
            alive: health.is_some_and(|health| health.is_alive()),
        };
        if !target.is_eligible(&config) {
            continue;
        }

        let refreshed = ledger.contains(trigger.target);
        if !ledger.upsert(trigger.target, trigger.damage_per_second, trigger.duration) {
            crate::logger::log_warning(&format!(
                "Bleed for {:?} refused: invalid duration {}",
                trigger.target, trigger.duration
            ));
            continue;
        }

        let damage_per_second = ledger
            .get(trigger.target)
            .map(|state| state.damage_per_second)
            .unwrap_or(trigger.damage_per_second);

        started_events.write(BleedingStarted {
            entity: trigger.target,
            damage_per_second,
            duration: trigger.duration,
            refreshed,
        });

        crate::logger::log_info(&format!(
            "🩸 {} hit by projectile for {} damage, bleeding {}/s for {}s",
            code_of(&codes, trigger.target),
            event.damage,
            damage_per_second,
            trigger.duration
        ));
    }
}

/// Система: death hook → кровотечение прекращается сразу
pub fn clear_bleeding_on_death(
    mut death_events: EventReader<EntityDied>,
    mut ledger: ResMut<BleedLedger>,
    mut ended_events: EventWriter<BleedingEnded>,
) {
    for event in death_events.read() {
        if ledger.remove(event.entity).is_some() {
            ended_events.write(BleedingEnded {
                entity: event.entity,
                reason: BleedEndReason::Died,
            });
        }
    }
}

/// Система: tick hook → периодический bleed урон
///
/// Delta из `Time` (в FixedUpdate - fixed timestep). Ledger сам копит
/// время и платит урон на каждой целой секунде.
#[allow(clippy::too_many_arguments)]
pub fn tick_bleeding(
    time: Res<Time>,
    config: Res<BleedConfig>,
    side: Option<Res<SimulationSide>>,
    mut ledger: ResMut<BleedLedger>,
    mut targets: BleedTargets,
    codes: Query<&EntityCode>,
    mut received_events: EventWriter<DamageReceived>,
    mut died_events: EventWriter<EntityDied>,
    mut ended_events: EventWriter<BleedingEnded>,
) {
    if ledger.is_empty() {
        return;
    }

    let side = side.map(|s| *s).unwrap_or_default();
    let mut host = WorldBleedHost::new(&mut targets, side);
    let report = ledger.tick(time.delta_secs(), &config, &mut host);
    let WorldBleedHost {
        received, killed, ..
    } = host;

    for application in &report.applications {
        crate::logger::log(&format!(
            "{} bleeding: {} damage, {:.1}s remaining",
            code_of(&codes, application.entity),
            application.amount,
            application.remaining_time
        ));
    }

    for event in received {
        received_events.write(event);
    }

    for entity in killed {
        died_events.write(EntityDied {
            entity,
            killer: None,
        });

        crate::logger::log_info(&format!(
            "{} bled out",
            code_of(&codes, entity)
        ));
    }

    for &entity in &report.expired {
        ended_events.write(BleedingEnded {
            entity,
            reason: BleedEndReason::Expired,
        });
    }

    for &entity in &report.stale {
        // Резолвится, но мёртв - умер не от нас; не резолвится - despawned
        let reason = if targets.contains(entity) {
            BleedEndReason::Died
        } else {
            BleedEndReason::Lost
        };
        ended_events.write(BleedingEnded { entity, reason });
    }

    for &entity in &report.died {
        ended_events.write(BleedingEnded {
            entity,
            reason: BleedEndReason::Died,
        });
    }
}

/// Система: shutdown - на AppExit ledger очищается
pub fn clear_bleeding_on_exit(
    mut exit_events: EventReader<AppExit>,
    mut ledger: ResMut<BleedLedger>,
) {
    if exit_events.is_empty() {
        return;
    }
    exit_events.clear();

    if !ledger.is_empty() {
        crate::logger::log_info(&format!(
            "Shutdown: dropping {} active bleeds",
            ledger.len()
        ));
    }
    ledger.clear();
}
