//! Tests for the bleed tick driver.

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Barrier;
    use std::thread;

    use approx::assert_relative_eq;
    use bevy::prelude::*;

    use crate::bleeding::{
        BleedConfig, BleedError, BleedHost, BleedLedger, SharedBleedLedger,
        MAX_BLEED_DURATION_SECONDS, MIN_BLEED_TICK_DAMAGE,
    };
    use crate::combat::DamageRejected;

    /// Host без ECS: HP по entity, invulnerable set, лог урона
    #[derive(Default)]
    struct TestHost {
        health: HashMap<Entity, f32>,
        invulnerable: HashSet<Entity>,
        damage_log: Vec<(Entity, f32)>,
    }

    impl TestHost {
        fn with_creature(entity: Entity, health: f32) -> Self {
            let mut host = Self::default();
            host.health.insert(entity, health);
            host
        }

        fn damage_to(&self, entity: Entity) -> f32 {
            self.damage_log
                .iter()
                .filter(|(target, _)| *target == entity)
                .map(|(_, amount)| amount)
                .sum()
        }
    }

    impl BleedHost for TestHost {
        fn is_alive(&self, entity: Entity) -> bool {
            self.health.get(&entity).is_some_and(|hp| *hp > 0.0)
        }

        fn apply_bleed_damage(&mut self, entity: Entity, amount: f32) -> Result<(), BleedError> {
            if self.invulnerable.contains(&entity) {
                return Err(BleedError::DamageRejected {
                    entity,
                    reason: DamageRejected::Invulnerable,
                });
            }
            let hp = self.health.get_mut(&entity).ok_or(BleedError::DamageRejected {
                entity,
                reason: DamageRejected::AlreadyDead,
            })?;
            *hp = (*hp - amount).max(0.0);
            self.damage_log.push((entity, amount));
            Ok(())
        }
    }

    fn deer() -> Entity {
        Entity::from_raw(10)
    }

    /// Ledger с одним кровотечением от попадания `hit_damage`
    fn bleeding_ledger(config: &BleedConfig, hit_damage: f32) -> BleedLedger {
        let mut ledger = BleedLedger::from_config(config);
        ledger.upsert(deer(), config.damage_per_second(hit_damage), config.duration_secs);
        ledger
    }

    #[test]
    fn test_full_bleed_fifteen_one_second_ticks() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 1000.0);

        for second in 1..=14 {
            let report = ledger.tick(1.0, &config, &mut host);
            assert_eq!(report.applications.len(), 1, "second {}", second);
            assert!(ledger.contains(deer()), "removed early at second {}", second);
            assert_relative_eq!(
                ledger.get(deer()).unwrap().remaining_time,
                15.0 - second as f32
            );
        }

        let last = ledger.tick(1.0, &config, &mut host);
        assert_eq!(last.applications.len(), 1);
        assert_eq!(last.expired, vec![deer()]);
        assert!(!ledger.contains(deer()));

        // 10 урона × 50% = 5 за 15 секунд
        assert_eq!(host.damage_log.len(), 15);
        assert_relative_eq!(host.damage_to(deer()), 5.0, epsilon = 1e-4);

        // Дальше тишина
        let after = ledger.tick(1.0, &config, &mut host);
        assert!(after.is_empty());
        assert_eq!(host.damage_log.len(), 15);
    }

    #[test]
    fn test_zero_delta_changes_nothing() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let before = *ledger.get(deer()).unwrap();
        let mut host = TestHost::with_creature(deer(), 100.0);

        let report = ledger.tick(0.0, &config, &mut host);

        assert!(report.is_empty());
        assert_eq!(*ledger.get(deer()).unwrap(), before);
        assert!(host.damage_log.is_empty());
    }

    #[test]
    fn test_negative_and_nan_delta_ignored() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let before = *ledger.get(deer()).unwrap();
        let mut host = TestHost::with_creature(deer(), 100.0);

        ledger.tick(-1.0, &config, &mut host);
        ledger.tick(f32::NAN, &config, &mut host);

        assert_eq!(*ledger.get(deer()).unwrap(), before);
        assert!(host.damage_log.is_empty());
    }

    #[test]
    fn test_sub_second_ticks_accumulate() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 100.0);

        for _ in 0..3 {
            ledger.tick(0.25, &config, &mut host);
        }
        assert!(host.damage_log.is_empty());
        assert_eq!(ledger.get(deer()).unwrap().time_since_last_tick, 0.75);
        assert_eq!(ledger.get(deer()).unwrap().remaining_time, 15.0);

        ledger.tick(0.25, &config, &mut host);
        assert_eq!(host.damage_log.len(), 1);
        assert_eq!(ledger.get(deer()).unwrap().time_since_last_tick, 0.0);
        assert_eq!(ledger.get(deer()).unwrap().remaining_time, 14.0);
    }

    #[test]
    fn test_tick_rate_does_not_change_total() {
        let config = BleedConfig::default();

        let mut fast = bleeding_ledger(&config, 9.0);
        let mut fast_host = TestHost::with_creature(deer(), 100.0);
        for _ in 0..(15 * 4) {
            fast.tick(0.25, &config, &mut fast_host);
        }

        let mut slow = bleeding_ledger(&config, 9.0);
        let mut slow_host = TestHost::with_creature(deer(), 100.0);
        for _ in 0..15 {
            slow.tick(1.0, &config, &mut slow_host);
        }

        assert!(fast.is_empty());
        assert!(slow.is_empty());
        assert_eq!(fast_host.damage_log.len(), slow_host.damage_log.len());
        assert_relative_eq!(
            fast_host.damage_to(deer()),
            slow_host.damage_to(deer()),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_large_delta_pays_each_whole_second() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 100.0);

        let report = ledger.tick(2.5, &config, &mut host);

        assert_eq!(report.applications.len(), 2);
        let state = ledger.get(deer()).unwrap();
        assert_eq!(state.remaining_time, 13.0);
        assert_eq!(state.time_since_last_tick, 0.5);
    }

    #[test]
    fn test_huge_delta_never_overpays() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 100.0);

        let report = ledger.tick(100.0, &config, &mut host);

        assert_eq!(report.applications.len(), 15);
        assert_eq!(report.expired, vec![deer()]);
        assert_relative_eq!(report.total_damage(), 5.0, epsilon = 1e-4);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_unresolvable_entity_removed_without_damage() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::default(); // deer despawned

        let report = ledger.tick(1.0, &config, &mut host);

        assert_eq!(report.stale, vec![deer()]);
        assert!(report.applications.is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_dead_entity_removed_without_damage() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 0.0);

        let report = ledger.tick(1.0, &config, &mut host);

        assert_eq!(report.stale, vec![deer()]);
        assert!(host.damage_log.is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_bleeding_out_removes_entry() {
        let config = BleedConfig::default();
        // 60 урона → 2/sec
        let mut ledger = bleeding_ledger(&config, 60.0);
        let mut host = TestHost::with_creature(deer(), 3.0);

        let first = ledger.tick(1.0, &config, &mut host);
        assert!(first.died.is_empty());

        let second = ledger.tick(1.0, &config, &mut host);
        assert_eq!(second.died, vec![deer()]);
        assert!(ledger.is_empty());

        ledger.tick(1.0, &config, &mut host);
        assert_eq!(host.damage_log.len(), 2);
    }

    #[test]
    fn test_killing_blow_stops_multi_second_pass() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 60.0);
        let mut host = TestHost::with_creature(deer(), 3.0);

        let report = ledger.tick(5.0, &config, &mut host);

        assert_eq!(report.applications.len(), 2);
        assert_eq!(report.died, vec![deer()]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_rejected_damage_is_noop_and_retried_next_interval() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 100.0);
        host.invulnerable.insert(deer());

        let report = ledger.tick(1.0, &config, &mut host);
        assert_eq!(report.rejected, 1);
        assert!(report.applications.is_empty());
        assert_eq!(ledger.get(deer()).unwrap().remaining_time, 14.0);

        host.invulnerable.clear();
        let retry = ledger.tick(1.0, &config, &mut host);
        assert_eq!(retry.applications.len(), 1);
        assert_eq!(retry.rejected, 0);
    }

    #[test]
    fn test_rejection_not_retried_within_pass() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 100.0);
        host.invulnerable.insert(deer());

        let report = ledger.tick(3.0, &config, &mut host);

        assert_eq!(report.rejected, 1);
        assert_eq!(ledger.get(deer()).unwrap().remaining_time, 12.0);
    }

    #[test]
    fn test_tiny_rate_uses_floor() {
        let config = BleedConfig::default();
        let mut ledger = BleedLedger::from_config(&config);
        ledger.upsert(deer(), 0.0, config.duration_secs);
        let mut host = TestHost::with_creature(deer(), 10.0);

        let report = ledger.tick(1.0, &config, &mut host);

        assert_eq!(report.applications[0].amount, MIN_BLEED_TICK_DAMAGE);
        assert!(report.applications[0].amount > 0.0);
    }

    #[test]
    fn test_refresh_mid_bleed_restarts_timer() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 100.0);

        for _ in 0..10 {
            ledger.tick(1.0, &config, &mut host);
        }
        assert_eq!(ledger.get(deer()).unwrap().remaining_time, 5.0);

        ledger.upsert(deer(), config.damage_per_second(10.0), config.duration_secs);
        assert_eq!(ledger.get(deer()).unwrap().remaining_time, 15.0);

        for _ in 0..15 {
            ledger.tick(1.0, &config, &mut host);
        }
        assert!(ledger.is_empty());
        assert_eq!(host.damage_log.len(), 25);
    }

    #[test]
    fn test_independent_entities_tick_together() {
        let config = BleedConfig::default();
        let wolf = Entity::from_raw(11);
        let mut ledger = bleeding_ledger(&config, 10.0);
        ledger.upsert(wolf, 1.0, 3.0);

        let mut host = TestHost::with_creature(deer(), 100.0);
        host.health.insert(wolf, 100.0);

        for _ in 0..3 {
            ledger.tick(1.0, &config, &mut host);
        }

        assert!(!ledger.contains(wolf));
        assert!(ledger.contains(deer()));
        assert_relative_eq!(host.damage_to(wolf), 3.0);
    }

    #[test]
    fn test_fractional_duration_pays_exact_percent() {
        let config = BleedConfig {
            duration_secs: 2.5,
            bleed_percent: 100.0,
            ..default()
        };
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 100.0);

        for _ in 0..10 {
            ledger.tick(1.0, &config, &mut host);
        }

        // 4 + 4 + 2 (последние полсекунды)
        assert!(ledger.is_empty());
        assert_eq!(host.damage_log.len(), 3);
        assert_relative_eq!(host.damage_log[2].1, 2.0, epsilon = 1e-5);
        assert_relative_eq!(host.damage_to(deer()), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_interval_not_dividing_duration_keeps_total() {
        let config = BleedConfig {
            tick_interval_secs: 0.4,
            ..default()
        };
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 100.0);

        for _ in 0..20 {
            ledger.tick(1.0, &config, &mut host);
        }

        // 15 / 0.4 = 37.5 → 38 применений, хвост наполовину
        assert!(ledger.is_empty());
        assert_eq!(host.damage_log.len(), 38);
        assert_relative_eq!(host.damage_to(deer()), 5.0, epsilon = 1e-3);
    }

    #[test]
    fn test_invalid_config_skips_tick() {
        let config = BleedConfig::default();
        let mut ledger = bleeding_ledger(&config, 10.0);
        let before = *ledger.get(deer()).unwrap();
        let mut host = TestHost::with_creature(deer(), 100.0);

        let endless = BleedConfig {
            duration_secs: 1e9,
            ..default()
        };
        let tiny_interval = BleedConfig {
            tick_interval_secs: 1e-9,
            ..default()
        };

        assert!(ledger.tick(1e9, &endless, &mut host).is_empty());
        assert!(ledger.tick(1e9, &tiny_interval, &mut host).is_empty());
        assert_eq!(*ledger.get(deer()).unwrap(), before);
        assert!(host.damage_log.is_empty());
    }

    #[test]
    fn test_longest_bleed_with_huge_delta_terminates() {
        let config = BleedConfig {
            duration_secs: MAX_BLEED_DURATION_SECONDS,
            ..default()
        };
        let mut ledger = bleeding_ledger(&config, 10.0);
        let mut host = TestHost::with_creature(deer(), 1_000_000.0);

        let report = ledger.tick(1e9, &config, &mut host);

        assert_eq!(report.expired, vec![deer()]);
        assert_eq!(report.applications.len(), 3600);
        assert_relative_eq!(report.total_damage(), 5.0, epsilon = 1e-2);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_shared_ledger_concurrent_refresh_and_tick() {
        const REFRESHERS: usize = 8;
        const REFRESHES_PER_THREAD: usize = 200;

        let config = BleedConfig::default();
        let shared = SharedBleedLedger::new(BleedLedger::from_config(&config));
        let barrier = std::sync::Arc::new(Barrier::new(REFRESHERS + 1));

        let mut handles = Vec::new();
        for _ in 0..REFRESHERS {
            let shared = shared.clone();
            let barrier = barrier.clone();
            let config = config.clone();
            handles.push(thread::spawn(move || {
                barrier.wait();
                for _ in 0..REFRESHES_PER_THREAD {
                    shared.upsert(
                        deer(),
                        config.damage_per_second(10.0),
                        config.duration_secs,
                    );
                }
            }));
        }

        let ticker = {
            let shared = shared.clone();
            let barrier = barrier.clone();
            let config = config.clone();
            thread::spawn(move || {
                let mut host = TestHost::with_creature(deer(), 1_000_000.0);
                barrier.wait();
                for _ in 0..20 {
                    shared.tick(0.5, &config, &mut host);
                }
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        ticker.join().unwrap();

        // Одна запись, в допустимом состоянии
        assert_eq!(shared.len(), 1);
        let state = shared.get(deer()).unwrap();
        assert!(state.remaining_time > 0.0 && state.remaining_time <= config.duration_secs);
        assert!(state.time_since_last_tick >= 0.0 && state.time_since_last_tick < 1.0);
        assert_relative_eq!(state.damage_per_second, config.damage_per_second(10.0));
    }
}
