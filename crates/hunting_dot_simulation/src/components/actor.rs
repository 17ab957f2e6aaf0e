//! Базовые компоненты существ: Creature, Health, маркеры охоты

use bevy::prelude::*;

/// Существо (животное, игрок, NPC) - всё что может получать урон
///
/// Автоматически добавляет Health через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health)]
pub struct Creature;

/// Маркер: существо можно разделать после смерти (дичь)
///
/// Только дичь истекает кровью от стрел и копий.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Harvestable;

/// Маркер: entity управляется игроком
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Маркер: entity не принимает урон (god mode, cutscene, etc.)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Invulnerable;

/// Type code entity ("deer-male", "arrow-flint", "spear-copper")
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct EntityCode(pub String);

impl EntityCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Здоровье существа
///
/// Инвариант: 0 ≤ current ≤ max.
/// f32 - bleed наносит дробный урон (0.333/sec).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Снимает HP, возвращает фактически снятое (не больше current)
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let taken = amount.clamp(0.0, self.current);
        self.current -= taken;
        taken
    }
}
