//! World-level компоненты: SimulationSide, Projectile

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::EntityCode;

/// Сторона симуляции, на которой работает App
///
/// Server - authoritative (урон, bleed, смерть).
/// Client - только отображение, bleed не запускается.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum SimulationSide {
    #[default]
    Server,
    Client,
}

impl SimulationSide {
    pub fn is_authoritative(&self) -> bool {
        matches!(self, SimulationSide::Server)
    }
}

/// Маркер: летящий снаряд (стрела, копьё, камень)
///
/// Снаряд сам по себе урон не наносит - host присылает DamageRequest
/// с `source_entity = projectile`, классификатор смотрит на его EntityCode.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Projectile;

/// Bundle снаряда с конкретным type code ("arrow-flint", "spear-copper")
pub fn projectile(code: impl Into<String>) -> (Projectile, EntityCode) {
    (Projectile, EntityCode::new(code))
}
