//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: существа (Creature, Health, EntityCode, маркеры Harvestable/Player/Invulnerable)
//! - world: сторона симуляции (SimulationSide), снаряды (Projectile)

pub mod actor;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use world::*;
