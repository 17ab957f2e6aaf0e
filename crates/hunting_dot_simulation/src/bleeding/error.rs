//! Bleed errors
//!
//! Ни одна ошибка не фатальна для симуляции: rejected damage - no-op
//! до следующего тика, invalid config - откат на Default.

use bevy::prelude::*;
use thiserror::Error;

use crate::combat::DamageRejected;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BleedError {
    #[error("bleed damage to {entity:?} rejected: {reason}")]
    DamageRejected {
        entity: Entity,
        reason: DamageRejected,
    },

    #[error("invalid bleed config: {0}")]
    InvalidConfig(String),
}
