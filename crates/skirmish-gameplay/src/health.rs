//! Damageable health.
//!
//! This module provides:
//! - The `Damageable` capability shared by players, agents and props
//! - `Health`, the standard implementation with clamping and one-shot defeat
//! - Defeat effects (loot drops, scene flags) consumed by the world

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default maximum health for actors.
pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

/// Result of applying damage to a `Damageable`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Damage was negative, non-finite, or the target was already defeated.
    Ignored,
    /// Damage landed and the target survived.
    Damaged {
        /// Health left after the hit
        remaining: f32,
    },
    /// This hit defeated the target. Reported exactly once per target.
    Defeated,
}

impl DamageOutcome {
    /// Returns true if this hit defeated the target.
    #[must_use]
    pub const fn is_defeated(self) -> bool {
        matches!(self, Self::Defeated)
    }

    /// Returns true if the damage changed the target's health state.
    #[must_use]
    pub const fn landed(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Capability of any entity that can take damage and be defeated.
pub trait Damageable {
    /// Applies damage, clamping health at zero.
    fn take_damage(&mut self, amount: f32) -> DamageOutcome;
    /// Restores health, clamping at the maximum.
    fn heal(&mut self, amount: f32);
    /// Current health.
    fn current_health(&self) -> f32;
    /// Maximum health.
    fn max_health(&self) -> f32;
    /// Whether the defeat transition has happened.
    fn is_defeated(&self) -> bool;
}

/// Side effect performed by the world when an entity is defeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefeatEffect {
    /// Drop loot at the entity's position.
    SpawnLoot {
        /// Loot item name
        item: String,
        /// Stack size
        #[serde(default = "default_loot_count")]
        count: u32,
    },
    /// Toggle a scene flag (opening a gate when a boss falls, ...).
    SetSceneFlag {
        /// Flag name
        flag: String,
        /// Value to set
        #[serde(default = "default_flag_value")]
        value: bool,
    },
}

const fn default_loot_count() -> u32 {
    1
}

const fn default_flag_value() -> bool {
    true
}

/// Health pool of a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    max: f32,
    defeated: bool,
    #[serde(default)]
    defeat_effects: Vec<DefeatEffect>,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEALTH)
    }
}

impl Health {
    /// Creates a full health pool. A non-positive or non-finite maximum falls
    /// back to the default.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() && max > 0.0 {
            max
        } else {
            warn!(
                "Invalid max health {}, using default {}",
                max, DEFAULT_MAX_HEALTH
            );
            DEFAULT_MAX_HEALTH
        };
        Self {
            current: max,
            max,
            defeated: false,
            defeat_effects: Vec::new(),
        }
    }

    /// Sets the starting health, clamped to `[0, max]`.
    #[must_use]
    pub fn with_current(mut self, current: f32) -> Self {
        self.current = if current.is_finite() {
            current.clamp(0.0, self.max)
        } else {
            self.max
        };
        self
    }

    /// Adds an effect performed on defeat.
    #[must_use]
    pub fn with_defeat_effect(mut self, effect: DefeatEffect) -> Self {
        self.defeat_effects.push(effect);
        self
    }

    /// Effects the world should perform when this entity is defeated.
    #[must_use]
    pub fn defeat_effects(&self) -> &[DefeatEffect] {
        &self.defeat_effects
    }
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.defeated || !amount.is_finite() || amount < 0.0 {
            return DamageOutcome::Ignored;
        }

        self.current = (self.current - amount).max(0.0);
        if self.current <= 0.0 {
            self.defeated = true;
            debug!("Health depleted after {} damage", amount);
            return DamageOutcome::Defeated;
        }

        DamageOutcome::Damaged {
            remaining: self.current,
        }
    }

    fn heal(&mut self, amount: f32) {
        if self.defeated || !amount.is_finite() || amount < 0.0 {
            return;
        }
        self.current = (self.current + amount).min(self.max);
    }

    fn current_health(&self) -> f32 {
        self.current
    }

    fn max_health(&self) -> f32 {
        self.max
    }

    fn is_defeated(&self) -> bool {
        self.defeated
    }
}
