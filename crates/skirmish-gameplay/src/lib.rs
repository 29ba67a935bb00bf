//! # Skirmish Gameplay
//!
//! Melee combat resolution and hostile-agent behavior.
//!
//! This crate provides:
//! - Damageable health with defeat effects
//! - Weapon profiles and TOML loading
//! - Pluggable attack strategies (sweep, area) with per-swing hit dedup
//! - Attack controller with cooldown, activation delay and stamina gating
//! - Perception and the Patrol/Chase/Attack/Flee agent state machine
//! - A reference arena wiring every collaborator together
//!
//! Everything runs on a single-threaded fixed tick. Collaborators (spatial
//! queries, world targets, presentation, movement) are reached through traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod arena;
pub mod attack;
pub mod health;
pub mod hit_registry;
pub mod loader;
pub mod movement;
pub mod perception;
pub mod presentation;
pub mod scheduler;
pub mod spatial;
pub mod stamina;
pub mod strategy;
pub mod targets;
pub mod weapon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::*;
    pub use crate::arena::*;
    pub use crate::attack::*;
    pub use crate::health::*;
    pub use crate::hit_registry::*;
    pub use crate::loader::*;
    pub use crate::movement::*;
    pub use crate::perception::*;
    pub use crate::presentation::*;
    pub use crate::scheduler::*;
    pub use crate::spatial::*;
    pub use crate::stamina::*;
    pub use crate::strategy::*;
    pub use crate::targets::*;
    pub use crate::weapon::*;
}

pub use prelude::*;
