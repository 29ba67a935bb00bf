//! Sight and attack range checks.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_common::EntityId;
use tracing::warn;

use crate::agent::AgentState;
use crate::spatial::{QueryShape, SpatialQuery};

/// What an agent perceives of its target this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptionReading {
    /// Target overlaps the sight sphere.
    pub in_sight: bool,
    /// Target overlaps the attack sphere (implies `in_sight`).
    pub in_attack_range: bool,
}

impl PerceptionReading {
    /// Behavior state this reading calls for, ignoring flee.
    #[must_use]
    pub const fn desired_state(self) -> AgentState {
        match (self.in_sight, self.in_attack_range) {
            (true, true) => AgentState::Attack,
            (true, false) => AgentState::Chase,
            _ => AgentState::Patrol,
        }
    }
}

/// Sight and attack radii of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    sight_range: f32,
    attack_range: f32,
}

impl Perception {
    /// Creates perception radii. Negative or non-finite values become zero and
    /// the attack range is clamped to the sight range.
    #[must_use]
    pub fn new(sight_range: f32, attack_range: f32) -> Self {
        let sight = sanitize_range(sight_range);
        let mut attack = sanitize_range(attack_range);
        if attack > sight {
            warn!(
                "Attack range {} exceeds sight range {}, clamping",
                attack, sight
            );
            attack = sight;
        }
        Self {
            sight_range: sight,
            attack_range: attack,
        }
    }

    /// Sight radius.
    #[must_use]
    pub const fn sight_range(&self) -> f32 {
        self.sight_range
    }

    /// Attack radius.
    #[must_use]
    pub const fn attack_range(&self) -> f32 {
        self.attack_range
    }

    /// Tests whether `target`'s colliders overlap the sight and attack spheres
    /// centered at `eye`.
    pub fn evaluate(
        &self,
        eye: Vec3,
        target: EntityId,
        spatial: &dyn SpatialQuery,
    ) -> PerceptionReading {
        let in_sight = spatial.overlaps_root(
            &QueryShape::Sphere {
                center: eye,
                radius: self.sight_range,
            },
            target,
        );
        let in_attack_range = in_sight
            && spatial.overlaps_root(
                &QueryShape::Sphere {
                    center: eye,
                    radius: self.attack_range,
                },
                target,
            );
        PerceptionReading {
            in_sight,
            in_attack_range,
        }
    }
}

fn sanitize_range(range: f32) -> f32 {
    if range.is_finite() {
        range.max(0.0)
    } else {
        0.0
    }
}
