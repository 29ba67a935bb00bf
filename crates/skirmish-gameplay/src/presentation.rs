//! Presentation hooks.
//!
//! The core decides *when* and *where* an effect, sound or animation pose
//! happens; rendering and audio live behind [`Presentation`]. Calls are
//! fire-and-forget.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_common::EntityId;

use crate::agent::{AgentPose, AgentState};
use crate::weapon::{EffectRef, SoundRef};

/// Sink for effects, sounds and agent animation state.
pub trait Presentation {
    /// Spawns a visual effect at a world position.
    fn spawn_effect(&mut self, effect: &EffectRef, at: Vec3);

    /// Plays a one-shot sound at a world position.
    fn play_sound(&mut self, sound: &SoundRef, at: Vec3);

    /// An agent changed behavior state.
    fn agent_state_changed(&mut self, _agent: EntityId, _from: AgentState, _to: AgentState) {}

    /// An agent changed animation pose.
    fn agent_pose_changed(&mut self, _agent: EntityId, _pose: AgentPose) {}
}

/// A recorded presentation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresentationEvent {
    /// Effect spawned.
    Effect {
        /// Effect handle
        effect: EffectRef,
        /// Position
        at: Vec3,
    },
    /// Sound played.
    Sound {
        /// Sound handle
        sound: SoundRef,
        /// Position
        at: Vec3,
    },
    /// Agent state transition.
    StateChanged {
        /// Agent
        agent: EntityId,
        /// Previous state
        from: AgentState,
        /// New state
        to: AgentState,
    },
    /// Agent pose change.
    PoseChanged {
        /// Agent
        agent: EntityId,
        /// New pose
        pose: AgentPose,
    },
}

/// Records every call in order.
#[derive(Debug, Clone, Default)]
pub struct PresentationLog {
    events: Vec<PresentationEvent>,
}

impl PresentationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events.
    #[must_use]
    pub fn events(&self) -> &[PresentationEvent] {
        &self.events
    }

    /// Number of effects spawned.
    #[must_use]
    pub fn effect_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresentationEvent::Effect { .. }))
            .count()
    }

    /// Number of sounds played.
    #[must_use]
    pub fn sound_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresentationEvent::Sound { .. }))
            .count()
    }

    /// State transitions recorded for one agent, in order.
    #[must_use]
    pub fn transitions_of(&self, agent: EntityId) -> Vec<(AgentState, AgentState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresentationEvent::StateChanged { agent: a, from, to } if *a == agent => {
                    Some((*from, *to))
                },
                _ => None,
            })
            .collect()
    }

    /// Poses recorded for one agent, in order.
    #[must_use]
    pub fn poses_of(&self, agent: EntityId) -> Vec<AgentPose> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresentationEvent::PoseChanged { agent: a, pose } if *a == agent => Some(*pose),
                _ => None,
            })
            .collect()
    }
}

impl Presentation for PresentationLog {
    fn spawn_effect(&mut self, effect: &EffectRef, at: Vec3) {
        self.events.push(PresentationEvent::Effect {
            effect: effect.clone(),
            at,
        });
    }

    fn play_sound(&mut self, sound: &SoundRef, at: Vec3) {
        self.events.push(PresentationEvent::Sound {
            sound: sound.clone(),
            at,
        });
    }

    fn agent_state_changed(&mut self, agent: EntityId, from: AgentState, to: AgentState) {
        self.events
            .push(PresentationEvent::StateChanged { agent, from, to });
    }

    fn agent_pose_changed(&mut self, agent: EntityId, pose: AgentPose) {
        self.events.push(PresentationEvent::PoseChanged { agent, pose });
    }
}

/// Color of a debug primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebugColor {
    /// Attack hitboxes and attack range.
    Red,
    /// Sight range.
    Yellow,
    /// Fallback hitbox when unarmed.
    Grey,
}

/// Diagnostic wireframe primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DebugPrimitive {
    /// Wire sphere.
    WireSphere {
        /// Center
        center: Vec3,
        /// Radius
        radius: f32,
        /// Color
        color: DebugColor,
    },
    /// Line segment.
    Line {
        /// Start point
        start: Vec3,
        /// End point
        end: Vec3,
        /// Color
        color: DebugColor,
    },
}
