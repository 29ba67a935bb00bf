//! World-side access to hit targets.

use glam::Vec3;
use skirmish_common::EntityId;

use crate::health::Damageable;
use crate::presentation::Presentation;

/// Reaction to being struck, independent of health (an agent starting to
/// flee, a prop wobbling).
pub trait HitReactor {
    /// Called once per accepted hit with the impact point.
    fn on_hit(&mut self, point: Vec3, now: f64, presentation: &mut dyn Presentation);
}

/// Lookup of combat capabilities by actor root.
///
/// Implemented by the world. Returning `None` means the capability is absent
/// or the entity is gone, which the core treats as a silent no-op.
pub trait CombatTargets {
    /// World position of an actor.
    fn position_of(&self, entity: EntityId) -> Option<Vec3>;
    /// Health capability of an actor.
    fn damageable_mut(&mut self, entity: EntityId) -> Option<&mut dyn Damageable>;
    /// On-hit capability of an actor.
    fn reactor_mut(&mut self, entity: EntityId) -> Option<&mut dyn HitReactor>;
    /// Called exactly once when an actor's health reaches zero.
    fn on_defeated(&mut self, entity: EntityId);
}

/// Reactor that records impact points.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReactor {
    pub hits: Vec<Vec3>,
}

#[cfg(test)]
impl HitReactor for RecordingReactor {
    fn on_hit(&mut self, point: Vec3, _now: f64, _presentation: &mut dyn Presentation) {
        self.hits.push(point);
    }
}

/// Mock target storage for testing.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockTargets {
    pub healths: std::collections::HashMap<EntityId, crate::health::Health>,
    pub positions: std::collections::HashMap<EntityId, Vec3>,
    pub reactors: std::collections::HashMap<EntityId, RecordingReactor>,
    pub defeated: Vec<EntityId>,
}

#[cfg(test)]
impl MockTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_damageable(&mut self, id: EntityId, health: crate::health::Health, pos: Vec3) {
        self.healths.insert(id, health);
        self.positions.insert(id, pos);
    }

    pub fn add_reactor(&mut self, id: EntityId, pos: Vec3) {
        self.reactors.insert(id, RecordingReactor::default());
        self.positions.insert(id, pos);
    }

    pub fn health(&self, id: EntityId) -> f32 {
        self.healths
            .get(&id)
            .map_or(f32::NAN, Damageable::current_health)
    }
}

#[cfg(test)]
impl CombatTargets for MockTargets {
    fn position_of(&self, entity: EntityId) -> Option<Vec3> {
        self.positions.get(&entity).copied()
    }

    fn damageable_mut(&mut self, entity: EntityId) -> Option<&mut dyn Damageable> {
        self.healths
            .get_mut(&entity)
            .map(|h| h as &mut dyn Damageable)
    }

    fn reactor_mut(&mut self, entity: EntityId) -> Option<&mut dyn HitReactor> {
        self.reactors
            .get_mut(&entity)
            .map(|r| r as &mut dyn HitReactor)
    }

    fn on_defeated(&mut self, entity: EntityId) {
        self.defeated.push(entity);
    }
}
