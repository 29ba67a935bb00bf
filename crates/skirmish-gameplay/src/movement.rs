//! Path-following movement.
//!
//! Agents steer through [`MovementAgent`], the pathfinding collaborator.
//! [`KinematicAgent`] is a straight-line implementation confined to an
//! optional walkable rectangle, used by the arena and tests.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use skirmish_common::{yaw_towards, WorldTransform};

/// Default movement speed in units per second.
pub const DEFAULT_AGENT_SPEED: f32 = 3.5;

/// Pathfinding and locomotion collaborator of an agent.
pub trait MovementAgent {
    /// Current world position.
    fn position(&self) -> Vec3;
    /// Current position and facing.
    fn transform(&self) -> WorldTransform;
    /// Starts moving toward `destination`. Returns false if unreachable.
    fn set_destination(&mut self, destination: Vec3) -> bool;
    /// Distance left along the current path (0 without a destination).
    fn remaining_distance(&self) -> f32;
    /// Whether a path is still being computed.
    fn path_pending(&self) -> bool;
    /// Halts movement, keeping the destination.
    fn stop(&mut self);
    /// Resumes movement toward the destination.
    fn resume(&mut self);
    /// Whether movement is halted.
    fn is_stopped(&self) -> bool;
    /// Movement speed.
    fn speed(&self) -> f32;
    /// Sets movement speed.
    fn set_speed(&mut self, speed: f32);
    /// Turns to face `point` on the horizontal plane.
    fn look_at(&mut self, point: Vec3);
    /// Nearest reachable point within `max_distance` of `candidate`.
    fn sample_reachable_point(&self, candidate: Vec3, max_distance: f32) -> Option<Vec3>;
}

/// Axis-aligned walkable rectangle on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkableArea {
    /// Minimum (x, z)
    pub min: Vec2,
    /// Maximum (x, z)
    pub max: Vec2,
}

impl WalkableArea {
    /// Creates an area from two corners.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Checks whether a point lies inside, ignoring height.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        let p = Vec2::new(point.x, point.z);
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Nearest point inside the area at the same height.
    #[must_use]
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        let p = Vec2::new(point.x, point.z).clamp(self.min, self.max);
        Vec3::new(p.x, point.y, p.y)
    }
}

/// Straight-line mover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicAgent {
    position: Vec3,
    facing: Quat,
    destination: Option<Vec3>,
    speed: f32,
    stopped: bool,
    area: Option<WalkableArea>,
}

impl KinematicAgent {
    /// Creates an agent at `position` with the default speed.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            facing: Quat::IDENTITY,
            destination: None,
            speed: DEFAULT_AGENT_SPEED,
            stopped: false,
            area: None,
        }
    }

    /// Sets the speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    /// Confines the agent to a walkable area.
    #[must_use]
    pub fn with_area(mut self, area: WalkableArea) -> Self {
        self.area = Some(area);
        self
    }

    /// Current destination.
    #[must_use]
    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Advances along the straight path by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if self.stopped {
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };

        let to_target = destination - self.position;
        let dist = to_target.length();
        if dist <= f32::EPSILON {
            return;
        }

        let travel = (self.speed * dt).min(dist);
        self.position += to_target / dist * travel;
        if let Some(rotation) = yaw_towards(to_target) {
            self.facing = rotation;
        }
    }
}

impl MovementAgent for KinematicAgent {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn transform(&self) -> WorldTransform {
        WorldTransform::new(self.position, self.facing)
    }

    fn set_destination(&mut self, destination: Vec3) -> bool {
        if !destination.is_finite() {
            return false;
        }
        if let Some(area) = &self.area {
            if !area.contains(destination) {
                return false;
            }
        }
        self.destination = Some(destination);
        true
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |destination| destination.distance(self.position))
    }

    fn path_pending(&self) -> bool {
        false
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn look_at(&mut self, point: Vec3) {
        if let Some(rotation) = yaw_towards(point - self.position) {
            self.facing = rotation;
        }
    }

    fn sample_reachable_point(&self, candidate: Vec3, max_distance: f32) -> Option<Vec3> {
        if !candidate.is_finite() {
            return None;
        }
        match &self.area {
            Some(area) => {
                let clamped = area.clamp(candidate);
                (clamped.distance(candidate) <= max_distance).then_some(clamped)
            },
            None => Some(candidate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_moves_and_faces() {
        let mut agent = KinematicAgent::new(Vec3::ZERO).with_speed(2.0);
        assert!(agent.set_destination(Vec3::new(3.0, 0.0, 0.0)));

        agent.step(1.0);
        assert_eq!(agent.position(), Vec3::new(2.0, 0.0, 0.0));
        assert!((agent.transform().forward() - Vec3::X).length() < 1e-5);

        agent.step(1.0);
        assert_eq!(agent.position(), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(agent.remaining_distance(), 0.0);
    }

    #[test]
    fn test_stop_and_resume() {
        let mut agent = KinematicAgent::new(Vec3::ZERO);
        agent.set_destination(Vec3::new(10.0, 0.0, 0.0));
        agent.stop();
        agent.step(1.0);
        assert_eq!(agent.position(), Vec3::ZERO);
        assert!(agent.is_stopped());

        agent.resume();
        agent.step(1.0);
        assert_eq!(agent.position(), Vec3::new(DEFAULT_AGENT_SPEED, 0.0, 0.0));
    }

    #[test]
    fn test_area_limits_destinations() {
        let area = WalkableArea::new(Vec2::new(-5.0, -5.0), Vec2::new(5.0, 5.0));
        let mut agent = KinematicAgent::new(Vec3::ZERO).with_area(area);

        assert!(!agent.set_destination(Vec3::new(9.0, 0.0, 0.0)));
        assert!(agent.set_destination(Vec3::new(4.0, 0.0, 4.0)));

        assert_eq!(
            agent.sample_reachable_point(Vec3::new(6.0, 0.0, 0.0), 2.0),
            Some(Vec3::new(5.0, 0.0, 0.0))
        );
        assert_eq!(agent.sample_reachable_point(Vec3::new(20.0, 0.0, 0.0), 2.0), None);
        assert_eq!(agent.sample_reachable_point(Vec3::NAN, 2.0), None);
    }

    #[test]
    fn test_look_at_ignores_height() {
        let mut agent = KinematicAgent::new(Vec3::ZERO);
        agent.look_at(Vec3::new(0.0, 10.0, -1.0));
        assert!((agent.transform().forward() - Vec3::NEG_Z).length() < 1e-5);
    }
}
