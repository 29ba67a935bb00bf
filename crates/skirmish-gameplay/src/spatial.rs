//! Spatial queries for hit detection and perception.
//!
//! The physics layer is a collaborator: the combat core only issues shape
//! queries through [`SpatialQuery`] and gets back candidate colliders with an
//! impact point. [`ColliderSet`] is a brute-force sphere-collider
//! implementation used by the arena and in tests.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_common::EntityId;

/// Shape of a spatial query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QueryShape {
    /// All colliders overlapping a sphere.
    Sphere {
        /// Sphere center
        center: Vec3,
        /// Sphere radius
        radius: f32,
    },
    /// All colliders overlapping a capsule swept from `start` to `end`.
    Capsule {
        /// Segment start
        start: Vec3,
        /// Segment end
        end: Vec3,
        /// Capsule radius
        radius: f32,
    },
}

impl QueryShape {
    /// Distance from `point` to the shape's core (center or segment).
    #[must_use]
    pub fn core_distance(&self, point: Vec3) -> f32 {
        match *self {
            Self::Sphere { center, .. } => center.distance(point),
            Self::Capsule { start, end, .. } => {
                closest_point_on_segment(start, end, point).distance(point)
            },
        }
    }

    /// Query radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        match *self {
            Self::Sphere { radius, .. } | Self::Capsule { radius, .. } => radius,
        }
    }
}

/// A collider returned by a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitCandidate {
    /// The collider that overlapped.
    pub collider: EntityId,
    /// Root of the collider's hierarchy (the actor that owns it).
    pub root: EntityId,
    /// Impact point, the collider's bounds center.
    pub point: Vec3,
}

/// Physics/world query collaborator.
pub trait SpatialQuery {
    /// Returns every collider overlapping `shape`.
    fn query(&self, shape: &QueryShape) -> Vec<HitCandidate>;

    /// Checks whether any collider of `root` overlaps `shape`.
    fn overlaps_root(&self, shape: &QueryShape, root: EntityId) -> bool {
        self.query(shape).iter().any(|hit| hit.root == root)
    }
}

/// Closest point to `point` on the segment `a`-`b`.
#[must_use]
pub fn closest_point_on_segment(a: Vec3, b: Vec3, point: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Sphere collider attached to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereCollider {
    /// Collider id
    pub id: EntityId,
    /// Hierarchy root
    pub root: EntityId,
    /// World-space center
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

/// Brute-force collection of sphere colliders.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    colliders: Vec<SphereCollider>,
}

impl ColliderSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collider owned by `root` and returns its id.
    pub fn insert(&mut self, root: EntityId, center: Vec3, radius: f32) -> EntityId {
        let id = EntityId::new();
        self.colliders.push(SphereCollider {
            id,
            root,
            center,
            radius: radius.max(0.0),
        });
        id
    }

    /// Removes every collider owned by `root`.
    pub fn remove_root(&mut self, root: EntityId) -> usize {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.root != root);
        before - self.colliders.len()
    }

    /// Moves every collider of `root` so the first one is centered at
    /// `position`, keeping relative offsets.
    pub fn move_root(&mut self, root: EntityId, position: Vec3) {
        let Some(anchor) = self.colliders.iter().find(|c| c.root == root) else {
            return;
        };
        let delta = position - anchor.center;
        for collider in self.colliders.iter_mut().filter(|c| c.root == root) {
            collider.center += delta;
        }
    }

    /// Colliders owned by `root`.
    pub fn colliders_of(&self, root: EntityId) -> impl Iterator<Item = &SphereCollider> {
        self.colliders.iter().filter(move |c| c.root == root)
    }

    /// Number of colliders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Returns true if there are no colliders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl SpatialQuery for ColliderSet {
    fn query(&self, shape: &QueryShape) -> Vec<HitCandidate> {
        let reach = shape.radius();
        self.colliders
            .iter()
            .filter(|c| shape.core_distance(c.center) <= reach + c.radius)
            .map(|c| HitCandidate {
                collider: c.id,
                root: c.root,
                point: c.center,
            })
            .collect()
    }
}
