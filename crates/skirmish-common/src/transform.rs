//! World-space transforms.
//!
//! Convention: +Y is up and +Z is forward, so a yaw of 0 faces +Z.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of an actor or attack origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldTransform {
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub rotation: Quat,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl WorldTransform {
    /// Origin, facing +Z.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a transform from position and rotation.
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated transform at `position`.
    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Creates a transform at `position` facing `direction` on the horizontal
    /// plane. A zero or vertical direction keeps the identity rotation.
    #[must_use]
    pub fn facing(position: Vec3, direction: Vec3) -> Self {
        Self::new(position, yaw_towards(direction).unwrap_or(Quat::IDENTITY))
    }

    /// Local forward axis in world space.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local up axis in world space.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local right axis in world space.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Maps a point from local to world space.
    #[must_use]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Yaw-only rotation looking along `direction` with the y component dropped.
#[must_use]
pub fn yaw_towards(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(flat.x.atan2(flat.z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_facing_flattens_direction() {
        let t = WorldTransform::facing(Vec3::ZERO, Vec3::new(1.0, 5.0, 0.0));
        assert!(approx(t.forward(), Vec3::X));
        assert!(approx(t.up(), Vec3::Y));
    }

    #[test]
    fn test_facing_vertical_keeps_identity() {
        let t = WorldTransform::facing(Vec3::ONE, Vec3::Y);
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_transform_point_uses_rotation() {
        let t = WorldTransform::facing(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        let p = t.transform_point(Vec3::new(0.0, 0.0, 2.0));
        assert!(approx(p, Vec3::new(2.0, 0.0, 1.0)));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn yaw_faces_horizontal_direction(
                x in -100.0f32..100.0,
                y in -100.0f32..100.0,
                z in -100.0f32..100.0,
            ) {
                let flat = Vec3::new(x, 0.0, z);
                prop_assume!(flat.length() > 0.01);

                let rotation = yaw_towards(Vec3::new(x, y, z)).expect("non-vertical direction");
                let forward = rotation * Vec3::Z;
                prop_assert!((forward - flat.normalize()).length() < 1e-3);
                prop_assert!(forward.y.abs() < 1e-5);
            }
        }
    }
}
