//! # Skirmish Common
//!
//! Value types shared by the gameplay core and the simulator: entity ids,
//! world transforms and configuration errors.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod transform;

/// Everything, for glob import.
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::transform::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exports() {
        let id = EntityId::new();
        let err = ConfigError::Validation(format!("{id} is broken"));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_transform_forward_is_positive_z() {
        let t = WorldTransform::from_position(glam::Vec3::new(1.0, 0.0, 2.0));
        assert!((t.forward() - glam::Vec3::Z).length() < 1e-6);
        assert!((t.up() - glam::Vec3::Y).length() < 1e-6);
    }
}
