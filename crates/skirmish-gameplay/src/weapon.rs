//! Weapon profiles.
//!
//! A profile is immutable per-weapon configuration: damage, timing, stamina
//! cost, hitbox geometry and presentation handles. Profiles are loaded by
//! [`crate::loader::CombatCatalog`] and handed to
//! [`crate::attack::AttackController::set_weapon`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_common::{ConfigError, ConfigResult};
use tracing::warn;

/// Default base damage per hit.
pub const DEFAULT_DAMAGE: u32 = 15;
/// Default seconds between attack starts.
pub const DEFAULT_COOLDOWN: f32 = 0.6;
/// Default seconds between accepting an attack and resolving its hitbox.
pub const DEFAULT_ACTIVATION_DELAY: f32 = 0.25;
/// Default reach in world units.
pub const DEFAULT_ATTACK_RANGE: f32 = 1.0;
/// Default stamina consumed per attack.
pub const DEFAULT_STAMINA_COST: f32 = 10.0;
/// Default radius of each sweep capsule.
pub const DEFAULT_SWEEP_RADIUS: f32 = 0.5;
/// Default total sweep arc in degrees.
pub const DEFAULT_SWEEP_ANGLE: f32 = 90.0;
/// Default radius of the area sphere.
pub const DEFAULT_AREA_RADIUS: f32 = 1.0;

/// Smallest radius or range a profile may carry.
const MIN_EXTENT: f32 = 0.01;

/// Opaque handle to a visual effect asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectRef(pub String);

impl EffectRef {
    /// Creates an effect handle.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Opaque handle to a sound asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundRef(pub String);

impl SoundRef {
    /// Creates a sound handle.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Hit-detection algorithm used by a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Stepped capsule queries across an arc in front of the attacker.
    #[default]
    Sweep,
    /// A single sphere query at an offset from the attacker.
    Area,
}

/// Immutable per-weapon configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Weapon name, unique within a catalog.
    pub name: String,
    /// Damage dealt per accepted hit.
    #[serde(default = "default_damage")]
    pub base_damage: u32,
    /// Seconds between attack starts.
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: f32,
    /// Seconds from acceptance to hitbox resolution.
    #[serde(default = "default_activation_delay")]
    pub activation_delay_seconds: f32,
    /// Reach of the sweep in world units.
    #[serde(default = "default_attack_range")]
    pub attack_range: f32,
    /// Radius of each sweep capsule.
    #[serde(default = "default_sweep_radius")]
    pub sweep_radius: f32,
    /// Total arc of the sweep in degrees (0-360).
    #[serde(default = "default_sweep_angle")]
    pub sweep_angle_degrees: f32,
    /// Vertical offset of the sweep origin along the attacker's up axis.
    #[serde(default)]
    pub sweep_height_offset: f32,
    /// Radius of the area sphere.
    #[serde(default = "default_area_radius")]
    pub area_radius: f32,
    /// Offset of the area sphere in the attacker's local space.
    #[serde(default)]
    pub area_offset: Vec3,
    /// Stamina consumed per accepted attack.
    #[serde(default = "default_stamina_cost")]
    pub stamina_cost: f32,
    /// Hit-detection algorithm.
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Effect spawned at each impact point.
    #[serde(default)]
    pub hit_effect: Option<EffectRef>,
    /// Sound played when a swing resolves.
    #[serde(default)]
    pub attack_sound: Option<SoundRef>,
}

const fn default_damage() -> u32 {
    DEFAULT_DAMAGE
}

const fn default_cooldown() -> f32 {
    DEFAULT_COOLDOWN
}

const fn default_activation_delay() -> f32 {
    DEFAULT_ACTIVATION_DELAY
}

const fn default_attack_range() -> f32 {
    DEFAULT_ATTACK_RANGE
}

const fn default_sweep_radius() -> f32 {
    DEFAULT_SWEEP_RADIUS
}

const fn default_sweep_angle() -> f32 {
    DEFAULT_SWEEP_ANGLE
}

const fn default_area_radius() -> f32 {
    DEFAULT_AREA_RADIUS
}

const fn default_stamina_cost() -> f32 {
    DEFAULT_STAMINA_COST
}

impl WeaponProfile {
    /// Creates a sweep profile with default stats.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_damage: DEFAULT_DAMAGE,
            cooldown_seconds: DEFAULT_COOLDOWN,
            activation_delay_seconds: DEFAULT_ACTIVATION_DELAY,
            attack_range: DEFAULT_ATTACK_RANGE,
            sweep_radius: DEFAULT_SWEEP_RADIUS,
            sweep_angle_degrees: DEFAULT_SWEEP_ANGLE,
            sweep_height_offset: 0.0,
            area_radius: DEFAULT_AREA_RADIUS,
            area_offset: Vec3::ZERO,
            stamina_cost: DEFAULT_STAMINA_COST,
            strategy: StrategyKind::Sweep,
            hit_effect: None,
            attack_sound: None,
        }
    }

    /// Sets damage per hit.
    #[must_use]
    pub fn with_damage(mut self, damage: u32) -> Self {
        self.base_damage = damage;
        self
    }

    /// Sets cooldown and activation delay.
    #[must_use]
    pub fn with_timing(mut self, cooldown: f32, activation_delay: f32) -> Self {
        self.cooldown_seconds = cooldown;
        self.activation_delay_seconds = activation_delay;
        self
    }

    /// Sets stamina cost.
    #[must_use]
    pub fn with_stamina_cost(mut self, cost: f32) -> Self {
        self.stamina_cost = cost;
        self
    }

    /// Configures a sweep hitbox.
    #[must_use]
    pub fn with_sweep(mut self, range: f32, radius: f32, angle_degrees: f32) -> Self {
        self.strategy = StrategyKind::Sweep;
        self.attack_range = range;
        self.sweep_radius = radius;
        self.sweep_angle_degrees = angle_degrees;
        self
    }

    /// Sets the sweep origin's vertical offset.
    #[must_use]
    pub fn with_sweep_height_offset(mut self, offset: f32) -> Self {
        self.sweep_height_offset = offset;
        self
    }

    /// Configures an area hitbox.
    #[must_use]
    pub fn with_area(mut self, radius: f32, offset: Vec3) -> Self {
        self.strategy = StrategyKind::Area;
        self.area_radius = radius;
        self.area_offset = offset;
        self
    }

    /// Sets the impact effect.
    #[must_use]
    pub fn with_hit_effect(mut self, effect: EffectRef) -> Self {
        self.hit_effect = Some(effect);
        self
    }

    /// Sets the swing sound.
    #[must_use]
    pub fn with_attack_sound(mut self, sound: SoundRef) -> Self {
        self.attack_sound = Some(sound);
        self
    }

    /// Damage per hit as a float, the unit `Damageable` works in.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.base_damage as f32
    }

    /// Rejects values that cannot be repaired by clamping.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "weapon has empty name".to_string(),
            ));
        }

        let numbers = [
            ("cooldown_seconds", self.cooldown_seconds),
            ("activation_delay_seconds", self.activation_delay_seconds),
            ("attack_range", self.attack_range),
            ("sweep_radius", self.sweep_radius),
            ("sweep_angle_degrees", self.sweep_angle_degrees),
            ("sweep_height_offset", self.sweep_height_offset),
            ("area_radius", self.area_radius),
            ("stamina_cost", self.stamina_cost),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "weapon '{}' has non-finite {}: {}",
                    self.name, field, value
                )));
            }
        }
        if !self.area_offset.is_finite() {
            return Err(ConfigError::Validation(format!(
                "weapon '{}' has non-finite area_offset",
                self.name
            )));
        }

        Ok(())
    }

    /// Clamps out-of-range numbers to safe minimums, logging each repair.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let name = self.name.clone();
        clamp_min(&name, "cooldown_seconds", &mut self.cooldown_seconds, 0.0);
        clamp_min(
            &name,
            "activation_delay_seconds",
            &mut self.activation_delay_seconds,
            0.0,
        );
        clamp_min(&name, "stamina_cost", &mut self.stamina_cost, 0.0);
        clamp_min(&name, "attack_range", &mut self.attack_range, MIN_EXTENT);
        clamp_min(&name, "sweep_radius", &mut self.sweep_radius, MIN_EXTENT);
        clamp_min(&name, "area_radius", &mut self.area_radius, MIN_EXTENT);

        let angle = self.sweep_angle_degrees.clamp(0.0, 360.0);
        if angle != self.sweep_angle_degrees {
            warn!(
                "Weapon '{}' sweep_angle_degrees {} clamped to {}",
                name, self.sweep_angle_degrees, angle
            );
            self.sweep_angle_degrees = angle;
        }

        self
    }
}

fn clamp_min(weapon: &str, field: &str, value: &mut f32, min: f32) {
    if *value < min {
        warn!("Weapon '{}' {} {} clamped to {}", weapon, field, value, min);
        *value = min;
    }
}
