//! Weapon attack strategies.
//!
//! A strategy turns one swing into spatial queries and applies hits to the
//! candidates it gets back. Two algorithms exist:
//! - Sweep: stepped capsule queries fanned across an arc
//! - Area: one sphere query at a local offset
//!
//! Both share [`apply_hit`], which owns self-hit rejection, per-swing dedup,
//! damage, defeat notification, on-hit reactions and impact effects.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use skirmish_common::{EntityId, WorldTransform};
use tracing::{debug, info, trace};

use crate::health::DamageOutcome;
use crate::hit_registry::HitRegistry;
use crate::presentation::{DebugColor, DebugPrimitive, Presentation};
use crate::spatial::{HitCandidate, QueryShape, SpatialQuery};
use crate::targets::CombatTargets;
use crate::weapon::{EffectRef, SoundRef, StrategyKind, WeaponProfile};

/// Number of capsule steps in a sweep.
pub const DEFAULT_SWEEP_STEPS: usize = 5;
/// Fewest capsule steps a sweep may use.
pub const MIN_SWEEP_STEPS: usize = 3;
/// Segments in the sweep debug arc.
const DEBUG_ARC_SEGMENTS: usize = 20;
/// A wire sphere is drawn every this many arc segments.
const DEBUG_SPHERE_EVERY: usize = 5;

// ============================================================================
// Context and reports
// ============================================================================

/// Per-tick view of the collaborators a swing or agent needs.
pub struct CombatContext<'a> {
    /// Simulation clock in seconds.
    pub now: f64,
    /// Physics queries.
    pub spatial: &'a dyn SpatialQuery,
    /// Damage and on-hit targets.
    pub targets: &'a mut dyn CombatTargets,
    /// Effects, sounds and animation hooks.
    pub presentation: &'a mut dyn Presentation,
}

/// What one swing did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwingReport {
    /// Roots that accepted a hit, in hit order.
    pub hits: Vec<EntityId>,
    /// Roots defeated by this swing.
    pub defeated: Vec<EntityId>,
    /// Spatial queries issued.
    pub queries: usize,
}

/// Damage and presentation shared by every hit of a swing.
#[derive(Debug, Clone, PartialEq)]
pub struct HitSpec {
    /// Damage per accepted hit.
    pub damage: f32,
    /// Effect spawned at the impact point.
    pub hit_effect: Option<EffectRef>,
    /// Sound played when the swing resolves.
    pub attack_sound: Option<SoundRef>,
}

impl HitSpec {
    /// Extracts the hit data from a profile.
    #[must_use]
    pub fn from_profile(profile: &WeaponProfile) -> Self {
        Self {
            damage: profile.damage(),
            hit_effect: profile.hit_effect.clone(),
            attack_sound: profile.attack_sound.clone(),
        }
    }
}

// ============================================================================
// Strategy trait
// ============================================================================

/// Polymorphic attack algorithm.
pub trait AttackStrategy: fmt::Debug {
    /// Which algorithm this is.
    fn kind(&self) -> StrategyKind;

    /// Resolves one swing from `origin`. `owner` is the attacker's root and is
    /// never hit.
    fn perform_attack(
        &mut self,
        origin: &WorldTransform,
        owner: EntityId,
        ctx: &mut CombatContext<'_>,
    ) -> SwingReport;

    /// Wireframe of the hitbox for diagnostics.
    fn debug_shapes(&self, origin: &WorldTransform) -> Vec<DebugPrimitive>;
}

/// Builds the strategy matching `profile.strategy`.
#[must_use]
pub fn build_strategy(profile: &WeaponProfile) -> Box<dyn AttackStrategy> {
    match profile.strategy {
        StrategyKind::Sweep => Box::new(SweepStrategy::from_profile(profile)),
        StrategyKind::Area => Box::new(AreaStrategy::from_profile(profile)),
    }
}

/// Applies one candidate of a swing.
///
/// Returns true if the hit was accepted.
pub fn apply_hit(
    candidate: &HitCandidate,
    owner: EntityId,
    spec: &HitSpec,
    registry: &mut HitRegistry,
    ctx: &mut CombatContext<'_>,
    report: &mut SwingReport,
) -> bool {
    let target = candidate.root;
    if target == owner {
        trace!("Skipping self hit on {}", target);
        return false;
    }
    if registry.contains(target) {
        return false;
    }

    let damageable = ctx.targets.damageable_mut(target).is_some();
    let reactive = ctx.targets.reactor_mut(target).is_some();
    if !damageable && !reactive {
        trace!("Collider {} of {} has nothing to hit", candidate.collider, target);
        return false;
    }

    registry.register(target);

    let outcome = match ctx.targets.damageable_mut(target) {
        Some(health) => health.take_damage(spec.damage),
        None => DamageOutcome::Ignored,
    };
    if damageable && !outcome.landed() {
        trace!("{} was already defeated", target);
        return false;
    }

    // A defeated target no longer reacts.
    if outcome.is_defeated() {
        info!("{} defeated by {}", target, owner);
        ctx.targets.on_defeated(target);
        report.defeated.push(target);
    } else if let Some(reactor) = ctx.targets.reactor_mut(target) {
        reactor.on_hit(candidate.point, ctx.now, &mut *ctx.presentation);
    }

    if let Some(effect) = &spec.hit_effect {
        ctx.presentation.spawn_effect(effect, candidate.point);
    }

    debug!("{} hit {} ({:?})", owner, target, outcome);
    report.hits.push(target);
    true
}

// ============================================================================
// Sweep
// ============================================================================

/// Stepped capsule sweep across an arc in front of the attacker.
#[derive(Debug, Clone)]
pub struct SweepStrategy {
    steps: usize,
    range: f32,
    radius: f32,
    angle_degrees: f32,
    height_offset: f32,
    spec: HitSpec,
    registry: HitRegistry,
}

impl SweepStrategy {
    /// Creates a sweep from a profile's sweep fields.
    #[must_use]
    pub fn from_profile(profile: &WeaponProfile) -> Self {
        Self {
            steps: DEFAULT_SWEEP_STEPS,
            range: profile.attack_range,
            radius: profile.sweep_radius,
            angle_degrees: profile.sweep_angle_degrees,
            height_offset: profile.sweep_height_offset,
            spec: HitSpec::from_profile(profile),
            registry: HitRegistry::new(),
        }
    }

    /// Sets the number of capsule steps (at least three).
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps.max(MIN_SWEEP_STEPS);
        self
    }

    /// Number of capsule steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn sweep_origin(&self, origin: &WorldTransform) -> Vec3 {
        origin.position + origin.up() * self.height_offset
    }

    /// Direction `t` (0..=1) of the way across the arc.
    fn direction_at(&self, origin: &WorldTransform, t: f32) -> Vec3 {
        let half = self.angle_degrees * 0.5;
        let angle = (-half + (half * 2.0) * t).to_radians();
        Quat::from_axis_angle(origin.up().normalize_or_zero(), angle) * origin.forward()
    }

    /// Capsules queried by one swing, left to right.
    #[must_use]
    pub fn queries(&self, origin: &WorldTransform) -> Vec<QueryShape> {
        let start = self.sweep_origin(origin);
        let last = (self.steps - 1) as f32;
        (0..self.steps)
            .map(|i| {
                let dir = self.direction_at(origin, i as f32 / last);
                QueryShape::Capsule {
                    start,
                    end: start + dir * self.range,
                    radius: self.radius,
                }
            })
            .collect()
    }
}

impl AttackStrategy for SweepStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sweep
    }

    fn perform_attack(
        &mut self,
        origin: &WorldTransform,
        owner: EntityId,
        ctx: &mut CombatContext<'_>,
    ) -> SwingReport {
        self.registry.clear();
        if let Some(sound) = &self.spec.attack_sound {
            ctx.presentation.play_sound(sound, origin.position);
        }

        let mut report = SwingReport::default();
        for shape in self.queries(origin) {
            report.queries += 1;
            for candidate in ctx.spatial.query(&shape) {
                apply_hit(
                    &candidate,
                    owner,
                    &self.spec,
                    &mut self.registry,
                    ctx,
                    &mut report,
                );
            }
        }
        report
    }

    fn debug_shapes(&self, origin: &WorldTransform) -> Vec<DebugPrimitive> {
        let color = DebugColor::Red;
        let start = self.sweep_origin(origin);
        let mut shapes = Vec::new();
        let mut previous: Option<Vec3> = None;

        for i in 0..=DEBUG_ARC_SEGMENTS {
            let t = i as f32 / DEBUG_ARC_SEGMENTS as f32;
            let point = start + self.direction_at(origin, t) * self.range;
            if i % DEBUG_SPHERE_EVERY == 0 {
                shapes.push(DebugPrimitive::WireSphere {
                    center: point,
                    radius: self.radius,
                    color,
                });
            }
            if let Some(prev) = previous {
                shapes.push(DebugPrimitive::Line {
                    start: prev,
                    end: point,
                    color,
                });
            }
            previous = Some(point);
        }

        for t in [0.0, 1.0] {
            shapes.push(DebugPrimitive::Line {
                start,
                end: start + self.direction_at(origin, t) * self.range,
                color,
            });
        }
        shapes
    }
}

// ============================================================================
// Area
// ============================================================================

/// Single sphere query at a local offset.
#[derive(Debug, Clone)]
pub struct AreaStrategy {
    radius: f32,
    offset: Vec3,
    spec: HitSpec,
    registry: HitRegistry,
}

impl AreaStrategy {
    /// Creates an area attack from a profile's area fields.
    #[must_use]
    pub fn from_profile(profile: &WeaponProfile) -> Self {
        Self {
            radius: profile.area_radius,
            offset: profile.area_offset,
            spec: HitSpec::from_profile(profile),
            registry: HitRegistry::new(),
        }
    }

    /// The sphere queried by one swing.
    #[must_use]
    pub fn query(&self, origin: &WorldTransform) -> QueryShape {
        QueryShape::Sphere {
            center: origin.transform_point(self.offset),
            radius: self.radius,
        }
    }
}

impl AttackStrategy for AreaStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Area
    }

    fn perform_attack(
        &mut self,
        origin: &WorldTransform,
        owner: EntityId,
        ctx: &mut CombatContext<'_>,
    ) -> SwingReport {
        self.registry.clear();
        if let Some(sound) = &self.spec.attack_sound {
            ctx.presentation.play_sound(sound, origin.position);
        }

        let mut report = SwingReport {
            queries: 1,
            ..SwingReport::default()
        };
        for candidate in ctx.spatial.query(&self.query(origin)) {
            apply_hit(
                &candidate,
                owner,
                &self.spec,
                &mut self.registry,
                ctx,
                &mut report,
            );
        }
        report
    }

    fn debug_shapes(&self, origin: &WorldTransform) -> Vec<DebugPrimitive> {
        vec![DebugPrimitive::WireSphere {
            center: origin.transform_point(self.offset),
            radius: self.radius,
            color: DebugColor::Red,
        }]
    }
}
