//! Per-actor attack orchestration.
//!
//! The [`AttackController`] owns the equipped profile and its strategy and
//! gates attack requests on cooldown, in-flight state and stamina. Accepted
//! attacks resolve after the profile's activation delay; resolution is
//! dropped if the weapon changed in between.

use skirmish_common::{EntityId, WorldTransform};
use tracing::{debug, info};

use crate::presentation::{DebugColor, DebugPrimitive};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::stamina::StaminaPool;
use crate::strategy::{build_strategy, AttackStrategy, CombatContext, SwingReport};
use crate::weapon::{StrategyKind, WeaponProfile};

/// Radius of the debug sphere drawn when no weapon is equipped.
const UNARMED_DEBUG_RADIUS: f32 = 0.5;

/// Why an attack request was refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackRejection {
    /// No weapon equipped.
    Unarmed,
    /// A previous attack has not resolved yet.
    InFlight,
    /// Cooldown has not elapsed.
    Cooldown {
        /// Seconds remaining
        remaining: f64,
    },
    /// Not enough stamina.
    Stamina {
        /// Stamina available
        available: f32,
        /// Stamina required
        cost: f32,
    },
}

#[derive(Debug)]
struct EquippedWeapon {
    profile: WeaponProfile,
    strategy: Box<dyn AttackStrategy>,
    generation: u64,
}

/// Attack orchestrator of one combat-capable actor.
#[derive(Debug)]
pub struct AttackController {
    owner: EntityId,
    equipped: Option<EquippedWeapon>,
    generation: u64,
    next_attack_allowed_at: f64,
    in_flight: Option<TaskHandle>,
    /// Pending resolutions, keyed by the generation they were accepted under.
    resolutions: Scheduler<u64>,
    origin: WorldTransform,
}

impl AttackController {
    /// Creates an unarmed controller for `owner`.
    #[must_use]
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            equipped: None,
            generation: 0,
            next_attack_allowed_at: 0.0,
            in_flight: None,
            resolutions: Scheduler::new(),
            origin: WorldTransform::IDENTITY,
        }
    }

    /// Sets the starting attack origin.
    #[must_use]
    pub fn with_origin(mut self, origin: WorldTransform) -> Self {
        self.origin = origin;
        self
    }

    /// The actor this controller attacks for.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Equips a weapon, or unequips with `None`.
    ///
    /// The previous strategy is dropped and a new one built from the profile.
    /// A swing accepted before the change resolves as a no-op.
    pub fn set_weapon(&mut self, profile: Option<WeaponProfile>) {
        self.generation += 1;
        self.equipped = profile.map(|profile| {
            info!("{} equipped '{}' ({:?})", self.owner, profile.name, profile.strategy);
            EquippedWeapon {
                strategy: build_strategy(&profile),
                profile,
                generation: self.generation,
            }
        });
        if self.equipped.is_none() {
            debug!("{} unequipped", self.owner);
        }
    }

    /// Equipped profile.
    #[must_use]
    pub fn weapon(&self) -> Option<&WeaponProfile> {
        self.equipped.as_ref().map(|e| &e.profile)
    }

    /// Algorithm of the equipped weapon.
    #[must_use]
    pub fn strategy_kind(&self) -> Option<StrategyKind> {
        self.equipped.as_ref().map(|e| e.strategy.kind())
    }

    /// Updates the attack origin (the actor's hand or chest transform).
    pub fn set_origin(&mut self, origin: WorldTransform) {
        self.origin = origin;
    }

    /// Current attack origin.
    #[must_use]
    pub fn origin(&self) -> WorldTransform {
        self.origin
    }

    /// Whether an accepted attack is waiting to resolve.
    #[must_use]
    pub fn is_attack_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Seconds until cooldown allows another attack.
    #[must_use]
    pub fn cooldown_remaining(&self, now: f64) -> f64 {
        (self.next_attack_allowed_at - now).max(0.0)
    }

    /// Checks whether an attack would be accepted, without side effects.
    pub fn check_attack<S: StaminaPool + ?Sized>(
        &self,
        now: f64,
        stamina: &S,
    ) -> Result<(), AttackRejection> {
        let Some(equipped) = &self.equipped else {
            return Err(AttackRejection::Unarmed);
        };
        if self.in_flight.is_some() {
            return Err(AttackRejection::InFlight);
        }
        if now < self.next_attack_allowed_at {
            return Err(AttackRejection::Cooldown {
                remaining: self.next_attack_allowed_at - now,
            });
        }
        let cost = equipped.profile.stamina_cost;
        if stamina.available() < cost {
            return Err(AttackRejection::Stamina {
                available: stamina.available(),
                cost,
            });
        }
        Ok(())
    }

    /// Requests an attack at `now`.
    ///
    /// Returns false, with no side effects, if unarmed, in flight, cooling
    /// down or short on stamina. Otherwise pays the stamina cost, schedules
    /// resolution after the activation delay and starts the cooldown.
    pub fn try_attack<S: StaminaPool + ?Sized>(&mut self, now: f64, stamina: &mut S) -> bool {
        if let Err(reason) = self.check_attack(now, stamina) {
            debug!("{} attack rejected: {:?}", self.owner, reason);
            return false;
        }
        let Some(equipped) = &self.equipped else {
            return false;
        };

        let profile = &equipped.profile;
        if !stamina.consume(profile.stamina_cost) {
            debug!("{} attack rejected: stamina pool refused", self.owner);
            return false;
        }

        let due_at = now + f64::from(profile.activation_delay_seconds);
        self.in_flight = Some(self.resolutions.schedule(due_at, equipped.generation));
        self.next_attack_allowed_at = now + f64::from(profile.cooldown_seconds);
        debug!(
            "{} attack accepted with '{}', resolves at {:.3}",
            self.owner, profile.name, due_at
        );
        true
    }

    /// Resolves a due attack.
    ///
    /// Returns the swing report if a swing was performed. A swing whose
    /// weapon was unequipped or replaced since acceptance is dropped.
    pub fn update(&mut self, ctx: &mut CombatContext<'_>) -> Option<SwingReport> {
        let due = self.resolutions.drain_due(ctx.now);
        if due.is_empty() {
            return None;
        }
        self.in_flight = None;

        let mut report = None;
        for generation in due {
            match &mut self.equipped {
                Some(equipped) if equipped.generation == generation => {
                    report = Some(
                        equipped
                            .strategy
                            .perform_attack(&self.origin, self.owner, ctx),
                    );
                },
                _ => debug!("{} weapon changed before swing resolved", self.owner),
            }
        }
        report
    }

    /// Wireframe of the current hitbox.
    #[must_use]
    pub fn debug_shapes(&self) -> Vec<DebugPrimitive> {
        match &self.equipped {
            Some(equipped) => equipped.strategy.debug_shapes(&self.origin),
            None => vec![DebugPrimitive::WireSphere {
                center: self.origin.position,
                radius: UNARMED_DEBUG_RADIUS,
                color: DebugColor::Grey,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Health;
    use crate::presentation::PresentationLog;
    use crate::spatial::ColliderSet;
    use crate::stamina::Stamina;
    use crate::targets::MockTargets;
    use glam::Vec3;
    use proptest::prelude::*;

    struct Rig {
        controller: AttackController,
        stamina: Stamina,
        colliders: ColliderSet,
        targets: MockTargets,
        log: PresentationLog,
        target: EntityId,
    }

    impl Rig {
        fn new(profile: Option<WeaponProfile>) -> Self {
            let mut controller = AttackController::new(EntityId::new());
            controller.set_weapon(profile);

            let target = EntityId::new();
            let pos = Vec3::new(0.0, 0.0, 1.0);
            let mut colliders = ColliderSet::new();
            colliders.insert(target, pos, 0.3);
            let mut targets = MockTargets::new();
            targets.add_damageable(target, Health::new(100.0), pos);

            Self {
                controller,
                stamina: Stamina::default(),
                colliders,
                targets,
                log: PresentationLog::new(),
                target,
            }
        }

        fn attack(&mut self, now: f64) -> bool {
            self.controller.try_attack(now, &mut self.stamina)
        }

        fn update(&mut self, now: f64) -> Option<SwingReport> {
            let mut ctx = CombatContext {
                now,
                spatial: &self.colliders,
                targets: &mut self.targets,
                presentation: &mut self.log,
            };
            self.controller.update(&mut ctx)
        }

        fn target_health(&self) -> f32 {
            self.targets.health(self.target)
        }
    }

    fn sword() -> WeaponProfile {
        WeaponProfile::new("Sword")
            .with_damage(20)
            .with_sweep(2.0, 0.5, 90.0)
            .with_timing(1.0, 0.25)
            .with_stamina_cost(10.0)
    }

    #[test]
    fn test_sweep_scenario_gating() {
        let mut rig = Rig::new(Some(sword()));

        assert!(rig.attack(0.0));
        assert_eq!(rig.stamina.current(), 90.0);
        assert!(rig.controller.is_attack_in_flight());

        assert!(rig.update(0.25).is_some());
        assert!(!rig.controller.is_attack_in_flight());

        assert!(!rig.attack(0.5));
        assert_eq!(rig.stamina.current(), 90.0);
        assert!((rig.controller.cooldown_remaining(0.5) - 0.5).abs() < 1e-9);

        assert!(rig.attack(1.1));
        assert_eq!(rig.stamina.current(), 80.0);
    }

    #[test]
    fn test_unarmed_rejects_without_side_effects() {
        let mut rig = Rig::new(None);
        assert!(!rig.attack(0.0));
        assert_eq!(rig.stamina.current(), 100.0);
        assert_eq!(
            rig.controller.check_attack(0.0, &rig.stamina),
            Err(AttackRejection::Unarmed)
        );
    }

    #[test]
    fn test_in_flight_rejects() {
        let profile = sword().with_timing(0.0, 0.5);
        let mut rig = Rig::new(Some(profile));

        assert!(rig.attack(0.0));
        assert!(!rig.attack(0.1));
        assert_eq!(rig.stamina.current(), 90.0);

        rig.update(0.5);
        assert!(rig.attack(0.5));
    }

    #[test]
    fn test_stamina_gate() {
        let mut rig = Rig::new(Some(sword()));
        rig.stamina = Stamina::default().with_current(5.0);

        assert!(!rig.attack(0.0));
        assert_eq!(rig.stamina.current(), 5.0);
        assert!(!rig.controller.is_attack_in_flight());
        // Rejection does not start the cooldown
        assert_eq!(rig.controller.cooldown_remaining(0.0), 0.0);
    }

    #[test]
    fn test_resolution_waits_for_activation_delay() {
        let mut rig = Rig::new(Some(sword()));
        assert!(rig.attack(0.0));

        assert!(rig.update(0.1).is_none());
        assert_eq!(rig.target_health(), 100.0);

        let report = rig.update(0.25).expect("swing resolves");
        assert_eq!(report.hits, vec![rig.target]);
        assert_eq!(rig.target_health(), 80.0);

        // Nothing left to resolve
        assert!(rig.update(0.3).is_none());
    }

    #[test]
    fn test_unequip_mid_swing_is_noop() {
        let mut rig = Rig::new(Some(sword()));
        assert!(rig.attack(0.0));
        rig.controller.set_weapon(None);

        assert!(rig.update(0.25).is_none());
        assert!(!rig.controller.is_attack_in_flight());
        assert_eq!(rig.target_health(), 100.0);
    }

    #[test]
    fn test_reequip_mid_swing_drops_swing() {
        let mut rig = Rig::new(Some(sword()));
        assert!(rig.attack(0.0));
        rig.controller
            .set_weapon(Some(WeaponProfile::new("Club").with_area(3.0, Vec3::ZERO)));
        assert_eq!(rig.controller.strategy_kind(), Some(StrategyKind::Area));

        assert!(rig.update(0.25).is_none());
        assert_eq!(rig.target_health(), 100.0);
    }

    #[test]
    fn test_origin_moves_hitbox() {
        let mut rig = Rig::new(Some(sword()));
        rig.controller
            .set_origin(WorldTransform::facing(Vec3::ZERO, Vec3::NEG_Z));

        assert!(rig.attack(0.0));
        let report = rig.update(0.25).expect("swing resolves");
        assert!(report.hits.is_empty());
    }

    #[test]
    fn test_debug_shapes_unarmed_fallback() {
        let controller = AttackController::new(EntityId::new())
            .with_origin(WorldTransform::from_position(Vec3::ONE));
        assert_eq!(
            controller.debug_shapes(),
            vec![DebugPrimitive::WireSphere {
                center: Vec3::ONE,
                radius: 0.5,
                color: DebugColor::Grey,
            }]
        );
    }

    proptest! {
        #[test]
        fn prop_accepted_attacks_respect_cooldown(
            cooldown in 0.1f32..2.0,
            requests in proptest::collection::vec(0.0f64..0.5, 1..40),
        ) {
            let profile = sword().with_timing(cooldown, 0.0).with_stamina_cost(0.0);
            let mut rig = Rig::new(Some(profile));

            let mut now = 0.0;
            let mut accepted: Vec<f64> = Vec::new();
            for step in requests {
                now += step;
                rig.update(now);
                if rig.attack(now) {
                    accepted.push(now);
                }
                rig.update(now);
            }

            for pair in accepted.windows(2) {
                prop_assert!(pair[1] - pair[0] >= f64::from(cooldown) - 1e-9);
            }
        }
    }
}
