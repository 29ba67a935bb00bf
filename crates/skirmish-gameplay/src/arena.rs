//! Reference world.
//!
//! The arena wires every collaborator together on a fixed tick: sphere
//! colliders for queries, an actor store implementing [`CombatTargets`],
//! player combatants with attack controllers and stamina, and hostile agents
//! moving kinematically. It backs the headless simulator and the end-to-end
//! tests.

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_common::{EntityId, WorldTransform};
use tracing::{debug, info};

use crate::agent::{AgentState, HostileAgentController};
use crate::attack::AttackController;
use crate::health::{Damageable, DefeatEffect, Health};
use crate::loader::AgentArchetype;
use crate::movement::{KinematicAgent, MovementAgent, WalkableArea};
use crate::presentation::PresentationLog;
use crate::spatial::ColliderSet;
use crate::stamina::Stamina;
use crate::strategy::{CombatContext, SwingReport};
use crate::targets::{CombatTargets, HitReactor};
use crate::weapon::WeaponProfile;

/// Default fixed tick rate.
pub const DEFAULT_TICK_HZ: f32 = 60.0;
/// Collider radius of every actor.
pub const ACTOR_RADIUS: f32 = 0.5;
/// Player walking speed.
pub const PLAYER_WALK_SPEED: f32 = 4.0;
/// Speed multiplier while sprinting.
pub const SPRINT_SPEED_MULTIPLIER: f32 = 1.75;

/// Agent type driven by the arena.
pub type ArenaAgent = HostileAgentController<KinematicAgent>;

#[derive(Debug)]
struct Actor {
    health: Health,
    position: Vec3,
}

/// Actors and agents by id. Implements [`CombatTargets`] for the arena.
#[derive(Debug, Default)]
pub struct ActorStore {
    actors: AHashMap<EntityId, Actor>,
    agents: AHashMap<EntityId, ArenaAgent>,
    pending_defeats: Vec<EntityId>,
}

impl ActorStore {
    fn is_standing(&self, entity: EntityId) -> bool {
        self.actors
            .get(&entity)
            .is_some_and(|a| !a.health.is_defeated())
    }
}

// Actors defeated earlier in the step stay stored until `resolve_defeats`
// runs, but are no longer visible as targets.
impl CombatTargets for ActorStore {
    fn position_of(&self, entity: EntityId) -> Option<Vec3> {
        self.actors
            .get(&entity)
            .filter(|a| !a.health.is_defeated())
            .map(|a| a.position)
    }

    fn damageable_mut(&mut self, entity: EntityId) -> Option<&mut dyn Damageable> {
        self.actors
            .get_mut(&entity)
            .filter(|a| !a.health.is_defeated())
            .map(|a| &mut a.health as &mut dyn Damageable)
    }

    fn reactor_mut(&mut self, entity: EntityId) -> Option<&mut dyn HitReactor> {
        if !self.is_standing(entity) {
            return None;
        }
        self.agents
            .get_mut(&entity)
            .filter(|a| !a.is_despawned())
            .map(|a| a as &mut dyn HitReactor)
    }

    fn on_defeated(&mut self, entity: EntityId) {
        if let Some(agent) = self.agents.get_mut(&entity) {
            agent.despawn();
        }
        self.pending_defeats.push(entity);
    }
}

#[derive(Debug)]
struct Combatant {
    controller: AttackController,
    stamina: Stamina,
    facing: Vec3,
    destination: Option<Vec3>,
}

/// Moves `from` up to `max_step` towards `to`. Returns the new position and
/// whether `to` was reached.
fn step_towards(from: Vec3, to: Vec3, max_step: f32) -> (Vec3, bool) {
    let offset = to - from;
    let dist = offset.length();
    if dist <= max_step || dist <= f32::EPSILON {
        return (to, true);
    }
    (from + offset / dist * max_step, false)
}

/// Loot dropped by a defeated actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootDrop {
    /// Item name
    pub item: String,
    /// Stack size
    pub count: u32,
    /// Drop position
    pub position: Vec3,
}

/// What happened during one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Swings that resolved, by attacker.
    pub swings: Vec<(EntityId, SwingReport)>,
    /// Actors removed this step.
    pub defeated: Vec<EntityId>,
}

/// Fixed-tick reference world.
#[derive(Debug)]
pub struct Arena {
    now: f64,
    dt: f32,
    area: Option<WalkableArea>,
    colliders: ColliderSet,
    actors: ActorStore,
    combatants: AHashMap<EntityId, Combatant>,
    presentation: PresentationLog,
    loot: Vec<LootDrop>,
    scene_flags: AHashMap<String, bool>,
    defeated: Vec<EntityId>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_HZ)
    }
}

impl Arena {
    /// Creates an empty arena ticking at `tick_hz`.
    #[must_use]
    pub fn new(tick_hz: f32) -> Self {
        let tick_hz = if tick_hz.is_finite() && tick_hz > 0.0 {
            tick_hz
        } else {
            DEFAULT_TICK_HZ
        };
        Self {
            now: 0.0,
            dt: 1.0 / tick_hz,
            area: None,
            colliders: ColliderSet::new(),
            actors: ActorStore::default(),
            combatants: AHashMap::new(),
            presentation: PresentationLog::new(),
            loot: Vec::new(),
            scene_flags: AHashMap::new(),
            defeated: Vec::new(),
        }
    }

    /// Confines agents spawned afterwards to a walkable area.
    #[must_use]
    pub fn with_area(mut self, area: WalkableArea) -> Self {
        self.area = Some(area);
        self
    }

    /// Simulation clock in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Seconds per step.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    fn add_actor(&mut self, position: Vec3, health: Health) -> EntityId {
        let id = EntityId::new();
        self.colliders.insert(id, position, ACTOR_RADIUS);
        self.actors.actors.insert(id, Actor { health, position });
        id
    }

    /// Spawns a player-controlled combatant facing +Z.
    pub fn spawn_player(&mut self, position: Vec3, health: Health, stamina: Stamina) -> EntityId {
        let id = self.add_actor(position, health);
        let controller =
            AttackController::new(id).with_origin(WorldTransform::from_position(position));
        self.combatants.insert(
            id,
            Combatant {
                controller,
                stamina,
                facing: Vec3::Z,
                destination: None,
            },
        );
        info!("Spawned player {} at {}", id, position);
        id
    }

    /// Spawns a passive damageable prop.
    pub fn spawn_prop(&mut self, position: Vec3, health: Health) -> EntityId {
        self.add_actor(position, health)
    }

    /// Spawns an agent from an archetype.
    pub fn spawn_agent(
        &mut self,
        archetype: &AgentArchetype,
        position: Vec3,
        target: Option<EntityId>,
    ) -> EntityId {
        let id = self.add_actor(position, archetype.health());

        let mut movement = KinematicAgent::new(position).with_speed(archetype.speed);
        if let Some(area) = self.area {
            movement = movement.with_area(area);
        }
        let mut agent = HostileAgentController::new(id, movement, archetype.behavior.clone())
            .with_route(archetype.route.clone());
        agent.set_target(target);

        self.actors.agents.insert(id, agent);
        info!("Spawned {} {} at {}", archetype.name, id, position);
        id
    }

    /// Equips a combatant. Returns false if `id` is not a combatant.
    pub fn equip(&mut self, id: EntityId, profile: Option<WeaponProfile>) -> bool {
        match self.combatants.get_mut(&id) {
            Some(combatant) => {
                combatant.controller.set_weapon(profile);
                true
            },
            None => false,
        }
    }

    /// Requests an attack from a combatant.
    pub fn attack(&mut self, id: EntityId) -> bool {
        let now = self.now;
        self.combatants
            .get_mut(&id)
            .is_some_and(|c| c.controller.try_attack(now, &mut c.stamina))
    }

    /// Turns a combatant to face `point`.
    pub fn face_towards(&mut self, id: EntityId, point: Vec3) {
        let Some(position) = self.position(id) else {
            return;
        };
        if let Some(combatant) = self.combatants.get_mut(&id) {
            let dir = point - position;
            if dir.length_squared() > f32::EPSILON {
                combatant.facing = dir;
            }
        }
    }

    /// Walks a combatant towards `point`, at sprint speed while sprinting.
    /// Returns false if `id` is not a combatant.
    pub fn move_towards(&mut self, id: EntityId, point: Vec3) -> bool {
        match self.combatants.get_mut(&id) {
            Some(combatant) if point.is_finite() => {
                combatant.destination = Some(point);
                true
            },
            _ => false,
        }
    }

    /// Stops a combatant's walk.
    pub fn stop(&mut self, id: EntityId) {
        if let Some(combatant) = self.combatants.get_mut(&id) {
            combatant.destination = None;
        }
    }

    /// Starts or stops sprinting. Sprinting drains stamina and only lasts
    /// while the combatant is walking. Returns whether it is now sprinting.
    pub fn set_sprinting(&mut self, id: EntityId, sprinting: bool) -> bool {
        let Some(combatant) = self.combatants.get_mut(&id) else {
            return false;
        };
        combatant
            .stamina
            .set_sprinting(sprinting && combatant.destination.is_some());
        combatant.stamina.is_sprinting()
    }

    /// Teleports a non-agent actor.
    pub fn move_actor(&mut self, id: EntityId, position: Vec3) {
        if self.actors.agents.contains_key(&id) {
            return;
        }
        if let Some(actor) = self.actors.actors.get_mut(&id) {
            actor.position = position;
            self.colliders.move_root(id, position);
        }
    }

    /// Advances the world by one tick.
    pub fn step(&mut self) -> StepReport {
        self.now += f64::from(self.dt);
        let mut report = StepReport::default();

        let mut ids: Vec<EntityId> = self.combatants.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if !self.actors.is_standing(id) {
                continue;
            }
            let Some(combatant) = self.combatants.get_mut(&id) else {
                continue;
            };
            if combatant.destination.is_none() {
                combatant.stamina.set_sprinting(false);
            }
            combatant.stamina.tick(self.dt);

            if let Some(actor) = self.actors.actors.get_mut(&id) {
                if let Some(destination) = combatant.destination {
                    let speed = if combatant.stamina.is_sprinting() {
                        PLAYER_WALK_SPEED * SPRINT_SPEED_MULTIPLIER
                    } else {
                        PLAYER_WALK_SPEED
                    };
                    let (position, arrived) =
                        step_towards(actor.position, destination, speed * self.dt);
                    actor.position = self.area.map_or(position, |area| area.clamp(position));
                    self.colliders.move_root(id, actor.position);
                    if arrived {
                        combatant.destination = None;
                        combatant.stamina.set_sprinting(false);
                    }
                }
                combatant
                    .controller
                    .set_origin(WorldTransform::facing(actor.position, combatant.facing));
            }

            let mut ctx = CombatContext {
                now: self.now,
                spatial: &self.colliders,
                targets: &mut self.actors,
                presentation: &mut self.presentation,
            };
            if let Some(swing) = combatant.controller.update(&mut ctx) {
                report.swings.push((id, swing));
            }
        }

        // Agents are taken out while they tick so the store can still be
        // handed to them as targets.
        let mut ids: Vec<EntityId> = self.actors.agents.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let Some(mut agent) = self.actors.agents.remove(&id) else {
                continue;
            };
            if agent.is_despawned() {
                self.actors.agents.insert(id, agent);
                continue;
            }

            let mut ctx = CombatContext {
                now: self.now,
                spatial: &self.colliders,
                targets: &mut self.actors,
                presentation: &mut self.presentation,
            };
            agent.tick(&mut ctx);
            agent.movement_mut().step(self.dt);

            let position = agent.movement().position();
            if let Some(actor) = self.actors.actors.get_mut(&id) {
                actor.position = position;
            }
            self.colliders.move_root(id, position);
            self.actors.agents.insert(id, agent);
        }

        report.defeated = self.resolve_defeats();
        report
    }

    /// Steps until `seconds` of simulated time have passed.
    pub fn run_for(&mut self, seconds: f64) -> Vec<StepReport> {
        let end = self.now + seconds;
        let mut reports = Vec::new();
        while self.now < end {
            reports.push(self.step());
        }
        reports
    }

    fn resolve_defeats(&mut self) -> Vec<EntityId> {
        let pending = std::mem::take(&mut self.actors.pending_defeats);
        let mut removed = Vec::new();

        for id in pending {
            let Some(actor) = self.actors.actors.remove(&id) else {
                continue;
            };
            for effect in actor.health.defeat_effects() {
                match effect {
                    DefeatEffect::SpawnLoot { item, count } => self.loot.push(LootDrop {
                        item: item.clone(),
                        count: *count,
                        position: actor.position,
                    }),
                    DefeatEffect::SetSceneFlag { flag, value } => {
                        self.scene_flags.insert(flag.clone(), *value);
                    },
                }
            }

            self.colliders.remove_root(id);
            if let Some(mut agent) = self.actors.agents.remove(&id) {
                agent.despawn();
            }
            self.combatants.remove(&id);
            debug!("Removed defeated actor {}", id);
            self.defeated.push(id);
            removed.push(id);
        }
        removed
    }

    /// Current position of an actor.
    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        self.actors.position_of(id)
    }

    /// Current health of an actor.
    #[must_use]
    pub fn health(&self, id: EntityId) -> Option<f32> {
        self.actors
            .actors
            .get(&id)
            .map(|a| a.health.current_health())
    }

    /// Whether the actor is still in the world.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.actors.actors.contains_key(&id)
    }

    /// An agent by id.
    #[must_use]
    pub fn agent(&self, id: EntityId) -> Option<&ArenaAgent> {
        self.actors.agents.get(&id)
    }

    /// State of every agent, sorted by id.
    #[must_use]
    pub fn agent_states(&self) -> Vec<(EntityId, AgentState)> {
        let mut states: Vec<_> = self
            .actors
            .agents
            .iter()
            .map(|(id, agent)| (*id, agent.state()))
            .collect();
        states.sort_unstable_by_key(|(id, _)| *id);
        states
    }

    /// Nearest living agent to `point`.
    #[must_use]
    pub fn nearest_agent(&self, point: Vec3) -> Option<(EntityId, Vec3)> {
        self.actors
            .agents
            .keys()
            .filter_map(|id| self.position(*id).map(|p| (*id, p)))
            .min_by(|a, b| a.1.distance(point).total_cmp(&b.1.distance(point)))
    }

    /// A combatant's attack controller.
    #[must_use]
    pub fn controller(&self, id: EntityId) -> Option<&AttackController> {
        self.combatants.get(&id).map(|c| &c.controller)
    }

    /// A combatant's stamina.
    #[must_use]
    pub fn stamina(&self, id: EntityId) -> Option<&Stamina> {
        self.combatants.get(&id).map(|c| &c.stamina)
    }

    /// Presentation calls recorded so far.
    #[must_use]
    pub fn presentation(&self) -> &PresentationLog {
        &self.presentation
    }

    /// Loot dropped so far.
    #[must_use]
    pub fn loot(&self) -> &[LootDrop] {
        &self.loot
    }

    /// Value of a scene flag.
    #[must_use]
    pub fn scene_flag(&self, flag: &str) -> Option<bool> {
        self.scene_flags.get(flag).copied()
    }

    /// Every actor defeated so far, in order.
    #[must_use]
    pub fn defeated(&self) -> &[EntityId] {
        &self.defeated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentConfig, AgentPose, FleeConfig, Waypoint};
    use crate::weapon::EffectRef;

    fn sword() -> WeaponProfile {
        WeaponProfile::new("Sword")
            .with_damage(20)
            .with_sweep(2.0, 0.5, 90.0)
            .with_timing(0.5, 0.1)
            .with_stamina_cost(10.0)
            .with_hit_effect(EffectRef::new("spark"))
    }

    fn dummy(behavior: AgentConfig) -> AgentArchetype {
        AgentArchetype {
            max_health: 40.0,
            ..AgentArchetype::new("Dummy", behavior)
        }
    }

    fn still() -> AgentConfig {
        AgentConfig {
            walk_point_range: 0.0,
            aggressive: false,
            ..AgentConfig::default()
        }
    }

    fn run_attacking(arena: &mut Arena, player: EntityId, seconds: f64) {
        let end = arena.now() + seconds;
        while arena.now() < end {
            arena.attack(player);
            arena.step();
        }
    }

    #[test]
    fn test_player_defeats_agent_and_loot_drops() {
        let mut arena = Arena::new(60.0);
        let player = arena.spawn_player(Vec3::ZERO, Health::default(), Stamina::default());
        assert!(arena.equip(player, Some(sword())));

        let mut archetype = dummy(still());
        archetype.defeat_effects = vec![
            DefeatEffect::SpawnLoot {
                item: "ear".to_string(),
                count: 1,
            },
            DefeatEffect::SetSceneFlag {
                flag: "gate_open".to_string(),
                value: true,
            },
        ];
        let goblin = arena.spawn_agent(&archetype, Vec3::new(0.0, 0.0, 1.5), Some(player));

        run_attacking(&mut arena, player, 2.0);

        assert!(!arena.is_alive(goblin));
        assert!(arena.agent(goblin).is_none());
        assert_eq!(arena.defeated(), &[goblin]);
        assert_eq!(arena.loot().len(), 1);
        assert_eq!(arena.loot()[0].position, Vec3::new(0.0, 0.0, 1.5));
        assert_eq!(arena.scene_flag("gate_open"), Some(true));
        assert_eq!(arena.presentation().effect_count(), 2);
    }

    #[test]
    fn test_agent_hunts_player() {
        let mut arena = Arena::new(30.0);
        let player = arena.spawn_player(Vec3::ZERO, Health::default(), Stamina::default());
        let archetype = dummy(AgentConfig {
            walk_point_range: 0.0,
            ..AgentConfig::default()
        });
        let goblin = arena.spawn_agent(&archetype, Vec3::new(6.0, 0.0, 0.0), Some(player));

        arena.step();
        assert_eq!(arena.agent(goblin).map(|a| a.state()), Some(AgentState::Chase));

        arena.run_for(5.0);
        let agent = arena.agent(goblin).expect("goblin alive");
        assert_eq!(agent.state(), AgentState::Attack);
        assert!(arena.health(player).expect("player alive") < 100.0);
        assert!(arena
            .presentation()
            .poses_of(goblin)
            .contains(&AgentPose::Attacking));
    }

    #[test]
    fn test_struck_mob_flees_then_recovers() {
        let mut arena = Arena::new(60.0);
        let player = arena.spawn_player(Vec3::ZERO, Health::default(), Stamina::default());
        arena.equip(player, Some(sword()));

        let behavior = AgentConfig {
            flee: Some(FleeConfig {
                speed: 8.0,
                distance: 15.0,
                duration_seconds: 1.0,
            }),
            ..still()
        };
        let archetype = AgentArchetype {
            max_health: 500.0,
            ..AgentArchetype::new("Deer", behavior)
        };
        let deer = arena.spawn_agent(&archetype, Vec3::new(0.0, 0.0, 1.5), Some(player));

        assert!(arena.attack(player));
        arena.run_for(0.2);
        let agent = arena.agent(deer).expect("deer alive");
        assert_eq!(agent.state(), AgentState::Flee);
        assert_eq!(agent.movement().speed(), 8.0);

        arena.run_for(1.0);
        let agent = arena.agent(deer).expect("deer alive");
        assert_eq!(agent.state(), AgentState::Patrol);
        assert_eq!(agent.movement().speed(), archetype.speed);
        assert!(arena.position(deer).expect("deer position").z > 5.0);
    }

    #[test]
    fn test_stamina_regenerates_between_attacks() {
        let mut arena = Arena::new(10.0);
        let player = arena.spawn_player(Vec3::ZERO, Health::default(), Stamina::default());
        arena.equip(player, Some(sword()));

        assert!(arena.attack(player));
        assert_eq!(arena.stamina(player).map(Stamina::current), Some(90.0));
        arena.run_for(1.5);
        assert_eq!(arena.stamina(player).map(Stamina::current), Some(100.0));
    }

    #[test]
    fn test_route_agent_patrols_between_points() {
        let mut arena = Arena::new(20.0);
        let archetype = AgentArchetype {
            route: vec![
                Waypoint::Point(Vec3::ZERO),
                Waypoint::Point(Vec3::new(4.0, 0.0, 0.0)),
            ],
            ..dummy(AgentConfig {
                patrol_pause_seconds: 0.2,
                ..AgentConfig::default()
            })
        };
        let guard = arena.spawn_agent(&archetype, Vec3::ZERO, None);

        let mut max_x: f32 = 0.0;
        for _ in 0..100 {
            arena.step();
            max_x = max_x.max(arena.position(guard).expect("guard").x);
        }
        assert!(max_x > 3.0);
        assert_eq!(arena.agent_states(), vec![(guard, AgentState::Patrol)]);
    }

    #[test]
    fn test_face_towards_redirects_swing() {
        let mut arena = Arena::new(60.0);
        let player = arena.spawn_player(Vec3::ZERO, Health::default(), Stamina::default());
        arena.equip(player, Some(sword()));
        let prop = arena.spawn_prop(Vec3::new(-1.5, 0.0, 0.0), Health::new(100.0));

        assert_eq!(arena.nearest_agent(Vec3::ZERO), None);
        arena.face_towards(player, Vec3::new(-1.5, 0.0, 0.0));
        assert!(arena.attack(player));
        let reports = arena.run_for(0.2);

        let swings: Vec<_> = reports.iter().flat_map(|r| r.swings.iter()).collect();
        assert_eq!(swings.len(), 1);
        assert_eq!(swings[0].1.hits, vec![prop]);
        assert_eq!(arena.health(prop), Some(80.0));
    }

    fn finisher() -> WeaponProfile {
        sword().with_damage(50).with_timing(0.5, 0.0)
    }

    #[test]
    fn test_agent_defeated_mid_step_does_not_strike() {
        let mut arena = Arena::new(60.0);
        let player = arena.spawn_player(Vec3::ZERO, Health::default(), Stamina::default());
        arena.equip(player, Some(finisher()));

        let archetype = AgentArchetype {
            max_health: 10.0,
            ..AgentArchetype::new(
                "Goblin",
                AgentConfig {
                    walk_point_range: 0.0,
                    ..AgentConfig::default()
                },
            )
        };
        // Already inside its attack range
        let goblin = arena.spawn_agent(&archetype, Vec3::new(0.0, 0.0, 1.5), Some(player));

        assert!(arena.attack(player));
        let report = arena.step();

        assert_eq!(report.defeated, vec![goblin]);
        assert_eq!(arena.health(player), Some(100.0));
        assert!(arena.presentation().poses_of(goblin).is_empty());
        assert!(arena.agent_states().is_empty());
    }

    #[test]
    fn test_second_attacker_misses_body_in_same_step() {
        let mut arena = Arena::new(60.0);
        let first = arena.spawn_player(
            Vec3::new(-0.8, 0.0, 0.0),
            Health::default(),
            Stamina::default(),
        );
        let second = arena.spawn_player(
            Vec3::new(0.8, 0.0, 0.0),
            Health::default(),
            Stamina::default(),
        );
        arena.equip(first, Some(finisher()));
        arena.equip(second, Some(finisher()));

        let behavior = AgentConfig {
            flee: Some(FleeConfig::default()),
            ..still()
        };
        let archetype = AgentArchetype {
            max_health: 10.0,
            ..AgentArchetype::new("Deer", behavior)
        };
        let deer = arena.spawn_agent(&archetype, Vec3::new(0.0, 0.0, 1.5), None);

        assert!(arena.attack(first));
        assert!(arena.attack(second));
        let report = arena.step();

        assert_eq!(report.swings.len(), 2);
        assert_eq!(report.swings[0].0, first);
        assert_eq!(report.swings[0].1.hits, vec![deer]);
        assert_eq!(report.swings[1].0, second);
        assert!(report.swings[1].1.hits.is_empty());
        assert_eq!(report.defeated, vec![deer]);
        assert!(!arena
            .presentation()
            .transitions_of(deer)
            .iter()
            .any(|(_, to)| *to == AgentState::Flee));
        assert_eq!(arena.presentation().effect_count(), 1);
    }

    #[test]
    fn test_sprint_drains_stamina_while_walking() {
        let mut arena = Arena::new(50.0);
        let player = arena.spawn_player(Vec3::ZERO, Health::default(), Stamina::default());

        // Standing still cannot sprint
        assert!(!arena.set_sprinting(player, true));

        assert!(arena.move_towards(player, Vec3::new(0.0, 0.0, 20.0)));
        assert!(arena.set_sprinting(player, true));
        for _ in 0..50 {
            arena.step();
        }

        let z = arena.position(player).expect("player").z;
        assert!((z - PLAYER_WALK_SPEED * SPRINT_SPEED_MULTIPLIER).abs() < 0.01);
        let stamina = arena.stamina(player).expect("stamina");
        assert!(stamina.is_sprinting());
        assert!((stamina.current() - 85.0).abs() < 0.01);

        assert!(!arena.set_sprinting(player, false));
        for _ in 0..50 {
            arena.step();
        }
        let walked = arena.position(player).expect("player").z - z;
        assert!((walked - PLAYER_WALK_SPEED).abs() < 0.01);
        assert!((arena.stamina(player).map_or(0.0, Stamina::current) - 95.0).abs() < 0.01);
    }

    #[test]
    fn test_sprint_ends_on_arrival() {
        let mut arena = Arena::new(20.0);
        let player = arena.spawn_player(Vec3::ZERO, Health::default(), Stamina::default());
        let target = Vec3::new(1.0, 0.0, 0.0);

        arena.move_towards(player, target);
        arena.set_sprinting(player, true);
        arena.run_for(1.0);

        assert_eq!(arena.position(player), Some(target));
        assert!(!arena.stamina(player).is_some_and(Stamina::is_sprinting));
    }
}
