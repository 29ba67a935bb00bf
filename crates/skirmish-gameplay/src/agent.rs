//! Hostile agent behavior.
//!
//! One configurable state machine covers aggressive enemies, waypoint guards
//! and passive mobs that only flee:
//! - Patrol: follow a looping route, or random-walk when there is none
//! - Chase: move toward the target while it is in sight
//! - Attack: stand, face and strike the target on a cooldown
//! - Flee: run from the target for a while after being hit
//!
//! Each tick fires due timers, evaluates perception, transitions, then acts.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_common::{ConfigError, ConfigResult, EntityId};
use tracing::{debug, warn};

use crate::health::DamageOutcome;
use crate::movement::MovementAgent;
use crate::perception::{Perception, PerceptionReading};
use crate::presentation::{DebugColor, DebugPrimitive, Presentation};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::strategy::CombatContext;
use crate::targets::{CombatTargets, HitReactor};
use crate::weapon::EffectRef;

// ============================================================================
// States and configuration
// ============================================================================

/// Behavior state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Following the route or random-walking. Idle without either.
    Patrol,
    /// Moving toward a target in sight.
    Chase,
    /// Striking a target in attack range.
    Attack,
    /// Running from the target after being hit.
    Flee,
}

/// Animation pose driven by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentPose {
    /// Standing still.
    Idle,
    /// Moving.
    Walking,
    /// Striking.
    Attacking,
}

/// Patrol route entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waypoint {
    /// Fixed world position.
    Point(Vec3),
    /// Position of another entity (a marker prop). Skipped while missing.
    Anchor(EntityId),
}

/// Flee tuning for agents that run when hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleeConfig {
    /// Movement speed while fleeing.
    pub speed: f32,
    /// How far ahead of the threat to aim each tick.
    pub distance: f32,
    /// Seconds a flee lasts.
    pub duration_seconds: f32,
}

impl Default for FleeConfig {
    fn default() -> Self {
        Self {
            speed: 8.0,
            distance: 15.0,
            duration_seconds: 7.0,
        }
    }
}

/// Agent tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Radius within which the target is seen.
    pub sight_range: f32,
    /// Radius within which the target is attacked. Clamped to sight range.
    pub attack_range: f32,
    /// Damage per strike.
    pub attack_damage: f32,
    /// Seconds between strikes.
    pub time_between_attacks: f32,
    /// Seconds to wait at each patrol stop.
    pub patrol_pause_seconds: f32,
    /// Random-walk radius when there is no route. Zero keeps the agent still.
    pub walk_point_range: f32,
    /// Distance at which a patrol destination counts as reached.
    pub arrival_threshold: f32,
    /// How far a sampled point may be moved to land somewhere reachable.
    pub sample_radius: f32,
    /// Whether perception drives Chase and Attack. Passive mobs only flee.
    pub aggressive: bool,
    /// Flee behavior when hit, if any.
    pub flee: Option<FleeConfig>,
    /// Effect spawned where the agent is hit.
    pub hit_effect: Option<EffectRef>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            sight_range: 15.0,
            attack_range: 2.0,
            attack_damage: 10.0,
            time_between_attacks: 2.0,
            patrol_pause_seconds: 3.0,
            walk_point_range: 20.0,
            arrival_threshold: 0.5,
            sample_radius: 2.0,
            aggressive: true,
            flee: None,
            hit_effect: None,
        }
    }
}

impl AgentConfig {
    /// Config of a passive mob: never attacks, flees when hit.
    #[must_use]
    pub fn passive() -> Self {
        Self {
            aggressive: false,
            flee: Some(FleeConfig::default()),
            ..Self::default()
        }
    }

    /// Rejects non-finite numbers.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        let mut numbers = vec![
            ("sight_range", self.sight_range),
            ("attack_range", self.attack_range),
            ("attack_damage", self.attack_damage),
            ("time_between_attacks", self.time_between_attacks),
            ("patrol_pause_seconds", self.patrol_pause_seconds),
            ("walk_point_range", self.walk_point_range),
            ("arrival_threshold", self.arrival_threshold),
            ("sample_radius", self.sample_radius),
        ];
        if let Some(flee) = &self.flee {
            numbers.push(("flee.speed", flee.speed));
            numbers.push(("flee.distance", flee.distance));
            numbers.push(("flee.duration_seconds", flee.duration_seconds));
        }
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "agent '{name}' has non-finite {field}: {value}"
                )));
            }
        }
        Ok(())
    }

    /// Clamps negative values to zero, logging each repair.
    #[must_use]
    pub fn sanitized(mut self, name: &str) -> Self {
        let fields = [
            ("sight_range", &mut self.sight_range),
            ("attack_range", &mut self.attack_range),
            ("attack_damage", &mut self.attack_damage),
            ("time_between_attacks", &mut self.time_between_attacks),
            ("patrol_pause_seconds", &mut self.patrol_pause_seconds),
            ("walk_point_range", &mut self.walk_point_range),
            ("arrival_threshold", &mut self.arrival_threshold),
            ("sample_radius", &mut self.sample_radius),
        ];
        for (field, value) in fields {
            if *value < 0.0 {
                warn!("Agent '{}' {} {} clamped to 0", name, field, value);
                *value = 0.0;
            }
        }
        if let Some(flee) = &mut self.flee {
            flee.speed = flee.speed.max(0.0);
            flee.distance = flee.distance.max(0.0);
            flee.duration_seconds = flee.duration_seconds.max(0.0);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentTask {
    PauseEnd,
    FleeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatrolPhase {
    Seeking,
    Moving,
    Paused(TaskHandle),
}

// ============================================================================
// Controller
// ============================================================================

/// State machine driving one hostile agent.
#[derive(Debug)]
pub struct HostileAgentController<M: MovementAgent> {
    id: EntityId,
    config: AgentConfig,
    perception: Perception,
    movement: M,
    state: AgentState,
    pose: AgentPose,
    target: Option<EntityId>,
    route: Vec<Waypoint>,
    waypoint_index: usize,
    patrol: PatrolPhase,
    attack_cooldown_until: f64,
    flee_until: Option<f64>,
    flee_task: Option<TaskHandle>,
    normal_speed: f32,
    last_reading: PerceptionReading,
    tasks: Scheduler<AgentTask>,
    rng: fastrand::Rng,
    despawned: bool,
}

impl<M: MovementAgent> HostileAgentController<M> {
    /// Creates an agent in Patrol with no route and no target.
    #[must_use]
    pub fn new(id: EntityId, movement: M, config: AgentConfig) -> Self {
        let perception = Perception::new(config.sight_range, config.attack_range);
        let normal_speed = movement.speed();
        Self {
            id,
            config,
            perception,
            movement,
            state: AgentState::Patrol,
            pose: AgentPose::Idle,
            target: None,
            route: Vec::new(),
            waypoint_index: 0,
            patrol: PatrolPhase::Seeking,
            attack_cooldown_until: 0.0,
            flee_until: None,
            flee_task: None,
            normal_speed,
            last_reading: PerceptionReading::default(),
            tasks: Scheduler::new(),
            rng: fastrand::Rng::with_seed(id.raw()),
            despawned: false,
        }
    }

    /// Sets a looping patrol route.
    #[must_use]
    pub fn with_route(mut self, route: Vec<Waypoint>) -> Self {
        self.route = route;
        self
    }

    /// Sets the tracked target.
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Reseeds the random-walk generator.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Agent id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Current behavior state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Current animation pose.
    #[must_use]
    pub fn pose(&self) -> AgentPose {
        self.pose
    }

    /// Tracked target.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Changes the tracked target.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Perception radii.
    #[must_use]
    pub fn perception(&self) -> &Perception {
        &self.perception
    }

    /// Reading from the last tick.
    #[must_use]
    pub fn last_reading(&self) -> PerceptionReading {
        self.last_reading
    }

    /// Index of the current route waypoint.
    #[must_use]
    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    /// Time before which the agent will not strike again.
    #[must_use]
    pub fn attack_cooldown_until(&self) -> f64 {
        self.attack_cooldown_until
    }

    /// Whether a flee is in progress.
    #[must_use]
    pub fn is_fleeing(&self) -> bool {
        self.flee_until.is_some()
    }

    /// When the current flee ends.
    #[must_use]
    pub fn flee_until(&self) -> Option<f64> {
        self.flee_until
    }

    /// Whether the agent is waiting at a patrol stop.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self.patrol, PatrolPhase::Paused(_))
    }

    /// Number of scheduled timers.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the agent was despawned.
    #[must_use]
    pub fn is_despawned(&self) -> bool {
        self.despawned
    }

    /// Movement collaborator.
    #[must_use]
    pub fn movement(&self) -> &M {
        &self.movement
    }

    /// Mutable movement collaborator.
    pub fn movement_mut(&mut self) -> &mut M {
        &mut self.movement
    }

    /// Cancels every pending timer and stops the agent for good.
    pub fn despawn(&mut self) {
        self.tasks.clear();
        self.flee_until = None;
        self.flee_task = None;
        self.patrol = PatrolPhase::Seeking;
        self.movement.stop();
        self.despawned = true;
        debug!("Agent {} despawned", self.id);
    }

    /// Runs one tick and returns the resulting state.
    pub fn tick(&mut self, ctx: &mut CombatContext<'_>) -> AgentState {
        if self.despawned {
            return self.state;
        }

        for task in self.tasks.drain_due(ctx.now) {
            match task {
                AgentTask::PauseEnd => self.finish_pause(),
                AgentTask::FleeEnd => self.end_flee(&mut *ctx.presentation),
            }
        }

        let target_pos = self.target.and_then(|t| ctx.targets.position_of(t));
        if self.is_fleeing() && target_pos.is_none() {
            debug!("Agent {} lost its flee target", self.id);
            self.end_flee(&mut *ctx.presentation);
        }

        self.last_reading = match (self.target, target_pos) {
            (Some(target), Some(_)) if self.config.aggressive => {
                self.perception
                    .evaluate(self.movement.position(), target, ctx.spatial)
            },
            _ => PerceptionReading::default(),
        };

        let next = if self.is_fleeing() {
            AgentState::Flee
        } else if self.config.aggressive {
            self.last_reading.desired_state()
        } else {
            AgentState::Patrol
        };
        self.transition(next, &mut *ctx.presentation);

        match (self.state, self.target, target_pos) {
            (AgentState::Patrol, _, _) => self.patrol(ctx),
            (AgentState::Chase, _, Some(pos)) => self.chase(pos, &mut *ctx.presentation),
            (AgentState::Attack, Some(target), Some(pos)) => self.attack(target, pos, ctx),
            (AgentState::Flee, _, Some(pos)) => self.flee(pos, &mut *ctx.presentation),
            _ => {},
        }

        self.state
    }

    /// Sight (yellow) and attack (red) spheres.
    #[must_use]
    pub fn debug_shapes(&self) -> Vec<DebugPrimitive> {
        let center = self.movement.position();
        vec![
            DebugPrimitive::WireSphere {
                center,
                radius: self.perception.sight_range(),
                color: DebugColor::Yellow,
            },
            DebugPrimitive::WireSphere {
                center,
                radius: self.perception.attack_range(),
                color: DebugColor::Red,
            },
        ]
    }

    fn transition(&mut self, next: AgentState, presentation: &mut dyn Presentation) {
        if next == self.state {
            return;
        }
        let from = self.state;
        self.state = next;
        debug!("Agent {} {:?} -> {:?}", self.id, from, next);
        presentation.agent_state_changed(self.id, from, next);

        match next {
            AgentState::Chase | AgentState::Attack | AgentState::Flee => self.cancel_pause(),
            AgentState::Patrol => {
                self.patrol = PatrolPhase::Seeking;
                self.movement.resume();
            },
        }
    }

    fn set_pose(&mut self, pose: AgentPose, presentation: &mut dyn Presentation) {
        if pose != self.pose {
            self.pose = pose;
            presentation.agent_pose_changed(self.id, pose);
        }
    }

    fn cancel_pause(&mut self) {
        if let PatrolPhase::Paused(handle) = self.patrol {
            self.tasks.cancel(handle);
            self.patrol = PatrolPhase::Seeking;
        }
    }

    fn finish_pause(&mut self) {
        if !self.is_paused() {
            return;
        }
        if !self.route.is_empty() {
            self.waypoint_index = (self.waypoint_index + 1) % self.route.len();
        }
        self.patrol = PatrolPhase::Seeking;
        self.movement.resume();
    }

    fn patrol(&mut self, ctx: &mut CombatContext<'_>) {
        match self.patrol {
            PatrolPhase::Paused(_) => self.set_pose(AgentPose::Idle, &mut *ctx.presentation),
            PatrolPhase::Seeking => {
                if self.seek_destination(&*ctx.targets) {
                    self.patrol = PatrolPhase::Moving;
                    self.set_pose(AgentPose::Walking, &mut *ctx.presentation);
                } else {
                    self.set_pose(AgentPose::Idle, &mut *ctx.presentation);
                }
            },
            PatrolPhase::Moving => {
                let arrived = !self.movement.path_pending()
                    && self.movement.remaining_distance() <= self.config.arrival_threshold;
                if arrived {
                    self.movement.stop();
                    let resume_at = ctx.now + f64::from(self.config.patrol_pause_seconds);
                    let handle = self.tasks.schedule(resume_at, AgentTask::PauseEnd);
                    self.patrol = PatrolPhase::Paused(handle);
                    self.set_pose(AgentPose::Idle, &mut *ctx.presentation);
                } else {
                    self.set_pose(AgentPose::Walking, &mut *ctx.presentation);
                }
            },
        }
    }

    /// Picks the next patrol destination. Returns false if none was set.
    fn seek_destination(&mut self, targets: &dyn CombatTargets) -> bool {
        if !self.route.is_empty() {
            let index = self.waypoint_index % self.route.len();
            let point = match self.route[index] {
                Waypoint::Point(point) => Some(point).filter(|p| p.is_finite()),
                Waypoint::Anchor(anchor) => targets.position_of(anchor),
            };
            return match point {
                Some(point) if self.movement.set_destination(point) => {
                    self.movement.resume();
                    true
                },
                _ => {
                    debug!("Agent {} skipping waypoint {}", self.id, index);
                    self.waypoint_index = (index + 1) % self.route.len();
                    false
                },
            };
        }

        let range = self.config.walk_point_range;
        if range <= 0.0 {
            return false;
        }
        let here = self.movement.position();
        let candidate = here
            + Vec3::new(
                (self.rng.f32() * 2.0 - 1.0) * range,
                0.0,
                (self.rng.f32() * 2.0 - 1.0) * range,
            );
        match self
            .movement
            .sample_reachable_point(candidate, self.config.sample_radius)
        {
            Some(point) if self.movement.set_destination(point) => {
                self.movement.resume();
                true
            },
            _ => false,
        }
    }

    fn chase(&mut self, target_pos: Vec3, presentation: &mut dyn Presentation) {
        self.movement.resume();
        self.movement.set_destination(target_pos);
        self.set_pose(AgentPose::Walking, presentation);
    }

    fn attack(&mut self, target: EntityId, target_pos: Vec3, ctx: &mut CombatContext<'_>) {
        self.movement.stop();
        self.movement.look_at(target_pos);

        if ctx.now < self.attack_cooldown_until {
            self.set_pose(AgentPose::Idle, &mut *ctx.presentation);
            return;
        }

        let outcome = ctx
            .targets
            .damageable_mut(target)
            .map_or(DamageOutcome::Ignored, |d| {
                d.take_damage(self.config.attack_damage)
            });
        if outcome.is_defeated() {
            ctx.targets.on_defeated(target);
        }
        debug!("Agent {} struck {} ({:?})", self.id, target, outcome);

        self.attack_cooldown_until = ctx.now + f64::from(self.config.time_between_attacks);
        self.set_pose(AgentPose::Attacking, &mut *ctx.presentation);
    }

    fn flee(&mut self, threat: Vec3, presentation: &mut dyn Presentation) {
        let Some(flee) = self.config.flee else {
            return;
        };
        let here = self.movement.position();
        let mut away = Vec3::new(here.x - threat.x, 0.0, here.z - threat.z).normalize_or_zero();
        if away == Vec3::ZERO {
            away = -self.movement.transform().forward();
        }

        let candidate = here + away * flee.distance;
        if let Some(point) = self.movement.sample_reachable_point(candidate, flee.distance) {
            self.movement.set_destination(point);
        }
        self.movement.resume();
        self.set_pose(AgentPose::Walking, presentation);
    }

    fn end_flee(&mut self, presentation: &mut dyn Presentation) {
        if self.flee_until.take().is_none() {
            return;
        }
        if let Some(handle) = self.flee_task.take() {
            self.tasks.cancel(handle);
        }
        self.movement.set_speed(self.normal_speed);
        self.transition(AgentState::Patrol, presentation);
    }
}

impl<M: MovementAgent> HitReactor for HostileAgentController<M> {
    fn on_hit(&mut self, point: Vec3, now: f64, presentation: &mut dyn Presentation) {
        if self.despawned {
            return;
        }
        if let Some(effect) = &self.config.hit_effect {
            presentation.spawn_effect(effect, point);
        }
        if self.is_fleeing() {
            return;
        }
        let Some(flee) = self.config.flee else {
            return;
        };

        self.normal_speed = self.movement.speed();
        self.movement.set_speed(flee.speed);
        self.movement.resume();

        let until = now + f64::from(flee.duration_seconds);
        self.flee_until = Some(until);
        self.flee_task = Some(self.tasks.schedule(until, AgentTask::FleeEnd));
        self.transition(AgentState::Flee, presentation);
    }
}
