//! Scripted fight.
//!
//! An armed player closes on the nearest agent, sprinting while it is far
//! off and stamina is above half, and swings whenever that agent is within
//! weapon reach. An unarmed player holds its ground. The run ends when every
//! agent is defeated, the player falls, or time runs out.

use std::collections::HashMap;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use serde::Serialize;
use skirmish_common::EntityId;
use skirmish_gameplay::{
    AgentState, Arena, CombatCatalog, Health, LootDrop, Stamina, StrategyKind, WalkableArea,
    WeaponProfile, ACTOR_RADIUS,
};
use tracing::{debug, info};

use crate::config::SimConfig;

/// How the fight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every agent was defeated.
    Cleared,
    /// The player was defeated.
    PlayerDefeated,
    /// The duration elapsed.
    TimeUp,
}

/// An agent still standing at the end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Survivor {
    /// Archetype name
    pub name: String,
    /// Final behavior state
    pub state: AgentState,
    /// Remaining health
    pub health: f32,
}

/// Result of a run, printed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimSummary {
    /// How the fight ended
    pub outcome: Outcome,
    /// Simulated seconds
    pub seconds: f64,
    /// Ticks run
    pub ticks: u64,
    /// Player swings resolved
    pub swings: usize,
    /// Hits landed by the player
    pub hits: usize,
    /// Seconds the player spent sprinting
    pub sprint_seconds: f64,
    /// Player health at the end (None if defeated)
    pub player_health: Option<f32>,
    /// Archetype names of defeated agents, in order
    pub defeated: Vec<String>,
    /// Agents still standing
    pub survivors: Vec<Survivor>,
    /// Loot dropped
    pub loot: Vec<LootDrop>,
    /// Effects spawned
    pub effects: usize,
    /// Sounds played
    pub sounds: usize,
}

/// The player sprints while the target is this many reaches away.
const SPRINT_DISTANCE_FACTOR: f32 = 2.0;

/// A built arena ready to run.
#[derive(Debug)]
pub struct Scenario {
    arena: Arena,
    player: EntityId,
    reach: f32,
    duration: f64,
    names: HashMap<EntityId, String>,
}

/// Distance from the wielder at which a weapon can still connect.
fn weapon_reach(profile: &WeaponProfile) -> f32 {
    let reach = match profile.strategy {
        StrategyKind::Sweep => profile.attack_range + profile.sweep_radius,
        StrategyKind::Area => profile.area_offset.length() + profile.area_radius,
    };
    reach + ACTOR_RADIUS
}

impl Scenario {
    /// Builds the arena described by `config`, resolving names in `catalog`.
    pub fn build(catalog: &CombatCatalog, config: &SimConfig) -> Result<Self> {
        let mut arena = Arena::new(config.tick_rate);
        if config.arena_half_extent > 0.0 {
            let half = Vec2::splat(config.arena_half_extent);
            arena = arena.with_area(WalkableArea::new(-half, half));
        }

        let player = arena.spawn_player(
            config.player_position,
            Health::new(config.player_health),
            Stamina::default(),
        );

        let weapon = config
            .player_weapon
            .as_deref()
            .map(|name| catalog.require_weapon("player", name).cloned())
            .transpose()
            .context("resolving the player's weapon")?;
        let reach = weapon.as_ref().map_or(0.0, weapon_reach);
        if let Some(profile) = &weapon {
            info!("Player wields '{}' (reach {:.2})", profile.name, reach);
        }
        arena.equip(player, weapon);

        let mut names = HashMap::new();
        for (i, spawn) in config.spawns.iter().enumerate() {
            let archetype = catalog
                .require_agent(&format!("spawn {i}"), &spawn.agent)
                .context("resolving spawns")?;
            let target = spawn.hunts_player.then_some(player);
            let id = arena.spawn_agent(archetype, spawn.position, target);
            names.insert(id, archetype.name.clone());
        }

        Ok(Self {
            arena,
            player,
            reach,
            duration: f64::from(config.duration_seconds),
            names,
        })
    }

    fn drive_player(&mut self) {
        let Some(position) = self.arena.position(self.player) else {
            return;
        };
        let Some((agent, agent_pos)) = self.arena.nearest_agent(position) else {
            self.arena.stop(self.player);
            return;
        };
        self.arena.face_towards(self.player, agent_pos);
        if self.reach <= 0.0 {
            return;
        }

        let distance = flat_distance(position, agent_pos);
        if distance > self.reach {
            self.arena.move_towards(self.player, agent_pos);
            let fresh = self
                .arena
                .stamina(self.player)
                .is_some_and(|s| s.current() > s.max() * 0.5);
            let far = distance > self.reach * SPRINT_DISTANCE_FACTOR;
            self.arena.set_sprinting(self.player, fresh && far);
            return;
        }

        self.arena.stop(self.player);
        if self.arena.attack(self.player) {
            debug!("Player swings at {}", agent);
        }
    }

    /// Runs to completion and summarizes.
    pub fn run(mut self) -> SimSummary {
        let mut ticks = 0;
        let mut swings = 0;
        let mut hits = 0;
        let mut sprint_ticks = 0_u64;

        let outcome = loop {
            if !self.arena.is_alive(self.player) {
                break Outcome::PlayerDefeated;
            }
            if self.arena.agent_states().is_empty() {
                break Outcome::Cleared;
            }
            if self.arena.now() >= self.duration {
                break Outcome::TimeUp;
            }

            self.drive_player();
            if self
                .arena
                .stamina(self.player)
                .is_some_and(Stamina::is_sprinting)
            {
                sprint_ticks += 1;
            }
            let report = self.arena.step();
            ticks += 1;
            for (attacker, swing) in &report.swings {
                if *attacker == self.player {
                    swings += 1;
                    hits += swing.hits.len();
                }
            }
            for id in &report.defeated {
                info!(
                    "{} {} defeated at {:.2}s",
                    self.name_of(*id),
                    id,
                    self.arena.now()
                );
            }
        };

        let survivors = self
            .arena
            .agent_states()
            .into_iter()
            .map(|(id, state)| Survivor {
                name: self.name_of(id).to_string(),
                state,
                health: self.arena.health(id).unwrap_or(0.0),
            })
            .collect();
        let defeated = self
            .arena
            .defeated()
            .iter()
            .filter(|id| **id != self.player)
            .map(|id| self.name_of(*id).to_string())
            .collect();

        info!("Fight over: {:?} after {:.2}s", outcome, self.arena.now());
        SimSummary {
            outcome,
            seconds: self.arena.now(),
            ticks,
            swings,
            hits,
            sprint_seconds: sprint_ticks as f64 * f64::from(self.arena.dt()),
            player_health: self.arena.health(self.player),
            defeated,
            survivors,
            loot: self.arena.loot().to_vec(),
            effects: self.arena.presentation().effect_count(),
            sounds: self.arena.presentation().sound_count(),
        }
    }

    /// Number of agents spawned.
    #[must_use]
    pub fn spawned(&self) -> usize {
        self.names.len()
    }

    fn name_of(&self, id: EntityId) -> &str {
        self.names.get(&id).map_or("unknown", String::as_str)
    }
}

fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIGHT: &str = r#"
        [[weapons]]
        name = "Longsword"
        base_damage = 20
        cooldown_seconds = 0.5
        activation_delay_seconds = 0.1
        attack_range = 2.0
        sweep_radius = 0.5
        hit_effect = "spark"

        [[agents]]
        name = "Goblin"
        max_health = 30.0
        [[agents.defeat_effects]]
        kind = "spawn_loot"
        item = "goblin_ear"

        [agents.behavior]
        walk_point_range = 0.0

        [sim]
        tick_rate = 30.0
        duration_seconds = 20.0
        player_weapon = "Longsword"

        [[sim.spawns]]
        agent = "Goblin"
        position = [5.0, 0.0, 0.0]
    "#;

    fn setup(text: &str) -> (CombatCatalog, SimConfig) {
        let mut catalog = CombatCatalog::new();
        catalog.load_str(text).expect("valid combat file");
        let mut config = SimConfig::from_toml(text).expect("valid sim section");
        config.validate();
        (catalog, config)
    }

    #[test]
    fn test_armed_player_clears_arena() {
        let (catalog, config) = setup(FIGHT);
        let scenario = Scenario::build(&catalog, &config).expect("scenario builds");
        assert_eq!(scenario.spawned(), 1);

        let summary = scenario.run();
        assert_eq!(summary.outcome, Outcome::Cleared);
        assert_eq!(summary.defeated, vec!["Goblin".to_string()]);
        assert!(summary.survivors.is_empty());
        assert_eq!(summary.hits, 2);
        assert!(summary.swings >= 2);
        assert_eq!(summary.loot.len(), 1);
        assert_eq!(summary.loot[0].item, "goblin_ear");
        assert!(summary.player_health.is_some());
    }

    #[test]
    fn test_player_sprints_to_distant_agent() {
        let (catalog, mut config) = setup(FIGHT);
        config.spawns[0].position = Vec3::new(15.0, 0.0, 0.0);
        config.spawns[0].hunts_player = false;

        let summary = Scenario::build(&catalog, &config)
            .expect("scenario builds")
            .run();
        assert_eq!(summary.outcome, Outcome::Cleared);
        assert!(summary.sprint_seconds > 0.0);
    }

    #[test]
    fn test_unarmed_player_falls() {
        let (catalog, mut config) = setup(FIGHT);
        config.player_weapon = None;
        config.player_health = 15.0;

        let summary = Scenario::build(&catalog, &config)
            .expect("scenario builds")
            .run();
        assert_eq!(summary.outcome, Outcome::PlayerDefeated);
        assert_eq!(summary.swings, 0);
        assert_eq!(summary.sprint_seconds, 0.0);
        assert_eq!(summary.player_health, None);
        assert_eq!(summary.survivors.len(), 1);
        assert_eq!(summary.survivors[0].name, "Goblin");
    }

    #[test]
    fn test_time_up_with_passive_agent() {
        let (catalog, mut config) = setup(FIGHT);
        config.player_weapon = None;
        config.duration_seconds = 1.0;
        config.spawns[0].hunts_player = false;

        let summary = Scenario::build(&catalog, &config)
            .expect("scenario builds")
            .run();
        assert_eq!(summary.outcome, Outcome::TimeUp);
        assert_eq!(summary.survivors[0].state, AgentState::Patrol);
        assert_eq!(summary.player_health, Some(100.0));
    }

    #[test]
    fn test_unknown_names_fail_to_build() {
        let (catalog, mut config) = setup(FIGHT);
        config.player_weapon = Some("Halberd".to_string());
        assert!(Scenario::build(&catalog, &config).is_err());

        let (catalog, mut config) = setup(FIGHT);
        config.spawns[0].agent = "Dragon".to_string();
        assert!(Scenario::build(&catalog, &config).is_err());
    }

    #[test]
    fn test_bundled_combat_file_builds() {
        let (catalog, config) = setup(include_str!("../../../assets/combat.toml"));
        assert_eq!(catalog.weapon_names(), vec!["Dagger", "Longsword", "Warhammer"]);
        assert_eq!(catalog.agent_count(), 3);

        let scenario = Scenario::build(&catalog, &config).expect("bundled scenario builds");
        assert_eq!(scenario.spawned(), config.spawns.len());
    }

    #[test]
    fn test_weapon_reach() {
        let sweep = WeaponProfile::new("Sword").with_sweep(2.0, 0.5, 90.0);
        assert_eq!(weapon_reach(&sweep), 2.0 + 0.5 + ACTOR_RADIUS);

        let area = WeaponProfile::new("Slam").with_area(1.5, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(weapon_reach(&area), 1.0 + 1.5 + ACTOR_RADIUS);
    }
}
