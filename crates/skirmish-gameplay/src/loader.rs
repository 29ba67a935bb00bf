//! Weapon profile and agent archetype loading.
//!
//! This module provides:
//! - Loading weapons and agents from TOML files (assets/combat.toml)
//! - Validation on load; out-of-range numbers are clamped with a warning
//! - A catalog with case-insensitive lookup by name

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use skirmish_common::{ConfigError, ConfigResult};
use tracing::{debug, info, warn};

use crate::agent::{AgentConfig, Waypoint};
use crate::health::{DefeatEffect, Health, DEFAULT_MAX_HEALTH};
use crate::movement::DEFAULT_AGENT_SPEED;
use crate::weapon::WeaponProfile;

/// Default combat config file.
pub const DEFAULT_CONFIG_PATH: &str = "assets/combat.toml";

/// A kind of hostile agent, as authored in config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentArchetype {
    /// Archetype name.
    pub name: String,
    /// Maximum health.
    #[serde(default = "default_max_health")]
    pub max_health: f32,
    /// Normal movement speed.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Behavior tuning.
    #[serde(default)]
    pub behavior: AgentConfig,
    /// Patrol route. Empty means random walk.
    #[serde(default)]
    pub route: Vec<Waypoint>,
    /// Effects performed when defeated.
    #[serde(default)]
    pub defeat_effects: Vec<DefeatEffect>,
}

const fn default_max_health() -> f32 {
    DEFAULT_MAX_HEALTH
}

const fn default_speed() -> f32 {
    DEFAULT_AGENT_SPEED
}

impl AgentArchetype {
    /// Creates an archetype with default stats.
    #[must_use]
    pub fn new(name: impl Into<String>, behavior: AgentConfig) -> Self {
        Self {
            name: name.into(),
            max_health: DEFAULT_MAX_HEALTH,
            speed: DEFAULT_AGENT_SPEED,
            behavior,
            route: Vec::new(),
            defeat_effects: Vec::new(),
        }
    }

    /// Validates the archetype.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "agent has empty name".to_string(),
            ));
        }
        if !self.max_health.is_finite() || !self.speed.is_finite() {
            return Err(ConfigError::Validation(format!(
                "agent '{}' has non-finite health or speed",
                self.name
            )));
        }
        self.behavior.validate(&self.name)
    }

    /// Clamps out-of-range numbers.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.max_health <= 0.0 {
            warn!(
                "Agent '{}' max_health {} replaced with {}",
                self.name, self.max_health, DEFAULT_MAX_HEALTH
            );
            self.max_health = DEFAULT_MAX_HEALTH;
        }
        if self.speed < 0.0 {
            warn!("Agent '{}' speed {} clamped to 0", self.name, self.speed);
            self.speed = 0.0;
        }
        self.behavior = self.behavior.sanitized(&self.name);
        self
    }

    /// Fresh health pool for a spawned instance.
    #[must_use]
    pub fn health(&self) -> Health {
        self.defeat_effects
            .iter()
            .cloned()
            .fold(Health::new(self.max_health), Health::with_defeat_effect)
    }
}

/// Layout of a combat config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatFile {
    /// Weapon profiles.
    #[serde(default)]
    pub weapons: Vec<WeaponProfile>,
    /// Agent archetypes.
    #[serde(default)]
    pub agents: Vec<AgentArchetype>,
}

/// Registry of weapon profiles and agent archetypes.
#[derive(Debug, Clone, Default)]
pub struct CombatCatalog {
    /// Weapons by lowercase name.
    weapons: AHashMap<String, WeaponProfile>,
    /// Agents by lowercase name.
    agents: AHashMap<String, AgentArchetype>,
}

impl CombatCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of weapons.
    #[must_use]
    pub fn weapon_count(&self) -> usize {
        self.weapons.len()
    }

    /// Number of agent archetypes.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty() && self.agents.is_empty()
    }

    /// Registers a weapon after validating and clamping it.
    pub fn register_weapon(&mut self, profile: WeaponProfile) -> ConfigResult<()> {
        profile.validate()?;
        let key = profile.name.to_lowercase();
        if self.weapons.contains_key(&key) {
            return Err(ConfigError::DuplicateName {
                kind: "weapon",
                name: profile.name,
            });
        }
        self.weapons.insert(key, profile.sanitized());
        Ok(())
    }

    /// Registers an agent archetype after validating and clamping it.
    pub fn register_agent(&mut self, archetype: AgentArchetype) -> ConfigResult<()> {
        archetype.validate()?;
        let key = archetype.name.to_lowercase();
        if self.agents.contains_key(&key) {
            return Err(ConfigError::DuplicateName {
                kind: "agent",
                name: archetype.name,
            });
        }
        self.agents.insert(key, archetype.sanitized());
        Ok(())
    }

    /// Gets a weapon by name (case-insensitive).
    #[must_use]
    pub fn weapon(&self, name: &str) -> Option<&WeaponProfile> {
        self.weapons.get(&name.to_lowercase())
    }

    /// Gets an agent archetype by name (case-insensitive).
    #[must_use]
    pub fn agent(&self, name: &str) -> Option<&AgentArchetype> {
        self.agents.get(&name.to_lowercase())
    }

    /// Gets a weapon that `owner` refers to, failing if it is missing.
    pub fn require_weapon(&self, owner: &str, name: &str) -> ConfigResult<&WeaponProfile> {
        self.weapon(name)
            .ok_or_else(|| ConfigError::UnknownReference {
                owner: owner.to_string(),
                kind: "weapon",
                name: name.to_string(),
            })
    }

    /// Gets an agent archetype that `owner` refers to, failing if it is missing.
    pub fn require_agent(&self, owner: &str, name: &str) -> ConfigResult<&AgentArchetype> {
        self.agent(name).ok_or_else(|| ConfigError::UnknownReference {
            owner: owner.to_string(),
            kind: "agent",
            name: name.to_string(),
        })
    }

    /// Weapon names, sorted.
    #[must_use]
    pub fn weapon_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.weapons.values().map(|w| w.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Agent names, sorted.
    #[must_use]
    pub fn agent_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.values().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Loads every entry of a TOML document. Returns the number registered.
    ///
    /// A document is applied whole or not at all: if any entry fails, the
    /// catalog is left as it was.
    pub fn load_str(&mut self, text: &str) -> ConfigResult<usize> {
        let file: CombatFile = toml::from_str(text)?;

        let mut staged = self.clone();
        let mut count = 0;
        for weapon in file.weapons {
            staged.register_weapon(weapon)?;
            count += 1;
        }
        for agent in file.agents {
            staged.register_agent(agent)?;
            count += 1;
        }

        *self = staged;
        Ok(count)
    }

    /// Loads a single TOML file.
    pub fn load_file(&mut self, path: &Path) -> ConfigResult<usize> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let count = self.load_str(&text)?;
        debug!("Loaded {} combat entries from {:?}", count, path);
        Ok(count)
    }

    /// Loads every `.toml` file in a directory, in name order. Files that
    /// fail to load are skipped with a warning.
    pub fn load_dir(&mut self, dir: &Path) -> ConfigResult<usize> {
        if !dir.is_dir() {
            return Err(ConfigError::NotFound(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut count = 0;
        for path in paths {
            match self.load_file(&path) {
                Ok(n) => count += n,
                Err(e) => warn!("Failed to load combat file {:?}: {}", path, e),
            }
        }

        info!("Loaded {} combat entries total", count);
        Ok(count)
    }

    /// Clears the catalog.
    pub fn clear(&mut self) {
        self.weapons.clear();
        self.agents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Damageable;
    use crate::weapon::StrategyKind;
    use glam::Vec3;

    const SAMPLE: &str = r#"
        [[weapons]]
        name = "Short Sword"
        base_damage = 20
        cooldown_seconds = 1.0
        sweep_angle_degrees = 90.0
        attack_range = 2.0
        hit_effect = "spark"

        [[weapons]]
        name = "Club"
        strategy = "area"
        area_radius = 1.5
        area_offset = [0.0, 0.0, 1.0]

        [[agents]]
        name = "Goblin"
        max_health = 40.0
        route = [{ point = [0.0, 0.0, 0.0] }, { point = [5.0, 0.0, 0.0] }]
        defeat_effects = [{ kind = "spawn_loot", item = "ear", count = 2 }]

        [agents.behavior]
        sight_range = 12.0
        attack_damage = 8.0

        [[agents]]
        name = "Deer"

        [agents.behavior]
        aggressive = false
        walk_point_range = 10.0

        [agents.behavior.flee]
        speed = 9.0
    "#;

    #[test]
    fn test_load_str() {
        let mut catalog = CombatCatalog::new();
        assert_eq!(catalog.load_str(SAMPLE).expect("valid sample"), 4);

        let sword = catalog.weapon("short sword").expect("sword");
        assert_eq!(sword.base_damage, 20);
        assert_eq!(sword.strategy, StrategyKind::Sweep);

        let club = catalog.weapon("CLUB").expect("club");
        assert_eq!(club.strategy, StrategyKind::Area);
        assert_eq!(club.area_offset, Vec3::Z);

        let goblin = catalog.agent("goblin").expect("goblin");
        assert_eq!(goblin.behavior.sight_range, 12.0);
        assert_eq!(goblin.behavior.attack_range, 2.0);
        assert_eq!(goblin.route.len(), 2);
        assert_eq!(goblin.health().max_health(), 40.0);
        assert_eq!(goblin.health().defeat_effects().len(), 1);

        let deer = catalog.agent("deer").expect("deer");
        assert!(!deer.behavior.aggressive);
        let flee = deer.behavior.flee.expect("deer flees");
        assert_eq!(flee.speed, 9.0);
        assert_eq!(flee.duration_seconds, 7.0);

        assert_eq!(catalog.weapon_names(), vec!["Club", "Short Sword"]);
        assert_eq!(catalog.agent_names(), vec!["Deer", "Goblin"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut catalog = CombatCatalog::new();
        catalog
            .register_weapon(WeaponProfile::new("Axe"))
            .expect("first axe");
        assert!(matches!(
            catalog.register_weapon(WeaponProfile::new("AXE")),
            Err(ConfigError::DuplicateName { kind: "weapon", .. })
        ));
    }

    #[test]
    fn test_failed_document_registers_nothing() {
        let mut catalog = CombatCatalog::new();
        catalog
            .register_weapon(WeaponProfile::new("Club"))
            .expect("club");

        let twice = "[[weapons]]\nname = \"Axe\"\n\n[[weapons]]\nname = \"Axe\"\n";
        assert!(matches!(
            catalog.load_str(twice),
            Err(ConfigError::DuplicateName { kind: "weapon", .. })
        ));
        assert_eq!(catalog.weapon_names(), vec!["Club"]);

        let bad_agent = r#"
            [[weapons]]
            name = "Spear"

            [[agents]]
            name = ""
        "#;
        assert!(catalog.load_str(bad_agent).is_err());
        assert!(catalog.weapon("spear").is_none());
        assert_eq!(catalog.agent_count(), 0);

        let clash = "[[weapons]]\nname = \"Hammer\"\n\n[[weapons]]\nname = \"club\"\n";
        assert!(catalog.load_str(clash).is_err());
        assert!(catalog.weapon("hammer").is_none());
    }

    #[test]
    fn test_dir_skips_broken_file_whole() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join("half.toml"),
            "[[weapons]]\nname = \"Axe\"\n\n[[weapons]]\nname = \"\"\n",
        )
        .expect("write half");
        fs::write(dir.path().join("ok.toml"), "[[weapons]]\nname = \"Mace\"\n").expect("write ok");

        let mut catalog = CombatCatalog::new();
        assert_eq!(catalog.load_dir(dir.path()).expect("dir loads"), 1);
        assert_eq!(catalog.weapon_names(), vec!["Mace"]);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let mut catalog = CombatCatalog::new();
        catalog
            .load_str(
                r#"
                [[weapons]]
                name = "Twig"
                cooldown_seconds = -2.0
                sweep_radius = 0.0

                [[agents]]
                name = "Rat"
                max_health = -5.0

                [agents.behavior]
                sight_range = 3.0
                attack_range = 10.0
                "#,
            )
            .expect("clamped, not rejected");

        let twig = catalog.weapon("twig").expect("twig");
        assert_eq!(twig.cooldown_seconds, 0.0);
        assert!(twig.sweep_radius > 0.0);

        let rat = catalog.agent("rat").expect("rat");
        assert_eq!(rat.max_health, DEFAULT_MAX_HEALTH);
    }

    #[test]
    fn test_parse_error() {
        let mut catalog = CombatCatalog::new();
        assert!(matches!(
            catalog.load_str("[[weapons]]\nname = "),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            catalog.load_str("[[weapons]]\nname = \"\""),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_require_unknown_reference() {
        let catalog = CombatCatalog::new();
        assert!(matches!(
            catalog.require_weapon("player", "Excalibur"),
            Err(ConfigError::UnknownReference { kind: "weapon", .. })
        ));
        assert!(catalog.require_agent("spawn", "Dragon").is_err());
    }

    #[test]
    fn test_load_file_and_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("a_weapons.toml"), SAMPLE).expect("write sample");
        fs::write(dir.path().join("b_broken.toml"), "not toml [").expect("write broken");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write txt");

        let mut catalog = CombatCatalog::new();
        let count = catalog.load_dir(dir.path()).expect("dir loads");
        assert_eq!(count, 4);
        assert_eq!(catalog.weapon_count(), 2);
        assert_eq!(catalog.agent_count(), 2);

        catalog.clear();
        assert!(catalog.is_empty());
        assert_eq!(
            catalog
                .load_file(&dir.path().join("a_weapons.toml"))
                .expect("file loads"),
            4
        );
    }

    #[test]
    fn test_missing_paths() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut catalog = CombatCatalog::new();

        assert!(matches!(
            catalog.load_file(&dir.path().join("missing.toml")),
            Err(ConfigError::NotFound(_))
        ));
        assert!(matches!(
            catalog.load_dir(&dir.path().join("nope")),
            Err(ConfigError::NotFound(_))
        ));
    }
}
