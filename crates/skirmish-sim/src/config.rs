//! Simulator configuration.
//!
//! The `[sim]` section of the combat file describes the scripted fight: tick
//! rate, duration, the player's loadout and which agents spawn where.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skirmish_gameplay::DEFAULT_TICK_HZ;
use tracing::{info, warn};

/// One agent placed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Archetype name in the catalog.
    pub agent: String,
    /// Spawn position.
    pub position: Vec3,
    /// Whether the agent tracks the player.
    #[serde(default = "default_hunts_player")]
    pub hunts_player: bool,
}

const fn default_hunts_player() -> bool {
    true
}

/// Scripted fight parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Clock ===
    /// Ticks per second
    pub tick_rate: f32,
    /// Simulated seconds before giving up
    pub duration_seconds: f32,

    // === Arena ===
    /// Half width of the square walkable area (0 = unbounded)
    pub arena_half_extent: f32,

    // === Player ===
    /// Weapon the player starts with (None = unarmed)
    pub player_weapon: Option<String>,
    /// Player maximum health
    pub player_health: f32,
    /// Player start position
    pub player_position: Vec3,

    // === Agents ===
    /// Agents placed at startup
    pub spawns: Vec<SpawnConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_HZ,
            duration_seconds: 60.0,
            arena_half_extent: 30.0,
            player_weapon: None,
            player_health: 100.0,
            player_position: Vec3::ZERO,
            spawns: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SimSection {
    #[serde(default)]
    sim: SimConfig,
}

impl SimConfig {
    /// Reads the `[sim]` section of a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let section: SimSection = toml::from_str(text)?;
        Ok(section.sim)
    }

    /// Load the `[sim]` section from a file.
    /// Returns defaults if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Sim config {} not found, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read sim config: {e}");
                return Self::default();
            },
        };

        match Self::from_toml(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded sim config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse sim config: {e}");
                Self::default()
            },
        }
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        if !self.tick_rate.is_finite() {
            self.tick_rate = DEFAULT_TICK_HZ;
        }
        self.tick_rate = self.tick_rate.clamp(1.0, 1000.0);

        if !self.duration_seconds.is_finite() || self.duration_seconds < 0.0 {
            warn!("Invalid duration {}, using 60s", self.duration_seconds);
            self.duration_seconds = 60.0;
        }

        if !self.arena_half_extent.is_finite() {
            self.arena_half_extent = 0.0;
        }
        self.arena_half_extent = self.arena_half_extent.max(0.0);

        if !self.player_health.is_finite() || self.player_health <= 0.0 {
            self.player_health = 100.0;
        }
    }
}
