//! Stamina resource.
//!
//! Attacks spend stamina through [`StaminaPool`]. [`Stamina`] is the standard
//! pool: it drains while sprinting and regenerates otherwise.

use serde::{Deserialize, Serialize};

/// Resource an attack is paid from.
pub trait StaminaPool {
    /// Stamina currently available.
    fn available(&self) -> f32;

    /// Spends `amount`. Returns false, spending nothing, if there is not
    /// enough.
    fn consume(&mut self, amount: f32) -> bool;
}

/// Stamina tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    /// Maximum stamina.
    pub max: f32,
    /// Drain per second while sprinting.
    pub sprint_drain_per_second: f32,
    /// Regeneration per second while not sprinting.
    pub regen_per_second: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            sprint_drain_per_second: 15.0,
            regen_per_second: 10.0,
        }
    }
}

/// Stamina pool of one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamina {
    current: f32,
    config: StaminaConfig,
    sprinting: bool,
}

impl Default for Stamina {
    fn default() -> Self {
        Self::new(StaminaConfig::default())
    }
}

impl Stamina {
    /// Creates a full pool.
    #[must_use]
    pub fn new(config: StaminaConfig) -> Self {
        let config = StaminaConfig {
            max: config.max.max(0.0),
            ..config
        };
        Self {
            current: config.max,
            config,
            sprinting: false,
        }
    }

    /// Sets current stamina, clamped to `[0, max]`.
    #[must_use]
    pub fn with_current(mut self, current: f32) -> Self {
        self.current = current.clamp(0.0, self.config.max);
        self
    }

    /// Current stamina.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Maximum stamina.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.config.max
    }

    /// Requests sprinting. Ignored while empty.
    pub fn set_sprinting(&mut self, sprinting: bool) {
        self.sprinting = sprinting && self.current > 0.0;
    }

    /// Whether the actor is sprinting.
    #[must_use]
    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    /// Advances drain or regeneration by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.sprinting {
            self.current -= self.config.sprint_drain_per_second * dt;
            if self.current <= 0.0 {
                self.current = 0.0;
                self.sprinting = false;
            }
        } else {
            self.current += self.config.regen_per_second * dt;
        }
        self.current = self.current.clamp(0.0, self.config.max);
    }
}

impl StaminaPool for Stamina {
    fn available(&self) -> f32 {
        self.current
    }

    fn consume(&mut self, amount: f32) -> bool {
        if !amount.is_finite() || amount < 0.0 || amount > self.current {
            return false;
        }
        self.current -= amount;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume() {
        let mut stamina = Stamina::default();
        assert!(stamina.consume(10.0));
        assert_eq!(stamina.available(), 90.0);

        assert!(!stamina.consume(500.0));
        assert!(!stamina.consume(-1.0));
        assert_eq!(stamina.available(), 90.0);
    }

    #[test]
    fn test_regen_clamps_at_max() {
        let mut stamina = Stamina::default().with_current(95.0);
        stamina.tick(1.0);
        assert_eq!(stamina.current(), 100.0);
    }

    #[test]
    fn test_sprint_drains_then_stops() {
        let mut stamina = Stamina::default().with_current(20.0);
        stamina.set_sprinting(true);
        stamina.tick(1.0);
        assert_eq!(stamina.current(), 5.0);
        assert!(stamina.is_sprinting());

        stamina.tick(1.0);
        assert_eq!(stamina.current(), 0.0);
        assert!(!stamina.is_sprinting());

        stamina.set_sprinting(true);
        assert!(!stamina.is_sprinting());
    }
}
