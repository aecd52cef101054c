//! Match configuration with documented constants
//!
//! Every tunable number lives here. A `GameConfig` is built once at startup
//! (defaults or a TOML file) and handed to the match controller by value.
//! Durations measured in ticks assume `timing.tick_rate` ticks per second.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{BrawlError, Result};

/// Fixed-timestep and round pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Simulation ticks per second
    pub tick_rate: u32,

    /// Length of a round in seconds before it goes to a decision
    pub round_duration_secs: u32,

    /// Ticks spent in PreRound ("ready... fight!") before fighters may act
    pub pre_round_ticks: u32,

    /// Ticks spent showing the round result before the next round starts
    pub round_end_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            round_duration_secs: 180,
            pre_round_ticks: 90,
            round_end_ticks: 180,
        }
    }
}

impl TimingConfig {
    /// Round length expressed in ticks
    pub fn round_ticks(&self) -> u64 {
        self.round_duration_secs as u64 * self.tick_rate as u64
    }

    /// Convert a per-second rate into a per-tick amount
    pub fn per_tick(&self, per_second: f32) -> f32 {
        per_second / self.tick_rate.max(1) as f32
    }
}

/// Win conditions and between-round behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Rounds a fighter must win to take the match
    pub rounds_to_win: u32,

    /// Hard cap on rounds played (draw rounds can otherwise repeat forever).
    /// `None` means no cap.
    pub max_rounds: Option<u32>,

    /// Restore full health at the start of every round.
    ///
    /// When false, health carries over and only stamina resets.
    pub reset_health_each_round: bool,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            rounds_to_win: 2,
            max_rounds: None,
            reset_health_each_round: true,
        }
    }
}

/// Damage, stamina and state-machine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub max_health: u32,
    pub max_stamina: f32,

    /// Stamina regained per second while performing any action
    pub stamina_regen_per_sec: f32,

    /// Extra stamina per second while Idle
    pub idle_regen_bonus_per_sec: f32,

    /// Fraction of base damage that gets through a Block (0.3 = 70% reduction)
    pub block_damage_factor: f32,

    /// Stamina the defender loses for each blocked hit
    pub block_stamina_cost: f32,

    /// Damage multiplier for hitting an opponent who is still winding up
    pub counter_multiplier: f32,

    /// Damage multiplier on a critical hit
    pub crit_multiplier: f32,

    /// Crit chance shared by every attack, before the action's own bonus
    pub base_crit_chance: f32,

    /// Maximum ticks between two hits for them to count as one combo
    pub combo_gap_ticks: u64,

    /// Multiplier gained per combo hit after the first
    pub combo_step: f32,

    /// Upper bound of the combo multiplier curve
    pub combo_max_multiplier: f32,

    /// Unblocked hits below this damage do not stagger
    pub stagger_min_damage: u32,

    /// Stagger ticks per point of damage taken
    pub stagger_ticks_per_damage: f32,
    pub stagger_min_ticks: u32,
    pub stagger_max_ticks: u32,

    /// Ticks both fighters must wait after a clinch lands
    pub clinch_cooldown_ticks: u32,

    /// Ticks an Idle ("hold") decision keeps the fighter resting before asking again
    pub idle_hold_ticks: u32,

    /// Attackers below this much stamina hit softer
    pub exhaustion_threshold: f32,

    /// Base damage factor applied while exhausted
    pub exhaustion_damage_factor: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            max_stamina: 100.0,
            stamina_regen_per_sec: 5.0,
            idle_regen_bonus_per_sec: 8.0,
            block_damage_factor: 0.3,
            block_stamina_cost: 6.0,
            counter_multiplier: 1.5,
            crit_multiplier: 2.0,
            base_crit_chance: 0.05,
            combo_gap_ticks: 48,
            combo_step: 0.1,
            combo_max_multiplier: 1.5,
            stagger_min_damage: 1,
            stagger_ticks_per_damage: 1.2,
            stagger_min_ticks: 12,
            stagger_max_ticks: 48,
            clinch_cooldown_ticks: 45,
            idle_hold_ticks: 15,
            exhaustion_threshold: 20.0,
            exhaustion_damage_factor: 0.7,
        }
    }
}

/// Ring geometry (world units, x grows to the right)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    pub left_rope: f32,
    pub right_rope: f32,
    pub red_start_x: f32,
    pub blue_start_x: f32,

    /// Fighters never get closer than this
    pub min_separation: f32,

    /// Separation both fighters are pushed to when a clinch breaks
    pub clinch_break_separation: f32,

    /// Distance a clean hit pushes the defender back
    pub knockback_distance: f32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            left_rope: 100.0,
            right_rope: 1180.0,
            red_start_x: 400.0,
            blue_start_x: 880.0,
            min_separation: 40.0,
            clinch_break_separation: 140.0,
            knockback_distance: 25.0,
        }
    }
}

/// External decision source behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Wall-clock budget for one external decision before the fallback takes over
    pub timeout_ms: u64,

    /// Attempts after an HTTP 429 before giving up
    pub max_retries: u32,

    /// Number of recent actions included in each context snapshot
    pub history_len: usize,

    /// After a timeout or failure the external source is left alone this long
    pub unavailable_retry_ms: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 4_000,
            max_retries: 2,
            history_len: 5,
            unavailable_retry_ms: 30_000,
        }
    }
}

impl DecisionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_after(&self) -> Duration {
        Duration::from_millis(self.unavailable_retry_ms)
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: MatchRules,
    pub combat: CombatTuning,
    pub ring: RingConfig,
    pub decision: DecisionConfig,

    /// Seed for crit rolls and trash-talk selection. `None` draws from entropy.
    pub rng_seed: Option<u64>,
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing sections fall back to defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Builder-style seed override
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.timing.tick_rate == 0 {
            return Err(BrawlError::Config("tick_rate must be positive".into()));
        }
        if self.timing.round_duration_secs == 0 {
            return Err(BrawlError::Config("round_duration_secs must be positive".into()));
        }
        if self.rules.rounds_to_win == 0 {
            return Err(BrawlError::Config("rounds_to_win must be positive".into()));
        }
        if let Some(max) = self.rules.max_rounds {
            if max < self.rules.rounds_to_win {
                return Err(BrawlError::Config(format!(
                    "max_rounds ({}) is below rounds_to_win ({})",
                    max, self.rules.rounds_to_win
                )));
            }
        }

        let c = &self.combat;
        if c.max_health == 0 || c.max_stamina <= 0.0 {
            return Err(BrawlError::Config("max_health and max_stamina must be positive".into()));
        }
        if !(0.0..=1.0).contains(&c.block_damage_factor) {
            return Err(BrawlError::Config(format!(
                "block_damage_factor ({}) must be within [0, 1]",
                c.block_damage_factor
            )));
        }
        if c.combo_max_multiplier < 1.0 || c.combo_step < 0.0 {
            return Err(BrawlError::Config(
                "combo curve must start at 1.0 and never decrease".into(),
            ));
        }
        if c.stagger_min_ticks > c.stagger_max_ticks {
            return Err(BrawlError::Config(format!(
                "stagger_min_ticks ({}) should be <= stagger_max_ticks ({})",
                c.stagger_min_ticks, c.stagger_max_ticks
            )));
        }
        if !(0.0..=1.0).contains(&c.base_crit_chance) {
            return Err(BrawlError::Config("base_crit_chance must be within [0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&c.exhaustion_damage_factor) || c.exhaustion_threshold < 0.0 {
            return Err(BrawlError::Config(format!(
                "exhaustion_damage_factor ({}) must be within [0, 1] with a non-negative threshold",
                c.exhaustion_damage_factor
            )));
        }

        let r = &self.ring;
        if r.left_rope >= r.right_rope {
            return Err(BrawlError::Config("left_rope must be left of right_rope".into()));
        }
        let inside = |x: f32| x >= r.left_rope && x <= r.right_rope;
        if !inside(r.red_start_x) || !inside(r.blue_start_x) {
            return Err(BrawlError::Config("start positions must be inside the ropes".into()));
        }
        if (r.blue_start_x - r.red_start_x).abs() < r.min_separation {
            return Err(BrawlError::Config("fighters start closer than min_separation".into()));
        }

        if self.decision.timeout_ms == 0 {
            return Err(BrawlError::Config("decision timeout must be positive".into()));
        }
        if self.decision.unavailable_retry_ms == 0 {
            return Err(BrawlError::Config("unavailable_retry_ms must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_round_ticks() {
        let timing = TimingConfig::default();
        assert_eq!(timing.round_ticks(), 180 * 60);
        assert!((timing.per_tick(60.0) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            rng_seed = 7

            [rules]
            rounds_to_win = 3
            reset_health_each_round = false

            [decision]
            timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.rules.rounds_to_win, 3);
        assert!(!config.rules.reset_health_each_round);
        assert_eq!(config.decision.timeout(), Duration::from_millis(250));
        assert_eq!(config.timing.tick_rate, 60);
        assert_eq!(config.combat.max_health, 100);
    }

    #[test]
    fn test_invalid_block_factor_rejected() {
        let mut config = GameConfig::default();
        config.combat.block_damage_factor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exhaustion_factor_and_retry_window_checked() {
        let mut config = GameConfig::default();
        assert_eq!(config.decision.retry_after(), Duration::from_secs(30));
        config.combat.exhaustion_damage_factor = 1.2;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.decision.unavailable_retry_ms = 0;
        assert!(matches!(config.validate(), Err(BrawlError::Config(_))));
    }

    #[test]
    fn test_max_rounds_below_threshold_rejected() {
        let mut config = GameConfig::default();
        config.rules.max_rounds = Some(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = GameConfig::from_toml_str("[timing\ntick_rate = ");
        assert!(matches!(result, Err(BrawlError::TomlError(_))));
    }
}
