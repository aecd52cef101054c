//! Fighter personality profiles loaded from TOML
//!
//! A personality is immutable for the fighter's lifetime and shared behind
//! an `Arc`. The seven presets ship embedded in the binary; a file under
//! `data/personalities/` with the same name overrides the embedded copy.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{BrawlError, Result};
use crate::fighter::ActionKind;

/// Style tag presented to decision sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FightingStyle {
    Brawler,
    Technician,
    CounterPuncher,
    Wildcard,
    #[default]
    AllRounder,
    Pressure,
    Defender,
}

impl FightingStyle {
    pub fn label(self) -> &'static str {
        match self {
            FightingStyle::Brawler => "brawler",
            FightingStyle::Technician => "technician",
            FightingStyle::CounterPuncher => "counter-puncher",
            FightingStyle::Wildcard => "wildcard",
            FightingStyle::AllRounder => "all-rounder",
            FightingStyle::Pressure => "pressure fighter",
            FightingStyle::Defender => "defender",
        }
    }
}

/// Behavioral tendencies (0.0 to 1.0)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitConfig {
    /// Bias toward attacking
    pub aggression: f32,
    /// Bias toward guarding and evading when pressed
    pub defense: f32,
    pub risk_tolerance: f32,
    pub adaptability: f32,
}

impl Default for TraitConfig {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            defense: 0.5,
            risk_tolerance: 0.5,
            adaptability: 0.5,
        }
    }
}

/// Per-move preference weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionWeights {
    pub jab: f32,
    pub cross: f32,
    pub hook: f32,
    pub uppercut: f32,
    pub block: f32,
    pub dodge: f32,
    pub clinch: f32,
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            jab: 1.0,
            cross: 1.0,
            hook: 1.0,
            uppercut: 1.0,
            block: 1.0,
            dodge: 1.0,
            clinch: 0.3,
        }
    }
}

impl ActionWeights {
    pub fn get(&self, kind: ActionKind) -> f32 {
        match kind {
            ActionKind::Jab => self.jab,
            ActionKind::Cross => self.cross,
            ActionKind::Hook => self.hook,
            ActionKind::Uppercut => self.uppercut,
            ActionKind::Block => self.block,
            ActionKind::Dodge => self.dodge,
            ActionKind::Clinch => self.clinch,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrashTalkConfig {
    /// Chance (0.0 to 1.0) that a decision carries a line
    pub frequency: f32,
    pub lines: Vec<String>,
}

impl Default for TrashTalkConfig {
    fn default() -> Self {
        Self {
            frequency: 0.5,
            lines: Vec::new(),
        }
    }
}

/// Complete personality profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personality {
    /// Name of this personality (set from filename)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub style: FightingStyle,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub signature: Option<ActionKind>,
    #[serde(default)]
    pub traits: TraitConfig,
    #[serde(default)]
    pub weights: ActionWeights,
    #[serde(default)]
    pub trash_talk: TrashTalkConfig,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            style: FightingStyle::default(),
            description: "Well-rounded fighter.".to_string(),
            signature: None,
            traits: TraitConfig::default(),
            weights: ActionWeights::default(),
            trash_talk: TrashTalkConfig::default(),
        }
    }
}

/// Names of the embedded presets
pub const PRESET_NAMES: [&str; 7] = [
    "destroyer",
    "tactician",
    "ghost",
    "wildcard",
    "balanced",
    "aggressive",
    "defensive",
];

fn embedded(name: &str) -> Option<&'static str> {
    match name {
        "destroyer" => Some(include_str!("../../data/personalities/destroyer.toml")),
        "tactician" => Some(include_str!("../../data/personalities/tactician.toml")),
        "ghost" => Some(include_str!("../../data/personalities/ghost.toml")),
        "wildcard" => Some(include_str!("../../data/personalities/wildcard.toml")),
        "balanced" => Some(include_str!("../../data/personalities/balanced.toml")),
        "aggressive" => Some(include_str!("../../data/personalities/aggressive.toml")),
        "defensive" => Some(include_str!("../../data/personalities/defensive.toml")),
        _ => None,
    }
}

impl Personality {
    /// Parse a personality document and stamp it with `name`
    pub fn from_toml_str(name: &str, contents: &str) -> Result<Self> {
        let mut personality: Personality = toml::from_str(contents)?;
        personality.name = name.to_string();
        personality.validate()?;
        Ok(personality)
    }

    /// One of the built-in presets
    pub fn preset(name: &str) -> Result<Self> {
        let key = name.trim().to_ascii_lowercase();
        let contents = embedded(&key)
            .ok_or_else(|| BrawlError::Config(format!("unknown personality preset '{}'", name)))?;
        Self::from_toml_str(&key, contents)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.traits;
        for (label, value) in [
            ("aggression", t.aggression),
            ("defense", t.defense),
            ("risk_tolerance", t.risk_tolerance),
            ("adaptability", t.adaptability),
            ("trash_talk.frequency", self.trash_talk.frequency),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(BrawlError::Config(format!(
                    "personality '{}': {} = {} is outside [0, 1]",
                    self.name, label, value
                )));
            }
        }
        if let Some(signature) = self.signature {
            if !signature.is_choosable() {
                return Err(BrawlError::Config(format!(
                    "personality '{}': signature {} is not a move",
                    self.name, signature
                )));
            }
        }
        Ok(())
    }

    pub fn is_aggressive(&self) -> bool {
        self.traits.aggression > 0.6
    }

    pub fn is_patient(&self) -> bool {
        self.traits.defense > 0.6
    }
}

/// Load a personality by name
///
/// Reads `data/personalities/{name}.toml` when present, otherwise falls back
/// to the embedded preset of the same name.
pub fn load_personality(name: &str) -> Result<Personality> {
    let path = personality_path(name)?;
    if path.exists() {
        load_personality_file(name, &path)
    } else {
        Personality::preset(name)
    }
}

/// Load a personality from an explicit TOML path
pub fn load_personality_file(name: &str, path: &Path) -> Result<Personality> {
    let contents = fs::read_to_string(path)?;
    Personality::from_toml_str(name, &contents)
}

/// Get path to personality file. Names are restricted to `[a-z0-9_-]` so
/// they cannot leave the personalities directory.
fn personality_path(name: &str) -> Result<PathBuf> {
    let key = name.trim().to_ascii_lowercase();
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        return Err(BrawlError::Config(format!("invalid personality name '{}'", name)));
    }
    Ok(PathBuf::from("data/personalities").join(format!("{}.toml", key)))
}
