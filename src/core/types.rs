//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Simulation tick counter (fixed-timestep time unit)
pub type Tick = u64;

/// Unique identifier for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// One of the two corners in the ring. Only `RED` and `BLUE` exist, so
/// `index()` is always a valid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct FighterId(u8);

impl FighterId {
    pub const RED: FighterId = FighterId(0);
    pub const BLUE: FighterId = FighterId(1);

    /// Slot index into per-fighter arrays
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn opponent(self) -> FighterId {
        FighterId(1 - self.0)
    }

    pub fn both() -> [FighterId; 2] {
        [Self::RED, Self::BLUE]
    }
}

impl TryFrom<u8> for FighterId {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::RED),
            1 => Ok(Self::BLUE),
            other => Err(format!("no fighter in corner {}", other)),
        }
    }
}

impl std::fmt::Display for FighterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => write!(f, "red"),
            _ => write!(f, "blue"),
        }
    }
}

/// Which way a fighter is looking along the x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// +1.0 when facing right, -1.0 when facing left
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Facing that looks from `from_x` toward `to_x`
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x >= from_x {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}

/// 2D position (x along the ring, y up from the canvas floor)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}
