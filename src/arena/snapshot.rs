//! Read-only view of a match for presentation layers

use serde::{Deserialize, Serialize};

use crate::ai::broker::Diagnostic;
use crate::arena::round::{MatchOutcome, RoundPhase};
use crate::combat::events::CombatEvent;
use crate::core::types::{Facing, FighterId, MatchId, Tick, Vec2};
use crate::fighter::{ActionKind, ActionPhase, FightStats, Fighter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterView {
    pub id: FighterId,
    pub name: String,
    pub personality: String,
    pub position: Vec2,
    pub facing: Facing,
    pub health: u32,
    pub max_health: u32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub action: ActionKind,
    pub phase: Option<ActionPhase>,
    pub combo: u32,
    pub best_combo: u32,
    pub style_points: u32,
    pub last_combo: Option<String>,
    pub stats: FightStats,
}

impl FighterView {
    pub fn of(fighter: &Fighter) -> Self {
        Self {
            id: fighter.id,
            name: fighter.name.clone(),
            personality: fighter.personality.name.clone(),
            position: fighter.position,
            facing: fighter.facing,
            health: fighter.health,
            max_health: fighter.max_health,
            stamina: fighter.stamina,
            max_stamina: fighter.max_stamina,
            action: fighter.action.kind,
            phase: fighter.action.phase,
            combo: fighter.combo.count(),
            best_combo: fighter.combo.best(),
            style_points: fighter.combo.style_points(),
            last_combo: fighter.combo.last_named().map(str::to_string),
            stats: fighter.stats.clone(),
        }
    }
}

/// Everything presentation needs after one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    pub tick: Tick,
    pub round: u32,
    pub phase: RoundPhase,
    pub round_time_remaining: f32,
    pub fighters: [FighterView; 2],
    /// Events produced during this tick only
    pub events: Vec<CombatEvent>,
    /// Latest trash talk per fighter
    pub narrative: [Option<String>; 2],
    /// One-time notices, e.g. the provider being unreachable
    pub diagnostics: Vec<Diagnostic>,
    pub score: [u32; 2],
    /// 0.0 = blue dominating, 0.5 = even, 1.0 = red dominating
    pub momentum: f32,
    pub outcome: Option<MatchOutcome>,
}

impl MatchSnapshot {
    pub fn fighter(&self, id: FighterId) -> &FighterView {
        &self.fighters[id.index()]
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RoundPhase::MatchEnd
    }

    pub fn momentum_label(&self) -> &'static str {
        match self.momentum {
            m if m >= 0.7 => "red dominating",
            m if m >= 0.55 => "red advantage",
            m if m > 0.45 => "even",
            m if m > 0.3 => "blue advantage",
            _ => "blue dominating",
        }
    }
}
