//! Decision context snapshots
//!
//! An owned, serializable copy of everything a decision source may look at.
//! It is built on the simulation thread and moved into the request; nothing
//! in it borrows live fighter state.

use serde::{Deserialize, Serialize};

use crate::ai::personality::FightingStyle;
use crate::core::config::RingConfig;
use crate::core::types::{Facing, FighterId, Tick};
use crate::fighter::{ActionKind, ActionPhase, Fighter, CHOOSABLE_MOVES};

/// Coarse distance bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBand {
    Clinch,
    Punch,
    Medium,
    Long,
    Far,
}

impl RangeBand {
    pub const CLINCH: f32 = 60.0;
    pub const PUNCH: f32 = 140.0;
    pub const MEDIUM: f32 = 200.0;
    pub const LONG: f32 = 300.0;

    pub fn from_distance(distance: f32) -> Self {
        if distance <= Self::CLINCH {
            RangeBand::Clinch
        } else if distance <= Self::PUNCH {
            RangeBand::Punch
        } else if distance <= Self::MEDIUM {
            RangeBand::Medium
        } else if distance <= Self::LONG {
            RangeBand::Long
        } else {
            RangeBand::Far
        }
    }

    /// Short tactical advice included in prompts
    pub fn advice(self) -> &'static str {
        match self {
            RangeBand::Clinch => "You are chest to chest. Uppercuts and hooks land here, or tie them up with a clinch.",
            RangeBand::Punch => "You are in punching range. Every punch can land.",
            RangeBand::Medium => "You are just outside range. Jabs close the distance; power punches step in.",
            RangeBand::Long => "You are at long range. Step in with a jab or wait for them to come.",
            RangeBand::Far => "You are far apart. Close the distance before throwing power.",
        }
    }
}

/// One fighter as seen in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub health: u32,
    pub max_health: u32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub action: ActionKind,
    pub phase: Option<ActionPhase>,
    pub combo_count: u32,
    /// Match totals so far
    pub damage_dealt: u32,
    pub damage_taken: u32,
    /// Punches landed plus successful blocks
    pub exchanges: u32,
}

impl FighterSnapshot {
    pub fn capture(fighter: &Fighter) -> Self {
        Self {
            health: fighter.health,
            max_health: fighter.max_health,
            stamina: fighter.stamina,
            max_stamina: fighter.max_stamina,
            action: fighter.action.kind,
            phase: fighter.action.phase,
            combo_count: fighter.combo.count(),
            damage_dealt: fighter.stats.damage_dealt,
            damage_taken: fighter.stats.damage_taken,
            exchanges: fighter.stats.punches_landed + fighter.stats.blocks_successful,
        }
    }

    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health.max(1) as f32
    }

    pub fn stamina_fraction(&self) -> f32 {
        if self.max_stamina <= 0.0 {
            0.0
        } else {
            self.stamina / self.max_stamina
        }
    }

    /// The fighter is committed to a punch that has not landed yet
    pub fn is_winding_up_attack(&self) -> bool {
        self.action.is_attack() && self.phase == Some(ActionPhase::Windup)
    }
}

/// Everything a decision is made from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub fighter: FighterId,
    pub name: String,
    pub opponent_name: String,
    pub personality: String,
    pub style: FightingStyle,
    pub description: String,
    pub tick: Tick,
    pub round: u32,
    pub round_time_remaining: f32,
    pub me: FighterSnapshot,
    pub opponent: FighterSnapshot,
    pub distance: f32,
    pub range: RangeBand,
    /// Own back is within a clinch length of the ropes
    pub cornered: bool,
    /// Own recent actions, newest last
    pub recent_actions: Vec<ActionKind>,
    pub opponent_recent_actions: Vec<ActionKind>,
    /// Consecutive repeats of the newest own action
    pub repeat_count: usize,
    /// Current unbroken combo run
    pub combo_sequence: Vec<ActionKind>,
    /// Move that would extend the run into a named combo
    pub combo_follow_up: Option<ActionKind>,
    /// Moves the fighter could begin right now
    pub legal_moves: Vec<ActionKind>,
}

impl DecisionContext {
    #[allow(clippy::too_many_arguments)]
    pub fn capture(
        me: &Fighter,
        opponent: &Fighter,
        round: u32,
        round_time_remaining: f32,
        tick: Tick,
        history_len: usize,
        ring: &RingConfig,
    ) -> Self {
        let distance = me.position.distance(&opponent.position);
        let away = -Facing::toward(me.position.x, opponent.position.x).sign();
        let behind = me.position.x + away * RangeBand::CLINCH;
        let cornered = behind <= ring.left_rope || behind >= ring.right_rope;

        Self {
            fighter: me.id,
            name: me.name.clone(),
            opponent_name: opponent.name.clone(),
            personality: me.personality.name.clone(),
            style: me.personality.style,
            description: me.personality.description.clone(),
            tick,
            round,
            round_time_remaining,
            me: FighterSnapshot::capture(me),
            opponent: FighterSnapshot::capture(opponent),
            distance,
            range: RangeBand::from_distance(distance),
            cornered,
            recent_actions: me.recent_actions(history_len),
            opponent_recent_actions: opponent.recent_actions(history_len),
            repeat_count: me.repeat_count(),
            combo_sequence: me.combo.sequence().to_vec(),
            combo_follow_up: me.combo.suggest_follow_up(),
            legal_moves: CHOOSABLE_MOVES
                .iter()
                .copied()
                .filter(|kind| me.can_begin(*kind))
                .collect(),
        }
    }

    pub fn is_legal(&self, kind: ActionKind) -> bool {
        self.legal_moves.contains(&kind)
    }

    /// Newest own action, if any
    pub fn last_action(&self) -> Option<ActionKind> {
        self.recent_actions.last().copied()
    }

    /// Human-readable state summary used in prompts and logs
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Round {} - {:.0}s remaining",
            self.round, self.round_time_remaining
        ));
        lines.push(format!(
            "You ({}): health {}/{} ({:.0}%), stamina {:.0}/{:.0}, doing {}",
            self.name,
            self.me.health,
            self.me.max_health,
            self.me.health_fraction() * 100.0,
            self.me.stamina,
            self.me.max_stamina,
            self.me.action,
        ));
        lines.push(format!(
            "Opponent ({}): health {}/{} ({:.0}%), stamina {:.0}/{:.0}, doing {}{}",
            self.opponent_name,
            self.opponent.health,
            self.opponent.max_health,
            self.opponent.health_fraction() * 100.0,
            self.opponent.stamina,
            self.opponent.max_stamina,
            self.opponent.action,
            match self.opponent.phase {
                Some(ActionPhase::Windup) => " (winding up)",
                _ => "",
            }
        ));
        lines.push(format!(
            "Distance: {:.0} ({:?}). {}",
            self.distance,
            self.range,
            self.range.advice()
        ));
        if self.cornered {
            lines.push("Your back is against the ropes.".to_string());
        }
        if !self.recent_actions.is_empty() {
            lines.push(format!("Your recent moves: {}", join(&self.recent_actions)));
        }
        if !self.opponent_recent_actions.is_empty() {
            lines.push(format!(
                "Opponent recent moves: {}",
                join(&self.opponent_recent_actions)
            ));
        }
        if self.me.combo_count > 1 {
            lines.push(format!("You are on a {}-hit combo.", self.me.combo_count));
        }
        lines.push(format!("Available moves: {}", join(&self.legal_moves)));

        lines.join("\n")
    }
}

fn join(kinds: &[ActionKind]) -> String {
    kinds
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(", ")
}
