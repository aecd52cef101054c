//! Combat events produced by the resolver and read by presentation

use serde::{Deserialize, Serialize};

use crate::combat::hitbox::HitZone;
use crate::core::types::{FighterId, Tick};
use crate::fighter::ActionKind;

/// One connected strike. Produced once per ordered pair per tick at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitEvent {
    pub tick: Tick,
    pub attacker: FighterId,
    pub defender: FighterId,
    pub action: ActionKind,
    pub damage: u32,
    pub was_blocked: bool,
    pub was_countered: bool,
    pub is_critical: bool,
    pub zone: HitZone,
    /// Combo length including this hit; 0 when blocked
    pub combo_count: u32,
    pub combo_name: Option<String>,
    pub staggered: bool,
    pub knocked_out: bool,
}

/// Everything else worth narrating in a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    Hit(HitEvent),
    Dodged {
        tick: Tick,
        attacker: FighterId,
        defender: FighterId,
        action: ActionKind,
    },
    Whiffed {
        tick: Tick,
        fighter: FighterId,
        action: ActionKind,
    },
    Clinch {
        tick: Tick,
        initiator: FighterId,
    },
}

impl CombatEvent {
    pub fn as_hit(&self) -> Option<&HitEvent> {
        match self {
            CombatEvent::Hit(hit) => Some(hit),
            _ => None,
        }
    }
}
