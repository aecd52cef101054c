//! Action catalog
//!
//! Every move a boxer can make, with its frame data. Frame counts are in
//! simulation ticks and were tuned for a 60 Hz loop.

use serde::{Deserialize, Serialize};

use crate::combat::hitbox::BoxShape;

/// Tagged fighter action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    #[default]
    Idle,
    Jab,
    Cross,
    Hook,
    Uppercut,
    Block,
    Dodge,
    Clinch,
    Staggered,
    KnockedOut,
}

/// Phase of a timed action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionPhase {
    /// Committed, hitbox not yet live
    Windup,
    /// Hitbox or mitigation window is live
    Active,
    /// Cannot act, cannot be cancelled by choice
    Recovery,
}

/// The seven moves a decision source may choose
pub const CHOOSABLE_MOVES: [ActionKind; 7] = [
    ActionKind::Jab,
    ActionKind::Cross,
    ActionKind::Hook,
    ActionKind::Uppercut,
    ActionKind::Block,
    ActionKind::Dodge,
    ActionKind::Clinch,
];

/// Static frame data for one action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionProfile {
    pub windup: u32,
    pub active: u32,
    pub recovery: u32,
    pub stamina_cost: f32,
    pub base_damage: u32,
    /// Largest separation at which the hitbox can touch any hurtbox; the
    /// collision test is skipped beyond it
    pub max_range: f32,
    /// Distance stepped toward the opponent when the action starts (negative retreats)
    pub advance: f32,
    pub crit_bonus: f32,
    /// Striking box in fighter-local space, facing right
    pub hitbox: Option<BoxShape>,
}

impl ActionProfile {
    pub fn total_ticks(&self) -> u32 {
        self.windup + self.active + self.recovery
    }
}

const JAB: ActionProfile = ActionProfile {
    windup: 3,
    active: 2,
    recovery: 4,
    stamina_cost: 8.0,
    base_damage: 10,
    max_range: 115.0,
    advance: 60.0,
    crit_bonus: 0.0,
    hitbox: Some(BoxShape::new(30.0, 100.0, 50.0, 25.0)),
};

const CROSS: ActionProfile = ActionProfile {
    windup: 5,
    active: 3,
    recovery: 6,
    stamina_cost: 18.0,
    base_damage: 21,
    max_range: 130.0,
    advance: 80.0,
    crit_bonus: 0.0,
    hitbox: Some(BoxShape::new(25.0, 95.0, 70.0, 30.0)),
};

const HOOK: ActionProfile = ActionProfile {
    windup: 7,
    active: 3,
    recovery: 8,
    stamina_cost: 28.0,
    base_damage: 33,
    max_range: 115.0,
    advance: 70.0,
    crit_bonus: 0.25,
    hitbox: Some(BoxShape::new(20.0, 90.0, 60.0, 40.0)),
};

const UPPERCUT: ActionProfile = ActionProfile {
    windup: 9,
    active: 4,
    recovery: 10,
    stamina_cost: 35.0,
    base_damage: 40,
    max_range: 90.0,
    advance: 50.0,
    crit_bonus: 0.15,
    hitbox: Some(BoxShape::new(15.0, 80.0, 40.0, 60.0)),
};

const BLOCK: ActionProfile = ActionProfile {
    windup: 2,
    active: 30,
    recovery: 4,
    stamina_cost: 12.0,
    base_damage: 0,
    max_range: 0.0,
    advance: 0.0,
    crit_bonus: 0.0,
    hitbox: None,
};

const DODGE: ActionProfile = ActionProfile {
    windup: 3,
    active: 8,
    recovery: 5,
    stamina_cost: 15.0,
    base_damage: 0,
    max_range: 0.0,
    advance: -80.0,
    crit_bonus: 0.0,
    hitbox: None,
};

const CLINCH: ActionProfile = ActionProfile {
    windup: 4,
    active: 20,
    recovery: 10,
    stamina_cost: 5.0,
    base_damage: 0,
    max_range: 60.0,
    advance: 40.0,
    crit_bonus: 0.0,
    hitbox: None,
};

impl ActionKind {
    /// Frame data, `None` for the untimed states
    pub fn profile(self) -> Option<&'static ActionProfile> {
        match self {
            ActionKind::Jab => Some(&JAB),
            ActionKind::Cross => Some(&CROSS),
            ActionKind::Hook => Some(&HOOK),
            ActionKind::Uppercut => Some(&UPPERCUT),
            ActionKind::Block => Some(&BLOCK),
            ActionKind::Dodge => Some(&DODGE),
            ActionKind::Clinch => Some(&CLINCH),
            ActionKind::Idle | ActionKind::Staggered | ActionKind::KnockedOut => None,
        }
    }

    pub fn is_attack(self) -> bool {
        matches!(
            self,
            ActionKind::Jab | ActionKind::Cross | ActionKind::Hook | ActionKind::Uppercut
        )
    }

    /// Heavy punches are the ones worth dodging rather than blocking
    pub fn is_heavy(self) -> bool {
        matches!(self, ActionKind::Hook | ActionKind::Uppercut)
    }

    /// Whether a decision source may pick this move
    pub fn is_choosable(self) -> bool {
        self.profile().is_some()
    }

    pub fn stamina_cost(self) -> f32 {
        self.profile().map(|p| p.stamina_cost).unwrap_or(0.0)
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Idle => "IDLE",
            ActionKind::Jab => "JAB",
            ActionKind::Cross => "CROSS",
            ActionKind::Hook => "HOOK",
            ActionKind::Uppercut => "UPPERCUT",
            ActionKind::Block => "BLOCK",
            ActionKind::Dodge => "DODGE",
            ActionKind::Clinch => "CLINCH",
            ActionKind::Staggered => "STAGGERED",
            ActionKind::KnockedOut => "KNOCKED_OUT",
        }
    }

    /// Case-insensitive lookup of a choosable move by name
    pub fn from_move_name(name: &str) -> Option<ActionKind> {
        let wanted = name.trim().to_ascii_uppercase();
        CHOOSABLE_MOVES.iter().copied().find(|kind| kind.name() == wanted)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::hitbox::contact_range;

    #[test]
    fn test_every_choosable_move_has_profile() {
        for kind in CHOOSABLE_MOVES {
            let profile = kind.profile().unwrap();
            assert!(profile.active > 0, "{kind} needs an active window");
            assert!(profile.stamina_cost > 0.0);
        }
        assert!(ActionKind::Idle.profile().is_none());
        assert!(ActionKind::KnockedOut.profile().is_none());
    }

    #[test]
    fn test_attacks_have_hitboxes() {
        for kind in CHOOSABLE_MOVES {
            let profile = kind.profile().unwrap();
            assert_eq!(profile.hitbox.is_some(), kind.is_attack());
            assert_eq!(profile.base_damage > 0, kind.is_attack());
        }
    }

    #[test]
    fn test_max_range_reaches_every_hurtbox() {
        for kind in CHOOSABLE_MOVES.into_iter().filter(|k| k.is_attack()) {
            let profile = kind.profile().unwrap();
            let shape = profile.hitbox.unwrap();
            assert!(
                profile.max_range >= contact_range(&shape),
                "{kind} gates at {} but can touch at {}",
                profile.max_range,
                contact_range(&shape)
            );
        }
    }

    #[test]
    fn test_heavier_punches_are_slower() {
        let jab = ActionKind::Jab.profile().unwrap();
        let uppercut = ActionKind::Uppercut.profile().unwrap();
        assert!(uppercut.windup > jab.windup);
        assert!(uppercut.base_damage > jab.base_damage);
        assert!(uppercut.stamina_cost > jab.stamina_cost);
        assert_eq!(jab.total_ticks(), 9);
    }

    #[test]
    fn test_move_name_lookup() {
        assert_eq!(ActionKind::from_move_name("hook"), Some(ActionKind::Hook));
        assert_eq!(ActionKind::from_move_name(" UPPERCUT "), Some(ActionKind::Uppercut));
        assert_eq!(ActionKind::from_move_name("IDLE"), None);
        assert_eq!(ActionKind::from_move_name("KNOCKED_OUT"), None);
        assert_eq!(ActionKind::from_move_name("kick"), None);
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&ActionKind::KnockedOut).unwrap();
        assert_eq!(json, "\"KNOCKED_OUT\"");
        let kind: ActionKind = serde_json::from_str("\"CROSS\"").unwrap();
        assert_eq!(kind, ActionKind::Cross);
    }
}
