//! Combo tracking
//!
//! A combo is a run of unblocked, connected hits by one attacker where each
//! hit lands within `combo_gap_ticks` of the previous one. Damage scales with
//! the run length along a bounded curve. Named sequences are recognised for
//! presentation and style points; they never change damage.

use crate::core::config::CombatTuning;
use crate::core::types::Tick;
use crate::fighter::ActionKind;

/// A recognisable punch sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedCombo {
    pub name: &'static str,
    pub sequence: &'static [ActionKind],
    pub style_points: u32,
}

pub static NAMED_COMBOS: [NamedCombo; 4] = [
    NamedCombo {
        name: "One-Two",
        sequence: &[ActionKind::Jab, ActionKind::Cross],
        style_points: 10,
    },
    NamedCombo {
        name: "Three Piece",
        sequence: &[ActionKind::Jab, ActionKind::Cross, ActionKind::Hook],
        style_points: 25,
    },
    NamedCombo {
        name: "The Finisher",
        sequence: &[ActionKind::Jab, ActionKind::Jab, ActionKind::Uppercut],
        style_points: 30,
    },
    NamedCombo {
        name: "Body Breaker",
        sequence: &[ActionKind::Hook, ActionKind::Hook, ActionKind::Cross],
        style_points: 20,
    },
];

/// Damage multiplier for the `count`-th hit of a combo
pub fn combo_multiplier(count: u32, tuning: &CombatTuning) -> f32 {
    let steps = count.saturating_sub(1) as f32;
    (1.0 + tuning.combo_step * steps).min(tuning.combo_max_multiplier)
}

/// Result of registering one combo hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboHit {
    pub count: u32,
    pub named: Option<&'static NamedCombo>,
}

#[derive(Debug, Clone, Default)]
pub struct ComboTracker {
    count: u32,
    last_hit: Option<Tick>,
    sequence: Vec<ActionKind>,
    best: u32,
    style_points: u32,
    last_named: Option<&'static str>,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn style_points(&self) -> u32 {
        self.style_points
    }

    pub fn sequence(&self) -> &[ActionKind] {
        &self.sequence
    }

    pub fn last_named(&self) -> Option<&'static str> {
        self.last_named
    }

    fn within_gap(&self, tick: Tick, gap: Tick) -> bool {
        self.last_hit
            .map(|last| tick.saturating_sub(last) <= gap)
            .unwrap_or(false)
    }

    /// Count the next hit would carry if it landed at `tick`
    pub fn next_count(&self, tick: Tick, gap: Tick) -> u32 {
        if self.within_gap(tick, gap) {
            self.count + 1
        } else {
            1
        }
    }

    /// Record an unblocked hit
    pub fn register_hit(&mut self, kind: ActionKind, tick: Tick, gap: Tick) -> ComboHit {
        if !self.within_gap(tick, gap) {
            self.reset();
        }
        self.count += 1;
        self.last_hit = Some(tick);
        self.sequence.push(kind);
        self.best = self.best.max(self.count);

        let named = self.recognise();
        if let Some(combo) = named {
            self.style_points += combo.style_points;
            self.last_named = Some(combo.name);
        }
        ComboHit {
            count: self.count,
            named,
        }
    }

    /// Longest named sequence that ends the current run
    fn recognise(&self) -> Option<&'static NamedCombo> {
        NAMED_COMBOS
            .iter()
            .filter(|combo| self.sequence.ends_with(combo.sequence))
            .max_by_key(|combo| combo.sequence.len())
    }

    /// Drop the run once the gap has elapsed
    pub fn expire(&mut self, tick: Tick, gap: Tick) {
        if self.count > 0 && !self.within_gap(tick, gap) {
            self.reset();
        }
    }

    /// Clear the current run; best and style points persist
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_hit = None;
        self.sequence.clear();
        self.last_named = None;
    }

    /// Next punch that would extend the current run into a named combo
    pub fn suggest_follow_up(&self) -> Option<ActionKind> {
        if self.sequence.is_empty() {
            return None;
        }
        NAMED_COMBOS.iter().find_map(|combo| {
            let len = self.sequence.len();
            if len < combo.sequence.len() && combo.sequence.starts_with(&self.sequence) {
                Some(combo.sequence[len])
            } else {
                None
            }
        })
    }
}
