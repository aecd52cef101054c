//! Local fallback decision policy
//!
//! `choose_fallback` is pure and deterministic: the same personality and
//! context always produce the same move. Each candidate starts from the
//! personality's preference weight and is scaled by the situation; the
//! heaviest legal candidate wins, ties going to the earlier move.
//! Narrative lines are drawn separately from a locally seeded RNG.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::context::{DecisionContext, RangeBand};
use crate::ai::personality::Personality;
use crate::fighter::{ActionKind, CHOOSABLE_MOVES};

/// Weight of resting in place before any adjustment
const HOLD_BASELINE: f32 = 0.2;
const DESPERATE_HEALTH: f32 = 0.3;
const FINISH_HEALTH: f32 = 0.3;
const LOW_STAMINA: f32 = 0.3;
const OUT_OF_REACH: f32 = 0.2;
const SIGNATURE_BONUS: f32 = 1.25;
const REPEAT_LIMIT: usize = 3;
const REPEAT_PENALTY: f32 = 0.5;
/// Fighters below this adaptability never change their approach
const ADAPT_MIN: f32 = 0.3;
/// Landed punches plus blocks needed before momentum is judged
const ADAPT_MIN_EXCHANGES: u32 = 5;
const WINNING_RATIO: f32 = 0.7;
const LOSING_RATIO: f32 = 0.3;

/// Tactical situation that dominated the choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    Neutral,
    Defending,
    Desperate,
    Finishing,
    Recovering,
    Approaching,
    Comboing,
    /// Winning the exchanges, pressing the advantage
    Pressing,
    /// Losing the exchanges, tightening up
    Cautious,
}

/// Output of the fallback policy; `Idle` means hold and recover
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackChoice {
    pub action: ActionKind,
    pub mode: FallbackMode,
    pub weight: f32,
}

impl FallbackChoice {
    pub fn reasoning(&self) -> String {
        let text = match self.mode {
            FallbackMode::Neutral => "working behind the preferred punches",
            FallbackMode::Defending => "answering the incoming punch",
            FallbackMode::Desperate => "fighting to survive",
            FallbackMode::Finishing => "going for the finish",
            FallbackMode::Recovering => "catching breath",
            FallbackMode::Approaching => "closing the distance",
            FallbackMode::Comboing => "extending the combination",
            FallbackMode::Pressing => "pressing the advantage",
            FallbackMode::Cautious => "tightening up after losing exchanges",
        };
        format!("{} ({})", text, self.action)
    }
}

struct Weights {
    moves: [f32; 7],
    hold: f32,
}

impl Weights {
    fn scale(&mut self, kind: ActionKind, factor: f32) {
        if let Some(i) = CHOOSABLE_MOVES.iter().position(|k| *k == kind) {
            self.moves[i] *= factor;
        }
    }

    fn scale_all(&mut self, kinds: &[ActionKind], factor: f32) {
        for kind in kinds {
            self.scale(*kind, factor);
        }
    }
}

/// Farthest separation from which `kind` can reach after its step-in
fn reach(kind: ActionKind) -> f32 {
    kind.profile()
        .map(|p| p.max_range + p.advance.max(0.0))
        .unwrap_or(0.0)
}

/// Share of the damage traded so far that this fighter dealt, once
/// enough exchanges have happened to judge
fn damage_ratio(ctx: &DecisionContext) -> Option<f32> {
    let me = &ctx.me;
    let total = me.damage_dealt + me.damage_taken;
    if me.exchanges < ADAPT_MIN_EXCHANGES || total == 0 {
        return None;
    }
    Some(me.damage_dealt as f32 / total as f32)
}

/// Choose a move for `ctx` from `profile` alone
pub fn choose_fallback(profile: &Personality, ctx: &DecisionContext) -> FallbackChoice {
    use ActionKind::*;

    let mut w = Weights {
        moves: CHOOSABLE_MOVES.map(|k| profile.weights.get(k)),
        hold: HOLD_BASELINE,
    };
    let mut mode = FallbackMode::Neutral;

    let my_health = ctx.me.health_fraction();
    let opp_health = ctx.opponent.health_fraction();
    let my_stamina = ctx.me.stamina_fraction();
    let aggressive = profile.is_aggressive();
    let adaptability = profile.traits.adaptability;
    let risk = profile.traits.risk_tolerance;

    // Risk takers lean on the heavy punches and smell the finish sooner
    w.scale_all(&[Hook, Uppercut], 0.8 + 0.4 * risk);
    let finish_health = FINISH_HEALTH * (0.5 + risk);

    // Distance. The jab is the approach tool and is never discounted.
    for kind in [Cross, Hook, Uppercut, Clinch] {
        if ctx.distance > reach(kind) {
            w.scale(kind, OUT_OF_REACH);
        }
    }
    match ctx.range {
        RangeBand::Long | RangeBand::Far => {
            w.scale(Jab, 1.5);
            w.scale_all(&[Block, Dodge], 0.3);
            mode = FallbackMode::Approaching;
        }
        RangeBand::Clinch => {
            w.scale(Uppercut, 1.5);
            w.scale(Hook, 1.3);
            w.scale(Dodge, 0.5);
            if profile.is_patient() {
                w.scale(Clinch, 1.5);
            }
        }
        RangeBand::Punch | RangeBand::Medium => {}
    }
    if ctx.cornered {
        w.scale(Dodge, 0.6);
        w.scale(Clinch, 1.5);
    }

    // Combination follow-ups
    if let Some(next) = ctx.combo_follow_up {
        w.scale(next, 1.6);
        mode = FallbackMode::Comboing;
    } else if ctx.last_action() == Some(Jab) {
        w.scale(Cross, 1.2);
    } else if ctx.last_action() == Some(Cross) {
        w.scale(Hook, 1.2);
    }

    // Momentum
    if adaptability >= ADAPT_MIN {
        match damage_ratio(ctx) {
            Some(ratio) if ratio > WINNING_RATIO => {
                w.scale_all(&[Jab, Cross, Hook, Uppercut], 1.0 + 0.5 * adaptability);
                w.scale_all(&[Block, Dodge], 1.0 - 0.3 * adaptability);
                mode = FallbackMode::Pressing;
            }
            Some(ratio) if ratio < LOSING_RATIO => {
                w.scale_all(&[Block, Dodge], 1.0 + adaptability);
                w.scale_all(&[Jab, Cross, Hook, Uppercut], 1.0 - 0.3 * adaptability);
                mode = FallbackMode::Cautious;
            }
            _ => {}
        }
    }

    // Stamina
    if my_stamina < LOW_STAMINA {
        w.scale(Jab, 1.5);
        w.scale(Hook, 0.5);
        w.scale(Uppercut, 0.3);
        w.hold *= 3.0;
        mode = FallbackMode::Recovering;
    }

    // Opponent finishing or self desperate
    if opp_health < finish_health {
        w.scale(Cross, 1.3);
        w.scale(Hook, 1.3);
        w.scale(Uppercut, 1.4);
        if aggressive {
            w.scale_all(&[Cross, Hook, Uppercut], 1.2);
            w.scale_all(&[Block, Dodge], 0.6);
        }
        mode = FallbackMode::Finishing;
    }
    if my_health < DESPERATE_HEALTH {
        if aggressive {
            w.scale_all(&[Hook, Uppercut], 1.5);
        } else {
            w.scale_all(&[Block, Dodge], 1.8);
            w.scale_all(&[Jab, Cross, Hook, Uppercut], 0.7);
        }
        mode = FallbackMode::Desperate;
    }

    // Incoming punch outranks everything else
    if ctx.opponent.is_winding_up_attack() && ctx.distance <= reach(ctx.opponent.action) {
        if ctx.opponent.action.is_heavy() {
            w.scale(Dodge, 2.0);
            w.scale(Block, 1.5);
        } else if profile.is_patient() {
            w.scale(Block, 2.0);
            w.scale(Dodge, 1.3);
        } else {
            w.scale(Block, 1.5);
        }
        if profile.traits.aggression > 0.5 {
            // Jab is fast enough to land during their windup
            w.scale(Jab, 1.5);
        }
        mode = FallbackMode::Defending;
    }

    if let Some(signature) = profile.signature {
        w.scale(signature, SIGNATURE_BONUS);
    }

    if ctx.repeat_count >= REPEAT_LIMIT {
        if let Some(last) = ctx.last_action() {
            w.scale(last, REPEAT_PENALTY);
        }
    }

    let mut best = FallbackChoice {
        action: Idle,
        mode: FallbackMode::Recovering,
        weight: w.hold,
    };
    for (kind, weight) in CHOOSABLE_MOVES.iter().zip(w.moves) {
        // Hold loses ties; moves tie-break by catalog order
        let beats = weight > best.weight || (best.action == Idle && weight == best.weight);
        if ctx.is_legal(*kind) && beats {
            best = FallbackChoice {
                action: *kind,
                mode,
                weight,
            };
        }
    }
    best
}

/// Fallback decision with its narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackDecision {
    pub choice: FallbackChoice,
    pub narrative: Option<String>,
}

/// Stateful wrapper: pure choice plus seeded trash talk
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    rng: ChaCha8Rng,
}

impl FallbackPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn decide(&mut self, profile: &Personality, ctx: &DecisionContext) -> FallbackDecision {
        FallbackDecision {
            choice: choose_fallback(profile, ctx),
            narrative: self.narrative(profile),
        }
    }

    /// A trash-talk line, drawn with the personality's frequency
    pub fn narrative(&mut self, profile: &Personality) -> Option<String> {
        let talk = &profile.trash_talk;
        if talk.lines.is_empty() || self.rng.gen::<f32>() >= talk.frequency {
            return None;
        }
        talk.lines.choose(&mut self.rng).cloned()
    }
}
