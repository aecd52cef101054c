//! Strike collision
//!
//! Decides what a live strike does to the defender. Pure with respect to
//! fighter state: the only mutation is the crit roll drawn from `rng`.
//! Precedence once the strike box overlaps the defender:
//! guard, then evasion, then counter, then a clean hit. An exhausted
//! attacker's base damage is cut before any of them apply.

use rand::Rng;

use crate::combat::combo::combo_multiplier;
use crate::combat::events::HitEvent;
use crate::combat::hitbox::{first_zone_hit, Stance};
use crate::core::config::CombatTuning;
use crate::core::types::Tick;
use crate::fighter::{ActionKind, ActionPhase, Fighter};

#[derive(Debug, Clone, PartialEq)]
pub enum StrikeOutcome {
    /// Not striking, out of range, or no box overlap
    NoContact,
    /// Defender ducked under the strike
    Dodged,
    Hit(HitEvent),
}

/// Resolve `attacker`'s current strike against `defender` for this tick
pub fn resolve_strike<R: Rng>(
    attacker: &Fighter,
    defender: &Fighter,
    tuning: &CombatTuning,
    rng: &mut R,
    tick: Tick,
) -> StrikeOutcome {
    let kind = attacker.action.kind;
    if !kind.is_attack() || attacker.action.phase != Some(ActionPhase::Active) || attacker.connected {
        return StrikeOutcome::NoContact;
    }
    if attacker.is_knocked_out() || defender.is_knocked_out() {
        return StrikeOutcome::NoContact;
    }
    let Some(profile) = kind.profile() else {
        return StrikeOutcome::NoContact;
    };
    let Some(shape) = profile.hitbox else {
        return StrikeOutcome::NoContact;
    };

    let separation = attacker.position.distance(&defender.position);
    if separation > profile.max_range {
        return StrikeOutcome::NoContact;
    }

    let strike = shape.place(attacker.position, attacker.facing);
    let stance = Stance::upright_for(defender.action.kind, defender.action.phase);
    let Some(zone) = first_zone_hit(&strike, stance.hurtboxes(), defender.position, defender.facing) else {
        return StrikeOutcome::NoContact;
    };

    let mut base = profile.base_damage as f32;
    if attacker.stamina < tuning.exhaustion_threshold {
        base *= tuning.exhaustion_damage_factor;
    }
    let mut event = HitEvent {
        tick,
        attacker: attacker.id,
        defender: defender.id,
        action: kind,
        damage: 0,
        was_blocked: false,
        was_countered: false,
        is_critical: false,
        zone,
        combo_count: 0,
        combo_name: None,
        staggered: false,
        knocked_out: false,
    };

    if defender.action.is(ActionKind::Block, ActionPhase::Active) {
        event.was_blocked = true;
        event.damage = ((base * tuning.block_damage_factor).round() as u32).max(1);
        return StrikeOutcome::Hit(event);
    }

    if defender.action.is(ActionKind::Dodge, ActionPhase::Active) {
        let crouched = first_zone_hit(
            &strike,
            Stance::Crouching.hurtboxes(),
            defender.position,
            defender.facing,
        );
        if crouched.is_none() {
            return StrikeOutcome::Dodged;
        }
    }

    event.was_countered = defender.action.phase == Some(ActionPhase::Windup);

    let crit_chance = (tuning.base_crit_chance + profile.crit_bonus).clamp(0.0, 1.0);
    event.is_critical = rng.gen::<f32>() < crit_chance;

    event.combo_count = attacker.combo.next_count(tick, tuning.combo_gap_ticks);

    let mut damage = base * combo_multiplier(event.combo_count, tuning);
    if event.was_countered {
        damage *= tuning.counter_multiplier;
    }
    if event.is_critical {
        damage *= tuning.crit_multiplier;
    }
    event.damage = (damage.round() as u32).max(1);

    StrikeOutcome::Hit(event)
}
