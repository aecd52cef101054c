//! Applying combat outcomes to fighters
//!
//! `resolve_exchange` runs once per tick after decisions are committed. Both
//! ordered pairs are resolved sequentially; the order alternates with tick
//! parity so neither corner always strikes first. A fighter knocked out by
//! the first pair deals nothing in the second.

use rand::Rng;
use tracing::debug;

use crate::combat::collision::{resolve_strike, StrikeOutcome};
use crate::combat::events::{CombatEvent, HitEvent};
use crate::core::config::{CombatTuning, GameConfig, RingConfig};
use crate::core::error::Result;
use crate::core::types::{Facing, Tick};
use crate::fighter::{ActionKind, ActionPhase, Fighter};

/// Split the two corners into (acting, other)
pub fn pair_mut(fighters: &mut [Fighter; 2], acting: usize) -> (&mut Fighter, &mut Fighter) {
    let (left, right) = fighters.split_at_mut(1);
    if acting == 0 {
        (&mut left[0], &mut right[0])
    } else {
        (&mut right[0], &mut left[0])
    }
}

/// Begin `kind` for `fighter` and apply its step toward or away from the opponent
pub fn commit_action(
    fighter: &mut Fighter,
    opponent: &Fighter,
    kind: ActionKind,
    ring: &RingConfig,
    tick: Tick,
) -> Result<()> {
    fighter.begin_action(kind, tick)?;
    if let Some(profile) = fighter.current_profile() {
        if profile.advance != 0.0 {
            fighter.step_toward(profile.advance, opponent.position.x, ring);
        }
    }
    Ok(())
}

/// Keep both fighters looking at each other
pub fn face_each_other(fighters: &mut [Fighter; 2]) {
    let (red_x, blue_x) = (fighters[0].position.x, fighters[1].position.x);
    fighters[0].face(blue_x);
    fighters[1].face(red_x);
}

/// Resolve clinches and strikes for one tick
pub fn resolve_exchange<R: Rng>(
    fighters: &mut [Fighter; 2],
    config: &GameConfig,
    rng: &mut R,
    tick: Tick,
) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let order = if tick % 2 == 0 { [0, 1] } else { [1, 0] };

    for &idx in &order {
        if let Some(event) = resolve_clinch(fighters, idx, config, tick) {
            events.push(event);
        }
    }

    for &idx in &order {
        let (attacker, defender) = pair_mut(fighters, idx);
        if attacker.is_knocked_out() {
            continue;
        }
        match resolve_strike(attacker, defender, &config.combat, rng, tick) {
            StrikeOutcome::NoContact => {}
            StrikeOutcome::Dodged => {
                // One dodge per strike; a dodged punch breaks the run
                attacker.connected = true;
                attacker.combo.reset();
                defender.stats.record_dodge();
                debug!(tick, attacker = %attacker.id, action = %attacker.action.kind, "strike dodged");
                events.push(CombatEvent::Dodged {
                    tick,
                    attacker: attacker.id,
                    defender: defender.id,
                    action: attacker.action.kind,
                });
            }
            StrikeOutcome::Hit(mut hit) => {
                apply_hit(&mut hit, attacker, defender, &config.combat, &config.ring);
                events.push(CombatEvent::Hit(hit));
            }
        }
    }

    events
}

/// Mutate both fighters for a connected strike
pub fn apply_hit(
    hit: &mut HitEvent,
    attacker: &mut Fighter,
    defender: &mut Fighter,
    tuning: &CombatTuning,
    ring: &RingConfig,
) {
    attacker.connected = true;

    if hit.was_blocked {
        defender.drain_stamina(tuning.block_stamina_cost);
        attacker.combo.reset();
    } else {
        let combo = attacker.combo.register_hit(hit.action, hit.tick, tuning.combo_gap_ticks);
        hit.combo_count = combo.count;
        hit.combo_name = combo.named.map(|c| c.name.to_string());
        defender.combo.reset();
    }

    hit.damage = defender.take_damage(hit.damage);
    attacker
        .stats
        .record_landed(hit.damage, hit.combo_count, hit.was_countered, hit.is_critical);
    defender.stats.record_taken(hit.damage, hit.was_blocked);

    let mut push = ring.knockback_distance;
    if hit.was_blocked {
        push *= 0.3;
    } else if hit.is_critical {
        push *= 1.5;
    }
    defender.knock_back(push, attacker.position.x, ring);

    if defender.health == 0 {
        defender.knock_out();
        hit.knocked_out = true;
    } else if !hit.was_blocked && hit.damage >= tuning.stagger_min_damage {
        defender.stagger(hit.damage, tuning);
        hit.staggered = true;
    }

    debug!(
        tick = hit.tick,
        attacker = %hit.attacker,
        action = %hit.action,
        damage = hit.damage,
        blocked = hit.was_blocked,
        counter = hit.was_countered,
        crit = hit.is_critical,
        combo = hit.combo_count,
        "hit"
    );
}

/// A live clinch within reach ties both fighters up and separates them
fn resolve_clinch(fighters: &mut [Fighter; 2], idx: usize, config: &GameConfig, tick: Tick) -> Option<CombatEvent> {
    let (initiator, other) = pair_mut(fighters, idx);
    if !initiator.action.is(ActionKind::Clinch, ActionPhase::Active) || other.is_knocked_out() {
        return None;
    }
    let reach = ActionKind::Clinch.profile().map(|p| p.max_range).unwrap_or(0.0);
    if initiator.position.distance(&other.position) > reach {
        return None;
    }

    let cooldown = config.combat.clinch_cooldown_ticks;
    initiator.break_clinch(cooldown);
    other.break_clinch(cooldown);

    let ring = &config.ring;
    let mid = (initiator.position.x + other.position.x) / 2.0;
    let half = ring.clinch_break_separation / 2.0;
    let dir = Facing::toward(initiator.position.x, other.position.x).sign();
    initiator.position.x = (mid - dir * half).clamp(ring.left_rope, ring.right_rope);
    other.position.x = (mid + dir * half).clamp(ring.left_rope, ring.right_rope);

    debug!(tick, initiator = %initiator.id, "clinch");
    Some(CombatEvent::Clinch {
        tick,
        initiator: initiator.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::personality::Personality;
    use crate::core::types::FighterId;
    use crate::fighter::ActionState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn setup(gap: f32) -> ([Fighter; 2], GameConfig) {
        let mut config = GameConfig::default();
        config.combat.base_crit_chance = 0.0;
        let mut fighters = [
            Fighter::new(FighterId::RED, "Red", Arc::new(Personality::default()), &config),
            Fighter::new(FighterId::BLUE, "Blue", Arc::new(Personality::default()), &config),
        ];
        fighters[0].position.x = 500.0;
        fighters[1].position.x = 500.0 + gap;
        face_each_other(&mut fighters);
        (fighters, config)
    }

    fn active(kind: ActionKind) -> ActionState {
        ActionState {
            kind,
            phase: Some(ActionPhase::Active),
            elapsed: 0,
            remaining: 3,
        }
    }

    #[test]
    fn test_blocked_hit_costs_defender_stamina() {
        let (mut fighters, config) = setup(70.0);
        fighters[0].action = active(ActionKind::Jab);
        fighters[0].stamina = 50.0;
        fighters[1].action = active(ActionKind::Block);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let events = resolve_exchange(&mut fighters, &config, &mut rng, 0);
        let hit = events[0].as_hit().unwrap();
        assert!(hit.was_blocked);
        assert_eq!(hit.damage, 3);
        assert_eq!(fighters[1].health, 97);
        assert_eq!(fighters[1].stamina, 94.0);
        assert_eq!(fighters[0].stamina, 50.0);
        assert_eq!(fighters[1].action.kind, ActionKind::Block);
    }

    #[test]
    fn test_clean_hit_staggers() {
        let (mut fighters, config) = setup(70.0);
        fighters[0].action = active(ActionKind::Cross);
        fighters[1].action = ActionState {
            kind: ActionKind::Jab,
            phase: Some(ActionPhase::Recovery),
            elapsed: 0,
            remaining: 4,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let events = resolve_exchange(&mut fighters, &config, &mut rng, 0);
        let hit = events[0].as_hit().unwrap();
        assert!(hit.staggered);
        assert_eq!(fighters[1].action.kind, ActionKind::Staggered);
        assert_eq!(fighters[1].health, 79);
        assert!(fighters[0].connected);
    }

    #[test]
    fn test_one_hit_per_action() {
        let (mut fighters, config) = setup(70.0);
        fighters[0].action = active(ActionKind::Jab);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let first = resolve_exchange(&mut fighters, &config, &mut rng, 0);
        let second = resolve_exchange(&mut fighters, &config, &mut rng, 1);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_ko_at_exactly_zero_survivor_untouched() {
        let (mut fighters, config) = setup(70.0);
        fighters[0].action = active(ActionKind::Jab);
        fighters[1].action = active(ActionKind::Jab);
        fighters[1].health = 10;
        let red_health = fighters[0].health;
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // Even tick: red resolves first
        let events = resolve_exchange(&mut fighters, &config, &mut rng, 0);
        assert_eq!(events.len(), 1);
        assert!(events[0].as_hit().unwrap().knocked_out);
        assert_eq!(fighters[1].health, 0);
        assert!(fighters[1].is_knocked_out());
        assert_eq!(fighters[0].health, red_health);
    }

    #[test]
    fn test_clinch_separates_and_cools_down() {
        let (mut fighters, config) = setup(50.0);
        fighters[0].action = active(ActionKind::Clinch);
        fighters[1].action = ActionState {
            kind: ActionKind::Hook,
            phase: Some(ActionPhase::Windup),
            elapsed: 0,
            remaining: 5,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let events = resolve_exchange(&mut fighters, &config, &mut rng, 0);
        assert!(matches!(events[0], CombatEvent::Clinch { initiator: FighterId::RED, .. }));
        for f in &fighters {
            assert_eq!(f.action.kind, ActionKind::Idle);
            assert_eq!(f.cooldown, 45);
        }
        let gap = fighters[1].position.x - fighters[0].position.x;
        assert!((gap - 140.0).abs() < 0.001);
    }

    #[test]
    fn test_clinch_from_the_right_keeps_sides() {
        let (mut fighters, config) = setup(50.0);
        fighters[1].action = active(ActionKind::Clinch);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let events = resolve_exchange(&mut fighters, &config, &mut rng, 0);
        assert!(matches!(events[0], CombatEvent::Clinch { initiator: FighterId::BLUE, .. }));
        assert!((fighters[0].position.x - 455.0).abs() < 0.001);
        assert!((fighters[1].position.x - 595.0).abs() < 0.001);
    }

    #[test]
    fn test_commit_action_advances_toward_opponent() {
        let (mut fighters, config) = setup(300.0);
        let (red, blue) = pair_mut(&mut fighters, 0);
        commit_action(red, blue, ActionKind::Jab, &config.ring, 0).unwrap();
        assert_eq!(red.position.x, 560.0);

        let (blue, red) = pair_mut(&mut fighters, 1);
        commit_action(blue, red, ActionKind::Dodge, &config.ring, 0).unwrap();
        assert_eq!(blue.position.x, 880.0);
    }
}
