//! Combat integration tests
//!
//! Drives fighters tick by tick through the public API: advance, commit,
//! resolve. Positions are pinned where a test needs a fixed distance.

use std::sync::Arc;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use syntax_brawlers::ai::Personality;
use syntax_brawlers::combat::resolution::{commit_action, pair_mut};
use syntax_brawlers::combat::hitbox::first_zone_hit;
use syntax_brawlers::combat::{resolve_exchange, resolve_strike, CombatEvent, HitEvent, Stance, StrikeOutcome};
use syntax_brawlers::core::error::BrawlError;
use syntax_brawlers::core::{FighterId, GameConfig, Tick};
use syntax_brawlers::fighter::{ActionKind, ActionPhase, ActionState, Fighter, CHOOSABLE_MOVES};

fn pair(config: &GameConfig) -> [Fighter; 2] {
    let profile = Arc::new(Personality::default());
    let mut fighters = [
        Fighter::new(FighterId::RED, "Red", profile.clone(), config),
        Fighter::new(FighterId::BLUE, "Blue", profile, config),
    ];
    // 80 apart: inside every punch's reach
    fighters[0].position.x = 400.0;
    fighters[1].position.x = 480.0;
    fighters
}

fn no_crits() -> GameConfig {
    let mut config = GameConfig::default().with_seed(7);
    config.combat.base_crit_chance = 0.0;
    config
}

fn advance_both(fighters: &mut [Fighter; 2], config: &GameConfig, tick: Tick) {
    for fighter in fighters.iter_mut() {
        fighter.advance(&config.timing, &config.combat, tick);
    }
}

fn hits(events: &[CombatEvent]) -> Vec<HitEvent> {
    events.iter().filter_map(|e| e.as_hit().cloned()).collect()
}

#[test]
fn test_blocked_jab_costs_defender_stamina_only() {
    let config = no_crits();
    let mut fighters = pair(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    fighters[0].begin_action(ActionKind::Jab, 0).unwrap();
    fighters[1].begin_action(ActionKind::Block, 0).unwrap();

    let mut found = None;
    for tick in 1..=12 {
        advance_both(&mut fighters, &config, tick);
        let before = (fighters[0].stamina, fighters[1].stamina);
        let events = resolve_exchange(&mut fighters, &config, &mut rng, tick);
        if let Some(hit) = hits(&events).into_iter().next() {
            found = Some((hit, before));
            break;
        }
    }

    let (hit, (red_before, blue_before)) = found.expect("jab should reach the guard");
    assert!(hit.was_blocked);
    // round(10 * 0.3)
    assert_eq!(hit.damage, 3);
    assert_eq!(hit.combo_count, 0);
    assert!(!hit.staggered);
    assert_eq!(fighters[1].health, 97);
    assert_eq!(fighters[0].stamina, red_before);
    assert_eq!(fighters[1].stamina, blue_before - config.combat.block_stamina_cost);
}

#[test]
fn test_dodge_slips_a_straight_punch() {
    let config = no_crits();
    let mut fighters = pair(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    fighters[0].begin_action(ActionKind::Cross, 0).unwrap();
    fighters[1].begin_action(ActionKind::Dodge, 0).unwrap();
    // begin_action does not apply the dodge step-back
    let mut dodged = 0;
    for tick in 1..=16 {
        advance_both(&mut fighters, &config, tick);
        let events = resolve_exchange(&mut fighters, &config, &mut rng, tick);
        assert!(hits(&events).is_empty(), "no hit may land through a dodge");
        dodged += events
            .iter()
            .filter(|e| matches!(e, CombatEvent::Dodged { .. }))
            .count();
    }

    assert_eq!(dodged, 1);
    assert_eq!(fighters[1].health, fighters[1].max_health);
    assert_eq!(fighters[1].stats.dodges_successful, 1);
}

#[test]
fn test_consecutive_hits_scale_up_to_cap() {
    let config = no_crits();
    let mut fighters = pair(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut damages = Vec::new();
    let mut tick = 0;
    while damages.len() < 7 && tick < 500 {
        tick += 1;
        advance_both(&mut fighters, &config, tick);
        if fighters[0].is_ready() {
            fighters[0].begin_action(ActionKind::Jab, tick).unwrap();
        }
        fighters[0].position.x = 400.0;
        fighters[1].position.x = 480.0;
        for hit in hits(&resolve_exchange(&mut fighters, &config, &mut rng, tick)) {
            assert_eq!(hit.attacker, FighterId::RED);
            damages.push(hit.damage);
        }
    }

    assert_eq!(damages, vec![10, 11, 12, 13, 14, 15, 15]);
    assert!(damages.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(fighters[0].stats.max_combo, 7);
}

#[test]
fn test_ko_at_exactly_zero_spares_the_survivor() {
    let config = no_crits();
    let mut fighters = pair(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    fighters[0].health = 10;
    fighters[1].health = 10;

    fighters[0].begin_action(ActionKind::Jab, 0).unwrap();
    fighters[1].begin_action(ActionKind::Jab, 0).unwrap();

    let mut ko_events = Vec::new();
    for tick in 1..=12 {
        advance_both(&mut fighters, &config, tick);
        for hit in hits(&resolve_exchange(&mut fighters, &config, &mut rng, tick)) {
            ko_events.push(hit);
        }
        if fighters.iter().any(Fighter::is_knocked_out) {
            break;
        }
    }

    assert_eq!(ko_events.len(), 1, "the knocked out fighter's jab never lands");
    let ko = &ko_events[0];
    assert!(ko.knocked_out);
    let loser = &fighters[ko.defender.index()];
    let winner = &fighters[ko.attacker.index()];
    assert_eq!(loser.health, 0);
    assert_eq!(loser.action.kind, ActionKind::KnockedOut);
    assert_eq!(winner.health, 10);
}

#[test]
fn test_recovery_blocks_new_actions() {
    let config = no_crits();
    let mut fighters = pair(&config);
    fighters[1].position.x = 900.0;

    fighters[0].begin_action(ActionKind::Jab, 0).unwrap();
    let mut tick = 0;
    while fighters[0].action.phase != Some(ActionPhase::Recovery) {
        tick += 1;
        fighters[0].advance(&config.timing, &config.combat, tick);
    }

    assert!(!fighters[0].can_begin(ActionKind::Block));
    let err = fighters[0].begin_action(ActionKind::Block, tick).unwrap_err();
    assert!(matches!(err, BrawlError::InvalidAction { .. }));
}

#[test]
fn test_whiffed_jab_out_of_range() {
    let config = no_crits();
    let mut fighters = pair(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    fighters[1].position.x = 700.0;

    let (red, blue) = pair_mut(&mut fighters, 0);
    commit_action(red, blue, ActionKind::Jab, &config.ring, 0).unwrap();
    assert_eq!(fighters[0].position.x, 460.0);

    for tick in 1..=12 {
        advance_both(&mut fighters, &config, tick);
        assert!(hits(&resolve_exchange(&mut fighters, &config, &mut rng, tick)).is_empty());
    }
    assert_eq!(fighters[0].stats.punches_thrown, 1);
    assert_eq!(fighters[0].stats.punches_landed, 0);
}

proptest! {
    #[test]
    fn proptest_health_and_stamina_stay_bounded(
        seed in any::<u64>(),
        gap in 30.0f32..400.0,
        choices in prop::collection::vec((0usize..8, 0usize..8), 50..250),
    ) {
        let config = GameConfig::default().with_seed(seed);
        let mut fighters = pair(&config);
        fighters[1].position.x = fighters[0].position.x + gap;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for (i, (red_choice, blue_choice)) in choices.iter().enumerate() {
            let tick = i as Tick + 1;
            advance_both(&mut fighters, &config, tick);

            for (idx, choice) in [(0, *red_choice), (1, *blue_choice)] {
                // Index 7 means "do nothing this tick"
                if choice < CHOOSABLE_MOVES.len() && fighters[idx].is_ready() {
                    let (me, other) = pair_mut(&mut fighters, idx);
                    let _ = commit_action(me, other, CHOOSABLE_MOVES[choice], &config.ring, tick);
                }
            }
            resolve_exchange(&mut fighters, &config, &mut rng, tick);

            for f in &fighters {
                prop_assert!(f.health <= f.max_health);
                prop_assert!(f.stamina >= 0.0 && f.stamina <= f.max_stamina);
                prop_assert!(f.position.x >= config.ring.left_rope);
                prop_assert!(f.position.x <= config.ring.right_rope);
                prop_assert_eq!(f.health == 0, f.is_knocked_out());
            }
        }
    }

    #[test]
    fn proptest_overlapping_strike_always_makes_contact(
        attack in 0usize..4,
        gap in 0.0f32..160.0,
        defender_move in 0usize..8,
        defender_phase in 0usize..3,
        seed in any::<u64>(),
    ) {
        let config = no_crits();
        let mut fighters = pair(&config);
        fighters[1].position.x = fighters[0].position.x + gap;
        let blue_x = fighters[1].position.x;
        let red_x = fighters[0].position.x;
        fighters[0].face(blue_x);
        fighters[1].face(red_x);

        fighters[0].action = ActionState {
            kind: CHOOSABLE_MOVES[attack],
            phase: Some(ActionPhase::Active),
            elapsed: 0,
            remaining: 2,
        };
        // Index 7 leaves the defender idle
        if defender_move < CHOOSABLE_MOVES.len() {
            let phase = [ActionPhase::Windup, ActionPhase::Active, ActionPhase::Recovery][defender_phase];
            fighters[1].action = ActionState {
                kind: CHOOSABLE_MOVES[defender_move],
                phase: Some(phase),
                elapsed: 0,
                remaining: 3,
            };
        }

        let (red, blue) = (&fighters[0], &fighters[1]);
        let shape = red.action.kind.profile().and_then(|p| p.hitbox).unwrap();
        let strike = shape.place(red.position, red.facing);
        let stance = Stance::upright_for(blue.action.kind, blue.action.phase);
        let overlap = first_zone_hit(&strike, stance.hurtboxes(), blue.position, blue.facing);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = resolve_strike(red, blue, &config.combat, &mut rng, 1);
        if overlap.is_some() {
            prop_assert_ne!(outcome, StrikeOutcome::NoContact);
        } else {
            prop_assert_eq!(outcome, StrikeOutcome::NoContact);
        }
    }
}
