//! Full-match integration tests
//!
//! Local tactics only. Every match here is seeded so results are repeatable.

use syntax_brawlers::ai::personality::PRESET_NAMES;
use syntax_brawlers::arena::{Corner, MatchController, MatchOutcome, RoundEndReason, RoundPhase};
use syntax_brawlers::core::error::BrawlError;
use syntax_brawlers::core::{FighterId, GameConfig};

fn fast_config(seed: u64) -> GameConfig {
    let mut config = GameConfig::default().with_seed(seed);
    config.timing.pre_round_ticks = 1;
    config.timing.round_end_ticks = 1;
    config.timing.round_duration_secs = 30;
    config.rules.max_rounds = Some(3);
    config
}

fn local_match(config: GameConfig, red: &str, blue: &str) -> MatchController {
    let corners = [
        Corner::from_personality(red).unwrap(),
        Corner::from_personality(blue).unwrap(),
    ];
    MatchController::new(config, corners, None).unwrap()
}

#[test]
fn test_full_match_produces_serializable_result() {
    let mut m = local_match(fast_config(2024), "destroyer", "tactician");
    let outcome = m.run_to_completion(50_000).expect("match should finish");

    let snapshot = m.snapshot();
    assert!(snapshot.is_finished());
    assert_eq!(snapshot.outcome, Some(outcome));
    let rounds = m.scorecard().rounds_played();
    assert!((1..=3).contains(&rounds));
    assert_eq!(m.scorecard().results.len() as u32, rounds);

    if let MatchOutcome::Winner(id) = outcome {
        let wins = m.scorecard().wins(id);
        let other = m.scorecard().wins(id.opponent());
        assert!(wins > other);
    }

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["phase"], "match_end");
    assert_eq!(json["fighters"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_single_round_match() {
    let mut config = fast_config(9);
    config.rules.rounds_to_win = 1;
    config.rules.max_rounds = Some(1);
    let mut m = local_match(config, "aggressive", "defensive");

    m.run_to_completion(50_000);
    assert!(m.is_finished());
    assert_eq!(m.scorecard().rounds_played(), 1);
    assert_eq!(m.round(), 1);
}

#[test]
fn test_time_expiry_is_decided_on_health() {
    let mut config = fast_config(5);
    config.timing.round_duration_secs = 1;
    config.rules.rounds_to_win = 1;
    config.rules.max_rounds = Some(1);
    let mut m = local_match(config, "ghost", "ghost");

    // Tilt the scorecard before the bell
    m.tick();
    m.fighter_mut(FighterId::BLUE).take_damage(30);
    m.run_to_completion(1_000);

    let result = &m.scorecard().results[0];
    assert_eq!(result.reason, RoundEndReason::TimeExpired);
    assert!(result.health[0] > result.health[1]);
    assert_eq!(result.winner, Some(FighterId::RED));
    assert_eq!(m.outcome(), Some(MatchOutcome::Winner(FighterId::RED)));
}

#[test]
fn test_partial_toml_config_runs() {
    let config = GameConfig::from_toml_str(
        r#"
        rng_seed = 77

        [timing]
        pre_round_ticks = 1
        round_end_ticks = 1
        round_duration_secs = 20

        [rules]
        rounds_to_win = 1
        max_rounds = 2
        "#,
    )
    .unwrap();
    let mut m = local_match(config, "balanced", "wildcard");
    assert!(m.run_to_completion(50_000).is_some());
    assert!(m.scorecard().rounds_played() <= 2);
}

#[test]
fn test_invalid_config_refuses_to_start() {
    let mut config = GameConfig::default();
    config.timing.tick_rate = 0;
    let corners = [
        Corner::from_personality("ghost").unwrap(),
        Corner::from_personality("ghost").unwrap(),
    ];
    let result = MatchController::new(config, corners, None);
    assert!(matches!(result, Err(BrawlError::Config(_))));
}

#[test]
fn test_unknown_personality_is_an_error() {
    assert!(Corner::from_personality("nobody-at-all").is_err());
}

#[test]
fn test_every_preset_can_fight() {
    for (i, red) in PRESET_NAMES.iter().enumerate() {
        let blue = PRESET_NAMES[(i + 3) % PRESET_NAMES.len()];
        let mut m = local_match(fast_config(i as u64), red, blue);
        let mut landed = 0;
        for _ in 0..1_200 {
            let snapshot = m.tick();
            landed += snapshot.events.iter().filter(|e| e.as_hit().is_some()).count();
            for view in &snapshot.fighters {
                assert!(view.health <= view.max_health);
                assert!(view.stamina >= 0.0 && view.stamina <= view.max_stamina);
            }
            if m.is_finished() {
                break;
            }
        }
        assert!(landed > 0, "{} vs {} never landed a punch", red, blue);
    }
}

#[test]
fn test_round_clock_counts_down() {
    let mut m = local_match(fast_config(1), "tactician", "ghost");
    m.tick();
    assert_eq!(m.phase(), RoundPhase::InProgress);
    let start = m.round_time_remaining();
    for _ in 0..60 {
        m.tick();
    }
    if m.phase() == RoundPhase::InProgress {
        assert!((start - m.round_time_remaining() - 1.0).abs() < 0.001);
    }
}
