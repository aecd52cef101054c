//! Match controller
//!
//! Owns both fighters, the decision broker and the crit RNG. Each call to
//! `tick_at` runs one fixed-timestep tick:
//!
//! advance fighters -> decisions -> combat exchange -> round end check
//!
//! Nothing here blocks. A slow decision source only means a fighter stays
//! idle until its answer or the fallback arrives.

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::ai::broker::{BrokerStats, DecisionBroker, DecisionSource};
use crate::ai::context::DecisionContext;
use crate::ai::personality::{load_personality, Personality};
use crate::arena::round::{
    check_round_end, round_winner, MatchOutcome, RoundEndReason, RoundPhase, RoundResult, Scorecard,
};
use crate::arena::snapshot::{FighterView, MatchSnapshot};
use crate::combat::events::{CombatEvent, HitEvent};
use crate::combat::resolution::{commit_action, face_each_other, pair_mut, resolve_exchange};
use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{FighterId, MatchId, Tick};
use crate::fighter::{ActionKind, Fighter, PhaseChange};

/// Largest momentum swing a single hit can cause
const MAX_MOMENTUM_SHIFT: f32 = 0.2;

/// Who stands in a corner
#[derive(Debug, Clone)]
pub struct Corner {
    pub name: String,
    pub personality: Arc<Personality>,
}

impl Corner {
    pub fn new(name: impl Into<String>, personality: Personality) -> Self {
        Self {
            name: name.into(),
            personality: Arc::new(personality),
        }
    }

    /// Corner named after a personality loaded from disk or the presets
    pub fn from_personality(name: &str) -> Result<Self> {
        let personality = load_personality(name)?;
        let mut display = name.to_string();
        if let Some(first) = display.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Ok(Self::new(format!("The {}", display), personality))
    }
}

pub struct MatchController {
    pub id: MatchId,
    config: GameConfig,
    fighters: [Fighter; 2],
    broker: DecisionBroker,
    rng: ChaCha8Rng,
    phase: RoundPhase,
    round: u32,
    tick: Tick,
    /// Ticks spent in the current phase
    phase_tick: Tick,
    scorecard: Scorecard,
    momentum: f32,
    narrative: [Option<String>; 2],
    outcome: Option<MatchOutcome>,
}

impl MatchController {
    pub fn new(
        config: GameConfig,
        corners: [Corner; 2],
        source: Option<Arc<dyn DecisionSource>>,
    ) -> Result<Self> {
        config.validate()?;
        let seed = config.rng_seed.unwrap_or_else(rand::random);

        let [red, blue] = corners;
        let profiles = [Arc::clone(&red.personality), Arc::clone(&blue.personality)];
        let fighters = [
            Fighter::new(FighterId::RED, red.name, red.personality, &config),
            Fighter::new(FighterId::BLUE, blue.name, blue.personality, &config),
        ];
        let broker = DecisionBroker::new(
            source,
            config.decision.timeout(),
            profiles,
            seed.wrapping_add(0x9E37_79B9),
        )
        .with_retry_after(config.decision.retry_after());

        let id = MatchId::new();
        info!(
            match_id = %id.0,
            red = %fighters[0].name,
            blue = %fighters[1].name,
            source = broker.source_name().unwrap_or("local"),
            seed,
            "match created"
        );

        Ok(Self {
            id,
            config,
            fighters,
            broker,
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: RoundPhase::PreRound,
            round: 1,
            tick: 0,
            phase_tick: 0,
            scorecard: Scorecard::new(),
            momentum: 0.5,
            narrative: [None, None],
            outcome: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    pub fn fighter(&self, id: FighterId) -> &Fighter {
        &self.fighters[id.index()]
    }

    /// Direct access for scripted scenarios
    pub fn fighter_mut(&mut self, id: FighterId) -> &mut Fighter {
        &mut self.fighters[id.index()]
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    pub fn scorecard(&self) -> &Scorecard {
        &self.scorecard
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RoundPhase::MatchEnd
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    pub fn broker(&self) -> &DecisionBroker {
        &self.broker
    }

    pub fn decision_stats(&self) -> &BrokerStats {
        self.broker.stats()
    }

    /// Seconds left on the round clock
    pub fn round_time_remaining(&self) -> f32 {
        let timing = &self.config.timing;
        match self.phase {
            RoundPhase::PreRound => timing.round_duration_secs as f32,
            RoundPhase::InProgress => {
                let left = timing.round_ticks().saturating_sub(self.phase_tick);
                left as f32 / timing.tick_rate as f32
            }
            RoundPhase::RoundEnd | RoundPhase::MatchEnd => 0.0,
        }
    }

    /// Run one tick using the current wall clock
    pub fn tick(&mut self) -> MatchSnapshot {
        self.tick_at(Instant::now())
    }

    /// Run one tick; `now` drives decision timeouts
    pub fn tick_at(&mut self, now: Instant) -> MatchSnapshot {
        let mut events = Vec::new();

        match self.phase {
            RoundPhase::MatchEnd => return self.emit(events),
            RoundPhase::PreRound => {
                self.phase_tick += 1;
                if self.phase_tick >= self.config.timing.pre_round_ticks as Tick {
                    self.start_round();
                }
            }
            RoundPhase::InProgress => self.run_round_tick(now, &mut events),
            RoundPhase::RoundEnd => {
                self.phase_tick += 1;
                if self.phase_tick >= self.config.timing.round_end_ticks as Tick {
                    self.after_round();
                }
            }
        }

        self.tick += 1;
        self.emit(events)
    }

    /// Tick until the match ends or `max_ticks` have run
    pub fn run_to_completion(&mut self, max_ticks: Tick) -> Option<MatchOutcome> {
        for _ in 0..max_ticks {
            if self.is_finished() {
                break;
            }
            self.tick();
        }
        self.outcome.filter(|_| self.is_finished())
    }

    fn start_round(&mut self) {
        self.phase = RoundPhase::InProgress;
        self.phase_tick = 0;
        info!(round = self.round, tick = self.tick, "round started");
    }

    fn run_round_tick(&mut self, now: Instant, events: &mut Vec<CombatEvent>) {
        let tick = self.tick;

        // ===== PHASE 1: ADVANCE =====
        for fighter in self.fighters.iter_mut() {
            if let PhaseChange::Whiffed(action) =
                fighter.advance(&self.config.timing, &self.config.combat, tick)
            {
                events.push(CombatEvent::Whiffed {
                    tick,
                    fighter: fighter.id,
                    action,
                });
            }
        }

        // ===== PHASE 2: DECISIONS =====
        for id in FighterId::both() {
            self.decide(id, now);
        }

        // ===== PHASE 3: COMBAT =====
        let exchange = resolve_exchange(&mut self.fighters, &self.config, &mut self.rng, tick);
        for hit in exchange.iter().filter_map(CombatEvent::as_hit) {
            self.shift_momentum(hit);
        }
        face_each_other(&mut self.fighters);
        events.extend(exchange);

        // ===== PHASE 4: ROUND END =====
        self.phase_tick += 1;
        if let Some(reason) =
            check_round_end(&self.fighters, self.phase_tick, self.config.timing.round_ticks())
        {
            self.end_round(reason);
        }
    }

    fn decide(&mut self, id: FighterId, now: Instant) {
        let i = id.index();
        let me = &self.fighters[i];
        let opponent = &self.fighters[1 - i];
        if !me.is_ready() || me.is_knocked_out() || opponent.is_knocked_out() {
            return;
        }

        if self.broker.outstanding(id).is_none() {
            let context = DecisionContext::capture(
                me,
                opponent,
                self.round,
                self.round_time_remaining(),
                self.tick,
                self.config.decision.history_len,
                &self.config.ring,
            );
            self.broker.request(id, context, now);
        }

        let me = &self.fighters[i];
        let Some(decision) = self.broker.take_decision(id, |kind| me.can_begin(kind), now) else {
            return;
        };
        debug!(
            fighter = %id,
            action = %decision.action,
            origin = ?decision.origin,
            tick = self.tick,
            "decision applied"
        );

        if decision.narrative.is_some() {
            self.narrative[i] = decision.narrative;
        }
        if decision.action == ActionKind::Idle {
            self.fighters[i].hold(self.config.combat.idle_hold_ticks, self.tick);
            return;
        }

        let (me, opponent) = pair_mut(&mut self.fighters, i);
        match commit_action(me, opponent, decision.action, &self.config.ring, self.tick) {
            Err(err) if err.is_recoverable() => debug!(fighter = %id, error = %err, "decision rejected"),
            Err(err) => warn!(fighter = %id, error = %err, "decision could not be applied"),
            Ok(()) => {}
        }
    }

    /// 0.0 favours blue, 1.0 favours red
    fn shift_momentum(&mut self, hit: &HitEvent) {
        let shift = (hit.damage as f32 / 100.0).min(MAX_MOMENTUM_SHIFT);
        self.momentum = if hit.attacker == FighterId::RED {
            (self.momentum + shift).min(1.0)
        } else {
            (self.momentum - shift).max(0.0)
        };
    }

    fn end_round(&mut self, reason: RoundEndReason) {
        let winner = round_winner(&self.fighters);
        let result = RoundResult {
            round: self.round,
            winner,
            reason,
            end_tick: self.tick,
            health: [self.fighters[0].health, self.fighters[1].health],
        };
        info!(
            round = self.round,
            winner = winner.map(|w| w.to_string()).unwrap_or_else(|| "draw".into()),
            reason = ?reason,
            red_health = result.health[0],
            blue_health = result.health[1],
            "round over"
        );

        self.scorecard.record(result);
        self.outcome = self.scorecard.match_outcome(&self.config.rules);
        self.broker.abandon_all();
        self.phase = RoundPhase::RoundEnd;
        self.phase_tick = 0;
    }

    fn after_round(&mut self) {
        if let Some(outcome) = self.outcome {
            self.phase = RoundPhase::MatchEnd;
            info!(
                outcome = ?outcome,
                rounds = self.scorecard.rounds_played(),
                score = ?self.scorecard.wins,
                "match over"
            );
            return;
        }

        self.round += 1;
        let keep_health = !self.config.rules.reset_health_each_round;
        for fighter in self.fighters.iter_mut() {
            fighter.reset_for_round(&self.config, keep_health);
        }
        self.broker.abandon_all();
        self.momentum = 0.5;
        self.narrative = [None, None];
        self.phase = RoundPhase::PreRound;
        self.phase_tick = 0;
    }

    fn emit(&mut self, events: Vec<CombatEvent>) -> MatchSnapshot {
        let mut snapshot = self.snapshot();
        snapshot.events = events;
        snapshot.diagnostics = self.broker.drain_diagnostics();
        snapshot
    }

    /// Current state without events or diagnostics
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.id,
            tick: self.tick,
            round: self.round,
            phase: self.phase,
            round_time_remaining: self.round_time_remaining(),
            fighters: [FighterView::of(&self.fighters[0]), FighterView::of(&self.fighters[1])],
            events: Vec::new(),
            narrative: self.narrative.clone(),
            diagnostics: Vec::new(),
            score: self.scorecard.wins,
            momentum: self.momentum,
            outcome: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> GameConfig {
        let mut config = GameConfig::default().with_seed(42);
        config.timing.pre_round_ticks = 2;
        config.timing.round_end_ticks = 2;
        config.timing.round_duration_secs = 20;
        config.rules.max_rounds = Some(3);
        config
    }

    fn controller(config: GameConfig) -> MatchController {
        let corners = [
            Corner::from_personality("destroyer").unwrap(),
            Corner::from_personality("ghost").unwrap(),
        ];
        MatchController::new(config, corners, None).unwrap()
    }

    #[test]
    fn test_corner_display_name() {
        let corner = Corner::from_personality("tactician").unwrap();
        assert_eq!(corner.name, "The Tactician");
        assert_eq!(corner.personality.name, "tactician");
    }

    #[test]
    fn test_pre_round_counts_down() {
        let mut m = controller(quick_config());
        assert_eq!(m.phase(), RoundPhase::PreRound);
        m.tick();
        assert_eq!(m.phase(), RoundPhase::PreRound);
        m.tick();
        assert_eq!(m.phase(), RoundPhase::InProgress);
        assert_eq!(m.round_time_remaining(), 20.0);
    }

    #[test]
    fn test_ko_ends_round_and_scores() {
        let mut m = controller(quick_config());
        m.tick();
        m.tick();
        m.fighter_mut(FighterId::BLUE).knock_out();

        let snapshot = m.tick();
        assert_eq!(snapshot.phase, RoundPhase::RoundEnd);
        assert_eq!(m.scorecard().wins, [1, 0]);
        assert_eq!(m.scorecard().results[0].reason, RoundEndReason::KnockOut);
    }

    #[test]
    fn test_next_round_restores_fighters() {
        let mut m = controller(quick_config());
        m.tick();
        m.tick();
        m.fighter_mut(FighterId::RED).take_damage(40);
        m.fighter_mut(FighterId::BLUE).knock_out();
        m.tick();
        m.tick();
        m.tick();

        assert_eq!(m.phase(), RoundPhase::PreRound);
        assert_eq!(m.round(), 2);
        for fighter in m.fighters() {
            assert_eq!(fighter.health, fighter.max_health);
            assert_eq!(fighter.stamina, fighter.max_stamina);
            assert_eq!(fighter.action.kind, ActionKind::Idle);
        }
        assert_eq!(m.fighter(FighterId::BLUE).stats.knockdowns, 1);
    }

    #[test]
    fn test_health_carries_over_when_configured() {
        let mut config = quick_config();
        config.rules.reset_health_each_round = false;
        let mut m = controller(config);
        m.tick();
        m.tick();
        m.fighter_mut(FighterId::RED).take_damage(40);
        m.fighter_mut(FighterId::BLUE).knock_out();
        for _ in 0..3 {
            m.tick();
        }
        assert_eq!(m.fighter(FighterId::RED).health, 60);
        assert_eq!(m.fighter(FighterId::BLUE).health, 10);
    }

    #[test]
    fn test_local_match_runs_to_completion() {
        let mut m = controller(quick_config());
        let outcome = m.run_to_completion(20_000);
        assert!(outcome.is_some());
        assert!(m.is_finished());
        assert!(m.scorecard().rounds_played() <= 3);
        assert!(m.decision_stats().fallback_decisions > 0);
        assert_eq!(m.decision_stats().external_decisions, 0);

        // Finished matches stay put
        let tick = m.tick_count();
        let snapshot = m.tick();
        assert_eq!(snapshot.tick, tick);
        assert!(snapshot.is_finished());
    }

    #[test]
    fn test_same_seed_same_fight() {
        let mut a = controller(quick_config());
        let mut b = controller(quick_config());
        for _ in 0..600 {
            a.tick();
            b.tick();
        }
        let (sa, sb) = (a.snapshot(), b.snapshot());
        assert_eq!(sa.fighters, sb.fighters);
        assert_eq!(sa.score, sb.score);
        assert_eq!(sa.momentum, sb.momentum);
    }

    #[test]
    fn test_fighters_engage() {
        let mut m = controller(quick_config());
        let mut hits = 0;
        for _ in 0..900 {
            hits += m.tick().events.iter().filter(|e| e.as_hit().is_some()).count();
        }
        assert!(hits > 0, "fallback fighters should land something in 15 seconds");
    }
}
