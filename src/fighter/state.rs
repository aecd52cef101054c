//! Per-fighter state and the action state machine
//!
//! `Idle -> Windup -> Active -> Recovery -> Idle` for every timed move.
//! A qualifying hit interrupts into `Staggered`, which counts down back to
//! `Idle`. `KnockedOut` is terminal for the round.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ai::personality::Personality;
use crate::combat::combo::ComboTracker;
use crate::core::config::{CombatTuning, GameConfig, RingConfig, TimingConfig};
use crate::core::error::{BrawlError, Result};
use crate::core::types::{Facing, FighterId, Tick, Vec2};
use crate::fighter::action::{ActionKind, ActionPhase, ActionProfile};
use crate::fighter::stats::FightStats;

/// Recent actions kept on the fighter; decision contexts take a prefix
pub const HISTORY_CAPACITY: usize = 8;

/// What a fighter is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    pub kind: ActionKind,
    /// `Some` only for the timed moves
    pub phase: Option<ActionPhase>,
    /// Ticks spent in the current phase (or stagger)
    pub elapsed: u32,
    /// Ticks left in the current phase (or stagger)
    pub remaining: u32,
}

impl ActionState {
    pub const IDLE: ActionState = ActionState {
        kind: ActionKind::Idle,
        phase: None,
        elapsed: 0,
        remaining: 0,
    };

    pub fn is(&self, kind: ActionKind, phase: ActionPhase) -> bool {
        self.kind == kind && self.phase == Some(phase)
    }
}

impl Default for ActionState {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Transition produced by one tick of `Fighter::advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseChange {
    None,
    Entered(ActionPhase),
    /// Active window closed without contact
    Whiffed(ActionKind),
    /// Back to Idle after recovery or stagger
    Finished(ActionKind),
}

#[derive(Debug, Clone)]
pub struct Fighter {
    pub id: FighterId,
    pub name: String,
    pub position: Vec2,
    pub facing: Facing,
    pub health: u32,
    pub stamina: f32,
    pub max_health: u32,
    pub max_stamina: f32,
    pub action: ActionState,
    /// Set once the current strike has produced a HitEvent
    pub connected: bool,
    /// Ticks before the fighter may begin anything (clinch break, hold)
    pub cooldown: u32,
    pub last_action_tick: Option<Tick>,
    pub history: VecDeque<ActionKind>,
    pub combo: ComboTracker,
    pub stats: FightStats,
    pub personality: Arc<Personality>,
}

impl Fighter {
    pub fn new(id: FighterId, name: impl Into<String>, personality: Arc<Personality>, config: &GameConfig) -> Self {
        let mut fighter = Self {
            id,
            name: name.into(),
            position: Vec2::default(),
            facing: Facing::default(),
            health: config.combat.max_health,
            stamina: config.combat.max_stamina,
            max_health: config.combat.max_health,
            max_stamina: config.combat.max_stamina,
            action: ActionState::IDLE,
            connected: false,
            cooldown: 0,
            last_action_tick: None,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            combo: ComboTracker::new(),
            stats: FightStats::default(),
            personality,
        };
        fighter.place_at_start(&config.ring);
        fighter
    }

    fn place_at_start(&mut self, ring: &RingConfig) {
        let (x, facing) = if self.id == FighterId::RED {
            (ring.red_start_x, Facing::toward(ring.red_start_x, ring.blue_start_x))
        } else {
            (ring.blue_start_x, Facing::toward(ring.blue_start_x, ring.red_start_x))
        };
        self.position = Vec2::new(x, 0.0);
        self.facing = facing;
    }

    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health.max(1) as f32
    }

    pub fn stamina_fraction(&self) -> f32 {
        self.stamina / self.max_stamina
    }

    pub fn is_knocked_out(&self) -> bool {
        self.action.kind == ActionKind::KnockedOut
    }

    /// Idle with no cooldown: ready for a new decision
    pub fn is_ready(&self) -> bool {
        self.action.kind == ActionKind::Idle && self.cooldown == 0
    }

    pub fn current_profile(&self) -> Option<&'static ActionProfile> {
        self.action.kind.profile()
    }

    /// Why `kind` cannot start right now, if it cannot
    pub fn rejection_reason(&self, kind: ActionKind) -> Option<String> {
        let Some(profile) = kind.profile() else {
            return Some(format!("{} cannot be chosen", kind));
        };
        if self.action.kind != ActionKind::Idle {
            return Some(format!("busy with {}", self.action.kind));
        }
        if self.cooldown > 0 {
            return Some(format!("cooling down for {} ticks", self.cooldown));
        }
        if self.stamina < profile.stamina_cost {
            return Some(format!(
                "needs {:.0} stamina, has {:.1}",
                profile.stamina_cost, self.stamina
            ));
        }
        None
    }

    pub fn can_begin(&self, kind: ActionKind) -> bool {
        self.rejection_reason(kind).is_none()
    }

    /// Start a timed move. Stamina is paid up front.
    pub fn begin_action(&mut self, kind: ActionKind, tick: Tick) -> Result<()> {
        if let Some(reason) = self.rejection_reason(kind) {
            return Err(BrawlError::InvalidAction {
                fighter: self.id,
                action: kind,
                reason,
            });
        }
        let Some(profile) = kind.profile() else {
            return Ok(());
        };

        self.stamina = (self.stamina - profile.stamina_cost).max(0.0);
        self.action = ActionState {
            kind,
            phase: Some(ActionPhase::Windup),
            elapsed: 0,
            remaining: profile.windup,
        };
        self.connected = false;
        self.last_action_tick = Some(tick);
        self.remember(kind);
        if kind.is_attack() {
            self.stats.record_throw();
        }
        Ok(())
    }

    /// Rest in Idle for `ticks` before asking for a new decision
    pub fn hold(&mut self, ticks: u32, tick: Tick) {
        if self.is_ready() {
            self.cooldown = ticks;
            self.last_action_tick = Some(tick);
            self.remember(ActionKind::Idle);
        }
    }

    fn remember(&mut self, kind: ActionKind) {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(kind);
    }

    /// Most recent actions, newest last
    pub fn recent_actions(&self, n: usize) -> Vec<ActionKind> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).copied().collect()
    }

    /// Consecutive repeats of the newest history entry
    pub fn repeat_count(&self) -> usize {
        let Some(last) = self.history.back() else {
            return 0;
        };
        self.history.iter().rev().take_while(|k| *k == last).count()
    }

    /// One tick of countdown, stamina regeneration and combo expiry
    pub fn advance(&mut self, timing: &TimingConfig, tuning: &CombatTuning, tick: Tick) -> PhaseChange {
        if self.is_knocked_out() {
            return PhaseChange::None;
        }

        let mut regen = timing.per_tick(tuning.stamina_regen_per_sec);
        if self.action.kind == ActionKind::Idle {
            regen += timing.per_tick(tuning.idle_regen_bonus_per_sec);
        }
        self.stamina = (self.stamina + regen).min(self.max_stamina);

        self.cooldown = self.cooldown.saturating_sub(1);
        self.combo.expire(tick, tuning.combo_gap_ticks);

        match self.action.kind {
            ActionKind::Idle | ActionKind::KnockedOut => PhaseChange::None,
            ActionKind::Staggered => {
                self.action.elapsed += 1;
                self.action.remaining = self.action.remaining.saturating_sub(1);
                if self.action.remaining == 0 {
                    self.action = ActionState::IDLE;
                    PhaseChange::Finished(ActionKind::Staggered)
                } else {
                    PhaseChange::None
                }
            }
            kind => self.advance_phase(kind),
        }
    }

    fn advance_phase(&mut self, kind: ActionKind) -> PhaseChange {
        let (Some(phase), Some(profile)) = (self.action.phase, kind.profile()) else {
            self.action = ActionState::IDLE;
            return PhaseChange::Finished(kind);
        };

        self.action.elapsed += 1;
        self.action.remaining = self.action.remaining.saturating_sub(1);
        if self.action.remaining > 0 {
            return PhaseChange::None;
        }

        match phase {
            ActionPhase::Windup => {
                self.enter(ActionPhase::Active, profile.active);
                PhaseChange::Entered(ActionPhase::Active)
            }
            ActionPhase::Active => {
                self.enter(ActionPhase::Recovery, profile.recovery);
                if kind.is_attack() && !self.connected {
                    self.combo.reset();
                    PhaseChange::Whiffed(kind)
                } else {
                    PhaseChange::Entered(ActionPhase::Recovery)
                }
            }
            ActionPhase::Recovery => {
                self.action = ActionState::IDLE;
                PhaseChange::Finished(kind)
            }
        }
    }

    fn enter(&mut self, phase: ActionPhase, ticks: u32) {
        self.action.phase = Some(phase);
        self.action.elapsed = 0;
        self.action.remaining = ticks.max(1);
    }

    /// Lose health, saturating at zero. Returns the damage actually applied.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.health);
        self.health -= applied;
        applied
    }

    pub fn drain_stamina(&mut self, amount: f32) {
        self.stamina = (self.stamina - amount).clamp(0.0, self.max_stamina);
    }

    /// Interrupt into Staggered. Ignored once knocked out.
    pub fn stagger(&mut self, damage: u32, tuning: &CombatTuning) -> u32 {
        if self.is_knocked_out() {
            return 0;
        }
        let raw = (damage as f32 * tuning.stagger_ticks_per_damage).round() as u32;
        let ticks = raw.clamp(tuning.stagger_min_ticks, tuning.stagger_max_ticks);
        self.action = ActionState {
            kind: ActionKind::Staggered,
            phase: None,
            elapsed: 0,
            remaining: ticks,
        };
        self.connected = false;
        ticks
    }

    pub fn knock_out(&mut self) {
        self.health = 0;
        self.action = ActionState {
            kind: ActionKind::KnockedOut,
            phase: None,
            elapsed: 0,
            remaining: 0,
        };
        self.cooldown = 0;
        self.combo.reset();
        self.stats.knockdowns += 1;
    }

    /// Cancel whatever is in progress and wait out `cooldown` ticks
    pub fn break_clinch(&mut self, cooldown: u32) {
        if self.is_knocked_out() {
            return;
        }
        self.action = ActionState::IDLE;
        self.connected = false;
        self.cooldown = cooldown;
    }

    /// Move `distance` toward `opponent_x` (negative moves away), respecting
    /// the ropes and the minimum separation
    pub fn step_toward(&mut self, distance: f32, opponent_x: f32, ring: &RingConfig) {
        let dir = Facing::toward(self.position.x, opponent_x).sign();
        let mut x = self.position.x + dir * distance;

        // Never pass through or crowd the opponent
        if (opponent_x - x) * dir < ring.min_separation {
            x = opponent_x - dir * ring.min_separation;
        }

        self.position.x = x.clamp(ring.left_rope, ring.right_rope);
        self.face(opponent_x);
    }

    /// Pushed away from an attacker standing at `attacker_x`
    pub fn knock_back(&mut self, distance: f32, attacker_x: f32, ring: &RingConfig) {
        let away = Facing::toward(attacker_x, self.position.x).sign();
        self.position.x = (self.position.x + away * distance).clamp(ring.left_rope, ring.right_rope);
    }

    pub fn face(&mut self, opponent_x: f32) {
        if (opponent_x - self.position.x).abs() > f32::EPSILON {
            self.facing = Facing::toward(self.position.x, opponent_x);
        }
    }

    /// Restore round-start defaults; statistics and personality survive
    pub fn reset_for_round(&mut self, config: &GameConfig, keep_health: bool) {
        if !keep_health {
            self.health = self.max_health;
        } else {
            // Carried-over health never opens a round at zero
            let floor = (self.max_health as f32 * 0.1).ceil() as u32;
            self.health = self.health.max(floor);
        }
        self.stamina = self.max_stamina;
        self.action = ActionState::IDLE;
        self.connected = false;
        self.cooldown = 0;
        self.last_action_tick = None;
        self.history.clear();
        self.combo.reset();
        self.place_at_start(&config.ring);
    }
}
