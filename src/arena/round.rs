//! Round lifecycle and scoring
//!
//! PreRound -> InProgress -> RoundEnd -> (PreRound | MatchEnd)

use serde::{Deserialize, Serialize};

use crate::core::config::MatchRules;
use crate::core::types::{FighterId, Tick};
use crate::fighter::Fighter;

/// Round phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    #[default]
    PreRound,
    InProgress,
    RoundEnd,
    MatchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    KnockOut,
    TimeExpired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    /// `None` for a drawn round
    pub winner: Option<FighterId>,
    pub reason: RoundEndReason,
    pub end_tick: Tick,
    pub health: [u32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner(FighterId),
    Draw,
}

/// Why the round must stop now, if it must
pub fn check_round_end(fighters: &[Fighter; 2], elapsed: Tick, round_ticks: Tick) -> Option<RoundEndReason> {
    if fighters.iter().any(Fighter::is_knocked_out) {
        Some(RoundEndReason::KnockOut)
    } else if elapsed >= round_ticks {
        Some(RoundEndReason::TimeExpired)
    } else {
        None
    }
}

/// Round winner: the survivor of a KO, otherwise the higher health fraction
pub fn round_winner(fighters: &[Fighter; 2]) -> Option<FighterId> {
    let [red, blue] = fighters;
    match (red.is_knocked_out(), blue.is_knocked_out()) {
        (false, true) => return Some(red.id),
        (true, false) => return Some(blue.id),
        (true, true) => return None,
        (false, false) => {}
    }

    let (r, b) = (red.health_fraction(), blue.health_fraction());
    if r > b {
        Some(red.id)
    } else if b > r {
        Some(blue.id)
    } else {
        None
    }
}

/// Rounds won and the per-round record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub wins: [u32; 2],
    pub draws: u32,
    pub results: Vec<RoundResult>,
}

impl Scorecard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: RoundResult) {
        match result.winner {
            Some(id) => self.wins[id.index()] += 1,
            None => self.draws += 1,
        }
        self.results.push(result);
    }

    pub fn rounds_played(&self) -> u32 {
        self.results.len() as u32
    }

    pub fn wins(&self, id: FighterId) -> u32 {
        self.wins[id.index()]
    }

    /// Whether the match is over after the rounds recorded so far
    pub fn match_outcome(&self, rules: &MatchRules) -> Option<MatchOutcome> {
        for id in FighterId::both() {
            if self.wins(id) >= rules.rounds_to_win {
                return Some(MatchOutcome::Winner(id));
            }
        }

        // Without a winner only the round cap ends the match
        let cap = rules.max_rounds?;
        if self.rounds_played() < cap {
            return None;
        }
        let [red, blue] = self.wins;
        Some(if red > blue {
            MatchOutcome::Winner(FighterId::RED)
        } else if blue > red {
            MatchOutcome::Winner(FighterId::BLUE)
        } else {
            MatchOutcome::Draw
        })
    }
}
