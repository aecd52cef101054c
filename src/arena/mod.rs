//! Match and round orchestration

pub mod controller;
pub mod round;
pub mod snapshot;

pub use controller::{Corner, MatchController};
pub use round::{MatchOutcome, RoundEndReason, RoundPhase, RoundResult, Scorecard};
pub use snapshot::{FighterView, MatchSnapshot};
