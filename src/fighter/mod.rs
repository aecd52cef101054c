//! Fighters: action catalog, per-tick state machine and fight statistics

pub mod action;
pub mod state;
pub mod stats;

pub use action::{ActionKind, ActionPhase, ActionProfile, CHOOSABLE_MOVES};
pub use state::{ActionState, Fighter, PhaseChange};
pub use stats::FightStats;
