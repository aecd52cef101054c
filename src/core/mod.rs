pub mod config;
pub mod error;
pub mod types;

pub use config::GameConfig;
pub use error::{BrawlError, Result};
pub use types::{Facing, FighterId, MatchId, Tick, Vec2};
