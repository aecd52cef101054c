pub mod collision;
pub mod combo;
pub mod events;
pub mod hitbox;
pub mod resolution;

pub use collision::{resolve_strike, StrikeOutcome};
pub use combo::{ComboTracker, NamedCombo};
pub use events::{CombatEvent, HitEvent};
pub use hitbox::{HitZone, Stance};
pub use resolution::{commit_action, resolve_exchange};
