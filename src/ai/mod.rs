//! Decision making: context snapshots, the async broker, and the local fallback

pub mod broker;
pub mod context;
pub mod fallback;
pub mod personality;

pub use broker::{
    BrokerStats, Decision, DecisionBroker, DecisionOrigin, DecisionReply, DecisionSource, DecisionStatus,
    DecisionTicket, Diagnostic, RequestId,
};
pub use context::{DecisionContext, FighterSnapshot, RangeBand};
pub use fallback::{choose_fallback, FallbackChoice, FallbackPolicy};
pub use personality::{load_personality, FightingStyle, Personality};
