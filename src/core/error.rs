use thiserror::Error;

use crate::core::types::FighterId;
use crate::fighter::ActionKind;

#[derive(Error, Debug)]
pub enum BrawlError {
    #[error("Invalid action {action:?} for {fighter:?}: {reason}")]
    InvalidAction {
        fighter: FighterId,
        action: ActionKind,
        reason: String,
    },

    #[error("Decision request timed out after {0} ms")]
    DecisionTimeout(u64),

    #[error("Could not parse decision: {0}")]
    DecisionParseFailure(String),

    #[error("Decision provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl BrawlError {
    /// Errors on the decision path degrade to the fallback policy instead of propagating
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BrawlError::InvalidAction { .. }
                | BrawlError::DecisionTimeout(_)
                | BrawlError::DecisionParseFailure(_)
                | BrawlError::ProviderUnreachable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_errors_are_recoverable() {
        assert!(BrawlError::DecisionTimeout(500).is_recoverable());
        assert!(BrawlError::DecisionParseFailure("junk".into()).is_recoverable());
        assert!(BrawlError::ProviderUnreachable("401".into()).is_recoverable());
        assert!(!BrawlError::Config("bad".into()).is_recoverable());
    }

    #[test]
    fn test_invalid_action_message() {
        let err = BrawlError::InvalidAction {
            fighter: FighterId::RED,
            action: ActionKind::Hook,
            reason: "not enough stamina".into(),
        };
        assert!(err.to_string().contains("Hook"));
        assert!(err.to_string().contains("not enough stamina"));
    }
}
