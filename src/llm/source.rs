//! `DecisionSource` backed by the LLM client
//!
//! Each dispatch spawns a task on the given runtime handle. The task gives up
//! as soon as the broker drops the ticket.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::debug;

use crate::ai::broker::{DecisionSource, DecisionTicket};
use crate::ai::context::DecisionContext;
use crate::llm::client::LlmClient;
use crate::llm::parser::request_decision;

pub struct LlmDecisionSource {
    client: Arc<LlmClient>,
    handle: Handle,
}

impl LlmDecisionSource {
    pub fn new(client: LlmClient, handle: Handle) -> Self {
        Self {
            client: Arc::new(client),
            handle,
        }
    }
}

impl DecisionSource for LlmDecisionSource {
    fn name(&self) -> &str {
        self.client.model()
    }

    fn dispatch(&self, context: DecisionContext) -> DecisionTicket {
        let (mut tx, rx) = oneshot::channel();
        let client = Arc::clone(&self.client);

        self.handle.spawn(async move {
            let outcome = tokio::select! {
                result = request_decision(&client, &context) => Some(result),
                _ = tx.closed() => None,
            };
            match outcome {
                Some(result) => {
                    if tx.send(result).is_err() {
                        debug!(fighter = %context.fighter, "late decision discarded");
                    }
                }
                None => debug!(fighter = %context.fighter, "decision request cancelled"),
            }
        });
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::personality::Personality;
    use crate::core::config::GameConfig;
    use crate::core::error::BrawlError;
    use crate::core::types::FighterId;
    use crate::fighter::Fighter;
    use std::time::Duration;

    fn context() -> DecisionContext {
        let config = GameConfig::default();
        let profile = Arc::new(Personality::preset("balanced").unwrap());
        let red = Fighter::new(FighterId::RED, "Red", profile.clone(), &config);
        let blue = Fighter::new(FighterId::BLUE, "Blue", profile, &config);
        DecisionContext::capture(&red, &blue, 1, 180.0, 0, 5, &config.ring)
    }

    #[tokio::test]
    async fn test_unreachable_provider_reports_error() {
        let client = LlmClient::new("k".into(), "http://127.0.0.1:9/v1/chat".into(), "test-model".into())
            .with_timeout(Duration::from_millis(500));
        let source = LlmDecisionSource::new(client, Handle::current());
        assert_eq!(source.name(), "test-model");

        let result = source.dispatch(context()).await.expect("task reports back");
        assert!(matches!(result, Err(BrawlError::ProviderUnreachable(_))));
    }
}
