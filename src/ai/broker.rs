//! Decision broker
//!
//! Bridges a slow, unreliable decision source into the fixed-timestep loop.
//! Every call is non-blocking. A request is dispatched once per idle period
//! and its ticket polled each tick; anything other than a timely, legal
//! answer is replaced by the fallback policy's choice for the same snapshot.
//!
//! At most one request per fighter is outstanding. Abandoning requests drops
//! their tickets, so a late answer has nowhere to land.
//!
//! A timeout or failure marks the source unavailable for `retry_after`.
//! Requests made inside that window are not dispatched and go straight to
//! the fallback; the first request after it tries the source again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, warn};

use crate::ai::context::DecisionContext;
use crate::ai::fallback::FallbackPolicy;
use crate::ai::personality::Personality;
use crate::core::error::{BrawlError, Result};
use crate::core::types::FighterId;
use crate::fighter::ActionKind;

/// How long a failing source is left alone unless configured otherwise
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Answer from a decision source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionReply {
    pub action: ActionKind,
    pub narrative: Option<String>,
    pub reasoning: Option<String>,
}

/// Receiving half handed back by `DecisionSource::dispatch`
pub type DecisionTicket = oneshot::Receiver<Result<DecisionReply>>;

/// Something that can answer decision requests asynchronously
pub trait DecisionSource: Send + Sync {
    fn name(&self) -> &str;

    /// Start answering `context` and return at once
    fn dispatch(&self, context: DecisionContext) -> DecisionTicket;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionStatus {
    Pending,
    Ready,
    Failed(String),
    TimedOut,
    /// Cancelled by a round reset, or no longer tracked
    Abandoned,
}

/// Where a committed decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOrigin {
    External,
    /// No source configured
    Local,
    TimedOut,
    Failed,
    Rejected,
    /// Source skipped while marked unavailable
    Unavailable,
}

impl DecisionOrigin {
    pub fn is_fallback(self) -> bool {
        self != DecisionOrigin::External
    }
}

/// A decision ready to commit. `Idle` means hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub fighter: FighterId,
    pub request: RequestId,
    pub action: ActionKind,
    pub narrative: Option<String>,
    pub reasoning: Option<String>,
    pub origin: DecisionOrigin,
}

/// One in-flight request
#[derive(Debug)]
pub struct PendingDecision {
    pub id: RequestId,
    pub fighter: FighterId,
    pub context: DecisionContext,
    pub status: DecisionStatus,
    pub result: Option<DecisionReply>,
    pub issued_at: Instant,
    pub epoch: u64,
    ticket: Option<DecisionTicket>,
}

/// Surfaced once to presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub fighter: FighterId,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerStats {
    pub requests: u64,
    pub external_decisions: u64,
    pub fallback_decisions: u64,
    pub timeouts: u64,
    pub failures: u64,
    pub rejected: u64,
    pub abandoned: u64,
    /// Requests answered locally because the source was marked unavailable
    pub unavailable: u64,
}

pub struct DecisionBroker {
    source: Option<Arc<dyn DecisionSource>>,
    timeout: Duration,
    retry_after: Duration,
    unavailable_until: Option<Instant>,
    profiles: [Arc<Personality>; 2],
    fallback: [FallbackPolicy; 2],
    pending: [Option<PendingDecision>; 2],
    next_id: u64,
    epoch: u64,
    unreachable_reported: [bool; 2],
    diagnostics: Vec<Diagnostic>,
    stats: BrokerStats,
}

impl DecisionBroker {
    pub fn new(
        source: Option<Arc<dyn DecisionSource>>,
        timeout: Duration,
        profiles: [Arc<Personality>; 2],
        seed: u64,
    ) -> Self {
        Self {
            source,
            timeout,
            retry_after: DEFAULT_RETRY_AFTER,
            unavailable_until: None,
            profiles,
            fallback: [FallbackPolicy::new(seed), FallbackPolicy::new(seed.wrapping_add(1))],
            pending: [None, None],
            next_id: 1,
            epoch: 0,
            unreachable_reported: [false; 2],
            diagnostics: Vec::new(),
            stats: BrokerStats::default(),
        }
    }

    /// Pause after a timeout or failure before the source is tried again
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Whether a request made at `now` would reach the source
    pub fn is_available(&self, now: Instant) -> bool {
        self.source.is_some() && self.unavailable_until.map_or(true, |until| now >= until)
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source.as_deref().map(|s| s.name())
    }

    pub fn stats(&self) -> &BrokerStats {
        &self.stats
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Id of the fighter's outstanding request, if any
    pub fn outstanding(&self, fighter: FighterId) -> Option<RequestId> {
        self.pending[fighter.index()].as_ref().map(|p| p.id)
    }

    pub fn pending(&self, fighter: FighterId) -> Option<&PendingDecision> {
        self.pending[fighter.index()].as_ref()
    }

    /// Ask for a decision. Returns the existing id if one is already outstanding.
    pub fn request(&mut self, fighter: FighterId, context: DecisionContext, now: Instant) -> RequestId {
        if let Some(existing) = self.outstanding(fighter) {
            return existing;
        }

        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.stats.requests += 1;

        let ticket = match &self.source {
            Some(source) if self.is_available(now) => Some(source.dispatch(context.clone())),
            _ => None,
        };
        let status = if ticket.is_some() {
            DecisionStatus::Pending
        } else {
            if self.source.is_some() {
                self.stats.unavailable += 1;
                self.report_unreachable(fighter, "provider marked unavailable after a failed request");
            }
            DecisionStatus::Ready
        };
        debug!(fighter = %fighter, request = id.0, tick = context.tick, dispatched = ticket.is_some(), "decision requested");

        self.pending[fighter.index()] = Some(PendingDecision {
            id,
            fighter,
            context,
            status,
            result: None,
            issued_at: now,
            epoch: self.epoch,
            ticket,
        });
        id
    }

    fn slot_of(&self, id: RequestId) -> Option<usize> {
        self.pending
            .iter()
            .position(|p| p.as_ref().map(|p| p.id) == Some(id))
    }

    /// Non-blocking status check; drains the ticket if an answer arrived
    pub fn poll(&mut self, id: RequestId, now: Instant) -> DecisionStatus {
        let Some(slot) = self.slot_of(id) else {
            return DecisionStatus::Abandoned;
        };
        let timeout = self.timeout;
        let mut unreachable = None;
        let mut trip = false;

        if let Some(pending) = self.pending[slot].as_mut() {
            if pending.status == DecisionStatus::Pending {
                let received = match pending.ticket.as_mut() {
                    Some(ticket) => ticket.try_recv(),
                    None => Err(TryRecvError::Closed),
                };
                match received {
                    Ok(Ok(reply)) => {
                        pending.result = Some(reply);
                        pending.status = DecisionStatus::Ready;
                        pending.ticket = None;
                        self.unavailable_until = None;
                    }
                    Ok(Err(err)) => {
                        if let BrawlError::ProviderUnreachable(reason) = &err {
                            unreachable = Some((pending.fighter, reason.clone()));
                        }
                        warn!(fighter = %pending.fighter, request = id.0, error = %err, "decision source failed");
                        pending.status = DecisionStatus::Failed(err.to_string());
                        pending.ticket = None;
                        trip = true;
                    }
                    Err(TryRecvError::Empty) => {
                        if now.saturating_duration_since(pending.issued_at) >= timeout {
                            let err = BrawlError::DecisionTimeout(timeout.as_millis() as u64);
                            warn!(fighter = %pending.fighter, request = id.0, error = %err, "decision timed out");
                            pending.status = DecisionStatus::TimedOut;
                            pending.ticket = None;
                            trip = true;
                        }
                    }
                    Err(TryRecvError::Closed) => {
                        pending.status =
                            DecisionStatus::Failed("decision source dropped the request".into());
                        pending.ticket = None;
                        trip = true;
                    }
                }
            }
        }

        if trip {
            let until = now + self.retry_after;
            if self.unavailable_until.map_or(true, |current| current < until) {
                warn!(retry_after_ms = self.retry_after.as_millis() as u64, "decision source marked unavailable");
                self.unavailable_until = Some(until);
            }
        }
        if let Some((fighter, reason)) = unreachable {
            self.report_unreachable(fighter, &reason);
        }
        self.pending[slot]
            .as_ref()
            .map(|p| p.status.clone())
            .unwrap_or(DecisionStatus::Abandoned)
    }

    fn report_unreachable(&mut self, fighter: FighterId, reason: &str) {
        let seen = &mut self.unreachable_reported[fighter.index()];
        if !*seen {
            *seen = true;
            self.diagnostics.push(Diagnostic {
                fighter,
                message: format!("decision provider unreachable, using local tactics: {}", reason),
            });
        }
    }

    /// Per-tick consumer. Returns a decision once one is available, consuming
    /// the request; `None` while the request is still pending.
    pub fn take_decision(
        &mut self,
        fighter: FighterId,
        legality: impl Fn(ActionKind) -> bool,
        now: Instant,
    ) -> Option<Decision> {
        let id = self.outstanding(fighter)?;
        let status = self.poll(id, now);
        if status == DecisionStatus::Pending {
            return None;
        }

        let pending = self.pending[fighter.index()].take()?;
        if pending.epoch != self.epoch || status == DecisionStatus::Abandoned {
            return None;
        }

        let origin = match (&status, &pending.result) {
            (DecisionStatus::Ready, Some(reply)) if reply.action.is_choosable() && legality(reply.action) => {
                self.stats.external_decisions += 1;
                return Some(Decision {
                    fighter,
                    request: id,
                    action: reply.action,
                    narrative: reply.narrative.clone(),
                    reasoning: reply.reasoning.clone(),
                    origin: DecisionOrigin::External,
                });
            }
            (DecisionStatus::Ready, Some(reply)) => {
                debug!(fighter = %fighter, action = %reply.action, "decision rejected as illegal");
                self.stats.rejected += 1;
                DecisionOrigin::Rejected
            }
            (DecisionStatus::Ready, None) if self.source.is_some() => DecisionOrigin::Unavailable,
            (DecisionStatus::Ready, None) => DecisionOrigin::Local,
            (DecisionStatus::TimedOut, _) => {
                self.stats.timeouts += 1;
                DecisionOrigin::TimedOut
            }
            _ => {
                self.stats.failures += 1;
                DecisionOrigin::Failed
            }
        };

        Some(self.fallback_decision(&pending, origin, &legality))
    }

    fn fallback_decision(
        &mut self,
        pending: &PendingDecision,
        origin: DecisionOrigin,
        legality: &impl Fn(ActionKind) -> bool,
    ) -> Decision {
        let idx = pending.fighter.index();
        let profile = Arc::clone(&self.profiles[idx]);
        let decided = self.fallback[idx].decide(&profile, &pending.context);
        self.stats.fallback_decisions += 1;

        let mut action = decided.choice.action;
        if action != ActionKind::Idle && !legality(action) {
            action = ActionKind::Idle;
        }
        Decision {
            fighter: pending.fighter,
            request: pending.id,
            action,
            narrative: decided.narrative,
            reasoning: Some(decided.choice.reasoning()),
            origin,
        }
    }

    /// Round or match reset: every outstanding request is dropped
    pub fn abandon_all(&mut self) {
        for slot in self.pending.iter_mut() {
            if let Some(mut pending) = slot.take() {
                pending.status = DecisionStatus::Abandoned;
                pending.ticket = None;
                self.stats.abandoned += 1;
                debug!(fighter = %pending.fighter, request = pending.id.0, "decision abandoned");
            }
        }
        self.epoch += 1;
    }

    /// Diagnostics raised since the last call
    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
