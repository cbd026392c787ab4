use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;

use crate::github::{MalformedRepositoryUrl, RepositoryIdentity};
use crate::permissions::PermissionOracle;
use crate::trigger::adapters::build_cause;
use crate::trigger::cause::BuildCause;
use crate::trigger::event::{EventKind, PullRequestEvent};
use crate::trigger::matcher::find_jobs;
use crate::trigger::registry::{JobHandle, JobId, JobRegistry};
use crate::trigger::rule::{Trigger, TriggerRule};
use crate::trigger::ElevatedContext;

/// How many permission lookups may run at the same time for a single event.
pub const DEFAULT_AUTHORIZATION_CONCURRENCY: usize = 4;

/// A build that should be scheduled because of an event.
#[derive(Clone, Debug)]
pub struct TriggerDecision {
    pub job: JobHandle,
    pub rule: TriggerRule,
    pub cause: BuildCause,
}

/// Why a matched job was not triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("job has no {0} trigger configured")]
    NoMatchingRule(EventKind),
    #[error("event does not match the {0} trigger")]
    PredicateRejected(EventKind),
    #[error("actor is not allowed to trigger builds")]
    Unauthorized,
    #[error("job was already triggered by this event")]
    DuplicateSuppressed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkippedJob {
    pub job: JobId,
    pub reason: SkipReason,
}

/// Outcome of dispatching a single event.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub decisions: Vec<TriggerDecision>,
    pub skipped: Vec<SkippedJob>,
}

impl DispatchReport {
    /// Was at least one job tracking the pull request found?
    pub fn matched_any(&self) -> bool {
        !self.decisions.is_empty() || !self.skipped.is_empty()
    }

    fn skip(&mut self, job: &JobHandle, reason: SkipReason) {
        tracing::debug!("Skipping job {}: {reason}", job.id());
        self.skipped.push(SkippedJob {
            job: job.id().clone(),
            reason,
        });
    }
}

/// Errors that abort the dispatch of a whole event.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    MalformedRepositoryUrl(#[from] MalformedRepositoryUrl),
    #[error("Action `{action}` of a {kind} event cannot trigger builds")]
    IrrelevantAction { kind: EventKind, action: String },
}

/// Decides which jobs should be built because of a pull request event.
///
/// The dispatcher holds no per-event state, so it can serve concurrent deliveries.
pub struct Dispatcher {
    registry: Arc<dyn JobRegistry>,
    oracle: Arc<dyn PermissionOracle>,
    authorization_concurrency: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<dyn JobRegistry>, oracle: Arc<dyn PermissionOracle>) -> Self {
        Self {
            registry,
            oracle,
            authorization_concurrency: DEFAULT_AUTHORIZATION_CONCURRENCY,
        }
    }

    /// Limits the number of concurrent permission lookups. `1` checks jobs one by one.
    pub fn with_authorization_concurrency(mut self, concurrency: usize) -> Self {
        self.authorization_concurrency = concurrency.max(1);
        self
    }

    pub async fn dispatch(
        &self,
        ctx: &ElevatedContext,
        event: &PullRequestEvent,
    ) -> Result<DispatchReport, DispatchError> {
        let repository = RepositoryIdentity::from_url(&event.repository_url)?;
        let kind = event.kind();
        if !event.is_action_relevant() {
            return Err(DispatchError::IrrelevantAction {
                kind,
                action: event.action.clone(),
            });
        }

        let mut report = DispatchReport::default();

        // Rule lookup and predicates are cheap, so they are evaluated while enumerating jobs.
        let owners = self.registry.owners(ctx);
        let mut candidates: Vec<(JobHandle, TriggerRule)> = Vec::new();
        for job in find_jobs(&owners, &repository, event.pr_number) {
            let Some(rule) = job.configured_rule(kind).cloned() else {
                tracing::debug!(
                    "Job {} for {repository} does not have a {kind} trigger",
                    job.id()
                );
                report.skip(&job, SkipReason::NoMatchingRule(kind));
                continue;
            };
            if !rule.matches(event) {
                tracing::trace!("Event does not match the {kind} trigger of {}", job.id());
                report.skip(&job, SkipReason::PredicateRejected(kind));
                continue;
            }
            candidates.push((job, rule));
        }

        // Permission lookups go over the network. Results keep the enumeration order.
        // The futures are collected first, a lazy `map` kept inside the stream would make the
        // dispatch future unsendable.
        let checks: Vec<_> = candidates
            .iter()
            .map(|(job, rule)| rule.authorize(ctx, self.oracle.as_ref(), job, &event.actor))
            .collect();
        let authorizations: Vec<bool> = futures::stream::iter(checks)
            .buffered(self.authorization_concurrency)
        .collect()
        .await;

        let mut triggered: HashSet<JobId> = HashSet::new();
        for ((job, rule), authorized) in candidates.into_iter().zip(authorizations) {
            if !authorized {
                tracing::info!(
                    "User {} is not allowed to trigger {} through its {kind} trigger",
                    event.actor,
                    job.id()
                );
                report.skip(&job, SkipReason::Unauthorized);
                continue;
            }
            if !triggered.insert(job.id().clone()) {
                report.skip(&job, SkipReason::DuplicateSuppressed);
                continue;
            }
            let cause = build_cause(event);
            report.decisions.push(TriggerDecision { job, rule, cause });
        }

        if !report.matched_any() {
            tracing::debug!(
                "PR {kind} event on {repository}#{} did not match any job",
                event.pr_number
            );
        }
        Ok(report)
    }
}
