//! Event adapters translate GitHub webhook payloads into [`PullRequestEvent`]s, build the cause
//! attached to triggered builds and run follow-up actions once a build has been scheduled.
//!
//! There is one adapter per [`EventKind`](crate::trigger::EventKind).
use anyhow::Context;
use serde::Deserialize;

use crate::trigger::cause::BuildCause;
use crate::trigger::dispatch::TriggerDecision;
use crate::trigger::event::{EventPayload, PullRequestEvent, ACTION_EDITED, ACTION_LABELED};
use crate::trigger::ElevatedContext;

mod comment;
mod label;
mod review;
mod update;

pub use comment::CommentReactor;

pub const ISSUE_COMMENT_EVENT: &str = "issue_comment";
pub const PULL_REQUEST_EVENT: &str = "pull_request";
pub const PULL_REQUEST_REVIEW_EVENT: &str = "pull_request_review";

#[derive(Deserialize, Debug)]
struct RawRepository {
    html_url: String,
}

#[derive(Deserialize, Debug)]
struct RawUser {
    login: String,
}

#[derive(Deserialize, Debug)]
struct RawPullRequest {
    number: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct RawAction {
    action: String,
}

/// Parses a webhook payload of the given GitHub event type.
///
/// Returns `Ok(None)` for events that can never trigger a build.
pub fn parse_webhook_event(
    event_type: &str,
    body: &[u8],
) -> anyhow::Result<Option<PullRequestEvent>> {
    match event_type {
        ISSUE_COMMENT_EVENT => comment::parse(body),
        PULL_REQUEST_EVENT => {
            let RawAction { action } =
                serde_json::from_slice(body).context("Cannot parse pull request action")?;
            match action.as_str() {
                ACTION_LABELED => label::parse(body),
                ACTION_EDITED => update::parse(body),
                _ => {
                    tracing::trace!("Ignoring pull request event with action {action}");
                    Ok(None)
                }
            }
        }
        PULL_REQUEST_REVIEW_EVENT => review::parse(body),
        _ => {
            tracing::trace!("Ignoring GitHub event {event_type}");
            Ok(None)
        }
    }
}

/// Builds the cause recorded on a build triggered by `event`.
pub fn build_cause(event: &PullRequestEvent) -> BuildCause {
    match &event.payload {
        EventPayload::Comment { body, url, .. } => comment::cause(event, body.as_deref(), url),
        EventPayload::Label { name, url } => label::cause(event, name, url),
        EventPayload::Review { pull_request_url } => review::cause(event, pull_request_url),
        EventPayload::Update { pull_request_url } => update::cause(event, pull_request_url),
    }
}

/// Runs the follow-up action of the adapter after the build of `decision` was scheduled.
///
/// Failures are logged and never affect other decisions.
pub async fn after_trigger(
    reactor: &dyn CommentReactor,
    ctx: &ElevatedContext,
    event: &PullRequestEvent,
    decision: &TriggerDecision,
) {
    if let EventPayload::Comment { .. } = event.payload {
        comment::after_trigger(reactor, ctx, event, decision).await;
    }
}
