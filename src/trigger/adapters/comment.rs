use anyhow::Context;
use axum::async_trait;
use serde::Deserialize;

use crate::github::{CommentId, PullRequestNumber};
use crate::trigger::adapters::{RawRepository, RawUser};
use crate::trigger::cause::{BuildCause, CommentCause};
use crate::trigger::dispatch::TriggerDecision;
use crate::trigger::event::{EventPayload, PullRequestEvent, ACTION_CREATED, ACTION_EDITED};
use crate::trigger::rule::TriggerRule;
use crate::trigger::{ElevatedContext, RepositorySource};

/// Adds a "+1" reaction to a comment that triggered a build.
#[async_trait]
pub trait CommentReactor: Send + Sync {
    async fn add_reaction(
        &self,
        ctx: &ElevatedContext,
        source: &RepositorySource,
        comment: CommentId,
    ) -> anyhow::Result<()>;
}

#[derive(Deserialize, Debug)]
struct RawIssue {
    number: u64,
    html_url: String,
    /// Only present when the issue is a pull request.
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct RawComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    user: RawUser,
}

#[derive(Deserialize, Debug)]
struct IssueCommentPayload {
    action: String,
    issue: RawIssue,
    comment: RawComment,
    repository: RawRepository,
}

pub(super) fn parse(body: &[u8]) -> anyhow::Result<Option<PullRequestEvent>> {
    let payload: IssueCommentPayload =
        serde_json::from_slice(body).context("Cannot parse issue comment payload")?;
    if payload.issue.pull_request.is_none() {
        tracing::debug!(
            "Issue comment is not for a pull request, ignoring {}",
            payload.issue.html_url
        );
        return Ok(None);
    }
    if payload.action != ACTION_CREATED && payload.action != ACTION_EDITED {
        tracing::trace!(
            "Issue comment action is not created or edited ({}) for PR {}",
            payload.action,
            payload.issue.html_url
        );
        return Ok(None);
    }

    tracing::debug!(
        "Received comment on PR {} for {}",
        payload.issue.number,
        payload.repository.html_url
    );
    Ok(Some(PullRequestEvent {
        repository_url: payload.repository.html_url,
        pr_number: PullRequestNumber(payload.issue.number),
        actor: payload.comment.user.login,
        action: payload.action,
        payload: EventPayload::Comment {
            id: CommentId(payload.comment.id),
            body: payload.comment.body,
            url: payload.comment.html_url,
        },
    }))
}

pub(super) fn cause(event: &PullRequestEvent, body: Option<&str>, url: &str) -> BuildCause {
    BuildCause::Comment(CommentCause {
        comment_url: url.to_string(),
        comment_author: event.actor.clone(),
        comment_body: body.map(|body| body.to_string()),
    })
}

pub(super) async fn after_trigger(
    reactor: &dyn CommentReactor,
    ctx: &ElevatedContext,
    event: &PullRequestEvent,
    decision: &TriggerDecision,
) {
    let EventPayload::Comment { id, url, .. } = &event.payload else {
        return;
    };
    let TriggerRule::Comment(rule) = &decision.rule else {
        return;
    };
    if !rule.add_reaction {
        return;
    }
    match reactor.add_reaction(ctx, decision.job.source(), *id).await {
        Ok(()) => tracing::debug!("Added +1 reaction to comment {url}"),
        Err(error) => tracing::warn!("Cannot add reaction to comment {url}: {error:?}"),
    }
}
