use anyhow::Context;
use serde::Deserialize;

use crate::github::PullRequestNumber;
use crate::trigger::adapters::{RawPullRequest, RawRepository, RawUser};
use crate::trigger::cause::{BuildCause, ReviewCause};
use crate::trigger::event::{EventPayload, PullRequestEvent};

#[derive(Deserialize, Debug)]
struct ReviewPayload {
    action: String,
    pull_request: RawPullRequest,
    sender: RawUser,
    repository: RawRepository,
}

/// Every review action is accepted.
pub(super) fn parse(body: &[u8]) -> anyhow::Result<Option<PullRequestEvent>> {
    let payload: ReviewPayload =
        serde_json::from_slice(body).context("Cannot parse pull request review payload")?;
    tracing::debug!(
        "Received review on PR {} for {}",
        payload.pull_request.number,
        payload.repository.html_url
    );
    Ok(Some(PullRequestEvent {
        repository_url: payload.repository.html_url,
        pr_number: PullRequestNumber(payload.pull_request.number),
        actor: payload.sender.login,
        action: payload.action,
        payload: EventPayload::Review {
            pull_request_url: payload.pull_request.html_url,
        },
    }))
}

pub(super) fn cause(event: &PullRequestEvent, pull_request_url: &str) -> BuildCause {
    BuildCause::Review(ReviewCause {
        review_author: event.actor.clone(),
        pull_request_url: pull_request_url.to_string(),
    })
}
