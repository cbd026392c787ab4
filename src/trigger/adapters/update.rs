use anyhow::Context;
use serde::Deserialize;

use crate::github::PullRequestNumber;
use crate::trigger::adapters::{RawPullRequest, RawRepository, RawUser};
use crate::trigger::cause::{BuildCause, UpdateCause};
use crate::trigger::event::{EventPayload, PullRequestEvent, ACTION_EDITED};

#[derive(Deserialize, Debug)]
struct UpdatePayload {
    action: String,
    pull_request: RawPullRequest,
    sender: RawUser,
    repository: RawRepository,
}

pub(super) fn parse(body: &[u8]) -> anyhow::Result<Option<PullRequestEvent>> {
    let payload: UpdatePayload =
        serde_json::from_slice(body).context("Cannot parse pull request update payload")?;
    if payload.action != ACTION_EDITED {
        tracing::trace!(
            "Pull request action is not edited ({}) for PR {}",
            payload.action,
            payload.pull_request.html_url
        );
        return Ok(None);
    }

    tracing::debug!(
        "Received update on PR {} for {}",
        payload.pull_request.number,
        payload.repository.html_url
    );
    Ok(Some(PullRequestEvent {
        repository_url: payload.repository.html_url,
        pr_number: PullRequestNumber(payload.pull_request.number),
        actor: payload.sender.login,
        action: payload.action,
        payload: EventPayload::Update {
            pull_request_url: payload.pull_request.html_url,
        },
    }))
}

pub(super) fn cause(event: &PullRequestEvent, pull_request_url: &str) -> BuildCause {
    BuildCause::Update(UpdateCause {
        update_author: event.actor.clone(),
        pull_request_url: pull_request_url.to_string(),
    })
}
