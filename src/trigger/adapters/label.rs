use anyhow::Context;
use serde::Deserialize;

use crate::github::PullRequestNumber;
use crate::trigger::adapters::{RawPullRequest, RawRepository, RawUser};
use crate::trigger::cause::{BuildCause, LabelCause};
use crate::trigger::event::{EventPayload, PullRequestEvent, ACTION_LABELED};

#[derive(Deserialize, Debug)]
struct RawLabel {
    name: String,
    url: String,
}

#[derive(Deserialize, Debug)]
struct LabelPayload {
    action: String,
    pull_request: RawPullRequest,
    label: Option<RawLabel>,
    sender: RawUser,
    repository: RawRepository,
}

pub(super) fn parse(body: &[u8]) -> anyhow::Result<Option<PullRequestEvent>> {
    let payload: LabelPayload =
        serde_json::from_slice(body).context("Cannot parse pull request label payload")?;
    if payload.action != ACTION_LABELED {
        tracing::trace!(
            "Pull request action is not labeled ({}) for PR {}",
            payload.action,
            payload.pull_request.html_url
        );
        return Ok(None);
    }
    let label = payload
        .label
        .context("Labeled pull request event without a label")?;

    tracing::debug!(
        "Received label {} on PR {} for {}",
        label.name,
        payload.pull_request.number,
        payload.repository.html_url
    );
    Ok(Some(PullRequestEvent {
        repository_url: payload.repository.html_url,
        pr_number: PullRequestNumber(payload.pull_request.number),
        actor: payload.sender.login,
        action: payload.action,
        payload: EventPayload::Label {
            name: label.name,
            url: label.url,
        },
    }))
}

pub(super) fn cause(event: &PullRequestEvent, label: &str, url: &str) -> BuildCause {
    BuildCause::Label(LabelCause {
        label_url: url.to_string(),
        labelling_author: event.actor.clone(),
        label: label.to_string(),
    })
}
