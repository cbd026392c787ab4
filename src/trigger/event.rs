use std::fmt::{Display, Formatter};

use crate::github::{CommentId, PullRequestNumber};

/// Kind of a pull request event, which also selects the trigger rule variant of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Comment,
    Label,
    Review,
    Update,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::Comment => "comment",
            EventKind::Label => "label",
            EventKind::Review => "review",
            EventKind::Update => "update",
        };
        f.write_str(name)
    }
}

pub const ACTION_CREATED: &str = "created";
pub const ACTION_EDITED: &str = "edited";
pub const ACTION_LABELED: &str = "labeled";

/// Canonical pull request event produced by an event adapter from a webhook payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PullRequestEvent {
    /// URL of the repository, as found in the payload. Resolved during dispatch.
    pub repository_url: String,
    pub pr_number: PullRequestNumber,
    /// Login of the user that caused the event.
    pub actor: String,
    pub action: String,
    pub payload: EventPayload,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    Comment {
        id: CommentId,
        /// `None` when the payload did not contain a body.
        body: Option<String>,
        url: String,
    },
    Label {
        name: String,
        url: String,
    },
    Review {
        pull_request_url: String,
    },
    Update {
        pull_request_url: String,
    },
}

impl PullRequestEvent {
    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Comment { .. } => EventKind::Comment,
            EventPayload::Label { .. } => EventKind::Label,
            EventPayload::Review { .. } => EventKind::Review,
            EventPayload::Update { .. } => EventKind::Update,
        }
    }

    /// Can this action trigger a build at all?
    /// Evaluated before any job is looked up.
    pub fn is_action_relevant(&self) -> bool {
        match self.kind() {
            EventKind::Comment => self.action == ACTION_CREATED || self.action == ACTION_EDITED,
            EventKind::Label => self.action == ACTION_LABELED,
            EventKind::Review => true,
            EventKind::Update => self.action == ACTION_EDITED,
        }
    }
}
