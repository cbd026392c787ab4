//! Trigger rules attached to the branch configuration of a job.
//!
//! There is one rule type per event kind. A rule decides whether an event matches it
//! ([`Trigger::matches`]) and which permission the actor needs ([`Trigger::minimum_permission`]).
use std::fmt::{Debug, Formatter};

use regex::{Regex, RegexBuilder};

use crate::permissions::{MinimumPermission, PermissionOracle};
use crate::trigger::event::{EventKind, EventPayload, PullRequestEvent, ACTION_EDITED, ACTION_LABELED};
use crate::trigger::{ElevatedContext, JobHandle};

/// Comment pattern used when a comment trigger does not configure one.
pub const DEFAULT_COMMENT_PATTERN: &str = "^REBUILD$";

/// Case-insensitive regular expression where `.` also matches line breaks.
/// The whole input has to match the expression.
#[derive(Clone)]
pub struct TriggerPattern {
    source: String,
    regex: Regex,
}

impl TriggerPattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{source})$"))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl Debug for TriggerPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TriggerPattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for TriggerPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Behaviour shared by all trigger rule variants.
pub trait Trigger {
    fn kind(&self) -> EventKind;

    fn minimum_permission(&self) -> MinimumPermission;

    /// Does the event satisfy the predicate of this rule?
    fn matches(&self, event: &PullRequestEvent) -> bool;
}

/// Triggers a build when a comment on the pull request matches a pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct CommentTrigger {
    pub pattern: TriggerPattern,
    /// React to the triggering comment once the build has been scheduled.
    pub add_reaction: bool,
    pub minimum_permission: MinimumPermission,
}

impl Trigger for CommentTrigger {
    fn kind(&self) -> EventKind {
        EventKind::Comment
    }

    fn minimum_permission(&self) -> MinimumPermission {
        self.minimum_permission
    }

    fn matches(&self, event: &PullRequestEvent) -> bool {
        match &event.payload {
            // A missing body is let through.
            EventPayload::Comment { body: None, .. } => true,
            EventPayload::Comment {
                body: Some(body), ..
            } => self.pattern.is_full_match(body),
            _ => false,
        }
    }
}

/// Triggers a build when a label matching a pattern is added to the pull request.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelTrigger {
    pub pattern: TriggerPattern,
    pub minimum_permission: MinimumPermission,
}

impl Trigger for LabelTrigger {
    fn kind(&self) -> EventKind {
        EventKind::Label
    }

    fn minimum_permission(&self) -> MinimumPermission {
        self.minimum_permission
    }

    fn matches(&self, event: &PullRequestEvent) -> bool {
        match &event.payload {
            EventPayload::Label { name, .. } => {
                event.action == ACTION_LABELED && self.pattern.is_full_match(name)
            }
            _ => false,
        }
    }
}

/// Triggers a build on any review of the pull request.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewTrigger {
    pub minimum_permission: MinimumPermission,
}

impl Trigger for ReviewTrigger {
    fn kind(&self) -> EventKind {
        EventKind::Review
    }

    fn minimum_permission(&self) -> MinimumPermission {
        self.minimum_permission
    }

    fn matches(&self, event: &PullRequestEvent) -> bool {
        matches!(event.payload, EventPayload::Review { .. })
    }
}

/// Triggers a build when the pull request metadata (title, description, base) is edited.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateTrigger {
    pub minimum_permission: MinimumPermission,
}

impl Trigger for UpdateTrigger {
    fn kind(&self) -> EventKind {
        EventKind::Update
    }

    fn minimum_permission(&self) -> MinimumPermission {
        self.minimum_permission
    }

    fn matches(&self, event: &PullRequestEvent) -> bool {
        matches!(event.payload, EventPayload::Update { .. }) && event.action == ACTION_EDITED
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TriggerRule {
    Comment(CommentTrigger),
    Label(LabelTrigger),
    Review(ReviewTrigger),
    Update(UpdateTrigger),
}

impl TriggerRule {
    fn as_trigger(&self) -> &dyn Trigger {
        match self {
            TriggerRule::Comment(rule) => rule,
            TriggerRule::Label(rule) => rule,
            TriggerRule::Review(rule) => rule,
            TriggerRule::Update(rule) => rule,
        }
    }

    /// Is `username` allowed to trigger a build of `job` through this rule?
    ///
    /// Rules open to everyone do not consult the oracle at all.
    pub async fn authorize(
        &self,
        ctx: &ElevatedContext,
        oracle: &dyn PermissionOracle,
        job: &JobHandle,
        username: &str,
    ) -> bool {
        let minimum = self.minimum_permission();
        if minimum == MinimumPermission::None {
            return true;
        }
        let permission = oracle.permission_of(ctx, job.source(), username).await;
        tracing::debug!(
            "User {username} has permission `{permission}` on {}, trigger allows: {}",
            job.source().repository,
            minimum.label()
        );
        permission.satisfies(minimum)
    }
}

impl Trigger for TriggerRule {
    fn kind(&self) -> EventKind {
        self.as_trigger().kind()
    }

    fn minimum_permission(&self) -> MinimumPermission {
        self.as_trigger().minimum_permission()
    }

    fn matches(&self, event: &PullRequestEvent) -> bool {
        self.as_trigger().matches(event)
    }
}
