//! Model of the external job registry: owners group repository sources and the jobs that were
//! created for the heads (branches, pull requests) of those sources.
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use secrecy::SecretString;
use url::Url;

use crate::github::{GithubRepoName, PullRequestNumber};
use crate::trigger::event::EventKind;
use crate::trigger::rule::{Trigger, TriggerRule};
use crate::trigger::ElevatedContext;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(pub String);

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full name of a job, unique within the registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A GitHub repository that jobs are created from, together with the API endpoint and the
/// credentials used to talk to it.
#[derive(Debug)]
pub struct RepositorySource {
    pub id: SourceId,
    pub repository: GithubRepoName,
    pub api_url: Url,
    pub token: Option<SecretString>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// A single project whose jobs may come from any of its sources.
    MultiBranch,
    /// An umbrella grouping several repositories; every job belongs to exactly one source.
    Organization,
}

/// Head of a source that a job builds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobHead {
    Branch(String),
    PullRequest(PullRequestNumber),
}

#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    /// Source that created this job.
    pub source: SourceId,
    pub head: JobHead,
    pub triggers: Vec<TriggerRule>,
}

impl Job {
    pub fn tracked_pull_request(&self) -> Option<PullRequestNumber> {
        match self.head {
            JobHead::PullRequest(number) => Some(number),
            JobHead::Branch(_) => None,
        }
    }

    /// Returns the first trigger rule of the given kind. Further rules of the same kind are
    /// never consulted.
    pub fn configured_rule(&self, kind: EventKind) -> Option<&TriggerRule> {
        self.triggers.iter().find(|rule| rule.kind() == kind)
    }
}

#[derive(Debug)]
pub struct SourceOwner {
    pub name: String,
    pub kind: OwnerKind,
    pub sources: Vec<Arc<RepositorySource>>,
    pub jobs: Vec<Arc<Job>>,
}

impl SourceOwner {
    pub fn source(&self, id: &SourceId) -> Option<&Arc<RepositorySource>> {
        self.sources.iter().find(|source| &source.id == id)
    }
}

/// A job matched for an event, together with the source it originates from.
#[derive(Clone, Debug)]
pub struct JobHandle {
    job: Arc<Job>,
    source: Arc<RepositorySource>,
}

impl JobHandle {
    pub fn new(job: Arc<Job>, source: Arc<RepositorySource>) -> Self {
        Self { job, source }
    }

    pub fn id(&self) -> &JobId {
        &self.job.id
    }

    pub fn source(&self) -> &RepositorySource {
        &self.source
    }

    pub fn configured_rule(&self, kind: EventKind) -> Option<&TriggerRule> {
        self.job.configured_rule(kind)
    }
}

/// Gives access to all owners known to the installation.
pub trait JobRegistry: Send + Sync {
    /// Returns a snapshot of the owners, in registry order.
    fn owners(&self, ctx: &ElevatedContext) -> Arc<[SourceOwner]>;
}

/// Registry with a fixed set of owners, loaded from the configuration file.
pub struct ConfigJobRegistry {
    owners: Arc<[SourceOwner]>,
}

impl ConfigJobRegistry {
    pub fn new(owners: Vec<SourceOwner>) -> Self {
        Self {
            owners: owners.into(),
        }
    }
}

impl JobRegistry for ConfigJobRegistry {
    fn owners(&self, _ctx: &ElevatedContext) -> Arc<[SourceOwner]> {
        Arc::clone(&self.owners)
    }
}
