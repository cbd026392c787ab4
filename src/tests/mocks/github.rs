use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::anyhow;
use axum::async_trait;

use crate::github::CommentId;
use crate::permissions::{PermissionLevel, PermissionOracle};
use crate::trigger::adapters::CommentReactor;
use crate::trigger::cause::BuildCause;
use crate::trigger::registry::JobId;
use crate::trigger::scheduler::BuildScheduler;
use crate::trigger::{ElevatedContext, JobHandle, RepositorySource};

/// Oracle with a fixed permission table. Users that are not in the table have no permission.
#[derive(Default)]
pub struct MockOracle {
    users: HashMap<String, PermissionLevel>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockOracle {
    pub fn with_user(mut self, username: &str, permission: PermissionLevel) -> Self {
        self.users.insert(username.to_string(), permission);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(source id, username)` pairs in the order in which they were asked for.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PermissionOracle for MockOracle {
    async fn permission_of(
        &self,
        _ctx: &ElevatedContext,
        source: &RepositorySource,
        username: &str,
    ) -> PermissionLevel {
        self.requests
            .lock()
            .unwrap()
            .push((source.id.0.clone(), username.to_string()));
        self.users
            .get(username)
            .copied()
            .unwrap_or(PermissionLevel::None)
    }
}

#[derive(Default)]
pub struct MockScheduler {
    failing: HashSet<String>,
    scheduled: Mutex<Vec<(JobId, BuildCause)>>,
}

impl MockScheduler {
    pub fn fail_for(mut self, job: &str) -> Self {
        self.failing.insert(job.to_string());
        self
    }

    pub fn scheduled(&self) -> Vec<(JobId, BuildCause)> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn scheduled_jobs(&self) -> Vec<String> {
        self.scheduled()
            .into_iter()
            .map(|(job, _)| job.0)
            .collect()
    }
}

#[async_trait]
impl BuildScheduler for MockScheduler {
    async fn schedule(
        &self,
        _ctx: &ElevatedContext,
        job: &JobHandle,
        cause: &BuildCause,
    ) -> anyhow::Result<()> {
        if self.failing.contains(&job.id().0) {
            return Err(anyhow!("Build server is down"));
        }
        self.scheduled
            .lock()
            .unwrap()
            .push((job.id().clone(), cause.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockReactor {
    fail: bool,
    reactions: Mutex<Vec<(String, CommentId)>>,
}

impl MockReactor {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// `(source id, comment)` pairs that received a reaction.
    pub fn reactions(&self) -> Vec<(String, CommentId)> {
        self.reactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentReactor for MockReactor {
    async fn add_reaction(
        &self,
        _ctx: &ElevatedContext,
        source: &RepositorySource,
        comment: CommentId,
    ) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow!("Cannot react to comment {comment}"));
        }
        self.reactions
            .lock()
            .unwrap()
            .push((source.id.0.clone(), comment));
        Ok(())
    }
}
