//! GitHub API implementations of the collaborators used while triggering builds.
use std::time::Duration;

use anyhow::Context;
use axum::async_trait;
use octocrab::models::reactions::ReactionContent;

use client::{ClientError, GithubSourceClient};
use operations::{add_comment_reaction, get_collaborator_permission, ApiError};

use crate::github::CommentId;
use crate::permissions::{PermissionLevel, PermissionOracle};
use crate::trigger::adapters::CommentReactor;
use crate::trigger::{ElevatedContext, RepositorySource};

pub mod client;
pub(crate) mod operations;

pub const DEFAULT_PERMISSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Reasons why the permission oracle could not answer.
/// They never leave the oracle, the permission is reported as [`PermissionLevel::Unknown`].
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Permission request timed out")]
    Timeout,
}

/// Looks up permissions with the collaborator permission endpoint of the source's GitHub API.
pub struct GithubPermissionOracle {
    timeout: Duration,
}

impl GithubPermissionOracle {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn lookup(
        &self,
        source: &RepositorySource,
        username: &str,
    ) -> Result<PermissionLevel, OracleError> {
        let client = GithubSourceClient::for_source(source)?;
        let permission =
            tokio::time::timeout(self.timeout, get_collaborator_permission(&client, username))
                .await
                .map_err(|_| OracleError::Timeout)??;
        Ok(permission)
    }
}

impl Default for GithubPermissionOracle {
    fn default() -> Self {
        Self::new(DEFAULT_PERMISSION_TIMEOUT)
    }
}

#[async_trait]
impl PermissionOracle for GithubPermissionOracle {
    async fn permission_of(
        &self,
        _ctx: &ElevatedContext,
        source: &RepositorySource,
        username: &str,
    ) -> PermissionLevel {
        match self.lookup(source, username).await {
            Ok(permission) => permission,
            Err(error) => {
                tracing::warn!(
                    "Cannot determine permission of {username} on {}: {error}",
                    source.repository
                );
                PermissionLevel::Unknown
            }
        }
    }
}

/// Reacts to comments through the GitHub API of the comment's source.
#[derive(Default)]
pub struct GithubReactor;

#[async_trait]
impl CommentReactor for GithubReactor {
    async fn add_reaction(
        &self,
        _ctx: &ElevatedContext,
        source: &RepositorySource,
        comment: CommentId,
    ) -> anyhow::Result<()> {
        let client = GithubSourceClient::for_source(source)?;
        add_comment_reaction(&client, comment, ReactionContent::PlusOne)
            .await
            .with_context(|| format!("Cannot react to comment {comment} in {}", source.repository))
    }
}
