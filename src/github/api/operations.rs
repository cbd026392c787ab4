use octocrab::models::reactions::ReactionContent;
use thiserror::Error;

use crate::github::api::client::GithubSourceClient;
use crate::github::CommentId;
use crate::permissions::PermissionLevel;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Network error: {0}")]
    NetworkError(#[from] octocrab::Error),
}

#[derive(serde::Deserialize)]
struct CollaboratorPermission {
    permission: String,
}

/// Returns the permission of `username` on the repository.
///
/// Documentation: https://docs.github.com/en/rest/collaborators/collaborators?apiVersion=2022-11-28#get-repository-permissions-for-a-user
pub async fn get_collaborator_permission(
    repo: &GithubSourceClient,
    username: &str,
) -> Result<PermissionLevel, ApiError> {
    let url = repo.repository_url(&format!("collaborators/{username}/permission"))?;
    let response: CollaboratorPermission = repo.client().get(url.as_str(), None::<&()>).await?;
    Ok(PermissionLevel::from_github(&response.permission))
}

#[derive(serde::Serialize)]
struct ReactionRequest {
    content: ReactionContent,
}

/// Adds a reaction to an issue (or pull request) comment.
///
/// Documentation: https://docs.github.com/en/rest/reactions/reactions?apiVersion=2022-11-28#create-reaction-for-an-issue-comment
pub async fn add_comment_reaction(
    repo: &GithubSourceClient,
    comment: CommentId,
    content: ReactionContent,
) -> Result<(), ApiError> {
    let url = repo.repository_url(&format!("issues/comments/{comment}/reactions"))?;
    let _: serde_json::Value = repo
        .client()
        .post(url.as_str(), Some(&ReactionRequest { content }))
        .await?;
    Ok(())
}
