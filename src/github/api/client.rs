use octocrab::Octocrab;
use secrecy::ExposeSecret;
use url::Url;

use crate::github::GithubRepoName;
use crate::trigger::registry::SourceId;
use crate::trigger::RepositorySource;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No credentials configured for source `{0}`")]
    MissingCredentials(SourceId),
    #[error("Cannot create GitHub client: {0}")]
    Build(#[from] octocrab::Error),
}

/// Provides access to the repository of a single source using the GitHub API of that source.
pub struct GithubSourceClient {
    client: Octocrab,
    api_url: Url,
    repository: GithubRepoName,
}

impl GithubSourceClient {
    /// Creates a client authenticated with the token of the source.
    pub fn for_source(source: &RepositorySource) -> Result<Self, ClientError> {
        let token = source
            .token
            .as_ref()
            .ok_or_else(|| ClientError::MissingCredentials(source.id.clone()))?;
        // Routes are resolved against the API root, which may contain a path prefix
        // (e.g. `/api/v3` on GitHub Enterprise).
        let mut api_url = source.api_url.clone();
        if !api_url.path().ends_with('/') {
            api_url.set_path(&format!("{}/", api_url.path()));
        }
        // The token is only sent to the host of the base URI.
        let client = Octocrab::builder()
            .base_uri(api_url.as_str())?
            .personal_token(token.expose_secret().clone())
            .build()?;
        Ok(Self {
            client,
            api_url,
            repository: source.repository.clone(),
        })
    }

    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// Resolves a route of the repository, e.g. `issues/comments/1`.
    pub fn repository_url(&self, route: &str) -> Result<Url, url::ParseError> {
        self.api_url.join(&format!(
            "repos/{}/{}/{route}",
            self.repository.owner(),
            self.repository.name()
        ))
    }
}
