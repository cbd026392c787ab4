//! Contains definitions of common types (repository name, pull request number, repository
//! identity) needed for working with (GitHub) repositories.
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use url::Url;

pub mod api;
pub mod server;
pub mod webhook;

pub use webhook::WebhookSecret;

/// Unique identifier of a GitHub repository.
/// Owner and name are normalized to lowercase, so comparisons are case-insensitive.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct GithubRepoName {
    owner: String,
    name: String,
}

impl GithubRepoName {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_lowercase(),
            name: name.to_lowercase(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for GithubRepoName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}/{}", self.owner, self.name))
    }
}

impl std::str::FromStr for GithubRepoName {
    type Err = String;

    /// Parses `owner/name`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!("`{value}` is not in the form `owner/name`")),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Malformed repository URL `{url}`")]
pub struct MalformedRepositoryUrl {
    pub url: String,
}

/// Repository identity resolved from the URL found in a webhook payload.
///
/// The host is kept for logging only. Two identities are equal when their owner and name
/// match case-insensitively, regardless of the host.
#[derive(Debug, Clone)]
pub struct RepositoryIdentity {
    host: String,
    repo: GithubRepoName,
}

impl RepositoryIdentity {
    /// Resolves `scheme://host/owner/name[...]` into a repository identity.
    pub fn from_url(url: &str) -> Result<Self, MalformedRepositoryUrl> {
        let malformed = || MalformedRepositoryUrl {
            url: url.to_string(),
        };

        let parsed = Url::parse(url).map_err(|_| malformed())?;
        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(malformed()),
        };
        let mut segments = parsed
            .path_segments()
            .ok_or_else(malformed)?
            .filter(|segment| !segment.is_empty());
        let (Some(owner), Some(name)) = (segments.next(), segments.next()) else {
            return Err(malformed());
        };
        let name = name.strip_suffix(".git").unwrap_or(name);
        if name.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            host,
            repo: GithubRepoName::new(owner, name),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn repository(&self) -> &GithubRepoName {
        &self.repo
    }
}

impl PartialEq for RepositoryIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.repo == other.repo
    }
}

impl Eq for RepositoryIdentity {}

impl Hash for RepositoryIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.repo.hash(state);
    }
}

impl Display for RepositoryIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.repo)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PullRequestNumber(pub u64);

impl From<u64> for PullRequestNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for PullRequestNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <u64 as Display>::fmt(&self.0, f)
    }
}

/// ID of an issue comment, used to react to the comment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommentId(pub u64);

impl Display for CommentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <u64 as Display>::fmt(&self.0, f)
    }
}
