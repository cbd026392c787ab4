//! Configuration of the trigger bot, loaded from a TOML file.
//!
//! The file declares where builds are scheduled, how permissions are looked up and the
//! registry of owners, their repository sources and the jobs (with trigger rules) created
//! for those sources.
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::github::{GithubRepoName, PullRequestNumber};
use crate::permissions::MinimumPermission;
use crate::trigger::dispatch::DEFAULT_AUTHORIZATION_CONCURRENCY;
use crate::trigger::registry::{Job, JobHead, JobId, OwnerKind, SourceId};
use crate::trigger::rule::{
    CommentTrigger, LabelTrigger, ReviewTrigger, TriggerPattern, TriggerRule, UpdateTrigger,
    DEFAULT_COMMENT_PATTERN,
};
use crate::trigger::{ConfigJobRegistry, RepositorySource, SourceOwner};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path:?}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid repository of source `{source_id}`: {message}")]
    InvalidRepository { source_id: String, message: String },
    #[error("Environment variable `{variable}` with the token of source `{source_id}` is not set")]
    MissingToken { source_id: String, variable: String },
    #[error("Owner `{owner}` declares source `{source_id}` more than once")]
    DuplicateSource { owner: String, source_id: String },
    #[error("Job `{job}` refers to unknown source `{source_id}`")]
    UnknownSource { job: String, source_id: String },
    #[error("Job `{job}` must track either a pull request or a branch")]
    InvalidHead { job: String },
    #[error("Invalid pattern `{pattern}` of job `{job}`")]
    InvalidPattern {
        job: String,
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub owners: Vec<OwnerConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Endpoint of the build server that receives build requests.
    pub url: Url,
}

#[derive(Debug, Deserialize)]
pub struct PermissionsConfig {
    /// How long to wait for a permission lookup.
    #[serde(default = "default_permission_timeout")]
    pub timeout_secs: u64,
    /// API root used by sources that do not configure their own.
    #[serde(default = "default_api_url")]
    pub api_url: Url,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_permission_timeout(),
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_authorization_concurrency")]
    pub authorization_concurrency: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            authorization_concurrency: default_authorization_concurrency(),
        }
    }
}

fn default_permission_timeout() -> u64 {
    10
}

fn default_api_url() -> Url {
    Url::parse("https://api.github.com").expect("Default API URL is valid")
}

fn default_authorization_concurrency() -> usize {
    DEFAULT_AUTHORIZATION_CONCURRENCY
}

fn default_owner_kind() -> OwnerKind {
    OwnerKind::MultiBranch
}

#[derive(Debug, Deserialize)]
pub struct OwnerConfig {
    pub name: String,
    #[serde(default = "default_owner_kind")]
    pub kind: OwnerKind,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    /// `owner/name`
    pub repository: String,
    pub api_url: Option<Url>,
    /// Name of the environment variable that holds the API token.
    pub token_env: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub name: String,
    /// Source that created the job. Defaults to the first source of the owner.
    pub source: Option<String>,
    pub pull_request: Option<u64>,
    pub branch: Option<String>,
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TriggerConfig {
    Comment {
        #[serde(default)]
        comment_body: Option<String>,
        #[serde(default)]
        add_reaction: bool,
        #[serde(default)]
        minimum_permissions: Option<MinimumPermission>,
        #[serde(default)]
        allow_untrusted: bool,
    },
    Label {
        label: String,
        #[serde(default)]
        minimum_permissions: Option<MinimumPermission>,
        #[serde(default)]
        allow_untrusted: bool,
    },
    Review {
        #[serde(default)]
        minimum_permissions: Option<MinimumPermission>,
        #[serde(default)]
        allow_untrusted: bool,
    },
    Update {
        #[serde(default)]
        minimum_permissions: Option<MinimumPermission>,
        #[serde(default)]
        allow_untrusted: bool,
    },
}

/// An explicit threshold wins over the deprecated `allow_untrusted` toggle.
fn threshold(minimum: Option<MinimumPermission>, allow_untrusted: bool) -> MinimumPermission {
    minimum.unwrap_or_else(|| MinimumPermission::from_legacy(allow_untrusted))
}

impl FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(text)?)
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    pub fn permission_timeout(&self) -> Duration {
        Duration::from_secs(self.permissions.timeout_secs)
    }

    /// Builds the job registry, reading source tokens from the process environment.
    pub fn build_registry(&self) -> Result<ConfigJobRegistry, ConfigError> {
        self.build_registry_with(|variable| std::env::var(variable).ok())
    }

    pub fn build_registry_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ConfigJobRegistry, ConfigError> {
        let owners = self
            .owners
            .iter()
            .map(|owner| self.build_owner(owner, &env))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConfigJobRegistry::new(owners))
    }

    fn build_owner(
        &self,
        owner: &OwnerConfig,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<SourceOwner, ConfigError> {
        let mut sources: Vec<Arc<RepositorySource>> = Vec::with_capacity(owner.sources.len());
        for source in &owner.sources {
            if sources.iter().any(|existing| existing.id.0 == source.id) {
                return Err(ConfigError::DuplicateSource {
                    owner: owner.name.clone(),
                    source_id: source.id.clone(),
                });
            }
            sources.push(Arc::new(self.build_source(source, env)?));
        }

        let jobs = owner
            .jobs
            .iter()
            .map(|job| build_job(owner, &sources, job).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SourceOwner {
            name: owner.name.clone(),
            kind: owner.kind,
            sources,
            jobs,
        })
    }

    fn build_source(
        &self,
        source: &SourceConfig,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<RepositorySource, ConfigError> {
        let repository = GithubRepoName::from_str(&source.repository).map_err(|message| {
            ConfigError::InvalidRepository {
                source_id: source.id.clone(),
                message,
            }
        })?;
        let token = match &source.token_env {
            Some(variable) => {
                let token = env(variable).ok_or_else(|| ConfigError::MissingToken {
                    source_id: source.id.clone(),
                    variable: variable.clone(),
                })?;
                Some(SecretString::new(token))
            }
            None => {
                tracing::warn!(
                    "Source {} has no token, permissions on {repository} cannot be checked",
                    source.id
                );
                None
            }
        };
        Ok(RepositorySource {
            id: SourceId(source.id.clone()),
            repository,
            api_url: source
                .api_url
                .clone()
                .unwrap_or_else(|| self.permissions.api_url.clone()),
            token,
        })
    }
}

fn build_job(
    owner: &OwnerConfig,
    sources: &[Arc<RepositorySource>],
    job: &JobConfig,
) -> Result<Job, ConfigError> {
    let id = format!("{}/{}", owner.name, job.name);
    let source = match &job.source {
        Some(source_id) => sources.iter().find(|source| &source.id.0 == source_id),
        None => sources.first(),
    }
    .ok_or_else(|| ConfigError::UnknownSource {
        job: id.clone(),
        source_id: job.source.clone().unwrap_or_default(),
    })?;

    let head = match (job.pull_request, &job.branch) {
        (Some(number), None) => JobHead::PullRequest(PullRequestNumber(number)),
        (None, Some(branch)) => JobHead::Branch(branch.clone()),
        _ => return Err(ConfigError::InvalidHead { job: id }),
    };

    let triggers = job
        .triggers
        .iter()
        .map(|trigger| build_trigger(&id, trigger))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Job {
        id: JobId(id),
        source: source.id.clone(),
        head,
        triggers,
    })
}

fn build_trigger(job: &str, trigger: &TriggerConfig) -> Result<TriggerRule, ConfigError> {
    let pattern = |pattern: &str| {
        TriggerPattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            job: job.to_string(),
            pattern: pattern.to_string(),
            source,
        })
    };

    let rule = match trigger {
        TriggerConfig::Comment {
            comment_body,
            add_reaction,
            minimum_permissions,
            allow_untrusted,
        } => {
            let body = comment_body
                .as_deref()
                .filter(|body| !body.is_empty())
                .unwrap_or(DEFAULT_COMMENT_PATTERN);
            TriggerRule::Comment(CommentTrigger {
                pattern: pattern(body)?,
                add_reaction: *add_reaction,
                minimum_permission: threshold(*minimum_permissions, *allow_untrusted),
            })
        }
        TriggerConfig::Label {
            label,
            minimum_permissions,
            allow_untrusted,
        } => TriggerRule::Label(LabelTrigger {
            pattern: pattern(label)?,
            minimum_permission: threshold(*minimum_permissions, *allow_untrusted),
        }),
        TriggerConfig::Review {
            minimum_permissions,
            allow_untrusted,
        } => TriggerRule::Review(ReviewTrigger {
            minimum_permission: threshold(*minimum_permissions, *allow_untrusted),
        }),
        TriggerConfig::Update {
            minimum_permissions,
            allow_untrusted,
        } => TriggerRule::Update(UpdateTrigger {
            minimum_permission: threshold(*minimum_permissions, *allow_untrusted),
        }),
    };
    Ok(rule)
}
