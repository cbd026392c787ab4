use std::sync::Arc;

use derive_builder::Builder;
use secrecy::SecretString;

use crate::github::{GithubRepoName, PullRequestNumber};
use crate::permissions::MinimumPermission;
use crate::trigger::registry::{Job, JobHead, JobId, OwnerKind, SourceId};
use crate::trigger::rule::{
    CommentTrigger, LabelTrigger, ReviewTrigger, TriggerPattern, TriggerRule, UpdateTrigger,
};
use crate::trigger::{JobHandle, RepositorySource, SourceOwner};

pub fn default_source_id() -> String {
    "default".to_string()
}

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Source {
    #[builder(default = "default_source_id()", setter(into))]
    id: String,
    repository: GithubRepoName,
    #[builder(default = "\"https://api.github.com\".to_string()", setter(into))]
    api_url: String,
    #[builder(default = "Some(\"token\".to_string())")]
    token: Option<String>,
}

impl SourceBuilder {
    pub fn without_token(self) -> Self {
        self.token(None)
    }

    pub fn create(self) -> Arc<RepositorySource> {
        let Source {
            id,
            repository,
            api_url,
            token,
        } = self.build().unwrap();
        Arc::new(RepositorySource {
            id: SourceId(id),
            repository,
            api_url: api_url.parse().unwrap(),
            token: token.map(SecretString::new),
        })
    }
}

pub fn source(repository: &str) -> SourceBuilder {
    SourceBuilder::default().repository(repository.parse().unwrap())
}

pub struct JobBuilder {
    name: String,
    head: JobHead,
    source: Option<String>,
    triggers: Vec<TriggerRule>,
}

impl JobBuilder {
    pub fn pr(mut self, number: u64) -> Self {
        self.head = JobHead::PullRequest(PullRequestNumber(number));
        self
    }

    pub fn branch(mut self, name: &str) -> Self {
        self.head = JobHead::Branch(name.to_string());
        self
    }

    pub fn source(mut self, id: &str) -> Self {
        self.source = Some(id.to_string());
        self
    }

    pub fn trigger(mut self, rule: TriggerRule) -> Self {
        self.triggers.push(rule);
        self
    }

    fn build(self, default_source: &SourceId) -> Job {
        Job {
            id: JobId(self.name),
            source: self.source.map(SourceId).unwrap_or(default_source.clone()),
            head: self.head,
            triggers: self.triggers,
        }
    }

    /// Creates a handle of the job as if it was matched under `source`.
    pub fn create_handle(self, source: SourceBuilder) -> JobHandle {
        let source = source.create();
        let job = self.build(&source.id);
        JobHandle::new(Arc::new(job), source)
    }
}

pub fn job(name: &str) -> JobBuilder {
    JobBuilder {
        name: name.to_string(),
        head: JobHead::Branch("main".to_string()),
        source: None,
        triggers: vec![],
    }
}

pub struct OwnerBuilder {
    name: String,
    kind: OwnerKind,
    sources: Vec<SourceBuilder>,
    jobs: Vec<JobBuilder>,
}

impl OwnerBuilder {
    pub fn source(mut self, source: SourceBuilder) -> Self {
        self.sources.push(source);
        self
    }

    pub fn job(mut self, job: JobBuilder) -> Self {
        self.jobs.push(job);
        self
    }

    /// Jobs without an explicit source belong to the first source of the owner.
    pub fn create(self) -> SourceOwner {
        let sources: Vec<Arc<RepositorySource>> =
            self.sources.into_iter().map(|source| source.create()).collect();
        let default_source = sources
            .first()
            .map(|source| source.id.clone())
            .unwrap_or(SourceId(default_source_id()));
        let jobs = self
            .jobs
            .into_iter()
            .map(|job| Arc::new(job.build(&default_source)))
            .collect();
        SourceOwner {
            name: self.name,
            kind: self.kind,
            sources,
            jobs,
        }
    }
}

pub fn owner(name: &str, kind: OwnerKind) -> OwnerBuilder {
    OwnerBuilder {
        name: name.to_string(),
        kind,
        sources: vec![],
        jobs: vec![],
    }
}

pub fn comment_trigger(pattern: &str, minimum_permission: MinimumPermission) -> TriggerRule {
    TriggerRule::Comment(CommentTrigger {
        pattern: TriggerPattern::new(pattern).unwrap(),
        add_reaction: false,
        minimum_permission,
    })
}

pub fn reacting_comment_trigger(
    pattern: &str,
    minimum_permission: MinimumPermission,
) -> TriggerRule {
    TriggerRule::Comment(CommentTrigger {
        pattern: TriggerPattern::new(pattern).unwrap(),
        add_reaction: true,
        minimum_permission,
    })
}

pub fn label_trigger(pattern: &str, minimum_permission: MinimumPermission) -> TriggerRule {
    TriggerRule::Label(LabelTrigger {
        pattern: TriggerPattern::new(pattern).unwrap(),
        minimum_permission,
    })
}

pub fn review_trigger(minimum_permission: MinimumPermission) -> TriggerRule {
    TriggerRule::Review(ReviewTrigger { minimum_permission })
}

pub fn update_trigger(minimum_permission: MinimumPermission) -> TriggerRule {
    TriggerRule::Update(UpdateTrigger { minimum_permission })
}
