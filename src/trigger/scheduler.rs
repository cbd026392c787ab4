use anyhow::Context;
use axum::async_trait;
use serde::Serialize;
use url::Url;

use crate::trigger::cause::BuildCause;
use crate::trigger::registry::JobId;
use crate::trigger::{ElevatedContext, JobHandle};

/// Enqueues builds of jobs.
///
/// Collapsing duplicate builds across deliveries is up to the scheduler.
#[async_trait]
pub trait BuildScheduler: Send + Sync {
    async fn schedule(
        &self,
        ctx: &ElevatedContext,
        job: &JobHandle,
        cause: &BuildCause,
    ) -> anyhow::Result<()>;
}

#[derive(Serialize)]
struct ScheduleRequest<'a> {
    job: &'a JobId,
    description: String,
    cause: &'a BuildCause,
}

/// Schedules builds by posting them to an HTTP endpoint of the build server.
pub struct HttpBuildScheduler {
    client: reqwest::Client,
    url: Url,
}

impl HttpBuildScheduler {
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl BuildScheduler for HttpBuildScheduler {
    async fn schedule(
        &self,
        _ctx: &ElevatedContext,
        job: &JobHandle,
        cause: &BuildCause,
    ) -> anyhow::Result<()> {
        let request = ScheduleRequest {
            job: job.id(),
            description: cause.short_description(),
            cause,
        };
        self.client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Cannot send build request for {}", job.id()))?
            .error_for_status()
            .with_context(|| format!("Build server rejected build of {}", job.id()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{BuildScheduler, HttpBuildScheduler};
    use crate::tests::mocks::{job, source};
    use crate::trigger::cause::{BuildCause, ReviewCause};
    use crate::trigger::ElevatedContext;

    fn review_cause() -> BuildCause {
        BuildCause::Review(ReviewCause {
            review_author: "alice".to_string(),
            pull_request_url: "https://github.com/owner/name/pull/1".to_string(),
        })
    }

    #[tokio::test]
    async fn posts_build_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/builds"))
            .and(body_json(json!({
                "job": "project/PR-1",
                "description": "GitHub pull request review",
                "cause": {
                    "type": "review",
                    "reviewAuthor": "alice",
                    "pullRequestUrl": "https://github.com/owner/name/pull/1"
                }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let scheduler =
            HttpBuildScheduler::new(format!("{}/builds", server.uri()).parse().unwrap());
        let handle = job("project/PR-1").pr(1).create_handle(source("owner/name"));
        scheduler
            .schedule(&ElevatedContext::new("test"), &handle, &review_cause())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_build_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let scheduler =
            HttpBuildScheduler::new(format!("{}/builds", server.uri()).parse().unwrap());
        let handle = job("project/PR-1").pr(1).create_handle(source("owner/name"));
        assert!(scheduler
            .schedule(&ElevatedContext::new("test"), &handle, &review_cause())
            .await
            .is_err());
    }
}
