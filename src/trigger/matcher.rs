use std::sync::Arc;

use crate::github::{PullRequestNumber, RepositoryIdentity};
use crate::trigger::registry::{JobHandle, OwnerKind, SourceOwner};

/// Lazily enumerates jobs that build the pull request `pr` of `repository`.
///
/// Every source of every owner is visited in registry order. For sources of the given
/// repository, the jobs of the owner whose head is exactly the pull request are yielded.
/// The same job can be yielded more than once when an owner has several sources of the same
/// repository.
pub fn find_jobs<'a>(
    owners: &'a [SourceOwner],
    repository: &'a RepositoryIdentity,
    pr: PullRequestNumber,
) -> impl Iterator<Item = JobHandle> + 'a {
    owners.iter().flat_map(move |owner| {
        owner
            .sources
            .iter()
            .filter(move |source| &source.repository == repository.repository())
            .flat_map(move |source| {
                owner.jobs.iter().filter_map(move |job| {
                    // An organization groups unrelated repositories, a job must only be
                    // considered under the source that created it.
                    if owner.kind == OwnerKind::Organization && job.source != source.id {
                        return None;
                    }
                    if job.tracked_pull_request() != Some(pr) {
                        return None;
                    }
                    let job_source = owner.source(&job.source).unwrap_or(source);
                    tracing::trace!(
                        "Job {} of {} tracks PR {pr} of {}",
                        job.id,
                        owner.name,
                        source.repository
                    );
                    Some(JobHandle::new(Arc::clone(job), Arc::clone(job_source)))
                })
            })
    })
}

#[cfg(test)]
mod tests {
    use super::find_jobs;
    use crate::github::{PullRequestNumber, RepositoryIdentity};
    use crate::tests::mocks::{job, owner, source};
    use crate::trigger::registry::OwnerKind;

    fn ids(
        owners: &[crate::trigger::SourceOwner],
        url: &str,
        pr: u64,
    ) -> Vec<String> {
        let repo = RepositoryIdentity::from_url(url).unwrap();
        find_jobs(owners, &repo, PullRequestNumber(pr))
            .map(|job| job.id().0.clone())
            .collect()
    }

    #[test]
    fn finds_job_by_exact_pull_request() {
        let owners = vec![owner("project", OwnerKind::MultiBranch)
            .source(source("owner/name"))
            .job(job("PR-1").pr(1))
            .job(job("PR-10").pr(10))
            .job(job("PR-100").pr(100))
            .job(job("main").branch("main"))
            .create()];
        assert_eq!(ids(&owners, "https://github.com/owner/name", 1), vec!["PR-1"]);
        assert_eq!(ids(&owners, "https://github.com/owner/name", 10), vec!["PR-10"]);
    }

    #[test]
    fn job_name_is_irrelevant() {
        let owners = vec![owner("project", OwnerKind::MultiBranch)
            .source(source("owner/name"))
            .job(job("PR-5-custom").pr(7))
            .create()];
        assert!(ids(&owners, "https://github.com/owner/name", 5).is_empty());
        assert_eq!(ids(&owners, "https://github.com/owner/name", 7), vec!["PR-5-custom"]);
    }

    #[test]
    fn repository_matched_case_insensitively() {
        let owners = vec![owner("project", OwnerKind::MultiBranch)
            .source(source("Owner/Name"))
            .job(job("PR-1").pr(1))
            .create()];
        assert_eq!(ids(&owners, "https://github.com/OWNER/name", 1), vec!["PR-1"]);
    }

    #[test]
    fn other_repository_is_ignored() {
        let owners = vec![owner("project", OwnerKind::MultiBranch)
            .source(source("owner/other"))
            .job(job("PR-1").pr(1))
            .create()];
        assert!(ids(&owners, "https://github.com/owner/name", 1).is_empty());
    }

    #[test]
    fn empty_registry() {
        assert!(ids(&[], "https://github.com/owner/name", 1).is_empty());
    }

    #[test]
    fn organization_checks_job_source() {
        let owners = vec![owner("org", OwnerKind::Organization)
            .source(source("owner/name").id("a"))
            .source(source("owner/sibling").id("b"))
            .job(job("name/PR-1").pr(1).source("a"))
            .job(job("sibling/PR-1").pr(1).source("b"))
            .create()];
        assert_eq!(ids(&owners, "https://github.com/owner/name", 1), vec!["name/PR-1"]);
        assert_eq!(
            ids(&owners, "https://github.com/owner/sibling", 1),
            vec!["sibling/PR-1"]
        );
    }

    #[test]
    fn multibranch_with_overlapping_sources_yields_job_twice() {
        let owners = vec![owner("project", OwnerKind::MultiBranch)
            .source(source("owner/name").id("a"))
            .source(source("OWNER/NAME").id("b"))
            .job(job("PR-1").pr(1).source("a"))
            .create()];
        assert_eq!(
            ids(&owners, "https://github.com/owner/name", 1),
            vec!["PR-1", "PR-1"]
        );
    }

    #[test]
    fn handle_uses_job_source() {
        let owners = vec![owner("project", OwnerKind::MultiBranch)
            .source(source("owner/name").id("a"))
            .source(source("owner/name").id("b").api_url("https://ghe.example.com/api/v3"))
            .job(job("PR-1").pr(1).source("b"))
            .create()];
        let repo = RepositoryIdentity::from_url("https://github.com/owner/name").unwrap();
        let handles: Vec<_> = find_jobs(&owners, &repo, PullRequestNumber(1)).collect();
        assert_eq!(handles.len(), 2);
        for handle in handles {
            assert_eq!(handle.source().id.0, "b");
        }
    }
}
