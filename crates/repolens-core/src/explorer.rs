// Failure-absorbing front for a repository source
use tracing::{debug, info, warn};

use crate::{
    aggregate::aggregate_latest_changes,
    compare::build_diffs,
    models::{
        Branch, CommitRef, Contributor, FileChange, FileContent, FileDiff, Issue,
        LatestFileChangeMap, PullRequest,
    },
    notices::Notices,
    source::RepositorySource,
    Result,
};

/// Every view goes through here.
///
/// A failed remote call is logged, recorded in [`Notices`] and replaced by an
/// empty value, so a view shows "nothing found" instead of aborting and the
/// session stays usable. Nothing is retried.
pub struct RepoExplorer {
    source: Box<dyn RepositorySource>,
    notices: Notices,
    concurrency: usize,
}

impl RepoExplorer {
    pub fn new(source: Box<dyn RepositorySource>, concurrency: usize) -> Self {
        Self::with_notices(source, concurrency, Notices::new())
    }

    /// Share an existing notice list, e.g. across session rebuilds
    pub fn with_notices(source: Box<dyn RepositorySource>, concurrency: usize, notices: Notices) -> Self {
        Self {
            source,
            notices,
            concurrency: concurrency.max(1),
        }
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub async fn commits(&self) -> Vec<CommitRef> {
        let result = self.source.list_commits().await;
        self.absorb("list_commits", result)
    }

    pub async fn commit_changes(&self, sha: &str) -> Vec<FileChange> {
        let result = self.source.commit_changes(sha).await;
        self.absorb("commit_changes", result)
    }

    pub async fn branches(&self) -> Vec<Branch> {
        let result = self.source.list_branches().await;
        self.absorb("list_branches", result)
    }

    pub async fn issues(&self) -> Vec<Issue> {
        let result = self.source.list_issues().await;
        self.absorb("list_issues", result)
    }

    pub async fn pull_requests(&self) -> Vec<PullRequest> {
        let result = self.source.list_pull_requests().await;
        self.absorb("list_pull_requests", result)
    }

    pub async fn contributors(&self) -> Vec<Contributor> {
        let result = self.source.list_contributors().await;
        self.absorb("list_contributors", result)
    }

    /// `None` both when the file is absent and when the fetch failed
    pub async fn file_content(&self, path: &str, sha: &str) -> Option<FileContent> {
        let result = self.source.file_content(path, sha).await;
        self.absorb("file_content", result)
    }

    /// Fetch a page of commits, then fold their change lists
    pub async fn latest_changes(&self) -> LatestFileChangeMap {
        let commits = self.commits().await;
        self.latest_changes_for(&commits).await
    }

    /// One change-list fetch per commit; this is the expensive view
    pub async fn latest_changes_for(&self, commits: &[CommitRef]) -> LatestFileChangeMap {
        info!("Collecting latest changes across {} commits", commits.len());

        let latest = aggregate_latest_changes(commits, self.concurrency, |commit| {
            self.commit_changes(&commit.sha)
        })
        .await;

        debug!("{} files in latest-change map", latest.len());
        latest
    }

    /// Diffs for files changed in both commits. The caller picks the pair.
    pub async fn compare(&self, id_a: &str, id_b: &str) -> Vec<FileDiff> {
        info!("Comparing {} with {}", id_a, id_b);
        build_diffs(id_a, id_b, |id| self.commit_changes(id)).await
    }

    fn absorb<T: Default>(&self, operation: &str, result: Result<T>) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!("{} failed: {}", operation, e);
                self.notices.push(operation, e.to_string());
                T::default()
            }
        }
    }
}
