use crate::{
    models::{Branch, CommitRef, Contributor, FileChange, FileContent, Issue, PullRequest},
    Result,
};

/// Read-only view of one repository on some hosting service
///
/// Implementations report failures honestly. Turning them into empty results
/// is the explorer's job, not theirs.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositorySource: Send + Sync {
    /// One page of commits, newest first
    async fn list_commits(&self) -> Result<Vec<CommitRef>>;
    /// Files touched by a commit
    async fn commit_changes(&self, sha: &str) -> Result<Vec<FileChange>>;
    async fn list_branches(&self) -> Result<Vec<Branch>>;
    async fn list_issues(&self) -> Result<Vec<Issue>>;
    async fn list_pull_requests(&self) -> Result<Vec<PullRequest>>;
    async fn list_contributors(&self) -> Result<Vec<Contributor>>;
    /// `Ok(None)` when the path does not exist at that commit
    async fn file_content(&self, path: &str, sha: &str) -> Result<Option<FileContent>>;
}
