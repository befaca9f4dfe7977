// GitHub provider implementation - bridges API client with RepositorySource trait
use async_trait::async_trait;
use repolens_api::{
    GitHubBranch, GitHubClient, GitHubCommit, GitHubContent, GitHubContributor, GitHubFile,
    GitHubIssue, GitHubPull,
};

use crate::{
    models::{Branch, CommitRef, Contributor, FileChange, FileContent, Issue, PullRequest},
    repo_url::RepoId,
    source::RepositorySource,
    Result,
};

/// Wrapper around GitHubClient bound to a single repository
pub struct GitHubSource {
    client: GitHubClient,
    repo: RepoId,
}

impl GitHubSource {
    pub fn new(client: GitHubClient, repo: RepoId) -> Self {
        Self { client, repo }
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }
}

#[async_trait]
impl RepositorySource for GitHubSource {
    async fn list_commits(&self) -> Result<Vec<CommitRef>> {
        let commits = self
            .client
            .list_commits(&self.repo.owner, &self.repo.name)
            .await?;

        Ok(commits.into_iter().map(github_to_commit).collect())
    }

    async fn commit_changes(&self, sha: &str) -> Result<Vec<FileChange>> {
        let detail = self
            .client
            .get_commit(&self.repo.owner, &self.repo.name, sha)
            .await?;

        Ok(detail.files.into_iter().map(github_to_change).collect())
    }

    async fn list_branches(&self) -> Result<Vec<Branch>> {
        let branches = self
            .client
            .list_branches(&self.repo.owner, &self.repo.name)
            .await?;

        Ok(branches.into_iter().map(github_to_branch).collect())
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        let issues = self
            .client
            .list_issues(&self.repo.owner, &self.repo.name)
            .await?;

        Ok(issues.into_iter().map(github_to_issue).collect())
    }

    async fn list_pull_requests(&self) -> Result<Vec<PullRequest>> {
        let pulls = self
            .client
            .list_pulls(&self.repo.owner, &self.repo.name)
            .await?;

        Ok(pulls.into_iter().map(github_to_pull).collect())
    }

    async fn list_contributors(&self) -> Result<Vec<Contributor>> {
        let contributors = self
            .client
            .list_contributors(&self.repo.owner, &self.repo.name)
            .await?;

        Ok(contributors.into_iter().map(github_to_contributor).collect())
    }

    async fn file_content(&self, path: &str, sha: &str) -> Result<Option<FileContent>> {
        let content = self
            .client
            .get_contents(&self.repo.owner, &self.repo.name, path, sha)
            .await?;

        match content {
            Some(content) => Ok(Some(github_to_content(content)?)),
            None => Ok(None),
        }
    }
}

fn github_to_commit(gh: GitHubCommit) -> CommitRef {
    let (author, date) = match gh.commit.author {
        Some(signature) => (signature.name, signature.date),
        None => (String::new(), None),
    };

    CommitRef {
        sha: gh.sha,
        message: gh.commit.message,
        author,
        date,
    }
}

fn github_to_change(file: GitHubFile) -> FileChange {
    FileChange::new(file.filename, file.patch)
}

fn github_to_branch(gh: GitHubBranch) -> Branch {
    Branch {
        name: gh.name,
        protected: gh.protected,
    }
}

fn github_to_issue(gh: GitHubIssue) -> Issue {
    let labels: Vec<String> = gh.labels.into_iter().map(|l| l.name).collect();

    Issue {
        number: gh.number,
        title: gh.title,
        state: gh.state,
        labels: labels.join(", "),
        author: gh.user.login,
    }
}

fn github_to_pull(gh: GitHubPull) -> PullRequest {
    PullRequest {
        number: gh.number,
        title: gh.title,
        state: gh.state,
        author: gh.user.login,
    }
}

fn github_to_contributor(gh: GitHubContributor) -> Contributor {
    Contributor {
        login: gh.login,
        contributions: gh.contributions,
    }
}

fn github_to_content(gh: GitHubContent) -> Result<FileContent> {
    let content = gh.decoded()?;

    Ok(FileContent {
        path: gh.path,
        content,
        encoding: gh.encoding.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_labels_are_comma_joined() {
        let gh: GitHubIssue = serde_json::from_str(
            r#"{
                "number": 7,
                "title": "Crash on empty input",
                "state": "open",
                "labels": [{"name": "bug"}, {"name": "good first issue"}],
                "user": {"login": "octocat"}
            }"#,
        )
        .unwrap();

        let issue = github_to_issue(gh);
        assert_eq!(issue.labels, "bug, good first issue");
        assert_eq!(issue.author, "octocat");
    }

    #[test]
    fn test_commit_without_author() {
        let gh: GitHubCommit = serde_json::from_str(
            r#"{"sha": "abc", "commit": {"message": "init", "author": null}}"#,
        )
        .unwrap();

        let commit = github_to_commit(gh);
        assert_eq!(commit.sha, "abc");
        assert_eq!(commit.author, "");
        assert!(commit.date.is_none());
    }

    #[test]
    fn test_file_without_patch_gets_sentinel() {
        let gh: GitHubFile = serde_json::from_str(r#"{"filename": "logo.png"}"#).unwrap();
        let change = github_to_change(gh);
        assert!(!change.has_patch());
    }

    #[test]
    fn test_content_is_decoded() {
        let gh = GitHubContent {
            path: "a.py".into(),
            sha: "1".into(),
            size: 6,
            content: Some("cGFzcwo=".into()),
            encoding: Some("base64".into()),
        };
        let content = github_to_content(gh).unwrap();
        assert_eq!(content.text(), "pass\n");
        assert_eq!(content.encoding, "base64");
    }

    #[test]
    fn test_oversized_content_is_an_error() {
        let gh = GitHubContent {
            path: "big.bin".into(),
            sha: "1".into(),
            size: 5_000_000,
            content: Some(String::new()),
            encoding: Some("none".into()),
        };
        assert!(matches!(github_to_content(gh), Err(crate::Error::ApiError(_))));
    }
}
