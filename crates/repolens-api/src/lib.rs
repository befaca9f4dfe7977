// HTTP clients for the hosting API and the completion endpoint
pub mod completion;
pub mod github;

// Re-export common types
pub use completion::{CompletionClient, CompletionError};
pub use github::{
    GitHubBranch, GitHubClient, GitHubCommit, GitHubCommitDetail, GitHubContent,
    GitHubContributor, GitHubError, GitHubFile, GitHubIssue, GitHubPull,
};
