use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stands in for a missing patch so downstream formatting never sees `None`
pub const NO_CHANGES_AVAILABLE: &str = "No Changes Available";

/// A commit as listed by the hosting API (newest first within a page)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub date: Option<DateTime<Utc>>,
}

impl CommitRef {
    /// First line of the message, which is what people actually want to read
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }
}

/// One file touched by a commit. `path` is unique within a commit's change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub patch: String,
}

impl FileChange {
    pub fn new(path: impl Into<String>, patch: Option<String>) -> Self {
        Self {
            path: path.into(),
            patch: patch.unwrap_or_else(|| NO_CHANGES_AVAILABLE.to_string()),
        }
    }

    pub fn has_patch(&self) -> bool {
        self.patch != NO_CHANGES_AVAILABLE
    }
}

/// The most recent change seen for a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestChange {
    pub path: String,
    pub commit_sha: String,
    pub commit_message: String,
    pub patch: String,
}

/// File path -> most recent change. Each path appears at most once.
pub type LatestFileChangeMap = BTreeMap<String, LatestChange>;

/// Unified diff of one file between two commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    pub diff: String,
}

impl FileDiff {
    /// True when the two sides were identical
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub protected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    /// Label names joined with ", "
    pub labels: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u32,
}

/// File bytes at a specific commit plus the encoding tag the API reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub content: Vec<u8>,
    pub encoding: String,
}

impl FileContent {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_patch_uses_sentinel() {
        let change = FileChange::new("logo.png", None);
        assert_eq!(change.patch, NO_CHANGES_AVAILABLE);
        assert!(!change.has_patch());

        let change = FileChange::new("src/lib.rs", Some("+x".into()));
        assert!(change.has_patch());
    }

    #[test]
    fn test_commit_summary_and_short_sha() {
        let commit = CommitRef {
            sha: "0123456789abcdef".into(),
            message: "Fix parser\n\nLonger body".into(),
            author: "Ada".into(),
            date: None,
        };
        assert_eq!(commit.summary(), "Fix parser");
        assert_eq!(commit.short_sha(), "0123456");
        assert_eq!(short_sha("abc"), "abc");
    }
}
