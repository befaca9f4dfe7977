// Latest change per file across one page of commits
use futures::stream::{self, StreamExt};
use std::future::Future;
use tracing::debug;

use crate::models::{CommitRef, FileChange, LatestChange, LatestFileChangeMap};

/// Build the latest-change-per-file map for `commits` (newest first).
///
/// One change-list fetch per commit, at most `concurrency` in flight. Results
/// come back in commit order whatever order the fetches finish in, so the
/// fold below always sees the newest commit first.
pub async fn aggregate_latest_changes<'a, F, Fut>(
    commits: &'a [CommitRef],
    concurrency: usize,
    fetch: F,
) -> LatestFileChangeMap
where
    F: Fn(&'a CommitRef) -> Fut,
    Fut: Future<Output = Vec<FileChange>>,
{
    debug!(
        "Fetching change lists for {} commits ({} at a time)",
        commits.len(),
        concurrency.max(1)
    );

    let change_sets: Vec<Vec<FileChange>> = stream::iter(commits.iter().map(&fetch))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    fold_latest_changes(commits, change_sets)
}

/// First write wins: a path keeps the record of the earliest commit in
/// `commits` that touched it.
pub fn fold_latest_changes(
    commits: &[CommitRef],
    change_sets: Vec<Vec<FileChange>>,
) -> LatestFileChangeMap {
    let mut latest = LatestFileChangeMap::new();

    for (commit, changes) in commits.iter().zip(change_sets) {
        for change in changes {
            latest
                .entry(change.path.clone())
                .or_insert_with(|| LatestChange {
                    path: change.path,
                    commit_sha: commit.sha.clone(),
                    commit_message: commit.message.clone(),
                    patch: change.patch,
                });
        }
    }

    latest
}
