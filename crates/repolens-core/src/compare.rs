// Unified diffs between the patches two commits carry for the same files
use similar::TextDiff;
use std::borrow::Cow;
use std::collections::HashMap;
use std::future::Future;

use crate::{
    models::{FileChange, FileDiff},
    Error, Result,
};

/// Accept a selection only if it is exactly two distinct commit ids
pub fn select_pair(selected: &[String]) -> Result<(String, String)> {
    match selected {
        [a, b] if a != b => Ok((a.clone(), b.clone())),
        [a, _] => Err(Error::InvalidSelection(format!("{} twice", a))),
        other => Err(Error::InvalidSelection(format!("{} selected", other.len()))),
    }
}

/// Fetch both change lists and diff every file present in both.
pub async fn build_diffs<'a, F, Fut>(id_a: &'a str, id_b: &'a str, fetch: F) -> Vec<FileDiff>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = Vec<FileChange>>,
{
    let (changes_a, changes_b) = futures::join!(fetch(id_a), fetch(id_b));
    diff_change_sets(id_a, &changes_a, id_b, &changes_b)
}

/// Paths touched by only one side are left out. Output follows `changes_b` order.
pub fn diff_change_sets(
    id_a: &str,
    changes_a: &[FileChange],
    id_b: &str,
    changes_b: &[FileChange],
) -> Vec<FileDiff> {
    let lookup: HashMap<&str, &FileChange> = changes_a
        .iter()
        .map(|change| (change.path.as_str(), change))
        .collect();

    changes_b
        .iter()
        .filter_map(|change_b| {
            let change_a = lookup.get(change_b.path.as_str())?;
            Some(FileDiff {
                path: change_b.path.clone(),
                diff: unified_diff(
                    &change_a.patch,
                    &change_b.patch,
                    &format!("{}:{}", id_a, change_b.path),
                    &format!("{}:{}", id_b, change_b.path),
                ),
            })
        })
        .collect()
}

/// Line diff with no context lines. Identical inputs give an empty string.
pub fn unified_diff(old: &str, new: &str, old_label: &str, new_label: &str) -> String {
    let old = terminated(old);
    let new = terminated(new);

    let diff = TextDiff::from_lines(&*old, &*new);
    diff.unified_diff()
        .context_radius(0)
        .header(old_label, new_label)
        .to_string()
}

// Patches from the API usually lack a final newline
fn terminated(text: &str) -> Cow<'_, str> {
    if text.is_empty() || text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{}\n", text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn change(path: &str, patch: &str) -> FileChange {
        FileChange::new(path, Some(patch.to_string()))
    }

    fn body_lines(diff: &str) -> Vec<&str> {
        diff.lines()
            .filter(|l| !l.starts_with("---") && !l.starts_with("+++") && !l.starts_with("@@"))
            .collect()
    }

    #[test]
    fn test_select_pair() {
        let ok = select_pair(&["a".into(), "b".into()]).unwrap();
        assert_eq!(ok, ("a".to_string(), "b".to_string()));

        assert!(matches!(select_pair(&["a".into()]), Err(Error::InvalidSelection(_))));
        assert!(matches!(select_pair(&[]), Err(Error::InvalidSelection(_))));
        assert!(matches!(
            select_pair(&["a".into(), "b".into(), "c".into()]),
            Err(Error::InvalidSelection(_))
        ));
        assert!(matches!(
            select_pair(&["a".into(), "a".into()]),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_only_common_paths_are_diffed() {
        let a = vec![change("both.rs", "x"), change("only_a.rs", "x"), change("also.rs", "1")];
        let b = vec![change("also.rs", "2"), change("only_b.rs", "y"), change("both.rs", "z")];

        let diffs = diff_change_sets("A", &a, "B", &b);
        let paths: Vec<&str> = diffs.iter().map(|d| d.path.as_str()).collect();

        // Every common file, in B's order
        assert_eq!(paths, vec!["also.rs", "both.rs"]);

        let expected: BTreeSet<&str> = BTreeSet::from(["also.rs", "both.rs"]);
        assert_eq!(paths.iter().copied().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn test_same_commit_twice_has_empty_bodies() {
        let changes = vec![
            change("a.rs", "@@ -1 +1 @@\n-old\n+new"),
            FileChange::new("img.png", None),
        ];

        let diffs = diff_change_sets("A", &changes, "A", &changes);
        assert_eq!(diffs.len(), 2);
        for diff in diffs {
            assert!(diff.is_empty(), "expected no diff for {}", diff.path);
            assert!(body_lines(&diff.diff).is_empty());
        }
    }

    #[test]
    fn test_changed_lines_are_marked() {
        let diff = unified_diff("keep\nold\n", "keep\nnew", "A:f.txt", "B:f.txt");

        assert!(diff.starts_with("--- A:f.txt\n+++ B:f.txt\n"));
        let body = body_lines(&diff);
        assert_eq!(body, vec!["-old", "+new"]);
    }

    #[test]
    fn test_additions_and_removals() {
        let diff = unified_diff("", "one\ntwo\n", "A:n", "B:n");
        assert_eq!(body_lines(&diff), vec!["+one", "+two"]);

        let diff = unified_diff("one\ntwo\n", "", "A:n", "B:n");
        assert_eq!(body_lines(&diff), vec!["-one", "-two"]);
    }

    #[tokio::test]
    async fn test_build_diffs_fetches_both_sides() {
        let diffs = build_diffs("A", "B", |id| {
            let id = id.to_string();
            async move {
                match id.as_str() {
                    "A" => vec![change("lib.rs", "+a"), change("gone.rs", "+g")],
                    _ => vec![change("lib.rs", "+b")],
                }
            }
        })
        .await;

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "lib.rs");
        assert_eq!(body_lines(&diffs[0].diff), vec!["-+a", "++b"]);
    }
}
