// Docstring and vulnerability review of files through a completion endpoint
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    explorer::RepoExplorer,
    models::LatestFileChangeMap,
    vulnerabilities::{extract_vulnerabilities, source_section, VULNERABILITIES_MARKER},
    Result,
};

pub const REVIEW_SYSTEM_PROMPT: &str = "You are a meticulous senior engineer. You add clear, \
accurate docstrings to source code without changing its behaviour, and you point out security \
vulnerabilities plainly.";

/// Anything that can turn a system + user prompt into text
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

pub fn build_review_prompt(path: &str, source: &str) -> String {
    format!(
        r#"Here is the file `{path}`:

```
{source}
```

1. Return the full file with a docstring added to every function, class and module that lacks one.
   Do not change any code.
2. After the code, add a line reading exactly "{marker}" followed by one vulnerability per line,
   each starting with "- ". If you find none, leave the section empty."#,
        path = path,
        source = source,
        marker = VULNERABILITIES_MARKER,
    )
}

/// A completion split into its two halves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub updated_source: String,
    pub vulnerabilities: Vec<String>,
}

impl Annotation {
    pub fn parse(completion: &str) -> Self {
        Self {
            updated_source: strip_code_fence(source_section(completion)).to_string(),
            vulnerabilities: extract_vulnerabilities(completion),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReview {
    pub path: String,
    pub commit_sha: String,
    pub annotation: Annotation,
}

/// Models like to wrap code in a ``` fence; drop it if the whole text is one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Skip the language tag line
    match body.split_once('\n') {
        Some((_, code)) => code.trim_end(),
        None => trimmed,
    }
}

pub struct Reviewer<'a> {
    explorer: &'a RepoExplorer,
    completion: &'a dyn CompletionProvider,
}

impl<'a> Reviewer<'a> {
    pub fn new(explorer: &'a RepoExplorer, completion: &'a dyn CompletionProvider) -> Self {
        Self {
            explorer,
            completion,
        }
    }

    /// Review one file as it was at `sha`. `None` if it is missing, binary,
    /// or the completion failed (the latter leaves a notice).
    pub async fn review_file(&self, path: &str, sha: &str) -> Option<FileReview> {
        let content = match self.explorer.file_content(path, sha).await {
            Some(content) => content,
            None => {
                debug!("{} not present at {}, skipping", path, sha);
                return None;
            }
        };

        if content.content.contains(&0) {
            debug!("{} looks binary, skipping", path);
            return None;
        }

        let prompt = build_review_prompt(path, &content.text());

        match self.completion.complete(REVIEW_SYSTEM_PROMPT, &prompt).await {
            Ok(text) => Some(FileReview {
                path: path.to_string(),
                commit_sha: sha.to_string(),
                annotation: Annotation::parse(&text),
            }),
            Err(e) => {
                warn!("Review of {} failed: {}", path, e);
                self.explorer
                    .notices()
                    .push("review_file", format!("{}: {}", path, e));
                None
            }
        }
    }

    /// Review each file at the commit that last touched it, in path order
    pub async fn review_latest(
        &self,
        latest: &LatestFileChangeMap,
        limit: Option<usize>,
    ) -> Vec<FileReview> {
        let limit = limit.unwrap_or(usize::MAX);
        info!("Reviewing up to {} of {} files", limit.min(latest.len()), latest.len());

        let mut reviews = Vec::new();
        for change in latest.values().take(limit) {
            if let Some(review) = self.review_file(&change.path, &change.commit_sha).await {
                reviews.push(review);
            }
        }
        reviews
    }
}
