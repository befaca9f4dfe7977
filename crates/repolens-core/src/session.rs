use repolens_api::GitHubClient;
use tracing::info;

use crate::{
    config::Config, explorer::RepoExplorer, notices::Notices, providers::GitHubSource,
    repo_url::RepoId, Result,
};

/// The repository currently being explored.
///
/// Keyed by repository identity: pointing it at the same repository again
/// keeps the existing client, a different one rebuilds it. Notices survive a
/// rebuild.
pub struct Session {
    repo: RepoId,
    explorer: RepoExplorer,
}

impl Session {
    pub fn open(url: &str, token: Option<String>, config: &Config) -> Result<Self> {
        let repo = RepoId::parse(url)?;
        let explorer = build_explorer(&repo, token, config, Notices::new())?;
        info!("Opened session for {}", repo);
        Ok(Self { repo, explorer })
    }

    pub fn from_explorer(repo: RepoId, explorer: RepoExplorer) -> Self {
        Self { repo, explorer }
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn explorer(&self) -> &RepoExplorer {
        &self.explorer
    }

    pub fn notices(&self) -> &Notices {
        self.explorer.notices()
    }

    /// Returns whether the client was rebuilt. On error the session is untouched.
    pub fn switch(&mut self, url: &str, token: Option<String>, config: &Config) -> Result<bool> {
        let repo = RepoId::parse(url)?;

        if repo == self.repo {
            return Ok(false);
        }

        let explorer = build_explorer(&repo, token, config, self.notices().clone())?;
        info!("Switched session from {} to {}", self.repo, repo);
        self.repo = repo;
        self.explorer = explorer;
        Ok(true)
    }
}

fn build_explorer(
    repo: &RepoId,
    token: Option<String>,
    config: &Config,
    notices: Notices,
) -> Result<RepoExplorer> {
    let client = GitHubClient::with_base_url(token, config.github.api_url.clone())?;
    let source = GitHubSource::new(client, repo.clone());
    Ok(RepoExplorer::with_notices(
        Box::new(source),
        config.fetch.effective_concurrency(),
        notices,
    ))
}

/// Keep only the last four characters visible
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
