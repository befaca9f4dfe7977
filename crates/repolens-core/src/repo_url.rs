use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Identity of a repository on the hosting service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `.../{owner}/{repo}`.
    ///
    /// Only the last two path segments matter, so scheme and host are ignored
    /// and a bare `owner/repo` works too. A trailing slash and a `.git` suffix
    /// are dropped.
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let mut segments = trimmed.rsplit('/');
        let name = segments.next().unwrap_or_default();
        let owner = segments.next().unwrap_or_default();

        if owner.is_empty() || name.is_empty() || owner.ends_with(':') {
            return Err(Error::InvalidRepoUrl(url.to_string()));
        }

        Ok(Self::new(owner, name))
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_url_with_trailing_slash() {
        let id = RepoId::parse("https://host/acme/widgets/").unwrap();
        assert_eq!(id.owner, "acme");
        assert_eq!(id.name, "widgets");
    }

    #[test]
    fn test_parse_ignores_scheme_and_host() {
        let id = RepoId::parse("  http://git.example.org/some/prefix/acme/widgets ").unwrap();
        assert_eq!(id, RepoId::new("acme", "widgets"));
    }

    #[test]
    fn test_parse_bare_and_dot_git() {
        assert_eq!(RepoId::parse("acme/widgets").unwrap().to_string(), "acme/widgets");
        assert_eq!(
            RepoId::parse("https://github.com/acme/widgets.git").unwrap(),
            RepoId::new("acme", "widgets")
        );
    }

    #[test]
    fn test_parse_rejects_too_few_segments() {
        assert!(matches!(RepoId::parse("widgets"), Err(Error::InvalidRepoUrl(_))));
        assert!(matches!(RepoId::parse(""), Err(Error::InvalidRepoUrl(_))));
        assert!(matches!(RepoId::parse("https://github.com/"), Err(Error::InvalidRepoUrl(_))));
    }
}
