use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from `<config_dir>/repolens/config.toml`. Priority is
/// CLI > Env > File > Defaults; the CLI layer hands its values to the
/// `resolve_*` helpers below.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl Config {
    /// Load config from default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            // No config file? Use defaults
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Uses XDG on Linux, Application Support on macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("repolens");

        Ok(config_dir.join("config.toml"))
    }

    /// Token from the CLI (which already folds in `GITHUB_TOKEN`), else the file
    pub fn resolve_token(&self, cli_token: Option<String>) -> Option<String> {
        cli_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.github.token.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub personal access token
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_github_url")]
    pub api_url: String,
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// How many per-commit change lists may be in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl FetchConfig {
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_url")]
    pub api_url: String,

    #[serde(default = "default_completion_model")]
    pub model: String,

    /// API key, literal or `${VAR}`
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_completion_url() -> String {
    repolens_api::completion::DEFAULT_COMPLETION_URL.to_string()
}

fn default_completion_model() -> String {
    repolens_api::completion::DEFAULT_COMPLETION_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

impl CompletionConfig {
    /// `OPENAI_API_KEY` wins over the file; `${VAR}` in the file is expanded
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| {
                self.api_key
                    .as_deref()
                    .map(|k| expand_env_var(k, |name| std::env::var(name).ok()))
            })
            .filter(|k| !k.is_empty())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: default_completion_url(),
            model: default_completion_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
        }
    }
}

/// `${NAME}` becomes the variable's value; anything else passes through
fn expand_env_var(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    match value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(name) => lookup(name).unwrap_or_default(),
        None => value.to_string(),
    }
}
