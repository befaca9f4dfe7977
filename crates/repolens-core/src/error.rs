use thiserror::Error;

/// All the ways things can go wrong in repolens
///
/// Remote failures normally never reach a caller as this type: the explorer
/// turns them into notices. It shows up for configuration, URL parsing,
/// selection checks and anything run below the explorer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(#[from] repolens_api::GitHubError),

    #[error("Completion request failed: {0}")]
    CompletionError(#[from] repolens_api::CompletionError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid repository URL: {0}")]
    InvalidRepoUrl(String),

    #[error("Select exactly two distinct commits to compare (got {0})")]
    InvalidSelection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown error occurred: {0}")]
    Unknown(String),
}
