// Provider implementations for the hosting service and the completion endpoint
pub mod completion;
pub mod github;

pub use completion::build_completion_client;
pub use github::GitHubSource;
