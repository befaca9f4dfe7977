// Core logic: records, the failure-absorbing explorer, aggregation and diffs
pub mod aggregate;
pub mod compare;
pub mod config;
pub mod error;
pub mod explorer;
pub mod export;
pub mod models;
pub mod notices;
pub mod providers;
pub mod repo_url;
pub mod review;
pub mod session;
pub mod source;
pub mod vulnerabilities;

pub use config::Config;
pub use error::Error;
pub use explorer::RepoExplorer;
pub use export::{ExportFormat, Exporter, Tabular};
pub use notices::{Notice, Notices};
pub use repo_url::RepoId;
pub use review::{Annotation, CompletionProvider, FileReview, Reviewer};
pub use session::{mask_token, Session};
pub use source::RepositorySource;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
