use clap::Parser;
use repolens_core::{mask_token, Config, ExportFormat, Session};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod shell;
mod views;

use views::{Output, View};

#[derive(Parser)]
#[command(name = "repolens")]
#[command(version, about = "Browse a GitHub repository's commits, changes and diffs from the terminal", long_about = None)]
struct Cli {
    /// Personal access token sent as `Authorization: token ...`
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output format: table, json, csv or markdown
    #[arg(long, short, global = true, default_value = "table")]
    format: ExportFormat,

    /// Write rows to a file instead; format comes from the extension
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Recent commits (one page, newest first)
    Commits {
        /// Repository URL, e.g. https://github.com/owner/repo
        url: String,
    },
    /// Branch names
    Branches { url: String },
    /// Issues with labels and authors
    Issues { url: String },
    /// Pull requests
    Pulls { url: String },
    /// Contributors and their contribution counts
    Contributors { url: String },
    /// Most recent change for every file touched by the latest commits
    Latest { url: String },
    /// Diff the files changed in both of two commits
    Compare {
        url: String,
        /// Exactly two commit SHAs
        #[arg(required = true)]
        commits: Vec<String>,
    },
    /// Print a file as of a commit
    File {
        url: String,
        /// Path inside the repository
        path: String,
        /// Commit SHA (or branch) to read from
        #[arg(long = "ref")]
        reference: String,
    },
    /// Ask a language model for docstrings and vulnerabilities in recently changed files
    Review {
        url: String,
        /// Review at most this many files
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Interactive session
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so table output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repolens=info,repolens_core=info,repolens_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let token = config.resolve_token(cli.token);
    let output = Output {
        format: cli.format,
        path: cli.output,
    };

    let (url, view) = match cli.command {
        Some(Commands::Commits { url }) => (url, View::Commits),
        Some(Commands::Branches { url }) => (url, View::Branches),
        Some(Commands::Issues { url }) => (url, View::Issues),
        Some(Commands::Pulls { url }) => (url, View::Pulls),
        Some(Commands::Contributors { url }) => (url, View::Contributors),
        Some(Commands::Latest { url }) => (url, View::Latest),
        Some(Commands::Compare { url, commits }) => (url, View::Compare(commits)),
        Some(Commands::File {
            url,
            path,
            reference,
        }) => (url, View::File { path, reference }),
        Some(Commands::Review { url, limit }) => (url, View::Review { limit }),
        Some(Commands::Shell) => return shell::run(token, output, config).await,
        None => {
            println!("No command specified. Try --help");
            return Ok(());
        }
    };

    match &token {
        Some(token) => tracing::info!("Using token {}", mask_token(token)),
        None => tracing::warn!("No token configured; private repositories and rate limits will bite"),
    }

    let session = Session::open(&url, token, &config)?;
    views::run(&session, &view, &output, &config).await
}
