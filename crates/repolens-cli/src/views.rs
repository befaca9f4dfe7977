// One function per dashboard view, shared by subcommands and the shell
use anyhow::Context;
use repolens_core::{
    compare::select_pair,
    models::{short_sha, FileDiff},
    providers::build_completion_client,
    Config, ExportFormat, Exporter, FileReview, Reviewer, Session, Tabular,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Commits,
    Branches,
    Issues,
    Pulls,
    Contributors,
    Latest,
    Compare(Vec<String>),
    File { path: String, reference: String },
    Review { limit: Option<usize> },
}

/// Where and how a view's rows end up
#[derive(Debug, Clone, Default)]
pub struct Output {
    pub format: ExportFormat,
    pub path: Option<PathBuf>,
}

pub async fn run(session: &Session, view: &View, output: &Output, config: &Config) -> anyhow::Result<()> {
    let explorer = session.explorer();

    match view {
        View::Commits => emit(&explorer.commits().await, output, "commits")?,
        View::Branches => emit(&explorer.branches().await, output, "branches")?,
        View::Issues => emit(&explorer.issues().await, output, "issues")?,
        View::Pulls => emit(&explorer.pull_requests().await, output, "pull requests")?,
        View::Contributors => emit(&explorer.contributors().await, output, "contributors")?,
        View::Latest => {
            let latest = explorer.latest_changes().await;
            let rows: Vec<_> = latest.into_values().collect();
            emit(&rows, output, "file changes")?;
        }
        View::Compare(selected) => {
            let (a, b) = select_pair(selected)?;
            let diffs = explorer.compare(&a, &b).await;
            if output.format == ExportFormat::Table && output.path.is_none() {
                print_diffs(&diffs, &a, &b);
            } else {
                emit(&diffs, output, "files changed in both commits")?;
            }
        }
        View::File { path, reference } => match explorer.file_content(path, reference).await {
            Some(content) => match &output.path {
                Some(target) => std::fs::write(target, &content.content)
                    .with_context(|| format!("Failed to write {}", target.display()))?,
                None => print!("{}", content.text()),
            },
            None => println!("Nothing found: {} at {}", path, reference),
        },
        View::Review { limit } => {
            let completion = build_completion_client(&config.completion)?;
            let latest = explorer.latest_changes().await;
            let reviews = Reviewer::new(explorer, &completion)
                .review_latest(&latest, *limit)
                .await;
            if output.format == ExportFormat::Table && output.path.is_none() {
                print_reviews(&reviews);
            } else {
                emit(&reviews, output, "reviewed files")?;
            }
        }
    }

    report_notices(session);
    Ok(())
}

fn emit<T: Tabular + Serialize>(rows: &[T], output: &Output, what: &str) -> anyhow::Result<()> {
    if rows.is_empty() {
        println!("Nothing found: no {}", what);
        return Ok(());
    }

    match &output.path {
        Some(path) => {
            Exporter::export_to_file(rows, path)?;
            println!("Wrote {} {} to {}", rows.len(), what, path.display());
        }
        None => print!("{}", Exporter::render(rows, output.format)?),
    }

    Ok(())
}

fn print_diffs(diffs: &[FileDiff], a: &str, b: &str) {
    if diffs.is_empty() {
        println!(
            "Nothing found: no file changed in both {} and {}",
            short_sha(a),
            short_sha(b)
        );
        return;
    }

    for diff in diffs {
        println!("== {} ==", diff.path);
        if diff.is_empty() {
            println!("(identical)");
        } else {
            print!("{}", diff.diff);
        }
        println!();
    }
}

fn print_reviews(reviews: &[FileReview]) {
    if reviews.is_empty() {
        println!("Nothing found: no files reviewed");
        return;
    }

    for review in reviews {
        println!("== {} @ {} ==", review.path, short_sha(&review.commit_sha));
        println!("{}", review.annotation.updated_source);
        println!();
        if review.annotation.vulnerabilities.is_empty() {
            println!("No vulnerabilities flagged.");
        } else {
            println!("Vulnerabilities:");
            for finding in &review.annotation.vulnerabilities {
                println!("  - {}", finding);
            }
        }
        println!();
    }
}

/// Failures were absorbed during the view; show them now
fn report_notices(session: &Session) {
    for notice in session.notices().drain() {
        eprintln!("! {}", notice);
    }
}
