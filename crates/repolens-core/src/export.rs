use crate::{
    models::{Branch, CommitRef, Contributor, FileDiff, Issue, LatestChange, PullRequest},
    review::FileReview,
    Error, Result,
};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const TABLE_CELL_WIDTH: usize = 60;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Aligned columns for the terminal
    #[default]
    Table,
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            "txt" => Some(ExportFormat::Table),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Table => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(ExportFormat::Table),
            other => Self::from_extension(other).ok_or_else(|| {
                Error::ConfigError(format!(
                    "Unknown format '{}'. Use table, json, csv or markdown",
                    s
                ))
            }),
        }
    }
}

/// A record that renders as one row of a table
pub trait Tabular {
    const TITLE: &'static str;

    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// Exporter for any tabular view
pub struct Exporter;

impl Exporter {
    /// Render rows to a string in the requested format
    pub fn render<T: Tabular + Serialize>(rows: &[T], format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Table => Ok(Self::to_table(rows)),
            ExportFormat::Json => Self::to_json(rows),
            ExportFormat::Csv => Ok(Self::to_csv(rows)),
            ExportFormat::Markdown => Ok(Self::to_markdown(rows)),
        }
    }

    /// Export rows to a file with automatic format detection
    pub fn export_to_file<T: Tabular + Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
        let path = path.as_ref();

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::ConfigError(
                    "Could not determine export format from extension. Use .json, .csv, .md or .txt"
                        .to_string(),
                )
            })?;

        let content = Self::render(rows, format)?;

        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }

    pub fn to_json<T: Serialize>(rows: &[T]) -> Result<String> {
        Ok(serde_json::to_string_pretty(rows)?)
    }

    pub fn to_csv<T: Tabular>(rows: &[T]) -> String {
        let mut output = String::new();

        let headers: Vec<String> = T::headers().iter().map(|h| Self::escape_csv(h)).collect();
        output.push_str(&headers.join(","));
        output.push('\n');

        for row in rows {
            let cells: Vec<String> = row.cells().iter().map(|c| Self::escape_csv(c)).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }

        output
    }

    pub fn to_markdown<T: Tabular>(rows: &[T]) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", T::TITLE));
        output.push_str(&format!("Total: {}\n\n", rows.len()));

        output.push_str(&format!("| {} |\n", T::headers().join(" | ")));
        output.push_str(&format!(
            "|{}\n",
            T::headers().iter().map(|_| "---|").collect::<String>()
        ));

        for row in rows {
            let cells: Vec<String> = row.cells().iter().map(|c| Self::escape_markdown(c)).collect();
            output.push_str(&format!("| {} |\n", cells.join(" | ")));
        }

        output
    }

    /// Aligned columns, one line per row, long cells cut short
    pub fn to_table<T: Tabular>(rows: &[T]) -> String {
        let headers = T::headers();
        let body: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.cells().iter().map(|c| Self::table_cell(c)).collect())
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &body {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut output = String::new();
        Self::push_table_line(&mut output, headers.iter().copied(), &widths);
        Self::push_table_line(
            &mut output,
            widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().iter().map(String::as_str),
            &widths,
        );
        for row in &body {
            Self::push_table_line(&mut output, row.iter().map(String::as_str), &widths);
        }

        output
    }

    fn push_table_line<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
        let line: Vec<String> = cells
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect();
        output.push_str(line.join("  ").trim_end());
        output.push('\n');
    }

    fn table_cell(value: &str) -> String {
        let first_line = value.lines().next().unwrap_or_default();
        let truncated = value.lines().nth(1).is_some() || first_line.chars().count() > TABLE_CELL_WIDTH;

        if truncated {
            let cut: String = first_line.chars().take(TABLE_CELL_WIDTH - 3).collect();
            format!("{}...", cut)
        } else {
            first_line.to_string()
        }
    }

    /// Escape CSV field (wrap in quotes if contains comma, quote, or newline)
    fn escape_csv(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn escape_markdown(field: &str) -> String {
        field.replace('|', "\\|").replace('\n', "<br>")
    }
}

impl Tabular for CommitRef {
    const TITLE: &'static str = "Commits";

    fn headers() -> &'static [&'static str] {
        &["SHA", "Message", "Author", "Date"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.sha.clone(),
            self.message.clone(),
            self.author.clone(),
            self.date.map(|d| d.to_rfc3339()).unwrap_or_default(),
        ]
    }
}

impl Tabular for Branch {
    const TITLE: &'static str = "Branches";

    fn headers() -> &'static [&'static str] {
        &["Name", "Protected"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), self.protected.to_string()]
    }
}

impl Tabular for Issue {
    const TITLE: &'static str = "Issues";

    fn headers() -> &'static [&'static str] {
        &["#", "Title", "State", "Labels", "Author"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.number.to_string(),
            self.title.clone(),
            self.state.clone(),
            self.labels.clone(),
            self.author.clone(),
        ]
    }
}

impl Tabular for PullRequest {
    const TITLE: &'static str = "Pull Requests";

    fn headers() -> &'static [&'static str] {
        &["#", "Title", "State", "Author"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.number.to_string(),
            self.title.clone(),
            self.state.clone(),
            self.author.clone(),
        ]
    }
}

impl Tabular for Contributor {
    const TITLE: &'static str = "Contributors";

    fn headers() -> &'static [&'static str] {
        &["Login", "Contributions"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.login.clone(), self.contributions.to_string()]
    }
}

impl Tabular for LatestChange {
    const TITLE: &'static str = "Latest Change Per File";

    fn headers() -> &'static [&'static str] {
        &["File", "Commit", "Message", "Patch"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.path.clone(),
            self.commit_sha.clone(),
            self.commit_message.clone(),
            self.patch.clone(),
        ]
    }
}

impl Tabular for FileDiff {
    const TITLE: &'static str = "Commit Comparison";

    fn headers() -> &'static [&'static str] {
        &["File", "Diff"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.path.clone(), self.diff.clone()]
    }
}

impl Tabular for FileReview {
    const TITLE: &'static str = "Repository Review";

    fn headers() -> &'static [&'static str] {
        &["File", "Commit", "Vulnerabilities"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.path.clone(),
            self.commit_sha.clone(),
            self.annotation.vulnerabilities.join("; "),
        ]
    }
}
