// Interactive session: one repository at a time, views on demand
use repolens_core::{mask_token, Config, Session};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::views::{self, Output, View};

const HELP: &str = "\
commands:
  open <url>              point the session at a repository
  commits | branches | issues | pulls | contributors
  latest                  latest change per file
  compare <sha> <sha>     diff files changed in both commits
  file <path> <sha>       show a file as of a commit
  review [limit]          docstrings + vulnerabilities for recently changed files
  help | quit";

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Open(String),
    View(View),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> ShellCommand {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return ShellCommand::Empty;
    };
    let args: Vec<String> = words.map(str::to_string).collect();

    match (command, args.as_slice()) {
        ("open", [url]) => ShellCommand::Open(url.clone()),
        ("commits", []) => ShellCommand::View(View::Commits),
        ("branches", []) => ShellCommand::View(View::Branches),
        ("issues", []) => ShellCommand::View(View::Issues),
        ("pulls", []) => ShellCommand::View(View::Pulls),
        ("contributors", []) => ShellCommand::View(View::Contributors),
        ("latest", []) => ShellCommand::View(View::Latest),
        // Selection size is checked when the view runs
        ("compare", selected) => ShellCommand::View(View::Compare(selected.to_vec())),
        ("file", [path, reference]) => ShellCommand::View(View::File {
            path: path.clone(),
            reference: reference.clone(),
        }),
        ("review", []) => ShellCommand::View(View::Review { limit: None }),
        ("review", [limit]) => match limit.parse() {
            Ok(limit) => ShellCommand::View(View::Review { limit: Some(limit) }),
            Err(_) => ShellCommand::Unknown(line.trim().to_string()),
        },
        ("help", _) | ("?", _) => ShellCommand::Help,
        ("quit", _) | ("exit", _) => ShellCommand::Quit,
        _ => ShellCommand::Unknown(line.trim().to_string()),
    }
}

pub async fn run(token: Option<String>, output: Output, config: Config) -> anyhow::Result<()> {
    let mut session: Option<Session> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);

    loop {
        print!("repolens> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => break,
            ShellCommand::Unknown(input) => println!("Unknown command: {} (try help)", input),
            ShellCommand::Open(url) => {
                let result = match session.take() {
                    Some(mut current) => {
                        let switched = current.switch(&url, token.clone(), &config);
                        session = Some(current);
                        switched
                    }
                    None => Session::open(&url, token.clone(), &config).map(|opened| {
                        session = Some(opened);
                        true
                    }),
                };

                match (result, session.as_ref()) {
                    (Err(e), _) => println!("{}", e),
                    (Ok(false), Some(current)) => println!("Already on {}", current.repo()),
                    (Ok(true), Some(current)) => println!(
                        "Repository: {} (token {})",
                        current.repo(),
                        token.as_deref().map(mask_token).unwrap_or_else(|| "none".to_string())
                    ),
                    (Ok(_), None) => {}
                }
            }
            ShellCommand::View(view) => match session.as_ref() {
                Some(current) => {
                    // A failing view must not end the session
                    if let Err(e) = views::run(current, &view, &output, &config).await {
                        println!("{}", e);
                    }
                }
                None => println!("Open a repository first: open <url>"),
            },
        }
    }

    Ok(())
}
