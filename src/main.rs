mod github;
mod parser;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use github::{GithubClient, Issue};
use parser::document::Document;
use parser::record::Author;
use parser::tables::TableKind;
use parser::Update;
use settings::Settings;

#[derive(Parser)]
#[command(name = "readme_scoreboard", about = "Update README score tables from game result issues")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a submission issue from GitHub and update the README tables
    Sync {
        /// Issue number (default: ISSUE_NUMBER)
        #[arg(short, long)]
        issue: Option<u64>,
        /// README to update (default: README_PATH or README.md)
        #[arg(short, long)]
        readme: Option<PathBuf>,
        /// Print the new README instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a locally supplied submission through the same pipeline (no network)
    Apply {
        /// Issue title, e.g. "Game Result Submission: 2024-05-01 - Score: 950, Mode: 2, Win: 1"
        #[arg(short, long)]
        title: String,
        /// File holding the issue body text
        #[arg(short, long, conflicts_with = "body")]
        body_file: Option<PathBuf>,
        /// Issue body text
        #[arg(long)]
        body: Option<String>,
        /// Author login
        #[arg(short, long)]
        login: String,
        /// Author profile URL (default: https://github.com/<login>)
        #[arg(long)]
        profile_url: Option<String>,
        /// Author avatar URL (default: GitHub avatar for <login>)
        #[arg(long)]
        avatar_url: Option<String>,
        #[arg(short, long)]
        readme: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the rows currently held in each README table
    Show {
        #[arg(short, long)]
        readme: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command {
        Commands::Sync { issue, readme, dry_run } => {
            let number = issue
                .or(settings.issue_number)
                .context("No issue number: pass --issue or set ISSUE_NUMBER")?;
            let repo = settings.repository()?;
            let client = GithubClient::new(&settings.github_graphql_url, settings.token()?)?;
            let issue = client.fetch_issue(&repo, number).await?;
            if let Some(updated) = issue.updated_at {
                info!(
                    "Issue #{} last updated {}",
                    number,
                    updated.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            let path = readme.unwrap_or(settings.readme_path);
            update_readme(&path, &issue, dry_run)
        }
        Commands::Apply {
            title,
            body_file,
            body,
            login,
            profile_url,
            avatar_url,
            readme,
            dry_run,
        } => {
            let body_text = match body_file {
                Some(p) => std::fs::read_to_string(&p)
                    .with_context(|| format!("Failed to read {}", p.display()))?,
                None => body.unwrap_or_default(),
            };
            let author = Author {
                profile_url: profile_url.unwrap_or_else(|| format!("https://github.com/{login}")),
                avatar_url: avatar_url
                    .unwrap_or_else(|| format!("https://avatars.githubusercontent.com/{login}?size=24")),
                login,
            };
            let issue = Issue {
                title,
                body_text,
                updated_at: None,
                author: Some(author),
            };
            let path = readme.unwrap_or(settings.readme_path);
            update_readme(&path, &issue, dry_run)
        }
        Commands::Show { readme } => {
            let path = readme.unwrap_or(settings.readme_path);
            let text = read_readme(&path)?;
            let doc = Document::parse(&text);
            for kind in TableKind::ALL {
                match doc.rows(kind) {
                    Some(rows) => {
                        println!("{} ({} rows)", kind.title(), rows.len());
                        for (i, row) in rows.iter().enumerate() {
                            println!("{:>3} {}", i + 1, row);
                        }
                    }
                    None => println!("{}: markers not found", kind.title()),
                }
            }
            Ok(())
        }
    }
}

fn read_readme(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read, transform, then write once. A rejected submission never touches the file.
fn update_readme(path: &Path, issue: &Issue, dry_run: bool) -> Result<()> {
    let current = read_readme(path)?;

    match parser::process_submission(issue, &current) {
        Update::Rejected(reason) => {
            warn!("Submission rejected, {} left untouched: {}", path.display(), reason);
            println!("Submission rejected: {}", reason);
        }
        Update::Unchanged(record) => {
            info!(
                "No table sections in {}, nothing to write (score {})",
                path.display(),
                record.score
            );
        }
        Update::Updated { record, tables, document } => {
            let names: Vec<&str> = tables.iter().map(|t| t.title()).collect();
            if dry_run {
                print!("{}", document);
            } else {
                std::fs::write(path, &document)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            info!(
                "Recorded {} ({}, {}, {}) on {} into {}",
                record.player_name,
                record.score,
                record.difficulty,
                record.outcome,
                record.date,
                names.join(", ")
            );
        }
    }
    Ok(())
}

// ── Tests ──
