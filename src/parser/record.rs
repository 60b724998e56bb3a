use std::fmt;

use serde::Deserialize;
use tracing::warn;

use super::fields::{ExtractedFields, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    NotAvailable,
}

impl Difficulty {
    pub fn from_mode(mode: i64) -> Self {
        match mode {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            2 => Difficulty::Hard,
            _ => Difficulty::NotAvailable,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::NotAvailable => "N/A",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    GameOver,
    NotAvailable,
}

impl Outcome {
    pub fn from_win_flag(win: i64) -> Self {
        match win {
            1 => Outcome::Win,
            0 => Outcome::GameOver,
            _ => Outcome::NotAvailable,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Win => "Win",
            Outcome::GameOver => "Game Over",
            Outcome::NotAvailable => "N/A",
        })
    }
}

/// Issue author as reported by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub login: String,
    #[serde(rename = "url")]
    pub profile_url: String,
    #[serde(default)]
    pub avatar_url: String,
}

impl Author {
    /// Stand-in GitHub uses for deleted accounts.
    pub fn ghost() -> Self {
        Author {
            login: "ghost".to_string(),
            profile_url: "https://github.com/ghost".to_string(),
            avatar_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub score: i64,
    pub difficulty: Difficulty,
    pub outcome: Outcome,
    pub date: String,
    pub player_name: String,
    pub player_link: String,
    /// Login of the issue author, used as the avatar's alt text.
    pub author_login: String,
    pub avatar_url: String,
    pub message: String,
}

/// Why an issue produced no record. Any rejection leaves the README untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("required field `{0}` is missing")]
    MissingRequiredField(Field),
    #[error("required field `{field}` is not an integer: {value:?}")]
    NotNumeric { field: Field, value: String },
}

pub fn build_record(fields: &ExtractedFields, author: &Author) -> Result<SubmissionRecord, Rejection> {
    let score = required_int(fields, Field::Score)?;
    let date = required(fields, Field::Date)?.to_string();
    let mode = required_int(fields, Field::Mode)?;
    let win = required_int(fields, Field::Win)?;

    let player_name = fields.get(Field::Name).unwrap_or(author.login.as_str()).to_string();
    let player_link = match fields.get(Field::GithubLink) {
        Some(link) if is_plain_link(link) => link,
        Some(link) => {
            warn!(link = %link, "Ignoring malformed profile link, using the author's profile");
            author.profile_url.as_str()
        }
        None => author.profile_url.as_str(),
    }
    .to_string();
    let message = fields.get(Field::Message).unwrap_or_default().to_string();

    Ok(SubmissionRecord {
        score,
        difficulty: Difficulty::from_mode(mode),
        outcome: Outcome::from_win_flag(win),
        date,
        player_name,
        player_link,
        author_login: author.login.clone(),
        avatar_url: author.avatar_url.clone(),
        message,
    })
}

/// A link target must be a single token that cannot break out of the markdown link or cell.
fn is_plain_link(link: &str) -> bool {
    !link.is_empty()
        && !link
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '|' | '<' | '>' | '(' | ')'))
}

fn required(fields: &ExtractedFields, field: Field) -> Result<&str, Rejection> {
    fields.get(field).ok_or(Rejection::MissingRequiredField(field))
}

fn required_int(fields: &ExtractedFields, field: Field) -> Result<i64, Rejection> {
    let raw = required(fields, field)?;
    raw.parse::<i64>().map_err(|_| Rejection::NotNumeric {
        field,
        value: raw.to_string(),
    })
}

// ── Tests ──
