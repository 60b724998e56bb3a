use std::cmp::Ordering;

use tracing::warn;

use super::record::SubmissionRecord;

/// Rows kept per table after every update.
pub const MAX_ROWS: usize = 20;
/// Rendered width of the avatar inside the player cell, matching the fetched size.
const AVATAR_WIDTH: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    RecentPlays,
    Leaderboard,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::RecentPlays, TableKind::Leaderboard];

    pub fn title(self) -> &'static str {
        match self {
            TableKind::RecentPlays => "Recent Plays",
            TableKind::Leaderboard => "Leaderboard",
        }
    }

    pub fn open_marker(self) -> &'static str {
        match self {
            TableKind::RecentPlays => "<!-- Recent Plays -->",
            TableKind::Leaderboard => "<!-- Leaderboard -->",
        }
    }

    pub fn close_marker(self) -> &'static str {
        match self {
            TableKind::RecentPlays => "<!-- /Recent Plays -->",
            TableKind::Leaderboard => "<!-- /Leaderboard -->",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            TableKind::RecentPlays => "| Date | Player | Message | Score | Difficulty | Result |",
            TableKind::Leaderboard => "| Score | Difficulty | Player | Message | Date |",
        }
    }

    pub fn separator(self) -> &'static str {
        match self {
            TableKind::RecentPlays => "|------|--------|---------|-------|------------|--------|",
            TableKind::Leaderboard => "|-------|------------|--------|---------|------|",
        }
    }

    pub fn format_row(self, record: &SubmissionRecord) -> String {
        let player = player_cell(record);
        let message = escape_cell(&record.message);
        let date = escape_cell(&record.date);
        match self {
            TableKind::RecentPlays => format!(
                "| {} | {} | {} | {} | {} | {} |",
                date, player, message, record.score, record.difficulty, record.outcome
            ),
            TableKind::Leaderboard => format!(
                "| {} | {} | {} | {} | {} |",
                record.score, record.difficulty, player, message, date
            ),
        }
    }

    /// Merge `record` into the current section body and return the new table text
    /// (header, separator, then at most `MAX_ROWS` data rows).
    pub fn merge(self, body: &str, record: &SubmissionRecord) -> String {
        let mut rows = data_rows(self, body);
        let row = self.format_row(record);
        match self {
            // Most recent first; older rows keep whatever order they had.
            TableKind::RecentPlays => rows.insert(0, row),
            TableKind::Leaderboard => {
                rows.push(row);
                rank_rows(&mut rows);
            }
        }
        rows.truncate(MAX_ROWS);
        self.render(&rows)
    }

    pub fn render(self, rows: &[String]) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(self.header());
        lines.push(self.separator());
        lines.extend(rows.iter().map(String::as_str));
        lines.join("\n")
    }
}

/// Data rows held in a section body. Non-table lines, the header row and the
/// separator row are not data.
pub fn data_rows(kind: TableKind, body: &str) -> Vec<String> {
    let table_lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('|'))
        .collect();

    let after_header = match table_lines.iter().position(|l| is_separator(l)) {
        Some(i) => &table_lines[i + 1..],
        None => &table_lines[..],
    };

    after_header
        .iter()
        .filter(|l| !is_separator(l) && !is_header(kind, l))
        .map(|l| l.to_string())
        .collect()
}

fn is_separator(line: &str) -> bool {
    let cells = split_cells(line);
    !cells.is_empty()
        && cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

fn is_header(kind: TableKind, line: &str) -> bool {
    split_cells(line) == split_cells(kind.header())
}

/// Split a row into trimmed cell values, honouring `\|` escapes.
pub fn split_cells(row: &str) -> Vec<String> {
    let inner = row.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('\\');
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// `[<img .../> Name](link)`, the avatar image immediately followed by the name.
fn player_cell(record: &SubmissionRecord) -> String {
    let name = escape_cell(&record.player_name);
    let link = escape_cell(&record.player_link);
    if record.avatar_url.is_empty() {
        return format!("[{}]({})", name, link);
    }
    format!(
        "[<img src=\"{}\" alt=\"{}\" width=\"{}\" /> {}]({})",
        escape_cell(&record.avatar_url),
        escape_cell(&record.author_login),
        AVATAR_WIDTH,
        name,
        link
    )
}

/// Keep user text inside a single cell of a single line. Angle brackets are
/// entity-escaped so no section marker can appear inside a row.
fn escape_cell(text: &str) -> String {
    text.trim()
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

struct RankKey {
    score: Option<i64>,
    date: String,
}

/// Score is the first cell, the date the last one.
fn rank_key(row: &str) -> RankKey {
    let cells = split_cells(row);
    let score = cells.first().and_then(|c| c.parse::<i64>().ok());
    if score.is_none() {
        warn!(row = %row, "Leaderboard row has no numeric score, ranking it last");
    }
    RankKey {
        score,
        date: cells.last().cloned().unwrap_or_default(),
    }
}

/// Score descending, then date text descending. Rows without a numeric score
/// rank below every scored row.
fn compare_keys(a: &RankKey, b: &RankKey) -> Ordering {
    let by_date = || b.date.cmp(&a.date);
    match (a.score, b.score) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(by_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_date(),
    }
}

fn rank_rows(rows: &mut Vec<String>) {
    let mut keyed: Vec<(RankKey, String)> = rows
        .drain(..)
        .map(|row| (rank_key(&row), row))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b));
    rows.extend(keyed.into_iter().map(|(_, row)| row));
}

// ── Tests ──
