use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Every field a submission issue can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    GithubLink,
    Message,
    Score,
    Date,
    Mode,
    Win,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::GithubLink => "githubLink",
            Field::Message => "message",
            Field::Score => "score",
            Field::Date => "date",
            Field::Mode => "mode",
            Field::Win => "win",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which part of the issue a rule reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Body,
    Title,
}

struct FieldRule {
    field: Field,
    source: Source,
    pattern: Regex,
}

fn rule(field: Field, source: Source, pattern: &str) -> FieldRule {
    FieldRule {
        field,
        source,
        pattern: Regex::new(pattern).unwrap(),
    }
}

// Body fields end at the next "- " list item (issue template layout) or at the end of the text.
// Title numbers are captured loosely so that a non-numeric token reaches the record builder.
static RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        rule(Field::Name, Source::Body, r"Name:[ \t]*([^\n]*)"),
        rule(Field::GithubLink, Source::Body, r"GitHub Profile Link:[ \t]*([^\n]*)"),
        rule(Field::Message, Source::Body, r"(?s)Message:[ \t]*(.*?)(?:\n[ \t]*-|\z)"),
        rule(Field::Score, Source::Title, r"Score:\s*([^,\s]+)"),
        rule(Field::Date, Source::Title, r"Game Result Submission:\s*(.*?)\s*-\s*Score:"),
        rule(Field::Mode, Source::Title, r"Mode:\s*([^,\s]+)"),
        rule(Field::Win, Source::Title, r"Win:\s*([^,\s]+)"),
    ]
});

/// Placeholder GitHub issue forms write for an unanswered input.
const NO_RESPONSE: &str = "_No response_";

/// Values pulled out of one issue. A field missing from the map was absent.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    values: HashMap<Field, String>,
}

impl ExtractedFields {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

/// Apply every rule to its source text. Never fails: a rule that does not match,
/// or matches only whitespace, leaves its field absent.
pub fn extract_fields(body: &str, title: &str) -> ExtractedFields {
    let mut values = HashMap::new();
    for rule in RULES.iter() {
        let text = match rule.source {
            Source::Body => body,
            Source::Title => title,
        };
        if let Some(value) = capture(&rule.pattern, text) {
            values.insert(rule.field, value);
        }
    }
    ExtractedFields { values }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    let value = re.captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() || value == NO_RESPONSE {
        None
    } else {
        Some(value.to_string())
    }
}

// ── Tests ──
