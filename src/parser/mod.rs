pub mod document;
pub mod fields;
pub mod record;
pub mod tables;

use tracing::debug;

use crate::github::Issue;
use document::Document;
use record::{Rejection, SubmissionRecord};
use tables::TableKind;

/// Result of running one issue against the README text.
#[derive(Debug)]
pub enum Update {
    /// A required field was missing or malformed. The README must not be written.
    Rejected(Rejection),
    /// The record is valid but the README has no table sections.
    Unchanged(SubmissionRecord),
    Updated {
        record: SubmissionRecord,
        tables: Vec<TableKind>,
        document: String,
    },
}

/// Issue text → fields → record → merged tables → new README text.
pub fn process_submission(issue: &Issue, readme: &str) -> Update {
    let fields = fields::extract_fields(&issue.body_text, &issue.title);
    debug!(?fields, "Extracted issue fields");

    let record = match record::build_record(&fields, &issue.author()) {
        Ok(r) => r,
        Err(reason) => return Update::Rejected(reason),
    };

    let mut doc = Document::parse(readme);
    let tables = doc.apply(&record);
    if tables.is_empty() {
        return Update::Unchanged(record);
    }

    Update::Updated {
        record,
        tables,
        document: doc.render(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::fields::Field;
    use crate::parser::record::Author;

    const BODY: &str = "👤 Name: Alice\n- 🔗 GitHub Profile Link: https://github.com/alice\n- 💬 Message: gg\n-";

    fn issue(title: &str, body: &str) -> Issue {
        Issue {
            title: title.to_string(),
            body_text: body.to_string(),
            updated_at: None,
            author: Some(Author {
                login: "alice-gh".to_string(),
                profile_url: "https://github.com/alice-gh".to_string(),
                avatar_url: "https://avatars.githubusercontent.com/u/1?s=24".to_string(),
            }),
        }
    }

    fn readme() -> String {
        std::fs::read_to_string("tests/fixtures/README.md").unwrap()
    }

    #[test]
    fn example_scenario() {
        let issue = issue("Game Result Submission: 2024-05-01 - Score: 950, Mode: 2, Win: 1", BODY);
        let Update::Updated { record, tables, document } = process_submission(&issue, &readme()) else {
            panic!("expected an update");
        };
        assert_eq!(record.score, 950);
        assert_eq!(record.player_name, "Alice");
        assert_eq!(tables.len(), 2);

        let doc = Document::parse(&document);
        let board = doc.rows(TableKind::Leaderboard).unwrap();
        let expected = "| 950 | Hard | [<img src=\"https://avatars.githubusercontent.com/u/1?s=24\" alt=\"alice-gh\" width=\"24\" /> Alice](https://github.com/alice) | gg | 2024-05-01 |";
        assert_eq!(board[1], expected);

        let recent = doc.rows(TableKind::RecentPlays).unwrap();
        assert_eq!(
            recent[0],
            "| 2024-05-01 | [<img src=\"https://avatars.githubusercontent.com/u/1?s=24\" alt=\"alice-gh\" width=\"24\" /> Alice](https://github.com/alice) | gg | 950 | Hard | Win |"
        );
    }

    #[test]
    fn rejection_produces_no_document() {
        let titles = [
            "Game Result Submission: 2024-05-01 - Score: 950, Mode: 2",
            "Game Result Submission: 2024-05-01 - Score: 950, Win: 1",
            "Score: 950, Mode: 2, Win: 1",
            "Game Result Submission: 2024-05-01 - Mode: 2, Win: 1",
        ];
        for title in titles {
            assert!(
                matches!(process_submission(&issue(title, BODY), &readme()), Update::Rejected(_)),
                "title: {title}"
            );
        }
    }

    #[test]
    fn rejection_names_the_field() {
        let update = process_submission(
            &issue("Game Result Submission: 2024-05-01 - Score: 950, Mode: 2", BODY),
            &readme(),
        );
        assert!(matches!(
            update,
            Update::Rejected(Rejection::MissingRequiredField(Field::Win))
        ));
    }

    #[test]
    fn author_fallbacks_reach_the_table() {
        let issue = issue("Game Result Submission: 2024-05-02 - Score: 1, Mode: 0, Win: 0", "");
        let Update::Updated { document, .. } = process_submission(&issue, &readme()) else {
            panic!("expected an update");
        };
        let recent = Document::parse(&document).rows(TableKind::RecentPlays).unwrap();
        assert!(recent[0].contains("alice-gh](https://github.com/alice-gh)"));
        assert!(recent[0].ends_with("|  | 1 | Easy | Game Over |"));
    }

    #[test]
    fn deleted_author_uses_ghost() {
        let mut issue = issue("Game Result Submission: 2024-05-02 - Score: 3, Mode: 1, Win: 1", "");
        issue.author = None;
        let Update::Updated { record, .. } = process_submission(&issue, &readme()) else {
            panic!("expected an update");
        };
        assert_eq!(record.player_name, "ghost");
        assert_eq!(record.player_link, "https://github.com/ghost");
    }

    #[test]
    fn readme_without_sections_is_unchanged() {
        let issue = issue("Game Result Submission: 2024-05-01 - Score: 950, Mode: 2, Win: 1", BODY);
        assert!(matches!(
            process_submission(&issue, "# Nothing to see\n"),
            Update::Unchanged(_)
        ));
    }

    #[test]
    fn repeated_updates_stay_bounded() {
        let mut text = readme();
        for i in 0..30 {
            let title = format!("Game Result Submission: 2024-06-{:02} - Score: {}, Mode: 1, Win: 1", i % 28 + 1, i * 37 % 1000);
            match process_submission(&issue(&title, BODY), &text) {
                Update::Updated { document, .. } => text = document,
                other => panic!("unexpected {other:?}"),
            }
        }
        let doc = Document::parse(&text);
        assert_eq!(doc.rows(TableKind::RecentPlays).unwrap().len(), tables::MAX_ROWS);
        let board = doc.rows(TableKind::Leaderboard).unwrap();
        assert_eq!(board.len(), tables::MAX_ROWS);
        let scores: Vec<i64> = board
            .iter()
            .map(|r| tables::split_cells(r)[0].parse().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn marker_in_message_does_not_leak_into_next_update() {
        let close = TableKind::RecentPlays.close_marker();
        let first = issue(
            "Game Result Submission: 2024-05-01 - Score: 10, Mode: 1, Win: 1",
            &format!("Name: mallory\n- Message: hi {close} bye\n-"),
        );
        let Update::Updated { document, .. } = process_submission(&first, &readme()) else {
            panic!("expected an update");
        };
        let second = issue("Game Result Submission: 2024-05-02 - Score: 20, Mode: 1, Win: 1", BODY);
        let Update::Updated { document, .. } = process_submission(&second, &document) else {
            panic!("expected an update");
        };

        for kind in TableKind::ALL {
            assert_eq!(document.matches(kind.open_marker()).count(), 1);
            assert_eq!(document.matches(kind.close_marker()).count(), 1);
        }
        let doc = Document::parse(&document);
        let recent = doc.rows(TableKind::RecentPlays).unwrap();
        assert_eq!(recent.len(), 5);
        assert!(recent[1].contains("hi &lt;!-- /Recent Plays --&gt; bye"));
        assert_eq!(doc.rows(TableKind::Leaderboard).unwrap().len(), 6);
    }
}
