use tracing::{info, warn};

use super::record::SubmissionRecord;
use super::tables::{data_rows, TableKind};

/// A README split into plain text and marker-delimited table sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(String),
    /// `body` is everything between the open and close markers.
    Section { kind: TableKind, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

struct Span {
    kind: TableKind,
    start: usize,
    body_start: usize,
    body_end: usize,
    end: usize,
}

impl Document {
    /// Locate each table's first open marker and the first close marker after it.
    /// A pair that is missing, or that overlaps an earlier section, stays plain text.
    pub fn parse(text: &str) -> Self {
        let mut spans: Vec<Span> = TableKind::ALL
            .iter()
            .filter_map(|&kind| find_span(text, kind))
            .collect();
        spans.sort_by_key(|s| s.start);

        let mut blocks = Vec::new();
        let mut pos = 0;
        for span in spans {
            if span.start < pos {
                warn!(section = span.kind.title(), "Section markers overlap another section, ignoring");
                continue;
            }
            if span.start > pos {
                blocks.push(Block::Text(text[pos..span.start].to_string()));
            }
            blocks.push(Block::Section {
                kind: span.kind,
                body: text[span.body_start..span.body_end].to_string(),
            });
            pos = span.end;
        }
        if pos < text.len() {
            blocks.push(Block::Text(text[pos..].to_string()));
        }

        Document { blocks }
    }

    pub fn section(&self, kind: TableKind) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Section { kind: k, body } if *k == kind => Some(body.as_str()),
            _ => None,
        })
    }

    /// Rows currently stored in a section, `None` if the section is absent.
    pub fn rows(&self, kind: TableKind) -> Option<Vec<String>> {
        self.section(kind).map(|body| data_rows(kind, body))
    }

    /// Merge the record into every section present. Returns the tables touched.
    pub fn apply(&mut self, record: &SubmissionRecord) -> Vec<TableKind> {
        let mut updated = Vec::new();
        for block in &mut self.blocks {
            if let Block::Section { kind, body } = block {
                *body = format!("\n{}\n", kind.merge(body, record));
                updated.push(*kind);
            }
        }
        for kind in TableKind::ALL {
            if !updated.contains(&kind) {
                info!(section = kind.title(), "Section markers not found, skipping");
            }
        }
        updated
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Text(t) => out.push_str(t),
                Block::Section { kind, body } => {
                    out.push_str(kind.open_marker());
                    out.push_str(body);
                    out.push_str(kind.close_marker());
                }
            }
        }
        out
    }
}

fn find_span(text: &str, kind: TableKind) -> Option<Span> {
    let start = text.find(kind.open_marker())?;
    let body_start = start + kind.open_marker().len();
    let body_end = body_start + text[body_start..].find(kind.close_marker())?;
    Some(Span {
        kind,
        start,
        body_start,
        body_end,
        end: body_end + kind.close_marker().len(),
    })
}

// ── Tests ──
