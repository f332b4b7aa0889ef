use std::path::Path;

use super::text::{heading_title, parse_heading, push_tags};
use crate::model::note::{MeetingNote, document_name};

/// A child note still collecting body lines.
#[derive(Debug)]
struct OpenNote {
    start_line: usize,
    heading: String,
    tags: Vec<String>,
    body: Vec<String>,
}

#[derive(Debug)]
enum ScanState {
    OutsideParent,
    InParent,
    InChild(OpenNote),
}

/// What a single line means to the scan, given the parent level.
enum LineKind<'a> {
    Parent,
    /// Same-or-higher level heading that is not the parent.
    Sibling,
    Child(&'a str),
    Other,
}

fn classify<'a>(line: &'a str, parent_heading: &str, parent_level: usize) -> LineKind<'a> {
    if line.trim() == parent_heading {
        return LineKind::Parent;
    }
    match parse_heading(line) {
        Some(h) if h.level <= parent_level => LineKind::Sibling,
        Some(h) if h.level == parent_level + 1 => LineKind::Child(h.text),
        _ => LineKind::Other,
    }
}

/// Parse every child heading under `parent_heading` into a [`MeetingNote`].
///
/// The parent line must equal `parent_heading` after trimming both. A missing
/// parent yields no notes.
pub fn parse_section(path: &Path, lines: &[&str], parent_heading: &str) -> Vec<MeetingNote> {
    let parent_heading = parent_heading.trim();
    let Some(parent) = parse_heading(parent_heading) else {
        tracing::warn!("configured parent heading {parent_heading:?} is not a markdown heading");
        return Vec::new();
    };

    let date_key = document_name(path);
    let finish = |open: OpenNote, end_line: usize| MeetingNote {
        path: path.to_path_buf(),
        heading: open.heading,
        start_line: open.start_line,
        end_line,
        tags: open.tags,
        body: open.body.join("\n"),
        date_key: date_key.clone(),
    };

    let mut notes = Vec::new();
    let mut state = ScanState::OutsideParent;

    for (idx, &line) in lines.iter().enumerate() {
        let kind = classify(line, parent_heading, parent.level);
        state = match (state, kind) {
            (ScanState::OutsideParent, LineKind::Parent) => ScanState::InParent,
            (ScanState::OutsideParent, _) => ScanState::OutsideParent,

            (ScanState::InChild(open), LineKind::Parent) => {
                notes.push(finish(open, idx));
                ScanState::InParent
            }
            (ScanState::InChild(open), LineKind::Sibling) => {
                notes.push(finish(open, idx));
                ScanState::OutsideParent
            }
            (ScanState::InChild(open), LineKind::Child(text)) => {
                notes.push(finish(open, idx));
                ScanState::InChild(open_note(idx, text))
            }
            (ScanState::InChild(mut open), LineKind::Other) => {
                push_tags(&mut open.tags, line);
                open.body.push(line.to_string());
                ScanState::InChild(open)
            }

            (ScanState::InParent, LineKind::Parent) => ScanState::InParent,
            (ScanState::InParent, LineKind::Sibling) => ScanState::OutsideParent,
            (ScanState::InParent, LineKind::Child(text)) => {
                ScanState::InChild(open_note(idx, text))
            }
            (ScanState::InParent, LineKind::Other) => ScanState::InParent,
        };
    }

    if let ScanState::InChild(open) = state {
        notes.push(finish(open, lines.len()));
    }

    notes
}

fn open_note(start_line: usize, heading_text: &str) -> OpenNote {
    let mut tags = Vec::new();
    push_tags(&mut tags, heading_text);
    OpenNote {
        start_line,
        heading: heading_title(heading_text),
        tags,
        body: Vec::new(),
    }
}
