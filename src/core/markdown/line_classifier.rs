// =============================================================================
// MARKDOWN LINE CLASSIFIER
// =============================================================================
//
// Turns the lines of a note into blocks. Supported syntax:
//
//   # Heading            (1 to 6 `#`, then whitespace)
//   - item / * item      (bullet list, 2 columns of indentation per level)
//   1. item              (numbered list)
//   - [ ] task           (checkbox list)
//   ---                  (footer marker: everything after it is footer text)
//   anything else        (paragraph)
//
// Blank lines are dropped. The classifier never fails: a line that looks
// almost like a marker but isn't (`#NoSpace`, `-item`) becomes a paragraph.

use once_cell::sync::Lazy;
use regex::Regex;

use super::markdown_models::{Block, ListMarker, SourceLine};

/// Columns of indentation per list nesting level. A tab counts as one level.
pub const INDENT_WIDTH: usize = 2;

/// Minimum number of dashes on a line for it to start the footer.
const FOOTER_MARKER_MIN_DASHES: usize = 3;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("heading regex is valid"));

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)(?:([-*])|(\d+)\.)[ \t]+(?:(\[[ xX]\])(?:[ \t]+|$))?(.*)$")
        .expect("list regex is valid")
});

/// Classifies already-split lines.
///
/// Output order always follows input order. Calling this twice on the same
/// lines gives the same blocks.
pub fn classify(lines: &[SourceLine]) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(lines.len());
    let mut in_footer = false;

    for line in lines {
        if line.is_blank() {
            continue;
        }

        let content = line.content.trim_end();

        if in_footer {
            blocks.push(Block::footer(line.index, content.trim()));
            continue;
        }

        if is_footer_marker(content) {
            in_footer = true;
            continue;
        }

        blocks.push(classify_line(line.index, content));
    }

    blocks
}

/// Splits and classifies raw note text.
pub fn classify_text(input: &str) -> Vec<Block> {
    classify(&SourceLine::split(input))
}

fn is_footer_marker(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.len() >= FOOTER_MARKER_MIN_DASHES && trimmed.chars().all(|c| c == '-')
}

fn classify_line(index: usize, content: &str) -> Block {
    if let Some(caps) = HEADING.captures(content) {
        let level = caps[1].len() as u8;
        return Block::heading(index, level, caps[2].trim());
    }

    if let Some(caps) = LIST_ITEM.captures(content) {
        let depth = indent_columns(&caps[1]) / INDENT_WIDTH;
        let marker = if caps.get(4).is_some() {
            ListMarker::Checkbox
        } else if caps.get(3).is_some() {
            ListMarker::Numbered
        } else {
            ListMarker::Bullet
        };
        return Block::list_item(index, depth, marker, caps[5].trim());
    }

    Block::paragraph(index, content.trim())
}

fn indent_columns(indent: &str) -> usize {
    indent
        .chars()
        .map(|c| if c == '\t' { INDENT_WIDTH } else { 1 })
        .sum()
}
