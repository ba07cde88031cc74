// =============================================================================
// DOCS REQUEST BUILDER
// =============================================================================
//
// Converts classified blocks into the ordered batchUpdate requests that
// rebuild the note inside a Google Doc.
//
// **How the cursor works:**
// Text is appended at a running cursor. Every insert is followed by the
// style requests for the span it just created, then the cursor moves past
// the inserted text. Applied in order against an empty document, the
// requests reproduce the note top to bottom.
//
// **Lists:**
// Consecutive list items with the same bullet preset form a run. Each item
// is inserted with one leading tab per nesting level; when the run ends, a
// single `createParagraphBullets` request covers it. The Docs API turns the
// leading tabs into nesting and deletes them, so the cursor moves back by
// the number of tabs the run inserted.
//
// **Inherited styles:**
// A newline inserted with `insertText` copies the paragraph style and bullets
// of the paragraph it lands in front of. When writing into an existing
// document that is whatever already sits at the top of the body, so every
// inserted paragraph gets an explicit named style, and headings and
// paragraphs also get their bullets removed.
//
// **Footer:**
// Footer blocks go to their own request list with a cursor starting at 0.
// Those requests get their segment id later, once the footer exists.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::docs_requests::{BulletPreset, NamedStyleType, Range, Request};
use crate::core::markdown::{Block, BlockKind, ListMarker};

/// First insertable index of a document body. Index 0 holds the section break.
pub const BODY_START_INDEX: usize = 1;

/// Segments other than the body (headers, footers) start at 0.
const SEGMENT_START_INDEX: usize = 0;

/// `@name:` tags are rendered bold (without the colon).
static INLINE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\w+:").expect("inline tag regex is valid"));

/// Everything needed to write one note into a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionPlan {
    /// Requests for the document body, in application order.
    pub body: Vec<Request>,
    /// Requests for the footer segment, without a segment id.
    pub footer: Vec<Request>,
}

impl ConversionPlan {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.footer.is_empty()
    }

    pub fn has_footer(&self) -> bool {
        !self.footer.is_empty()
    }

    /// The footer requests targeted at a concrete footer segment.
    pub fn footer_in_segment(&self, segment_id: &str) -> Vec<Request> {
        self.footer
            .iter()
            .cloned()
            .map(|request| request.in_segment(segment_id))
            .collect()
    }
}

/// Builds the request plan for a block sequence.
pub fn build(blocks: &[Block]) -> ConversionPlan {
    let mut builder = RequestBuilder::new();
    for block in blocks {
        builder.push(block);
    }
    builder.finish()
}

/// Length of a string as the Docs API measures it.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// An open list waiting for its bullets request.
struct ListRun {
    start: usize,
    preset: BulletPreset,
    tabs: usize,
}

pub struct RequestBuilder {
    body: Vec<Request>,
    footer: Vec<Request>,
    cursor: usize,
    footer_cursor: usize,
    footer_lines: usize,
    list: Option<ListRun>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            footer: Vec::new(),
            cursor: BODY_START_INDEX,
            footer_cursor: SEGMENT_START_INDEX,
            footer_lines: 0,
            list: None,
        }
    }

    pub fn push(&mut self, block: &Block) {
        match block.kind {
            BlockKind::Heading { level } => {
                self.end_list();
                self.insert_paragraph(&block.text, NamedStyleType::heading(level));
            }
            BlockKind::Paragraph => {
                self.end_list();
                self.insert_paragraph(&block.text, NamedStyleType::NormalText);
            }
            BlockKind::ListItem { depth, marker } => {
                self.insert_list_item(depth, marker, &block.text);
            }
            BlockKind::Footer => {
                self.end_list();
                self.insert_footer_line(&block.text);
            }
        }
    }

    pub fn finish(mut self) -> ConversionPlan {
        self.end_list();
        ConversionPlan {
            body: self.body,
            footer: self.footer,
        }
    }

    fn insert_paragraph(&mut self, text: &str, style: NamedStyleType) {
        let start = self.cursor;
        let line = format!("{}\n", text);
        let len = utf16_len(&line);
        let span = Range::new(start, start + len);

        self.body.push(Request::insert_text(start, line));
        self.body.push(Request::paragraph_style(span.clone(), style));
        self.body.push(Request::remove_bullets(span));
        bold_inline_tags(&mut self.body, text, start);

        self.cursor += len;
    }

    fn insert_list_item(&mut self, depth: usize, marker: ListMarker, text: &str) {
        let preset = bullet_preset(marker);
        if self.list.as_ref().is_some_and(|run| run.preset != preset) {
            self.end_list();
        }

        let start = self.cursor;
        let run = self.list.get_or_insert(ListRun {
            start,
            preset,
            tabs: 0,
        });
        run.tabs += depth;

        let line = format!("{}{}\n", "\t".repeat(depth), text);
        let len = utf16_len(&line);

        self.body.push(Request::insert_text(start, line));
        // Bullets come from the run's own request; the style must not be
        // inherited from the surrounding document.
        self.body.push(Request::paragraph_style(
            Range::new(start, start + len),
            NamedStyleType::NormalText,
        ));
        bold_inline_tags(&mut self.body, text, start + depth);

        self.cursor += len;
    }

    fn insert_footer_line(&mut self, text: &str) {
        let start = self.footer_cursor;
        // The footer segment already ends with a newline, so lines are
        // joined rather than terminated.
        let (line, text_offset) = if self.footer_lines == 0 {
            (text.to_string(), 0)
        } else {
            (format!("\n{}", text), 1)
        };
        let len = utf16_len(&line);

        self.footer.push(Request::insert_text(start, line));
        bold_inline_tags(&mut self.footer, text, start + text_offset);

        self.footer_cursor += len;
        self.footer_lines += 1;
    }

    fn end_list(&mut self) {
        if let Some(run) = self.list.take() {
            self.body
                .push(Request::bullets(Range::new(run.start, self.cursor), run.preset));
            self.cursor -= run.tabs;
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn bullet_preset(marker: ListMarker) -> BulletPreset {
    match marker {
        ListMarker::Bullet => BulletPreset::BulletDiscCircleSquare,
        ListMarker::Numbered => BulletPreset::NumberedDecimalAlphaRoman,
        ListMarker::Checkbox => BulletPreset::BulletCheckbox,
    }
}

fn bold_inline_tags(requests: &mut Vec<Request>, text: &str, text_start: usize) {
    for tag in INLINE_TAG.find_iter(text) {
        let start = text_start + utf16_len(&text[..tag.start()]);
        // Drop the trailing ':' from the bold span.
        let end = start + utf16_len(&tag.as_str()[..tag.as_str().len() - 1]);
        requests.push(Request::bold(Range::new(start, end)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markdown::classify_text;

    fn plan(input: &str) -> ConversionPlan {
        build(&classify_text(input))
    }

    #[test]
    fn test_end_to_end_requests() {
        let plan = plan("# Title\n\nSome body text\n- item one\n- item two\n");
        assert_eq!(
            plan.body,
            vec![
                Request::insert_text(1, "Title\n"),
                Request::paragraph_style(Range::new(1, 7), NamedStyleType::Heading1),
                Request::remove_bullets(Range::new(1, 7)),
                Request::insert_text(7, "Some body text\n"),
                Request::paragraph_style(Range::new(7, 22), NamedStyleType::NormalText),
                Request::remove_bullets(Range::new(7, 22)),
                Request::insert_text(22, "item one\n"),
                Request::paragraph_style(Range::new(22, 31), NamedStyleType::NormalText),
                Request::insert_text(31, "item two\n"),
                Request::paragraph_style(Range::new(31, 40), NamedStyleType::NormalText),
                Request::bullets(Range::new(22, 40), BulletPreset::BulletDiscCircleSquare),
            ]
        );
        assert!(plan.footer.is_empty());
    }

    #[test]
    fn test_nested_list_tabs_are_compensated() {
        let plan = plan("- parent\n  - child\nafter");
        assert_eq!(
            plan.body,
            vec![
                Request::insert_text(1, "parent\n"),
                Request::paragraph_style(Range::new(1, 8), NamedStyleType::NormalText),
                Request::insert_text(8, "\tchild\n"),
                Request::paragraph_style(Range::new(8, 15), NamedStyleType::NormalText),
                Request::bullets(Range::new(1, 15), BulletPreset::BulletDiscCircleSquare),
                // One tab removed by the bullets request.
                Request::insert_text(14, "after\n"),
                Request::paragraph_style(Range::new(14, 20), NamedStyleType::NormalText),
                Request::remove_bullets(Range::new(14, 20)),
            ]
        );
    }

    #[test]
    fn test_every_paragraph_overrides_inherited_style() {
        // Text inserted at the top of an existing document picks up the style
        // and bullets of whatever paragraph was there first.
        let plan = plan("- a\n  - b\n# H\n");
        assert_eq!(
            plan.body,
            vec![
                Request::insert_text(1, "a\n"),
                Request::paragraph_style(Range::new(1, 3), NamedStyleType::NormalText),
                Request::insert_text(3, "\tb\n"),
                Request::paragraph_style(Range::new(3, 6), NamedStyleType::NormalText),
                Request::bullets(Range::new(1, 6), BulletPreset::BulletDiscCircleSquare),
                Request::insert_text(5, "H\n"),
                Request::paragraph_style(Range::new(5, 7), NamedStyleType::Heading1),
                Request::remove_bullets(Range::new(5, 7)),
            ]
        );
    }

    #[test]
    fn test_preset_change_splits_list_runs() {
        let plan = plan("- a\n1. b");
        assert_eq!(
            plan.body,
            vec![
                Request::insert_text(1, "a\n"),
                Request::paragraph_style(Range::new(1, 3), NamedStyleType::NormalText),
                Request::bullets(Range::new(1, 3), BulletPreset::BulletDiscCircleSquare),
                Request::insert_text(3, "b\n"),
                Request::paragraph_style(Range::new(3, 5), NamedStyleType::NormalText),
                Request::bullets(Range::new(3, 5), BulletPreset::NumberedDecimalAlphaRoman),
            ]
        );
    }

    #[test]
    fn test_checkbox_list_preset() {
        let plan = plan("- [ ] task");
        assert_eq!(
            plan.body.last(),
            Some(&Request::bullets(
                Range::new(1, 6),
                BulletPreset::BulletCheckbox
            ))
        );
    }

    #[test]
    fn test_inline_tags_are_bold() {
        let plan = plan("@owner: Bob and @due: Friday");
        assert_eq!(plan.body[3], Request::bold(Range::new(1, 7)));
        assert_eq!(plan.body[4], Request::bold(Range::new(17, 21)));
    }

    #[test]
    fn test_inline_tag_offset_skips_list_tabs() {
        let plan = plan("  - @due: x");
        assert_eq!(plan.body[0], Request::insert_text(1, "\t@due: x\n"));
        assert_eq!(plan.body[2], Request::bold(Range::new(2, 6)));
    }

    #[test]
    fn test_indices_are_utf16() {
        let plan = plan("# Café 𝄞\nnext");
        // "Café 𝄞\n" is 8 UTF-16 units: the clef takes two.
        assert_eq!(
            plan.body[1],
            Request::paragraph_style(Range::new(1, 9), NamedStyleType::Heading1)
        );
        assert_eq!(plan.body[3], Request::insert_text(9, "next\n"));
    }

    #[test]
    fn test_footer_has_its_own_cursor() {
        let plan = plan("body\n---\n@owner: me\nsecond");
        assert_eq!(
            plan.body,
            vec![
                Request::insert_text(1, "body\n"),
                Request::paragraph_style(Range::new(1, 6), NamedStyleType::NormalText),
                Request::remove_bullets(Range::new(1, 6)),
            ]
        );
        assert_eq!(
            plan.footer,
            vec![
                Request::insert_text(0, "@owner: me"),
                Request::bold(Range::new(0, 6)),
                Request::insert_text(10, "\nsecond"),
            ]
        );
    }

    #[test]
    fn test_footer_closes_open_list() {
        let plan = plan("- a\n---\nf");
        assert_eq!(
            plan.body,
            vec![
                Request::insert_text(1, "a\n"),
                Request::paragraph_style(Range::new(1, 3), NamedStyleType::NormalText),
                Request::bullets(Range::new(1, 3), BulletPreset::BulletDiscCircleSquare),
            ]
        );
        assert_eq!(plan.footer, vec![Request::insert_text(0, "f")]);
    }

    #[test]
    fn test_footer_in_segment_stamps_every_request() {
        let plan = plan("---\n@a: b");
        let stamped = plan.footer_in_segment("kix.footer");
        assert_eq!(stamped.len(), 2);
        assert_eq!(stamped[0], Request::insert_text(0, "@a: b").in_segment("kix.footer"));
        assert_eq!(stamped[1], Request::bold(Range::new(0, 2)).in_segment("kix.footer"));
    }

    #[test]
    fn test_empty_input_gives_empty_plan() {
        let plan = plan("\n\n   \n");
        assert!(plan.is_empty());
        assert!(!plan.has_footer());
    }
}
