// ============================================================================
// MARKDOWN DOMAIN MODELS
// ============================================================================
// These types describe a note after it has been split into lines and
// classified. They are plain data: no I/O, no API types.

/// One line of the input file with its line terminator removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Zero-based position of the line in the file.
    pub index: usize,
    pub content: String,
}

impl SourceLine {
    /// Splits raw note text into numbered lines.
    ///
    /// Handles both `\n` and `\r\n` endings and drops a leading UTF-8 BOM,
    /// which some editors write at the start of markdown files.
    pub fn split(input: &str) -> Vec<SourceLine> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);

        input
            .lines()
            .enumerate()
            .map(|(index, content)| SourceLine {
                index,
                content: content.to_string(),
            })
            .collect()
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Which kind of marker introduced a list item.
///
/// The marker picks the bullet preset for the whole list run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    /// `-` or `*`
    Bullet,
    /// `1.`, `2.`, ...
    Numbered,
    /// `- [ ]` or `- [x]`
    Checkbox,
}

/// What a block is, plus the data that only makes sense for that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `#` to `######`; level is 1..=6.
    Heading { level: u8 },
    /// Depth 0 is a top-level item; each `INDENT_WIDTH` columns adds one.
    ListItem { depth: usize, marker: ListMarker },
    /// Content after the footer marker line. Rendered in the footer segment.
    Footer,
    Paragraph,
}

/// A classified unit of the note, with its markers stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Index of the source line this block came from.
    pub line: usize,
    pub kind: BlockKind,
    pub text: String,
}

impl Block {
    pub fn heading(line: usize, level: u8, text: impl Into<String>) -> Self {
        Self {
            line,
            kind: BlockKind::Heading { level },
            text: text.into(),
        }
    }

    pub fn list_item(
        line: usize,
        depth: usize,
        marker: ListMarker,
        text: impl Into<String>,
    ) -> Self {
        Self {
            line,
            kind: BlockKind::ListItem { depth, marker },
            text: text.into(),
        }
    }

    pub fn footer(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            kind: BlockKind::Footer,
            text: text.into(),
        }
    }

    pub fn paragraph(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            kind: BlockKind::Paragraph,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_handles_crlf_and_bom() {
        let lines = SourceLine::split("\u{feff}# Title\r\nbody\r\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].content, "# Title");
        assert_eq!(lines[1].content, "body");
        assert_eq!(lines[1].index, 1);
    }

    #[test]
    fn test_blank_line_detection() {
        let lines = SourceLine::split("text\n   \n\t\n");
        assert!(!lines[0].is_blank());
        assert!(lines[1].is_blank());
        assert!(lines[2].is_blank());
    }
}
