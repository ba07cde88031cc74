// =============================================================================
// GOOGLE DOCS BATCH UPDATE REQUESTS
// =============================================================================
//
// Serde model of the subset of the Docs API `Request` union we emit.
// Serializing a `Request` produces exactly the JSON object the
// `documents.batchUpdate` endpoint expects, e.g.
//
// ```text
// {"insertText": {"location": {"index": 1}, "text": "Title\n"}}
// ```
//
// All indices are UTF-16 code units, which is how the Docs API counts.

use serde::Serialize;

/// A single batchUpdate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText(InsertTextRequest),
    UpdateParagraphStyle(UpdateParagraphStyleRequest),
    UpdateTextStyle(UpdateTextStyleRequest),
    CreateParagraphBullets(CreateParagraphBulletsRequest),
    DeleteParagraphBullets(DeleteParagraphBulletsRequest),
    CreateFooter(CreateFooterRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    pub index: usize,
}

/// Half-open `[start_index, end_index)` span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    pub start_index: usize,
    pub end_index: usize,
}

impl Range {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            segment_id: None,
            start_index,
            end_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NamedStyleType {
    #[serde(rename = "NORMAL_TEXT")]
    NormalText,
    #[serde(rename = "HEADING_1")]
    Heading1,
    #[serde(rename = "HEADING_2")]
    Heading2,
    #[serde(rename = "HEADING_3")]
    Heading3,
    #[serde(rename = "HEADING_4")]
    Heading4,
    #[serde(rename = "HEADING_5")]
    Heading5,
    #[serde(rename = "HEADING_6")]
    Heading6,
}

impl NamedStyleType {
    /// Maps a markdown heading level to its Docs style. Levels outside 1..=6
    /// are clamped, though the classifier never produces them.
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => Self::Heading1,
            2 => Self::Heading2,
            3 => Self::Heading3,
            4 => Self::Heading4,
            5 => Self::Heading5,
            _ => Self::Heading6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub named_style_type: NamedStyleType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyleRequest {
    pub range: Range,
    pub paragraph_style: ParagraphStyle,
    /// Field mask naming which style fields to overwrite.
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyleRequest {
    pub range: Range,
    pub text_style: TextStyle,
    pub fields: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulletPreset {
    BulletDiscCircleSquare,
    BulletCheckbox,
    NumberedDecimalAlphaRoman,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParagraphBulletsRequest {
    pub range: Range,
    pub bullet_preset: BulletPreset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParagraphBulletsRequest {
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderFooterType {
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateFooterRequest {
    #[serde(rename = "type")]
    pub footer_type: HeaderFooterType,
}

impl Request {
    pub fn insert_text(index: usize, text: impl Into<String>) -> Self {
        Request::InsertText(InsertTextRequest {
            location: Location {
                segment_id: None,
                index,
            },
            text: text.into(),
        })
    }

    pub fn paragraph_style(range: Range, style: NamedStyleType) -> Self {
        Request::UpdateParagraphStyle(UpdateParagraphStyleRequest {
            range,
            paragraph_style: ParagraphStyle {
                named_style_type: style,
            },
            fields: "namedStyleType".to_string(),
        })
    }

    pub fn bold(range: Range) -> Self {
        Request::UpdateTextStyle(UpdateTextStyleRequest {
            range,
            text_style: TextStyle { bold: true },
            fields: "bold".to_string(),
        })
    }

    pub fn bullets(range: Range, preset: BulletPreset) -> Self {
        Request::CreateParagraphBullets(CreateParagraphBulletsRequest {
            range,
            bullet_preset: preset,
        })
    }

    /// Clears any list membership, e.g. bullets copied from the paragraph
    /// the text was inserted in front of.
    pub fn remove_bullets(range: Range) -> Self {
        Request::DeleteParagraphBullets(DeleteParagraphBulletsRequest { range })
    }

    pub fn create_default_footer() -> Self {
        Request::CreateFooter(CreateFooterRequest {
            footer_type: HeaderFooterType::Default,
        })
    }

    /// Moves this request into another segment (header, footer, footnote).
    ///
    /// Requests are built against the body; footer requests only learn their
    /// segment id once the footer exists in the document.
    pub fn in_segment(mut self, segment_id: &str) -> Self {
        let segment = Some(segment_id.to_string());
        match &mut self {
            Request::InsertText(req) => req.location.segment_id = segment,
            Request::UpdateParagraphStyle(req) => req.range.segment_id = segment,
            Request::UpdateTextStyle(req) => req.range.segment_id = segment,
            Request::CreateParagraphBullets(req) => req.range.segment_id = segment,
            Request::DeleteParagraphBullets(req) => req.range.segment_id = segment,
            Request::CreateFooter(_) => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_text_json_shape() {
        let value = serde_json::to_value(Request::insert_text(1, "Title\n")).unwrap();
        assert_eq!(
            value,
            json!({"insertText": {"location": {"index": 1}, "text": "Title\n"}})
        );
    }

    #[test]
    fn test_heading_style_json_shape() {
        let request = Request::paragraph_style(Range::new(1, 7), NamedStyleType::heading(2));
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(
            value,
            json!({
                "updateParagraphStyle": {
                    "range": {"startIndex": 1, "endIndex": 7},
                    "paragraphStyle": {"namedStyleType": "HEADING_2"},
                    "fields": "namedStyleType"
                }
            })
        );
    }

    #[test]
    fn test_bullets_and_footer_json_shape() {
        let bullets = Request::bullets(Range::new(1, 10), BulletPreset::NumberedDecimalAlphaRoman);
        assert_eq!(
            serde_json::to_value(bullets).unwrap(),
            json!({
                "createParagraphBullets": {
                    "range": {"startIndex": 1, "endIndex": 10},
                    "bulletPreset": "NUMBERED_DECIMAL_ALPHA_ROMAN"
                }
            })
        );
        assert_eq!(
            serde_json::to_value(Request::create_default_footer()).unwrap(),
            json!({"createFooter": {"type": "DEFAULT"}})
        );
    }

    #[test]
    fn test_remove_bullets_json_shape() {
        assert_eq!(
            serde_json::to_value(Request::remove_bullets(Range::new(5, 7))).unwrap(),
            json!({"deleteParagraphBullets": {"range": {"startIndex": 5, "endIndex": 7}}})
        );
    }

    #[test]
    fn test_in_segment_sets_segment_id() {
        let insert = Request::insert_text(0, "footer").in_segment("kix.f1");
        assert_eq!(
            serde_json::to_value(insert).unwrap(),
            json!({"insertText": {"location": {"segmentId": "kix.f1", "index": 0}, "text": "footer"}})
        );

        let bold = Request::bold(Range::new(0, 3)).in_segment("kix.f1");
        assert_eq!(
            serde_json::to_value(bold).unwrap()["updateTextStyle"]["range"]["segmentId"],
            json!("kix.f1")
        );
    }
}
