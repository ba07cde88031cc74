// The session trait is the seam between the conversion logic and the remote
// Docs API. The core layer only talks to `DocsSession`; the infra layer
// provides the HTTP implementation.

use async_trait::async_trait;
use thiserror::Error;

use super::docs_requests::Request;

/// Errors raised while talking to the document service.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Document {0} not found")]
    NotFound(String),
    #[error("Google Docs API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Request to Google Docs failed: {0}")]
    Transport(String),
    #[error("Unexpected response from Google Docs: {0}")]
    InvalidResponse(String),
}

/// The parts of a document the conversion cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSummary {
    pub document_id: String,
    pub title: String,
    pub default_footer_id: Option<String>,
    pub footer_ids: Vec<String>,
}

impl DocumentSummary {
    /// The footer new footer text should go into: the default footer if the
    /// document has one, otherwise the first footer listed.
    pub fn footer_id(&self) -> Option<&str> {
        self.default_footer_id
            .as_deref()
            .or_else(|| self.footer_ids.first().map(String::as_str))
    }

    pub fn edit_url(&self) -> String {
        document_url(&self.document_id)
    }
}

/// Result of a batchUpdate call. Each reply lines up with the request at the
/// same position; most are empty objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchUpdateReply {
    pub replies: Vec<serde_json::Value>,
}

impl BatchUpdateReply {
    /// Footer id from a `createFooter` reply, if the batch contained one.
    pub fn created_footer_id(&self) -> Option<String> {
        self.replies.iter().find_map(|reply| {
            reply
                .get("createFooter")
                .and_then(|f| f.get("footerId"))
                .and_then(|id| id.as_str())
                .map(str::to_string)
        })
    }
}

/// An authenticated channel to the document service.
#[async_trait]
pub trait DocsSession: Send + Sync {
    async fn create_document(&self, title: &str) -> Result<DocumentSummary, SessionError>;

    async fn get_document(&self, document_id: &str) -> Result<DocumentSummary, SessionError>;

    /// Applies all requests atomically: the service either applies the whole
    /// batch or rejects it.
    async fn batch_update(
        &self,
        document_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateReply, SessionError>;
}

pub fn document_url(document_id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit", document_id)
}

/// Extracts the document ID from a Google Docs URL, or accepts a bare ID.
pub fn parse_document_id(url_or_id: &str) -> Option<String> {
    let url_or_id = url_or_id.trim();
    if url_or_id.contains("docs.google.com") {
        if let Some(start) = url_or_id.find("/document/d/") {
            let after_d = &url_or_id[start + 12..];
            let end = after_d
                .find(|c: char| c == '/' || c == '?' || c == '#')
                .unwrap_or(after_d.len());
            let id = &after_d[..end];
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    } else if !url_or_id.is_empty() && !url_or_id.contains('/') && !url_or_id.contains(' ') {
        return Some(url_or_id.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_document_id_from_url() {
        let url = "https://docs.google.com/document/d/1abc123xyz/edit";
        assert_eq!(parse_document_id(url), Some("1abc123xyz".to_string()));

        let url = "https://docs.google.com/document/d/1abc123xyz?usp=sharing";
        assert_eq!(parse_document_id(url), Some("1abc123xyz".to_string()));
    }

    #[test]
    fn test_parse_document_id_from_id() {
        assert_eq!(
            parse_document_id(" 1abc123xyz "),
            Some("1abc123xyz".to_string())
        );
    }

    #[test]
    fn test_parse_document_id_rejects_garbage() {
        assert_eq!(parse_document_id(""), None);
        assert_eq!(parse_document_id("not an id"), None);
        assert_eq!(parse_document_id("https://example.com/doc"), None);
        assert_eq!(parse_document_id("https://docs.google.com/document/d/"), None);
    }

    #[test]
    fn test_footer_id_prefers_default() {
        let summary = DocumentSummary {
            document_id: "doc".to_string(),
            title: "t".to_string(),
            default_footer_id: Some("kix.default".to_string()),
            footer_ids: vec!["kix.other".to_string(), "kix.default".to_string()],
        };
        assert_eq!(summary.footer_id(), Some("kix.default"));

        let summary = DocumentSummary {
            default_footer_id: None,
            ..summary
        };
        assert_eq!(summary.footer_id(), Some("kix.other"));
    }

    #[test]
    fn test_created_footer_id_from_reply() {
        let reply = BatchUpdateReply {
            replies: vec![json!({}), json!({"createFooter": {"footerId": "kix.new"}})],
        };
        assert_eq!(reply.created_footer_id(), Some("kix.new".to_string()));
        assert_eq!(BatchUpdateReply::default().created_footer_id(), None);
    }
}
