// This is the conversion module - it ties the markdown classifier and the
// request builder to a document session.
// Notice that it never touches HTTP or credentials: the session is handed in
// by `main`, so the same flow runs against Google Docs or a test double.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::docs::{build, ConversionPlan, DocsSession, DocumentSummary, Request, SessionError};
use crate::core::markdown::classify_text;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Failed to read note {}: {}", .path.display(), .source)]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to submit document changes: {0}")]
    Submission(#[from] SessionError),
}

/// Where the converted note should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentTarget {
    /// Insert at the top of an existing document.
    Existing(String),
    CreateNew { title: String },
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub document: DocumentSummary,
    pub created: bool,
    pub body_requests: usize,
    pub footer_requests: usize,
}

/// Reads a note from disk. Fails before any API call is made.
pub async fn read_note(path: &Path) -> Result<String, ConversionError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConversionError::Input {
            path: path.to_path_buf(),
            source,
        })
}

/// Classifies a note and builds its requests. Pure; used for dry runs too.
pub fn plan_note(markdown: &str) -> ConversionPlan {
    build(&classify_text(markdown))
}

pub struct ConversionService<S: DocsSession> {
    session: S,
}

impl<S: DocsSession> ConversionService<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Writes a note into the target document.
    ///
    /// The body and the footer are submitted as separate batches, since the
    /// footer segment may have to be created first. Any rejected batch ends
    /// the run; nothing is retried.
    pub async fn convert(
        &self,
        markdown: &str,
        target: &DocumentTarget,
    ) -> Result<ConversionReport, ConversionError> {
        let plan = plan_note(markdown);
        if plan.is_empty() {
            tracing::warn!("Note has no content; the document will be left unchanged");
        }
        tracing::debug!(
            body_requests = plan.body.len(),
            footer_requests = plan.footer.len(),
            "Built request plan"
        );

        let (document, created) = self.resolve_target(target).await?;

        if !plan.body.is_empty() {
            self.session
                .batch_update(&document.document_id, &plan.body)
                .await?;
            tracing::info!(
                "Wrote {} body request(s) to {}",
                plan.body.len(),
                document.document_id
            );
        }

        let mut footer_requests = 0;
        if plan.has_footer() {
            let footer_id = self.ensure_footer(&document).await?;
            let requests = plan.footer_in_segment(&footer_id);
            self.session
                .batch_update(&document.document_id, &requests)
                .await?;
            footer_requests = requests.len();
            tracing::info!("Wrote {} footer request(s) to {}", footer_requests, footer_id);
        }

        Ok(ConversionReport {
            document,
            created,
            body_requests: plan.body.len(),
            footer_requests,
        })
    }

    async fn resolve_target(
        &self,
        target: &DocumentTarget,
    ) -> Result<(DocumentSummary, bool), ConversionError> {
        match target {
            DocumentTarget::Existing(document_id) => {
                let document = self.session.get_document(document_id).await?;
                Ok((document, false))
            }
            DocumentTarget::CreateNew { title } => {
                let document = self.session.create_document(title).await?;
                tracing::info!(
                    "Created document '{}' ({})",
                    document.title,
                    document.document_id
                );
                Ok((document, true))
            }
        }
    }

    /// Returns the id of the footer to write into, creating one if needed.
    async fn ensure_footer(&self, document: &DocumentSummary) -> Result<String, ConversionError> {
        if let Some(footer_id) = document.footer_id() {
            return Ok(footer_id.to_string());
        }

        let reply = self
            .session
            .batch_update(&document.document_id, &[Request::create_default_footer()])
            .await?;

        if let Some(footer_id) = reply.created_footer_id() {
            return Ok(footer_id);
        }

        tracing::warn!("createFooter reply carried no footer id, re-reading document");
        let refreshed = self.session.get_document(&document.document_id).await?;
        refreshed
            .footer_id()
            .map(str::to_string)
            .ok_or_else(|| {
                SessionError::InvalidResponse(format!(
                    "document {} still has no footer after createFooter",
                    document.document_id
                ))
                .into()
            })
    }
}
