// =============================================================================
// GOOGLE DOCS CLIENT
// =============================================================================
//
// HTTP implementation of the core `DocsSession` trait on top of the Docs REST
// API (v1). Three calls are all the conversion needs:
//
// - `POST /v1/documents`                      create an empty document
// - `GET  /v1/documents/{id}`                 read title and footer ids
// - `POST /v1/documents/{id}:batchUpdate`     apply a request batch
//
// **Authentication:**
// Every call carries a bearer token from `DocsAuth`, which is either a
// service account (hosted runs) or an installed-app OAuth client (local
// runs). Both cache their token, so one run only authenticates once.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;

use super::installed_app_auth::InstalledAppAuth;
use super::service_account_auth::ServiceAccountAuth;
use crate::core::docs::{BatchUpdateReply, DocsSession, DocumentSummary, Request, SessionError};

const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1/documents";

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// The credential source a client authenticates with.
pub enum DocsAuth {
    ServiceAccount(ServiceAccountAuth),
    InstalledApp(InstalledAppAuth),
}

impl DocsAuth {
    pub async fn get_access_token(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        match self {
            DocsAuth::ServiceAccount(auth) => auth.get_access_token().await,
            DocsAuth::InstalledApp(auth) => auth.get_access_token().await,
        }
    }
}

// =============================================================================
// GOOGLE DOCS API RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDocument {
    document_id: String,
    #[serde(default)]
    title: String,
    /// Footer id -> footer content. Only the ids matter here.
    #[serde(default)]
    footers: HashMap<String, serde_json::Value>,
    document_style: Option<ApiDocumentStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDocumentStyle {
    default_footer_id: Option<String>,
}

impl ApiDocument {
    fn into_summary(self) -> DocumentSummary {
        let mut footer_ids: Vec<String> = self.footers.into_keys().collect();
        footer_ids.sort();

        DocumentSummary {
            document_id: self.document_id,
            title: self.title,
            default_footer_id: self.document_style.and_then(|s| s.default_footer_id),
            footer_ids,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiBatchUpdateBody<'a> {
    requests: &'a [Request],
}

#[derive(Debug, Deserialize)]
struct ApiBatchUpdateResponse {
    #[serde(default)]
    replies: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pulls the human-readable message out of a Google API error body, falling
/// back to the raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Maps a failed response to a session error. A 404 is only reported as
/// `NotFound` when the call addressed a specific document.
fn status_error(status: StatusCode, body: &str, document_id: Option<&str>) -> SessionError {
    if status == StatusCode::NOT_FOUND {
        if let Some(document_id) = document_id {
            return SessionError::NotFound(document_id.to_string());
        }
    }

    let mut message = api_error_message(body);
    if status == StatusCode::FORBIDDEN {
        message.push_str(
            ". Make sure the document is shared with the account you authenticated as.",
        );
    }

    SessionError::Api {
        status: status.as_u16(),
        message,
    }
}

// =============================================================================
// GOOGLE DOCS CLIENT
// =============================================================================

/// Authenticated client for the Google Docs API.
pub struct GoogleDocsClient {
    client: Client,
    auth: DocsAuth,
    base_url: String,
}

impl GoogleDocsClient {
    pub fn new(auth: DocsAuth) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: DOCS_API_BASE.to_string(),
        }
    }

    async fn bearer_token(&self) -> Result<String, SessionError> {
        self.auth
            .get_access_token()
            .await
            .map_err(|e| SessionError::Auth(e.to_string()))
    }

    /// Turns non-success responses into session errors.
    async fn check_status(
        response: Response,
        document_id: Option<&str>,
    ) -> Result<Response, SessionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        Err(status_error(status, &body, document_id))
    }
}

#[async_trait]
impl DocsSession for GoogleDocsClient {
    async fn create_document(&self, title: &str) -> Result<DocumentSummary, SessionError> {
        let token = self.bearer_token().await?;

        tracing::debug!("Creating Google Doc '{}'", title);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(token)
            .json(&json!({ "title": title }))
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let document: ApiDocument = Self::check_status(response, None)
            .await?
            .json()
            .await
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

        Ok(document.into_summary())
    }

    async fn get_document(&self, document_id: &str) -> Result<DocumentSummary, SessionError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/{}", self.base_url, document_id);

        tracing::debug!("Fetching Google Doc {}", document_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let document: ApiDocument = Self::check_status(response, Some(document_id))
            .await?
            .json()
            .await
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

        Ok(document.into_summary())
    }

    async fn batch_update(
        &self,
        document_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateReply, SessionError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/{}:batchUpdate", self.base_url, document_id);

        tracing::debug!(
            "Submitting {} request(s) to Google Doc {}",
            requests.len(),
            document_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&ApiBatchUpdateBody { requests })
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let reply: ApiBatchUpdateResponse = Self::check_status(response, Some(document_id))
            .await?
            .json()
            .await
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;

        Ok(BatchUpdateReply {
            replies: reply.replies,
        })
    }
}
