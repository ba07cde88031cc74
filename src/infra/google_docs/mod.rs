// =============================================================================
// GOOGLE DOCS MODULE
// =============================================================================
//
// Everything that talks to Google lives here: the Docs REST client and the
// two ways of getting an access token for it.
//
// **Architecture:**
// This module lives in the infra layer because it handles external I/O
// (HTTP requests to Google APIs). The core layer only knows the
// `DocsSession` trait - it doesn't care how requests reach the document.
//
// **Authentication Options:**
// 1. **Installed-app OAuth** (local runs): browser consent once, then a
//    cached refresh token
// 2. **Service Account** (hosted runs): no browser, key from env or file

pub mod google_docs_client;
pub mod installed_app_auth;
pub mod service_account_auth;

pub use google_docs_client::{DocsAuth, GoogleDocsClient};
pub use installed_app_auth::InstalledAppAuth;
pub use service_account_auth::ServiceAccountAuth;

/// Read/write access to Google Docs.
pub const DOCUMENTS_SCOPE: &str = "https://www.googleapis.com/auth/documents";
