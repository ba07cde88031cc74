// The docs module describes what we send to Google Docs: the request model,
// the builder that produces it, and the session contract that submits it.

pub mod docs_requests;
pub mod docs_session;
pub mod request_builder;

pub use docs_requests::Request;
pub use docs_session::{
    parse_document_id, BatchUpdateReply, DocsSession, DocumentSummary, SessionError,
};
pub use request_builder::{build, ConversionPlan};
