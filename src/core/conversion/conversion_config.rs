// Run configuration, read from environment variables (a `.env` file is
// loaded by `main` first). Configuration only picks which session gets
// built and where the note goes; it never changes how a note is parsed.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use super::conversion_service::DocumentTarget;
use crate::core::docs::parse_document_id;

pub const NOTE_PATH_VAR: &str = "NOTE_PATH";
pub const RUN_MODE_VAR: &str = "NOTE_RUN_MODE";
pub const CREDENTIALS_FILE_VAR: &str = "GOOGLE_CREDENTIALS_FILE";
pub const TOKEN_CACHE_VAR: &str = "GOOGLE_TOKEN_CACHE";
pub const DOCUMENT_ID_VAR: &str = "GOOGLE_DOC_ID";
pub const DOCUMENT_TITLE_VAR: &str = "NOTE_DOC_TITLE";
pub const DRY_RUN_VAR: &str = "NOTE_DRY_RUN";
/// Presence of a service-account key (inline or by path) implies a hosted run.
pub const SERVICE_ACCOUNT_JSON_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";
/// Path to a service-account key file, overriding the credentials file.
pub const SERVICE_ACCOUNT_KEY_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";

const DEFAULT_NOTE_PATH: &str = "note.md";
const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
const DEFAULT_TOKEN_CACHE: &str = "token.json";
const DEFAULT_DOCUMENT_TITLE: &str = "New Note";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// How credentials are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Interactive OAuth consent in a browser, token cached on disk.
    Local,
    /// Headless service account (notebooks, CI, servers).
    Hosted,
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "local" => Ok(RunMode::Local),
            "hosted" => Ok(RunMode::Hosted),
            _ => Err(ConfigError::InvalidValue {
                key: RUN_MODE_VAR,
                value: value.to_string(),
                expected: "'local' or 'hosted'",
            }),
        }
    }
}

/// Where a hosted run reads its service-account key from.
#[derive(Clone, PartialEq, Eq)]
pub enum ServiceAccountKey {
    /// Key JSON passed directly in the environment.
    Inline(String),
    File(PathBuf),
}

// The inline key holds a private key; keep it out of logs.
impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAccountKey::Inline(_) => f.write_str("Inline(<redacted>)"),
            ServiceAccountKey::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    pub note_path: PathBuf,
    pub run_mode: RunMode,
    /// OAuth client secrets in local mode, service-account key in hosted mode.
    pub credentials_path: PathBuf,
    pub token_cache_path: PathBuf,
    /// Key source for hosted runs: inline JSON, then an explicit key path,
    /// then the credentials file.
    pub service_account_key: ServiceAccountKey,
    pub target: DocumentTarget,
    /// Print the request plan instead of calling the API.
    pub dry_run: bool,
}

impl ConversionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let run_mode = match var(RUN_MODE_VAR) {
            Some(value) => value.parse()?,
            None if var(SERVICE_ACCOUNT_JSON_VAR).is_some()
                || var(SERVICE_ACCOUNT_KEY_VAR).is_some() =>
            {
                RunMode::Hosted
            }
            None => RunMode::Local,
        };

        let target = match var(DOCUMENT_ID_VAR) {
            Some(value) => {
                let document_id =
                    parse_document_id(&value).ok_or_else(|| ConfigError::InvalidValue {
                        key: DOCUMENT_ID_VAR,
                        value: value.clone(),
                        expected: "a document ID or docs.google.com URL",
                    })?;
                DocumentTarget::Existing(document_id)
            }
            None => DocumentTarget::CreateNew {
                title: var(DOCUMENT_TITLE_VAR)
                    .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string()),
            },
        };

        let credentials_path: PathBuf = var(CREDENTIALS_FILE_VAR)
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string())
            .into();

        let service_account_key = match (
            var(SERVICE_ACCOUNT_JSON_VAR),
            var(SERVICE_ACCOUNT_KEY_VAR),
        ) {
            (Some(json), _) => ServiceAccountKey::Inline(json),
            (None, Some(path)) => ServiceAccountKey::File(path.into()),
            (None, None) => ServiceAccountKey::File(credentials_path.clone()),
        };

        let dry_run = match var(DRY_RUN_VAR) {
            Some(value) => parse_flag(DRY_RUN_VAR, &value)?,
            None => false,
        };

        Ok(Self {
            note_path: var(NOTE_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_NOTE_PATH.to_string())
                .into(),
            run_mode,
            credentials_path,
            token_cache_path: var(TOKEN_CACHE_VAR)
                .unwrap_or_else(|| DEFAULT_TOKEN_CACHE.to_string())
                .into(),
            service_account_key,
            target,
            dry_run,
        })
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}
