//! OAuth 2.0 installed-app flow for local runs.
//!
//! Uses an OAuth client file downloaded from Google Cloud Console
//! (`credentials.json`, with an `installed` or `web` section). The first run
//! opens a consent URL and catches the redirect on a loopback port; the
//! resulting tokens are cached in a JSON file so later runs only refresh.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use super::DOCUMENTS_SCOPE;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// How long to wait for the browser to come back from the consent page.
const CONSENT_TIMEOUT: StdDuration = StdDuration::from_secs(5 * 60);

/// Seconds of validity a token must have left to be reused.
const EXPIRY_MARGIN_SECS: i64 = 60;

const REDIRECT_PAGE: &str = "<html><body><h3>Authorization complete.</h3>\
    <p>You can close this window and return to the terminal.</p></body></html>";

#[derive(Debug, Clone, Deserialize)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
    #[serde(default = "default_auth_uri")]
    auth_uri: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    fn from_json(json: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| format!("Invalid OAuth client file: {}", e))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "OAuth client file has neither an 'installed' nor a 'web' section".into())
    }
}

/// Token cache file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now + Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// Refresh responses usually omit the refresh token; keep the old one.
    fn into_stored(self, previous_refresh: Option<&str>, now: DateTime<Utc>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at: now + Duration::seconds(self.expires_in.unwrap_or(3600)),
        }
    }
}

/// What the browser sent back to the loopback listener.
#[derive(Debug, Default, PartialEq, Eq)]
struct AuthorizationRedirect {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl AuthorizationRedirect {
    fn is_oauth_callback(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }

    fn into_code(self, expected_state: &str) -> Result<String, String> {
        if let Some(error) = self.error {
            return Err(format!("Authorization was denied: {}", error));
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err("Authorization redirect had a mismatched state parameter".to_string());
        }
        self.code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| "Authorization redirect carried no code".to_string())
    }
}

/// Parses the request line of an HTTP request (`GET /?code=...&state=... HTTP/1.1`).
fn parse_redirect_request(request: &str) -> Result<AuthorizationRedirect, String> {
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(|| "Malformed HTTP request on redirect listener".to_string())?;

    let url = Url::parse(&format!("http://127.0.0.1{}", target))
        .map_err(|e| format!("Malformed redirect target '{}': {}", target, e))?;

    let mut redirect = AuthorizationRedirect::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => redirect.code = Some(value.into_owned()),
            "state" => redirect.state = Some(value.into_owned()),
            "error" => redirect.error = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(redirect)
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

async fn load_token_cache(path: &Path) -> Option<StoredToken> {
    let content = tokio::fs::read_to_string(path).await.ok()?;
    match serde_json::from_str(&content) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::warn!("Ignoring unreadable token cache {}: {}", path.display(), e);
            None
        }
    }
}

async fn save_token_cache(
    path: &Path,
    token: &StoredToken,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, serde_json::to_string_pretty(token)?).await?;
    tracing::debug!("Saved OAuth token to {}", path.display());
    Ok(())
}

/// Authenticator for interactive local use.
pub struct InstalledAppAuth {
    secrets: ClientSecrets,
    token_cache_path: PathBuf,
    client: Client,
    cached_token: RwLock<Option<StoredToken>>,
}

impl InstalledAppAuth {
    /// Loads the OAuth client file and any previously cached token.
    pub async fn from_files(
        credentials_path: &Path,
        token_cache_path: &Path,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let content = tokio::fs::read_to_string(credentials_path)
            .await
            .map_err(|e| {
                format!(
                    "Failed to read OAuth client file {}: {}",
                    credentials_path.display(),
                    e
                )
            })?;
        let secrets = ClientSecrets::from_json(&content)?;
        let cached = load_token_cache(token_cache_path).await;

        Ok(Self {
            secrets,
            token_cache_path: token_cache_path.to_path_buf(),
            client: Client::new(),
            cached_token: RwLock::new(cached),
        })
    }

    /// Gets a valid access token: cached, refreshed, or freshly authorized.
    pub async fn get_access_token(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        let existing = {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_fresh(Utc::now()) {
                    return Ok(token.access_token.clone());
                }
            }
            cached.clone()
        };

        let token = match existing.and_then(|t| t.refresh_token) {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(token) => token,
                Err(e) => {
                    tracing::warn!("Token refresh failed, re-authorizing: {}", e);
                    self.authorize_interactive().await?
                }
            },
            None => self.authorize_interactive().await?,
        };

        save_token_cache(&self.token_cache_path, &token).await?;
        let access_token = token.access_token.clone();
        *self.cached_token.write().await = Some(token);

        Ok(access_token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<StoredToken, Box<dyn Error + Send + Sync>> {
        tracing::info!("Access token expired, refreshing...");

        let response = self
            .client
            .post(&self.secrets.token_uri)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(format!("Token refresh failed ({}): {}", status, text).into());
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(token_response.into_stored(Some(refresh_token), Utc::now()))
    }

    fn consent_url(
        &self,
        redirect_uri: &str,
        state: &str,
    ) -> Result<Url, Box<dyn Error + Send + Sync>> {
        let url = Url::parse_with_params(
            &self.secrets.auth_uri,
            &[
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", DOCUMENTS_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )?;
        Ok(url)
    }

    /// Runs the browser consent flow with a one-shot loopback listener.
    async fn authorize_interactive(&self) -> Result<StoredToken, Box<dyn Error + Send + Sync>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
        let state = random_state();
        let consent_url = self.consent_url(&redirect_uri, &state)?;

        println!("\n📋 Please visit this URL to authorize access to Google Docs:\n");
        println!("{}\n", consent_url);
        println!("Waiting for the browser to redirect to {} ...", redirect_uri);

        let code = wait_for_code(&listener, &state, CONSENT_TIMEOUT).await?;

        println!("Exchanging code for token...");

        let response = self
            .client
            .post(&self.secrets.token_uri)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(format!("Token exchange failed ({}): {}", status, text).into());
        }

        let token_response: TokenResponse = response.json().await?;
        println!("✅ Authorized");
        Ok(token_response.into_stored(None, Utc::now()))
    }
}

/// Accepts connections until the OAuth callback arrives or `timeout` runs out.
async fn wait_for_code(
    listener: &TcpListener,
    expected_state: &str,
    timeout: StdDuration,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let redirect = tokio::time::timeout(timeout, accept_callback(listener))
        .await
        .map_err(|_| {
            format!(
                "Timed out after {}s waiting for the authorization redirect",
                timeout.as_secs()
            )
        })?;

    Ok(redirect.into_code(expected_state)?)
}

/// A failing connection is skipped, not fatal: browsers open speculative
/// connections and ask for favicons alongside the real redirect.
async fn accept_callback(listener: &TcpListener) -> AuthorizationRedirect {
    loop {
        let (mut stream, _) = match listener.accept().await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::debug!("Failed to accept redirect listener connection: {}", e);
                continue;
            }
        };
        let mut buffer = vec![0u8; 8192];
        let read = match stream.read(&mut buffer).await {
            Ok(read) => read,
            Err(e) => {
                tracing::debug!("Dropping redirect listener connection: {}", e);
                continue;
            }
        };
        let request = String::from_utf8_lossy(&buffer[..read]);

        let redirect = match parse_redirect_request(&request) {
            Ok(redirect) if redirect.is_oauth_callback() => redirect,
            _ => {
                if let Err(e) = stream
                    .write_all(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n")
                    .await
                {
                    tracing::debug!("Failed to answer stray request: {}", e);
                }
                continue;
            }
        };

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            REDIRECT_PAGE.len(),
            REDIRECT_PAGE
        );
        if let Err(e) = stream.write_all(response.as_bytes()).await {
            tracing::debug!("Failed to send the completion page: {}", e);
        }
        stream.shutdown().await.ok();

        return redirect;
    }
}
