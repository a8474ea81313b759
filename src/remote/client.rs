use anyhow::{anyhow, Context, Result};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::debug;
use uuid::Uuid;

use crate::checklist::{parse_checklist, ChecklistDefinition};
use crate::completion::{CompletionSink, NewCompletion};
use crate::config::RemoteConfig;

/// Environment variable holding the API bearer token
pub const ENV_TOKEN_VAR: &str = "CHECKLIST_API_TOKEN";

/// Read the API token from CHECKLIST_API_TOKEN.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    match std::env::var(ENV_TOKEN_VAR) {
        Ok(val) => {
            let trimmed = val.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// JSON-over-HTTP client for the checklist service
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    attempts: usize,
}

/// Create a client for the configured remote
pub fn create_client(config: &RemoteConfig, token: Option<String>) -> Result<RemoteClient> {
    let base_url = Url::parse(config.base_url())
        .with_context(|| format!("Invalid remote base URL '{}'", config.base_url))?;
    if base_url.cannot_be_a_base() {
        anyhow::bail!("Remote base URL '{}' cannot have paths appended", config.base_url);
    }

    let http = reqwest::Client::builder()
        .timeout(config.timeout()?)
        .user_agent(concat!("checklist-engine/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    Ok(RemoteClient {
        http,
        base_url,
        token,
        attempts: config.retries().max(1),
    })
}

/// Body returned by the create call
#[derive(Debug, Deserialize)]
struct CreatedRecord {
    #[serde(alias = "_id")]
    id: String,
}

/// The remote could not be reached at all, as opposed to answering with an error
#[derive(Debug, thiserror::Error)]
pub enum RemoteUnreachable {
    #[error("Request to {0} timed out. Check your network connection.")]
    Timeout(Url),
    #[error("Could not connect to {0}: {1}")]
    Connect(Url, reqwest::Error),
    #[error("Network error talking to {0}: {1}")]
    Network(Url, reqwest::Error),
}

/// True if the request failed before the remote gave any answer
pub fn is_unreachable(error: &anyhow::Error) -> bool {
    error.downcast_ref::<RemoteUnreachable>().is_some()
}

#[derive(Debug)]
enum RequestError {
    Transport(reqwest::Error),
    Status(StatusCode, String),
}

impl RequestError {
    /// Only connection problems, throttling and server errors are worth another attempt
    fn is_retryable(&self) -> bool {
        match self {
            RequestError::Transport(e) => !e.is_builder() && !e.is_decode(),
            RequestError::Status(status, _) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }

    fn into_error(self, url: &Url) -> anyhow::Error {
        match self {
            RequestError::Transport(e) if e.is_builder() => {
                anyhow!("Invalid request to {}: {}", url, e)
            }
            RequestError::Transport(e) if e.is_timeout() => {
                RemoteUnreachable::Timeout(url.clone()).into()
            }
            RequestError::Transport(e) if e.is_connect() => {
                RemoteUnreachable::Connect(url.clone(), e).into()
            }
            RequestError::Transport(e) => RemoteUnreachable::Network(url.clone(), e).into(),
            RequestError::Status(status, _)
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                anyhow!(
                    "Authentication failed (HTTP {}). Check {}.",
                    status.as_u16(),
                    ENV_TOKEN_VAR
                )
            }
            RequestError::Status(StatusCode::NOT_FOUND, _) => {
                anyhow!("Not found: {} (HTTP 404)", url)
            }
            RequestError::Status(status, body) if status.is_client_error() => {
                anyhow!("Request rejected (HTTP {}): {}", status.as_u16(), summarize(&body))
            }
            RequestError::Status(status, _) => {
                anyhow!("Server error (HTTP {}) from {}", status.as_u16(), url)
            }
        }
    }
}

/// First line of a response body, shortened for error messages
fn summarize(body: &str) -> String {
    let line = body.lines().next().unwrap_or("").trim();
    let mut chars = line.chars();
    let short: String = chars.by_ref().take(200).collect();
    if chars.next().is_some() {
        format!("{}...", short)
    } else {
        short
    }
}

impl RemoteClient {
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Remote base URL cannot have paths appended"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        // Exponential backoff; the first attempt is not counted as a retry
        ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(self.attempts.saturating_sub(1))
    }

    /// Send a request, retrying transient failures, and return the body of a 2xx response
    async fn send<F>(&self, url: &Url, build: F) -> Result<String>
    where
        F: Fn(&reqwest::Client, Url) -> reqwest::RequestBuilder,
    {
        let action = || {
            // Rebuilt per attempt; a sent RequestBuilder is consumed
            let mut request = build(&self.http, url.clone());
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            async move {
                let response = request.send().await.map_err(RequestError::Transport)?;
                let status = response.status();
                // Read the body even on failure so error messages can quote it
                let body = response.text().await.map_err(RequestError::Transport)?;
                debug!(status = status.as_u16(), bytes = body.len(), "remote response");
                if status.is_success() {
                    Ok(body)
                } else {
                    Err(RequestError::Status(status, body))
                }
            }
        };

        RetryIf::spawn(self.retry_strategy(), action, RequestError::is_retryable)
            .await
            .map_err(|e| e.into_error(url))
    }

    /// Fetch a checklist definition by id (`GET {base}/checklists/{id}`)
    pub async fn fetch_checklist(&self, id: &str) -> Result<ChecklistDefinition> {
        let url = self.endpoint(&["checklists", id])?;
        debug!(%url, "fetching checklist");

        let body = self.send(&url, |http, url| http.get(url)).await?;
        let definition = parse_checklist(&body)
            .with_context(|| format!("Checklist '{}' from {} is invalid", id, url))?;

        // Drafts and the cache are keyed by the requested id
        if definition.id != id {
            anyhow::bail!(
                "Remote returned checklist '{}' when '{}' was requested",
                definition.id,
                id
            );
        }

        Ok(definition)
    }

    /// Create a completion (`POST {base}/checklists/{id}/completions`)
    ///
    /// All attempts share one idempotency key so a retried request cannot
    /// create a second record.
    pub async fn create_completion(&self, completion: &NewCompletion) -> Result<String> {
        let url = self.endpoint(&["checklists", &completion.checklist_id, "completions"])?;
        let idempotency_key = Uuid::new_v4().to_string();
        debug!(%url, %idempotency_key, "posting completion");

        let body = self
            .send(&url, |http, url| {
                http.post(url)
                    .header("Idempotency-Key", idempotency_key.as_str())
                    .json(completion)
            })
            .await?;

        let created: CreatedRecord = serde_json::from_str(&body)
            .context("Failed to parse create response: expected a JSON object with an id")?;
        Ok(created.id)
    }
}

impl CompletionSink for RemoteClient {
    async fn create(&self, completion: &NewCompletion) -> Result<String> {
        self.create_completion(completion).await
    }
}
