//! Loading the master keyword table from a file or over HTTP.
//!
//! Fetches go through [`fetch_text`], which retries transient failures
//! (timeouts, connection errors, 429, 5xx) with exponential backoff and gives
//! up immediately on other 4xx responses. Any failure surfaces as
//! [`CategorizeError::MasterTableUnavailable`].

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CategorizeError;
use crate::keywords::MasterKeywordTable;

/// CSV export of the shared categorization sheet
pub const DEFAULT_MASTER_URL: &str =
    "https://docs.google.com/spreadsheets/d/1I_Fz3slHP1mnfsKKgAFl54tKvqlo65Ug/export?format=csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasterSource {
    Path(PathBuf),
    Url(String),
}

impl MasterSource {
    /// URLs start with a scheme; anything else is a local path
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            MasterSource::Url(s.to_string())
        } else {
            MasterSource::Path(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for MasterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MasterSource::Path(p) => write!(f, "{}", p.display()),
            MasterSource::Url(u) => f.write_str(u),
        }
    }
}

/// Timeout and retry budget for remote loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Per-request timeout
    pub timeout: Duration,
    /// Total attempts, including the first
    pub attempts: u32,
    /// Delay before the first retry; doubles after each retry
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

pub async fn load_master_table(source: &MasterSource, policy: &FetchPolicy) -> Result<MasterKeywordTable, CategorizeError> {
    let table = match source {
        MasterSource::Path(path) => MasterKeywordTable::from_csv_path(path)
            .map_err(|e| CategorizeError::MasterTableUnavailable(format!("{}: {e}", path.display())))?,
        MasterSource::Url(url) => {
            let body = fetch_text(url, policy).await?;
            MasterKeywordTable::from_csv_reader(body.as_bytes())
                .map_err(|e| CategorizeError::MasterTableUnavailable(format!("{url}: {e}")))?
        }
    };

    if table.is_empty() {
        return Err(CategorizeError::MasterTableUnavailable(format!("{source}: no keyword rows")));
    }
    info!(source = %source, rows = table.len(), "keyword table loaded");
    Ok(table)
}

/// GET a URL as text with bounded retries
pub async fn fetch_text(url: &str, policy: &FetchPolicy) -> Result<String, CategorizeError> {
    let client = reqwest::Client::builder()
        .timeout(policy.timeout)
        .connect_timeout(policy.timeout.min(Duration::from_secs(10)))
        .build()
        .map_err(|e| CategorizeError::MasterTableUnavailable(e.to_string()))?;

    let attempts = policy.attempts.max(1);
    let mut last_error = String::from("no attempts made");

    for attempt in 1..=attempts {
        if attempt > 1 {
            let delay = policy.backoff * 2u32.pow(attempt - 2);
            warn!("  retry {}/{} in {delay:?}...", attempt - 1, attempts - 1);
            tokio::time::sleep(delay).await;
        }

        match client.get(url).send().await {
            Err(e) => {
                last_error = e.to_string();
                if !is_transient(&e) {
                    break;
                }
                warn!("  transient error: {e}");
            }
            Ok(response) => {
                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    warn!("  HTTP {status}");
                    last_error = format!("HTTP {status}");
                    continue;
                }
                if status.is_client_error() {
                    return Err(CategorizeError::MasterTableUnavailable(format!("{url}: HTTP {status}")));
                }
                match response.text().await {
                    Ok(body) => return Ok(body),
                    Err(e) => {
                        warn!("  body read failed: {e}");
                        last_error = e.to_string();
                    }
                }
            }
        }
    }

    Err(CategorizeError::MasterTableUnavailable(format!(
        "{url}: {last_error} after {attempts} attempt(s)"
    )))
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}
