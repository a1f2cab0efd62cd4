//! Target store HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Two endpoints:
//! matrix load and bulk upsert. Requests are single-shot: the engine
//! forbids automatic retry, so a failed save stays failed until the
//! operator resubmits.

use std::time::Duration;

use targetgrid_fiscal::FiscalPeriod;
use targetgrid_protocol::{BulkUpsertRequest, BulkUpsertResponse, ChangeItem, MatrixSnapshot};

use crate::auth::{load_auth, AuthCredentials};

/// Error type for store operations.
#[derive(Debug)]
pub enum StoreError {
    /// No auth credentials configured.
    NotAuthenticated,
    /// The store rejected the token (401/403). Fatal to the current
    /// operation; re-authentication is an external concern.
    AuthRequired(u16),
    /// Transport-level failure: connect, timeout, TLS.
    Network(String),
    /// Non-2xx response outside the classified cases.
    Http(u16, String),
    /// Response body was not the expected JSON.
    Parse(String),
    /// The store rejected the request shape (400/422).
    Validation(String),
    /// Local file I/O (credential storage).
    Io(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotAuthenticated => {
                write!(f, "not authenticated: no saved credentials")
            }
            StoreError::AuthRequired(status) => {
                write!(f, "authentication required (HTTP {})", status)
            }
            StoreError::Network(msg) => write!(f, "network error: {}", msg),
            StoreError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            StoreError::Parse(msg) => write!(f, "parse error: {}", msg),
            StoreError::Validation(msg) => write!(f, "{}", msg),
            StoreError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Target store API client (blocking).
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl StoreClient {
    /// Create a new client using saved auth credentials.
    pub fn from_saved_auth() -> Result<Self, StoreError> {
        let creds = load_auth().ok_or(StoreError::NotAuthenticated)?;
        Ok(Self::new(creds))
    }

    /// Create a new client with explicit credentials.
    pub fn new(creds: AuthCredentials) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("targetgrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_base: creds.api_base,
            token: creds.token,
        }
    }

    /// Load the full target matrix for one department and period.
    pub fn fetch_matrix(
        &self,
        department: &str,
        period: FiscalPeriod,
    ) -> Result<MatrixSnapshot, StoreError> {
        let url = format!("{}/api/targets/matrix", self.api_base);
        let period_key = period.key();
        let response = self
            .http
            .get(&url)
            .query(&[("department", department), ("period", period_key.as_str())])
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let response = classify_status(response)?;
        response
            .json::<MatrixSnapshot>()
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    /// Send one batched upsert for every modified cell of a period.
    ///
    /// The whole change set travels in a single request; per-item
    /// rejections come back in the response's `errors` array rather than
    /// failing the batch.
    pub fn bulk_upsert(
        &self,
        period: FiscalPeriod,
        changes: Vec<ChangeItem>,
    ) -> Result<BulkUpsertResponse, StoreError> {
        let url = format!("{}/api/targets/bulk-upsert", self.api_base);
        let request = BulkUpsertRequest { period: period.key(), changes };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let response = classify_status(response)?;
        response
            .json::<BulkUpsertResponse>()
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

/// Map HTTP status classes to typed errors; pass 2xx through.
fn classify_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, StoreError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    match status {
        401 | 403 => Err(StoreError::AuthRequired(status)),
        400 | 422 => Err(StoreError::Validation(body)),
        _ => Err(StoreError::Http(status, body)),
    }
}
