//! HTTP client for the real-time push gateway.
//!
//! One call per screen: `POST {base}/push/screen-{id}` with a JSON body of
//! `{event, screen_id, version}`. The gateway relays the bump onto the
//! screen's live channel; a non-2xx response or timeout is a failure for
//! that screen only. No retries here — the device's own polling is the
//! fallback consistency mechanism.

use std::time::Duration;

use async_trait::async_trait;

use beamview_core::types::DbId;

/// Event tag carried by every bump request.
pub const BUMP_EVENT: &str = "playlist.bump";

/// Header carrying the shared secret that authenticates us to the gateway.
pub const PUSH_SECRET_HEADER: &str = "X-Push-Secret";

/// Per-request timeout. Kept short so a slow or unreachable gateway cannot
/// stall a bulk operation beyond `timeout * ceil(n / concurrency)`.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single gateway delivery.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Push gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// PushGateway
// ---------------------------------------------------------------------------

/// Delivery seam for bump notifications, one screen per call.
///
/// The fanout service depends on this trait so tests can inject failures
/// for a chosen subset of screens.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver one bump to the channel of `screen_id`.
    async fn bump_screen(&self, screen_id: DbId, version: &str) -> Result<(), GatewayError>;
}

/// Production gateway client over HTTP.
pub struct HttpPushGateway {
    client: reqwest::Client,
    base_url: String,
    secret: String,
}

impl HttpPushGateway {
    /// Create a client for the gateway at `base_url` (trailing slash
    /// tolerated), authenticating with `secret`.
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn bump_screen(&self, screen_id: DbId, version: &str) -> Result<(), GatewayError> {
        let url = format!("{}/push/screen-{screen_id}", self.base_url);
        let body = serde_json::json!({
            "event": BUMP_EVENT,
            "screen_id": screen_id,
            "version": version,
        });

        let response = self
            .client
            .post(&url)
            .header(PUSH_SECRET_HEADER, &self.secret)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slash() {
        let gateway = HttpPushGateway::new("http://127.0.0.1:8081/", "s3cret");
        assert_eq!(gateway.base_url, "http://127.0.0.1:8081");
    }

    #[test]
    fn gateway_error_display_http_status() {
        let err = GatewayError::HttpStatus(502);
        assert_eq!(err.to_string(), "Push gateway returned HTTP 502");
    }

    #[test]
    fn gateway_error_display_request() {
        // Build a reqwest error from an invalid URL.
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = GatewayError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
