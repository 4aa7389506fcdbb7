//! Message gateway client
//!
//! Thin HTTP client for the outbound SMS/LMS/MMS/Kakao gateway. Requests
//! are paced by a shared rate limiter; failures map onto `GatewayError`.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::GatewayConfig;
use crate::models::message::MessageKind;
use crate::utils::errors::{TourDeskError, GatewayError, Result};
use crate::utils::logging::log_api_error;

/// Body of one gateway send call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRequest {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub sender: String,
    pub recipients: Vec<String>,
    pub title: Option<String>,
    pub content: String,
    pub template_id: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub sent: u32,
    pub failed: u32,
}

#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    limiter: Arc<DefaultDirectRateLimiter>,
    config: GatewayConfig,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("api_url", &self.config.api_url)
            .field("requests_per_second", &self.config.requests_per_second)
            .finish()
    }
}

impl GatewayClient {
    /// Create a new GatewayClient instance
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("TourDesk/1.0")
            .build()
            .map_err(TourDeskError::Http)?;

        let per_second = NonZeroU32::new(config.requests_per_second)
            .ok_or_else(|| TourDeskError::Config("Gateway requests per second must be positive".to_string()))?;
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self { client, limiter, config })
    }

    pub fn sender_number(&self) -> &str {
        &self.config.sender_number
    }

    /// Send one batch, waiting for a rate-limit slot first
    pub async fn send(&self, request: &GatewayRequest) -> Result<GatewayResponse> {
        self.limiter.until_ready().await;

        debug!(
            kind = %request.kind,
            recipients = request.recipients.len(),
            url = %self.config.api_url,
            "Calling message gateway"
        );

        let response = self.client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TourDeskError::Gateway(GatewayError::Timeout)
                } else if e.is_connect() {
                    TourDeskError::Gateway(GatewayError::ServiceUnavailable)
                } else {
                    TourDeskError::Gateway(GatewayError::RequestFailed(e.to_string()))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            log_api_error("message_gateway", &error_text, Some(status.as_str()));
            return Err(TourDeskError::Gateway(GatewayError::RequestFailed(
                format!("HTTP {}: {}", status, error_text)
            )));
        }

        let body: GatewayResponse = response.json().await
            .map_err(|e| TourDeskError::Gateway(GatewayError::InvalidResponse(e.to_string())))?;

        if body.sent + body.failed > request.recipients.len() as u32 {
            return Err(TourDeskError::Gateway(GatewayError::InvalidResponse(format!(
                "Gateway counted {} deliveries for {} recipients",
                body.sent + body.failed,
                request.recipients.len()
            ))));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rps: u32) -> GatewayConfig {
        GatewayConfig {
            api_url: "http://localhost:9000/api/send".to_string(),
            api_key: "test-key".to_string(),
            sender_number: "02-123-4567".to_string(),
            timeout_seconds: 5,
            requests_per_second: rps,
        }
    }

    #[test]
    fn test_zero_rate_is_a_config_error() {
        assert!(matches!(GatewayClient::new(config(0)), Err(TourDeskError::Config(_))));
    }

    #[test]
    fn test_request_serializes_kind_as_type() {
        let request = GatewayRequest {
            kind: MessageKind::Lms,
            sender: "02-123-4567".to_string(),
            recipients: vec!["010-1234-5678".to_string()],
            title: Some("안내".to_string()),
            content: "본문".to_string(),
            template_id: None,
            image_url: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "lms");
        assert_eq!(json["recipients"][0], "010-1234-5678");
    }
}
