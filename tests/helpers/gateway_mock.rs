//! Mock message gateway
//!
//! Wraps a wiremock server answering the gateway's send endpoint.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use TourDesk::config::GatewayConfig;

pub const GATEWAY_PATH: &str = "/api/v1/send";
pub const GATEWAY_KEY: &str = "test-gateway-key";

pub struct GatewayMockServer {
    pub server: MockServer,
}

impl GatewayMockServer {
    pub async fn new() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            api_url: format!("{}{}", self.server.uri(), GATEWAY_PATH),
            api_key: GATEWAY_KEY.to_string(),
            sender_number: "02-1234-5678".to_string(),
            timeout_seconds: 2,
            requests_per_second: 50,
        }
    }

    /// Every call reports all recipients delivered
    pub async fn accept_all(&self) {
        Mock::given(method("POST"))
            .and(path(GATEWAY_PATH))
            .and(header("x-api-key", GATEWAY_KEY))
            .respond_with(|req: &wiremock::Request| {
                let body: serde_json::Value = req.body_json().unwrap_or_default();
                let count = body["recipients"].as_array().map(|r| r.len()).unwrap_or(0);
                ResponseTemplate::new(200).set_body_json(json!({ "sent": count, "failed": 0 }))
            })
            .mount(&self.server)
            .await;
    }

    /// Fixed counts for every call
    pub async fn respond_with_counts(&self, sent: u32, failed: u32) {
        Mock::given(method("POST"))
            .and(path(GATEWAY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sent": sent, "failed": failed })))
            .mount(&self.server)
            .await;
    }

    pub async fn fail_with_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(GATEWAY_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("gateway down"))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every call received so far
    pub async fn sent_bodies(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.body_json::<serde_json::Value>().ok())
            .collect()
    }
}
