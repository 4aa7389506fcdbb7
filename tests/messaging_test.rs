//! Gateway client and message sending against a mock gateway

mod helpers;

use std::collections::HashMap;
use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use TourDesk::config::MessagingConfig;
use TourDesk::models::{MessageKind, Recipient, SendMessageRequest};
use TourDesk::services::{GatewayClient, GatewayRequest, MessagingService, TourService};
use TourDesk::utils::errors::GatewayError;
use TourDesk::TourDeskError;

fn costs() -> MessagingConfig {
    MessagingConfig {
        sms_cost: 20,
        lms_cost: 50,
        mms_cost: 200,
        kakao_cost: 15,
    }
}

fn gateway_request(recipients: &[&str]) -> GatewayRequest {
    GatewayRequest {
        kind: MessageKind::Sms,
        sender: "02-1234-5678".to_string(),
        recipients: recipients.iter().map(|r| r.to_string()).collect(),
        title: None,
        content: "내일 오전 6시 집결입니다".to_string(),
        template_id: None,
        image_url: None,
    }
}

fn recipient(phone: &str, name: &str) -> Recipient {
    Recipient {
        phone: phone.to_string(),
        name: Some(name.to_string()),
        variables: HashMap::new(),
    }
}

#[tokio::test]
async fn test_gateway_client_sends_with_api_key() {
    let mock = GatewayMockServer::new().await;
    mock.accept_all().await;

    let client = GatewayClient::new(mock.config()).unwrap();
    let response = client
        .send(&gateway_request(&["010-1111-2222", "010-3333-4444"]))
        .await
        .unwrap();
    assert_eq!(response.sent, 2);
    assert_eq!(response.failed, 0);

    let bodies = mock.sent_bodies().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["type"], "sms");
    assert_eq!(bodies[0]["sender"], "02-1234-5678");
}

#[tokio::test]
async fn test_gateway_http_error_maps_to_request_failed() {
    let mock = GatewayMockServer::new().await;
    mock.fail_with_status(503).await;

    let client = GatewayClient::new(mock.config()).unwrap();
    let err = client.send(&gateway_request(&["010-1111-2222"])).await.unwrap_err();
    assert_matches!(err, TourDeskError::Gateway(GatewayError::RequestFailed(msg)) if msg.contains("503"));
}

#[tokio::test]
async fn test_gateway_overcount_is_invalid_response() {
    let mock = GatewayMockServer::new().await;
    mock.respond_with_counts(5, 0).await;

    let client = GatewayClient::new(mock.config()).unwrap();
    assert_matches!(
        client.send(&gateway_request(&["010-1111-2222"])).await,
        Err(TourDeskError::Gateway(GatewayError::InvalidResponse(_)))
    );
}

#[tokio::test]
#[serial]
async fn test_send_renders_per_recipient_and_logs_every_delivery() {
    let db = test_db_or_skip!();
    let mock = GatewayMockServer::new().await;
    mock.accept_all().await;

    let tour = TourService::new(db.service()).create(tour_request(700_000)).await.unwrap();
    let messaging = MessagingService::new(db.service(), GatewayClient::new(mock.config()).unwrap(), costs());

    let report = messaging
        .send(SendMessageRequest {
            kind: None,
            tour_id: Some(tour.id),
            template_id: None,
            recipients: vec![
                recipient("01011112222", "김민수"),
                recipient("010-3333-4444", "이서준"),
                recipient("not-a-phone", "최유나"),
            ],
            title: None,
            content: Some("#{이름}님 출발 안내".to_string()),
            image_url: None,
            variables: HashMap::new(),
        })
        .await
        .unwrap();

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.total_cost, 40);

    // One gateway call per distinct rendered body
    let bodies = mock.sent_bodies().await;
    assert_eq!(bodies.len(), 2);
    assert!(bodies.iter().any(|b| b["content"] == "김민수님 출발 안내"));
    assert!(bodies.iter().all(|b| b["type"] == "sms"));

    let logs = messaging.logs(Some(tour.id), 50).await.unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs.iter().filter(|l| l.status == "failed").count(), 1);
}

#[tokio::test]
#[serial]
async fn test_gateway_outage_marks_recipients_failed() {
    let db = test_db_or_skip!();
    let mock = GatewayMockServer::new().await;
    mock.fail_with_status(500).await;

    let messaging = MessagingService::new(db.service(), GatewayClient::new(mock.config()).unwrap(), costs());
    let report = messaging
        .send(SendMessageRequest {
            kind: None,
            tour_id: None,
            template_id: None,
            recipients: vec![recipient("010-1111-2222", "김민수"), recipient("010-3333-4444", "이서준")],
            title: None,
            content: Some("공지사항".to_string()),
            image_url: None,
            variables: HashMap::new(),
        })
        .await
        .unwrap();

    assert_eq!(report.sent, 0);
    assert_eq!(report.failed, 2);
    assert_eq!(report.total_cost, 0);
    assert_eq!(report.errors.len(), 1);
}
