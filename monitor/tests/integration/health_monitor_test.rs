//! Integration Test: ヘルスモニター
//!
//! APIモック → プローブ → 分類 → Telegramモックへのアラート送信

use std::time::Duration;

use opsbench_common::types::{AlertMessage, ProbeOutcome};
use opsbench_monitor::health::MockSleeper;
use opsbench_monitor::{HealthMonitor, HttpProber, TelegramNotifier};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::support::{config_for, send_message_path, unreachable_url, TEST_CHAT_ID};

const API_PATH: &str = "/v1/farming-pools-info";

async fn mount_api(api: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("networks", "bsc,eth,polygon"))
        .respond_with(response)
        .mount(api)
        .await;
}

async fn expect_alert(telegram: &MockServer, text: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(send_message_path()))
        .and(body_json(json!({ "chat_id": TEST_CHAT_ID, "text": text })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(times)
        .mount(telegram)
        .await;
}

fn build_monitor(
    config: &opsbench_common::config::MonitorConfig,
) -> HealthMonitor<HttpProber, TelegramNotifier, MockSleeper> {
    HealthMonitor::new(
        HttpProber::new(config).unwrap(),
        TelegramNotifier::new(&config.telegram).unwrap(),
        config.interval(),
    )
    .with_sleeper(MockSleeper::new())
}

#[tokio::test]
async fn test_ok_response_sends_no_alert() {
    let api = MockServer::start().await;
    let telegram = MockServer::start().await;
    mount_api(&api, ResponseTemplate::new(200).set_body_string("[]")).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&telegram)
        .await;

    let config = config_for(format!("{}{}", api.uri(), API_PATH), &telegram);
    let monitor = build_monitor(&config);

    let report = monitor.run_iteration().await;

    assert_eq!(report.outcome, ProbeOutcome::Success { status: 200 });
    assert!(report.alert.is_none());
}

#[tokio::test]
async fn test_non_ok_status_alerts_with_code() {
    let api = MockServer::start().await;
    let telegram = MockServer::start().await;
    mount_api(&api, ResponseTemplate::new(503)).await;
    expect_alert(&telegram, "API response status: 503", 1).await;

    let config = config_for(format!("{}{}", api.uri(), API_PATH), &telegram);
    let monitor = build_monitor(&config);

    let report = monitor.run_iteration().await;

    assert_eq!(report.outcome, ProbeOutcome::UnexpectedStatus { status: 503 });
    assert_eq!(report.alert, Some(AlertMessage::unexpected_status(503)));
    assert!(report.delivered);
}

#[tokio::test]
async fn test_non_ok_status_keeps_looping_and_realerts() {
    let api = MockServer::start().await;
    let telegram = MockServer::start().await;
    mount_api(&api, ResponseTemplate::new(404)).await;
    expect_alert(&telegram, "API response status: 404", 3).await;

    let config = config_for(format!("{}{}", api.uri(), API_PATH), &telegram);
    let monitor = build_monitor(&config);

    let reports = monitor.run_for(3).await;

    assert_eq!(reports.len(), 3);
    assert_eq!(monitor.sleeper().call_count(), 3);
}

#[tokio::test]
async fn test_connection_failure_alerts_api_down() {
    let telegram = MockServer::start().await;
    expect_alert(&telegram, "API is down!", 2).await;

    let config = config_for(unreachable_url(), &telegram);
    let monitor = build_monitor(&config);

    let reports = monitor.run_for(2).await;

    assert!(reports
        .iter()
        .all(|r| matches!(r.outcome, ProbeOutcome::Connection { .. })));
    assert!(reports.iter().all(|r| r.delivered));
}

#[tokio::test]
async fn test_timeout_alerts_api_down() {
    let api = MockServer::start().await;
    let telegram = MockServer::start().await;
    mount_api(
        &api,
        ResponseTemplate::new(200).set_delay(Duration::from_secs(3)),
    )
    .await;
    expect_alert(&telegram, "API is down!", 1).await;

    let config = config_for(format!("{}{}", api.uri(), API_PATH), &telegram);
    let monitor = build_monitor(&config);

    let report = monitor.run_iteration().await;

    assert_eq!(report.outcome, ProbeOutcome::Timeout);
    assert_eq!(report.alert, Some(AlertMessage::api_down()));
}

#[tokio::test]
async fn test_alert_delivery_failure_is_swallowed() {
    let api = MockServer::start().await;
    let telegram = MockServer::start().await;
    mount_api(&api, ResponseTemplate::new(500)).await;
    Mock::given(method("POST"))
        .and(path(send_message_path()))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&telegram)
        .await;

    let config = config_for(format!("{}{}", api.uri(), API_PATH), &telegram);
    let monitor = build_monitor(&config);

    let reports = monitor.run_for(2).await;

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.alert.is_some() && !r.delivered));
}
