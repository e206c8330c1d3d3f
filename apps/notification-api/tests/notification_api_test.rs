//! メール通知 API 統合テスト
//!
//! `build_app` で本番と同じルーター・レイヤー構成を組み立て、
//! 送信ポートだけを `MockNotificationSender` に差し替えて HTTP 経由で検証する。
//!
//! ## テストケース
//!
//! - 送信依頼 → 202 + 受付メッセージ、送信ポートに 4 項目がそのまま届く
//! - ウィンドウ内の上限超過 → 超過分は 429 で、送信ポートに届かない
//! - ボディが `null` → 400、送信ポートに届かない
//! - パースできないボディと `null` ボディはレートリミットの枠を消費しない
//! - キー欠落のボディも受け付ける
//! - `/health` はレートリミットの対象外
//! - レスポンスに X-Request-Id が付く

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use notiflow_api::{
    app_builder::build_app,
    handler::{ACCEPTED_MESSAGE, EMAIL_NOTIFICATION_PATH, SATURATED_MESSAGE},
};
use notiflow_domain::EmailMessage;
use notiflow_infra::mock::MockNotificationSender;
use notiflow_shared::rate_limit::{FixedWindowRateLimiter, RateLimitConfig};
use pretty_assertions::assert_eq;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

// --- テストヘルパー ---

/// テスト中に満了しない長さのウィンドウで上限 `limit` のアプリを構築する
fn create_test_app(limit: u32) -> (Router, MockNotificationSender) {
    let sender = MockNotificationSender::new();
    let limiter = Arc::new(FixedWindowRateLimiter::new(RateLimitConfig::new(
        "emailService",
        limit,
        Duration::from_secs(600),
    )));
    let app = build_app(Arc::new(sender.clone()), limiter);
    (app, sender)
}

fn sample_body() -> JsonValue {
    json!({
        "recipient": "user@example.com",
        "subject": "Test Subject",
        "body": "Hello body",
        "originService": "ServiceA"
    })
}

fn email_request(body: &JsonValue) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(EMAIL_NOTIFICATION_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// --- テスト ---

#[tokio::test]
async fn test_送信依頼は202で受け付けられ送信ポートに届く() {
    let (app, sender) = create_test_app(10);

    let response = app.oneshot(email_request(&sample_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_text(response).await, ACCEPTED_MESSAGE);

    let sent = sender.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        *sent[0],
        EmailMessage::new(
            Some("user@example.com".to_string()),
            Some("Test Subject".to_string()),
            Some("Hello body".to_string()),
            Some("ServiceA".to_string()),
        )
    );
}

#[tokio::test]
async fn test_上限を超えた依頼は429になり送信ポートに届かない() {
    let (app, sender) = create_test_app(3);

    let mut statuses = Vec::new();
    let mut last_body = String::new();
    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(email_request(&sample_body()))
            .await
            .unwrap();
        statuses.push(response.status());
        last_body = body_text(response).await;
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::ACCEPTED,
            StatusCode::ACCEPTED,
            StatusCode::ACCEPTED,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
    assert_eq!(last_body, SATURATED_MESSAGE);
    assert_eq!(sender.call_count(), 3);
}

#[tokio::test]
async fn test_429レスポンスにretry_afterが付く() {
    let (app, _sender) = create_test_app(0);

    let response = app.oneshot(email_request(&sample_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
}

#[tokio::test]
async fn test_ボディがnullなら400になり送信ポートに届かない() {
    let (app, sender) = create_test_app(10);

    let response = app.oneshot(email_request(&JsonValue::Null)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: JsonValue = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], 400);
    assert_eq!(json["detail"], "通知メッセージが指定されていません");
    assert_eq!(sender.call_count(), 0);
}

#[tokio::test]
async fn test_パースできないボディはレートリミットの枠を消費しない() {
    let (app, sender) = create_test_app(1);

    let malformed = Request::builder()
        .method(Method::POST)
        .uri(EMAIL_NOTIFICATION_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let without_content_type = Request::builder()
        .method(Method::POST)
        .uri(EMAIL_NOTIFICATION_PATH)
        .body(Body::from(sample_body().to_string()))
        .unwrap();
    let wrong_shape = email_request(&json!({ "recipient": 42 }));

    let statuses = vec![
        app.clone().oneshot(malformed).await.unwrap().status(),
        app.clone().oneshot(without_content_type).await.unwrap().status(),
        app.clone().oneshot(wrong_shape).await.unwrap().status(),
        app.clone()
            .oneshot(email_request(&JsonValue::Null))
            .await
            .unwrap()
            .status(),
        app.clone()
            .oneshot(email_request(&sample_body()))
            .await
            .unwrap()
            .status(),
        app.oneshot(email_request(&sample_body()))
            .await
            .unwrap()
            .status(),
    ];

    assert_eq!(
        statuses,
        vec![
            StatusCode::BAD_REQUEST,
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            StatusCode::UNPROCESSABLE_ENTITY,
            StatusCode::BAD_REQUEST,
            StatusCode::ACCEPTED,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
    assert_eq!(sender.call_count(), 1);
}

#[tokio::test]
async fn test_キーが欠落したボディもそのまま受け付ける() {
    let (app, sender) = create_test_app(10);

    let response = app
        .oneshot(email_request(&json!({ "recipient": "not-an-email" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let sent = sender.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient.as_deref(), Some("not-an-email"));
    assert_eq!(sent[0].subject, None);
    assert_eq!(sent[0].body, None);
    assert_eq!(sent[0].origin_service, None);
}

#[tokio::test]
async fn test_healthはレートリミットの対象外() {
    let (app, _sender) = create_test_app(0);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: JsonValue = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_レスポンスにx_request_idが付く() {
    let (app, _sender) = create_test_app(10);

    let response = app.oneshot(email_request(&sample_body())).await.unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(!request_id.is_empty());
}

#[tokio::test]
async fn test_クライアント指定のx_request_idをそのまま返す() {
    let (app, _sender) = create_test_app(10);
    let mut request = email_request(&sample_body());
    request
        .headers_mut()
        .insert("x-request-id", "req-from-client".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-from-client");
}
