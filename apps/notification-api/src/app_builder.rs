//! # Notification API アプリケーション構築
//!
//! DI（ユースケース・State）の初期化とルーター構築を担当する。
//! `main.rs` は送信ポートとリミッターの初期化、サーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use notiflow_infra::notification::NotificationSender;
use notiflow_shared::{
    observability::{MakeRequestUuidV7, make_request_span},
    rate_limit::RateLimiter,
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    handler::{
        EMAIL_NOTIFICATION_PATH,
        NotificationState,
        health_check,
        send_email_notification,
    },
    usecase::SendEmailUseCaseImpl,
};

/// DI の構築とルーター定義を行う
///
/// `limiter` はメール送信エンドポイントにだけ適用する（`/health` は対象外）。
/// 判定はハンドラ内でボディの抽出後に行う。
pub fn build_app(sender: Arc<dyn NotificationSender>, limiter: Arc<dyn RateLimiter>) -> Router {
    let notification_state = Arc::new(NotificationState {
        usecase: SendEmailUseCaseImpl::new(sender),
        limiter,
    });

    let notification_routes = Router::new()
        .route(EMAIL_NOTIFICATION_PATH, post(send_email_notification))
        .with_state(notification_state);

    // レイヤー順序（外側から）:
    // 1. SetRequestIdLayer: UUID v7 を生成（またはクライアント提供値を使用）
    // 2. TraceLayer: request_id を含むスパンを作り、以降のログと配信ジョブに引き継ぐ
    // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
    Router::new()
        .route("/health", get(health_check))
        .merge(notification_routes)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
