//! # メール通知ハンドラ
//!
//! 他サービスからのメール送信依頼を受け付ける。
//!
//! ## エンドポイント
//!
//! - `POST /api/v1/notifications/email` - メール送信依頼（レートリミット対象）
//!
//! 成功時の `202 Accepted` は「送信ワーカーに投入した」ことを意味し、配信完了ではない。

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use notiflow_domain::EmailMessage;
use notiflow_shared::{
    event_log::event,
    log_business_event,
    rate_limit::{RateLimitRejection, RateLimiter, acquire_permission},
};
use serde::Deserialize;

use crate::{error::ApiError, usecase::SendEmailUseCaseImpl};

/// メール送信依頼のパス
pub const EMAIL_NOTIFICATION_PATH: &str = "/api/v1/notifications/email";

/// 受付成功時のレスポンス本文
pub const ACCEPTED_MESSAGE: &str = "Notificación encolada exitosamente.";

/// レートリミット超過時のレスポンス本文
pub const SATURATED_MESSAGE: &str =
    "El sistema de notificaciones está saturado. Intente más tarde.";

/// メール通知 API の共有状態
pub struct NotificationState {
    pub usecase: SendEmailUseCaseImpl,
    /// メール送信エンドポイントのレートリミッター
    pub limiter: Arc<dyn RateLimiter>,
}

// --- リクエスト型 ---

/// メール送信リクエスト
///
/// すべての項目が任意。キー欠落と `null` はどちらも `None` になる。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub recipient:      Option<String>,
    pub subject:        Option<String>,
    pub body:           Option<String>,
    pub origin_service: Option<String>,
}

impl From<SendEmailRequest> for EmailMessage {
    fn from(request: SendEmailRequest) -> Self {
        EmailMessage::new(
            request.recipient,
            request.subject,
            request.body,
            request.origin_service,
        )
    }
}

// --- ハンドラ ---

/// POST /api/v1/notifications/email
///
/// リクエストボディをそのまま [`EmailMessage`] に写してユースケースに渡す。
///
/// - レートリミットはボディの抽出に成功した後に判定する。
///   パースできないリクエストと `null` ボディは許可枠を消費しない
/// - ボディが JSON の `null` の場合はメッセージなしとしてユースケースに渡し、400 を返す
pub async fn send_email_notification(
    State(state): State<Arc<NotificationState>>,
    Json(request): Json<Option<SendEmailRequest>>,
) -> Result<Response, ApiError> {
    if let Some(request) = &request
        && let Err(rejection) = acquire_permission(state.limiter.as_ref()).await
    {
        return Ok(rate_limit_fallback(request, &rejection));
    }

    let message = request.map(|r| Arc::new(EmailMessage::from(r)));
    let origin_service = message
        .as_ref()
        .map(|m| m.origin_label().to_string())
        .unwrap_or_default();

    state.usecase.send(message).await?;

    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_ACCEPTED,
        event.result = event::result::SUCCESS,
        notification.origin_service = %origin_service,
        "メール送信依頼を受付"
    );

    Ok((StatusCode::ACCEPTED, ACCEPTED_MESSAGE).into_response())
}

/// レートリミット超過時のフォールバック
///
/// 拒否されたリクエストと拒否理由を受け取る。ユースケースは呼ばれない。
pub fn rate_limit_fallback(request: &SendEmailRequest, rejection: &RateLimitRejection) -> Response {
    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_THROTTLED,
        event.result = event::result::FAILURE,
        rate_limit.name = %rejection.limiter,
        notification.origin_service = request.origin_service.as_deref().unwrap_or("null"),
        "メール送信依頼をレートリミットで拒否"
    );

    // Retry-After は秒単位の整数。1 秒未満は切り上げる
    let retry_after_secs = rejection.retry_after.as_millis().div_ceil(1_000).max(1);

    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_after_secs.to_string())],
        SATURATED_MESSAGE,
    )
        .into_response()
}
