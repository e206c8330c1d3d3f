//! # メール送信ユースケース
//!
//! 受け取った通知メッセージをログに残し、送信ポートへそのまま委譲する。
//!
//! ## 設計方針
//!
//! - **検証しない**: 宛先・件名・本文の内容はここでは一切検証しない
//! - **同一インスタンスを渡す**: 受け取った `Arc<EmailMessage>` を複製せずに送信ポートへ渡す
//! - **エラーは握りつぶさない**: 送信ポートが同期的に返したエラーはそのまま呼び出し元へ返す

use std::sync::Arc;

use notiflow_domain::notification::{EmailMessage, NotificationError};
use notiflow_infra::notification::NotificationSender;

/// メール送信ユースケース
pub struct SendEmailUseCaseImpl {
    sender: Arc<dyn NotificationSender>,
}

impl SendEmailUseCaseImpl {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self { sender }
    }

    /// 通知メッセージを送信ポートに渡す
    ///
    /// メッセージが `None` の場合は送信ポートを呼ばずに
    /// [`NotificationError::MissingMessage`] を返す。
    pub async fn send(&self, message: Option<Arc<EmailMessage>>) -> Result<(), NotificationError> {
        let message = message.ok_or(NotificationError::MissingMessage)?;

        tracing::info!(
            notification.origin_service = %message.origin_label(),
            "送信依頼を処理中 (originService: {})",
            message.origin_label()
        );

        self.sender.send_email(message).await
    }
}
