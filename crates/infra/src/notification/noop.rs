//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ローカル開発や通知無効化時に使用する。

use std::sync::Arc;

use async_trait::async_trait;
use notiflow_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, message: Arc<EmailMessage>) -> Result<(), NotificationError> {
        tracing::info!(
            recipient = message.recipient.as_deref().unwrap_or_default(),
            subject = %message.prefixed_subject(),
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}
