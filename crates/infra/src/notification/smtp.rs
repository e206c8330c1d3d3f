//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。
//!
//! 送信は [`DeliveryExecutor`] 上で実行され、`send_email()` は投入後すぐに戻る。
//! エンベロープ構築から SMTP 送信までのいずれの失敗もワーカー側でログに出して破棄する。

use std::{fmt::Display, sync::Arc};

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
};
use notiflow_domain::notification::{EmailMessage, NotificationError};
use notiflow_shared::{
    event_log::{error as error_ctx, event},
    log_business_event,
};

use super::{DeliveryExecutor, NotificationSender};

/// SMTP 通知送信
///
/// `lettre::AsyncTransport` をラップする。本番は `AsyncSmtpTransport<Tokio1Executor>`、
/// テストでは lettre の `AsyncStubTransport` を差し込む。
pub struct SmtpNotificationSender<T = AsyncSmtpTransport<Tokio1Executor>> {
    transport:    Arc<T>,
    from_address: Mailbox,
    executor:     DeliveryExecutor,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    /// - `from_address`: 固定の送信元メールアドレス
    /// - `executor`: 送信を実行するワーカープール
    pub fn new(
        host: &str,
        port: u16,
        from_address: &str,
        executor: DeliveryExecutor,
    ) -> Result<Self, NotificationError> {
        // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self::with_transport(Arc::new(transport), from_address, executor)
    }
}

impl<T> SmtpNotificationSender<T>
where
    T: AsyncTransport + Send + Sync + 'static,
    T::Ok: Send,
    T::Error: Display + Send,
{
    /// 任意のトランスポートで送信インスタンスを作成
    ///
    /// 送信元アドレスはここで検証し、不正なら起動時にエラーにする。
    pub fn with_transport(
        transport: Arc<T>,
        from_address: &str,
        executor: DeliveryExecutor,
    ) -> Result<Self, NotificationError> {
        let from_address = from_address.parse::<Mailbox>().map_err(|e| {
            NotificationError::InvalidConfiguration(format!("送信元アドレス不正: {e}"))
        })?;

        Ok(Self {
            transport,
            from_address,
            executor,
        })
    }
}

/// 通知メッセージから SMTP エンベロープを構築する
///
/// 宛先・本文はそのまま、件名は `"[<originService>] <subject>"` とする。
fn build_envelope(from: &Mailbox, message: &EmailMessage) -> Result<Message, NotificationError> {
    let recipient = message
        .recipient
        .as_deref()
        .ok_or_else(|| NotificationError::InvalidPayload("宛先が指定されていません".to_string()))?;
    let to = recipient
        .parse::<Mailbox>()
        .map_err(|e| NotificationError::InvalidPayload(format!("宛先アドレス不正: {e}")))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(message.prefixed_subject())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone().unwrap_or_default())
        .map_err(|e| NotificationError::InvalidPayload(format!("メッセージ構築失敗: {e}")))
}

async fn deliver<T>(
    transport: &T,
    from: &Mailbox,
    message: &EmailMessage,
) -> Result<(), NotificationError>
where
    T: AsyncTransport + Sync,
    T::Error: Display,
{
    let envelope = build_envelope(from, message)?;

    tracing::info!("SMTP サーバーに接続中");
    transport
        .send(envelope)
        .await
        .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

    Ok(())
}

#[async_trait]
impl<T> NotificationSender for SmtpNotificationSender<T>
where
    T: AsyncTransport + Send + Sync + 'static,
    T::Ok: Send,
    T::Error: Display + Send,
{
    async fn send_email(&self, message: Arc<EmailMessage>) -> Result<(), NotificationError> {
        let transport = self.transport.clone();
        let from = self.from_address.clone();

        self.executor.submit(async move {
            let recipient = message.recipient.as_deref().unwrap_or_default();
            let origin_service = message.origin_label();

            match deliver(transport.as_ref(), &from, &message).await {
                Ok(()) => {
                    log_business_event!(
                        event.category = event::category::NOTIFICATION,
                        event.action = event::action::NOTIFICATION_SENT,
                        event.result = event::result::SUCCESS,
                        notification.recipient = recipient,
                        notification.origin_service = origin_service,
                        "通知メール送信成功"
                    );
                }
                Err(e) => {
                    // 呼び出し元には伝えない（fire-and-forget）
                    tracing::error!(
                        error.category = error_ctx::category::EXTERNAL_SERVICE,
                        error.kind = error_ctx::kind::SMTP,
                        error.message = %e,
                        notification.recipient = recipient,
                        notification.origin_service = origin_service,
                        "通知メール送信で致命的な失敗"
                    );
                    log_business_event!(
                        event.category = event::category::NOTIFICATION,
                        event.action = event::action::NOTIFICATION_FAILED,
                        event.result = event::result::FAILURE,
                        notification.recipient = recipient,
                        notification.origin_service = origin_service,
                        "通知メール送信失敗"
                    );
                }
            }
        });

        Ok(())
    }
}
