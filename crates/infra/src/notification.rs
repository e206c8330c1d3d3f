//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（Mailpit 開発用 / SMTP リレー）、Noop（送信無効化用）
//! - **fire-and-forget**: SMTP 実装は送信を [`DeliveryExecutor`] に投入して即座に戻り、
//!   送信失敗はログに出すだけで呼び出し元には返さない
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択

mod executor;
mod noop;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
pub use executor::DeliveryExecutor;
pub use noop::NoopNotificationSender;
use notiflow_domain::notification::{EmailMessage, NotificationError};
pub use smtp::SmtpNotificationSender;

/// メール送信トレイト（送信ポート）
///
/// ユースケースはこのトレイトにのみ依存する。
/// 受け取った `Arc<EmailMessage>` は複製・変更せずに扱うこと。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    ///
    /// `Ok(())` は「送信を受け付けた」ことを意味し、配信完了の保証ではない。
    async fn send_email(&self, message: Arc<EmailMessage>) -> Result<(), NotificationError>;
}
