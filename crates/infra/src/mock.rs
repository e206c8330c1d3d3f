//! # テスト用モック送信
//!
//! ユースケース・ハンドラテストで使用するインメモリの [`NotificationSender`]。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! notiflow-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notiflow_domain::notification::{EmailMessage, NotificationError};

use crate::notification::NotificationSender;

type ErrorFactory = Arc<dyn Fn() -> NotificationError + Send + Sync>;

// ===== MockNotificationSender =====

/// 受け取ったメッセージを記録するモック送信
///
/// クローンは記録を共有する。`failing_with()` で作成すると、
/// 呼び出しを記録したうえで毎回エラーを返す（同期的に失敗する送信ポートの再現）。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:    Arc<Mutex<Vec<Arc<EmailMessage>>>>,
    failure: Option<ErrorFactory>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 毎回 `make_error()` の結果を返すモックを作成する
    pub fn failing_with<F>(make_error: F) -> Self
    where
        F: Fn() -> NotificationError + Send + Sync + 'static,
    {
        Self {
            sent:    Arc::new(Mutex::new(Vec::new())),
            failure: Some(Arc::new(make_error)),
        }
    }

    /// 送信ポートに渡されたメッセージ（呼び出し順）
    pub fn sent_emails(&self) -> Vec<Arc<EmailMessage>> {
        self.sent.lock().unwrap().clone()
    }

    /// 送信ポートの呼び出し回数
    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, message: Arc<EmailMessage>) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(message);
        match &self.failure {
            Some(make_error) => Err(make_error()),
            None => Ok(()),
        }
    }
}
