//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`EmailMessage`] | 通知メッセージ | 宛先・件名・本文・送信元サービスの 4 項目 |
//! | [`NotificationError`] | 通知送信エラー | ユースケースと送信ポートで共有するエラー |
//!
//! ## 設計方針
//!
//! - **検証しない**: 宛先の形式や空文字はどの層でも検証せず、そのまま中継する
//! - **null と空文字を区別**: 各項目は `Option<String>`。JSON の `null` / キー欠落は `None`
//! - **不変**: 生成後は変更しない。`Arc` で包んで同一インスタンスを送信ポートまで渡す

use thiserror::Error;

/// 送信元サービスが指定されていない場合の表記
const MISSING_ORIGIN_LABEL: &str = "null";

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メッセージ自体が渡されなかった（呼び出し側のプログラミングエラー）
    #[error("通知メッセージが指定されていません")]
    MissingMessage,

    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// 送信先がペイロードを受け付けなかった
    #[error("不正なペイロード: {0}")]
    InvalidPayload(String),

    /// 送信設定（送信元アドレス等）が不正
    #[error("送信設定が不正: {0}")]
    InvalidConfiguration(String),
}

/// メールメッセージ
///
/// HTTP リクエストから 1:1 で生成され、ユースケースを経て送信ポートに渡される。
/// 構造的等価性以外の同一性は持たない。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailMessage {
    /// 送信先メールアドレス（形式は検証しない）
    pub recipient:      Option<String>,
    /// 件名
    pub subject:        Option<String>,
    /// 本文（プレーンテキスト）
    pub body:           Option<String>,
    /// 送信元サービス（トレーサビリティ用の自由記述タグ）
    pub origin_service: Option<String>,
}

impl EmailMessage {
    pub fn new(
        recipient: Option<String>,
        subject: Option<String>,
        body: Option<String>,
        origin_service: Option<String>,
    ) -> Self {
        Self {
            recipient,
            subject,
            body,
            origin_service,
        }
    }

    /// ログと件名プレフィックスに使う送信元サービス表記
    ///
    /// 未指定の場合は `"null"` を返す。
    pub fn origin_label(&self) -> &str {
        self.origin_service.as_deref().unwrap_or(MISSING_ORIGIN_LABEL)
    }

    /// 送信元サービスを前置した件名（`"[<originService>] <subject>"`）
    pub fn prefixed_subject(&self) -> String {
        format!(
            "[{}] {}",
            self.origin_label(),
            self.subject.as_deref().unwrap_or_default()
        )
    }
}
