//! # Notiflow インフラ層
//!
//! 外部システム（SMTP サーバー）との通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ユースケースが依存する送信ポート（[`notification::NotificationSender`]）と、
//! その具体的な実装を提供する。SMTP の詳細はこのクレートにカプセル化し、
//! ユースケースをトランスポートの変更から保護する。
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//!          ↘
//!            shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`notification`] - 送信ポート、SMTP / Noop 実装、配信ワーカープール
//! - `mock` - テスト用モック送信（`test-utils` feature 有効時のみ）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use notiflow_infra::notification::{DeliveryExecutor, SmtpNotificationSender};
//!
//! let executor = DeliveryExecutor::new(8);
//! let sender = SmtpNotificationSender::new(
//!     "localhost",
//!     1025,
//!     "alertasBIAN@fisagrp.com",
//!     executor,
//! )?;
//! ```

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
