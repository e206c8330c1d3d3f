//! # Notiflow ドメイン層
//!
//! メール通知リレーのドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//!   ↘           ↗
//!      shared
//! ```
//!
//! ドメイン層はインフラ層（SMTP、HTTP）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`notification`] - 通知メッセージと通知送信エラー
//!
//! ## 使用例
//!
//! ```rust
//! use notiflow_domain::notification::EmailMessage;
//!
//! let message = EmailMessage::new(
//!     Some("user@example.com".to_string()),
//!     Some("件名".to_string()),
//!     Some("本文".to_string()),
//!     Some("ServiceA".to_string()),
//! );
//! assert_eq!(message.prefixed_subject(), "[ServiceA] 件名");
//! ```

pub mod notification;

pub use notification::{EmailMessage, NotificationError};
